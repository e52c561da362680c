//! Argument-to-configuration resolution

mod driver;
mod error;
mod stream;

pub use driver::{MAX_OPTIONS_DEPTH, Outcome, Resolver};
pub use error::ResolveError;
pub use stream::Stream;
