#![forbid(unsafe_code)]

//! spec-options: the command-line front end of a behaviour-driven test runner
//!
//! Turns a raw argument vector into a [`RunConfiguration`], or takes one of
//! the alternate paths (help, version, options files, remote hand-off).
//!
//! ```no_run
//! use spec_options::{NoServer, Outcome, Resolver, Stream};
//! use termcolor::Buffer;
//!
//! let mut out = Buffer::no_color();
//! let mut err = Buffer::no_color();
//! let mut remote = NoServer;
//! let args = vec!["spec/stack_spec.rb".to_string(), "--line".into(), "12".into()];
//!
//! let mut resolver = Resolver::new(Stream::embedded(&mut err), Stream::embedded(&mut out), &mut remote);
//! if let Ok(Outcome::Run(config)) = resolver.resolve(&args, true) {
//!     println!("{:?}", config.examples);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod delegate;
pub mod files;
pub mod resolve;
pub mod source;

pub use config::RunConfiguration;
pub use delegate::{NoServer, RemoteError, RemoteRunner};
pub use resolve::{Outcome, ResolveError, Resolver, Stream};
