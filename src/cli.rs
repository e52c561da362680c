//! Option grammar, argument dispatch and options files

pub mod dispatch;
pub mod grammar;
pub mod options_file;

// Re-export types for convenient access
pub use dispatch::{Occurrence, ParsedArgs, Value};
pub use grammar::{Arity, OPTIONS, OptionDescriptor, OptionName, ValueKind};
