//! Errors raised while resolving arguments

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why an argument vector could not be turned into a run configuration
///
/// Every variant is a configuration mistake; none is retried. The resolver
/// writes the message to its error stream and the outermost caller decides
/// whether to end the process with [`ResolveError::exit_code`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Unknown flag, missing value or a value of the wrong type
    #[error("{message}")]
    Usage { message: String },

    #[error("You cannot use both --line and --example")]
    MutuallyExclusiveOptions,

    #[error("You must specify one file, not a directory when using the --line option")]
    LineTargetIsDirectory { path: PathBuf },

    #[error("{} does not exist", path.display())]
    LineTargetMissing { path: PathBuf },

    #[error("Could not read {}: {source}", path.display())]
    LineTargetUnreadable { path: PathBuf, source: io::Error },

    #[error("Only one file can be specified when using the --line option: {files:?}")]
    LineTargetCount { files: Vec<String> },

    #[error("No files specified.")]
    NoFiles,

    #[error("Could not read options file {}: {source}", path.display())]
    OptionsFileUnreadable { path: PathBuf, source: io::Error },

    #[error("Could not write options file {}: {source}", path.display())]
    OptionsFileUnwritable { path: PathBuf, source: io::Error },

    #[error("Options files nested more than {limit} deep at {}", path.display())]
    OptionsFileNesting { path: PathBuf, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ResolveError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            ResolveError::LineTargetIsDirectory { .. } => 1,
            ResolveError::LineTargetMissing { .. } | ResolveError::LineTargetUnreadable { .. } => 2,
            ResolveError::LineTargetCount { .. } => 3,
            ResolveError::MutuallyExclusiveOptions => 4,
            ResolveError::OptionsFileUnreadable { .. }
            | ResolveError::OptionsFileUnwritable { .. }
            | ResolveError::OptionsFileNesting { .. } => 5,
            ResolveError::NoFiles => 6,
            ResolveError::Usage { .. } => 64,
            ResolveError::Io(_) => 74,
        }
    }

    /// Whether the usage banner follows the message
    pub fn shows_banner(&self) -> bool {
        matches!(self, ResolveError::Usage { .. } | ResolveError::NoFiles)
    }
}
