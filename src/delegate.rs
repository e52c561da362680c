//! Delegates for runs that leave this process
//!
//! `--drb` hands the remaining arguments to a [`RemoteRunner`]. The transport
//! behind it belongs to the remote side; the resolver only decides that the
//! hand-off happens and with which arguments.

use crate::resolve::Stream;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// Nothing is listening for remote runs
    #[error("No server is running")]
    NoServer,

    #[error("remote run failed: {0}")]
    Io(#[from] io::Error),
}

/// Executes a run on the caller's behalf
pub trait RemoteRunner {
    /// Runs the examples selected by `args`, reporting through the streams
    fn run(
        &mut self,
        args: &[String],
        err: &mut Stream<'_>,
        out: &mut Stream<'_>,
    ) -> Result<(), RemoteError>;
}

/// Remote runner used when no spec server is configured
#[derive(Debug, Default)]
pub struct NoServer;

impl RemoteRunner for NoServer {
    fn run(
        &mut self,
        args: &[String],
        _err: &mut Stream<'_>,
        _out: &mut Stream<'_>,
    ) -> Result<(), RemoteError> {
        tracing::debug!(?args, "no remote server configured");
        Err(RemoteError::NoServer)
    }
}
