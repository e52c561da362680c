//! Output streams handed to the resolver

use std::io::{self, Write};
use termcolor::{ColorSpec, WriteColor};

/// A writer plus the capability to end the host process
///
/// Help, version and the missing-files warning only terminate the process
/// when written to a stream that allows it. The binary passes its real
/// standard streams with `may_exit` set; embedded callers and recursive
/// resolution pass streams without it.
pub struct Stream<'a> {
    writer: &'a mut dyn WriteColor,
    may_exit: bool,
}

impl<'a> Stream<'a> {
    /// A stream that, once written to by a terminal path, ends the process
    pub fn exiting(writer: &'a mut dyn WriteColor) -> Self {
        Stream {
            writer,
            may_exit: true,
        }
    }

    /// A stream owned by a host that must keep running
    pub fn embedded(writer: &'a mut dyn WriteColor) -> Self {
        Stream {
            writer,
            may_exit: false,
        }
    }

    pub fn may_exit(&self) -> bool {
        self.may_exit
    }
}

impl Write for Stream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl WriteColor for Stream<'_> {
    fn supports_color(&self) -> bool {
        self.writer.supports_color()
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.writer.set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.writer.reset()
    }
}
