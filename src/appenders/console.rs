//! Console sinks

use crate::core::error::Result;
use crate::core::write_syncer::WriteSyncer;
use std::io::Write;

/// Which standard stream a [`ConsoleSink`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

impl ConsoleStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}

/// Writes encoded records to stdout or stderr
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl WriteSyncer for ConsoleSink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().lock().write_all(buf)?,
            ConsoleStream::Stderr => std::io::stderr().lock().write_all(buf)?,
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.stream.as_str()
    }
}
