//! Sink implementations

pub mod console;
pub mod multi;
pub mod rotating_file;

pub use console::{ConsoleSink, ConsoleStream};
pub use multi::{build_write_syncer, Destination, MultiSink};
pub use rotating_file::{RotatingFileSink, RotationPolicy};

// Re-export the sink trait next to its implementations
pub use crate::core::WriteSyncer;
