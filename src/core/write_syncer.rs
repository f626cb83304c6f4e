//! Write-syncer trait for log output destinations

use super::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// A byte sink that can be flushed to durable storage
pub trait WriteSyncer: Send {
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
    fn sync(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// A sink shared between the cores and the error output
pub type SharedSink = Arc<Mutex<dyn WriteSyncer>>;

/// Wrap a sink so it can be shared
pub fn shared<W: WriteSyncer + 'static>(sink: W) -> SharedSink {
    Arc::new(Mutex::new(sink))
}
