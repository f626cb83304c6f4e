//! Destination parsing and fan-out sink assembly

use super::console::{ConsoleSink, ConsoleStream};
use super::rotating_file::{RotatingFileSink, RotationPolicy};
use crate::core::error::{LoggerError, Result};
use crate::core::write_syncer::{shared, SharedSink, WriteSyncer};
use std::fmt;
use std::path::PathBuf;

/// Where one configured output path points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console(ConsoleStream),
    File(PathBuf),
}

impl Destination {
    /// `"stdout"` and `"stderr"` are reserved; anything else is a file path
    pub fn parse(s: &str) -> Self {
        match s {
            "stdout" => Destination::Console(ConsoleStream::Stdout),
            "stderr" => Destination::Console(ConsoleStream::Stderr),
            path => Destination::File(PathBuf::from(path)),
        }
    }

    fn open(&self, policy: &RotationPolicy) -> Result<Box<dyn WriteSyncer>> {
        match self {
            Destination::Console(stream) => Ok(Box::new(ConsoleSink::new(*stream))),
            Destination::File(path) => {
                let sink = RotatingFileSink::new(path, policy.clone()).map_err(|e| {
                    LoggerError::sink_open(path.display().to_string(), e.to_string())
                })?;
                Ok(Box::new(sink))
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Console(stream) => write!(f, "{}", stream.as_str()),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes the same bytes to every member
///
/// Every member is attempted even when an earlier one fails.
pub struct MultiSink {
    sinks: Vec<Box<dyn WriteSyncer>>,
    name: String,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn WriteSyncer>>) -> Self {
        let name = sinks.iter().map(|s| s.name()).collect::<Vec<_>>().join(",");
        Self { sinks, name }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn each<F>(&mut self, mut op: F) -> Result<()>
    where
        F: FnMut(&mut dyn WriteSyncer) -> Result<()>,
    {
        let errors: Vec<LoggerError> = self
            .sinks
            .iter_mut()
            .filter_map(|s| op(s.as_mut()).err())
            .collect();
        match errors.len() {
            0 => Ok(()),
            _ => Err(LoggerError::writer(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }
}

impl WriteSyncer for MultiSink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.each(|s| s.write_all(buf))
    }

    fn sync(&mut self) -> Result<()> {
        self.each(|s| s.sync())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Open every destination and combine them into one sink
///
/// All or nothing: if any path fails, everything opened so far is closed
/// again and the collected failures come back as one [`LoggerError::BuildSinks`].
pub fn build_write_syncer<S: AsRef<str>>(paths: &[S], policy: &RotationPolicy) -> Result<SharedSink> {
    let mut opened = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for path in paths {
        match Destination::parse(path.as_ref()).open(policy) {
            Ok(sink) => opened.push(sink),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        drop(opened);
        return Err(LoggerError::BuildSinks(errors));
    }
    Ok(shared(MultiSink::new(opened)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_destination_parse() {
        assert_eq!(Destination::parse("stdout"), Destination::Console(ConsoleStream::Stdout));
        assert_eq!(Destination::parse("stderr"), Destination::Console(ConsoleStream::Stderr));
        assert_eq!(
            Destination::parse("/tmp/app.log"),
            Destination::File(PathBuf::from("/tmp/app.log"))
        );
        assert_eq!(Destination::parse("STDOUT").to_string(), "STDOUT");
    }

    #[test]
    fn test_fan_out_writes_every_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.log");
        let b = dir.path().join("b.log");
        let paths = vec![a.display().to_string(), b.display().to_string()];

        let sink = build_write_syncer(&paths, &RotationPolicy::new()).unwrap();
        {
            let mut sink = sink.lock();
            sink.write_all(b"same line\n").unwrap();
            sink.sync().unwrap();
        }

        assert_eq!(std::fs::read_to_string(&a).unwrap(), "same line\n");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "same line\n");
    }

    #[test]
    fn test_any_failure_fails_whole_build() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let good = dir.path().join("good.log").display().to_string();
        let bad = blocker.join("app.log").display().to_string();
        let err = build_write_syncer(&[good, "stdout".to_string(), bad], &RotationPolicy::new())
            .err()
            .unwrap();

        match err {
            LoggerError::BuildSinks(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_path_list_builds_silent_sink() {
        let sink = build_write_syncer::<&str>(&[], &RotationPolicy::new()).unwrap();
        assert!(sink.lock().write_all(b"dropped\n").is_ok());
    }
}
