//! Size-rotated file sink
//!
//! The active file always keeps the configured name. When a write would push
//! it past the size limit it is renamed to a timestamped backup
//! (`app-2025-01-08T10-30-45.123.log`) and a fresh file is opened in its place.
//! Backups are then pruned by count and age and optionally gzip-compressed.

use crate::core::error::{LoggerError, Result};
use crate::core::write_syncer::WriteSyncer;
use chrono::{NaiveDateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MEGABYTE: u64 = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";

/// Limits applied to one rotating file
///
/// # Examples
///
/// ```
/// use rust_tee_logger::appenders::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(50)
///     .with_max_age_days(7)
///     .with_max_backups(10)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes(), 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size limit in megabytes; zero means the 100 MB default
    pub max_size_mb: u64,
    /// Backups older than this many days are removed; zero keeps them
    pub max_age_days: u64,
    /// Most backups kept; zero keeps them all
    pub max_backups: usize,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            max_age_days: 0,
            max_backups: 0,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, size: u64) -> Self {
        self.max_size_mb = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Effective size limit in bytes
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        let mb = if self.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size_mb
        };
        mb * MEGABYTE
    }

    fn max_age(&self) -> Option<Duration> {
        (self.max_age_days > 0).then(|| Duration::from_secs(self.max_age_days * 24 * 3600))
    }
}

#[derive(Debug)]
struct Backup {
    path: PathBuf,
    taken: NaiveDateTime,
    compressed: bool,
}

/// File sink rotating on size
///
/// ```no_run
/// use rust_tee_logger::appenders::{RotatingFileSink, RotationPolicy};
///
/// let sink = RotatingFileSink::new("/var/log/app.log", RotationPolicy::new().with_max_backups(5))?;
/// # Ok::<(), rust_tee_logger::LoggerError>(())
/// ```
pub struct RotatingFileSink {
    path: PathBuf,
    name: String,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    size: u64,
}

impl RotatingFileSink {
    /// Open (or create) the file at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let mut sink = Self {
            path,
            name,
            policy,
            writer: None,
            size: 0,
        };
        sink.open_existing_or_new()?;
        Ok(sink)
    }

    fn open_existing_or_new(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LoggerError::sink_open(self.name.clone(), e.to_string()))?;
        let metadata = file
            .metadata()
            .map_err(|e| LoggerError::sink_open(self.name.clone(), e.to_string()))?;

        self.size = metadata.len();
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Bytes in the active file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.size
    }

    fn stem_and_ext(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    fn backup_name(&self, at: NaiveDateTime) -> PathBuf {
        let (stem, ext) = self.stem_and_ext();
        self.path
            .with_file_name(format!("{}-{}{}", stem, at.format(BACKUP_TIME_FORMAT), ext))
    }

    /// Close the active file, move it aside and start a new one
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.name.clone(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let mut at = Utc::now().naive_utc();
            let mut backup = self.backup_name(at);
            // Two rotations within one millisecond would otherwise collide
            while backup.exists() || self.compressed_path(&backup).exists() {
                at += chrono::Duration::milliseconds(1);
                backup = self.backup_name(at);
            }
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.name.clone(),
                    format!("Failed to rename to '{}': {}", backup.display(), e),
                )
            })?;
        }

        self.open_existing_or_new()?;
        self.mill()
    }

    fn compressed_path(&self, backup: &Path) -> PathBuf {
        let mut name = backup.as_os_str().to_owned();
        name.push(COMPRESS_SUFFIX);
        PathBuf::from(name)
    }

    /// Backups of this file, newest first
    fn backups(&self) -> Result<Vec<Backup>> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let (stem, ext) = self.stem_and_ext();
        let prefix = format!("{}-", stem);

        let entries = fs::read_dir(&dir).map_err(|e| {
            LoggerError::io_operation(
                "list log backups",
                format!("Failed to read directory '{}'", dir.display()),
                e,
            )
        })?;

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let (rest, compressed) = match file_name.strip_suffix(COMPRESS_SUFFIX) {
                Some(rest) => (rest, true),
                None => (file_name, false),
            };
            let Some(stamp) = rest
                .strip_prefix(&prefix)
                .and_then(|r| r.strip_suffix(ext.as_str()))
            else {
                continue;
            };
            if let Ok(taken) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
                backups.push(Backup {
                    path: entry.path(),
                    taken,
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.taken.cmp(&a.taken));
        Ok(backups)
    }

    /// Apply the backup-count, age and compression rules
    fn mill(&self) -> Result<()> {
        if self.policy.max_backups == 0 && self.policy.max_age_days == 0 && !self.policy.compress {
            return Ok(());
        }

        let mut backups = self.backups()?;
        let mut remove = Vec::new();

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            remove.extend(backups.split_off(self.policy.max_backups));
        }

        if let Some(max_age) = self.policy.max_age() {
            let cutoff = SystemTime::now()
                .checked_sub(max_age)
                .map(chrono::DateTime::<Utc>::from)
                .map(|t| t.naive_utc());
            if let Some(cutoff) = cutoff {
                let (keep, old): (Vec<_>, Vec<_>) =
                    backups.into_iter().partition(|b| b.taken >= cutoff);
                backups = keep;
                remove.extend(old);
            }
        }

        for backup in &remove {
            if let Err(e) = fs::remove_file(&backup.path) {
                return Err(LoggerError::file_rotation(
                    backup.path.display().to_string(),
                    format!("Failed to remove old backup: {}", e),
                ));
            }
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path, &self.compressed_path(&backup.path))?;
            }
        }
        Ok(())
    }
}

/// Gzip `path` into `gz_path`, removing the original only once the archive is complete
fn compress_file(path: &Path, gz_path: &Path) -> Result<()> {
    let mut temp_name = gz_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary file: {}", temp_path.display()),
            e,
        )
    })?;
    let encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    if let Err(e) = gzip_stream(&mut reader, encoder) {
        let _ = fs::remove_file(&temp_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress '{}'", path.display()),
            e,
        ));
    }

    fs::rename(&temp_path, gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to '{}'", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER ERROR] compressed '{}' but failed to remove the original: {}",
            path.display(),
            e
        );
    }
    Ok(())
}

fn gzip_stream<R: Read, W: Write>(
    reader: &mut R,
    mut encoder: flate2::write::GzEncoder<W>,
) -> std::io::Result<()> {
    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        encoder.write_all(&buffer[..n])?;
    }
    encoder.finish()?.flush()
}

impl WriteSyncer for RotatingFileSink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let length = buf.len() as u64;
        let max = self.policy.max_bytes();
        if length > max {
            return Err(LoggerError::WriteTooLarge { length, max });
        }

        if self.writer.is_none() {
            self.open_existing_or_new()?;
        }
        if self.size + length > max {
            self.rotate()?;
        }

        let writer = match self.writer.as_mut() {
            Some(writer) => writer,
            None => return Err(LoggerError::writer(format!("{} is closed", self.name))),
        };
        // Write through; a record must survive a process that never syncs
        writer
            .write_all(buf)
            .and_then(|()| writer.flush())
            .map_err(|e| LoggerError::io_operation("write log file", self.name.clone(), e))?;
        self.size += length;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_max_bytes_defaults_when_zero() {
        assert_eq!(RotationPolicy::new().with_max_size_mb(0).max_bytes(), 100 * MEGABYTE);
        assert_eq!(RotationPolicy::new().with_max_size_mb(1).max_bytes(), MEGABYTE);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");
        let mut sink = RotatingFileSink::new(&path, RotationPolicy::new()).unwrap();
        sink.write_all(b"hello\n").unwrap();
        sink.sync().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_writes_reach_disk_without_sync() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = RotatingFileSink::new(&path, RotationPolicy::new()).unwrap();
        sink.write_all(b"first\n").unwrap();
        sink.write_all(b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        drop(sink);
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink =
            RotatingFileSink::new(&path, RotationPolicy::new().with_max_size_mb(1)).unwrap();

        let mut line = vec![b'x'; 1023];
        line.push(b'\n');
        for _ in 0..1500 {
            sink.write_all(&line).unwrap();
        }
        sink.sync().unwrap();

        let names = files_in(dir.path());
        assert!(names.len() > 1, "files: {:?}", names);
        assert!(names.contains(&"app.log".to_string()));
        assert!(names.iter().any(|n| n.starts_with("app-") && n.ends_with(".log")));
        assert!(fs::metadata(&path).unwrap().len() <= MEGABYTE);
    }

    #[test]
    fn test_rejects_oversized_write() {
        let dir = tempdir().unwrap();
        let mut sink = RotatingFileSink::new(
            dir.path().join("app.log"),
            RotationPolicy::new().with_max_size_mb(1),
        )
        .unwrap();
        let huge = vec![b'x'; (MEGABYTE + 1) as usize];
        assert!(matches!(
            sink.write_all(&huge),
            Err(LoggerError::WriteTooLarge { .. })
        ));
    }

    #[test]
    fn test_max_backups_prunes_oldest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink =
            RotatingFileSink::new(&path, RotationPolicy::new().with_max_backups(2)).unwrap();

        for i in 0..5 {
            sink.write_all(format!("generation {}\n", i).as_bytes()).unwrap();
            sink.rotate().unwrap();
        }

        let backups: Vec<_> = files_in(dir.path())
            .into_iter()
            .filter(|n| n.starts_with("app-"))
            .collect();
        assert_eq!(backups.len(), 2);
    }

    #[test]
    fn test_compresses_backups() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink =
            RotatingFileSink::new(&path, RotationPolicy::new().with_compression(true)).unwrap();
        sink.write_all(b"to be compressed\n").unwrap();
        sink.rotate().unwrap();

        let names = files_in(dir.path());
        let gz: Vec<_> = names.iter().filter(|n| n.ends_with(".log.gz")).collect();
        assert_eq!(gz.len(), 1, "files: {:?}", names);

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(dir.path().join(gz[0])).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "to be compressed\n");
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();

        let mut sink = RotatingFileSink::new(&path, RotationPolicy::new()).unwrap();
        assert_eq!(sink.current_size(), 4);
        sink.write_all(b"new\n").unwrap();
        sink.sync().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }
}
