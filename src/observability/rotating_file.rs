//! Size-rotated log file with age and count retention.
//!
//! # Responsibilities
//! - Append log records to a single active file
//! - Start a new segment once the active file would exceed `max_size`
//! - Remove segments older than `max_age` and beyond `max_backups`
//!
//! # Design Decisions
//! - Rotated segments are named `<stem>-<UTC timestamp>.<ext>` next to the
//!   active file, so ordering and age come from the name, not file metadata
//! - Write errors never reach the caller: the record is dropped, a single
//!   warning goes to stderr, and the next write retries the file
//! - Zero `max_age` or `max_backups` disables that retention rule
//! - Retention also runs whenever the active file is opened, so segments
//!   left by earlier runs expire even if the size ceiling is never reached

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp layout embedded in rotated file names.
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Rotation and retention limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size ceiling of the active file, in bytes.
    pub max_size: u64,
    /// Rotated files older than this are deleted.
    pub max_age: Duration,
    /// Number of rotated files kept.
    pub max_backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: 10 * 1024 * 1024,
            max_age: Duration::from_secs(7 * 24 * 60 * 60),
            max_backups: 3,
        }
    }
}

/// A `Write` sink that rotates its target file by size.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    file: Option<File>,
    size: u64,
    warned: bool,
}

impl RotatingFile {
    /// Create a sink for `path`. The file is opened on first write.
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            file: None,
            size: 0,
            warned: false,
        }
    }

    /// Path of the active file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotated segments, newest first.
    pub fn backups(&self) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .list_backups()?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    fn open(&mut self) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.file.is_none() {
            self.open()?;
            if let Err(err) = self.prune(Utc::now()) {
                self.warn_once(&err);
            }
        }

        let len = buf.len() as u64;
        if self.size > 0 && self.size + len > self.policy.max_size {
            self.rotate()?;
        }

        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
            self.size += len;
        }
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        // Close before rename.
        self.file = None;

        let now = Utc::now();
        if self.path.exists() {
            let backup = self.backup_path(now)?;
            fs::rename(&self.path, backup)?;
        }
        self.open()?;
        self.prune(now)
    }

    /// Name for the next segment. Stamps only move forward, so name order
    /// stays rotation order even when several rotations share a millisecond.
    fn backup_path(&self, now: DateTime<Utc>) -> io::Result<PathBuf> {
        let (stem, ext) = self.name_parts();
        let dir = self.dir();

        let mut stamp = now;
        if let Some((newest, _)) = self.list_backups()?.first() {
            if stamp <= *newest {
                stamp = *newest + chrono::Duration::milliseconds(1);
            }
        }

        loop {
            let candidate = dir.join(format!("{stem}-{}{ext}", stamp.format(BACKUP_TIME_FORMAT)));
            if !candidate.exists() {
                return Ok(candidate);
            }
            stamp += chrono::Duration::milliseconds(1);
        }
    }

    fn prune(&self, now: DateTime<Utc>) -> io::Result<()> {
        let cutoff = if self.policy.max_age.is_zero() {
            None
        } else {
            chrono::Duration::from_std(self.policy.max_age)
                .ok()
                .and_then(|age| now.checked_sub_signed(age))
        };

        for (index, (stamp, path)) in self.list_backups()?.into_iter().enumerate() {
            let over_count = self.policy.max_backups > 0 && index >= self.policy.max_backups;
            let too_old = cutoff.is_some_and(|cutoff| stamp < cutoff);
            if over_count || too_old {
                match fs::remove_file(&path) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn list_backups(&self) -> io::Result<Vec<(DateTime<Utc>, PathBuf)>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{stem}-");

        let mut backups = Vec::new();
        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stamp) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(ext.as_str()))
            else {
                continue;
            };
            if let Ok(stamp) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
                backups.push((stamp.and_utc(), entry.path()));
            }
        }

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups)
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    fn warn_once(&mut self, err: &io::Error) {
        if !self.warned {
            self.warned = true;
            eprintln!(
                "log file {} unavailable, records are dropped: {}",
                self.path.display(),
                err
            );
        }
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Err(err) = self.write_record(buf) {
            self.file = None;
            self.warn_once(&err);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            if let Err(err) = file.flush() {
                self.file = None;
                self.warn_once(&err);
            }
        }
        Ok(())
    }
}
