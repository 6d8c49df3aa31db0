//! JSON-lines backed log store
//!
//! Keeps the full ordered collection in memory and mirrors every append to a
//! `.jsonl` file, one serialized [`LogEntry`] per line. The file is replayed
//! on startup.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

use super::{LogStore, MemoryLogStore};
use crate::error::Result;
use crate::types::{LevelTally, LogEntry, LogLevel, NewLogEntry};

/// Log store persisted to an append-only JSON-lines file
#[derive(Debug)]
pub struct JsonlLogStore {
    path: PathBuf,
    entries: MemoryLogStore,
    file: Mutex<File>,
}

impl JsonlLogStore {
    /// Open (or create) the file at `path` and load its entries
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let loaded = Self::load_entries(&path)?;
        info!(path = %path.display(), entries = loaded.len(), "loaded log file");

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // A torn last line must not absorb the next append
        if !Self::ends_with_newline(&path)? {
            warn!(path = %path.display(), "log file ends mid-line, terminating it");
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        Ok(Self {
            path,
            entries: MemoryLogStore::from_entries(loaded),
            file: Mutex::new(file),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True for an empty file or one whose last byte is `\n`
    fn ends_with_newline(path: &Path) -> Result<bool> {
        let mut file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(true);
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    fn load_entries(path: &Path) -> Result<Vec<LogEntry>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<LogEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(line = line_num + 1, error = %e, "skipping unreadable log line");
                }
            }
        }

        Ok(entries)
    }
}

impl LogStore for JsonlLogStore {
    fn append(&self, candidate: NewLogEntry) -> Result<LogEntry> {
        self.entries.append_with(candidate, |entry| {
            let line = serde_json::to_string(entry)?;
            let mut file = self.file.lock();
            let committed_len = file.metadata()?.len();

            let written = writeln!(file, "{}", line).and_then(|_| file.sync_data());
            if let Err(e) = written {
                // Drop the partial line so the next append starts clean
                if let Err(truncate_err) = file.set_len(committed_len) {
                    warn!(error = %truncate_err, "could not roll back partial log line");
                }
                return Err(e.into());
            }
            Ok(())
        })
    }

    fn all(&self) -> Result<Vec<LogEntry>> {
        self.entries.all()
    }

    fn len(&self) -> Result<usize> {
        self.entries.len()
    }

    fn by_level(&self, level: &LogLevel) -> Result<Vec<LogEntry>> {
        self.entries.by_level(level)
    }

    fn by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        self.entries.by_range(start, end)
    }

    fn since(&self, start: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        self.entries.since(start)
    }

    fn search(&self, query: &str) -> Result<Vec<LogEntry>> {
        self.entries.search(query)
    }

    fn tally(&self) -> Result<LevelTally> {
        self.entries.tally()
    }
}
