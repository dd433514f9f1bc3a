//! CSV-backed application store.
//!
//! Every mutation reads the whole file, changes the in-memory set and
//! rewrites the whole file. Without `lock_writes` two overlapping
//! mutations can lose one of the updates.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::StoreConfig;
use crate::error::{Error, Result};

use super::codec::{decode_line, encode_file};
use super::lock::with_lock;
use super::record::{Listing, NewRecord, Record, RecordPatch};

/// Application store over a single CSV file.
#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Create a store from an explicit configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store for the standard applications file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Make sure the data directory exists and the file has at least a
    /// header. Returns true when the file was created.
    pub fn init(&self) -> Result<bool> {
        if let Some(parent) = self.config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if self.config.path.exists() {
            tracing::info!("Data file found: {}", self.config.path.display());
            return Ok(false);
        }

        std::fs::write(&self.config.path, encode_file(&self.config.header, &[]))?;
        tracing::info!("Created data file with header: {}", self.config.path.display());
        Ok(true)
    }

    /// Read every valid record and the derived total score.
    ///
    /// A missing file reads as empty. Malformed rows are logged and skipped.
    pub fn read_all(&self) -> Result<Listing> {
        let bytes = match std::fs::read(&self.config.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "Data file not found on read, returning empty: {}",
                    self.config.path.display()
                );
                return Ok(Listing::default());
            }
            Err(e) => {
                tracing::error!("Error reading {}: {}", self.config.path.display(), e);
                return Err(e.into());
            }
        };

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "Data file {} contains invalid UTF-8, replacing bad bytes",
                    self.config.path.display()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let lines: Vec<&str> = content.trim().lines().collect();
        if lines.len() <= 1 {
            tracing::debug!("Data file empty or only header on read");
            return Ok(Listing::default());
        }

        let mut records = Vec::with_capacity(lines.len() - 1);
        for (index, line) in lines.iter().enumerate().skip(1) {
            match decode_line(line, self.config.columns) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping line {}: {}: {}", index + 1, e, line);
                }
            }
        }

        let listing = Listing::new(records);
        tracing::info!(
            "Read complete. Found {} valid applications",
            listing.applications.len()
        );
        Ok(listing)
    }

    /// Replace the file with `records`, in order.
    ///
    /// Content goes to a uniquely named sibling temp file first and is
    /// renamed into place, so a reader sees either the old or the new file.
    pub fn write_all(&self, records: &[Record]) -> Result<()> {
        let path = &self.config.path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let content = encode_file(&self.config.header, records);
        let written = NamedTempFile::new_in(dir).and_then(|mut tmp| {
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(path).map_err(|e| e.error)?;
            Ok(())
        });
        written.map_err(|e| {
            tracing::error!("Error writing {}: {}", path.display(), e);
            Error::Io(e)
        })?;

        tracing::info!("Write complete. Saved {} applications", records.len());
        Ok(())
    }

    /// Validate and append a new record.
    pub fn create(&self, input: NewRecord) -> Result<Record> {
        let record = input.into_record()?;

        self.cycle(|| {
            let mut records = self.read_all()?.applications;

            if self.config.enforce_unique_ids && records.iter().any(|r| r.id == record.id) {
                tracing::warn!("Create rejected: application {} already exists", record.id);
                return Err(Error::Conflict(format!(
                    "application {} already exists",
                    record.id
                )));
            }

            records.push(record.clone());
            self.write_all(&records)?;
            tracing::debug!("Created application {}", record.id);
            Ok(record)
        })
    }

    /// Merge `patch` over every record with `id` and return the merged record.
    pub fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record> {
        patch.validate(id)?;

        self.cycle(|| {
            let records = self.read_all()?.applications;
            let mut updated: Option<Record> = None;

            let records: Vec<Record> = records
                .into_iter()
                .map(|r| {
                    if r.id != id {
                        return r;
                    }
                    let merged = patch.apply(&r);
                    updated.get_or_insert_with(|| merged.clone());
                    merged
                })
                .collect();

            let Some(updated) = updated else {
                tracing::warn!("Update failed: application {} not found", id);
                return Err(Error::NotFound(format!("application {}", id)));
            };

            self.write_all(&records)?;
            tracing::debug!("Updated application {}", id);
            Ok(updated)
        })
    }

    /// Remove every record with `id`.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.cycle(|| {
            let mut records = self.read_all()?.applications;
            let before = records.len();
            records.retain(|r| r.id != id);

            if records.len() == before {
                tracing::warn!("Delete failed: application {} not found", id);
                return Err(Error::NotFound(format!("application {}", id)));
            }

            self.write_all(&records)?;
            tracing::debug!("Deleted {} row(s) for application {}", before - records.len(), id);
            Ok(())
        })
    }

    /// Raw file contents, byte for byte.
    pub fn export(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.config.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::NotFound(format!("data file {}", self.config.path.display()))
            }
            _ => Error::Io(e),
        })
    }

    /// Run one read-modify-write cycle, under the lock file when enabled.
    fn cycle<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if self.config.lock_writes {
            with_lock(&self.config.path, f)
        } else {
            f()
        }
    }
}
