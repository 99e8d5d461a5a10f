//! File store for the three inventory tables.
//!
//! The data file is a single pretty-printed JSON document with three named
//! tables, mirroring the sheets of the spreadsheet it replaces:
//!
//! ```json
//! {
//!   "Lots": [ ... ],
//!   "History": [ ... ],
//!   "Summary": { ... }
//! }
//! ```
//!
//! Saves go through a sibling temp file and a rename, so the on-disk document
//! is always either the previous state or the complete new one. After every
//! successful save the caller may snapshot the file to a timestamped backup.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::model::{ChangeEntry, Lot, Summary};

/// Default data file name, next to the current directory.
pub const DEFAULT_DATA_FILE: &str = "lots.json";

/// Timestamp embedded in backup file names.
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// The three persisted tables as one consistent snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    /// Lot records in table order.
    #[serde(rename = "Lots", default)]
    pub lots: Vec<Lot>,
    /// Append-only change log.
    #[serde(rename = "History", default)]
    pub history: Vec<ChangeEntry>,
    /// Derived aggregates as of the last save.
    #[serde(rename = "Summary", default)]
    pub summary: Summary,
}

/// Loads and saves the data file, and snapshots it to backups.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Store backed by the given data file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all three tables from the data file.
    ///
    /// A table missing from the document defaults to empty rather than
    /// failing the load; a missing or unreadable file is an error the caller
    /// may downgrade (see [`load_or_default`](Self::load_or_default)).
    pub fn load(&self) -> Result<Tables, Error> {
        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read the tables, falling back to empty ones on any failure.
    ///
    /// A file that simply does not exist yet is the normal first run; any
    /// other failure is reported as a warning before the fallback.
    pub fn load_or_default(&self) -> Tables {
        match self.load() {
            Ok(tables) => tables,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "data file not found, starting empty");
                Tables::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load data file, starting empty");
                Tables::default()
            }
        }
    }

    /// Write all three tables to the data file.
    ///
    /// The document is written to a temp file next to the target and renamed
    /// over it; on failure the previous on-disk state is left untouched.
    pub fn save(&self, tables: &Tables) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(tables)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, &json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(
            path = %self.path.display(),
            lots = tables.lots.len(),
            history = tables.history.len(),
            "data file saved"
        );
        Ok(())
    }

    /// Copy the data file to a timestamped backup next to it.
    ///
    /// Returns the backup path. Meant to run right after a successful save;
    /// callers treat failure as a warning since the save itself already
    /// succeeded.
    pub fn backup(&self) -> Result<PathBuf, Error> {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("lots");
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup = self
            .path
            .with_file_name(format!("{stem}_backup_{timestamp}.json"));
        fs::copy(&self.path, &backup)?;
        debug!(path = %backup.display(), "backup written");
        Ok(backup)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(OsString::from(".tmp"));
        PathBuf::from(name)
    }
}
