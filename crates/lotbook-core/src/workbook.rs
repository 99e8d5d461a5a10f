//! Workbook orchestration: record operations wired to the file store.
//!
//! Every mutation runs the same sequence: validate and mutate in memory,
//! recompute the summary, save the three tables, then snapshot a backup.
//! A save failure is surfaced to the caller and the in-memory tables remain
//! the source of truth until the next successful save; a backup failure after
//! a successful save is only a warning.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::book::LotBook;
use crate::error::Error;
use crate::model::{ChangeEntry, Lot, LotDraft, Summary};
use crate::store::{Store, Tables};
use crate::summary;

/// A lot book bound to its data file.
#[derive(Debug)]
pub struct Workbook {
    store: Store,
    book: LotBook,
}

impl Workbook {
    /// Open the data file at `path`, starting empty if it is missing or
    /// unreadable (reported via the log, not an error).
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Store::new(path);
        let tables = store.load_or_default();
        Self {
            book: LotBook::new(tables.lots, tables.history),
            store,
        }
    }

    /// Path of the backing data file.
    pub fn data_path(&self) -> &Path {
        self.store.path()
    }

    /// Lots in table order.
    pub fn lots(&self) -> &[Lot] {
        self.book.lots()
    }

    /// Change log in append order.
    pub fn history(&self) -> &[ChangeEntry] {
        self.book.history()
    }

    /// Look up a lot by code.
    pub fn get(&self, code: &str) -> Option<&Lot> {
        self.book.get(code)
    }

    /// Code the next added lot will receive (for the read-only form display).
    pub fn next_code(&self) -> String {
        self.book.next_code()
    }

    /// Case-insensitive substring search over name and code.
    pub fn search(&self, term: &str) -> Vec<&Lot> {
        self.book.search(term)
    }

    /// Current aggregates, recomputed on demand.
    pub fn summary(&self) -> Summary {
        summary::recompute(self.book.lots())
    }

    /// Add a lot and persist.
    pub fn add(&mut self, draft: LotDraft, allow_duplicate_name: bool) -> Result<Lot, Error> {
        let lot = self.book.add(draft, allow_duplicate_name)?;
        self.persist()?;
        info!(code = %lot.code, name = %lot.name, "lot added");
        Ok(lot)
    }

    /// Edit a lot and persist; returns the number of changed fields.
    ///
    /// Persists even when nothing changed, as long as the code was found and
    /// the inputs validated.
    pub fn edit(&mut self, code: &str, draft: LotDraft) -> Result<usize, Error> {
        let changed = self.book.edit(code, draft)?;
        self.persist()?;
        info!(code, changed_fields = changed, "lot edited");
        Ok(changed)
    }

    /// Delete a lot and persist; returns the removed record.
    pub fn delete(&mut self, code: &str) -> Result<Lot, Error> {
        let removed = self.book.delete(code)?;
        self.persist()?;
        info!(code, "lot deleted");
        Ok(removed)
    }

    /// Duplicate a lot under a fresh code and persist.
    pub fn duplicate(
        &mut self,
        source_code: &str,
        draft: LotDraft,
        allow_duplicate_name: bool,
    ) -> Result<Lot, Error> {
        let lot = self.book.duplicate(source_code, draft, allow_duplicate_name)?;
        self.persist()?;
        info!(source = source_code, code = %lot.code, "lot duplicated");
        Ok(lot)
    }

    /// Final save-and-backup, run when the session ends.
    pub fn close(&mut self) -> Result<(), Error> {
        self.persist()
    }

    fn persist(&mut self) -> Result<(), Error> {
        let tables = Tables {
            lots: self.book.lots().to_vec(),
            history: self.book.history().to_vec(),
            summary: summary::recompute(self.book.lots()),
        };
        self.store.save(&tables)?;
        if let Err(e) = self.store.backup() {
            warn!(error = %e, "backup failed; the save itself succeeded");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let book = Workbook::open(dir.path().join("lots.json"));
        assert!(book.lots().is_empty());
        assert!(book.history().is_empty());
        assert_eq!(book.next_code(), "L001");
    }

    #[test]
    fn test_mutations_persist_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lots.json");

        let mut book = Workbook::open(&path);
        book.add(LotDraft::new("Widget", 10.5, ""), false).unwrap();
        assert!(path.exists());

        // A fresh workbook sees the saved state.
        let reopened = Workbook::open(&path);
        assert_eq!(reopened.lots().len(), 1);
        assert_eq!(reopened.lots()[0].code, "L001");
        assert_eq!(reopened.history().len(), 1);
    }
}
