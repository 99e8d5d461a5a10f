//! In-memory record operations over the lot and change-log tables.
//!
//! [`LotBook`] owns the two mutable tables and implements add, edit, delete,
//! duplicate, and search. Every mutation appends to the change log before it
//! returns; nothing here touches the filesystem. Persistence is the
//! workbook's job.

use crate::codes;
use crate::error::Error;
use crate::model::{format_price, now, ChangeAction, ChangeEntry, Lot, LotDraft};

/// Change-log field marker for whole-record deletion.
pub const FIELD_ALL: &str = "All";

/// The lot table plus its append-only change log.
#[derive(Debug, Default)]
pub struct LotBook {
    lots: Vec<Lot>,
    history: Vec<ChangeEntry>,
}

impl LotBook {
    /// Wrap previously loaded tables.
    pub fn new(lots: Vec<Lot>, history: Vec<ChangeEntry>) -> Self {
        Self { lots, history }
    }

    /// Lots in table order.
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Change log in append order.
    pub fn history(&self) -> &[ChangeEntry] {
        &self.history
    }

    /// Look up a lot by code.
    pub fn get(&self, code: &str) -> Option<&Lot> {
        self.lots.iter().find(|lot| lot.code == code)
    }

    /// Whether any lot already carries this exact name.
    pub fn name_exists(&self, name: &str) -> bool {
        self.lots.iter().any(|lot| lot.name == name)
    }

    /// Code the next added lot will receive.
    ///
    /// Considers the change log as well as the live table, so the code of a
    /// deleted lot is never handed out again within one file.
    pub fn next_code(&self) -> String {
        codes::next_code_from(
            self.lots
                .iter()
                .map(|lot| lot.code.as_str())
                .chain(self.history.iter().map(|entry| entry.code.as_str())),
        )
    }

    /// Add a new lot from the draft.
    ///
    /// Validates the draft, assigns the next sequential code, and appends one
    /// `Insert` change entry. With `allow_duplicate_name` unset, a name
    /// collision returns [`Error::DuplicateName`] so the caller can confirm
    /// with the user and retry. Returns the stored record.
    pub fn add(&mut self, draft: LotDraft, allow_duplicate_name: bool) -> Result<Lot, Error> {
        let code = self.next_code();
        self.insert(draft, code, ChangeAction::Insert, allow_duplicate_name)
    }

    /// Change the fields of an existing lot to match the draft.
    ///
    /// Appends one `Edit` change entry per field whose value actually
    /// differs; unchanged fields are not logged. Returns the number of
    /// changed fields; zero is still success, and callers persist either
    /// way.
    pub fn edit(&mut self, code: &str, draft: LotDraft) -> Result<usize, Error> {
        draft.validate()?;
        let idx = self
            .position(code)
            .ok_or_else(|| Error::CodeNotFound(code.to_string()))?;

        let mut changed = 0;
        let current = &self.lots[idx];
        let mut pending = Vec::new();
        if current.name != draft.name {
            pending.push(("Name", current.name.clone(), draft.name.clone()));
        }
        if current.price != draft.price {
            pending.push(("Price", format_price(current.price), format_price(draft.price)));
        }
        if current.description != draft.description {
            pending.push((
                "Description",
                current.description.clone(),
                draft.description.clone(),
            ));
        }

        for (field, old, new) in pending {
            self.record(code, ChangeAction::Edit, field, old, new);
            changed += 1;
        }

        let lot = &mut self.lots[idx];
        lot.name = draft.name;
        lot.price = draft.price;
        lot.description = draft.description;
        Ok(changed)
    }

    /// Remove a lot.
    ///
    /// The `Delete` change entry snapshots the full record before it is
    /// removed, so the log alone can reconstruct what was lost. Returns the
    /// removed record.
    pub fn delete(&mut self, code: &str) -> Result<Lot, Error> {
        let idx = self
            .position(code)
            .ok_or_else(|| Error::CodeNotFound(code.to_string()))?;
        let snapshot = serde_json::to_string(&self.lots[idx])?;
        self.record(code, ChangeAction::Delete, FIELD_ALL, snapshot, String::new());
        Ok(self.lots.remove(idx))
    }

    /// Add a new lot based on an existing one.
    ///
    /// The draft usually starts as a copy of the source record's fields (see
    /// [`get`](Self::get)) but may have been adjusted by the user. Validation
    /// and name-collision handling match [`add`](Self::add); the fresh code
    /// necessarily differs from the source's. Logged as `DuplicateInsert`.
    pub fn duplicate(
        &mut self,
        source_code: &str,
        draft: LotDraft,
        allow_duplicate_name: bool,
    ) -> Result<Lot, Error> {
        if self.position(source_code).is_none() {
            return Err(Error::CodeNotFound(source_code.to_string()));
        }
        let code = self.next_code();
        self.insert(draft, code, ChangeAction::DuplicateInsert, allow_duplicate_name)
    }

    /// Case-insensitive substring search over name and code.
    ///
    /// An empty term matches everything; results keep table order. Read-only,
    /// never logged.
    pub fn search(&self, term: &str) -> Vec<&Lot> {
        let term = term.trim().to_lowercase();
        self.lots
            .iter()
            .filter(|lot| {
                term.is_empty()
                    || lot.name.to_lowercase().contains(&term)
                    || lot.code.to_lowercase().contains(&term)
            })
            .collect()
    }

    fn position(&self, code: &str) -> Option<usize> {
        self.lots.iter().position(|lot| lot.code == code)
    }

    fn insert(
        &mut self,
        draft: LotDraft,
        code: String,
        action: ChangeAction,
        allow_duplicate_name: bool,
    ) -> Result<Lot, Error> {
        draft.validate()?;
        if self.position(&code).is_some() {
            return Err(Error::DuplicateCode(code));
        }
        if !allow_duplicate_name && self.name_exists(&draft.name) {
            return Err(Error::DuplicateName(draft.name));
        }

        let lot = Lot::from_draft(draft, code, now());
        self.record(&lot.code, action, "", String::new(), String::new());
        self.lots.push(lot.clone());
        Ok(lot)
    }

    fn record(
        &mut self,
        code: &str,
        action: ChangeAction,
        field: &str,
        old_value: String,
        new_value: String,
    ) {
        self.history.push(ChangeEntry {
            timestamp: now(),
            code: code.to_string(),
            action,
            field: field.to_string(),
            old_value,
            new_value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, price: f64) -> LotDraft {
        LotDraft::new(name, price, "")
    }

    #[test]
    fn test_add_assigns_code_and_logs_insert() {
        let mut book = LotBook::default();
        let lot = book.add(draft("Widget", 10.5), false).unwrap();

        assert_eq!(lot.code, "L001");
        assert_eq!(book.lots().len(), 1);
        assert_eq!(book.history().len(), 1);

        let entry = &book.history()[0];
        assert_eq!(entry.action, ChangeAction::Insert);
        assert_eq!(entry.code, "L001");
        assert_eq!(entry.field, "");
    }

    #[test]
    fn test_add_rejects_invalid_drafts_without_mutation() {
        let mut book = LotBook::default();
        assert!(matches!(book.add(draft("", 1.0), false), Err(Error::EmptyName)));
        assert!(matches!(
            book.add(draft("Widget", -1.0), false),
            Err(Error::NegativePrice(_))
        ));
        assert!(book.lots().is_empty());
        assert!(book.history().is_empty());
    }

    #[test]
    fn test_add_duplicate_name_soft_blocks_until_confirmed() {
        let mut book = LotBook::default();
        book.add(draft("Widget", 1.0), false).unwrap();

        let err = book.add(draft("Widget", 2.0), false).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
        assert!(err.is_confirmable());
        assert_eq!(book.lots().len(), 1);

        // Confirmed retry goes through with a fresh code.
        let lot = book.add(draft("Widget", 2.0), true).unwrap();
        assert_eq!(lot.code, "L002");
        assert_eq!(book.lots().len(), 2);
    }

    #[test]
    fn test_edit_logs_only_changed_fields() {
        let mut book = LotBook::default();
        book.add(LotDraft::new("Widget", 10.5, "blue"), false).unwrap();

        let changed = book
            .edit("L001", LotDraft::new("Widget", 12.0, "blue"))
            .unwrap();
        assert_eq!(changed, 1);

        // One insert entry plus exactly one edit entry.
        assert_eq!(book.history().len(), 2);
        let entry = &book.history()[1];
        assert_eq!(entry.action, ChangeAction::Edit);
        assert_eq!(entry.field, "Price");
        assert_eq!(entry.old_value, "10.50");
        assert_eq!(entry.new_value, "12.00");

        assert_eq!(book.get("L001").unwrap().price, 12.0);
    }

    #[test]
    fn test_edit_with_no_changes_succeeds_quietly() {
        let mut book = LotBook::default();
        book.add(LotDraft::new("Widget", 10.5, "blue"), false).unwrap();

        let changed = book
            .edit("L001", LotDraft::new("Widget", 10.5, "blue"))
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(book.history().len(), 1);
    }

    #[test]
    fn test_edit_unknown_code_fails() {
        let mut book = LotBook::default();
        assert!(matches!(
            book.edit("L009", draft("Widget", 1.0)),
            Err(Error::CodeNotFound(_))
        ));
    }

    #[test]
    fn test_delete_snapshots_record_before_removal() {
        let mut book = LotBook::default();
        book.add(LotDraft::new("Widget", 10.5, "blue"), false).unwrap();

        let removed = book.delete("L001").unwrap();
        assert_eq!(removed.code, "L001");
        assert!(book.lots().is_empty());

        let entry = book.history().last().unwrap();
        assert_eq!(entry.action, ChangeAction::Delete);
        assert_eq!(entry.field, FIELD_ALL);
        assert_eq!(entry.new_value, "");
        // The snapshot is the full serialized record.
        let snapshot: Lot = serde_json::from_str(&entry.old_value).unwrap();
        assert_eq!(snapshot, removed);
    }

    #[test]
    fn test_delete_unknown_code_has_no_side_effects() {
        let mut book = LotBook::default();
        book.add(draft("Widget", 1.0), false).unwrap();

        assert!(matches!(book.delete("L999"), Err(Error::CodeNotFound(_))));
        assert_eq!(book.lots().len(), 1);
        assert_eq!(book.history().len(), 1);
    }

    #[test]
    fn test_deleted_codes_are_never_reissued() {
        let mut book = LotBook::default();
        book.add(draft("Widget", 1.0), false).unwrap();
        book.add(draft("Gadget", 2.0), false).unwrap();
        book.delete("L002").unwrap();

        // L002 was the highest live code, but it still appears in the change
        // log, so the next add must keep counting.
        let lot = book.add(draft("Gizmo", 3.0), false).unwrap();
        assert_eq!(lot.code, "L003");
    }

    #[test]
    fn test_duplicate_copies_fields_under_fresh_code() {
        let mut book = LotBook::default();
        book.add(LotDraft::new("Widget", 10.5, "blue"), false).unwrap();

        let source = book.get("L001").unwrap().clone();
        let copy = book
            .duplicate(
                "L001",
                LotDraft::new(source.name.clone(), source.price, source.description.clone()),
                true,
            )
            .unwrap();

        assert_ne!(copy.code, "L001");
        assert_eq!(copy.code, "L002");
        assert_eq!(copy.name, source.name);
        assert_eq!(copy.price, source.price);
        assert_eq!(copy.description, source.description);

        let entry = book.history().last().unwrap();
        assert_eq!(entry.action, ChangeAction::DuplicateInsert);
        assert_eq!(entry.code, "L002");
    }

    #[test]
    fn test_duplicate_unknown_source_fails() {
        let mut book = LotBook::default();
        assert!(matches!(
            book.duplicate("L404", draft("Widget", 1.0), true),
            Err(Error::CodeNotFound(_))
        ));
    }

    #[test]
    fn test_search_matches_name_and_code_case_insensitively() {
        let mut book = LotBook::default();
        book.add(draft("Blue Widget", 1.0), false).unwrap();
        book.add(draft("Red Gadget", 2.0), false).unwrap();

        let hits = book.search("widget");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "L001");

        let hits = book.search("l002");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Red Gadget");
    }

    #[test]
    fn test_search_empty_term_returns_all_in_order() {
        let mut book = LotBook::default();
        book.add(draft("Blue Widget", 1.0), false).unwrap();
        book.add(draft("Red Gadget", 2.0), false).unwrap();

        let hits = book.search("");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].code, "L001");
        assert_eq!(hits[1].code, "L002");

        assert!(book.search("no such thing").is_empty());
        // Searching never writes to the log.
        assert_eq!(book.history().len(), 2);
    }
}
