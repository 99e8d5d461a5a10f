//! Data model for the lot inventory tables.
//!
//! Field names serialize to the column headers of the data file, so the
//! on-disk tables read like the spreadsheet they replace.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Timestamp format used throughout the data file (`2026-08-24 14:03:07`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, truncated to whole seconds so it round-trips through
/// [`TIMESTAMP_FORMAT`] unchanged.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// One inventory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lot {
    /// Product name.
    pub name: String,
    /// Unit price, never negative.
    pub price: f64,
    /// Free-form description, possibly empty.
    pub description: String,
    /// Unique code of the form `L` + zero-padded integer.
    pub code: String,
    /// When the record was created.
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl Lot {
    /// Build a record from validated draft fields plus an assigned code.
    pub fn from_draft(draft: LotDraft, code: String, created_at: NaiveDateTime) -> Self {
        Self {
            name: draft.name,
            price: draft.price,
            description: draft.description,
            code,
            created_at,
        }
    }
}

/// User-entered fields of a lot, before a code and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct LotDraft {
    /// Product name, required.
    pub name: String,
    /// Unit price, must be non-negative.
    pub price: f64,
    /// Free-form description.
    pub description: String,
}

impl LotDraft {
    /// Create a draft, trimming surrounding whitespace from the text fields.
    pub fn new(name: impl Into<String>, price: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            price,
            description: description.into().trim().to_string(),
        }
    }

    /// Check the draft against the input rules: non-empty name, finite
    /// non-negative price.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::EmptyName);
        }
        if !self.price.is_finite() {
            return Err(Error::InvalidPrice(self.price.to_string()));
        }
        if self.price < 0.0 {
            return Err(Error::NegativePrice(self.price));
        }
        Ok(())
    }
}

/// Parse a price entered as text.
///
/// Accepts a comma as the decimal separator (`"10,50"`) since the form
/// historically did.
pub fn parse_price(input: &str) -> Result<f64, Error> {
    let normalized = input.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| Error::InvalidPrice(input.trim().to_string()))
}

/// Render a price the way it appears in tables and the change log.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Kind of mutation recorded in the change log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    /// A new lot was added.
    Insert,
    /// A field of an existing lot was changed.
    Edit,
    /// A lot was removed; the entry snapshots its final state.
    Delete,
    /// A new lot was added by duplicating an existing one.
    DuplicateInsert,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Insert => write!(f, "Insert"),
            ChangeAction::Edit => write!(f, "Edit"),
            ChangeAction::Delete => write!(f, "Delete"),
            ChangeAction::DuplicateInsert => write!(f, "DuplicateInsert"),
        }
    }
}

/// One row of the append-only change log.
///
/// Entries are never edited or removed once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeEntry {
    /// When the mutation happened.
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    /// Code of the lot the mutation applied to.
    pub code: String,
    /// What kind of mutation this was.
    pub action: ChangeAction,
    /// Affected field name; empty for whole-record actions, `All` for delete.
    pub field: String,
    /// Value before the mutation.
    pub old_value: String,
    /// Value after the mutation.
    pub new_value: String,
}

/// Derived aggregates over the lot table.
///
/// Recomputed from the records on demand, never updated incrementally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Summary {
    /// Number of lots in the table.
    #[serde(rename = "TotalRecords")]
    pub total_lots: usize,
    /// Sum of all prices, 0 when the table is empty.
    pub price_sum: f64,
    /// Code of the last record in table order, empty when the table is empty.
    pub last_code: String,
    /// Most recent creation timestamp, `None` when the table is empty.
    #[serde(with = "opt_timestamp")]
    pub last_created_at: Option<NaiveDateTime>,
}

/// Serde adapter storing timestamps in [`TIMESTAMP_FORMAT`].
mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(de)?;
        NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Like [`timestamp`], with the empty string standing in for "no value".
mod opt_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(
        dt: &Option<NaiveDateTime>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => ser.serialize_str(&dt.format(TIMESTAMP_FORMAT).to_string()),
            None => ser.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let text = String::deserialize(de)?;
        if text.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
