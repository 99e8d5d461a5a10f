//! Lotbook core: lot inventory tables, change log, and file store.
//!
//! A single-user inventory of "lots" (products) kept in three tables: the
//! records themselves, an append-only change log of every mutation, and a
//! derived summary. All three are persisted together in one JSON data file,
//! with a timestamped backup copy written after every save.

pub mod book;
pub mod codes;
pub mod error;
pub mod model;
pub mod store;
pub mod summary;
pub mod workbook;

pub use book::LotBook;
pub use codes::next_code;
pub use error::Error;
pub use model::{
    format_price, parse_price, ChangeAction, ChangeEntry, Lot, LotDraft, Summary,
    TIMESTAMP_FORMAT,
};
pub use store::{Store, Tables, DEFAULT_DATA_FILE};
pub use summary::recompute;
pub use workbook::Workbook;
