//! Sequential lot code generation.
//!
//! Codes look like `L001`, `L002`, ... The generator scans the existing table
//! for the highest conforming suffix and returns the next one; codes that do
//! not match the `L` + digits pattern are ignored rather than counted.

use crate::model::Lot;

/// Prefix every generated code starts with.
pub const CODE_PREFIX: char = 'L';

/// Minimum number of digits in the numeric suffix.
const CODE_WIDTH: usize = 3;

/// Next free code for the given table.
///
/// Deterministic and side-effect free: the same table always yields the same
/// code. An empty table yields `L001`.
pub fn next_code(lots: &[Lot]) -> String {
    next_code_from(lots.iter().map(|lot| lot.code.as_str()))
}

/// Next free code following the highest conforming code in the iterator.
///
/// Callers that must not reissue the codes of deleted records feed the
/// change-log codes in as well.
pub fn next_code_from<'a>(codes: impl Iterator<Item = &'a str>) -> String {
    let max = codes.filter_map(code_number).max();
    format_code(max.map_or(1, |n| n + 1))
}

/// Numeric suffix of a conforming code, `None` for anything else.
pub fn code_number(code: &str) -> Option<u64> {
    let digits = code.strip_prefix(CODE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn format_code(n: u64) -> String {
    format!("{}{:0width$}", CODE_PREFIX, n, width = CODE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{now, LotDraft};

    fn lot(code: &str) -> Lot {
        Lot::from_draft(LotDraft::new("Widget", 1.0, ""), code.to_string(), now())
    }

    #[test]
    fn test_empty_table_starts_at_l001() {
        assert_eq!(next_code(&[]), "L001");
    }

    #[test]
    fn test_next_code_follows_maximum_suffix() {
        let lots = vec![lot("L001"), lot("L005")];
        assert_eq!(next_code(&lots), "L006");
    }

    #[test]
    fn test_non_conforming_codes_are_ignored() {
        let lots = vec![lot("X9"), lot("L2x"), lot("L"), lot("lote-7")];
        assert_eq!(next_code(&lots), "L001");

        let lots = vec![lot("X9"), lot("L002")];
        assert_eq!(next_code(&lots), "L003");
    }

    #[test]
    fn test_codes_grow_past_three_digits() {
        let lots = vec![lot("L999")];
        assert_eq!(next_code(&lots), "L1000");
        assert_eq!(code_number("L1000"), Some(1000));
    }

    #[test]
    fn test_code_number() {
        assert_eq!(code_number("L001"), Some(1));
        assert_eq!(code_number("L042"), Some(42));
        assert_eq!(code_number("X9"), None);
        assert_eq!(code_number("L"), None);
        assert_eq!(code_number("L1.5"), None);
    }
}
