//! Summary aggregation over the lot table.

use crate::model::{Lot, Summary};

/// Recompute the derived aggregates from the current table.
///
/// Pure function: count, price sum, code of the last record in table order,
/// and the maximum creation timestamp. Empty table yields zero / empty / none.
pub fn recompute(lots: &[Lot]) -> Summary {
    Summary {
        total_lots: lots.len(),
        price_sum: lots.iter().map(|lot| lot.price).sum(),
        last_code: lots.last().map(|lot| lot.code.clone()).unwrap_or_default(),
        last_created_at: lots.iter().map(|lot| lot.created_at).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LotDraft, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;

    fn lot(code: &str, price: f64, created: &str) -> Lot {
        Lot::from_draft(
            LotDraft::new("Widget", price, ""),
            code.to_string(),
            NaiveDateTime::parse_from_str(created, TIMESTAMP_FORMAT).unwrap(),
        )
    }

    #[test]
    fn test_empty_table() {
        let summary = recompute(&[]);
        assert_eq!(summary.total_lots, 0);
        assert_eq!(summary.price_sum, 0.0);
        assert_eq!(summary.last_code, "");
        assert_eq!(summary.last_created_at, None);
    }

    #[test]
    fn test_aggregates_over_table() {
        let lots = vec![
            lot("L001", 10.5, "2026-08-20 10:00:00"),
            lot("L003", 2.0, "2026-08-24 08:30:00"),
            lot("L002", 7.5, "2026-08-22 16:45:00"),
        ];
        let summary = recompute(&lots);
        assert_eq!(summary.total_lots, 3);
        assert_eq!(summary.price_sum, 20.0);
        // Last in table order, not highest code.
        assert_eq!(summary.last_code, "L002");
        // Maximum timestamp, not the last row's.
        assert_eq!(
            summary.last_created_at.unwrap().to_string(),
            "2026-08-24 08:30:00"
        );
    }
}
