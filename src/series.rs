use std::collections::HashMap;

/// How to pick the sample row out of an aggregate CSV payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceMode {
    /// Chronologically newest row with at least one usable cell. Ties always
    /// resolve to the latest such row, even when an earlier one has more
    /// non-null cells.
    LatestValid,
    /// First data row, regardless of content.
    FirstRow,
}

fn has_reading(row: &csv::StringRecord) -> bool {
    row.iter().skip(1).any(|cell| {
        let cell = cell.trim();
        !cell.is_empty() && cell != "NaN"
    })
}

/// Reduce a per-minute aggregate payload to one value per device.
///
/// Row 0 is the header (`Datetime` plus one column per device id), rows 1..N
/// are samples in chronological order. The selected row is zipped against the
/// header, which truncates to the shorter side when the two disagree; cells
/// that do not parse as finite floats are dropped. Payloads with fewer than
/// two rows reduce to an empty map.
pub fn reduce_series(body: &str, mode: ReduceMode) -> HashMap<String, f64> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let rows: Vec<csv::StringRecord> = reader.records().filter_map(Result::ok).collect();
    if rows.len() < 2 {
        return HashMap::new();
    }

    let selected = match mode {
        ReduceMode::FirstRow => &rows[1],
        ReduceMode::LatestValid => match rows[1..].iter().rev().find(|row| has_reading(row)) {
            Some(row) => row,
            None => return HashMap::new(),
        },
    };

    rows[0]
        .iter()
        .skip(1)
        .zip(selected.iter().skip(1))
        .filter_map(|(device_id, cell)| {
            cell.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| (device_id.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const BODY: &str = "\
Datetime,9001,9002
2024-03-09T10:00:00,101.5,99.0
2024-03-09T10:01:00,NaN,NaN
2024-03-09T10:02:00,103.25,NaN
";

    #[test]
    fn latest_valid_picks_newest_usable_row() {
        let result = reduce_series(BODY, ReduceMode::LatestValid);
        assert_eq!(Some(&103.25), result.get("9001"));
        /* NaN cell in the selected row is dropped, not zeroed */
        assert_eq!(None, result.get("9002"));
        assert_eq!(1, result.len());
    }

    #[test]
    fn latest_valid_skips_trailing_empty_rows() {
        let body = "\
Datetime,9001,9002
2024-03-09T10:00:00,101.5,99.0
2024-03-09T10:01:00,NaN,
2024-03-09T10:02:00,,NaN
";
        let result = reduce_series(body, ReduceMode::LatestValid);
        assert_eq!(Some(&101.5), result.get("9001"));
        assert_eq!(Some(&99.0), result.get("9002"));
    }

    #[test]
    fn latest_valid_with_no_usable_row_is_empty() {
        let body = "\
Datetime,9001
2024-03-09T10:00:00,NaN
2024-03-09T10:01:00,
";
        assert!(reduce_series(body, ReduceMode::LatestValid).is_empty());
    }

    #[test]
    fn first_row_mode_ignores_validity() {
        let body = "\
Datetime,9001,9002
2024-03-09T10:00:00,NaN,42.5
2024-03-09T10:01:00,7.0,7.0
";
        let result = reduce_series(body, ReduceMode::FirstRow);
        assert_eq!(Some(&42.5), result.get("9002"));
        assert_eq!(None, result.get("9001"));
    }

    #[test]
    fn short_payloads_are_empty() {
        assert!(reduce_series("", ReduceMode::LatestValid).is_empty());
        assert!(reduce_series("Datetime,9001\n", ReduceMode::LatestValid).is_empty());
        assert!(reduce_series("Datetime,9001\n", ReduceMode::FirstRow).is_empty());
    }

    #[test]
    fn mismatched_row_length_truncates() {
        let body = "\
Datetime,9001,9002,9003
2024-03-09T10:00:00,1.0,2.0
";
        let result = reduce_series(body, ReduceMode::LatestValid);
        assert_eq!(2, result.len());
        assert_eq!(Some(&1.0), result.get("9001"));
        assert_eq!(None, result.get("9003"));
    }
}
