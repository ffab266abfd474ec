// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Per-record location filtering and price extraction

use crate::error::ParseError;
use crate::topology::ZoneTopology;
use csv::StringRecord;

/// Column holding the LBMP price ($/MWh) in NYISO zonal files
pub const PRICE_COLUMN: usize = 3;

/// Column holding the interval timestamp
pub const TIMESTAMP_COLUMN: usize = 0;

#[derive(Debug, Clone)]
pub struct RecordFilter {
    topology: ZoneTopology,
}

impl RecordFilter {
    pub fn new(topology: ZoneTopology) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &ZoneTopology {
        &self.topology
    }

    pub fn should_retain(&self, location: usize) -> bool {
        !self.topology.is_skipped(location)
    }

    /// Raw location indices that survive filtering, in their original order
    pub fn retained_locations(&self) -> Vec<usize> {
        (0..self.topology.num_zones)
            .filter(|&z| self.should_retain(z))
            .collect()
    }

    /// Returns the trimmed price field of `record`.
    ///
    /// `line` is only used for error reporting.
    pub fn extract_value<'r>(
        &self,
        record: &'r StringRecord,
        line: usize,
    ) -> Result<&'r str, ParseError> {
        let value = record
            .get(PRICE_COLUMN)
            .ok_or(ParseError::MissingField {
                line,
                fields: record.len(),
                column: PRICE_COLUMN,
            })?
            .trim();

        if value.parse::<f64>().is_err() {
            return Err(ParseError::InvalidPrice {
                line,
                value: value.to_owned(),
            });
        }

        Ok(value)
    }
}

/// Timestamp of a record, empty when the column is absent
pub fn record_timestamp(record: &StringRecord) -> &str {
    record.get(TIMESTAMP_COLUMN).unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_skip_set_excluded() {
        let filter = RecordFilter::new(ZoneTopology::nyiso());
        for z in [4, 11, 12, 13] {
            assert!(!filter.should_retain(z));
        }
        assert!(filter.should_retain(0));
        assert!(filter.should_retain(14));
    }

    #[test]
    fn test_retained_order() {
        let filter = RecordFilter::new(ZoneTopology::nyiso());
        assert_eq!(
            filter.retained_locations(),
            vec![0, 1, 2, 3, 5, 6, 7, 8, 9, 10, 14]
        );
    }

    #[test]
    fn test_extract_price_column() {
        let filter = RecordFilter::new(ZoneTopology::nyiso());
        let rec = record(&["03/13/2016 00:00", "CAPITL", "61757", " 23.45 ", "1.2", "-0.5"]);
        assert_eq!(filter.extract_value(&rec, 1).unwrap(), "23.45");
        assert_eq!(record_timestamp(&rec), "03/13/2016 00:00");
    }

    #[test]
    fn test_extract_missing_field() {
        let filter = RecordFilter::new(ZoneTopology::nyiso());
        let rec = record(&["03/13/2016 00:00", "CAPITL", "61757"]);
        assert_eq!(
            filter.extract_value(&rec, 9),
            Err(ParseError::MissingField {
                line: 9,
                fields: 3,
                column: 3
            })
        );
    }

    #[test]
    fn test_extract_non_numeric() {
        let filter = RecordFilter::new(ZoneTopology::nyiso());
        let rec = record(&["ts", "CAPITL", "61757", "N/A"]);
        assert!(matches!(
            filter.extract_value(&rec, 2),
            Err(ParseError::InvalidPrice { line: 2, .. })
        ));
    }

    #[test]
    fn test_negative_prices_allowed() {
        let filter = RecordFilter::new(ZoneTopology::nyiso());
        let rec = record(&["ts", "WEST", "61752", "-12.07"]);
        assert_eq!(filter.extract_value(&rec, 1).unwrap(), "-12.07");
    }
}
