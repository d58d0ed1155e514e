//! CSV-based rate table loader
//!
//! Loads band tables from data/rate_tables/rate_tables.csv. Each row is one band;
//! consecutive rows sharing region, key and date range form one table entry.

use std::error::Error;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use super::bands::TaxBand;
use super::rate_table::{RateTable, RateTableEntry};

/// Default path to rate table directory
pub const DEFAULT_RATE_TABLES_PATH: &str = "data/rate_tables";

/// Raw CSV row matching rate_tables.csv columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    region: String,
    key: String,
    valid_from: Option<NaiveDate>,
    valid_to: Option<NaiveDate>,
    threshold: f64,
    rate_percent: f64,
    surcharge_percent: Option<f64>,
    max_value: Option<f64>,
}

impl CsvRow {
    fn starts_new_entry(&self, entry: &RateTableEntry) -> bool {
        self.key != entry.key || self.valid_from != entry.valid_from || self.valid_to != entry.valid_to
    }

    fn to_entry(&self) -> RateTableEntry {
        RateTableEntry {
            key: self.key.clone(),
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            bands: Vec::new(),
            surcharge_rate_percent: self.surcharge_percent.unwrap_or(0.0),
            max_value: self.max_value,
        }
    }
}

/// Load all rate tables from `rate_tables.csv` in `path`, one table per region
pub fn load_rate_tables(path: &Path) -> Result<Vec<RateTable>, Box<dyn Error>> {
    let file = File::open(path.join("rate_tables.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut tables: Vec<RateTable> = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;

        let table_index = match tables.iter().position(|t| t.region == row.region) {
            Some(index) => index,
            None => {
                tables.push(RateTable::new(row.region.clone()));
                tables.len() - 1
            }
        };
        let table = &mut tables[table_index];

        let needs_entry = table.entries.last().map_or(true, |entry| row.starts_new_entry(entry));
        if needs_entry {
            table.entries.push(row.to_entry());
        }
        if let Some(entry) = table.entries.last_mut() {
            entry.bands.push(TaxBand::new(row.threshold, row.rate_percent));
        }
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::RateTableSet;

    #[test]
    fn test_load_default_rate_tables() {
        let result = load_rate_tables(Path::new(DEFAULT_RATE_TABLES_PATH));
        assert!(result.is_ok(), "Failed to load rate tables: {:?}", result.err());

        let tables = result.unwrap();
        assert_eq!(tables.len(), 2);

        let england = tables.iter().find(|t| t.region == "england").unwrap();
        assert_eq!(england.entries.len(), 8);
        assert_eq!(england.entries[0].bands.len(), 5);
    }

    #[test]
    fn test_csv_matches_built_in_tables() {
        let loaded = RateTableSet::from_csv().unwrap();
        let built_in = RateTableSet::uk_default();

        for region in built_in.regions() {
            assert_eq!(loaded.get(region), built_in.get(region), "region {}", region);
        }
    }

    #[test]
    fn test_missing_directory_is_error() {
        assert!(load_rate_tables(Path::new("data/does_not_exist")).is_err());
    }
}
