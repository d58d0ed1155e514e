//! Property transaction tax: picks the band table, then evaluates it

use chrono::NaiveDate;
use log::debug;

use super::evaluator::{evaluate_with_modifiers, PropertyTaxResult, TaxModifiers};
use super::rate_table::{BuyerStatus, RateTable, RateTableEntry, RateTableSet};
use crate::error::{CalcError, Result};

/// Calculator over a read-only set of rate tables
#[derive(Debug, Clone)]
pub struct StampDutyCalculator {
    tables: RateTableSet,
}

impl StampDutyCalculator {
    pub fn new(tables: RateTableSet) -> Self {
        Self { tables }
    }

    /// Calculator over the built-in UK tables
    pub fn uk_default() -> Self {
        Self::new(RateTableSet::uk_default())
    }

    pub fn tables(&self) -> &RateTableSet {
        &self.tables
    }

    /// Tax on a residential purchase of `value` on `date`.
    ///
    /// First-time buyer relief only applies up to the relief table's maximum
    /// value; above it the standard table is used.
    pub fn calculate(
        &self,
        region: &str,
        status: BuyerStatus,
        value: f64,
        date: NaiveDate,
    ) -> Result<PropertyTaxResult> {
        let table = self.table(region)?;
        let entry = match status {
            BuyerStatus::Standard => None,
            BuyerStatus::FirstTimeBuyer => table
                .resolve(status.key(), date)
                .filter(|entry| entry.eligible_for(value)),
            BuyerStatus::AdditionalProperty => table.resolve(status.key(), date),
        };
        let entry = match entry {
            Some(entry) => entry,
            None => standard_entry(table, date)?,
        };

        debug!("{} {:?} on {}: using '{}' table", region, status, date, entry.key);
        self.evaluate_entry(table, entry, value)
    }

    /// Tax using a table selected directly by key, e.g. a property-type id
    pub fn calculate_for_key(
        &self,
        region: &str,
        key: &str,
        value: f64,
        date: NaiveDate,
    ) -> Result<PropertyTaxResult> {
        let table = self.table(region)?;
        let entry = table
            .resolve(key, date)
            .ok_or_else(|| CalcError::invalid("key", format!("no '{}' table in {} on {}", key, region, date)))?;
        self.evaluate_entry(table, entry, value)
    }

    fn table(&self, region: &str) -> Result<&RateTable> {
        self.tables
            .get(region)
            .ok_or_else(|| CalcError::invalid("region", format!("no rate tables for '{}'", region)))
    }

    fn evaluate_entry(&self, table: &RateTable, entry: &RateTableEntry, value: f64) -> Result<PropertyTaxResult> {
        let modifiers = TaxModifiers {
            surcharge_rate_percent: entry.surcharge_rate_percent,
            registration_fee: table.registration_fee.clone(),
        };
        evaluate_with_modifiers(value, &entry.bands, &modifiers)
    }
}

fn standard_entry(table: &RateTable, date: NaiveDate) -> Result<&RateTableEntry> {
    table.resolve(BuyerStatus::Standard.key(), date).ok_or_else(|| {
        CalcError::invalid("date", format!("no standard table in {} on {}", table.region, date))
    })
}
