//! Rate tables keyed by region, buyer status and date range

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bands::{validate_bands, TaxBand};
use super::evaluator::RegistrationFee;
use super::loader;
use crate::error::{require_non_negative, Result};

/// Buyer status used to pick a band table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuyerStatus {
    Standard,
    FirstTimeBuyer,
    AdditionalProperty,
}

impl BuyerStatus {
    /// Table key for this status
    pub fn key(&self) -> &'static str {
        match self {
            BuyerStatus::Standard => "standard",
            BuyerStatus::FirstTimeBuyer => "firstTimeBuyer",
            BuyerStatus::AdditionalProperty => "additionalProperty",
        }
    }
}

/// One band table, valid for a key over an inclusive date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTableEntry {
    /// Buyer status key or property-type id
    pub key: String,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub bands: Vec<TaxBand>,
    /// Flat surcharge on the whole value
    #[serde(default)]
    pub surcharge_rate_percent: f64,
    /// Highest value this table applies to (first-time buyer relief)
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl RateTableEntry {
    pub fn new(key: impl Into<String>, bands: Vec<TaxBand>) -> Self {
        Self {
            key: key.into(),
            valid_from: None,
            valid_to: None,
            bands,
            surcharge_rate_percent: 0.0,
            max_value: None,
        }
    }

    pub fn valid_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.valid_from = from;
        self.valid_to = to;
        self
    }

    pub fn with_surcharge(mut self, rate_percent: f64) -> Self {
        self.surcharge_rate_percent = rate_percent;
        self
    }

    pub fn with_max_value(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from.map_or(true, |from| date >= from) && self.valid_to.map_or(true, |to| date <= to)
    }

    pub fn eligible_for(&self, value: f64) -> bool {
        self.max_value.map_or(true, |max| value <= max)
    }

    pub fn validate(&self) -> Result<()> {
        validate_bands(&self.bands)?;
        require_non_negative("surcharge_rate_percent", self.surcharge_rate_percent)
    }
}

/// All band tables for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub region: String,
    pub entries: Vec<RateTableEntry>,
    #[serde(default)]
    pub registration_fee: Option<RegistrationFee>,
}

impl RateTable {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            entries: Vec::new(),
            registration_fee: None,
        }
    }

    pub fn with_entry(mut self, entry: RateTableEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_registration_fee(mut self, fee: RegistrationFee) -> Self {
        self.registration_fee = Some(fee);
        self
    }

    /// Entry for `key` in force on `date`
    pub fn resolve(&self, key: &str, date: NaiveDate) -> Option<&RateTableEntry> {
        self.entries.iter().find(|e| e.key == key && e.covers(date))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(fee) = &self.registration_fee {
            fee.validate()?;
        }
        self.entries.iter().try_for_each(RateTableEntry::validate)
    }
}

/// Rate tables for every supported region
#[derive(Debug, Clone, Default)]
pub struct RateTableSet {
    tables: HashMap<String, RateTable>,
}

impl RateTableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: RateTable) {
        self.tables.insert(table.region.clone(), table);
    }

    pub fn get(&self, region: &str) -> Option<&RateTable> {
        self.tables.get(region)
    }

    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        regions.sort_unstable();
        regions
    }

    /// Load tables from `rate_tables.csv` in the default location (data/rate_tables/)
    pub fn from_csv() -> std::result::Result<Self, Box<dyn std::error::Error>> {
        Self::from_csv_path(Path::new(loader::DEFAULT_RATE_TABLES_PATH))
    }

    /// Load tables from `rate_tables.csv` in a specific directory
    pub fn from_csv_path(path: &Path) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let mut set = Self::new();
        for table in loader::load_rate_tables(path)? {
            table.validate()?;
            set.insert(table);
        }
        Ok(set)
    }

    /// Built-in UK residential tables: England & NI SDLT and Scotland LBTT
    pub fn uk_default() -> Self {
        let mut set = Self::new();
        set.insert(england_sdlt());
        set.insert(scotland_lbtt());
        set
    }
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn england_sdlt() -> RateTable {
    let current = vec![
        TaxBand::new(0.0, 0.0),
        TaxBand::new(125_000.0, 2.0),
        TaxBand::new(250_000.0, 5.0),
        TaxBand::new(925_000.0, 10.0),
        TaxBand::new(1_500_000.0, 12.0),
    ];
    let pre_april_2025 = vec![
        TaxBand::new(0.0, 0.0),
        TaxBand::new(250_000.0, 5.0),
        TaxBand::new(925_000.0, 10.0),
        TaxBand::new(1_500_000.0, 12.0),
    ];

    RateTable::new("england")
        .with_entry(RateTableEntry::new("standard", current.clone()).valid_between(date(2025, 4, 1), None))
        .with_entry(
            RateTableEntry::new("standard", pre_april_2025.clone())
                .valid_between(date(2022, 9, 23), date(2025, 3, 31)),
        )
        .with_entry(
            RateTableEntry::new("firstTimeBuyer", vec![TaxBand::new(0.0, 0.0), TaxBand::new(300_000.0, 5.0)])
                .valid_between(date(2025, 4, 1), None)
                .with_max_value(500_000.0),
        )
        .with_entry(
            RateTableEntry::new("firstTimeBuyer", vec![TaxBand::new(0.0, 0.0), TaxBand::new(425_000.0, 5.0)])
                .valid_between(date(2022, 9, 23), date(2025, 3, 31))
                .with_max_value(625_000.0),
        )
        .with_entry(
            RateTableEntry::new("additionalProperty", current)
                .valid_between(date(2025, 4, 1), None)
                .with_surcharge(5.0),
        )
        .with_entry(
            RateTableEntry::new("additionalProperty", pre_april_2025.clone())
                .valid_between(date(2024, 10, 31), date(2025, 3, 31))
                .with_surcharge(5.0),
        )
        .with_entry(
            RateTableEntry::new("additionalProperty", pre_april_2025)
                .valid_between(date(2022, 9, 23), date(2024, 10, 30))
                .with_surcharge(3.0),
        )
        .with_entry(RateTableEntry::new(
            "nonResidential",
            vec![TaxBand::new(0.0, 0.0), TaxBand::new(150_000.0, 2.0), TaxBand::new(250_000.0, 5.0)],
        ))
}

fn scotland_lbtt() -> RateTable {
    let bands = |nil_band: f64| {
        vec![
            TaxBand::new(0.0, 0.0),
            TaxBand::new(nil_band, 2.0),
            TaxBand::new(250_000.0, 5.0),
            TaxBand::new(325_000.0, 10.0),
            TaxBand::new(750_000.0, 12.0),
        ]
    };

    RateTable::new("scotland")
        .with_entry(RateTableEntry::new("standard", bands(145_000.0)).valid_between(date(2021, 4, 1), None))
        .with_entry(RateTableEntry::new("firstTimeBuyer", bands(175_000.0)).valid_between(date(2021, 4, 1), None))
        .with_entry(
            RateTableEntry::new("additionalProperty", bands(145_000.0))
                .valid_between(date(2024, 12, 5), None)
                .with_surcharge(8.0),
        )
        .with_entry(
            RateTableEntry::new("additionalProperty", bands(145_000.0))
                .valid_between(date(2023, 12, 15), date(2024, 12, 4))
                .with_surcharge(6.0),
        )
}
