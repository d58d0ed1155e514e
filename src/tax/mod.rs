//! Progressive band tax (stamp-duty style) with surcharges, fees and rate tables
//!
//! The evaluator only consumes one resolved band table and a value. Choosing
//! the table (region, buyer status, date) is done by [`StampDutyCalculator`]
//! over a read-only [`RateTableSet`].

mod bands;
mod evaluator;
mod rate_table;
mod calculator;
pub mod loader;

pub use bands::{validate_bands, TaxBand};
pub use evaluator::{
    evaluate, evaluate_with_modifiers, BandSlice, BandTaxResult, PropertyTaxResult, RegistrationFee,
    TaxModifiers,
};
pub use rate_table::{BuyerStatus, RateTable, RateTableEntry, RateTableSet};
pub use calculator::StampDutyCalculator;
