//! Savings and investment growth projection

mod frequency;
mod projector;

pub use frequency::Frequency;
pub use projector::{project, GrowthParams, ProjectionPoint, ProjectionResult, MAX_TERM_YEARS};
