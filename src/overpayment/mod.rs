//! Early repayment: extra and irregular payments applied to a baseline schedule

mod extra;
mod mutator;

pub use extra::{ExtraFrequency, ExtraPayment};
pub use mutator::{apply_extra_payments, OverpaymentResult};
