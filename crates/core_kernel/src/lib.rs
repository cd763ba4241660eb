//! Core Kernel - Foundational types for center billing
//!
//! This crate provides the building blocks used by the billing domain:
//! - Rupee amounts and sharing percentages with precise decimal arithmetic
//! - Billing periods, fiscal years and the billing timezone
//! - Strongly-typed identifiers

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, MoneyError, Percentage, PAISE_DECIMAL_PLACES};
pub use temporal::{BillingPeriod, FiscalYear, TemporalError, Timezone};
pub use identifiers::{BatchRunId, InvoiceId, SessionKey};
pub use error::CoreError;
