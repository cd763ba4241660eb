//! Billing domain errors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{CoreError, MoneyError, TemporalError};

/// Errors that can occur in the billing domain
///
/// Every variant is local to one record, one configuration attempt or one
/// center's invoice; callers recover by re-prompting, skipping the record or
/// abandoning that center only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// A required input field is absent or blank
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present but malformed or out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// Center is not among the percentage-share centers
    #[error("Unknown percentage-share center: {0}")]
    UnknownCenter(String),

    /// Sharing percentage outside 0 to 100
    #[error("Invalid sharing percentage {value} for {scope}")]
    InvalidPercentage {
        scope: String,
        value: Decimal,
    },

    /// Resolver used out of order
    #[error("Sharing configuration not ready: {0}")]
    ConfigNotReady(String),

    /// Resolver was configured for a different center
    #[error("Sharing configuration is for center {configured}, not {requested}")]
    CenterMismatch {
        configured: String,
        requested: String,
    },

    /// No lines to invoice for the center
    #[error("No billable records for center: {0}")]
    EmptyCenter(String),

    /// Period end precedes period start
    #[error("Invalid billing period: end {end} precedes start {start}")]
    InvalidPeriod {
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Amount cannot be rendered in words
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invoice sequence counter could not be drawn from
    #[error("Invoice sequence unavailable: {0}")]
    SequenceUnavailable(String),

    /// Calculation error
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// No exporter could render the invoice
    #[error("Export failed: {0}")]
    Export(String),
}

impl BillingError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        BillingError::MissingField(field.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    pub fn invalid_percentage(scope: impl Into<String>, value: Decimal) -> Self {
        BillingError::InvalidPercentage {
            scope: scope.into(),
            value,
        }
    }
}

impl From<MoneyError> for BillingError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::PercentageOutOfRange(value) => {
                BillingError::invalid_percentage("sharing", value)
            }
            MoneyError::InvalidAmount(msg) => BillingError::InvalidAmount(msg),
            MoneyError::Overflow => BillingError::Calculation(err.to_string()),
        }
    }
}

impl From<TemporalError> for BillingError {
    fn from(err: TemporalError) -> Self {
        match err {
            TemporalError::InvalidPeriod { start, end } => BillingError::InvalidPeriod { start, end },
            other => BillingError::Validation(other.to_string()),
        }
    }
}

impl From<CoreError> for BillingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Money(e) => e.into(),
            CoreError::Temporal(e) => e.into(),
            CoreError::Validation(msg) | CoreError::Configuration(msg) => BillingError::Validation(msg),
        }
    }
}
