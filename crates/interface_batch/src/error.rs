//! Batch error handling

use std::path::PathBuf;
use thiserror::Error;

use domain_billing::BillingError;

/// Batch front-end errors
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No input file configured; pass a path or set BILLING_INPUT_PATH")]
    MissingInput,

    #[error("Failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Billing(#[from] BillingError),
}
