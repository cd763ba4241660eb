//! Batch Invoicing Front End
//!
//! Reads a registration export, invoices every center in it and writes one
//! rendered file per invoice.
//!
//! # Architecture
//!
//! - **Config**: `BILLING_*` environment variables via the `config` crate
//! - **Intake**: CSV rows into validated records, bad rows skipped
//! - **Runner**: flat-rate and percentage-share invoices per center, with
//!   per-center failure isolation
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_batch::{BatchRunner, BillingConfig, intake};
//!
//! let config = BillingConfig::from_env()?;
//! let report = intake::read_records_from_path(&path)?;
//! let summary = BatchRunner::new(config).run(report.records, overrides, report.rejected)?;
//! ```

pub mod config;
pub mod error;
pub mod intake;
pub mod runner;

pub use config::BillingConfig;
pub use error::BatchError;
pub use intake::{IntakeReport, RejectedRow};
pub use runner::{BatchRunner, BatchSummary, FailedCenter, GeneratedInvoice};
