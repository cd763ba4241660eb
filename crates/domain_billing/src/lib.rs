//! Billing Domain - Diagnostic Center Settlement
//!
//! This crate computes what a diagnostic lab owes each collection center for
//! the tests it referred, and produces one numbered invoice per center.
//!
//! # Billing Models
//!
//! Every record is billed under one of two models, chosen by its
//! discriminator:
//! - **Flat rate**: the center is paid its contracted test rate; the lab keeps
//!   `MRP - rate`
//! - **Percentage share**: the lab keeps a configured percentage of MRP; the
//!   center is paid the remainder
//!
//! In both models `sharing + payable == MRP` at paise precision.
//!
//! # Workflow
//!
//! 1. [`Segmenter`] splits a batch into flat-rate and percentage-share buckets
//! 2. For each percentage-share center a [`SharingConfigResolver`] collects
//!    the percentages (`select_center`, then `submit_sharing`)
//! 3. [`BillingEngine`] computes each line
//! 4. [`InvoiceAggregator`] summarizes the lines and draws an invoice number
//!    from a shared [`InvoiceSequenceCounter`]
//!
//! [`BillingWorkspace`] wraps these steps behind one facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingWorkspace, BillingType, InvoiceAggregator, NumberingConfig};
//!
//! let aggregator = InvoiceAggregator::new(NumberingConfig::default());
//! let workspace = BillingWorkspace::new(records, aggregator);
//!
//! let mut resolver = workspace.begin_sharing_config("Hansi Lab")?;
//! workspace.finalize_sharing_config(&mut resolver, [("X-Ray", dec!(60))], dec!(50))?;
//! let invoice = workspace.generate_invoice(
//!     "Hansi Lab",
//!     BillingType::PercentageShare,
//!     period,
//!     issue_date,
//!     Some(&resolver),
//! )?;
//! ```

pub mod record;
pub mod intake;
pub mod segmenter;
pub mod sharing;
pub mod engine;
pub mod sequence;
pub mod words;
pub mod invoice;
pub mod overrides;
pub mod sessions;
pub mod export;
pub mod workspace;
pub mod error;

pub use record::{BillingType, PatientTestRecord};
pub use intake::RecordRow;
pub use segmenter::{Segmentation, Segmenter, TestTypeCatalog};
pub use sharing::{ResolverState, SharingConfig, SharingConfigResolver, SharingPreview};
pub use engine::{BillingEngine, ComputedLine, LineWarning};
pub use sequence::{InvoiceNumber, InvoiceSequenceCounter, NumberingConfig};
pub use words::amount_in_words;
pub use invoice::{Invoice, InvoiceAggregator, InvoiceSummary, TestSummaryRow};
pub use overrides::{OverrideRow, ShareOverrideTable};
pub use sessions::SharingSessions;
pub use export::{CsvLinesExporter, ExporterChain, InvoiceExporter, JsonExporter, RenderedInvoice};
pub use workspace::{BillingWorkspace, CenterInvoices};
pub use error::BillingError;
