//! Center Billing - Batch Invoicing Binary
//!
//! Invoices every center in a registration export.
//!
//! # Usage
//!
//! ```bash
//! center-billing registrations.csv
//!
//! BILLING_INPUT_PATH=registrations.csv BILLING_OUTPUT_DIR=out center-billing
//! ```
//!
//! # Environment Variables
//!
//! * `BILLING_INPUT_PATH` - Registration export (overridden by the first argument)
//! * `BILLING_OVERRIDES_PATH` - Optional share override table
//! * `BILLING_OUTPUT_DIR` - Output directory (default: invoices)
//! * `BILLING_INVOICE_PREFIX` - Invoice number prefix (default: KRPL)
//! * `BILLING_FISCAL_YEAR_START_MONTH` - Fiscal year start month (default: 4)
//! * `BILLING_INVOICE_SEQUENCE_START` - First sequence each month (default: 1)
//! * `BILLING_DEFAULT_SHARE_PERCENTAGE` - Default share percentage (default: 50)
//! * `BILLING_TIMEZONE` - Timezone for the issue date (default: Asia/Kolkata)
//! * `BILLING_PERIOD_START`, `BILLING_PERIOD_END` - Fixed invoice period
//! * `BILLING_ISSUE_DATE` - Fixed issue date
//! * `BILLING_STATUTORY_NOTES` - Invoice footer notes, `|` separated
//! * `BILLING_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_billing::ShareOverrideTable;
use interface_batch::{intake, BatchError, BatchRunner, BillingConfig};

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = BillingConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_level);

    let input: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.input_path.clone())
        .ok_or(BatchError::MissingInput)?;

    tracing::info!(input = %input.display(), output = %config.output_dir.display(), "Center billing batch");

    let report = intake::read_records_from_path(&input)?;
    let overrides = match &config.overrides_path {
        Some(path) => intake::read_overrides_from_path(path)
            .with_context(|| format!("loading overrides from {}", path.display()))?,
        None => ShareOverrideTable::default(),
    };

    let summary = BatchRunner::new(config).run(report.records, overrides, report.rejected)?;

    for generated in &summary.generated {
        tracing::info!(
            center = %generated.center_name,
            invoice_number = %generated.invoice_number,
            net_payable = %generated.net_payable,
            path = %generated.path.display(),
            "Invoice generated"
        );
    }
    for failed in &summary.failed {
        tracing::error!(center = %failed.center_name, reason = %failed.reason, "Center not invoiced");
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.has_failures() {
        anyhow::bail!("{} center(s) could not be invoiced", summary.failed.len());
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
