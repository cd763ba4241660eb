//! Batch configuration

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use core_kernel::{BillingPeriod, Percentage, Timezone};
use domain_billing::NumberingConfig;

use crate::error::BatchError;

/// Environment variable prefix, e.g. `BILLING_INVOICE_PREFIX`
pub const ENV_PREFIX: &str = "BILLING";

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Month (1-12) the fiscal year starts in
    pub fiscal_year_start_month: u32,
    /// First invoice sequence in each month
    pub invoice_sequence_start: u32,
    /// Leading invoice number segment
    pub invoice_prefix: String,
    /// Share percentage for test types without an override
    pub default_share_percentage: Decimal,
    /// IANA timezone used to date invoices
    pub timezone: String,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Notes printed at the foot of every invoice
    pub statutory_notes: Vec<String>,
    /// Registration export to invoice
    pub input_path: Option<PathBuf>,
    /// Optional (center, test type, percentage) table
    pub overrides_path: Option<PathBuf>,
    /// Directory rendered invoices are written to
    pub output_dir: PathBuf,
    /// Fixed invoice period; derived from the records when unset
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    /// Fixed issue date; today in `timezone` when unset
    pub issue_date: Option<NaiveDate>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: 4,
            invoice_sequence_start: 1,
            invoice_prefix: "KRPL".to_string(),
            default_share_percentage: Decimal::from(50),
            timezone: "Asia/Kolkata".to_string(),
            log_level: "info".to_string(),
            statutory_notes: vec![
                "1. This invoice is exempt from GST as per Notification No. 12/2017-Central Tax (Rate) dated 28.06.2017".to_string(),
                "2. TDS @ 2% u/s 194J of Income Tax Act, 1961 is applicable on professional/technical services".to_string(),
            ],
            input_path: None,
            overrides_path: None,
            output_dir: PathBuf::from("invoices"),
            period_start: None,
            period_end: None,
            issue_date: None,
        }
    }
}

impl BillingConfig {
    /// Loads configuration from `BILLING_*` environment variables
    ///
    /// Unset keys keep their defaults. Statutory notes are separated by `|`.
    pub fn from_env() -> Result<Self, BatchError> {
        Self::from_environment(Self::environment())
    }

    /// Loads configuration from an explicit set of variables
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, BatchError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<config::Map<String, String>>();
        Self::from_environment(Self::environment().source(Some(map)))
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator("|")
            .with_list_parse_key("statutory_notes")
    }

    fn from_environment(environment: config::Environment) -> Result<Self, BatchError> {
        let config: Self = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges
    pub fn validate(&self) -> Result<(), BatchError> {
        self.numbering()
            .validate()
            .map_err(|e| BatchError::InvalidConfig(e.to_string()))?;
        self.default_percentage()?;
        self.timezone()?;
        self.fixed_period()?;
        Ok(())
    }

    /// Numbering settings for the invoice aggregator
    pub fn numbering(&self) -> NumberingConfig {
        NumberingConfig {
            prefix: self.invoice_prefix.clone(),
            fiscal_year_start_month: self.fiscal_year_start_month,
            initial_sequence: self.invoice_sequence_start,
        }
    }

    pub fn default_percentage(&self) -> Result<Percentage, BatchError> {
        Percentage::new(self.default_share_percentage).map_err(|_| {
            BatchError::InvalidConfig(format!(
                "default_share_percentage must be 0-100, got {}",
                self.default_share_percentage
            ))
        })
    }

    pub fn timezone(&self) -> Result<Timezone, BatchError> {
        self.timezone
            .parse()
            .map_err(|e: core_kernel::TemporalError| BatchError::InvalidConfig(e.to_string()))
    }

    /// The configured invoice period, if both ends are set
    pub fn fixed_period(&self) -> Result<Option<BillingPeriod>, BatchError> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => BillingPeriod::new(start, end)
                .map(Some)
                .map_err(|e| BatchError::InvalidConfig(e.to_string())),
            (None, None) => Ok(None),
            _ => Err(BatchError::InvalidConfig(
                "period_start and period_end must be set together".to_string(),
            )),
        }
    }

    /// Issue date: configured, else today in the configured timezone
    pub fn issue_date(&self) -> Result<NaiveDate, BatchError> {
        match self.issue_date {
            Some(date) => Ok(date),
            None => Ok(self.timezone()?.today()),
        }
    }
}
