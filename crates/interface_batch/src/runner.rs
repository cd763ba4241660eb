//! One batch run: records in, rendered invoices out

use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use core_kernel::{BatchRunId, BillingPeriod};
use domain_billing::{
    BillingWorkspace, ExporterChain, Invoice, InvoiceAggregator,
    InvoiceSequenceCounter, JsonExporter, PatientTestRecord, ShareOverrideTable,
};

use crate::config::BillingConfig;
use crate::error::BatchError;
use crate::intake::RejectedRow;

/// An invoice written to disk
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedInvoice {
    pub center_name: String,
    pub invoice_number: String,
    pub net_payable: String,
    pub path: PathBuf,
}

/// A center whose invoice could not be produced
#[derive(Debug, Clone, Serialize)]
pub struct FailedCenter {
    pub center_name: String,
    pub reason: String,
}

/// What a run produced
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: BatchRunId,
    pub period: Option<BillingPeriod>,
    pub issue_date: NaiveDate,
    pub generated: Vec<GeneratedInvoice>,
    pub failed: Vec<FailedCenter>,
    pub rejected_rows: Vec<RejectedRow>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Drives invoice generation for a whole batch
pub struct BatchRunner {
    config: BillingConfig,
    counter: Arc<InvoiceSequenceCounter>,
    exporters: ExporterChain,
}

impl BatchRunner {
    pub fn new(config: BillingConfig) -> Self {
        let counter = Arc::new(InvoiceSequenceCounter::new(config.invoice_sequence_start));
        Self {
            config,
            counter,
            exporters: ExporterChain::new().with(JsonExporter::pretty()),
        }
    }

    /// Replaces the exporter chain
    pub fn with_exporters(mut self, exporters: ExporterChain) -> Self {
        self.exporters = exporters;
        self
    }

    pub fn counter(&self) -> &Arc<InvoiceSequenceCounter> {
        &self.counter
    }

    /// Generates, renders and writes every invoice for the batch
    ///
    /// Per-center failures are collected in the summary; only setup
    /// problems (configuration, output directory) fail the run.
    pub fn run(
        &self,
        records: Vec<PatientTestRecord>,
        overrides: ShareOverrideTable,
        rejected_rows: Vec<RejectedRow>,
    ) -> Result<BatchSummary, BatchError> {
        let run_id = BatchRunId::new_v7();
        let issue_date = self.config.issue_date()?;
        let default_percentage = self.config.default_percentage()?;
        let period = match self.config.fixed_period()? {
            Some(period) => Some(period),
            None => period_covering(&records),
        };

        let mut summary = BatchSummary {
            run_id,
            period,
            issue_date,
            generated: Vec::new(),
            failed: Vec::new(),
            rejected_rows,
        };

        let Some(period) = period else {
            tracing::warn!(%run_id, "No records to invoice");
            return Ok(summary);
        };

        tracing::info!(%run_id, %period, %issue_date, records = records.len(), "Starting batch run");

        let aggregator = InvoiceAggregator::new(self.config.numbering())
            .with_counter(Arc::clone(&self.counter))
            .with_statutory_notes(self.config.statutory_notes.clone());
        let workspace = BillingWorkspace::new(records, aggregator).with_overrides(overrides);

        fs::create_dir_all(&self.config.output_dir).map_err(|source| BatchError::Io {
            path: self.config.output_dir.clone(),
            source,
        })?;

        let flat = workspace.generate_flat_rate_invoices(period, issue_date);
        let shared =
            workspace.generate_percentage_share_invoices(period, issue_date, default_percentage.value());

        for (center_name, result) in flat.into_iter().chain(shared) {
            match result.and_then(|invoice| self.write(&invoice).map(|path| (invoice, path))) {
                Ok((invoice, path)) => summary.generated.push(GeneratedInvoice {
                    center_name,
                    invoice_number: invoice.invoice_number().to_string(),
                    net_payable: invoice.net_payable().to_string(),
                    path,
                }),
                Err(e) => summary.failed.push(FailedCenter {
                    center_name,
                    reason: e.to_string(),
                }),
            }
        }

        tracing::info!(
            %run_id,
            generated = summary.generated.len(),
            failed = summary.failed.len(),
            rejected_rows = summary.rejected_rows.len(),
            "Batch run complete"
        );
        Ok(summary)
    }

    fn write(&self, invoice: &Invoice) -> Result<PathBuf, domain_billing::BillingError> {
        let rendered = self.exporters.render(invoice)?;
        let path = output_path(&self.config.output_dir, invoice, rendered.content_type);
        fs::write(&path, &rendered.bytes)
            .map_err(|e| domain_billing::BillingError::Export(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), exporter = %rendered.exporter, "Invoice written");
        Ok(path)
    }
}

/// Period from the earliest to the latest registration date
pub fn period_covering(records: &[PatientTestRecord]) -> Option<BillingPeriod> {
    let start = records.iter().map(|r| r.registered_date).min()?;
    let end = records.iter().map(|r| r.registered_date).max()?;
    Some(BillingPeriod { start, end })
}

/// File name for an invoice: its number with `/` replaced
pub fn output_path(dir: &Path, invoice: &Invoice, content_type: &str) -> PathBuf {
    let extension = match content_type {
        "application/json" => "json",
        "text/csv" => "csv",
        _ => "bin",
    };
    let stem = invoice.invoice_number().to_string().replace('/', "_");
    dir.join(format!("{}.{}", stem, extension))
}
