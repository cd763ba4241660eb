//! Invoice rendering
//!
//! Exporters read a finalized [`Invoice`] and produce bytes. An
//! [`ExporterChain`] tries its exporters in order and keeps the first
//! success.

use serde::Serialize;

use crate::error::BillingError;
use crate::invoice::Invoice;

/// Renders an invoice into some output format
pub trait InvoiceExporter: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, BillingError>;
}

/// Output of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInvoice {
    pub exporter: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serializes the whole invoice as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pub pretty: bool,
}

impl JsonExporter {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl InvoiceExporter for JsonExporter {
    fn name(&self) -> &str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, BillingError> {
        let rendered = if self.pretty {
            serde_json::to_vec_pretty(invoice)
        } else {
            serde_json::to_vec(invoice)
        };
        rendered.map_err(|e| BillingError::Export(format!("json: {}", e)))
    }
}

/// Writes the detail lines as CSV, one row per test
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLinesExporter;

#[derive(Serialize)]
struct CsvLine<'a> {
    #[serde(rename = "Invoice No")]
    invoice_number: String,
    #[serde(rename = "Date")]
    registered_date: String,
    #[serde(rename = "Visit Code")]
    visit_code: &'a str,
    #[serde(rename = "Patient Name")]
    patient_name: &'a str,
    #[serde(rename = "Test Name")]
    test_name: &'a str,
    #[serde(rename = "Test Type")]
    test_type: &'a str,
    #[serde(rename = "MRP")]
    mrp: String,
    #[serde(rename = "Sharing Amount")]
    sharing_amount: String,
    #[serde(rename = "Payable Rate")]
    payable_rate: String,
}

impl InvoiceExporter for CsvLinesExporter {
    fn name(&self) -> &str {
        "csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, BillingError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let invoice_number = invoice.invoice_number().to_string();

        for line in invoice.lines() {
            let record = line.record();
            writer
                .serialize(CsvLine {
                    invoice_number: invoice_number.clone(),
                    registered_date: record.registered_date.format("%d/%m/%Y").to_string(),
                    visit_code: &record.visit_code,
                    patient_name: &record.patient_name,
                    test_name: &record.test_name,
                    test_type: &record.test_type,
                    mrp: line.mrp().amount().to_string(),
                    sharing_amount: line.sharing_amount().amount().to_string(),
                    payable_rate: line.payable_rate().amount().to_string(),
                })
                .map_err(|e| BillingError::Export(format!("csv: {}", e)))?;
        }

        writer
            .into_inner()
            .map_err(|e| BillingError::Export(format!("csv: {}", e)))
    }
}

/// Ordered list of exporters with fallback
#[derive(Default)]
pub struct ExporterChain {
    exporters: Vec<Box<dyn InvoiceExporter>>,
}

impl ExporterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exporter; earlier exporters are tried first
    pub fn with<E>(mut self, exporter: E) -> Self
    where
        E: InvoiceExporter + 'static,
    {
        self.exporters.push(Box::new(exporter));
        self
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// Renders with the first exporter that succeeds
    ///
    /// # Errors
    ///
    /// Returns `Export` listing every exporter's failure when none succeeds,
    /// or when the chain is empty.
    pub fn render(&self, invoice: &Invoice) -> Result<RenderedInvoice, BillingError> {
        let mut failures = Vec::new();

        for exporter in &self.exporters {
            match exporter.render(invoice) {
                Ok(bytes) => {
                    return Ok(RenderedInvoice {
                        exporter: exporter.name().to_string(),
                        content_type: exporter.content_type(),
                        bytes,
                    })
                }
                Err(e) => {
                    tracing::warn!(
                        exporter = exporter.name(),
                        invoice_number = %invoice.invoice_number(),
                        error = %e,
                        "Exporter failed, trying next"
                    );
                    failures.push(format!("{}: {}", exporter.name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(BillingError::Export("no exporters configured".to_string()));
        }
        Err(BillingError::Export(failures.join("; ")))
    }
}

impl std::fmt::Debug for ExporterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.exporters.iter().map(|e| e.name()))
            .finish()
    }
}
