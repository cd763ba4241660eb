//! Invoice aggregation
//!
//! Turns the computed lines of one center into a numbered [`Invoice`] with a
//! per-test summary, the net payable in figures and words, and the detail
//! lines in registration order.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{BillingPeriod, InvoiceId, Money};
use crate::engine::ComputedLine;
use crate::error::BillingError;
use crate::record::BillingType;
use crate::sequence::{InvoiceNumber, InvoiceSequenceCounter, NumberingConfig};
use crate::words::amount_in_words;

/// Summary totals for one test name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSummaryRow {
    pub test_name: String,
    pub count: usize,
    pub total_mrp: Money,
    pub total_sharing: Money,
    pub total_payable: Money,
}

impl TestSummaryRow {
    fn empty(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_string(),
            count: 0,
            total_mrp: Money::zero(),
            total_sharing: Money::zero(),
            total_payable: Money::zero(),
        }
    }

    fn add(&mut self, line: &ComputedLine) -> Result<(), BillingError> {
        self.count += 1;
        self.total_mrp = self.total_mrp.checked_add(&line.mrp())?;
        self.total_sharing = self.total_sharing.checked_add(&line.sharing_amount())?;
        self.total_payable = self.total_payable.checked_add(&line.payable_rate())?;
        Ok(())
    }

    /// Payable per test, rounded to paise
    pub fn average_payable(&self) -> Money {
        if self.count == 0 {
            return Money::zero();
        }
        Money::new(self.total_payable.amount() / rust_decimal::Decimal::from(self.count)).round_to_paise()
    }
}

/// Per-test breakdown and totals of an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSummary {
    /// One row per test name, sorted by name
    pub rows: Vec<TestSummaryRow>,
    pub total_count: usize,
    pub total_mrp: Money,
    pub total_sharing: Money,
    /// Sum of payable rates; the amount the center is paid
    pub net_payable: Money,
    pub amount_in_words: String,
}

/// A finalized invoice for one center and period
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: InvoiceNumber,
    center_name: String,
    /// `None` when the lines mix billing models
    billing_type: Option<BillingType>,
    issue_date: NaiveDate,
    period: BillingPeriod,
    summary: InvoiceSummary,
    lines: Vec<ComputedLine>,
    narration: String,
    statutory_notes: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &InvoiceNumber {
        &self.invoice_number
    }

    pub fn center_name(&self) -> &str {
        &self.center_name
    }

    pub fn billing_type(&self) -> Option<BillingType> {
        self.billing_type
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn period(&self) -> BillingPeriod {
        self.period
    }

    pub fn summary(&self) -> &InvoiceSummary {
        &self.summary
    }

    /// Detail lines, sorted by registration date then patient name
    pub fn lines(&self) -> &[ComputedLine] {
        &self.lines
    }

    pub fn net_payable(&self) -> Money {
        self.summary.net_payable
    }

    pub fn amount_in_words(&self) -> &str {
        &self.summary.amount_in_words
    }

    pub fn narration(&self) -> &str {
        &self.narration
    }

    pub fn statutory_notes(&self) -> &[String] {
        &self.statutory_notes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builds invoices and assigns their numbers
///
/// Every aggregator built over the same `Arc<InvoiceSequenceCounter>` draws
/// from one shared sequence.
#[derive(Debug, Clone)]
pub struct InvoiceAggregator {
    numbering: NumberingConfig,
    counter: Arc<InvoiceSequenceCounter>,
    statutory_notes: Vec<String>,
}

impl InvoiceAggregator {
    /// Creates an aggregator with its own counter, starting each month at
    /// `numbering.initial_sequence`
    pub fn new(numbering: NumberingConfig) -> Self {
        let counter = Arc::new(InvoiceSequenceCounter::new(numbering.initial_sequence));
        Self {
            numbering,
            counter,
            statutory_notes: Vec::new(),
        }
    }

    /// Draws numbers from a shared counter instead
    ///
    /// The shared counter's own starting sequence applies.
    pub fn with_counter(mut self, counter: Arc<InvoiceSequenceCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// Sets the notes printed at the foot of every invoice
    pub fn with_statutory_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statutory_notes = notes.into_iter().map(Into::into).collect();
        self
    }

    pub fn numbering(&self) -> &NumberingConfig {
        &self.numbering
    }

    pub fn counter(&self) -> &Arc<InvoiceSequenceCounter> {
        &self.counter
    }

    /// Aggregates one center's lines into a numbered invoice
    ///
    /// All validation runs before the sequence draw, so a rejected call
    /// leaves the counter untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` if the period ends before it starts
    /// - `EmptyCenter` if there are no lines
    /// - `Validation` if a line belongs to another center or the numbering
    ///   settings are invalid
    /// - `SequenceUnavailable` if no sequence could be drawn
    #[instrument(skip(self, lines), fields(center = %center_name, lines = lines.len()))]
    pub fn aggregate(
        &self,
        center_name: &str,
        mut lines: Vec<ComputedLine>,
        period: BillingPeriod,
        issue_date: NaiveDate,
    ) -> Result<Invoice, BillingError> {
        period.validate()?;
        self.numbering.validate()?;

        let center_name = center_name.trim();
        if lines.is_empty() {
            return Err(BillingError::EmptyCenter(center_name.to_string()));
        }
        if let Some(stray) = lines
            .iter()
            .find(|line| line.record().center_name.trim() != center_name)
        {
            return Err(BillingError::validation(format!(
                "line for center {} cannot be invoiced to {}",
                stray.record().center_name,
                center_name
            )));
        }

        let summary = summarize(&lines)?;
        let billing_type = single_billing_type(&lines);

        lines.sort_by(|a, b| {
            a.record()
                .registered_date
                .cmp(&b.record().registered_date)
                .then_with(|| a.record().patient_name.cmp(&b.record().patient_name))
        });

        let sequence = self
            .counter
            .next_sequence(issue_date.year(), issue_date.month())?;
        let invoice_number = InvoiceNumber::new(&self.numbering, issue_date, sequence)?;

        info!(
            invoice_number = %invoice_number,
            net_payable = %summary.net_payable,
            "Invoice finalized"
        );

        Ok(Invoice {
            id: InvoiceId::new_v7(),
            invoice_number,
            center_name: center_name.to_string(),
            billing_type,
            issue_date,
            period,
            summary,
            lines,
            narration: format!(
                "Medical diagnostic services provided for the period {}",
                period
            ),
            statutory_notes: self.statutory_notes.clone(),
            created_at: Utc::now(),
        })
    }
}

fn summarize(lines: &[ComputedLine]) -> Result<InvoiceSummary, BillingError> {
    let mut rows: BTreeMap<&str, TestSummaryRow> = BTreeMap::new();
    let mut total_mrp = Money::zero();
    let mut total_sharing = Money::zero();
    let mut net_payable = Money::zero();

    for line in lines {
        let test_name = line.record().test_name.trim();
        rows.entry(test_name)
            .or_insert_with(|| TestSummaryRow::empty(test_name))
            .add(line)?;

        total_mrp = total_mrp.checked_add(&line.mrp())?;
        total_sharing = total_sharing.checked_add(&line.sharing_amount())?;
        net_payable = net_payable.checked_add(&line.payable_rate())?;
    }

    Ok(InvoiceSummary {
        rows: rows.into_values().collect(),
        total_count: lines.len(),
        total_mrp,
        total_sharing,
        net_payable,
        amount_in_words: amount_in_words(net_payable)?,
    })
}

fn single_billing_type(lines: &[ComputedLine]) -> Option<BillingType> {
    let first = lines.first()?.billing_type();
    lines
        .iter()
        .all(|line| line.billing_type() == first)
        .then_some(first)
}
