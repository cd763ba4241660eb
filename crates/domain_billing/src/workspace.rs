//! Billing workflow facade
//!
//! [`BillingWorkspace`] holds one ingested batch and exposes the operations a
//! front end drives: listing centers and test types, walking a sharing
//! configuration, and generating invoices. Every operation is synchronous and
//! does no I/O.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::{BillingPeriod, Money};
use crate::engine::BillingEngine;
use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceAggregator};
use crate::overrides::ShareOverrideTable;
use crate::record::{BillingType, PatientTestRecord};
use crate::segmenter::{Segmentation, Segmenter};
use crate::sharing::{SharingConfig, SharingConfigResolver, SharingPreview};

/// Per-center outcome of a batch generation
pub type CenterInvoices = BTreeMap<String, Result<Invoice, BillingError>>;

/// One batch of records plus the services needed to invoice it
#[derive(Debug, Clone)]
pub struct BillingWorkspace {
    segmentation: Segmentation,
    aggregator: InvoiceAggregator,
    overrides: ShareOverrideTable,
}

impl BillingWorkspace {
    /// Segments the records and wraps them with an aggregator
    pub fn new<I>(records: I, aggregator: InvoiceAggregator) -> Self
    where
        I: IntoIterator<Item = PatientTestRecord>,
    {
        Self {
            segmentation: Segmenter::partition(records),
            aggregator,
            overrides: ShareOverrideTable::default(),
        }
    }

    /// Attaches a table of prefilled sharing percentages
    pub fn with_overrides(mut self, overrides: ShareOverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    pub fn aggregator(&self) -> &InvoiceAggregator {
        &self.aggregator
    }

    pub fn list_percentage_share_centers(&self) -> BTreeSet<String> {
        self.segmentation.percentage_share_centers()
    }

    pub fn list_flat_rate_centers(&self) -> BTreeSet<String> {
        self.segmentation.flat_rate_centers()
    }

    pub fn list_test_types(&self, center_name: &str) -> BTreeSet<String> {
        self.segmentation.test_types_for(center_name)
    }

    /// Prefilled percentages for a center from the override table
    pub fn prefilled_overrides(&self, center_name: &str) -> BTreeMap<String, Decimal> {
        self.overrides.overrides_for(center_name)
    }

    /// Starts a sharing configuration with the center already selected
    ///
    /// # Errors
    ///
    /// Returns `UnknownCenter` if the center has no percentage-share records.
    pub fn begin_sharing_config(&self, center_name: &str) -> Result<SharingConfigResolver, BillingError> {
        let mut resolver = SharingConfigResolver::new(&self.segmentation);
        resolver.select_center(center_name)?;
        Ok(resolver)
    }

    pub fn preview_sharing(
        &self,
        resolver: &SharingConfigResolver,
        test_type: &str,
        candidate_percentage: Decimal,
        sample_mrp: Money,
    ) -> Result<SharingPreview, BillingError> {
        resolver.preview(test_type, candidate_percentage, sample_mrp)
    }

    /// Submits the sharing percentages, moving the resolver to `Ready`
    ///
    /// On error the resolver keeps awaiting input.
    pub fn finalize_sharing_config<I, K>(
        &self,
        resolver: &mut SharingConfigResolver,
        overrides: I,
        default_percentage: Decimal,
    ) -> Result<SharingConfig, BillingError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: AsRef<str>,
    {
        resolver.submit_sharing(overrides, default_percentage)
    }

    /// Computes and aggregates one center's invoice
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` if the period ends before it starts
    /// - `EmptyCenter` if the center has no records of this billing type
    /// - `ConfigNotReady` / `CenterMismatch` for percentage share without a
    ///   matching `Ready` resolver
    /// - `SequenceUnavailable` if no invoice number could be drawn
    pub fn generate_invoice(
        &self,
        center_name: &str,
        billing_type: BillingType,
        period: BillingPeriod,
        issue_date: NaiveDate,
        resolver: Option<&SharingConfigResolver>,
    ) -> Result<Invoice, BillingError> {
        period.validate()?;

        let records = self.segmentation.records_for(center_name, billing_type);
        if records.is_empty() {
            return Err(BillingError::EmptyCenter(center_name.trim().to_string()));
        }

        let outside = records
            .iter()
            .filter(|r| !period.contains(r.registered_date))
            .count();
        if outside > 0 {
            tracing::warn!(
                center = center_name,
                outside,
                period = %period,
                "Records registered outside the invoice period"
            );
        }

        tracing::debug!(center = center_name, billing_type = %billing_type, records = records.len(), "Computing lines");
        let lines = BillingEngine::compute_lines(&records, resolver)?;
        self.aggregator.aggregate(center_name, lines, period, issue_date)
    }

    /// Generates one invoice per flat-rate center
    ///
    /// A failure for one center is recorded against it and does not stop
    /// the others.
    pub fn generate_flat_rate_invoices(&self, period: BillingPeriod, issue_date: NaiveDate) -> CenterInvoices {
        self.list_flat_rate_centers()
            .into_iter()
            .map(|center| {
                let result = self.generate_invoice(&center, BillingType::FlatRate, period, issue_date, None);
                log_outcome(&center, &result);
                (center, result)
            })
            .collect()
    }

    /// Generates one invoice per percentage-share center without prompting
    ///
    /// Each center is configured from the override table, with
    /// `default_percentage` for test types the table does not cover.
    pub fn generate_percentage_share_invoices(
        &self,
        period: BillingPeriod,
        issue_date: NaiveDate,
        default_percentage: Decimal,
    ) -> CenterInvoices {
        self.list_percentage_share_centers()
            .into_iter()
            .map(|center| {
                let result = self.begin_sharing_config(&center).and_then(|mut resolver| {
                    self.finalize_sharing_config(
                        &mut resolver,
                        self.prefilled_overrides(&center),
                        default_percentage,
                    )?;
                    self.generate_invoice(
                        &center,
                        BillingType::PercentageShare,
                        period,
                        issue_date,
                        Some(&resolver),
                    )
                });
                log_outcome(&center, &result);
                (center, result)
            })
            .collect()
    }
}

fn log_outcome(center: &str, result: &Result<Invoice, BillingError>) {
    if let Err(e) = result {
        tracing::error!(center, error = %e, "Invoice generation failed for center");
    }
}
