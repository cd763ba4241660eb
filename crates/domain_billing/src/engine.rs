//! Per-record billing formulas
//!
//! Both models split a test's MRP into a sharing amount and a payable rate.
//!
//! # Invariants
//!
//! - `sharing_amount + payable_rate == mrp` for every computed line
//! - All three amounts are at paise precision
//! - A negative flat-rate sharing amount is kept and flagged, never clamped

use rayon::prelude::*;
use serde::Serialize;

use core_kernel::{Money, Percentage};
use crate::error::BillingError;
use crate::record::{BillingType, PatientTestRecord};
use crate::sharing::SharingConfigResolver;

/// Non-fatal annotation on a computed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LineWarning {
    /// Centre test rate exceeds MRP, so the sharing amount is negative
    NegativeSharing {
        mrp: Money,
        centre_test_rate: Money,
    },
}

/// A record with its sharing amount and payable rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedLine {
    record: PatientTestRecord,
    billing_type: BillingType,
    mrp: Money,
    sharing_amount: Money,
    payable_rate: Money,
    applied_percentage: Option<Percentage>,
    warnings: Vec<LineWarning>,
}

impl ComputedLine {
    pub fn record(&self) -> &PatientTestRecord {
        &self.record
    }

    /// Billing model the line was computed under
    pub fn billing_type(&self) -> BillingType {
        self.billing_type
    }

    /// MRP at paise precision
    pub fn mrp(&self) -> Money {
        self.mrp
    }

    pub fn sharing_amount(&self) -> Money {
        self.sharing_amount
    }

    pub fn payable_rate(&self) -> Money {
        self.payable_rate
    }

    /// Percentage applied, for percentage-share lines
    pub fn applied_percentage(&self) -> Option<Percentage> {
        self.applied_percentage
    }

    pub fn warnings(&self) -> &[LineWarning] {
        &self.warnings
    }

    pub fn has_negative_sharing(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LineWarning::NegativeSharing { .. }))
    }
}

/// Applies the billing formulas
pub struct BillingEngine;

impl BillingEngine {
    /// Flat-rate split: the center is paid its contracted rate
    ///
    /// `sharing = MRP - rate`, `payable = rate`. A rate above MRP yields a
    /// negative sharing amount and a `NegativeSharing` warning.
    pub fn flat_rate(record: &PatientTestRecord) -> ComputedLine {
        let mrp = record.mrp.round_to_paise();
        let payable_rate = record.centre_test_rate.round_to_paise();
        let sharing_amount = mrp - payable_rate;

        let mut warnings = Vec::new();
        if sharing_amount.is_negative() {
            tracing::warn!(
                visit = %record.visit_code,
                center = %record.center_name,
                mrp = %mrp,
                rate = %payable_rate,
                "Centre test rate exceeds MRP; sharing amount is negative"
            );
            warnings.push(LineWarning::NegativeSharing {
                mrp,
                centre_test_rate: payable_rate,
            });
        }

        ComputedLine {
            record: record.clone(),
            billing_type: BillingType::FlatRate,
            mrp,
            sharing_amount,
            payable_rate,
            applied_percentage: None,
            warnings,
        }
    }

    /// Percentage-share split at a resolved percentage
    ///
    /// # Errors
    ///
    /// Returns `Calculation` if the MRP is too large to split.
    pub fn percentage_share(
        record: &PatientTestRecord,
        percentage: Percentage,
    ) -> Result<ComputedLine, BillingError> {
        let mrp = record.mrp.round_to_paise();
        let (sharing_amount, payable_rate) = Self::split_by_percentage(mrp, percentage)?;

        Ok(ComputedLine {
            record: record.clone(),
            billing_type: BillingType::PercentageShare,
            mrp,
            sharing_amount,
            payable_rate,
            applied_percentage: Some(percentage),
            warnings: Vec::new(),
        })
    }

    /// Splits a paise-precision MRP into (sharing, payable)
    ///
    /// Both halves are rounded half-to-even from their unrounded values.
    /// When both land exactly on a midpoint the two roundings can drift one
    /// paisa from MRP; the payable side then absorbs the difference.
    pub fn split_by_percentage(
        mrp: Money,
        percentage: Percentage,
    ) -> Result<(Money, Money), BillingError> {
        let raw_sharing = percentage.of(mrp)?;
        let sharing_amount = raw_sharing.round_to_paise();
        let mut payable_rate = mrp.checked_sub(&raw_sharing)?.round_to_paise();

        if sharing_amount.checked_add(&payable_rate)? != mrp {
            payable_rate = mrp.checked_sub(&sharing_amount)?.round_to_paise();
        }

        Ok((sharing_amount, payable_rate))
    }

    /// Computes one line, drawing the percentage from a resolver if needed
    ///
    /// # Errors
    ///
    /// - `ConfigNotReady` for a percentage-share record without a `Ready`
    ///   resolver
    /// - `CenterMismatch` if the resolver was configured for another center
    pub fn compute_line(
        record: &PatientTestRecord,
        resolver: Option<&SharingConfigResolver>,
    ) -> Result<ComputedLine, BillingError> {
        match record.billing_type() {
            BillingType::FlatRate => Ok(Self::flat_rate(record)),
            BillingType::PercentageShare => {
                let resolver = resolver.ok_or_else(|| {
                    BillingError::ConfigNotReady(format!(
                        "no sharing configuration for percentage-share center {}",
                        record.center_name
                    ))
                })?;
                let config = resolver.config().ok_or_else(|| {
                    BillingError::ConfigNotReady(format!(
                        "sharing configuration is {}, expected Ready",
                        resolver.state()
                    ))
                })?;
                if config.center_name() != record.center_name.trim() {
                    return Err(BillingError::CenterMismatch {
                        configured: config.center_name().to_string(),
                        requested: record.center_name.clone(),
                    });
                }
                Self::percentage_share(record, config.effective_percentage(&record.test_type))
            }
        }
    }

    /// Computes lines for many records in parallel, preserving input order
    ///
    /// Stops at the first failing record.
    pub fn compute_lines(
        records: &[&PatientTestRecord],
        resolver: Option<&SharingConfigResolver>,
    ) -> Result<Vec<ComputedLine>, BillingError> {
        records
            .par_iter()
            .map(|record| Self::compute_line(record, resolver))
            .collect()
    }
}
