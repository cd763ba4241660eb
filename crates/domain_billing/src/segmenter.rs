//! Record segmentation by billing type
//!
//! Splits the ingested table into a flat-rate bucket and a percentage-share
//! bucket, and answers the read-only queries the configuration workflow
//! needs (which centers share by percentage, which test types they ran).

use std::collections::{BTreeMap, BTreeSet};

use crate::record::{BillingType, PatientTestRecord};

/// Test types per center, as seen in the percentage-share bucket
pub type TestTypeCatalog = BTreeMap<String, BTreeSet<String>>;

/// Result of partitioning one batch of records
///
/// # Invariants
///
/// - Every input record is in exactly one bucket
/// - Each bucket keeps the relative input order
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    flat_rate: Vec<PatientTestRecord>,
    percentage_share: Vec<PatientTestRecord>,
}

/// Classifies records into billing-type buckets
pub struct Segmenter;

impl Segmenter {
    /// Partitions records by billing type
    ///
    /// Unrecognised or absent discriminators land in the flat-rate bucket;
    /// no record is rejected.
    pub fn partition<I>(records: I) -> Segmentation
    where
        I: IntoIterator<Item = PatientTestRecord>,
    {
        let (percentage_share, flat_rate): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|r| r.billing_type() == BillingType::PercentageShare);

        tracing::debug!(
            flat_rate = flat_rate.len(),
            percentage_share = percentage_share.len(),
            "Segmented records"
        );

        Segmentation {
            flat_rate,
            percentage_share,
        }
    }
}

impl Segmentation {
    pub fn flat_rate(&self) -> &[PatientTestRecord] {
        &self.flat_rate
    }

    pub fn percentage_share(&self) -> &[PatientTestRecord] {
        &self.percentage_share
    }

    /// Returns the bucket for a billing type
    pub fn bucket(&self, billing_type: BillingType) -> &[PatientTestRecord] {
        match billing_type {
            BillingType::FlatRate => &self.flat_rate,
            BillingType::PercentageShare => &self.percentage_share,
        }
    }

    /// Total number of records across both buckets
    pub fn len(&self) -> usize {
        self.flat_rate.len() + self.percentage_share.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct center names in the percentage-share bucket, sorted
    pub fn percentage_share_centers(&self) -> BTreeSet<String> {
        centers_in(&self.percentage_share)
    }

    /// Distinct center names in the flat-rate bucket, sorted
    pub fn flat_rate_centers(&self) -> BTreeSet<String> {
        centers_in(&self.flat_rate)
    }

    /// Distinct test types recorded for a percentage-share center
    ///
    /// Returns an empty set for a center with no percentage-share records.
    pub fn test_types_for(&self, center_name: &str) -> BTreeSet<String> {
        let center_name = center_name.trim();
        self.percentage_share
            .iter()
            .filter(|r| r.center_name.trim() == center_name)
            .map(|r| r.test_type.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Test types for every percentage-share center
    pub fn test_type_catalog(&self) -> TestTypeCatalog {
        let mut catalog = TestTypeCatalog::new();
        for record in &self.percentage_share {
            let center = record.center_name.trim();
            if center.is_empty() {
                continue;
            }
            let entry = catalog.entry(center.to_string()).or_default();
            let test_type = record.test_type.trim();
            if !test_type.is_empty() {
                entry.insert(test_type.to_string());
            }
        }
        catalog
    }

    /// Records of one center within one bucket, in input order
    pub fn records_for(&self, center_name: &str, billing_type: BillingType) -> Vec<&PatientTestRecord> {
        let center_name = center_name.trim();
        self.bucket(billing_type)
            .iter()
            .filter(|r| r.center_name.trim() == center_name)
            .collect()
    }
}

fn centers_in(records: &[PatientTestRecord]) -> BTreeSet<String> {
    records
        .iter()
        .map(|r| r.center_name.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
