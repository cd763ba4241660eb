//! Percentage-share configuration workflow
//!
//! A [`SharingConfigResolver`] walks one center through the two-step
//! configuration handshake:
//!
//! ```text
//! AwaitingCenterSelection --select_center--> AwaitingSharingInput --submit_sharing--> Ready
//! ```
//!
//! One resolver covers exactly one center and one attempt. Abandoning an
//! attempt is dropping the resolver; nothing is committed until an invoice
//! is generated from a `Ready` resolver.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use core_kernel::{Money, Percentage};
use crate::engine::BillingEngine;
use crate::error::BillingError;
use crate::record::lookup_key;
use crate::segmenter::{Segmentation, TestTypeCatalog};

/// Observable state of a resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverState {
    AwaitingCenterSelection,
    AwaitingSharingInput,
    Ready,
}

impl fmt::Display for ResolverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolverState::AwaitingCenterSelection => "AwaitingCenterSelection",
            ResolverState::AwaitingSharingInput => "AwaitingSharingInput",
            ResolverState::Ready => "Ready",
        };
        f.write_str(name)
    }
}

/// Frozen sharing percentages for one center
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingConfig {
    center_name: String,
    /// Keyed by lowercased, trimmed test type
    overrides: BTreeMap<String, Percentage>,
    default_percentage: Percentage,
}

impl SharingConfig {
    pub fn center_name(&self) -> &str {
        &self.center_name
    }

    pub fn default_percentage(&self) -> Percentage {
        self.default_percentage
    }

    /// Explicit per-test-type percentages (normalized keys)
    pub fn overrides(&self) -> &BTreeMap<String, Percentage> {
        &self.overrides
    }

    /// Returns the override for a test type, else the default
    pub fn effective_percentage(&self, test_type: &str) -> Percentage {
        self.overrides
            .get(&lookup_key(test_type))
            .copied()
            .unwrap_or(self.default_percentage)
    }
}

/// A live calculation for a candidate percentage, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharingPreview {
    pub test_type: String,
    pub percentage: Percentage,
    pub mrp: Money,
    pub sharing_amount: Money,
    pub payable_rate: Money,
}

#[derive(Debug, Clone)]
enum Stage {
    AwaitingCenterSelection,
    AwaitingSharingInput {
        center_name: String,
        test_types: BTreeSet<String>,
    },
    Ready {
        config: SharingConfig,
        test_types: BTreeSet<String>,
    },
}

/// Two-step sharing configuration state machine for one center
///
/// Callers must serialize access to one instance.
#[derive(Debug, Clone)]
pub struct SharingConfigResolver {
    catalog: TestTypeCatalog,
    stage: Stage,
}

impl SharingConfigResolver {
    /// Creates a resolver over the percentage-share centers of a segmentation
    pub fn new(segmentation: &Segmentation) -> Self {
        Self::from_catalog(segmentation.test_type_catalog())
    }

    /// Creates a resolver from a center → test types catalog
    pub fn from_catalog(catalog: TestTypeCatalog) -> Self {
        Self {
            catalog,
            stage: Stage::AwaitingCenterSelection,
        }
    }

    /// Returns the current state
    pub fn state(&self) -> ResolverState {
        match self.stage {
            Stage::AwaitingCenterSelection => ResolverState::AwaitingCenterSelection,
            Stage::AwaitingSharingInput { .. } => ResolverState::AwaitingSharingInput,
            Stage::Ready { .. } => ResolverState::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ResolverState::Ready
    }

    /// Centers this resolver may select
    pub fn available_centers(&self) -> impl Iterator<Item = &str> {
        self.catalog.keys().map(String::as_str)
    }

    /// The selected center, once one has been selected
    pub fn center_name(&self) -> Option<&str> {
        match &self.stage {
            Stage::AwaitingCenterSelection => None,
            Stage::AwaitingSharingInput { center_name, .. } => Some(center_name),
            Stage::Ready { config, .. } => Some(config.center_name()),
        }
    }

    /// Test types of the selected center
    pub fn test_types(&self) -> Option<&BTreeSet<String>> {
        match &self.stage {
            Stage::AwaitingCenterSelection => None,
            Stage::AwaitingSharingInput { test_types, .. } | Stage::Ready { test_types, .. } => {
                Some(test_types)
            }
        }
    }

    /// The frozen configuration, once `Ready`
    pub fn config(&self) -> Option<&SharingConfig> {
        match &self.stage {
            Stage::Ready { config, .. } => Some(config),
            _ => None,
        }
    }

    /// Selects the center to configure
    ///
    /// # Errors
    ///
    /// - `ConfigNotReady` if a center was already selected
    /// - `UnknownCenter` if the center has no percentage-share records
    pub fn select_center(&mut self, center_name: &str) -> Result<BTreeSet<String>, BillingError> {
        if !matches!(self.stage, Stage::AwaitingCenterSelection) {
            return Err(self.out_of_order("select_center", ResolverState::AwaitingCenterSelection));
        }

        let center_name = center_name.trim();
        let test_types = self
            .catalog
            .get(center_name)
            .cloned()
            .ok_or_else(|| BillingError::UnknownCenter(center_name.to_string()))?;

        tracing::debug!(center = center_name, test_types = test_types.len(), "Center selected for sharing");

        self.stage = Stage::AwaitingSharingInput {
            center_name: center_name.to_string(),
            test_types: test_types.clone(),
        };
        Ok(test_types)
    }

    /// Freezes the sharing percentages for the selected center
    ///
    /// Test types without an override inherit `default_percentage`. On error
    /// the resolver stays in `AwaitingSharingInput` so the caller can
    /// re-prompt.
    ///
    /// # Errors
    ///
    /// - `ConfigNotReady` unless the resolver is awaiting sharing input
    /// - `InvalidPercentage` if the default or any override is outside 0 to 100
    pub fn submit_sharing<I, K>(
        &mut self,
        overrides: I,
        default_percentage: Decimal,
    ) -> Result<SharingConfig, BillingError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: AsRef<str>,
    {
        let (center_name, test_types) = match &self.stage {
            Stage::AwaitingSharingInput { center_name, test_types } => {
                (center_name.clone(), test_types.clone())
            }
            _ => return Err(self.out_of_order("submit_sharing", ResolverState::AwaitingSharingInput)),
        };

        let default_percentage = Percentage::new(default_percentage)
            .map_err(|_| BillingError::invalid_percentage("default", default_percentage))?;

        let known: BTreeSet<String> = test_types.iter().map(|t| lookup_key(t)).collect();
        let mut validated = BTreeMap::new();
        for (test_type, value) in overrides {
            let test_type = test_type.as_ref();
            let percentage = Percentage::new(value)
                .map_err(|_| BillingError::invalid_percentage(format!("test type {}", test_type), value))?;
            let key = lookup_key(test_type);
            if !known.contains(&key) {
                tracing::warn!(
                    center = %center_name,
                    test_type,
                    "Sharing override for a test type the center did not record"
                );
            }
            validated.insert(key, percentage);
        }

        tracing::info!(
            center = %center_name,
            overrides = validated.len(),
            default = %default_percentage,
            "Sharing configuration ready"
        );

        let config = SharingConfig {
            center_name,
            overrides: validated,
            default_percentage,
        };
        self.stage = Stage::Ready {
            config: config.clone(),
            test_types,
        };
        Ok(config)
    }

    /// Percentage in force for a test type
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotReady` unless the resolver is `Ready`.
    pub fn effective_percentage(&self, test_type: &str) -> Result<Percentage, BillingError> {
        self.config()
            .map(|config| config.effective_percentage(test_type))
            .ok_or_else(|| self.out_of_order("effective_percentage", ResolverState::Ready))
    }

    /// Computes sharing and payable for a sample MRP without changing state
    ///
    /// Uses the same formula and rounding as invoice generation.
    ///
    /// # Errors
    ///
    /// - `ConfigNotReady` before a center is selected
    /// - `InvalidPercentage` if the candidate is outside 0 to 100
    /// - `Validation` if the sample MRP is negative
    pub fn preview(
        &self,
        test_type: &str,
        candidate_percentage: Decimal,
        sample_mrp: Money,
    ) -> Result<SharingPreview, BillingError> {
        if matches!(self.stage, Stage::AwaitingCenterSelection) {
            return Err(self.out_of_order("preview", ResolverState::AwaitingSharingInput));
        }
        if sample_mrp.is_negative() {
            return Err(BillingError::validation(format!(
                "sample MRP must not be negative: {}",
                sample_mrp.amount()
            )));
        }

        let percentage = Percentage::new(candidate_percentage)
            .map_err(|_| BillingError::invalid_percentage(format!("test type {}", test_type), candidate_percentage))?;
        let mrp = sample_mrp.round_to_paise();
        let (sharing_amount, payable_rate) = BillingEngine::split_by_percentage(mrp, percentage)?;

        Ok(SharingPreview {
            test_type: test_type.trim().to_string(),
            percentage,
            mrp,
            sharing_amount,
            payable_rate,
        })
    }

    fn out_of_order(&self, operation: &str, expected: ResolverState) -> BillingError {
        BillingError::ConfigNotReady(format!(
            "{} requires {}, resolver is {}",
            operation,
            expected,
            self.state()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> TestTypeCatalog {
        let mut catalog = TestTypeCatalog::new();
        catalog.insert(
            "Hansi Lab".to_string(),
            ["Haematology", "X-Ray"].iter().map(|s| s.to_string()).collect(),
        );
        catalog
    }

    #[test]
    fn test_happy_path() {
        let mut resolver = SharingConfigResolver::from_catalog(catalog());
        assert_eq!(resolver.state(), ResolverState::AwaitingCenterSelection);

        let types = resolver.select_center("Hansi Lab").unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(resolver.state(), ResolverState::AwaitingSharingInput);

        resolver.submit_sharing([("x-ray", dec!(60))], dec!(50)).unwrap();
        assert!(resolver.is_ready());
        assert_eq!(resolver.effective_percentage("X-Ray").unwrap().value(), dec!(60));
        assert_eq!(resolver.effective_percentage("Haematology").unwrap().value(), dec!(50));
    }

    #[test]
    fn test_failed_submit_keeps_state() {
        let mut resolver = SharingConfigResolver::from_catalog(catalog());
        resolver.select_center("Hansi Lab").unwrap();
        let err = resolver.submit_sharing([("X-Ray", dec!(101))], dec!(50)).unwrap_err();
        assert!(matches!(err, BillingError::InvalidPercentage { .. }));
        assert_eq!(resolver.state(), ResolverState::AwaitingSharingInput);
    }

    #[test]
    fn test_second_selection_is_rejected() {
        let mut resolver = SharingConfigResolver::from_catalog(catalog());
        resolver.select_center("Hansi Lab").unwrap();
        assert!(matches!(
            resolver.select_center("Hansi Lab"),
            Err(BillingError::ConfigNotReady(_))
        ));
    }
}
