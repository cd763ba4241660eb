//! Prefilled sharing percentages
//!
//! An override table maps (center, test type) to a share percentage. It only
//! prefills the resolver's sharing input; the caller still submits the
//! percentages explicitly.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use core_kernel::Percentage;
use crate::error::BillingError;
use crate::record::lookup_key;

/// One row of the override table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverrideRow {
    #[serde(rename = "CENTER NAME")]
    pub center_name: String,
    #[serde(rename = "TEST TYPE")]
    pub test_type: String,
    #[serde(rename = "SHARE_PERCENTAGE")]
    pub share_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OverrideEntry {
    center_key: String,
    test_type: String,
    percentage: Percentage,
}

/// Validated override table
///
/// Center and test type are matched case-insensitively after trimming. For a
/// repeated (center, test type) pair the first row wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareOverrideTable {
    entries: Vec<OverrideEntry>,
}

impl ShareOverrideTable {
    /// Builds a table, rejecting any out-of-range percentage
    ///
    /// # Errors
    ///
    /// - `InvalidPercentage` naming the offending center and test type
    /// - `MissingField` for a blank center or test type
    pub fn from_rows<I>(rows: I) -> Result<Self, BillingError>
    where
        I: IntoIterator<Item = OverrideRow>,
    {
        let mut entries = Vec::new();
        for row in rows {
            if row.center_name.trim().is_empty() {
                return Err(BillingError::missing_field("CENTER NAME"));
            }
            if row.test_type.trim().is_empty() {
                return Err(BillingError::missing_field("TEST TYPE"));
            }
            let percentage = Percentage::new(row.share_percentage).map_err(|_| {
                BillingError::invalid_percentage(
                    format!("{} / {}", row.center_name.trim(), row.test_type.trim()),
                    row.share_percentage,
                )
            })?;
            entries.push(OverrideEntry {
                center_key: lookup_key(&row.center_name),
                test_type: row.test_type.trim().to_string(),
                percentage,
            });
        }

        tracing::debug!(rows = entries.len(), "Loaded share override table");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Percentages for one center, keyed by test type as written in the table
    pub fn overrides_for(&self, center_name: &str) -> BTreeMap<String, Decimal> {
        let center_key = lookup_key(center_name);
        let mut seen = std::collections::BTreeSet::new();
        let mut overrides = BTreeMap::new();
        for entry in self.entries.iter().filter(|e| e.center_key == center_key) {
            if seen.insert(lookup_key(&entry.test_type)) {
                overrides.insert(entry.test_type.clone(), entry.percentage.value());
            }
        }
        overrides
    }

    /// Percentage for one (center, test type), if the table has one
    pub fn lookup(&self, center_name: &str, test_type: &str) -> Option<Percentage> {
        let center_key = lookup_key(center_name);
        let test_key = lookup_key(test_type);
        self.entries
            .iter()
            .find(|e| e.center_key == center_key && lookup_key(&e.test_type) == test_key)
            .map(|e| e.percentage)
    }
}
