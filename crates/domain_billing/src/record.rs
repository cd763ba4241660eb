//! Patient-test records and billing-type classification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::Money;
use crate::error::BillingError;

/// Discriminator values that select the percentage-share model
///
/// Compared case-insensitively after trimming. `HLM` is the channel code
/// used by upstream registration exports.
const PERCENTAGE_SHARE_TOKENS: &[&str] = &[
    "percentage-share",
    "percentage_share",
    "percentage share",
    "percentageshare",
    "hlm",
];

/// The two billing models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BillingType {
    /// Center is paid its contracted test rate; the rest of MRP is shared
    FlatRate,
    /// A percentage of MRP is shared; the center is paid the remainder
    PercentageShare,
}

impl BillingType {
    /// Classifies a raw discriminator value
    ///
    /// Anything that is not a percentage-share token, including an absent
    /// value, is flat rate. Classification never fails.
    pub fn from_discriminator(raw: Option<&str>) -> Self {
        match raw {
            Some(value) => {
                let token = value.trim().to_ascii_lowercase();
                if PERCENTAGE_SHARE_TOKENS.contains(&token.as_str()) {
                    BillingType::PercentageShare
                } else {
                    BillingType::FlatRate
                }
            }
            None => BillingType::FlatRate,
        }
    }
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingType::FlatRate => write!(f, "Flat Rate"),
            BillingType::PercentageShare => write!(f, "Percentage Share"),
        }
    }
}

/// One row of input: a single test performed during a patient visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientTestRecord {
    /// Visit identifier
    pub visit_code: String,
    /// Registration date of the visit
    pub registered_date: NaiveDate,
    pub patient_name: String,
    pub age: u32,
    /// Unit for `age` (Years, Months, Days)
    pub age_unit: String,
    pub gender: String,
    /// Patient contact number, when the export carries one
    pub mobile_number: Option<String>,
    pub test_name: String,
    pub test_code: String,
    pub center_name: String,
    pub modality: String,
    pub test_type: String,
    /// Maximum retail price of the test
    pub mrp: Money,
    /// Contracted rate payable to the center
    pub centre_test_rate: Money,
    /// Free-form billing-type discriminator
    pub billing_discriminator: Option<String>,
}

impl PatientTestRecord {
    /// Returns the billing model selected by this record's discriminator
    pub fn billing_type(&self) -> BillingType {
        BillingType::from_discriminator(self.billing_discriminator.as_deref())
    }

    /// Checks type and range constraints on an ingested record
    ///
    /// # Errors
    ///
    /// - `MissingField` if the center name is blank
    /// - `Validation` if MRP or the centre test rate is negative
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.center_name.trim().is_empty() {
            return Err(BillingError::missing_field("CENTER NAME"));
        }
        if self.mrp.is_negative() {
            return Err(BillingError::validation(format!(
                "MRP must not be negative (visit {}): {}",
                self.visit_code,
                self.mrp.amount()
            )));
        }
        if self.centre_test_rate.is_negative() {
            return Err(BillingError::validation(format!(
                "centre test rate must not be negative (visit {}): {}",
                self.visit_code,
                self.centre_test_rate.amount()
            )));
        }
        Ok(())
    }
}

/// Normalizes a lookup key: trimmed and lowercased
pub(crate) fn lookup_key(value: &str) -> String {
    value.trim().to_lowercase()
}
