//! Conversion of already-parsed table rows into validated records
//!
//! File parsing belongs to the caller (the batch binary reads CSV with the
//! `csv` crate). This module only maps one row of optional text cells onto a
//! [`PatientTestRecord`], reporting the first missing or malformed field.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use core_kernel::Money;
use crate::error::BillingError;
use crate::record::PatientTestRecord;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// One raw input row, keyed by the registration export's column headers
///
/// Every cell is optional so that a missing column surfaces as a
/// `MissingField` error on conversion rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordRow {
    #[serde(rename = "PatientVisitCode", default)]
    pub visit_code: Option<String>,
    #[serde(rename = "RegisteredDate", default)]
    pub registered_date: Option<String>,
    #[serde(rename = "PatientName", default)]
    pub patient_name: Option<String>,
    #[serde(rename = "Age", default)]
    pub age: Option<String>,
    #[serde(rename = "AgeUnit", default)]
    pub age_unit: Option<String>,
    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,
    #[serde(rename = "MobileNumber", default)]
    pub mobile_number: Option<String>,
    #[serde(rename = "TEST NAME", default)]
    pub test_name: Option<String>,
    #[serde(rename = "CODE NO", default)]
    pub test_code: Option<String>,
    #[serde(rename = "CENTER NAME", default)]
    pub center_name: Option<String>,
    #[serde(rename = "Modality", default)]
    pub modality: Option<String>,
    #[serde(rename = "MRP", default)]
    pub mrp: Option<String>,
    #[serde(rename = "CentreTestRate", default)]
    pub centre_test_rate: Option<String>,
    #[serde(rename = "TEST TYPE", default)]
    pub test_type: Option<String>,
    #[serde(rename = "BillingType", alias = "BILLING TYPE", default)]
    pub billing_type: Option<String>,
}

impl RecordRow {
    /// Converts the row into a validated record
    ///
    /// The discriminator is read from the `BillingType` column; rows in the
    /// older layout carry it in `MobileNumber` instead, and then have no
    /// contact number. An absent discriminator is not an error (the record
    /// bills at flat rate).
    ///
    /// # Errors
    ///
    /// - `MissingField` naming the first absent or blank required column
    /// - `Validation` for unparseable dates, ages or amounts, and for
    ///   negative amounts
    pub fn into_record(self) -> Result<PatientTestRecord, BillingError> {
        let mobile_number = non_blank(self.mobile_number);
        let (discriminator, mobile_number) = match non_blank(self.billing_type) {
            Some(billing_type) => (Some(billing_type), mobile_number),
            None => (mobile_number, None),
        };

        let record = PatientTestRecord {
            visit_code: required(self.visit_code, "PatientVisitCode")?,
            registered_date: parse_date(&required(self.registered_date, "RegisteredDate")?)?,
            patient_name: required(self.patient_name, "PatientName")?,
            age: parse_age(&required(self.age, "Age")?)?,
            age_unit: required(self.age_unit, "AgeUnit")?,
            gender: required(self.gender, "Gender")?,
            mobile_number,
            test_name: required(self.test_name, "TEST NAME")?,
            test_code: required(self.test_code, "CODE NO")?,
            center_name: required(self.center_name, "CENTER NAME")?,
            modality: required(self.modality, "Modality")?,
            test_type: required(self.test_type, "TEST TYPE")?,
            mrp: parse_amount(&required(self.mrp, "MRP")?, "MRP")?,
            centre_test_rate: parse_amount(
                &required(self.centre_test_rate, "CentreTestRate")?,
                "CentreTestRate",
            )?,
            billing_discriminator: discriminator,
        };

        record.validate()?;
        Ok(record)
    }
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(cell: Option<String>, column: &str) -> Result<String, BillingError> {
    non_blank(cell).ok_or_else(|| BillingError::missing_field(column))
}

/// Parses a calendar date in any of the accepted export formats
pub fn parse_date(raw: &str) -> Result<NaiveDate, BillingError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| BillingError::validation(format!("unrecognised date: {}", raw)))
}

fn parse_age(raw: &str) -> Result<u32, BillingError> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|d| !d.is_sign_negative())
        .and_then(|d| d.trunc().to_u32())
        .ok_or_else(|| BillingError::validation(format!("invalid age: {}", raw)))
}

/// Parses a rupee amount, tolerating a currency symbol and digit grouping
///
/// The result is rounded to paise.
pub fn parse_amount(raw: &str, column: &str) -> Result<Money, BillingError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let amount = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| BillingError::validation(format!("{} is not a number: {}", column, raw)))?;

    Ok(Money::new(amount).round_to_paise())
}
