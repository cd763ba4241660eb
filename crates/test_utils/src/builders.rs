//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use core_kernel::Money;
use domain_billing::{PatientTestRecord, RecordRow};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing patient-test records
#[derive(Debug, Clone)]
pub struct TestRecordBuilder {
    visit_code: String,
    registered_date: NaiveDate,
    patient_name: String,
    age: u32,
    gender: String,
    mobile_number: Option<String>,
    test_name: String,
    test_code: String,
    center_name: String,
    modality: String,
    test_type: String,
    mrp: Money,
    centre_test_rate: Money,
    discriminator: Option<String>,
}

impl Default for TestRecordBuilder {
    fn default() -> Self {
        Self::flat_rate()
    }
}

impl TestRecordBuilder {
    /// Flat-rate record (MRP 1500, rate 1200)
    pub fn flat_rate() -> Self {
        Self {
            visit_code: "V0001".to_string(),
            registered_date: TemporalFixtures::registered_on(),
            patient_name: "Test Patient".to_string(),
            age: 35,
            gender: "F".to_string(),
            mobile_number: None,
            test_name: "CT Brain".to_string(),
            test_code: "CT001".to_string(),
            center_name: StringFixtures::b2b_center().to_string(),
            modality: "Radiology".to_string(),
            test_type: "CT".to_string(),
            mrp: MoneyFixtures::mrp_1500(),
            centre_test_rate: MoneyFixtures::rate_1200(),
            discriminator: Some("B2B".to_string()),
        }
    }

    /// Percentage-share record (MRP 1500)
    pub fn percentage_share() -> Self {
        Self::flat_rate()
            .with_center(StringFixtures::hlm_center())
            .with_discriminator("HLM")
    }

    /// Uses a generated patient name
    pub fn with_random_patient(mut self) -> Self {
        self.patient_name = Name().fake();
        self
    }

    pub fn with_visit_code(mut self, code: impl Into<String>) -> Self {
        self.visit_code = code.into();
        self
    }

    pub fn with_registered_date(mut self, date: NaiveDate) -> Self {
        self.registered_date = date;
        self
    }

    pub fn with_patient_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = name.into();
        self
    }

    pub fn with_center(mut self, center: impl Into<String>) -> Self {
        self.center_name = center.into();
        self
    }

    /// Sets the test name and test type
    pub fn with_test(mut self, test_name: impl Into<String>, test_type: impl Into<String>) -> Self {
        self.test_name = test_name.into();
        self.test_type = test_type.into();
        self
    }

    pub fn with_mrp(mut self, mrp: Decimal) -> Self {
        self.mrp = Money::new(mrp);
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.centre_test_rate = Money::new(rate);
        self
    }

    pub fn with_mobile_number(mut self, number: impl Into<String>) -> Self {
        self.mobile_number = Some(number.into());
        self
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn without_discriminator(mut self) -> Self {
        self.discriminator = None;
        self
    }

    /// Builds the record
    pub fn build(self) -> PatientTestRecord {
        PatientTestRecord {
            visit_code: self.visit_code,
            registered_date: self.registered_date,
            patient_name: self.patient_name,
            age: self.age,
            age_unit: "Years".to_string(),
            gender: self.gender,
            mobile_number: self.mobile_number,
            test_name: self.test_name,
            test_code: self.test_code,
            center_name: self.center_name,
            modality: self.modality,
            test_type: self.test_type,
            mrp: self.mrp,
            centre_test_rate: self.centre_test_rate,
            billing_discriminator: self.discriminator,
        }
    }

    /// Builds the equivalent raw input row, discriminator in `BillingType`
    pub fn build_row(self) -> RecordRow {
        RecordRow {
            visit_code: Some(self.visit_code),
            registered_date: Some(self.registered_date.format("%d/%m/%Y").to_string()),
            patient_name: Some(self.patient_name),
            age: Some(self.age.to_string()),
            age_unit: Some("Years".to_string()),
            gender: Some(self.gender),
            mobile_number: self.mobile_number,
            test_name: Some(self.test_name),
            test_code: Some(self.test_code),
            center_name: Some(self.center_name),
            modality: Some(self.modality),
            mrp: Some(self.mrp.amount().to_string()),
            centre_test_rate: Some(self.centre_test_rate.amount().to_string()),
            test_type: Some(self.test_type),
            billing_type: self.discriminator,
        }
    }
}
