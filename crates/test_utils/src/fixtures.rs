//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the billing workflow. These fixtures
//! are consistent and predictable so expected amounts can be written by hand.

use chrono::NaiveDate;
use core_kernel::{BillingPeriod, Money, Percentage};
use domain_billing::{OverrideRow, PatientTestRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::builders::TestRecordBuilder;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// MRP used in the worked billing examples
    pub fn mrp_1500() -> Money {
        Money::new(dec!(1500.00))
    }

    /// Contracted flat rate matching `mrp_1500`
    pub fn rate_1200() -> Money {
        Money::new(dec!(1200.00))
    }

    /// Rate above `mrp_1500`, producing negative sharing
    pub fn rate_above_mrp() -> Money {
        Money::new(dec!(1800.00))
    }

    /// Amount used for the words sample
    pub fn words_sample() -> Money {
        Money::new(dec!(123456.75))
    }
}

/// Fixture for percentage test data
pub struct PercentageFixtures;

impl PercentageFixtures {
    pub fn sixty() -> Percentage {
        Percentage::new(dec!(60)).unwrap()
    }

    pub fn default_share() -> Decimal {
        dec!(50)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A registration date inside June 2024
    pub fn registered_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    /// Month-end issue date, June 2024
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    /// Issue date in January, before the April fiscal start
    pub fn january_issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    /// The whole of June 2024
    pub fn june_period() -> BillingPeriod {
        BillingPeriod::calendar_month(Self::registered_on())
    }

    /// A period whose end precedes its start
    pub fn inverted_period() -> BillingPeriod {
        BillingPeriod {
            start: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }
}

/// Fixture for center and test names
pub struct StringFixtures;

impl StringFixtures {
    /// Percentage-share center
    pub fn hlm_center() -> &'static str {
        "Hansi Lab"
    }

    /// Flat-rate center
    pub fn b2b_center() -> &'static str {
        "Rohtak Scan Centre"
    }

    /// Second flat-rate center
    pub fn second_b2b_center() -> &'static str {
        "Jind Diagnostics"
    }
}

/// Fixture for complete record batches
pub struct RecordFixtures;

impl RecordFixtures {
    /// Mixed batch: two flat-rate centers and one percentage-share center
    pub fn mixed_batch() -> Vec<PatientTestRecord> {
        vec![
            TestRecordBuilder::flat_rate()
                .with_center(StringFixtures::b2b_center())
                .with_patient_name("Ravi Kumar")
                .with_test("CT Brain", "CT")
                .build(),
            TestRecordBuilder::percentage_share()
                .with_center(StringFixtures::hlm_center())
                .with_patient_name("Sunita Devi")
                .with_test("CBC", "Haematology")
                .with_mrp(dec!(400))
                .build(),
            TestRecordBuilder::flat_rate()
                .with_center(StringFixtures::second_b2b_center())
                .with_patient_name("Manoj Singh")
                .with_test("Chest PA", "X-Ray")
                .with_mrp(dec!(600))
                .with_rate(dec!(450))
                .build(),
            TestRecordBuilder::percentage_share()
                .with_center(StringFixtures::hlm_center())
                .with_patient_name("Kavita Rani")
                .with_test("Knee AP", "X-Ray")
                .build(),
            TestRecordBuilder::flat_rate()
                .with_center(StringFixtures::b2b_center())
                .with_patient_name("Ajay Yadav")
                .with_test("CT Brain", "CT")
                .build(),
        ]
    }

    /// Override rows for the percentage-share center in `mixed_batch`
    pub fn override_rows() -> Vec<OverrideRow> {
        vec![OverrideRow {
            center_name: StringFixtures::hlm_center().to_string(),
            test_type: "X-Ray".to_string(),
            share_percentage: dec!(60),
        }]
    }
}
