//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Money, Percentage};
use domain_billing::PatientTestRecord;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::TestRecordBuilder;

/// Strategy for non-negative amounts in paise, up to one crore rupees
pub fn paise_strategy() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000i64
}

/// Strategy for non-negative Money at paise precision
pub fn money_strategy() -> impl Strategy<Value = Money> {
    paise_strategy().prop_map(Money::from_paise)
}

/// Strategy for Money with up to four decimal places, to exercise rounding
pub fn unrounded_money_strategy() -> impl Strategy<Value = Money> {
    (0i64..10_000_000_000i64).prop_map(|n| Money::new(Decimal::new(n, 4)))
}

/// Strategy for percentages 0.00 to 100.00
pub fn percentage_strategy() -> impl Strategy<Value = Percentage> {
    (0u32..=10000u32).prop_filter_map("percentage in range", |n| {
        Percentage::new(Decimal::new(n as i64, 2)).ok()
    })
}

/// Strategy for percentage values outside 0 to 100
pub fn out_of_range_percentage_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(-n, 2)),
        (10001i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
    ]
}

/// Strategy for raw discriminator values, recognised or not
pub fn discriminator_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("HLM".to_string())),
        Just(Some("Percentage-Share".to_string())),
        Just(Some("B2B".to_string())),
        "[ -~]{0,16}".prop_map(Some),
    ]
}

/// Strategy for valid records across a few centers
pub fn record_strategy() -> impl Strategy<Value = PatientTestRecord> {
    (
        prop::sample::select(vec!["Hansi Lab", "Rohtak Scan Centre", "Jind Diagnostics"]),
        prop::sample::select(vec!["X-Ray", "CT", "Haematology"]),
        money_strategy(),
        money_strategy(),
        discriminator_strategy(),
        "[A-Z][a-z]{2,10}",
    )
        .prop_map(|(center, test_type, mrp, rate, discriminator, name)| {
            let builder = TestRecordBuilder::flat_rate()
                .with_center(center)
                .with_patient_name(name)
                .with_test(format!("{} test", test_type), test_type)
                .with_mrp(mrp.amount())
                .with_rate(rate.amount());
            let builder = match discriminator {
                Some(d) => builder.with_discriminator(d),
                None => builder.without_discriminator(),
            };
            builder.build()
        })
}

/// Strategy for batches of records
pub fn record_batch_strategy(max: usize) -> impl Strategy<Value = Vec<PatientTestRecord>> {
    proptest::collection::vec(record_strategy(), 0..=max)
}
