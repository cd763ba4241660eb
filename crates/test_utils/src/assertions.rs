//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for billing types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_billing::{ComputedLine, Invoice};
use rust_decimal::Decimal;

/// Asserts that a Money value equals an expected amount
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money mismatch: actual={}, expected={}",
        actual.amount(),
        expected
    );
}

/// Asserts that a line satisfies `sharing + payable == mrp` at paise precision
///
/// # Panics
///
/// Panics if the identity fails or any amount has more than two decimals
pub fn assert_line_balanced(line: &ComputedLine) {
    assert_eq!(
        line.sharing_amount() + line.payable_rate(),
        line.mrp(),
        "Line for visit {} does not balance: sharing={}, payable={}, mrp={}",
        line.record().visit_code,
        line.sharing_amount().amount(),
        line.payable_rate().amount(),
        line.mrp().amount()
    );
    for amount in [line.mrp(), line.sharing_amount(), line.payable_rate()] {
        assert!(
            amount.amount().scale() <= 2,
            "Amount {} is not at paise precision",
            amount.amount()
        );
    }
}

/// Asserts that an invoice's totals equal the sums over its lines
pub fn assert_invoice_totals(invoice: &Invoice) {
    let summary = invoice.summary();
    let lines = invoice.lines();

    let payable: Money = lines.iter().map(|l| l.payable_rate()).sum();
    let sharing: Money = lines.iter().map(|l| l.sharing_amount()).sum();
    let mrp: Money = lines.iter().map(|l| l.mrp()).sum();

    assert_eq!(summary.net_payable, payable, "Net payable does not match lines");
    assert_eq!(summary.total_sharing, sharing, "Total sharing does not match lines");
    assert_eq!(summary.total_mrp, mrp, "Total MRP does not match lines");
    assert_eq!(summary.total_count, lines.len(), "Line count mismatch");
    assert_eq!(
        summary.rows.iter().map(|r| r.count).sum::<usize>(),
        lines.len(),
        "Summary rows do not cover every line"
    );
}

/// Asserts that sequences form exactly the range `[start, start + len)`
pub fn assert_contiguous_sequences(mut sequences: Vec<u32>, start: u32) {
    sequences.sort_unstable();
    let expected: Vec<u32> = (0..sequences.len() as u32).map(|i| start + i).collect();
    assert_eq!(
        sequences, expected,
        "Sequences are not distinct and gap-free from {}",
        start
    );
}
