//! Amounts in words, Indian numbering system
//!
//! Digits are grouped as the last three, then pairs for Thousand, Lakh and
//! Crore. The crore multiplier is itself rendered in Indian numbering, so
//! 100 crore reads "One Hundred Crore" and 1,00,000 crore reads
//! "One Lakh Crore".

use core_kernel::Money;
use crate::error::BillingError;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// Renders an amount as an Indian-numbering phrase
///
/// The amount is first rounded to paise, half to even.
///
/// ```text
/// 123456.75 -> One Lakh Twenty Three Thousand Four Hundred Fifty Six and Seventy Five Paise Only
/// 0.50      -> Fifty Paise Only
/// 0         -> Zero Only
/// ```
///
/// # Errors
///
/// Returns `InvalidAmount` for a negative amount.
pub fn amount_in_words(amount: Money) -> Result<String, BillingError> {
    if amount.is_negative() {
        return Err(BillingError::InvalidAmount(format!(
            "cannot express a negative amount in words: {}",
            amount.amount()
        )));
    }

    let (rupees, paise) = amount.round_to_paise().rupees_and_paise()?;

    let phrase = match (rupees, paise) {
        (0, 0) => "Zero Only".to_string(),
        (0, p) => format!("{} Paise Only", below_hundred(u64::from(p))),
        (r, 0) => format!("{} Only", integer_in_words(r)),
        (r, p) => format!(
            "{} and {} Paise Only",
            integer_in_words(r),
            below_hundred(u64::from(p))
        ),
    };
    Ok(phrase)
}

/// Words for a positive whole number; empty for zero
fn integer_in_words(n: u64) -> String {
    let mut parts: Vec<String> = Vec::new();

    let crores = n / CRORE;
    if crores > 0 {
        parts.push(format!("{} Crore", integer_in_words(crores)));
    }

    let rest = n % CRORE;
    let lakhs = rest / LAKH;
    if lakhs > 0 {
        parts.push(format!("{} Lakh", below_hundred(lakhs)));
    }
    let thousands = (rest % LAKH) / THOUSAND;
    if thousands > 0 {
        parts.push(format!("{} Thousand", below_hundred(thousands)));
    }
    let last = rest % THOUSAND;
    if last > 0 {
        parts.push(below_thousand(last));
    }

    parts.join(" ")
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, r) => below_hundred(r),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn words(amount: rust_decimal::Decimal) -> String {
        amount_in_words(Money::new(amount)).unwrap()
    }

    #[test]
    fn test_groups() {
        assert_eq!(words(dec!(7)), "Seven Only");
        assert_eq!(words(dec!(40)), "Forty Only");
        assert_eq!(words(dec!(100)), "One Hundred Only");
        assert_eq!(words(dec!(1015)), "One Thousand Fifteen Only");
        assert_eq!(words(dec!(100000)), "One Lakh Only");
        assert_eq!(words(dec!(25000000)), "Two Crore Fifty Lakh Only");
    }

    #[test]
    fn test_large_crore_multiplier() {
        assert_eq!(words(dec!(1000000000)), "One Hundred Crore Only");
        assert_eq!(words(dec!(1000000000000)), "One Lakh Crore Only");
    }

    #[test]
    fn test_paise_rounding() {
        // 10.125 rounds half-even to 10.12
        assert_eq!(words(dec!(10.125)), "Ten and Twelve Paise Only");
        assert_eq!(words(dec!(0.995)), "One Only");
    }
}
