//! Tests for billing periods, fiscal years and the billing timezone

use chrono::NaiveDate;
use core_kernel::{BillingPeriod, FiscalYear, TemporalError, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod billing_period {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let period = BillingPeriod::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
        assert!(period.contains(date(2024, 6, 1)));
        assert!(period.contains(date(2024, 6, 30)));
        assert!(!period.contains(date(2024, 7, 1)));
        assert_eq!(period.days(), 30);
    }

    #[test]
    fn test_reversed_period_reports_both_dates() {
        let err = BillingPeriod::new(date(2024, 6, 30), date(2024, 6, 1)).unwrap_err();
        assert_eq!(
            err,
            TemporalError::InvalidPeriod {
                start: date(2024, 6, 30),
                end: date(2024, 6, 1),
            }
        );
    }

    #[test]
    fn test_deserialized_period_can_be_revalidated() {
        let json = r#"{"start":"2024-06-30","end":"2024-06-01"}"#;
        let period: BillingPeriod = serde_json::from_str(json).unwrap();
        assert!(period.validate().is_err());
    }

    #[test]
    fn test_display() {
        let period = BillingPeriod::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
        assert_eq!(period.to_string(), "01/06/2024 to 30/06/2024");
    }
}

mod fiscal_year {
    use super::*;

    #[test]
    fn test_april_start() {
        let fy = FiscalYear::containing(date(2025, 2, 10), 4).unwrap();
        assert_eq!(fy.start_year(), 2024);
        assert_eq!(fy.end_year(), 2025);
        assert_eq!(fy.to_string(), "2024-2025");
    }

    #[test]
    fn test_invalid_start_month() {
        assert_eq!(
            FiscalYear::containing(date(2025, 2, 10), 0),
            Err(TemporalError::InvalidFiscalStartMonth(0))
        );
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_serde_round_trip_by_name() {
        let tz = Timezone::default();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Asia/Kolkata\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}
