//! Tests for the batch front end

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::path::PathBuf;

use core_kernel::BatchRunId;
use domain_billing::ShareOverrideTable;
use interface_batch::{intake, BatchError, BatchRunner, BillingConfig};
use test_utils::{RecordFixtures, TemporalFixtures};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("center-billing-{}", BatchRunId::new()))
}

// ============================================================================
// Configuration Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillingConfig::from_vars(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config, BillingConfig::default());
        assert_eq!(config.fiscal_year_start_month, 4);
        assert_eq!(config.invoice_sequence_start, 1);
        assert_eq!(config.invoice_prefix, "KRPL");
        assert_eq!(config.default_share_percentage, dec!(50));
        assert_eq!(config.statutory_notes.len(), 2);
    }

    #[test]
    fn test_environment_overrides() {
        let config = BillingConfig::from_vars([
            ("BILLING_INVOICE_PREFIX", "HLAB"),
            ("BILLING_FISCAL_YEAR_START_MONTH", "1"),
            ("BILLING_DEFAULT_SHARE_PERCENTAGE", "40"),
            ("BILLING_STATUTORY_NOTES", "First note|Second note"),
            ("BILLING_ISSUE_DATE", "2024-06-30"),
        ])
        .unwrap();

        assert_eq!(config.invoice_prefix, "HLAB");
        assert_eq!(config.fiscal_year_start_month, 1);
        assert_eq!(config.default_share_percentage, dec!(40));
        assert_eq!(config.statutory_notes, ["First note", "Second note"]);
        assert_eq!(config.issue_date().unwrap(), TemporalFixtures::issue_date());
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("BILLING_FISCAL_YEAR_START_MONTH", "13"),
            ("BILLING_DEFAULT_SHARE_PERCENTAGE", "120"),
            ("BILLING_TIMEZONE", "Mars/Olympus"),
        ] {
            let result = BillingConfig::from_vars([(key, value)]);
            assert!(matches!(result, Err(BatchError::InvalidConfig(_))), "{key}={value}");
        }
    }

    #[test]
    fn test_period_needs_both_ends() {
        let config = BillingConfig {
            period_start: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            ..BillingConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BillingConfig {
            period_start: Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()),
            period_end: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            ..BillingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_numbering_from_config() {
        let numbering = BillingConfig::default().numbering();
        assert_eq!(numbering.prefix, "KRPL");
        assert_eq!(numbering.fiscal_year_start_month, 4);
        assert_eq!(numbering.initial_sequence, 1);
    }
}

// ============================================================================
// Intake Tests
// ============================================================================

mod intake_tests {
    use super::*;

    const EXPORT: &str = "\
PatientVisitCode,RegisteredDate,PatientName,Age,AgeUnit,Gender,MobileNumber,TEST NAME,CODE NO,CENTER NAME,Modality,MRP,CentreTestRate,TEST TYPE,BillingType
V1, 2024-06-03 ,Asha,41,Years,F,,CBC,H01,Hansi Lab,Pathology,400,0,Haematology,HLM
V2,03/06/2024,Ravi,29,Years,M,9876543210,CT Brain,C01,Rohtak Scan Centre,Radiology,1500,1200,CT,B2B
V3,04/06/2024,Neha,33,Years,F,,Chest PA,X01,,Radiology,600,450,X-Ray,B2B
V4,05/06/2024,Om,60,Years,M,,Chest PA,X01,Rohtak Scan Centre,Radiology,six hundred,450,X-Ray,B2B
";

    #[test]
    fn test_bad_rows_are_skipped_and_reported() {
        let report = intake::read_records(EXPORT.as_bytes()).unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].line, 4);
        assert!(report.rejected[0].reason.contains("CENTER NAME"));
        assert_eq!(report.rejected[1].line, 5);
    }

    #[test]
    fn test_overrides_table() {
        let data = "CENTER NAME,TEST TYPE,SHARE_PERCENTAGE\nHansi Lab,X-Ray,60\nHansi Lab,CT,45.5\n";
        let table = intake::read_overrides(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.overrides_for("hansi lab").get("CT"), Some(&dec!(45.5)));
    }

    #[test]
    fn test_overrides_out_of_range_fails_whole_table() {
        let data = "CENTER NAME,TEST TYPE,SHARE_PERCENTAGE\nHansi Lab,X-Ray,160\n";
        assert!(matches!(
            intake::read_overrides(data.as_bytes()),
            Err(BatchError::Billing(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = scratch_dir().join("missing.csv");
        assert!(matches!(
            intake::read_records_from_path(&path),
            Err(BatchError::Io { .. })
        ));
    }
}

// ============================================================================
// Runner Tests
// ============================================================================

mod runner_tests {
    use super::*;

    fn config(output_dir: PathBuf) -> BillingConfig {
        BillingConfig {
            output_dir,
            issue_date: Some(TemporalFixtures::issue_date()),
            ..BillingConfig::default()
        }
    }

    #[test]
    fn test_run_invoices_every_center() {
        let dir = scratch_dir();
        let table = ShareOverrideTable::from_rows(RecordFixtures::override_rows()).unwrap();

        let summary = BatchRunner::new(config(dir.clone()))
            .run(RecordFixtures::mixed_batch(), table, Vec::new())
            .unwrap();

        assert!(!summary.has_failures());
        assert_eq!(summary.generated.len(), 3);
        assert_eq!(
            summary.period.map(|p| (p.start, p.end)),
            Some((TemporalFixtures::registered_on(), TemporalFixtures::registered_on()))
        );

        let numbers: Vec<_> = summary.generated.iter().map(|g| g.invoice_number.as_str()).collect();
        assert_eq!(
            numbers,
            [
                "KRPL/2024-2025/06/001",
                "KRPL/2024-2025/06/002",
                "KRPL/2024-2025/06/003"
            ]
        );

        for generated in &summary.generated {
            let bytes = std::fs::read(&generated.path).unwrap();
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(value["invoice_number"], generated.invoice_number.as_str());
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_batch() {
        let dir = scratch_dir();
        let summary = BatchRunner::new(config(dir))
            .run(Vec::new(), ShareOverrideTable::default(), Vec::new())
            .unwrap();

        assert!(summary.period.is_none());
        assert!(summary.generated.is_empty());
    }

    #[test]
    fn test_second_run_continues_sequence() {
        let dir = scratch_dir();
        let runner = BatchRunner::new(config(dir.clone()));

        runner
            .run(RecordFixtures::mixed_batch(), ShareOverrideTable::default(), Vec::new())
            .unwrap();
        let second = runner
            .run(RecordFixtures::mixed_batch(), ShareOverrideTable::default(), Vec::new())
            .unwrap();

        assert_eq!(second.generated[0].invoice_number, "KRPL/2024-2025/06/004");
        assert_eq!(runner.counter().peek(2024, 6).unwrap(), 7);

        std::fs::remove_dir_all(&dir).ok();
    }
}
