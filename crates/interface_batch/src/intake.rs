//! CSV intake
//!
//! Reads a registration export into validated records. Rows that fail
//! conversion are logged and reported back, never fatal to the batch.

use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use domain_billing::{BillingError, OverrideRow, PatientTestRecord, RecordRow, ShareOverrideTable};

use crate::error::BatchError;

/// A row that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based line in the source, counting the header
    pub line: u64,
    pub reason: String,
}

/// Outcome of reading one export
#[derive(Debug, Clone, Default)]
pub struct IntakeReport {
    pub records: Vec<PatientTestRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Reads records from any CSV source with a header row
pub fn read_records<R: Read>(source: R) -> Result<IntakeReport, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let mut report = IntakeReport::default();
    for (index, row) in reader.deserialize::<RecordRow>().enumerate() {
        let line = index as u64 + 2;
        let converted = row
            .map_err(|e| BillingError::validation(e.to_string()))
            .and_then(RecordRow::into_record);

        match converted {
            Ok(record) => report.records.push(record),
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping invalid row");
                report.rejected.push(RejectedRow {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        accepted = report.records.len(),
        rejected = report.rejected.len(),
        "Records read"
    );
    Ok(report)
}

/// Reads records from a CSV file
pub fn read_records_from_path(path: &Path) -> Result<IntakeReport, BatchError> {
    let file = File::open(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file).map_err(|source| BatchError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a share override table
///
/// Unlike record intake, any bad row fails the whole table.
pub fn read_overrides<R: Read>(source: R) -> Result<ShareOverrideTable, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let rows = reader
        .deserialize::<OverrideRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BillingError::validation(format!("override table: {}", e)))?;

    Ok(ShareOverrideTable::from_rows(rows)?)
}

pub fn read_overrides_from_path(path: &Path) -> Result<ShareOverrideTable, BatchError> {
    let file = File::open(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_overrides(file)
}
