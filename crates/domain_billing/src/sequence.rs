//! Invoice numbering
//!
//! Invoice numbers have the form `KRPL/2024-2025/06/001`: prefix, fiscal
//! year span, issue month and a per-month sequence.
//!
//! # Invariants
//!
//! - Two draws for the same (year, month) never return the same sequence
//! - Sequences are never decremented or handed out again, even when the
//!   invoice that drew one later fails
//! - A failed draw leaves the counter untouched

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use core_kernel::FiscalYear;
use crate::error::BillingError;

/// Numbering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingConfig {
    /// Leading invoice number segment
    pub prefix: String,
    /// Month (1-12) the fiscal year starts in
    pub fiscal_year_start_month: u32,
    /// First sequence handed out in each month
    pub initial_sequence: u32,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            prefix: "KRPL".to_string(),
            fiscal_year_start_month: 4,
            initial_sequence: 1,
        }
    }
}

impl NumberingConfig {
    /// Checks the settings
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.prefix.trim().is_empty() || self.prefix.contains('/') {
            return Err(BillingError::validation(format!(
                "invoice prefix must be non-empty and contain no '/': {:?}",
                self.prefix
            )));
        }
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(BillingError::validation(format!(
                "fiscal year start month must be 1-12, got {}",
                self.fiscal_year_start_month
            )));
        }
        Ok(())
    }
}

/// Process-wide per-month sequence state
///
/// Share one instance (behind an `Arc`) between every aggregator in the
/// process.
#[derive(Debug)]
pub struct InvoiceSequenceCounter {
    initial_sequence: u32,
    next: Mutex<HashMap<(i32, u32), u32>>,
}

impl InvoiceSequenceCounter {
    /// Creates a counter whose months start at `initial_sequence`
    pub fn new(initial_sequence: u32) -> Self {
        Self {
            initial_sequence,
            next: Mutex::new(HashMap::new()),
        }
    }

    /// Takes the next sequence for a (year, month)
    ///
    /// # Errors
    ///
    /// Returns `SequenceUnavailable` if the lock is poisoned or the month's
    /// sequence space is exhausted. The counter is unchanged in both cases.
    pub fn next_sequence(&self, year: i32, month: u32) -> Result<u32, BillingError> {
        let mut next = self
            .next
            .lock()
            .map_err(|_| BillingError::SequenceUnavailable("sequence lock poisoned".to_string()))?;

        let slot = next.entry((year, month)).or_insert(self.initial_sequence);
        let drawn = *slot;
        *slot = drawn.checked_add(1).ok_or_else(|| {
            BillingError::SequenceUnavailable(format!("sequence exhausted for {}-{:02}", year, month))
        })?;

        Ok(drawn)
    }

    /// The sequence the next draw for a (year, month) would return
    pub fn peek(&self, year: i32, month: u32) -> Result<u32, BillingError> {
        let next = self
            .next
            .lock()
            .map_err(|_| BillingError::SequenceUnavailable("sequence lock poisoned".to_string()))?;
        Ok(next.get(&(year, month)).copied().unwrap_or(self.initial_sequence))
    }
}

impl Default for InvoiceSequenceCounter {
    fn default() -> Self {
        Self::new(NumberingConfig::default().initial_sequence)
    }
}

/// A formatted invoice number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvoiceNumber {
    prefix: String,
    fiscal_year: FiscalYear,
    month: u32,
    sequence: u32,
}

impl InvoiceNumber {
    /// Builds the number for an issue date and drawn sequence
    pub fn new(config: &NumberingConfig, issue_date: NaiveDate, sequence: u32) -> Result<Self, BillingError> {
        let fiscal_year = FiscalYear::containing(issue_date, config.fiscal_year_start_month)?;
        Ok(Self {
            prefix: config.prefix.trim().to_string(),
            fiscal_year,
            month: issue_date.month(),
            sequence,
        })
    }

    pub fn fiscal_year(&self) -> FiscalYear {
        self.fiscal_year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{:02}/{:03}",
            self.prefix, self.fiscal_year, self.month, self.sequence
        )
    }
}

impl Serialize for InvoiceNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
