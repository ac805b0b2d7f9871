//! Lookups into previously calculated payroll.
//!
//! Annual-bonus runs need an employee's salary history (for the 12-month
//! average base) and the amount of the same bonus already paid in the year
//! (for the income-tax exemption). The calculator reads both through
//! [`PayHistory`] so it stays free of storage concerns.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::RunType;

/// Read-only access to historical line items.
pub trait PayHistory: Send + Sync {
    /// Base salaries of the employee's ordinary line items whose run cutoff
    /// falls inside [`trailing_year`] of `cutoff`.
    fn trailing_ordinary_bases(
        &self,
        employee_id: &str,
        cutoff: NaiveDate,
    ) -> EngineResult<Vec<Decimal>>;

    /// Gross already paid to the employee in runs of `run_type` whose cutoff
    /// falls in calendar `year`.
    fn accumulated_annual_bonus(
        &self,
        employee_id: &str,
        run_type: RunType,
        year: i32,
    ) -> EngineResult<Decimal>;
}

/// The twelve-month window ending at `cutoff`: exclusive start, inclusive end.
///
/// # Example
///
/// ```
/// use nomina_engine::calculation::trailing_year;
/// use chrono::NaiveDate;
///
/// let cutoff = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let (start, end) = trailing_year(cutoff);
/// assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
/// assert_eq!(end, cutoff);
/// ```
pub fn trailing_year(cutoff: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = cutoff
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);
    (start, cutoff)
}

/// True if `date` falls in the trailing year of `cutoff`.
pub fn in_trailing_year(date: NaiveDate, cutoff: NaiveDate) -> bool {
    let (start, end) = trailing_year(cutoff);
    date > start && date <= end
}

/// A history with no previous runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl PayHistory for NoHistory {
    fn trailing_ordinary_bases(&self, _: &str, _: NaiveDate) -> EngineResult<Vec<Decimal>> {
        Ok(Vec::new())
    }

    fn accumulated_annual_bonus(&self, _: &str, _: RunType, _: i32) -> EngineResult<Decimal> {
        Ok(Decimal::ZERO)
    }
}
