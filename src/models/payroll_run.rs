//! Payroll run models.
//!
//! This module contains the [`PayrollRun`] aggregate, its lifecycle
//! [`RunState`], the [`RunType`]s the engine supports, and the run-level
//! totals and employer contribution summary.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{AuditWarning, PayrollLineItem};

/// The kind of payroll being run.
///
/// # Example
///
/// ```
/// use nomina_engine::models::RunType;
///
/// let run_type: RunType = serde_json::from_str("\"ANNUAL_BONUS_14\"").unwrap();
/// assert!(run_type.is_annual_bonus());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunType {
    /// Regular monthly payroll.
    #[serde(rename = "ORDINARY")]
    Ordinary,
    /// Off-cycle payroll (e.g., a mid-month correction).
    #[serde(rename = "EXTRAORDINARY")]
    Extraordinary,
    /// Aguinaldo, the December 13th salary.
    #[serde(rename = "ANNUAL_BONUS_13")]
    AnnualBonus13,
    /// Bono 14, the July bonus.
    #[serde(rename = "ANNUAL_BONUS_14")]
    AnnualBonus14,
}

impl RunType {
    /// Returns true for the two annual statutory bonus runs.
    pub fn is_annual_bonus(&self) -> bool {
        matches!(self, Self::AnnualBonus13 | Self::AnnualBonus14)
    }

    /// The canonical string name of this run type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinary => "ORDINARY",
            Self::Extraordinary => "EXTRAORDINARY",
            Self::AnnualBonus13 => "ANNUAL_BONUS_13",
            Self::AnnualBonus14 => "ANNUAL_BONUS_14",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Draft; the only state in which a run is recalculated or amended.
    #[serde(rename = "BORRADOR")]
    Draft,
    /// Approved for payment.
    #[serde(rename = "APROBADA")]
    Approved,
    /// Paid. Terminal state.
    #[serde(rename = "PAGADA")]
    Paid,
    /// Voided. Terminal state.
    #[serde(rename = "ANULADA")]
    Voided,
}

impl RunState {
    /// Whether this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Voided)
    }

    /// Approved and paid runs close their period for re-processing.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Approved | Self::Paid)
    }

    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "BORRADOR",
            Self::Approved => "APROBADA",
            Self::Paid => "PAGADA",
            Self::Voided => "ANULADA",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller asks the engine to calculate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInput {
    /// Period label, e.g. "2025-01".
    pub period_label: String,
    /// Kind of payroll.
    pub run_type: RunType,
    /// Date used to select the rule set and bound history; today if absent.
    #[serde(default)]
    pub cutoff_date: Option<NaiveDate>,
    /// Restrict the run to these departments.
    #[serde(default)]
    pub department_ids: Option<Vec<String>>,
    /// Restrict the run to these employees.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
    /// Jurisdiction; the engine's default when absent.
    #[serde(default)]
    pub jurisdiction: Option<String>,
}

impl PeriodInput {
    /// An unfiltered input for the given period and type.
    pub fn new(period_label: impl Into<String>, run_type: RunType) -> Self {
        Self {
            period_label: period_label.into(),
            run_type,
            cutoff_date: None,
            department_ids: None,
            employee_ids: None,
            jurisdiction: None,
        }
    }

    /// Sets the cutoff date.
    pub fn with_cutoff(mut self, cutoff_date: NaiveDate) -> Self {
        self.cutoff_date = Some(cutoff_date);
        self
    }

    /// Rejects inputs the engine cannot key a run on.
    pub fn validate(&self) -> EngineResult<()> {
        if self.period_label.trim().is_empty() {
            return Err(EngineError::InvalidPeriodInput {
                field: "period_label".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.department_ids.as_ref().is_some_and(|ids| ids.is_empty()) {
            return Err(EngineError::InvalidPeriodInput {
                field: "department_ids".to_string(),
                message: "must not be an empty list".to_string(),
            });
        }
        if self.employee_ids.as_ref().is_some_and(|ids| ids.is_empty()) {
            return Err(EngineError::InvalidPeriodInput {
                field: "employee_ids".to_string(),
                message: "must not be an empty list".to_string(),
            });
        }
        Ok(())
    }
}

/// Run-level sums over all line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Total gross pay.
    pub gross: Decimal,
    /// Total deductions.
    pub deductions: Decimal,
    /// Total bonuses.
    pub bonuses: Decimal,
    /// Total net pay.
    pub net: Decimal,
    /// Total IGSS employee contributions.
    pub social_security_employee: Decimal,
    /// Total ISR withheld.
    pub income_tax: Decimal,
}

impl RunTotals {
    /// Sums the given line items.
    pub fn from_line_items(items: &[PayrollLineItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.gross += item.gross;
            acc.deductions += item.total_deductions;
            acc.bonuses += item.bonuses;
            acc.net += item.net_pay;
            acc.social_security_employee += item.social_security_employee;
            acc.income_tax += item.income_tax;
            acc
        })
    }
}

/// Employer-side end-of-year provisions for an ordinary run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryProvisions {
    /// Aguinaldo provision.
    pub aguinaldo: Decimal,
    /// Bono 14 provision.
    pub bono14: Decimal,
    /// Vacation provision.
    pub vacation: Decimal,
    /// Severance provision.
    pub severance: Decimal,
}

impl StatutoryProvisions {
    /// Sum of all provisions.
    pub fn total(&self) -> Decimal {
        self.aguinaldo + self.bono14 + self.vacation + self.severance
    }
}

/// Employer contributions derived from a run's gross totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributionSummary {
    /// IGSS employer contribution.
    pub social_security: Decimal,
    /// INTECAP contribution.
    pub training_fund: Decimal,
    /// IRTRA contribution.
    pub recreation_fund: Decimal,
    /// End-of-year provisions, ordinary runs only.
    #[serde(default)]
    pub provisions: Option<StatutoryProvisions>,
}

impl EmployerContributionSummary {
    /// Total employer cost on top of gross pay.
    pub fn total(&self) -> Decimal {
        self.social_security
            + self.training_fund
            + self.recreation_fund
            + self
                .provisions
                .as_ref()
                .map_or(Decimal::ZERO, StatutoryProvisions::total)
    }
}

/// The calculated content of a run, shared by previews and persisted runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCalculation {
    /// Start date of the rule set the run was calculated with.
    pub rule_set_effective_from: NaiveDate,
    /// One line item per employee, ordered by employee id.
    pub line_items: Vec<PayrollLineItem>,
    /// Sums over the line items.
    pub totals: RunTotals,
    /// Number of line items.
    pub employee_count: usize,
    /// Employer-side contributions.
    pub employer_contributions: EmployerContributionSummary,
    /// Non-fatal issues found while calculating.
    #[serde(default)]
    pub warnings: Vec<AuditWarning>,
}

/// The result of a simulation: a run that was never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunPreview {
    /// Period label.
    pub period_label: String,
    /// Kind of payroll.
    pub run_type: RunType,
    /// Jurisdiction.
    pub jurisdiction: String,
    /// Cutoff date actually used.
    pub cutoff_date: NaiveDate,
    /// The calculation.
    #[serde(flatten)]
    pub calculation: RunCalculation,
}

/// A persisted payroll run and its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier of the run.
    pub id: Uuid,
    /// Snapshot version, incremented on every save.
    pub version: u64,
    /// Period label.
    pub period_label: String,
    /// Kind of payroll.
    pub run_type: RunType,
    /// Jurisdiction.
    pub jurisdiction: String,
    /// Cutoff date used for the calculation.
    pub cutoff_date: NaiveDate,
    /// Department filter the run was created with.
    #[serde(default)]
    pub department_ids: Option<Vec<String>>,
    /// Employee filter the run was created with.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
    /// Lifecycle state.
    pub state: RunState,
    /// The calculation.
    #[serde(flatten)]
    pub calculation: RunCalculation,
    /// When the run was first created.
    pub created_at: DateTime<Utc>,
    /// When the line items were last (re)calculated.
    pub calculated_at: DateTime<Utc>,
    /// When the run was approved.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Who approved the run.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the run was paid.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// Who marked the run paid.
    #[serde(default)]
    pub paid_by: Option<String>,
    /// When the run was voided.
    #[serde(default)]
    pub voided_at: Option<DateTime<Utc>>,
    /// Who voided the run.
    #[serde(default)]
    pub voided_by: Option<String>,
    /// Why the run was voided.
    #[serde(default)]
    pub void_reason: Option<String>,
}

impl PayrollRun {
    /// Builds the first snapshot of a draft run from a preview.
    pub fn new_draft(
        preview: PayrollRunPreview,
        input: &PeriodInput,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 1,
            period_label: preview.period_label,
            run_type: preview.run_type,
            jurisdiction: preview.jurisdiction,
            cutoff_date: preview.cutoff_date,
            department_ids: input.department_ids.clone(),
            employee_ids: input.employee_ids.clone(),
            state: RunState::Draft,
            calculation: preview.calculation,
            created_at: now,
            calculated_at: now,
            approved_at: None,
            approved_by: None,
            paid_at: None,
            paid_by: None,
            voided_at: None,
            voided_by: None,
            void_reason: None,
        }
    }

    /// The parameters this run was calculated with.
    pub fn period_input(&self) -> PeriodInput {
        PeriodInput {
            period_label: self.period_label.clone(),
            run_type: self.run_type,
            cutoff_date: Some(self.cutoff_date),
            department_ids: self.department_ids.clone(),
            employee_ids: self.employee_ids.clone(),
            jurisdiction: Some(self.jurisdiction.clone()),
        }
    }

    /// Line items of the run.
    pub fn line_items(&self) -> &[PayrollLineItem] {
        &self.calculation.line_items
    }

    /// Run totals.
    pub fn totals(&self) -> &RunTotals {
        &self.calculation.totals
    }

    /// Returns true if the totals equal the sum of the current line items.
    pub fn totals_consistent(&self) -> bool {
        self.calculation.totals == RunTotals::from_line_items(&self.calculation.line_items)
            && self.calculation.employee_count == self.calculation.line_items.len()
    }
}
