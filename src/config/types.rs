//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files: jurisdiction metadata and
//! the date-scoped legal rule sets.

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::round_amount;
use crate::models::{CompensationInput, Employee};

/// Metadata about the jurisdiction a configuration directory describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionMetadata {
    /// The jurisdiction code (e.g., "GT").
    pub code: String,
    /// The human-readable name of the jurisdiction.
    pub name: String,
    /// ISO currency code amounts are expressed in (e.g., "GTQ").
    pub currency: String,
    /// Whole hours the jurisdiction's wall clock is ahead of UTC
    /// (negative west of Greenwich). Used for default cutoff dates.
    #[serde(default)]
    pub utc_offset_hours: i32,
}

impl JurisdictionMetadata {
    /// The jurisdiction's offset from UTC, if `utc_offset_hours` is in range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
    }
}

/// How amounts are brought to the rule set's decimal precision.
///
/// # Example
///
/// ```
/// use nomina_engine::config::RoundingPolicy;
///
/// let policy: RoundingPolicy = serde_json::from_str("\"half_away_from_zero\"").unwrap();
/// assert_eq!(policy, RoundingPolicy::HalfAwayFromZero);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Round to nearest, midpoints away from zero.
    HalfAwayFromZero,
    /// Always round toward positive infinity.
    Up,
    /// Always round toward negative infinity.
    Down,
}

/// Rounding settings of a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    /// Number of decimal places amounts are kept at.
    pub decimals: u32,
    /// The rounding policy.
    pub policy: RoundingPolicy,
}

/// One bracket of a progressive income-tax table.
///
/// A bracket with no `upper_bound` is open-ended and must be the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower bound of the bracket.
    pub lower_bound: Decimal,
    /// Inclusive upper bound, `None` for the open-ended top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Rate applied to the portion of the base above `lower_bound`.
    pub marginal_rate: Decimal,
    /// Tax already due at `lower_bound`.
    #[serde(default)]
    pub base_tax: Decimal,
}

/// Social-security (IGSS) rates and contribution cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityRates {
    /// Employee contribution rate.
    pub employee_rate: Decimal,
    /// Employer contribution rate.
    pub employer_rate: Decimal,
    /// Maximum monthly base a contribution is computed on.
    pub max_contribution_base: Decimal,
}

/// Rates of the employer-side end-of-year provisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRates {
    /// Aguinaldo (13th salary) provision.
    pub aguinaldo: Decimal,
    /// Bono 14 provision.
    pub bono14: Decimal,
    /// Paid vacation provision.
    pub vacation: Decimal,
    /// Severance (indemnización) provision.
    pub severance: Decimal,
}

/// A versioned, date-scoped set of legal payroll parameters.
///
/// Rule sets are pure data. They are selected by jurisdiction and effective
/// date (see [`crate::calculation::resolve_rules`]) and never fall back to
/// hardcoded values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalRuleSet {
    /// Jurisdiction code this rule set governs.
    pub jurisdiction: String,
    /// First day the rule set applies.
    pub effective_from: NaiveDate,
    /// Last day the rule set applies, `None` when open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Inactive rule sets are never selected.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Social-security rates.
    pub social_security: SocialSecurityRates,
    /// INTECAP employer rate.
    pub training_fund_rate: Decimal,
    /// IRTRA employer rate.
    pub recreation_fund_rate: Decimal,
    /// Progressive income-tax table, ascending by lower bound.
    pub tax_brackets: Vec<TaxBracket>,
    /// Multiplier over the hourly rate for daytime overtime.
    pub overtime_multiplier: Decimal,
    /// Multiplier over the hourly rate for night overtime.
    pub overtime_night_multiplier: Decimal,
    /// Fixed statutory incentive bonus paid in ordinary runs.
    pub statutory_bonus: Decimal,
    /// Yearly amount of an annual bonus that is exempt from income tax.
    pub annual_bonus_exemption: Decimal,
    /// End-of-year provision rates.
    pub provisions: ProvisionRates,
    /// Hours in a standard working month.
    pub standard_monthly_hours: Decimal,
    /// Rounding settings.
    pub rounding: RoundingConfig,
}

fn default_active() -> bool {
    true
}

impl LegalRuleSet {
    /// Returns true if this rule set can be selected for `date`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nomina_engine::config::ConfigLoader;
    /// use chrono::NaiveDate;
    ///
    /// let loader = ConfigLoader::load("./config/gt").unwrap();
    /// let rules = loader.rule_sets().last().unwrap();
    /// assert!(rules.applies_on(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
    /// ```
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.effective_from <= date
            && self.effective_to.is_none_or(|to| to >= date)
    }

    /// Rounds an amount to this rule set's precision and policy.
    pub fn round(&self, value: Decimal) -> Decimal {
        round_amount(value, self.rounding.decimals, self.rounding.policy)
    }
}

/// A seed roster: employee master data plus their compensation inputs.
///
/// Used to populate an in-memory store when the server starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Employee master data.
    pub employees: Vec<Employee>,
    /// Compensation inputs, per period or recurring.
    #[serde(default)]
    pub compensation: Vec<CompensationInput>,
}
