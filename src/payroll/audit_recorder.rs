//! Field-level change capture for amended line items.
//!
//! The audited fields are listed in a static table of
//! `(name, extractor)` pairs. Comparing two line items walks the table and
//! emits one [`FieldChange`] per field whose formatted value differs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::round_amount;
use crate::config::RoundingConfig;
use crate::error::EngineResult;
use crate::models::{FieldChange, PayrollLineItem, check_amount};

/// A field value in comparable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditValue {
    /// A monetary amount.
    Amount(Decimal),
    /// Free text, possibly absent.
    Text(Option<String>),
}

impl AuditValue {
    /// Canonical text of the value: amounts at the rule set's decimal places
    /// and rounding policy, absent text as an empty string.
    pub fn format(&self, rounding: &RoundingConfig) -> String {
        match self {
            Self::Amount(value) => {
                let rounded = round_amount(*value, rounding.decimals, rounding.policy);
                format!("{:.*}", rounding.decimals as usize, rounded)
            }
            Self::Text(value) => value.clone().unwrap_or_default(),
        }
    }
}

/// One entry of the audited-field table.
pub struct AuditedField {
    /// Field name as reported in change records.
    pub name: &'static str,
    /// Reads the field from a line item.
    pub extract: fn(&PayrollLineItem) -> AuditValue,
}

/// Line-item fields whose changes are recorded.
pub static LINE_ITEM_FIELDS: &[AuditedField] = &[
    AuditedField {
        name: "base_salary",
        extract: |item| AuditValue::Amount(item.base_salary),
    },
    AuditedField {
        name: "bonuses",
        extract: |item| AuditValue::Amount(item.bonuses),
    },
    AuditedField {
        name: "gross",
        extract: |item| AuditValue::Amount(item.gross),
    },
    AuditedField {
        name: "social_security_employee",
        extract: |item| AuditValue::Amount(item.social_security_employee),
    },
    AuditedField {
        name: "income_tax",
        extract: |item| AuditValue::Amount(item.income_tax),
    },
    AuditedField {
        name: "loan",
        extract: |item| AuditValue::Amount(item.loan),
    },
    AuditedField {
        name: "advance",
        extract: |item| AuditValue::Amount(item.advance),
    },
    AuditedField {
        name: "other_deductions",
        extract: |item| AuditValue::Amount(item.other_deductions),
    },
    AuditedField {
        name: "total_deductions",
        extract: |item| AuditValue::Amount(item.total_deductions),
    },
    AuditedField {
        name: "net_pay",
        extract: |item| AuditValue::Amount(item.net_pay),
    },
    AuditedField {
        name: "notes",
        extract: |item| AuditValue::Text(item.notes.clone()),
    },
];

/// Compares two versions of a line item and lists what changed.
///
/// Amounts are compared in their formatted form under `rounding`, so a
/// difference in scale alone is not a change.
pub fn diff_line_items(
    run_id: Uuid,
    before: &PayrollLineItem,
    after: &PayrollLineItem,
    rounding: &RoundingConfig,
    actor: &str,
    changed_at: DateTime<Utc>,
) -> Vec<FieldChange> {
    LINE_ITEM_FIELDS
        .iter()
        .filter_map(|field| {
            let old_value = (field.extract)(before).format(rounding);
            let new_value = (field.extract)(after).format(rounding);
            (old_value != new_value).then(|| FieldChange {
                run_id,
                employee_id: after.employee_id.clone(),
                field: field.name.to_string(),
                old_value,
                new_value,
                actor: actor.to_string(),
                changed_at,
            })
        })
        .collect()
}

/// A correction to the verbatim deduction lines and notes of a line item.
///
/// `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemAmendment {
    /// New loan installment.
    #[serde(default)]
    pub loan: Option<Decimal>,
    /// New advance recovery.
    #[serde(default)]
    pub advance: Option<Decimal>,
    /// New other deductions.
    #[serde(default)]
    pub other_deductions: Option<Decimal>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl LineItemAmendment {
    /// Applies the amendment and rebalances the derived amounts.
    ///
    /// Amounts go through the same checks as compensation inputs: negative,
    /// oversized or finer than `decimals` places fails with
    /// `InvalidCompensationInput`.
    pub fn apply(&self, item: &PayrollLineItem, decimals: u32) -> EngineResult<PayrollLineItem> {
        let mut updated = item.clone();
        let amounts = [
            ("loan", self.loan, &mut updated.loan),
            ("advance", self.advance, &mut updated.advance),
            ("other_deductions", self.other_deductions, &mut updated.other_deductions),
        ];
        for (field, value, slot) in amounts {
            if let Some(value) = value {
                check_amount(&item.employee_id, field, value, decimals)?;
                *slot = value;
            }
        }
        if let Some(notes) = &self.notes {
            updated.notes = Some(notes.clone()).filter(|n| !n.trim().is_empty());
        }
        updated.rebalance();
        Ok(updated)
    }

    /// True if the amendment names no field.
    pub fn is_empty(&self) -> bool {
        self.loan.is_none()
            && self.advance.is_none()
            && self.other_deductions.is_none()
            && self.notes.is_none()
    }
}
