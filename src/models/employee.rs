//! Employee model and related types.
//!
//! This module defines the Employee master data the payroll engine reads
//! and the EmploymentStatus used for eligibility.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the employment status of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Currently employed and included in payroll runs.
    Active,
    /// Temporarily suspended (e.g., IGSS leave); excluded from runs.
    Suspended,
    /// No longer employed; excluded from runs.
    Terminated,
}

/// Employee master data as provided by the employee repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Full name, carried onto line items for reporting.
    pub name: String,
    /// Contracted monthly base salary.
    pub monthly_salary: Decimal,
    /// Employment status.
    pub status: EmploymentStatus,
    /// Department the employee belongs to.
    #[serde(default)]
    pub department_id: Option<String>,
}

impl Employee {
    /// Returns true if the employee takes part in payroll runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use nomina_engine::models::{Employee, EmploymentStatus};
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "Ana Morales".to_string(),
    ///     monthly_salary: Decimal::new(600000, 2),
    ///     status: EmploymentStatus::Active,
    ///     department_id: None,
    /// };
    /// assert!(employee.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        self.status == EmploymentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_active_employee() {
        let json = r#"{
            "id": "emp_001",
            "name": "Ana Morales",
            "monthly_salary": "6000.00",
            "status": "active",
            "department_id": "finanzas"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert_eq!(employee.monthly_salary, Decimal::new(600000, 2));
        assert_eq!(employee.department_id.as_deref(), Some("finanzas"));
        assert!(employee.is_active());
    }

    #[test]
    fn test_department_is_optional() {
        let json = r#"{
            "id": "emp_002",
            "name": "Luis Pérez",
            "monthly_salary": "4200.00",
            "status": "suspended"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert!(employee.department_id.is_none());
        assert!(!employee.is_active());
    }

    #[test]
    fn test_employment_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EmploymentStatus::Terminated).unwrap(),
            "\"terminated\""
        );
    }
}
