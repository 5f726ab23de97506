//! Employee model.
//!
//! The engine only reads employees; creating and editing them is the HR
//! workflow's concern.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DesignationId, EmployeeId, UserId};

/// Represents an employee who can request leave.
///
/// # Example
///
/// ```
/// use leave_engine::models::Employee;
///
/// let employee = Employee::new(1, "Asha Rao", "EMP-001");
/// assert_eq!(employee.display_name(), "Asha Rao (EMP-001)");
/// assert!(employee.user_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// The employee's full name.
    pub full_name: String,
    /// Human-facing employee code (e.g., "EMP-001").
    pub emp_code: String,
    /// The login account linked to this employee, if any.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// The employee's position in the designation tree.
    #[serde(default)]
    pub designation_id: Option<DesignationId>,
    /// The employee's line manager.
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
    /// The date the employee joined.
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
}

impl Employee {
    /// Creates an employee with no linked user, designation or joining date.
    pub fn new(id: EmployeeId, full_name: impl Into<String>, emp_code: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            emp_code: emp_code.into(),
            user_id: None,
            designation_id: None,
            manager_id: None,
            date_of_joining: None,
        }
    }

    /// Links the employee to a login account.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Places the employee at a designation.
    pub fn with_designation(mut self, designation_id: DesignationId) -> Self {
        self.designation_id = Some(designation_id);
        self
    }

    /// Sets the employee's line manager.
    pub fn with_manager(mut self, manager_id: EmployeeId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    /// Returns the name shown in pickers: full name followed by the code.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.full_name, self.emp_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_links() {
        let employee = Employee::new(3, "Ravi Kumar", "EMP-003")
            .with_user(30)
            .with_designation(2)
            .with_manager(1);
        assert_eq!(employee.user_id, Some(30));
        assert_eq!(employee.manager_id, Some(1));
        assert_eq!(employee.designation_id, Some(2));
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let json = r#"{"id": 1, "full_name": "Asha Rao", "emp_code": "EMP-001"}"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee, Employee::new(1, "Asha Rao", "EMP-001"));
    }
}
