//! Record ownership and role-based access.
//!
//! The engine never looks up "the current user". Callers resolve an
//! [`AccessContext`] once per request and pass it in explicitly; queries that
//! list records filter through it at the store boundary.
//!
//! - `employee` actors see their own records only
//! - `manager` actors see their own records and those of every employee
//!   whose designation lies below theirs
//! - `admin` actors see everything

mod hierarchy;

pub use hierarchy::DesignationTree;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeId, LeaveRequest, UserId};
use crate::store::LeaveStore;

/// Actor roles for access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees and acts on their own records.
    Employee,
    /// Also sees the employees below their designation.
    Manager,
    /// Sees and acts on every record.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Employee => write!(f, "employee"),
            Role::Manager => write!(f, "manager"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The resolved identity and reach of the actor making a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    /// The acting user, if any. Maintenance jobs act without one.
    pub user_id: Option<UserId>,
    /// The employee record linked to the acting user.
    pub employee_id: Option<EmployeeId>,
    /// The actor's role.
    pub role: Role,
    /// Employees a manager oversees. Empty for other roles.
    pub managed: BTreeSet<EmployeeId>,
}

impl AccessContext {
    /// An administrator.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            employee_id: None,
            role: Role::Admin,
            managed: BTreeSet::new(),
        }
    }

    /// An employee acting for themself.
    pub fn employee(user_id: UserId, employee_id: EmployeeId) -> Self {
        Self {
            user_id: Some(user_id),
            employee_id: Some(employee_id),
            role: Role::Employee,
            managed: BTreeSet::new(),
        }
    }

    /// A manager overseeing `managed`.
    pub fn manager(
        user_id: UserId,
        employee_id: Option<EmployeeId>,
        managed: impl IntoIterator<Item = EmployeeId>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            employee_id,
            role: Role::Manager,
            managed: managed.into_iter().collect(),
        }
    }

    /// A maintenance job with full reach and no acting user.
    pub fn system() -> Self {
        Self {
            user_id: None,
            employee_id: None,
            role: Role::Admin,
            managed: BTreeSet::new(),
        }
    }

    /// Resolves the context for a logged-in user.
    ///
    /// The user's employee record is looked up by its linked `user_id`. For
    /// managers, the managed set is every employee whose designation lies
    /// strictly below the manager's own designation in `tree`.
    pub fn resolve<S: LeaveStore>(
        store: &S,
        user_id: UserId,
        role: Role,
        tree: &DesignationTree,
    ) -> EngineResult<Self> {
        let employee = store.employee_for_user(user_id)?;
        let employee_id = employee.as_ref().map(|e| e.id);

        let managed = match (role, employee.and_then(|e| e.designation_id)) {
            (Role::Manager, Some(designation_id)) => {
                let below = tree.descendants(designation_id);
                store
                    .employees()?
                    .into_iter()
                    .filter(|e| e.designation_id.is_some_and(|d| below.contains(&d)))
                    .map(|e| e.id)
                    .collect()
            }
            _ => BTreeSet::new(),
        };

        Ok(Self {
            user_id: Some(user_id),
            employee_id,
            role,
            managed,
        })
    }

    /// Returns true for administrators and maintenance jobs.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns true if the actor may see and act on the employee's records.
    pub fn can_access(&self, employee_id: EmployeeId) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => {
                self.employee_id == Some(employee_id) || self.managed.contains(&employee_id)
            }
            Role::Employee => self.employee_id == Some(employee_id),
        }
    }

    /// Returns true if the actor may approve or reject the request: an
    /// administrator, or the approver assigned to it.
    pub fn can_decide(&self, request: &LeaveRequest) -> bool {
        self.is_admin() || (self.user_id.is_some() && request.approver_user_id == self.user_id)
    }

    /// Fails with `PermissionDenied` unless [`AccessContext::can_access`].
    pub fn ensure_access(&self, employee_id: EmployeeId, action: &str) -> EngineResult<()> {
        if self.can_access(employee_id) {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied {
                action: format!("{} for employee {}", action, employee_id),
            })
        }
    }
}

/// Lists the leave requests visible to the actor.
pub fn visible_leave_requests<S: LeaveStore>(
    store: &S,
    ctx: &AccessContext,
) -> EngineResult<Vec<LeaveRequest>> {
    match ctx.role {
        Role::Admin => store.leave_requests(),
        Role::Employee => match ctx.employee_id {
            Some(employee_id) => store.leave_requests_for(employee_id),
            None => Ok(Vec::new()),
        },
        Role::Manager => Ok(store
            .leave_requests()?
            .into_iter()
            .filter(|r| ctx.can_access(r.employee_id))
            .collect()),
    }
}
