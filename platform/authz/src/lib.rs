//! Role context and authorization primitives for the HR surfaces.
//!
//! The role switch is a session-local toggle, not a security boundary: a
//! [`RoleContext`] says what the current viewer is allowed to *see*, and the
//! derivation layer in `products-hr` filters records accordingly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("action {action} denied for resource {resource}")]
    Denied { action: Action, resource: String },
    #[error("role context read outside of its provider")]
    MissingProvider,
    #[error("unknown role {0}")]
    UnknownRole(String),
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Hr,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AuthzError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "hr" => Ok(Role::Hr),
            "employee" => Ok(Role::Employee),
            other => Err(AuthzError::UnknownRole(other.to_string())),
        }
    }

    /// Admin and HR share every visibility and action rule.
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a viewer may do, derived from the active role.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Capabilities {
    pub view_all_records: bool,
    pub decide_time_off: bool,
    pub view_salary: bool,
    pub edit_profiles: bool,
    pub create_employees: bool,
}

impl Capabilities {
    fn for_role(role: Role) -> Self {
        let elevated = role.is_elevated();
        Self {
            view_all_records: elevated,
            decide_time_off: elevated,
            view_salary: elevated,
            edit_profiles: elevated,
            create_employees: elevated,
        }
    }
}

/// Session-scoped viewer state: who is looking, and under which role.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RoleContext {
    viewer_id: String,
    role: Role,
}

impl RoleContext {
    pub fn new(viewer_id: impl Into<String>, role: Role) -> Self {
        Self {
            viewer_id: viewer_id.into(),
            role,
        }
    }

    pub fn viewer_id(&self) -> &str {
        &self.viewer_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        if self.role != role {
            tracing::debug!(viewer = %self.viewer_id, from = %self.role, to = %role, "role switched");
        }
        self.role = role;
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_hr(&self) -> bool {
        self.role == Role::Hr
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }

    pub fn is_elevated(&self) -> bool {
        self.is_admin() || self.is_hr()
    }

    pub fn is_self(&self, employee_id: &str) -> bool {
        self.viewer_id == employee_id
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role)
    }
}

/// Resolve a role context from an optional provider slot.
pub fn provided<T>(slot: Option<T>) -> Result<T, AuthzError> {
    slot.ok_or(AuthzError::MissingProvider)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum Action {
    ReadOwnRecords,
    ReadAllRecords,
    DecideTimeOff,
    ReadSalary,
    EditProfile,
    CreateEmployee,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ReadOwnRecords => "read:own_records",
            Action::ReadAllRecords => "read:all_records",
            Action::DecideTimeOff => "decide:time_off",
            Action::ReadSalary => "read:salary",
            Action::EditProfile => "edit:profile",
            Action::CreateEmployee => "create:employee",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct PolicyContext<'a> {
    pub subject: &'a RoleContext,
    pub action: Action,
    pub resource: String,
}

impl<'a> PolicyContext<'a> {
    pub fn new(subject: &'a RoleContext, action: Action, resource: impl Into<String>) -> Self {
        Self {
            subject,
            action,
            resource: resource.into(),
        }
    }
}

#[derive(Default, Debug)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn check(&self, ctx: &PolicyContext<'_>) -> Result<(), AuthzError> {
        let allowed = match ctx.action {
            Action::ReadOwnRecords => true,
            Action::ReadAllRecords
            | Action::DecideTimeOff
            | Action::ReadSalary
            | Action::EditProfile
            | Action::CreateEmployee => ctx.subject.is_elevated(),
        };
        if allowed {
            Ok(())
        } else {
            tracing::debug!(
                viewer = ctx.subject.viewer_id(),
                action = %ctx.action,
                resource = %ctx.resource,
                "policy denied"
            );
            Err(AuthzError::Denied {
                action: ctx.action,
                resource: ctx.resource.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_the_active_role() {
        let mut ctx = RoleContext::new("EMP001", Role::Admin);
        assert!(ctx.is_admin() && ctx.is_elevated());
        assert!(!ctx.is_hr() && !ctx.is_employee());

        ctx.set_role(Role::Hr);
        assert!(ctx.is_hr() && ctx.is_elevated());
        assert!(!ctx.is_admin());

        ctx.set_role(Role::Employee);
        assert!(ctx.is_employee());
        assert!(!ctx.is_elevated());
        assert!(!ctx.capabilities().view_salary);
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(Role::parse("HR").unwrap(), Role::Hr);
        assert_eq!(Role::parse(" employee ").unwrap(), Role::Employee);
        assert_eq!(
            Role::parse("owner"),
            Err(AuthzError::UnknownRole("owner".into()))
        );
        assert_eq!(Role::default(), Role::Admin);
    }

    #[test]
    fn employees_may_only_read_their_own_records() {
        let engine = PolicyEngine;
        let employee = RoleContext::new("EMP002", Role::Employee);
        assert!(engine
            .check(&PolicyContext::new(&employee, Action::ReadOwnRecords, "attendance"))
            .is_ok());
        let denied = engine
            .check(&PolicyContext::new(&employee, Action::DecideTimeOff, "TO-001"))
            .unwrap_err();
        assert_eq!(
            denied,
            AuthzError::Denied {
                action: Action::DecideTimeOff,
                resource: "TO-001".into()
            }
        );

        let hr = RoleContext::new("EMP004", Role::Hr);
        assert!(engine
            .check(&PolicyContext::new(&hr, Action::ReadSalary, "EMP001"))
            .is_ok());
    }

    #[test]
    fn missing_provider_is_reported() {
        let slot: Option<&RoleContext> = None;
        assert_eq!(provided(slot), Err(AuthzError::MissingProvider));
    }
}
