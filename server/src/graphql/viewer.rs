use async_graphql::{Context, Enum, InputObject, Object, SimpleObject};
use platform_authz::{Capabilities, RoleContext};
use products_hr::{
    HrError,
    forms::{PasswordChangeForm, password_strength},
};
use tracing::instrument;

use crate::graphql::{graphql_data, hr_error, session};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "Role", remote = "platform_authz::Role")]
pub enum RoleGql {
    Admin,
    Hr,
    Employee,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CapabilitiesPayload {
    pub view_all_records: bool,
    pub decide_time_off: bool,
    pub view_salary: bool,
    pub edit_profiles: bool,
    pub create_employees: bool,
}

impl From<Capabilities> for CapabilitiesPayload {
    fn from(value: Capabilities) -> Self {
        Self {
            view_all_records: value.view_all_records,
            decide_time_off: value.decide_time_off,
            view_salary: value.view_salary,
            edit_profiles: value.edit_profiles,
            create_employees: value.create_employees,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ViewerPayload {
    pub employee_id: String,
    pub name: Option<String>,
    pub initials: Option<String>,
    pub role: RoleGql,
    pub is_elevated: bool,
    pub capabilities: CapabilitiesPayload,
}

impl ViewerPayload {
    fn from_context(ctx: &Context<'_>, role: &RoleContext) -> async_graphql::Result<Self> {
        let data = graphql_data(ctx)?;
        let employee = data.hr.employee(role.viewer_id()).ok();
        Ok(Self {
            employee_id: role.viewer_id().to_string(),
            name: employee.map(|e| e.name.clone()),
            initials: employee.map(|e| e.initials()),
            role: role.role().into(),
            is_elevated: role.is_elevated(),
            capabilities: role.capabilities().into(),
        })
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct PasswordChangeInput {
    #[graphql(default)]
    pub current_password: String,
    #[graphql(default)]
    pub new_password: String,
    #[graphql(default)]
    pub confirm_password: String,
}

impl From<PasswordChangeInput> for PasswordChangeForm {
    fn from(value: PasswordChangeInput) -> Self {
        Self {
            current_password: value.current_password,
            new_password: value.new_password,
            confirm_password: value.confirm_password,
        }
    }
}

#[derive(Default)]
pub struct ViewerQuery;

#[Object]
impl ViewerQuery {
    #[instrument(name = "graphql.viewer", skip_all)]
    async fn viewer(&self, ctx: &Context<'_>) -> async_graphql::Result<ViewerPayload> {
        let handle = session(ctx)?;
        let session = handle.lock().await;
        ViewerPayload::from_context(ctx, &session.role)
    }

    /// 0, 25, 50, 75 or 100.
    async fn password_strength(&self, password: String) -> i32 {
        i32::from(password_strength(&password))
    }
}

#[derive(Default)]
pub struct ViewerMutation;

#[Object]
impl ViewerMutation {
    #[instrument(name = "graphql.set_role", skip_all, fields(role = ?role))]
    async fn set_role(
        &self,
        ctx: &Context<'_>,
        role: RoleGql,
    ) -> async_graphql::Result<ViewerPayload> {
        let handle = session(ctx)?;
        let mut session = handle.lock().await;
        session.role.set_role(role.into());
        ViewerPayload::from_context(ctx, &session.role)
    }

    /// Validates the form only; there is no credential store behind it.
    #[instrument(name = "graphql.change_password", skip_all)]
    async fn change_password(
        &self,
        ctx: &Context<'_>,
        input: PasswordChangeInput,
    ) -> async_graphql::Result<bool> {
        let handle = session(ctx)?;
        let viewer = handle.lock().await.role.viewer_id().to_string();
        PasswordChangeForm::from(input)
            .validate()
            .map_err(|errors| hr_error(HrError::Validation(errors)))?;
        tracing::info!(%viewer, "password changed");
        Ok(true)
    }
}
