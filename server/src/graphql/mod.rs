mod attendance;
mod clock;
mod directory;
mod time_off;
mod viewer;

use std::sync::Arc;

use async_graphql::{Context, ErrorExtensions, MergedObject, Object, Schema, SimpleObject};
use platform_api::{ApiError, ApiResult, internal_error};
use products_hr::{HrError, HrModule, time_off::LeaveAllowance};
use serde::Serialize;
use tracing::instrument;

use crate::session::SessionHandle;

pub use clock::SubscriptionRoot;

pub type SchemaType = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Process-wide data every resolver can read.
#[derive(Clone)]
pub struct GraphqlData {
    pub hr: Arc<HrModule>,
    pub leave_allowance: LeaveAllowance,
}

pub fn build_schema(data: GraphqlData) -> SchemaType {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(data)
    .finish()
}

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    HealthQuery,
    viewer::ViewerQuery,
    directory::DirectoryQuery,
    attendance::AttendanceQuery,
    time_off::TimeOffQuery,
    clock::CheckInQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    viewer::ViewerMutation,
    time_off::TimeOffMutation,
    clock::CheckInMutation,
);

#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> ApiResult<HealthPayload> {
        Ok(HealthPayload { ok: true })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}

pub(crate) fn graphql_data<'c>(ctx: &Context<'c>) -> async_graphql::Result<&'c GraphqlData> {
    ctx.data::<GraphqlData>()
        .map_err(|_| internal_error(anyhow::anyhow!("graphql data not registered")))
}

/// The caller's session; reading it outside a session is a wiring bug.
pub(crate) fn session(ctx: &Context<'_>) -> async_graphql::Result<SessionHandle> {
    platform_authz::provided(ctx.data_opt::<SessionHandle>().cloned())
        .map_err(|err| ApiError::from(err).extend())
}

pub(crate) fn hr_error(err: HrError) -> async_graphql::Error {
    let api = match err {
        HrError::EmployeeNotFound(id) => ApiError::NotFound(format!("employee {id}")),
        HrError::TimeOffNotFound(id) => ApiError::NotFound(format!("time off request {id}")),
        HrError::Forbidden(denied) => ApiError::from(denied),
        HrError::Validation(errors) => ApiError::validation(errors.iter()),
    };
    api.extend()
}
