use async_graphql::{Context, Enum, InputObject, Object, SimpleObject};
use chrono::NaiveDate;
use products_hr::time_off::{
    self, Decision, DecisionOutcome, TimeOffBalance, TimeOffForm, TimeOffRequest,
    visible_requests,
};
use tracing::instrument;

use crate::graphql::{graphql_data, hr_error, session};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "TimeOffType", remote = "products_hr::time_off::TimeOffType")]
pub enum TimeOffTypeGql {
    Paid,
    Sick,
    Unpaid,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "TimeOffStatus", remote = "products_hr::time_off::TimeOffStatus")]
pub enum TimeOffStatusGql {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct TimeOffRequestPayload {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub kind: TimeOffTypeGql,
    pub kind_label: String,
    pub status: TimeOffStatusGql,
}

impl From<&TimeOffRequest> for TimeOffRequestPayload {
    fn from(r: &TimeOffRequest) -> Self {
        Self {
            id: r.id.clone(),
            employee_id: r.employee_id.clone(),
            employee_name: r.employee_name.clone(),
            start_date: r.start_date,
            end_date: r.end_date,
            days: r.days(),
            kind: r.kind.into(),
            kind_label: r.kind.label().to_string(),
            status: r.status.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct TimeOffBalancePayload {
    pub paid_available: u32,
    pub sick_available: u32,
}

impl From<TimeOffBalance> for TimeOffBalancePayload {
    fn from(b: TimeOffBalance) -> Self {
        Self {
            paid_available: b.paid_available,
            sick_available: b.sick_available,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct TimeOffViewPayload {
    pub requests: Vec<TimeOffRequestPayload>,
    /// The viewer's own remaining allowance.
    pub balance: TimeOffBalancePayload,
    pub can_decide: bool,
    pub is_empty: bool,
    pub empty_message: String,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DecisionPayload {
    pub request: TimeOffRequestPayload,
    /// False when the request was already approved or rejected.
    pub changed: bool,
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct TimeOffInput {
    pub kind: Option<TimeOffTypeGql>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<TimeOffInput> for TimeOffForm {
    fn from(value: TimeOffInput) -> Self {
        Self {
            kind: value.kind.map(Into::into),
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

#[derive(Default)]
pub struct TimeOffQuery;

#[Object]
impl TimeOffQuery {
    /// `search` narrows by employee name for elevated viewers only.
    #[instrument(name = "graphql.time_off", skip_all)]
    async fn time_off(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
    ) -> async_graphql::Result<TimeOffViewPayload> {
        let data = graphql_data(ctx)?;
        let handle = session(ctx)?;
        let session = handle.lock().await;
        let requests: Vec<TimeOffRequestPayload> =
            visible_requests(session.time_off.requests(), &session.role, search.as_deref())
                .into_iter()
                .map(Into::into)
                .collect();
        let balance = TimeOffBalance::for_employee(
            session.time_off.requests(),
            session.role.viewer_id(),
            data.leave_allowance,
        );
        Ok(TimeOffViewPayload {
            is_empty: requests.is_empty(),
            requests,
            balance: balance.into(),
            can_decide: session.role.capabilities().decide_time_off,
            empty_message: time_off::EMPTY_MESSAGE.to_string(),
        })
    }
}

#[derive(Default)]
pub struct TimeOffMutation;

impl TimeOffMutation {
    async fn decide(
        &self,
        ctx: &Context<'_>,
        id: &str,
        decision: Decision,
    ) -> async_graphql::Result<DecisionPayload> {
        let handle = session(ctx)?;
        let mut session = handle.lock().await;
        let viewer = session.role.clone();
        let outcome = session
            .time_off
            .decide(&viewer, id, decision)
            .map_err(hr_error)?;
        let request = session
            .time_off
            .get(id)
            .ok_or_else(|| hr_error(products_hr::HrError::TimeOffNotFound(id.to_string())))?;
        Ok(DecisionPayload {
            request: request.into(),
            changed: matches!(outcome, DecisionOutcome::Applied(_)),
        })
    }
}

#[Object]
impl TimeOffMutation {
    #[instrument(name = "graphql.approve_time_off", skip_all, fields(%id))]
    async fn approve_time_off(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<DecisionPayload> {
        self.decide(ctx, &id, Decision::Approve).await
    }

    #[instrument(name = "graphql.reject_time_off", skip_all, fields(%id))]
    async fn reject_time_off(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<DecisionPayload> {
        self.decide(ctx, &id, Decision::Reject).await
    }

    /// Files a pending request for the signed-in viewer.
    #[instrument(name = "graphql.request_time_off", skip_all)]
    async fn request_time_off(
        &self,
        ctx: &Context<'_>,
        input: TimeOffInput,
    ) -> async_graphql::Result<TimeOffRequestPayload> {
        let data = graphql_data(ctx)?;
        let handle = session(ctx)?;
        let mut session = handle.lock().await;
        let viewer = session.role.clone();
        let name = data
            .hr
            .employee(viewer.viewer_id())
            .map(|e| e.name.clone())
            .unwrap_or_else(|_| viewer.viewer_id().to_string());
        let form = TimeOffForm::from(input);
        let created = session
            .time_off
            .submit(&viewer, &name, &form)
            .map_err(hr_error)?;
        Ok(created.into())
    }
}
