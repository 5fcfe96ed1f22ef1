//! Time-off requests, their approval workflow and leave balances.

use chrono::NaiveDate;
use platform_authz::{Action, PolicyContext, PolicyEngine, RoleContext};
use serde::{Deserialize, Serialize};

use crate::{
    error::{HrError, HrResult},
    forms::FormErrors,
    matches_query,
};

pub const EMPTY_MESSAGE: &str = "No time off requests found";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOffType {
    Paid,
    Sick,
    Unpaid,
}

impl TimeOffType {
    pub fn label(self) -> &'static str {
        match self {
            TimeOffType::Paid => "Paid Time Off",
            TimeOffType::Sick => "Sick Leave",
            TimeOffType::Unpaid => "Unpaid Leave",
        }
    }

    /// Sick leave asks for a medical certificate upload.
    pub fn requires_certificate(self) -> bool {
        self == TimeOffType::Sick
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOffStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TimeOffStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TimeOffStatus::Pending)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeOffRequest {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: TimeOffType,
    pub status: TimeOffStatus,
}

impl TimeOffRequest {
    /// Calendar days covered, both ends included.
    pub fn days(&self) -> u32 {
        let span = (self.end_date - self.start_date).num_days();
        u32::try_from(span + 1).unwrap_or(0)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn target(self) -> TimeOffStatus {
        match self {
            Decision::Approve => TimeOffStatus::Approved,
            Decision::Reject => TimeOffStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The request moved out of pending into this status.
    Applied(TimeOffStatus),
    /// The request was already decided; its status is unchanged.
    Unchanged(TimeOffStatus),
}

impl DecisionOutcome {
    pub fn status(self) -> TimeOffStatus {
        match self {
            DecisionOutcome::Applied(status) | DecisionOutcome::Unchanged(status) => status,
        }
    }
}

/// Input of the "Request Time Off" dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeOffForm {
    pub kind: Option<TimeOffType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TimeOffForm {
    fn validate(&self) -> Result<(TimeOffType, NaiveDate, NaiveDate), FormErrors> {
        let mut errors = FormErrors::new();
        if self.kind.is_none() {
            errors.push("kind", "Time-off type is required");
        }
        if self.start_date.is_none() {
            errors.push("startDate", "Start date is required");
        }
        if self.end_date.is_none() {
            errors.push("endDate", "End date is required");
        }
        match (self.kind, self.start_date, self.end_date) {
            (Some(kind), Some(start), Some(end)) if end >= start => Ok((kind, start, end)),
            (_, Some(start), Some(end)) if end < start => {
                errors.push("endDate", "End date must not be before start date");
                Err(errors)
            }
            _ => Err(errors),
        }
    }
}

/// Session-local set of requests. Decisions mutate only this copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeOffBook {
    requests: Vec<TimeOffRequest>,
    next_seq: usize,
}

impl TimeOffBook {
    pub fn new(requests: Vec<TimeOffRequest>) -> Self {
        let next_seq = requests.len() + 1;
        Self { requests, next_seq }
    }

    pub fn requests(&self) -> &[TimeOffRequest] {
        &self.requests
    }

    pub fn get(&self, id: &str) -> Option<&TimeOffRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn approve(&mut self, viewer: &RoleContext, id: &str) -> HrResult<DecisionOutcome> {
        self.decide(viewer, id, Decision::Approve)
    }

    pub fn reject(&mut self, viewer: &RoleContext, id: &str) -> HrResult<DecisionOutcome> {
        self.decide(viewer, id, Decision::Reject)
    }

    pub fn decide(
        &mut self,
        viewer: &RoleContext,
        id: &str,
        decision: Decision,
    ) -> HrResult<DecisionOutcome> {
        PolicyEngine.check(&PolicyContext::new(viewer, Action::DecideTimeOff, id))?;
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HrError::TimeOffNotFound(id.to_string()))?;
        if request.status.is_terminal() {
            tracing::debug!(id, status = ?request.status, "time off already decided");
            return Ok(DecisionOutcome::Unchanged(request.status));
        }
        request.status = decision.target();
        tracing::info!(id, status = ?request.status, by = viewer.viewer_id(), "time off decided");
        Ok(DecisionOutcome::Applied(request.status))
    }

    /// Files a pending request on behalf of the viewer.
    pub fn submit(
        &mut self,
        viewer: &RoleContext,
        employee_name: &str,
        form: &TimeOffForm,
    ) -> HrResult<&TimeOffRequest> {
        let (kind, start_date, end_date) = form.validate()?;
        let request = TimeOffRequest {
            id: format!("TO-{:03}", self.next_seq),
            employee_id: viewer.viewer_id().to_string(),
            employee_name: employee_name.to_string(),
            start_date,
            end_date,
            kind,
            status: TimeOffStatus::Pending,
        };
        self.next_seq += 1;
        tracing::info!(id = %request.id, kind = ?kind, "time off requested");
        self.requests.push(request);
        let index = self.requests.len() - 1;
        Ok(&self.requests[index])
    }
}

/// Requests the viewer may see. Employees only see their own and the search
/// box does not apply to them; elevated viewers see everyone, narrowed by a
/// case-insensitive name search.
pub fn visible_requests<'r>(
    requests: &'r [TimeOffRequest],
    viewer: &RoleContext,
    search: Option<&str>,
) -> Vec<&'r TimeOffRequest> {
    if !viewer.is_elevated() {
        return requests
            .iter()
            .filter(|r| r.employee_id == viewer.viewer_id())
            .collect();
    }
    let search = search.unwrap_or_default();
    requests
        .iter()
        .filter(|r| matches_query(&r.employee_name, search))
        .collect()
}

/// Yearly allowance per leave type, in days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaveAllowance {
    pub paid: u32,
    pub sick: u32,
}

impl Default for LeaveAllowance {
    fn default() -> Self {
        Self { paid: 24, sick: 7 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeOffBalance {
    pub paid_available: u32,
    pub sick_available: u32,
}

impl TimeOffBalance {
    /// Allowance minus the approved days already taken of each type.
    pub fn for_employee(
        requests: &[TimeOffRequest],
        employee_id: &str,
        allowance: LeaveAllowance,
    ) -> Self {
        let taken = |kind: TimeOffType| -> u32 {
            requests
                .iter()
                .filter(|r| {
                    r.employee_id == employee_id
                        && r.kind == kind
                        && r.status == TimeOffStatus::Approved
                })
                .map(TimeOffRequest::days)
                .sum()
        };
        Self {
            paid_available: allowance.paid.saturating_sub(taken(TimeOffType::Paid)),
            sick_available: allowance.sick.saturating_sub(taken(TimeOffType::Sick)),
        }
    }
}
