use async_graphql::{Context, ErrorExtensions, Object, SimpleObject};
use chrono::{Datelike, NaiveDate};
use platform_api::ApiError;
use products_hr::attendance::{
    self, AttendanceFilter, AttendanceRecord, AttendanceSummary, MONTH_NAMES, Step,
    derive_attendance_view, format_clock, step_day,
};
use tracing::instrument;

use crate::graphql::{graphql_data, session};

#[derive(Clone, Debug, SimpleObject)]
pub struct AttendanceRowPayload {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub present: bool,
    /// `09:00 AM` style, absent days have none.
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub work_hours: String,
    pub extra_hours: String,
}

impl From<AttendanceRecord> for AttendanceRowPayload {
    fn from(r: AttendanceRecord) -> Self {
        Self {
            present: r.is_present(),
            check_in: r.check_in.map(format_clock),
            check_out: r.check_out.map(format_clock),
            work_hours: r.work_hours(),
            extra_hours: r.extra_hours(),
            id: r.id,
            employee_id: r.employee_id,
            employee_name: r.employee_name,
            date: r.date,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AttendanceSummaryPayload {
    pub present: u32,
    pub absent: u32,
    pub total: u32,
}

impl From<AttendanceSummary> for AttendanceSummaryPayload {
    fn from(s: AttendanceSummary) -> Self {
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        Self {
            present: count(s.present),
            absent: count(s.absent),
            total: count(s.total),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct AttendanceViewPayload {
    pub rows: Vec<AttendanceRowPayload>,
    /// Matches before the display cap.
    pub matched: u32,
    pub date: NaiveDate,
    pub previous_date: NaiveDate,
    pub next_date: NaiveDate,
    pub month: u32,
    pub month_name: String,
    /// Only for non-elevated viewers.
    pub summary: Option<AttendanceSummaryPayload>,
    pub is_empty: bool,
    pub empty_message: String,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct MonthPayload {
    pub index: u32,
    pub name: String,
}

#[derive(Default)]
pub struct AttendanceQuery;

#[Object]
impl AttendanceQuery {
    /// Elevated viewers see everyone on `date`; employees see their own
    /// records for `month` (0-based, any year). Both default from the
    /// reference date.
    #[instrument(name = "graphql.attendance", skip_all)]
    async fn attendance(
        &self,
        ctx: &Context<'_>,
        date: Option<NaiveDate>,
        month: Option<u32>,
        search: Option<String>,
    ) -> async_graphql::Result<AttendanceViewPayload> {
        let data = graphql_data(ctx)?;
        let date = date.unwrap_or_else(|| data.hr.today());
        let month = month.unwrap_or_else(|| date.month0());
        if month >= 12 {
            return Err(ApiError::InvalidInput(format!("month {month} out of range")).extend());
        }
        let mut filter = AttendanceFilter::new(date).with_month(month);
        if let Some(search) = search {
            filter = filter.with_search(search);
        }

        let handle = session(ctx)?;
        let role = handle.lock().await.role.clone();
        let view = derive_attendance_view(data.hr.attendance(), &role, &filter);
        tracing::debug!(matched = view.matched, shown = view.rows.len(), "attendance derived");

        Ok(AttendanceViewPayload {
            is_empty: view.is_empty(),
            matched: u32::try_from(view.matched).unwrap_or(u32::MAX),
            rows: view.rows.into_iter().map(Into::into).collect(),
            date,
            previous_date: step_day(date, Step::Prev),
            next_date: step_day(date, Step::Next),
            month,
            month_name: MONTH_NAMES[month as usize].to_string(),
            summary: view.summary.map(Into::into),
            empty_message: attendance::EMPTY_MESSAGE.to_string(),
        })
    }

    /// Options for the month selector.
    async fn months(&self) -> Vec<MonthPayload> {
        MONTH_NAMES
            .iter()
            .zip(0u32..)
            .map(|(name, index)| MonthPayload {
                index,
                name: name.to_string(),
            })
            .collect()
    }
}
