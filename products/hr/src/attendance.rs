//! Attendance records: the seeded generator and the role-scoped views
//! derived from it.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use platform_authz::RoleContext;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{employee::Employee, matches_query};

/// Rows shown per attendance table. Not a pagination contract.
pub const DISPLAY_CAP: usize = 15;
pub const STANDARD_WORKDAY_MINUTES: u32 = 8 * 60;
pub const EMPTY_MESSAGE: &str = "No attendance records found";

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const ABSENCE_PROBABILITY: f64 = 0.1;
const EARLIEST_CHECK_IN_MINUTES: u32 = 8 * 60 + 30;
const CHECK_IN_SPREAD_MINUTES: u32 = 75;
const MIN_WORK_MINUTES: u32 = 450;
const MAX_WORK_MINUTES: u32 = 600;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub work_minutes: u32,
    pub extra_minutes: u32,
}

impl AttendanceRecord {
    pub fn absent(employee_id: &str, employee_name: &str, date: NaiveDate) -> Self {
        Self {
            id: record_id(employee_id, date),
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            date,
            check_in: None,
            check_out: None,
            work_minutes: 0,
            extra_minutes: 0,
        }
    }

    pub fn present(
        employee_id: &str,
        employee_name: &str,
        date: NaiveDate,
        check_in: NaiveTime,
        work_minutes: u32,
    ) -> Self {
        Self {
            check_in: Some(check_in),
            check_out: Some(check_in + Duration::minutes(i64::from(work_minutes))),
            work_minutes,
            extra_minutes: work_minutes.saturating_sub(STANDARD_WORKDAY_MINUTES),
            ..Self::absent(employee_id, employee_name, date)
        }
    }

    pub fn is_present(&self) -> bool {
        self.check_in.is_some()
    }

    /// `HH:MM` of worked time; `00:00` on absent days.
    pub fn work_hours(&self) -> String {
        format_minutes(self.work_minutes)
    }

    /// `HH:MM` of overtime, or `-` when there is none.
    pub fn extra_hours(&self) -> String {
        if self.extra_minutes == 0 {
            "-".to_string()
        } else {
            format_minutes(self.extra_minutes)
        }
    }
}

pub fn record_id(employee_id: &str, date: NaiveDate) -> String {
    format!("ATT-{employee_id}-{}", date.format("%Y%m%d"))
}

/// `09:00 AM` style clock label.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Inclusive range of calendar days the generator covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttendanceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AttendanceWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// First of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self::new(start, today)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }
}

/// Builds one record per (employee, day) in the window, days outer and
/// employees inner. The same seed always yields the same records.
pub fn generate_attendance(
    employees: &[Employee],
    window: &AttendanceWindow,
    seed: u64,
) -> Vec<AttendanceRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::new();
    for day in window.days() {
        let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        for employee in employees {
            if weekend || rng.gen_bool(ABSENCE_PROBABILITY) {
                records.push(AttendanceRecord::absent(&employee.id, &employee.name, day));
                continue;
            }
            let offset = EARLIEST_CHECK_IN_MINUTES + rng.gen_range(0..=CHECK_IN_SPREAD_MINUTES);
            let check_in = NaiveTime::default() + Duration::minutes(i64::from(offset));
            let work = rng.gen_range(MIN_WORK_MINUTES..=MAX_WORK_MINUTES);
            records.push(AttendanceRecord::present(
                &employee.id,
                &employee.name,
                day,
                check_in,
                work,
            ));
        }
    }
    tracing::debug!(
        records = records.len(),
        start = %window.start,
        end = %window.end,
        seed,
        "attendance generated"
    );
    records
}

/// UI inputs for the attendance table. `date` drives the elevated view,
/// `month` (0-based) the employee view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub date: NaiveDate,
    pub month: u32,
    pub search: Option<String>,
}

impl AttendanceFilter {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            month: date.month0(),
            search: None,
        }
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = month;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// Every record the viewer may see under `filter`, in generation order and
/// without the display cap.
pub fn filter_attendance<'r>(
    records: &'r [AttendanceRecord],
    viewer: &RoleContext,
    filter: &AttendanceFilter,
) -> Vec<&'r AttendanceRecord> {
    let elevated = viewer.is_elevated();
    let search = filter.search.as_deref().unwrap_or_default();
    records
        .iter()
        .filter(|r| elevated || r.employee_id == viewer.viewer_id())
        .filter(|r| {
            if elevated {
                r.date == filter.date
            } else {
                // Month only, any year.
                r.date.month0() == filter.month
            }
        })
        .filter(|r| matches_query(&r.employee_name, search))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

/// Present/absent counts for one employee in a 0-based month.
pub fn summarize_month(
    records: &[AttendanceRecord],
    employee_id: &str,
    month: u32,
) -> AttendanceSummary {
    let (total, present) = records
        .iter()
        .filter(|r| r.employee_id == employee_id && r.date.month0() == month)
        .fold((0, 0), |(total, present), r| {
            (total + 1, present + usize::from(r.is_present()))
        });
    AttendanceSummary {
        present,
        absent: total - present,
        total,
    }
}

/// The month summary cards; elevated viewers get none.
pub fn attendance_summary(
    records: &[AttendanceRecord],
    viewer: &RoleContext,
    month: u32,
) -> Option<AttendanceSummary> {
    if viewer.is_elevated() {
        None
    } else {
        Some(summarize_month(records, viewer.viewer_id(), month))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendanceView {
    pub rows: Vec<AttendanceRecord>,
    pub matched: usize,
    pub summary: Option<AttendanceSummary>,
}

impl AttendanceView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Recomputes the whole attendance view from its inputs.
pub fn derive_attendance_view(
    records: &[AttendanceRecord],
    viewer: &RoleContext,
    filter: &AttendanceFilter,
) -> AttendanceView {
    let matches = filter_attendance(records, viewer, filter);
    let matched = matches.len();
    AttendanceView {
        rows: matches.into_iter().take(DISPLAY_CAP).cloned().collect(),
        matched,
        summary: attendance_summary(records, viewer, filter.month),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Prev,
    Next,
}

/// Moves the elevated date navigator by one day.
pub fn step_day(date: NaiveDate, step: Step) -> NaiveDate {
    let moved = match step {
        Step::Prev => date.pred_opt(),
        Step::Next => date.succ_opt(),
    };
    moved.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform_authz::Role;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn roster() -> Vec<Employee> {
        crate::seed::demo_employees()
    }

    #[test]
    fn window_covers_month_to_date() {
        let window = AttendanceWindow::month_to_date(date(2024, 6, 12));
        let days: Vec<_> = window.days().collect();
        assert_eq!(days.len(), 12);
        assert_eq!(days[0], date(2024, 6, 1));
        assert_eq!(days[11], date(2024, 6, 12));
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let employees = roster();
        let window = AttendanceWindow::month_to_date(date(2024, 6, 20));
        let first = generate_attendance(&employees, &window, 7);
        let second = generate_attendance(&employees, &window, 7);
        assert_eq!(first, second);
        assert_eq!(first.len(), employees.len() * 20);

        let other = generate_attendance(&employees, &window, 8);
        assert_ne!(first, other);
    }

    #[test]
    fn generated_pairs_are_unique_and_weekends_absent() {
        let employees = roster();
        let window = AttendanceWindow::month_to_date(date(2024, 6, 30));
        let records = generate_attendance(&employees, &window, 42);
        let mut seen = HashSet::new();
        for record in &records {
            assert!(seen.insert((record.employee_id.clone(), record.date)));
            if matches!(record.date.weekday(), Weekday::Sat | Weekday::Sun) {
                assert!(!record.is_present());
            }
            if let (Some(check_in), Some(check_out)) = (record.check_in, record.check_out) {
                assert!(check_out > check_in);
                assert!(record.work_minutes >= MIN_WORK_MINUTES);
            }
        }
    }

    #[test]
    fn labels_render_hours_and_dash() {
        let present = AttendanceRecord::present("EMP001", "Ana Silva", date(2024, 6, 3), time(9, 0), 540);
        assert_eq!(present.check_out, Some(time(18, 0)));
        assert_eq!(present.work_hours(), "09:00");
        assert_eq!(present.extra_hours(), "01:00");
        assert_eq!(format_clock(time(9, 0)), "09:00 AM");
        assert_eq!(format_clock(time(18, 0)), "06:00 PM");

        let absent = AttendanceRecord::absent("EMP001", "Ana Silva", date(2024, 6, 2));
        assert_eq!(absent.work_hours(), "00:00");
        assert_eq!(absent.extra_hours(), "-");
        assert_eq!(absent.id, "ATT-EMP001-20240602");
    }

    #[test]
    fn elevated_view_is_capped_at_fifteen_rows() {
        let records: Vec<_> = (0..20)
            .map(|i| {
                AttendanceRecord::absent(&format!("EMP{i:03}"), &format!("Person {i}"), date(2024, 6, 3))
            })
            .collect();
        let admin = RoleContext::new("EMP001", Role::Admin);
        let view = derive_attendance_view(&records, &admin, &AttendanceFilter::new(date(2024, 6, 3)));
        assert_eq!(view.matched, 20);
        assert_eq!(view.rows.len(), DISPLAY_CAP);
        assert_eq!(view.rows[0].employee_id, "EMP000");
        assert_eq!(view.rows[14].employee_id, "EMP014");
        assert!(view.summary.is_none());
    }

    #[test]
    fn employee_month_match_ignores_year() {
        let records = vec![
            AttendanceRecord::absent("EMP001", "Ana Silva", date(2023, 6, 5)),
            AttendanceRecord::absent("EMP001", "Ana Silva", date(2024, 6, 5)),
            AttendanceRecord::absent("EMP001", "Ana Silva", date(2024, 7, 1)),
        ];
        let viewer = RoleContext::new("EMP001", Role::Employee);
        let filter = AttendanceFilter::new(date(2024, 7, 1)).with_month(5);
        let rows = filter_attendance(&records, &viewer, &filter);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn elevated_search_narrows_the_day_by_name() {
        let employees = roster();
        let window = AttendanceWindow::new(date(2024, 6, 3), date(2024, 6, 7));
        let records = generate_attendance(&employees, &window, 42);
        let hr = RoleContext::new("EMP003", Role::Hr);
        let filter = AttendanceFilter::new(date(2024, 6, 5)).with_search("ANA");
        let view = derive_attendance_view(&records, &hr, &filter);
        let names: Vec<_> = view.rows.iter().map(|r| r.employee_name.as_str()).collect();
        assert_eq!(names, ["Ana Silva"]);
        assert_eq!(view.matched, 1);
        assert_eq!(view.rows[0].date, date(2024, 6, 5));
    }

    #[test]
    fn employee_search_on_another_name_is_empty() {
        let employees = roster();
        let window = AttendanceWindow::month_to_date(date(2024, 6, 12));
        let records = generate_attendance(&employees, &window, 42);
        let viewer = RoleContext::new("EMP002", Role::Employee);

        let own = AttendanceFilter::new(date(2024, 6, 12)).with_month(5).with_search("doe");
        assert_eq!(derive_attendance_view(&records, &viewer, &own).matched, 12);

        let other = AttendanceFilter::new(date(2024, 6, 12)).with_month(5).with_search("silva");
        let view = derive_attendance_view(&records, &viewer, &other);
        assert!(view.is_empty());
        assert_eq!(view.matched, 0);
        // The month cards do not depend on the search box.
        assert_eq!(view.summary.map(|s| s.total), Some(12));
    }

    #[test]
    fn empty_result_is_a_valid_view() {
        let viewer = RoleContext::new("EMP001", Role::Hr);
        let view = derive_attendance_view(&[], &viewer, &AttendanceFilter::new(date(2024, 6, 3)));
        assert!(view.is_empty());
        assert_eq!(view.matched, 0);
    }

    #[test]
    fn date_navigation_steps_one_day() {
        assert_eq!(step_day(date(2024, 3, 1), Step::Prev), date(2024, 2, 29));
        assert_eq!(step_day(date(2024, 12, 31), Step::Next), date(2025, 1, 1));
    }
}
