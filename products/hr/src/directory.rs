use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    attendance::AttendanceRecord,
    employee::Employee,
    matches_query,
    time_off::{TimeOffRequest, TimeOffStatus},
};

pub const EMPTY_MESSAGE: &str = "No employees found";

/// Status dot on an employee card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Present,
    Leave,
    Absent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectoryCard {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub designation: String,
    pub login_id: String,
    pub presence: Presence,
}

/// Case-insensitive match on name, login id or designation.
pub fn search_directory<'e>(employees: &'e [Employee], query: &str) -> Vec<&'e Employee> {
    employees
        .iter()
        .filter(|e| {
            matches_query(&e.name, query)
                || matches_query(&e.login_id, query)
                || matches_query(&e.designation, query)
        })
        .collect()
}

/// Approved leave wins over attendance; otherwise a check-in that day means
/// present.
pub fn presence_on(
    date: NaiveDate,
    employee_id: &str,
    attendance: &[AttendanceRecord],
    requests: &[TimeOffRequest],
) -> Presence {
    let on_leave = requests.iter().any(|r| {
        r.employee_id == employee_id && r.status == TimeOffStatus::Approved && r.covers(date)
    });
    if on_leave {
        return Presence::Leave;
    }
    let checked_in = attendance
        .iter()
        .any(|r| r.employee_id == employee_id && r.date == date && r.is_present());
    if checked_in {
        Presence::Present
    } else {
        Presence::Absent
    }
}

pub fn directory_cards(
    employees: &[Employee],
    query: &str,
    date: NaiveDate,
    attendance: &[AttendanceRecord],
    requests: &[TimeOffRequest],
) -> Vec<DirectoryCard> {
    search_directory(employees, query)
        .into_iter()
        .map(|e| DirectoryCard {
            id: e.id.clone(),
            name: e.name.clone(),
            initials: e.initials(),
            designation: e.designation.clone(),
            login_id: e.login_id.clone(),
            presence: presence_on(date, &e.id, attendance, requests),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{seed::demo_employees, time_off::TimeOffType};
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn search_matches_name_login_and_designation() {
        let employees = demo_employees();
        let by_name = search_directory(&employees, "silva");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Ana Silva");

        // "ana" also hits the Finance Analyst designation.
        let mixed = search_directory(&employees, "ana");
        assert!(mixed.iter().any(|e| e.name == "Ana Silva"));
        assert!(mixed.iter().any(|e| e.designation == "Finance Analyst"));

        let by_designation = search_directory(&employees, "ENGINEER");
        assert!(by_designation.len() > 1);
        assert!(by_designation
            .iter()
            .all(|e| e.designation.to_lowercase().contains("engineer")));

        let login = employees[1].login_id.to_lowercase();
        assert_eq!(search_directory(&employees, &login).len(), 1);

        assert_eq!(search_directory(&employees, "").len(), employees.len());
        assert!(search_directory(&employees, "zzz").is_empty());
    }

    #[test]
    fn presence_prefers_leave_then_check_in() {
        let day = date(2024, 6, 11);
        let attendance = vec![
            AttendanceRecord::present(
                "EMP001",
                "Ana Silva",
                day,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                480,
            ),
            AttendanceRecord::absent("EMP002", "John Doe", day),
        ];
        let requests = vec![TimeOffRequest {
            id: "TO-001".into(),
            employee_id: "EMP001".into(),
            employee_name: "Ana Silva".into(),
            start_date: date(2024, 6, 10),
            end_date: date(2024, 6, 12),
            kind: TimeOffType::Paid,
            status: TimeOffStatus::Approved,
        }];
        assert_eq!(presence_on(day, "EMP001", &attendance, &requests), Presence::Leave);
        assert_eq!(presence_on(day, "EMP001", &attendance, &[]), Presence::Present);
        assert_eq!(presence_on(day, "EMP002", &attendance, &requests), Presence::Absent);
    }
}
