use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveTime};
use platform_authz::{Role, RoleContext};
use products_hr::{
    attendance::{
        derive_attendance_view, filter_attendance, generate_attendance, summarize_month,
        AttendanceFilter, AttendanceRecord, AttendanceSummary, AttendanceWindow,
    },
    directory::search_directory,
    seed::demo_employees,
    time_off::{visible_requests, DecisionOutcome, TimeOffStatus},
    DatasetSpec, HrModule,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded(seed: u64) -> HrModule {
    HrModule::seeded(DatasetSpec {
        seed,
        today: date(2024, 6, 28),
    })
}

#[test]
fn generated_pairs_are_unique_across_seeds() {
    for seed in [1, 42, 9_001] {
        let hr = seeded(seed);
        let mut pairs = HashSet::new();
        for record in hr.attendance() {
            assert!(
                pairs.insert((record.employee_id.as_str(), record.date)),
                "duplicate record {}",
                record.id
            );
        }
    }
}

#[test]
fn absent_records_have_no_work_and_count_as_absent() {
    let hr = seeded(42);
    for record in hr.attendance().iter().filter(|r| r.check_in.is_none()) {
        assert_eq!(record.work_minutes, 0);
        assert_eq!(record.extra_minutes, 0);
        assert!(record.check_out.is_none());
    }
    for employee in hr.employees() {
        let summary = summarize_month(hr.attendance(), &employee.id, 5);
        let absent = hr
            .attendance()
            .iter()
            .filter(|r| r.employee_id == employee.id && r.check_in.is_none())
            .count();
        assert_eq!(summary.absent, absent);
    }
}

#[test]
fn present_plus_absent_equals_total() {
    let hr = seeded(7);
    for employee in hr.employees() {
        for month in 0..12 {
            let s = summarize_month(hr.attendance(), &employee.id, month);
            assert_eq!(s.present + s.absent, s.total);
        }
    }
}

#[test]
fn employees_never_see_foreign_records() {
    let hr = seeded(42);
    let book = hr.time_off_book();
    for employee in hr.employees() {
        let viewer = RoleContext::new(employee.id.clone(), Role::Employee);
        for month in 0..12 {
            let filter = AttendanceFilter::new(hr.today()).with_month(month);
            assert!(filter_attendance(hr.attendance(), &viewer, &filter)
                .iter()
                .all(|r| r.employee_id == employee.id));
        }
        assert!(visible_requests(book.requests(), &viewer, Some(""))
            .iter()
            .all(|r| r.employee_id == employee.id));
    }
}

#[test]
fn terminal_requests_ignore_further_decisions() {
    let hr = seeded(42);
    let admin = RoleContext::new("EMP004", Role::Admin);
    let mut book = hr.time_off_book();
    let terminal: Vec<(String, TimeOffStatus)> = book
        .requests()
        .iter()
        .filter(|r| r.status.is_terminal())
        .map(|r| (r.id.clone(), r.status))
        .collect();
    assert!(!terminal.is_empty());
    for (id, status) in terminal {
        assert_eq!(
            book.approve(&admin, &id).unwrap(),
            DecisionOutcome::Unchanged(status)
        );
        assert_eq!(
            book.reject(&admin, &id).unwrap(),
            DecisionOutcome::Unchanged(status)
        );
        assert_eq!(book.get(&id).unwrap().status, status);
    }
}

#[test]
fn june_example_yields_two_records_and_summary() {
    let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
    let records = vec![
        AttendanceRecord::present("E1", "Ana Silva", date(2024, 6, 1), at(9, 0), 540),
        AttendanceRecord::absent("E1", "Ana Silva", date(2024, 6, 2)),
        AttendanceRecord::absent("E2", "John Doe", date(2024, 6, 1)),
    ];
    let viewer = RoleContext::new("E1", Role::Employee);
    let filter = AttendanceFilter::new(date(2024, 6, 2)).with_month(5);
    let view = derive_attendance_view(&records, &viewer, &filter);

    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].check_out, Some(at(18, 0)));
    assert_eq!(
        view.summary,
        Some(AttendanceSummary {
            present: 1,
            absent: 1,
            total: 2
        })
    );
}

#[test]
fn pending_request_is_approved_once() {
    let hr = seeded(42);
    let hr_viewer = RoleContext::new("EMP004", Role::Hr);
    let mut book = hr.time_off_book();
    assert_eq!(book.get("TO-001").unwrap().status, TimeOffStatus::Pending);
    assert_eq!(
        book.approve(&hr_viewer, "TO-001").unwrap(),
        DecisionOutcome::Applied(TimeOffStatus::Approved)
    );
    book.approve(&hr_viewer, "TO-001").unwrap();
    book.reject(&hr_viewer, "TO-001").unwrap();
    assert_eq!(book.get("TO-001").unwrap().status, TimeOffStatus::Approved);
}

#[test]
fn name_search_ignores_case() {
    let employees: Vec<_> = demo_employees()
        .into_iter()
        .filter(|e| e.name == "Ana Silva" || e.name == "John Doe")
        .collect();
    for query in ["ana", "ANA", "aNa"] {
        let found = search_directory(&employees, query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ana Silva");
    }
}

#[test]
fn elevated_view_tracks_the_selected_day() {
    let employees = demo_employees();
    let window = AttendanceWindow::new(date(2024, 6, 3), date(2024, 6, 7));
    let records = generate_attendance(&employees, &window, 42);
    let admin = RoleContext::new("EMP001", Role::Admin);
    let view = derive_attendance_view(&records, &admin, &AttendanceFilter::new(date(2024, 6, 5)));
    assert_eq!(view.matched, employees.len());
    assert!(view.rows.iter().all(|r| r.date.day() == 5));
    assert!(view.summary.is_none());
}
