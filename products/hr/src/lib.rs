//! HR vertical slice: employee directory, attendance, time off, profiles and
//! the check-in panel, all derived from in-memory demo data.
//!
//! The dataset is generated once by [`HrModule::seeded`] and never mutated.
//! Everything a viewer sees is recomputed from it through the pure
//! derivation functions in each module, scoped by a
//! [`platform_authz::RoleContext`].

pub mod attendance;
pub mod checkin;
pub mod directory;
pub mod employee;
pub mod error;
pub mod forms;
pub mod profile;
pub mod seed;
pub mod time_off;

use chrono::NaiveDate;

pub use error::{HrError, HrResult};

use crate::{
    attendance::{generate_attendance, AttendanceRecord, AttendanceWindow},
    employee::Employee,
    time_off::{TimeOffBook, TimeOffRequest},
};

/// Case-insensitive substring match; an empty query matches everything.
pub fn matches_query(haystack: &str, query: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Inputs that fully determine the generated dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatasetSpec {
    pub seed: u64,
    pub today: NaiveDate,
}

#[derive(Debug)]
pub struct HrModule {
    today: NaiveDate,
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRecord>,
    time_off: Vec<TimeOffRequest>,
}

impl HrModule {
    pub fn seeded(dataset: DatasetSpec) -> Self {
        let employees = seed::demo_employees();
        let window = AttendanceWindow::month_to_date(dataset.today);
        let attendance = generate_attendance(&employees, &window, dataset.seed);
        let time_off = seed::demo_time_off(dataset.today);
        tracing::info!(
            employees = employees.len(),
            attendance = attendance.len(),
            time_off = time_off.len(),
            seed = dataset.seed,
            today = %dataset.today,
            "hr dataset ready"
        );
        Self {
            today: dataset.today,
            employees,
            attendance,
            time_off,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee(&self, id: &str) -> HrResult<&Employee> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| HrError::EmployeeNotFound(id.to_string()))
    }

    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    /// A fresh time-off book for a new session, starting from the seed.
    pub fn time_off_book(&self) -> TimeOffBook {
        TimeOffBook::new(self.time_off.clone())
    }
}
