//! Demo roster and time-off requests the server boots with.

use chrono::{Datelike, Duration, NaiveDate};

use crate::{
    employee::{BankDetails, Compensation, Employee, PrivateInfo, Resume},
    time_off::{TimeOffRequest, TimeOffStatus, TimeOffType},
};

pub const COMPANY: &str = "Dayflow Systems";
pub const DEFAULT_VIEWER_ID: &str = "EMP001";

struct Hire {
    name: &'static str,
    designation: &'static str,
    department: &'static str,
    manager: &'static str,
    location: &'static str,
    joined: (i32, u32, u32),
    born: (i32, u32, u32),
    gender: &'static str,
    monthly_wage: i64,
    skills: &'static [&'static str],
}

const HIRES: [Hire; 8] = [
    Hire {
        name: "Ana Silva",
        designation: "Software Engineer",
        department: "Engineering",
        manager: "Priya Raman",
        location: "Bengaluru",
        joined: (2021, 3, 15),
        born: (1994, 8, 21),
        gender: "Female",
        monthly_wage: 85_000,
        skills: &["Rust", "TypeScript", "PostgreSQL"],
    },
    Hire {
        name: "John Doe",
        designation: "Senior Software Engineer",
        department: "Engineering",
        manager: "Priya Raman",
        location: "Pune",
        joined: (2022, 1, 10),
        born: (1990, 2, 4),
        gender: "Male",
        monthly_wage: 110_000,
        skills: &["Go", "Kubernetes", "gRPC"],
    },
    Hire {
        name: "Priya Raman",
        designation: "Engineering Lead",
        department: "Engineering",
        manager: "Marcus Chen",
        location: "Bengaluru",
        joined: (2019, 6, 3),
        born: (1986, 11, 30),
        gender: "Female",
        monthly_wage: 165_000,
        skills: &["System Design", "Mentoring", "Rust"],
    },
    Hire {
        name: "Marcus Chen",
        designation: "HR Officer",
        department: "People Operations",
        manager: "Board",
        location: "Mumbai",
        joined: (2018, 9, 17),
        born: (1984, 5, 12),
        gender: "Male",
        monthly_wage: 120_000,
        skills: &["Payroll", "Hiring", "Labour Law"],
    },
    Hire {
        name: "Sofia Rossi",
        designation: "Product Designer",
        department: "Design",
        manager: "Priya Raman",
        location: "Remote",
        joined: (2023, 2, 1),
        born: (1996, 7, 9),
        gender: "Female",
        monthly_wage: 78_000,
        skills: &["Figma", "Prototyping", "User Research"],
    },
    Hire {
        name: "Arjun Mehta",
        designation: "QA Engineer",
        department: "Engineering",
        manager: "John Doe",
        location: "Pune",
        joined: (2022, 8, 22),
        born: (1995, 1, 27),
        gender: "Male",
        monthly_wage: 62_000,
        skills: &["Playwright", "Test Planning"],
    },
    Hire {
        name: "Lena Fischer",
        designation: "Finance Analyst",
        department: "Finance",
        manager: "Marcus Chen",
        location: "Mumbai",
        joined: (2020, 11, 9),
        born: (1992, 3, 18),
        gender: "Female",
        monthly_wage: 90_000,
        skills: &["Forecasting", "Excel", "SAP"],
    },
    Hire {
        name: "Kwame Mensah",
        designation: "DevOps Engineer",
        department: "Infrastructure",
        manager: "Priya Raman",
        location: "Hyderabad",
        joined: (2021, 10, 4),
        born: (1991, 12, 2),
        gender: "Male",
        monthly_wage: 98_000,
        skills: &["Terraform", "AWS", "Observability"],
    },
];

fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// First two letters of the first and last name, uppercased: `ANSI`.
fn name_code(name: &str) -> String {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default();
    let last = parts.last().unwrap_or(first);
    first
        .chars()
        .take(2)
        .chain(last.chars().take(2))
        .collect::<String>()
        .to_uppercase()
}

/// Login ids follow `DS` + name code + joining year + serial,
/// e.g. `DSANSI20210001`.
fn login_id(name: &str, joined: NaiveDate, serial: usize) -> String {
    format!("DS{}{}{serial:04}", name_code(name), joined.year())
}

fn hire(serial: usize, h: &Hire) -> Employee {
    let id = format!("EMP{serial:03}");
    let joined = ymd(h.joined);
    let handle = h.name.to_lowercase().replace(' ', ".");
    Employee {
        login_id: login_id(h.name, joined, serial),
        name: h.name.to_string(),
        designation: h.designation.to_string(),
        department: h.department.to_string(),
        manager: h.manager.to_string(),
        company: COMPANY.to_string(),
        location: h.location.to_string(),
        email: format!("{handle}@dayflow.example"),
        phone: format!("+91 98{serial:03}0 4{serial:04}"),
        resume: Resume {
            about: format!("{} in the {} team.", h.designation, h.department),
            what_i_love: "Shipping small changes often.".to_string(),
            interests: "Reading, cycling, board games".to_string(),
            skills: h.skills.iter().map(|s| s.to_string()).collect(),
            certifications: Vec::new(),
        },
        private: PrivateInfo {
            date_of_birth: ymd(h.born),
            gender: h.gender.to_string(),
            nationality: "Indian".to_string(),
            marital_status: "Single".to_string(),
            address: format!("{serial} Residency Road, {}", h.location),
            personal_email: format!("{handle}@mail.example"),
            date_of_joining: joined,
        },
        bank: BankDetails {
            bank_name: "State Bank of India".to_string(),
            account_number: format!("3020{serial:08}"),
            ifsc_code: format!("SBIN000{serial:04}"),
            pan_no: format!("ABCPD{serial:04}K"),
            uan_no: format!("1009{serial:08}"),
            emp_code: id.clone(),
        },
        compensation: Compensation::structured(h.monthly_wage),
        id,
    }
}

pub fn demo_employees() -> Vec<Employee> {
    HIRES
        .iter()
        .enumerate()
        .map(|(index, h)| hire(index + 1, h))
        .collect()
}

/// A handful of requests around `today`, covering every type and status.
pub fn demo_time_off(today: NaiveDate) -> Vec<TimeOffRequest> {
    let rows = [
        ("EMP001", "Ana Silva", 3, 5, TimeOffType::Paid, TimeOffStatus::Pending),
        ("EMP002", "John Doe", -2, -1, TimeOffType::Sick, TimeOffStatus::Approved),
        ("EMP005", "Sofia Rossi", 7, 7, TimeOffType::Unpaid, TimeOffStatus::Pending),
        ("EMP006", "Arjun Mehta", 10, 14, TimeOffType::Paid, TimeOffStatus::Rejected),
        ("EMP007", "Lena Fischer", 1, 2, TimeOffType::Paid, TimeOffStatus::Pending),
        ("EMP008", "Kwame Mensah", 0, 1, TimeOffType::Sick, TimeOffStatus::Approved),
        ("EMP001", "Ana Silva", -20, -19, TimeOffType::Sick, TimeOffStatus::Approved),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(index, (employee_id, name, from, to, kind, status))| TimeOffRequest {
            id: format!("TO-{:03}", index + 1),
            employee_id: employee_id.to_string(),
            employee_name: name.to_string(),
            start_date: today + Duration::days(from),
            end_date: today + Duration::days(to),
            kind,
            status,
        })
        .collect()
}
