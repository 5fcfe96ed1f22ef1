use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    pub id: String,
    pub login_id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub manager: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub resume: Resume,
    pub private: PrivateInfo,
    pub bank: BankDetails,
    pub compensation: Compensation,
}

impl Employee {
    /// Initials shown when no avatar is available, e.g. `AS` for "Ana Silva".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resume {
    pub about: String,
    pub what_i_love: String,
    pub interests: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrivateInfo {
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub nationality: String,
    pub marital_status: String,
    pub address: String,
    pub personal_email: String,
    pub date_of_joining: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub pan_no: String,
    pub uan_no: String,
    pub emp_code: String,
}

/// Monthly salary components, in whole rupees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Compensation {
    pub basic: i64,
    pub hra: i64,
    pub standard_allowance: i64,
    pub performance_bonus: i64,
    pub lta: i64,
    pub fixed_allowance: i64,
    pub pf_employee: i64,
    pub pf_employer: i64,
    pub professional_tax: i64,
}

pub const PF_RATE_PERCENT: i64 = 12;
pub const PROFESSIONAL_TAX: i64 = 200;

impl Compensation {
    /// Splits a monthly wage into the fixed-wage structure: basic 50 %,
    /// HRA 20 %, standard 10 %, bonus 5 %, LTA 3 %, and the remainder as
    /// fixed allowance. PF is charged on basic.
    pub fn structured(monthly_wage: i64) -> Self {
        let share = |percent: i64| monthly_wage * percent / 100;
        let basic = share(50);
        let hra = share(20);
        let standard_allowance = share(10);
        let performance_bonus = share(5);
        let lta = share(3);
        let fixed_allowance =
            monthly_wage - basic - hra - standard_allowance - performance_bonus - lta;
        let pf = basic * PF_RATE_PERCENT / 100;
        Self {
            basic,
            hra,
            standard_allowance,
            performance_bonus,
            lta,
            fixed_allowance,
            pf_employee: pf,
            pf_employer: pf,
            professional_tax: PROFESSIONAL_TAX,
        }
    }

    pub fn monthly_wage(&self) -> i64 {
        self.basic
            + self.hra
            + self.standard_allowance
            + self.performance_bonus
            + self.lta
            + self.fixed_allowance
    }

    pub fn yearly_wage(&self) -> i64 {
        self.monthly_wage() * 12
    }

    pub fn net_monthly(&self) -> i64 {
        self.monthly_wage() - self.pf_employee - self.professional_tax
    }
}

/// Formats rupees with Indian digit grouping: `₹1,23,456`.
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            parts.push(right);
            rest = left;
        }
        if !rest.is_empty() {
            parts.push(rest);
        }
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };
    if amount < 0 {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}
