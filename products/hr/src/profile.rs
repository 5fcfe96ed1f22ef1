//! Role-based field visibility for the profile pages.

use platform_authz::{Action, PolicyContext, PolicyEngine, RoleContext};
use serde::Serialize;

use crate::employee::{BankDetails, Compensation, Employee, PrivateInfo, Resume};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SalaryComponent {
    pub name: &'static str,
    pub amount: i64,
    /// Share of the monthly wage, rounded to whole percent.
    pub percent: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SalaryBreakdown {
    pub components: Vec<SalaryComponent>,
    pub monthly_wage: i64,
    pub yearly_wage: i64,
    pub pf_employee: i64,
    pub pf_employer: i64,
    pub professional_tax: i64,
    pub net_monthly: i64,
}

impl SalaryBreakdown {
    pub fn from_compensation(comp: &Compensation) -> Self {
        let monthly_wage = comp.monthly_wage();
        let percent_of = |amount: i64| {
            if monthly_wage == 0 {
                0
            } else {
                (amount * 100 + monthly_wage / 2) / monthly_wage
            }
        };
        let components = [
            ("Basic Salary", comp.basic),
            ("House Rent Allowance", comp.hra),
            ("Standard Allowance", comp.standard_allowance),
            ("Performance Bonus", comp.performance_bonus),
            ("Leave Travel Allowance", comp.lta),
            ("Fixed Allowance", comp.fixed_allowance),
        ]
        .into_iter()
        .map(|(name, amount)| SalaryComponent {
            name,
            amount,
            percent: percent_of(amount),
        })
        .collect();
        Self {
            components,
            monthly_wage,
            yearly_wage: comp.yearly_wage(),
            pf_employee: comp.pf_employee,
            pf_employer: comp.pf_employer,
            professional_tax: comp.professional_tax,
            net_monthly: comp.net_monthly(),
        }
    }
}

/// What one viewer sees of one employee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileView<'e> {
    pub employee: &'e Employee,
    pub resume: &'e Resume,
    pub private: Option<&'e PrivateInfo>,
    pub bank: Option<&'e BankDetails>,
    pub salary: Option<SalaryBreakdown>,
    pub editable: bool,
    pub is_self: bool,
}

/// Header and resume are public. Private and bank details are for elevated
/// viewers and the employee themself; salary is for elevated viewers only.
pub fn profile_view<'e>(employee: &'e Employee, viewer: &RoleContext) -> ProfileView<'e> {
    let engine = PolicyEngine;
    let is_self = viewer.is_self(&employee.id);
    let allowed = |action: Action| {
        engine
            .check(&PolicyContext::new(viewer, action, employee.id.as_str()))
            .is_ok()
    };
    let sees_private = is_self || allowed(Action::ReadAllRecords);
    ProfileView {
        employee,
        resume: &employee.resume,
        private: sees_private.then_some(&employee.private),
        bank: sees_private.then_some(&employee.bank),
        salary: allowed(Action::ReadSalary)
            .then(|| SalaryBreakdown::from_compensation(&employee.compensation)),
        editable: allowed(Action::EditProfile),
        is_self,
    }
}
