use async_graphql::{Context, Enum, Object, SimpleObject};
use chrono::NaiveDate;
use products_hr::{
    directory::{self, DirectoryCard},
    employee::{BankDetails, Employee, PrivateInfo, Resume, format_inr},
    profile::{ProfileView, SalaryBreakdown, SalaryComponent, profile_view},
};
use tracing::instrument;

use crate::graphql::{graphql_data, hr_error, session};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "Presence", remote = "products_hr::directory::Presence")]
pub enum PresenceGql {
    Present,
    Leave,
    Absent,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DirectoryCardPayload {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub designation: String,
    pub login_id: String,
    pub presence: PresenceGql,
}

impl From<DirectoryCard> for DirectoryCardPayload {
    fn from(card: DirectoryCard) -> Self {
        Self {
            id: card.id,
            name: card.name,
            initials: card.initials,
            designation: card.designation,
            login_id: card.login_id,
            presence: card.presence.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DirectoryPayload {
    pub cards: Vec<DirectoryCardPayload>,
    pub is_empty: bool,
    pub empty_message: String,
    pub can_create_employee: bool,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ResumePayload {
    pub about: String,
    pub what_i_love: String,
    pub interests: String,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
}

impl From<&Resume> for ResumePayload {
    fn from(r: &Resume) -> Self {
        Self {
            about: r.about.clone(),
            what_i_love: r.what_i_love.clone(),
            interests: r.interests.clone(),
            skills: r.skills.clone(),
            certifications: r.certifications.clone(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PrivateInfoPayload {
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub nationality: String,
    pub marital_status: String,
    pub address: String,
    pub personal_email: String,
    pub date_of_joining: NaiveDate,
}

impl From<&PrivateInfo> for PrivateInfoPayload {
    fn from(p: &PrivateInfo) -> Self {
        Self {
            date_of_birth: p.date_of_birth,
            gender: p.gender.clone(),
            nationality: p.nationality.clone(),
            marital_status: p.marital_status.clone(),
            address: p.address.clone(),
            personal_email: p.personal_email.clone(),
            date_of_joining: p.date_of_joining,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct BankDetailsPayload {
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub pan_no: String,
    pub uan_no: String,
    pub emp_code: String,
}

impl From<&BankDetails> for BankDetailsPayload {
    fn from(b: &BankDetails) -> Self {
        Self {
            bank_name: b.bank_name.clone(),
            account_number: b.account_number.clone(),
            ifsc_code: b.ifsc_code.clone(),
            pan_no: b.pan_no.clone(),
            uan_no: b.uan_no.clone(),
            emp_code: b.emp_code.clone(),
        }
    }
}

/// Amounts are whole rupees; `formatted` uses lakh grouping.
#[derive(Clone, Debug, SimpleObject)]
pub struct MoneyPayload {
    pub amount: i64,
    pub formatted: String,
}

impl From<i64> for MoneyPayload {
    fn from(amount: i64) -> Self {
        Self {
            amount,
            formatted: format_inr(amount),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SalaryComponentPayload {
    pub name: String,
    pub amount: MoneyPayload,
    pub percent: i64,
}

impl From<SalaryComponent> for SalaryComponentPayload {
    fn from(c: SalaryComponent) -> Self {
        Self {
            name: c.name.to_string(),
            amount: c.amount.into(),
            percent: c.percent,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SalaryPayload {
    pub components: Vec<SalaryComponentPayload>,
    pub monthly_wage: MoneyPayload,
    pub yearly_wage: MoneyPayload,
    pub pf_employee: MoneyPayload,
    pub pf_employer: MoneyPayload,
    pub professional_tax: MoneyPayload,
    pub net_monthly: MoneyPayload,
}

impl From<SalaryBreakdown> for SalaryPayload {
    fn from(s: SalaryBreakdown) -> Self {
        Self {
            components: s.components.into_iter().map(Into::into).collect(),
            monthly_wage: s.monthly_wage.into(),
            yearly_wage: s.yearly_wage.into(),
            pf_employee: s.pf_employee.into(),
            pf_employer: s.pf_employer.into(),
            professional_tax: s.professional_tax.into(),
            net_monthly: s.net_monthly.into(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ProfilePayload {
    pub id: String,
    pub login_id: String,
    pub name: String,
    pub initials: String,
    pub designation: String,
    pub department: String,
    pub manager: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub resume: ResumePayload,
    pub private_info: Option<PrivateInfoPayload>,
    pub bank_details: Option<BankDetailsPayload>,
    pub salary: Option<SalaryPayload>,
    pub editable: bool,
    pub is_self: bool,
}

impl From<ProfileView<'_>> for ProfilePayload {
    fn from(view: ProfileView<'_>) -> Self {
        let e: &Employee = view.employee;
        Self {
            id: e.id.clone(),
            login_id: e.login_id.clone(),
            name: e.name.clone(),
            initials: e.initials(),
            designation: e.designation.clone(),
            department: e.department.clone(),
            manager: e.manager.clone(),
            company: e.company.clone(),
            location: e.location.clone(),
            email: e.email.clone(),
            phone: e.phone.clone(),
            resume: view.resume.into(),
            private_info: view.private.map(Into::into),
            bank_details: view.bank.map(Into::into),
            salary: view.salary.map(Into::into),
            editable: view.editable,
            is_self: view.is_self,
        }
    }
}

#[derive(Default)]
pub struct DirectoryQuery;

#[Object]
impl DirectoryQuery {
    /// Employee cards with today's presence.
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
    ) -> async_graphql::Result<DirectoryPayload> {
        let data = graphql_data(ctx)?;
        let handle = session(ctx)?;
        let session = handle.lock().await;
        let hr = &data.hr;
        let cards: Vec<DirectoryCardPayload> = directory::directory_cards(
            hr.employees(),
            search.as_deref().unwrap_or_default(),
            hr.today(),
            hr.attendance(),
            session.time_off.requests(),
        )
        .into_iter()
        .map(Into::into)
        .collect();
        Ok(DirectoryPayload {
            is_empty: cards.is_empty(),
            cards,
            empty_message: directory::EMPTY_MESSAGE.to_string(),
            can_create_employee: session.role.capabilities().create_employees,
        })
    }

    #[instrument(name = "graphql.employee", skip_all, fields(%id))]
    async fn employee(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<ProfilePayload> {
        let data = graphql_data(ctx)?;
        let handle = session(ctx)?;
        let role = handle.lock().await.role.clone();
        let employee = data.hr.employee(&id).map_err(hr_error)?;
        Ok(profile_view(employee, &role).into())
    }

    #[instrument(name = "graphql.my_profile", skip_all)]
    async fn my_profile(&self, ctx: &Context<'_>) -> async_graphql::Result<ProfilePayload> {
        let data = graphql_data(ctx)?;
        let handle = session(ctx)?;
        let role = handle.lock().await.role.clone();
        let employee = data.hr.employee(role.viewer_id()).map_err(hr_error)?;
        Ok(profile_view(employee, &role).into())
    }
}
