use platform_authz::AuthzError;
use thiserror::Error;

use crate::forms::FormErrors;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("employee {0} not found")]
    EmployeeNotFound(String),
    #[error("time off request {0} not found")]
    TimeOffNotFound(String),
    #[error(transparent)]
    Forbidden(#[from] AuthzError),
    #[error("form has invalid fields")]
    Validation(FormErrors),
}

impl From<FormErrors> for HrError {
    fn from(value: FormErrors) -> Self {
        HrError::Validation(value)
    }
}

pub type HrResult<T> = Result<T, HrError>;
