use thiserror::Error;

use crate::domain::{AgingError, EmployeeId, ParseCentsError, Period, PeriodError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Payroll already run for employee {employee_id} in period {period}")]
    DuplicatePayrollPeriod {
        employee_id: EmployeeId,
        period: Period,
    },

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Employee already exists: {0}")]
    EmployeeAlreadyExists(String),

    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    #[error("Vendor already exists: {0}")]
    VendorAlreadyExists(String),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        AppError::InvalidPeriod(err.to_string())
    }
}

impl From<AgingError> for AppError {
    fn from(err: AgingError) -> Self {
        AppError::InvalidRecord(err.to_string())
    }
}

impl From<ParseCentsError> for AppError {
    fn from(err: ParseCentsError) -> Self {
        AppError::InvalidAmount(err.to_string())
    }
}
