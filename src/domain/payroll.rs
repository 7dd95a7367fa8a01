use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, Employee, EmployeeId, PayType, Period};

/// Flat approximate tax and withholding rates, kept in one place so a real
/// tax-table lookup can replace them without touching the calculation
/// structure.
pub mod rates {
    pub const FEDERAL_WITHHOLDING: f64 = 0.12;
    pub const STATE_WITHHOLDING: f64 = 0.05;
    pub const SOCIAL_SECURITY: f64 = 0.062;
    pub const MEDICARE: f64 = 0.0145;
    pub const FUTA: f64 = 0.006;
    pub const SUTA: f64 = 0.027;
    pub const OVERTIME_MULTIPLIER: f64 = 1.5;
}

pub type PayrollRecordId = Uuid;

/// Hours and tips entered for one employee for a pay period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub employee_id: EmployeeId,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub tips_cents: Cents,
}

/// Employee-side withholdings, each rounded to the cent independently so
/// that `net = gross - total()` holds exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Withholdings {
    pub federal_cents: Cents,
    pub state_cents: Cents,
    pub social_security_cents: Cents,
    pub medicare_cents: Cents,
}

impl Withholdings {
    pub fn total_cents(&self) -> Cents {
        self.federal_cents + self.state_cents + self.social_security_cents + self.medicare_cents
    }
}

/// Employer-side taxes on top of gross pay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmployerTaxes {
    pub social_security_cents: Cents,
    pub medicare_cents: Cents,
    pub futa_cents: Cents,
    pub suta_cents: Cents,
}

impl EmployerTaxes {
    pub fn total_cents(&self) -> Cents {
        self.social_security_cents + self.medicare_cents + self.futa_cents + self.suta_cents
    }
}

/// One employee's pay for one period. Immutable after the run commits;
/// corrections are new, offsetting records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: PayrollRecordId,
    pub employee_id: EmployeeId,
    pub period: Period,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub regular_pay_cents: Cents,
    pub overtime_pay_cents: Cents,
    pub tips_cents: Cents,
    pub gross_cents: Cents,
    pub withholdings: Withholdings,
    pub net_cents: Cents,
    pub employer_taxes: EmployerTaxes,
    pub employer_cost_cents: Cents,
    pub created_at: DateTime<Utc>,
}

/// Run-level totals returned by a committed payroll run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub employees_processed: i64,
    pub total_gross_cents: Cents,
    pub total_net_cents: Cents,
    pub total_employer_cost_cents: Cents,
}

impl RunSummary {
    pub fn from_records(records: &[PayrollRecord]) -> Self {
        Self {
            employees_processed: records.len() as i64,
            total_gross_cents: records.iter().map(|r| r.gross_cents).sum(),
            total_net_cents: records.iter().map(|r| r.net_cents).sum(),
            total_employer_cost_cents: records.iter().map(|r| r.employer_cost_cents).sum(),
        }
    }
}

fn rate_portion(gross: Cents, rate: f64) -> Cents {
    (gross as f64 * rate).round() as Cents
}

/// Compute one employee's pay for a period. Salaried staff are paid the
/// stored per-period rate regardless of entered hours; hourly staff earn
/// hours x rate plus time-and-a-half overtime. Tips are part of gross and
/// therefore withheld against.
pub fn compute_pay(employee: &Employee, entry: &TimesheetEntry, period: Period) -> PayrollRecord {
    let (regular_pay, overtime_pay) = match employee.pay_type {
        PayType::Salaried => (employee.pay_rate_cents, 0),
        PayType::Hourly => {
            let regular = (entry.regular_hours * employee.pay_rate_cents as f64).round() as Cents;
            let overtime = (entry.overtime_hours
                * employee.pay_rate_cents as f64
                * rates::OVERTIME_MULTIPLIER)
                .round() as Cents;
            (regular, overtime)
        }
    };

    let gross = regular_pay + overtime_pay + entry.tips_cents;

    let withholdings = Withholdings {
        federal_cents: rate_portion(gross, rates::FEDERAL_WITHHOLDING),
        state_cents: rate_portion(gross, rates::STATE_WITHHOLDING),
        social_security_cents: rate_portion(gross, rates::SOCIAL_SECURITY),
        medicare_cents: rate_portion(gross, rates::MEDICARE),
    };
    let net = gross - withholdings.total_cents();

    let employer_taxes = EmployerTaxes {
        social_security_cents: rate_portion(gross, rates::SOCIAL_SECURITY),
        medicare_cents: rate_portion(gross, rates::MEDICARE),
        futa_cents: rate_portion(gross, rates::FUTA),
        suta_cents: rate_portion(gross, rates::SUTA),
    };
    let employer_cost = gross + employer_taxes.total_cents();

    PayrollRecord {
        id: Uuid::new_v4(),
        employee_id: employee.id,
        period,
        regular_hours: entry.regular_hours,
        overtime_hours: entry.overtime_hours,
        regular_pay_cents: regular_pay,
        overtime_pay_cents: overtime_pay,
        tips_cents: entry.tips_cents,
        gross_cents: gross,
        withholdings,
        net_cents: net,
        employer_taxes,
        employer_cost_cents: employer_cost,
        created_at: Utc::now(),
    }
}
