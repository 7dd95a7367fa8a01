mod common;

use anyhow::Result;
use common::{period, test_service, Bistro};
use cucina::application::{AppError, TimesheetRequest};

fn entry(name: &str, regular: f64, overtime: f64, tips: i64) -> TimesheetRequest {
    TimesheetRequest {
        employee_name: name.into(),
        regular_hours: regular,
        overtime_hours: overtime,
        tips_cents: tips,
    }
}

#[tokio::test]
async fn test_payroll_run_computes_and_commits() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    let result = service
        .run_payroll(
            period("2024-03-01", "2024-03-15"),
            vec![
                entry("Ana", 40.0, 5.0, 0),     // 800.00 + 150.00 OT
                entry("Marta", 80.0, 0.0, 0),   // salaried: 2500.00 flat
            ],
        )
        .await?;

    assert_eq!(result.summary.employees_processed, 2);
    assert_eq!(result.summary.total_gross_cents, 95000 + 250000);

    let ana = &result.records[0];
    assert_eq!(ana.gross_cents, 95000);
    assert_eq!(
        ana.net_cents,
        ana.gross_cents - ana.withholdings.total_cents()
    );
    assert_eq!(
        ana.employer_cost_cents,
        ana.gross_cents + ana.employer_taxes.total_cents()
    );

    let marta = &result.records[1];
    assert_eq!(marta.gross_cents, 250000);
    assert_eq!(marta.overtime_pay_cents, 0);

    let stored = service
        .list_payroll_records(Some(period("2024-03-01", "2024-03-15")))
        .await?;
    assert_eq!(stored.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_period_rejects_the_whole_run() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    let pay_period = period("2024-03-01", "2024-03-15");
    service
        .run_payroll(pay_period, vec![entry("Ana", 40.0, 0.0, 0)])
        .await?;

    // Ben is new to this period but Ana already ran; nothing may commit
    let err = service
        .run_payroll(
            pay_period,
            vec![entry("Ben", 30.0, 0.0, 0), entry("Ana", 40.0, 0.0, 0)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicatePayrollPeriod { .. }));

    let stored = service.list_payroll_records(Some(pay_period)).await?;
    assert_eq!(stored.len(), 1, "no partial records from the rejected run");

    Ok(())
}

#[tokio::test]
async fn test_same_employee_different_period_is_fine() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    service
        .run_payroll(period("2024-03-01", "2024-03-15"), vec![entry("Ana", 40.0, 0.0, 0)])
        .await?;
    service
        .run_payroll(period("2024-03-16", "2024-03-31"), vec![entry("Ana", 38.0, 0.0, 0)])
        .await?;

    let stored = service.list_payroll_records(None).await?;
    assert_eq!(stored.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_unknown_employee_fails_before_committing() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    let err = service
        .run_payroll(
            period("2024-03-01", "2024-03-15"),
            vec![entry("Ana", 40.0, 0.0, 0), entry("Nobody", 10.0, 0.0, 0)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmployeeNotFound(_)));

    let stored = service.list_payroll_records(None).await?;
    assert!(stored.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_negative_hours_are_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    let err = service
        .run_payroll(
            period("2024-03-01", "2024-03-15"),
            vec![entry("Ana", -1.0, 0.0, 0)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRecord(_)));

    Ok(())
}

#[tokio::test]
async fn test_tips_are_withheld_against() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    let result = service
        .run_payroll(
            period("2024-03-01", "2024-03-15"),
            vec![entry("Ben", 20.0, 0.0, 10000)],
        )
        .await?;

    let record = &result.records[0];
    // 20h at 15.00 plus 100.00 tips
    assert_eq!(record.gross_cents, 30000 + 10000);
    assert!(record.withholdings.total_cents() > 0);
    assert!(record.net_cents < record.gross_cents);

    Ok(())
}
