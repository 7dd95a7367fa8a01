mod common;

use anyhow::Result;
use common::{parse_date, period, test_service, Bistro};
use cucina::application::TimesheetRequest;
use cucina::domain::{SaleKind, FORM_1099_THRESHOLD_CENTS};

#[tokio::test]
async fn test_schedule_c_from_recorded_year() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::add_vendors(&service).await?;

    service
        .record_sale(
            parse_date("2024-02-01"),
            500000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;
    service
        .record_sale(
            parse_date("2024-02-15"),
            10000,
            Some(SaleKind::Refund),
            None,
            None,
            None,
        )
        .await?;
    service
        .record_expense(
            parse_date("2024-02-10"),
            120000,
            Some("produce".into()),
            Some("Fresh Farms"),
            None,
        )
        .await?;
    service
        .record_expense(parse_date("2024-03-01"), 80000, Some("rent".into()), None, None)
        .await?;

    let sc = service.schedule_c(2024, 2500).await?;

    assert_eq!(sc.gross_receipts_cents, 500000);
    assert_eq!(sc.returns_cents, 10000);
    assert_eq!(sc.cogs_cents, 120000);
    assert_eq!(sc.gross_income_cents, 370000);

    let rent = sc.expense_lines.iter().find(|l| l.line == "20b").unwrap();
    assert_eq!(rent.amount_cents, 80000);

    assert_eq!(sc.total_expenses_cents, 80000);
    assert_eq!(sc.home_office_cents, 2500);
    assert_eq!(sc.net_profit_cents, 370000 - 80000 - 2500);

    Ok(())
}

#[tokio::test]
async fn test_committed_payroll_lands_on_the_wages_line() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::hire_staff(&service).await?;

    service
        .run_payroll(
            period("2024-03-01", "2024-03-15"),
            vec![TimesheetRequest {
                employee_name: "Ana".into(),
                regular_hours: 40.0,
                overtime_hours: 0.0,
                tips_cents: 0,
            }],
        )
        .await?;

    let sc = service.schedule_c(2024, 0).await?;
    let wages = sc.expense_lines.iter().find(|l| l.line == "26").unwrap();
    assert_eq!(wages.amount_cents, 80000);

    Ok(())
}

#[tokio::test]
async fn test_quarterly_estimates_use_irs_quarters() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // May activity lands in the Apr-May quarter, not a calendar Q2
    service
        .record_sale(
            parse_date("2024-05-20"),
            1000000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;

    let estimate = service.tax_estimate(2024, 0).await?;
    assert_eq!(estimate.quarterly.len(), 4);

    let q2 = &estimate.quarterly[1];
    assert_eq!(q2.period.start, parse_date("2024-04-01"));
    assert_eq!(q2.period.end, parse_date("2024-05-31"));
    assert_eq!(q2.net_income_cents, 1000000);
    assert!(q2.estimated_payment_cents > 0);

    for q in [&estimate.quarterly[0], &estimate.quarterly[2], &estimate.quarterly[3]] {
        assert_eq!(q.estimated_payment_cents, 0);
    }

    Ok(())
}

#[tokio::test]
async fn test_loss_year_projects_no_payments() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_expense(parse_date("2024-02-01"), 500000, Some("rent".into()), None, None)
        .await?;

    let estimate = service.tax_estimate(2024, 0).await?;
    assert!(estimate.quarterly[0].net_income_cents < 0);
    assert_eq!(estimate.annual_total_cents, 0);

    Ok(())
}

#[tokio::test]
async fn test_vendors_1099_threshold_over_the_year() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::add_vendors(&service).await?;

    // Fresh Farms crosses the threshold across two invoices; City Linen stays under
    service
        .record_expense(
            parse_date("2024-02-01"),
            FORM_1099_THRESHOLD_CENTS - 1,
            Some("produce".into()),
            Some("Fresh Farms"),
            None,
        )
        .await?;
    service
        .record_expense(
            parse_date("2024-09-01"),
            1,
            Some("produce".into()),
            Some("Fresh Farms"),
            None,
        )
        .await?;
    service
        .record_expense(
            parse_date("2024-03-01"),
            FORM_1099_THRESHOLD_CENTS - 1,
            Some("supplies".into()),
            Some("City Linen"),
            None,
        )
        .await?;
    // Payments outside the year never count
    service
        .record_expense(
            parse_date("2023-12-31"),
            FORM_1099_THRESHOLD_CENTS,
            Some("supplies".into()),
            Some("City Linen"),
            None,
        )
        .await?;

    let flagged = service.vendors_1099(2024).await?;
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].name, "Fresh Farms");
    assert_eq!(flagged[0].total_paid_cents, FORM_1099_THRESHOLD_CENTS);

    Ok(())
}
