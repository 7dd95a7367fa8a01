mod common;

use anyhow::Result;
use common::{parse_date, period, test_service, Bistro};
use cucina::application::{BackOfficeService, TimesheetRequest};
use cucina::domain::SaleKind;

#[tokio::test]
async fn test_pnl_statement_over_recorded_month() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::add_vendors(&service).await?;
    Bistro::add_menu(&service).await?;
    Bistro::trade_through_march(&service).await?;

    let report = service
        .pnl_report(period("2024-03-01", "2024-03-31"), false)
        .await?;
    let stmt = &report.current;

    // gross 1480.00, discounts 50.00
    assert_eq!(stmt.revenue.food_cents, 148000);
    assert_eq!(stmt.revenue.discounts_cents, 5000);
    assert_eq!(stmt.net_revenue.amount_cents, 143000);

    // purchases 345.00 plus 40 pizzas at 3.50 recipe cost
    assert_eq!(stmt.cogs_breakdown.purchases_cents, 34500);
    assert_eq!(stmt.cogs_breakdown.calculated_food_cost_cents, 14000);
    assert_eq!(stmt.cogs.amount_cents, 48500);

    assert_eq!(stmt.gross_profit.amount_cents, 143000 - 48500);
    assert_eq!(stmt.operating.amount_cents, 250000);
    assert_eq!(
        stmt.net_income.amount_cents,
        stmt.gross_profit.amount_cents - stmt.labor.amount_cents - 250000
    );
    assert!(stmt.warnings.is_empty());
    assert!(report.previous.is_none());
    assert!(report.variance.is_none());

    Ok(())
}

#[tokio::test]
async fn test_pnl_only_sees_rows_inside_the_period() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_sale(
            parse_date("2024-02-28"),
            99999,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;
    service
        .record_sale(
            parse_date("2024-03-01"),
            10000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;

    let report = service
        .pnl_report(period("2024-03-01", "2024-03-31"), false)
        .await?;
    assert_eq!(report.current.net_revenue.amount_cents, 10000);

    Ok(())
}

#[tokio::test]
async fn test_pnl_comparison_and_variance() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // prior week: 1000.00; current week: 1500.00 => +50%
    service
        .record_sale(
            parse_date("2024-03-05"),
            100000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;
    service
        .record_sale(
            parse_date("2024-03-12"),
            150000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;

    let report = service
        .pnl_report(period("2024-03-11", "2024-03-17"), true)
        .await?;

    let previous = report.previous.expect("comparison statement");
    assert_eq!(previous.period.start, parse_date("2024-03-04"));
    assert_eq!(previous.period.end, parse_date("2024-03-10"));
    assert_eq!(previous.net_revenue.amount_cents, 100000);

    let variance = report.variance.expect("variance");
    assert!((variance.net_revenue - 50.0).abs() < 1e-9);

    Ok(())
}

#[tokio::test]
async fn test_pnl_variance_against_empty_prior_period_is_zero() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_sale(
            parse_date("2024-03-12"),
            150000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;

    let report = service
        .pnl_report(period("2024-03-11", "2024-03-17"), true)
        .await?;
    let variance = report.variance.expect("variance");
    assert_eq!(variance.net_revenue, 0.0);
    assert_eq!(variance.net_income, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_committed_payroll_shows_up_as_labor() -> Result<()> {
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

    let report = service
        .pnl_report(period("2024-03-01", "2024-03-31"), false)
        .await?;
    // Ana: 40h at 20.00 gross
    assert_eq!(report.current.labor.amount_cents, 80000);
    assert_eq!(
        report.current.prime_cost.amount_cents,
        report.current.cogs.amount_cents + 80000
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_recipe_cost_warns_but_completes() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::add_menu(&service).await?;

    // "Daily Special" has no recorded recipe cost
    service
        .record_sale(
            parse_date("2024-03-10"),
            20000,
            Some(SaleKind::Food),
            Some("Daily Special"),
            Some(10),
            None,
        )
        .await?;

    let report = service
        .pnl_report(period("2024-03-01", "2024-03-31"), false)
        .await?;
    let stmt = &report.current;
    assert_eq!(stmt.cogs_breakdown.calculated_food_cost_cents, 0);
    assert_eq!(stmt.warnings.len(), 1);
    assert!(stmt.warnings[0].contains("Daily Special"));
    assert_eq!(stmt.net_revenue.amount_cents, 20000);

    Ok(())
}

async fn net_income(service: &BackOfficeService) -> Result<i64> {
    let report = service
        .pnl_report(period("2024-03-01", "2024-03-31"), false)
        .await?;
    Ok(report.current.net_income.amount_cents)
}

#[tokio::test]
async fn test_rebuilding_the_statement_is_deterministic() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::add_vendors(&service).await?;
    Bistro::add_menu(&service).await?;
    Bistro::trade_through_march(&service).await?;

    let first = net_income(&service).await?;
    let second = net_income(&service).await?;
    assert_eq!(first, second);

    Ok(())
}
