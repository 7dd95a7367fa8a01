mod common;

use anyhow::Result;
use common::{parse_date, period, test_service, Bistro};
use cucina::application::AppError;
use cucina::domain::{GroupBy, PayType, SaleKind, TxKind, UNCLASSIFIED_KEY};

#[tokio::test]
async fn test_expense_breakdown_by_category() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Bistro::add_vendors(&service).await?;
    Bistro::add_menu(&service).await?;
    Bistro::trade_through_march(&service).await?;

    let agg = service
        .breakdown(
            Some(TxKind::Expense),
            period("2024-03-01", "2024-03-31"),
            GroupBy::Category,
        )
        .await?;

    assert_eq!(agg.grand_total_cents, 34500 + 250000);
    assert_eq!(agg.buckets[0].key, "rent");
    assert_eq!(agg.bucket("produce").map(|b| b.total_cents), Some(34500));

    let bucket_sum: i64 = agg.buckets.iter().map(|b| b.total_cents).sum();
    assert_eq!(bucket_sum, agg.grand_total_cents);

    Ok(())
}

#[tokio::test]
async fn test_sales_breakdown_by_sale_kind_keeps_untyped_rows() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_sale(
            parse_date("2024-03-05"),
            10000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;
    service
        .record_sale(parse_date("2024-03-06"), 500, None, None, None, None)
        .await?;

    let agg = service
        .breakdown(
            Some(TxKind::Sale),
            period("2024-03-01", "2024-03-31"),
            GroupBy::SaleKind,
        )
        .await?;

    assert_eq!(agg.grand_total_cents, 10500);
    assert_eq!(
        agg.bucket(UNCLASSIFIED_KEY).map(|b| b.total_cents),
        Some(500)
    );

    Ok(())
}

#[tokio::test]
async fn test_breakdown_over_all_kinds() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_sale(
            parse_date("2024-03-05"),
            10000,
            Some(SaleKind::Food),
            None,
            None,
            None,
        )
        .await?;
    service
        .record_expense(parse_date("2024-03-06"), 4000, Some("rent".into()), None, None)
        .await?;

    let agg = service
        .breakdown(None, period("2024-03-01", "2024-03-31"), GroupBy::Kind)
        .await?;

    assert_eq!(agg.bucket("sale").map(|b| b.total_cents), Some(10000));
    assert_eq!(agg.bucket("expense").map(|b| b.total_cents), Some(4000));

    Ok(())
}

#[tokio::test]
async fn test_master_data_uniqueness() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.add_vendor("Fresh Farms".into()).await?;
    let err = service.add_vendor("Fresh Farms".into()).await.unwrap_err();
    assert!(matches!(err, AppError::VendorAlreadyExists(_)));

    service
        .add_employee("Ana".into(), PayType::Hourly, 2000)
        .await?;
    let err = service
        .add_employee("Ana".into(), PayType::Salaried, 100000)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmployeeAlreadyExists(_)));

    Ok(())
}

#[tokio::test]
async fn test_recording_against_unknown_references_fails() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .record_expense(
            parse_date("2024-03-01"),
            1000,
            None,
            Some("Nobody Inc"),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::VendorNotFound(_)));

    let err = service
        .record_sale(
            parse_date("2024-03-01"),
            1000,
            Some(SaleKind::Food),
            Some("Ghost Dish"),
            Some(1),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MenuItemNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_set_recipe_cost_updates_existing_item() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.add_menu_item("Margherita".into(), None).await?;
    service.set_recipe_cost("Margherita", 375).await?;

    let items = service.list_menu_items().await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].recipe_cost_cents, Some(375));

    let err = service.set_recipe_cost("Ghost Dish", 100).await.unwrap_err();
    assert!(matches!(err, AppError::MenuItemNotFound(_)));

    Ok(())
}
