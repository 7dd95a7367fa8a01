// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use cucina::application::BackOfficeService;
use cucina::domain::{PayType, Period, SaleKind};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BackOfficeService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BackOfficeService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a YYYY-MM-DD date string
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn period(from: &str, to: &str) -> Period {
    Period::custom(parse_date(from), parse_date(to)).unwrap()
}

/// Test fixture: a small restaurant's master data
pub struct Bistro;

impl Bistro {
    /// Two hourly staff and one salaried manager
    pub async fn hire_staff(service: &BackOfficeService) -> Result<()> {
        service
            .add_employee("Ana".into(), PayType::Hourly, 2000)
            .await?;
        service
            .add_employee("Ben".into(), PayType::Hourly, 1500)
            .await?;
        service
            .add_employee("Marta".into(), PayType::Salaried, 250000)
            .await?;
        Ok(())
    }

    /// Two vendors
    pub async fn add_vendors(service: &BackOfficeService) -> Result<()> {
        service.add_vendor("Fresh Farms".into()).await?;
        service.add_vendor("City Linen".into()).await?;
        Ok(())
    }

    /// Two menu items, one with a recipe cost and one without
    pub async fn add_menu(service: &BackOfficeService) -> Result<()> {
        service.add_menu_item("Margherita".into(), Some(350)).await?;
        service.add_menu_item("Daily Special".into(), None).await?;
        Ok(())
    }

    /// A March of simple trading: food sales plus an itemized pizza day,
    /// produce and rent expenses
    pub async fn trade_through_march(service: &BackOfficeService) -> Result<()> {
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
                48000,
                Some(SaleKind::Food),
                Some("Margherita"),
                Some(40),
                None,
            )
            .await?;
        service
            .record_sale(
                parse_date("2024-03-20"),
                5000,
                Some(SaleKind::Discount),
                None,
                None,
                None,
            )
            .await?;
        service
            .record_expense(
                parse_date("2024-03-08"),
                34500,
                Some("produce".into()),
                Some("Fresh Farms"),
                None,
            )
            .await?;
        service
            .record_expense(
                parse_date("2024-03-01"),
                250000,
                Some("rent".into()),
                None,
                None,
            )
            .await?;
        Ok(())
    }
}
