use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Employee, EmployeeId, EmployerTaxes, MenuItemCost, PayType, PayrollRecord, Period, SaleKind,
    TransactionRecord, TxKind, Vendor, Withholdings,
};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_PAYROLL};

/// Committing a payroll run can fail for exactly one domain reason: the
/// pay period was already run for an employee. Everything else is storage.
#[derive(Error, Debug)]
pub enum PayrollCommitError {
    #[error("payroll already committed for employee {employee_id} in period {period}")]
    Duplicate {
        employee_id: EmployeeId,
        period: Period,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The ledger store: persists and queries transaction rows, master data
/// and payroll records. Reads never mutate; reports consume snapshots
/// fetched from here.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::raw_sql(MIGRATION_002_PAYROLL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Ledger rows
    // ========================

    /// Save a new transaction row.
    pub async fn save_transaction(&self, record: &TransactionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, kind, date, amount_cents, category, sale_kind, vendor_id, menu_item_id, employee_id, quantity, amount_paid_cents, due_date, description, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.kind.as_str())
        .bind(record.date.to_string())
        .bind(record.amount_cents)
        .bind(&record.category)
        .bind(record.sale_kind.map(|k| k.as_str()))
        .bind(record.vendor_id.map(|id| id.to_string()))
        .bind(record.menu_item_id.map(|id| id.to_string()))
        .bind(record.employee_id.map(|id| id.to_string()))
        .bind(record.quantity)
        .bind(record.amount_paid_cents)
        .bind(record.due_date.map(|d| d.to_string()))
        .bind(&record.description)
        .bind(record.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// Fetch rows, optionally filtered by kind and period, ordered by date
    /// ascending. This is the read contract every report snapshot uses.
    pub async fn fetch_rows(
        &self,
        kind: Option<TxKind>,
        period: Option<&Period>,
    ) -> Result<Vec<TransactionRecord>> {
        let mut query = String::from(
            "SELECT id, kind, date, amount_cents, category, sale_kind, vendor_id, menu_item_id, employee_id, quantity, amount_paid_cents, due_date, description, recorded_at FROM transactions WHERE 1=1",
        );

        if kind.is_some() {
            query.push_str(" AND kind = ?");
        }
        if period.is_some() {
            query.push_str(" AND date >= ? AND date <= ?");
        }
        query.push_str(" ORDER BY date, recorded_at");

        let mut sql_query = sqlx::query(&query);
        if let Some(kind) = kind {
            sql_query = sql_query.bind(kind.as_str());
        }
        if let Some(period) = period {
            sql_query = sql_query
                .bind(period.start.to_string())
                .bind(period.end.to_string());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch transactions")?;

        debug!(count = rows.len(), "fetched ledger rows");
        rows.iter().map(Self::row_to_record).collect()
    }

    /// Payables not settled exactly, ordered by date ascending. Overpaid
    /// rows are included so the aging bucketer can surface them as
    /// inconsistencies instead of silently losing them.
    pub async fn fetch_open_payables(&self) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, date, amount_cents, category, sale_kind, vendor_id, menu_item_id, employee_id, quantity, amount_paid_cents, due_date, description, recorded_at
            FROM transactions
            WHERE kind = 'payable' AND amount_paid_cents <> amount_cents
            ORDER BY date, recorded_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch open payables")?;

        rows.iter().map(Self::row_to_record).collect()
    }

    // ========================
    // Master data
    // ========================

    /// Save a new employee.
    pub async fn save_employee(&self, employee: &Employee) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO employees (id, name, pay_type, pay_rate_cents, active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee.id.to_string())
        .bind(&employee.name)
        .bind(employee.pay_type.as_str())
        .bind(employee.pay_rate_cents)
        .bind(employee.active)
        .bind(employee.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save employee")?;
        Ok(())
    }

    /// Get an employee by name.
    pub async fn get_employee_by_name(&self, name: &str) -> Result<Option<Employee>> {
        let row = sqlx::query(
            "SELECT id, name, pay_type, pay_rate_cents, active, created_at FROM employees WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch employee by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_employee(&row)?)),
            None => Ok(None),
        }
    }

    /// List employees, optionally restricted to active ones.
    pub async fn list_employees(&self, active_only: bool) -> Result<Vec<Employee>> {
        let query = if active_only {
            "SELECT id, name, pay_type, pay_rate_cents, active, created_at FROM employees WHERE active = 1 ORDER BY name"
        } else {
            "SELECT id, name, pay_type, pay_rate_cents, active, created_at FROM employees ORDER BY name"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list employees")?;

        rows.iter().map(Self::row_to_employee).collect()
    }

    /// Save a new vendor.
    pub async fn save_vendor(&self, vendor: &Vendor) -> Result<()> {
        sqlx::query("INSERT INTO vendors (id, name, created_at) VALUES (?, ?, ?)")
            .bind(vendor.id.to_string())
            .bind(&vendor.name)
            .bind(vendor.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to save vendor")?;
        Ok(())
    }

    /// Get a vendor by name.
    pub async fn get_vendor_by_name(&self, name: &str) -> Result<Option<Vendor>> {
        let row = sqlx::query("SELECT id, name, created_at FROM vendors WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch vendor by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_vendor(&row)?)),
            None => Ok(None),
        }
    }

    /// List all vendors.
    pub async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM vendors ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list vendors")?;

        rows.iter().map(Self::row_to_vendor).collect()
    }

    /// Register a menu item, or update its recipe cost if it exists.
    pub async fn upsert_menu_item(&self, item: &MenuItemCost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, recipe_cost_cents)
            VALUES (?, ?, ?)
            ON CONFLICT (name) DO UPDATE SET recipe_cost_cents = excluded.recipe_cost_cents
            "#,
        )
        .bind(item.menu_item_id.to_string())
        .bind(&item.name)
        .bind(item.recipe_cost_cents)
        .execute(&self.pool)
        .await
        .context("Failed to upsert menu item")?;
        Ok(())
    }

    /// Get a menu item by name.
    pub async fn get_menu_item_by_name(&self, name: &str) -> Result<Option<MenuItemCost>> {
        let row = sqlx::query("SELECT id, name, recipe_cost_cents FROM menu_items WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch menu item by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_menu_item(&row)?)),
            None => Ok(None),
        }
    }

    /// List all menu items with their recipe costs.
    pub async fn list_menu_items(&self) -> Result<Vec<MenuItemCost>> {
        let rows = sqlx::query("SELECT id, name, recipe_cost_cents FROM menu_items ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list menu items")?;

        rows.iter().map(Self::row_to_menu_item).collect()
    }

    // ========================
    // Payroll
    // ========================

    /// Commit a payroll run atomically: every record inserts or none do.
    /// The UNIQUE (employee_id, period_start, period_end) constraint is the
    /// duplicate-run check, so the guard holds under concurrent attempts.
    /// Each committed record also emits a payroll ledger row (gross pay)
    /// that later P&L builds consume as labor cost.
    pub async fn commit_payroll_run(
        &self,
        records: &[PayrollRecord],
    ) -> Result<(), PayrollCommitError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin payroll transaction")?;

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO payroll_records (id, employee_id, period_start, period_end, regular_hours, overtime_hours, regular_pay_cents, overtime_pay_cents, tips_cents, gross_cents, federal_cents, state_cents, social_security_cents, medicare_cents, net_cents, employer_social_security_cents, employer_medicare_cents, futa_cents, suta_cents, employer_cost_cents, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.id.to_string())
            .bind(record.employee_id.to_string())
            .bind(record.period.start.to_string())
            .bind(record.period.end.to_string())
            .bind(record.regular_hours)
            .bind(record.overtime_hours)
            .bind(record.regular_pay_cents)
            .bind(record.overtime_pay_cents)
            .bind(record.tips_cents)
            .bind(record.gross_cents)
            .bind(record.withholdings.federal_cents)
            .bind(record.withholdings.state_cents)
            .bind(record.withholdings.social_security_cents)
            .bind(record.withholdings.medicare_cents)
            .bind(record.net_cents)
            .bind(record.employer_taxes.social_security_cents)
            .bind(record.employer_taxes.medicare_cents)
            .bind(record.employer_taxes.futa_cents)
            .bind(record.employer_taxes.suta_cents)
            .bind(record.employer_cost_cents)
            .bind(record.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => {}
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    // Dropping tx rolls back; no partial run survives
                    return Err(PayrollCommitError::Duplicate {
                        employee_id: record.employee_id,
                        period: record.period,
                    });
                }
                Err(err) => {
                    return Err(PayrollCommitError::Storage(
                        anyhow::Error::new(err).context("Failed to insert payroll record"),
                    ));
                }
            }

            let ledger_row = TransactionRecord::new(
                TxKind::Payroll,
                record.period.end,
                record.gross_cents,
            )
            .with_employee(record.employee_id);

            sqlx::query(
                r#"
                INSERT INTO transactions (id, kind, date, amount_cents, category, sale_kind, vendor_id, menu_item_id, employee_id, quantity, amount_paid_cents, due_date, description, recorded_at)
                VALUES (?, ?, ?, ?, NULL, NULL, NULL, NULL, ?, NULL, 0, NULL, NULL, ?)
                "#,
            )
            .bind(ledger_row.id.to_string())
            .bind(ledger_row.kind.as_str())
            .bind(ledger_row.date.to_string())
            .bind(ledger_row.amount_cents)
            .bind(record.employee_id.to_string())
            .bind(ledger_row.recorded_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                PayrollCommitError::Storage(
                    anyhow::Error::new(err).context("Failed to insert payroll ledger row"),
                )
            })?;
        }

        tx.commit()
            .await
            .context("Failed to commit payroll transaction")?;

        debug!(records = records.len(), "committed payroll run");
        Ok(())
    }

    /// List payroll records, newest first, optionally for one period.
    pub async fn list_payroll_records(
        &self,
        period: Option<&Period>,
    ) -> Result<Vec<PayrollRecord>> {
        let mut query = String::from(
            "SELECT id, employee_id, period_start, period_end, regular_hours, overtime_hours, regular_pay_cents, overtime_pay_cents, tips_cents, gross_cents, federal_cents, state_cents, social_security_cents, medicare_cents, net_cents, employer_social_security_cents, employer_medicare_cents, futa_cents, suta_cents, employer_cost_cents, created_at FROM payroll_records",
        );
        if period.is_some() {
            query.push_str(" WHERE period_start = ? AND period_end = ?");
        }
        query.push_str(" ORDER BY created_at DESC");

        let mut sql_query = sqlx::query(&query);
        if let Some(period) = period {
            sql_query = sql_query
                .bind(period.start.to_string())
                .bind(period.end.to_string());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list payroll records")?;

        rows.iter().map(Self::row_to_payroll_record).collect()
    }

    // ========================
    // Row mapping
    // ========================

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<TransactionRecord> {
        let id_str: String = row.get("id");
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");
        let sale_kind_str: Option<String> = row.get("sale_kind");
        let vendor_str: Option<String> = row.get("vendor_id");
        let menu_item_str: Option<String> = row.get("menu_item_id");
        let employee_str: Option<String> = row.get("employee_id");
        let due_date_str: Option<String> = row.get("due_date");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(TransactionRecord {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            kind: TxKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            date: parse_date(&date_str)?,
            amount_cents: row.get("amount_cents"),
            category: row.get("category"),
            sale_kind: sale_kind_str
                .map(|s| {
                    SaleKind::from_str(&s)
                        .ok_or_else(|| anyhow::anyhow!("Invalid sale kind: {}", s))
                })
                .transpose()?,
            vendor_id: parse_optional_uuid(vendor_str, "vendor_id")?,
            menu_item_id: parse_optional_uuid(menu_item_str, "menu_item_id")?,
            employee_id: parse_optional_uuid(employee_str, "employee_id")?,
            quantity: row.get("quantity"),
            amount_paid_cents: row.get("amount_paid_cents"),
            due_date: due_date_str.as_deref().map(parse_date).transpose()?,
            description: row.get("description"),
            recorded_at: parse_timestamp(&recorded_at_str)?,
        })
    }

    fn row_to_employee(row: &sqlx::sqlite::SqliteRow) -> Result<Employee> {
        let id_str: String = row.get("id");
        let pay_type_str: String = row.get("pay_type");
        let created_at_str: String = row.get("created_at");

        Ok(Employee {
            id: Uuid::parse_str(&id_str).context("Invalid employee ID")?,
            name: row.get("name"),
            pay_type: PayType::from_str(&pay_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid pay type: {}", pay_type_str))?,
            pay_rate_cents: row.get("pay_rate_cents"),
            active: row.get::<i32, _>("active") != 0,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    fn row_to_vendor(row: &sqlx::sqlite::SqliteRow) -> Result<Vendor> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Vendor {
            id: Uuid::parse_str(&id_str).context("Invalid vendor ID")?,
            name: row.get("name"),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    fn row_to_menu_item(row: &sqlx::sqlite::SqliteRow) -> Result<MenuItemCost> {
        let id_str: String = row.get("id");

        Ok(MenuItemCost {
            menu_item_id: Uuid::parse_str(&id_str).context("Invalid menu item ID")?,
            name: row.get("name"),
            recipe_cost_cents: row.get("recipe_cost_cents"),
        })
    }

    fn row_to_payroll_record(row: &sqlx::sqlite::SqliteRow) -> Result<PayrollRecord> {
        let id_str: String = row.get("id");
        let employee_str: String = row.get("employee_id");
        let start_str: String = row.get("period_start");
        let end_str: String = row.get("period_end");
        let created_at_str: String = row.get("created_at");

        Ok(PayrollRecord {
            id: Uuid::parse_str(&id_str).context("Invalid payroll record ID")?,
            employee_id: Uuid::parse_str(&employee_str).context("Invalid employee ID")?,
            period: Period {
                start: parse_date(&start_str)?,
                end: parse_date(&end_str)?,
            },
            regular_hours: row.get("regular_hours"),
            overtime_hours: row.get("overtime_hours"),
            regular_pay_cents: row.get("regular_pay_cents"),
            overtime_pay_cents: row.get("overtime_pay_cents"),
            tips_cents: row.get("tips_cents"),
            gross_cents: row.get("gross_cents"),
            withholdings: Withholdings {
                federal_cents: row.get("federal_cents"),
                state_cents: row.get("state_cents"),
                social_security_cents: row.get("social_security_cents"),
                medicare_cents: row.get("medicare_cents"),
            },
            net_cents: row.get("net_cents"),
            employer_taxes: EmployerTaxes {
                social_security_cents: row.get("employer_social_security_cents"),
                medicare_cents: row.get("employer_medicare_cents"),
                futa_cents: row.get("futa_cents"),
                suta_cents: row.get("suta_cents"),
            },
            employer_cost_cents: row.get("employer_cost_cents"),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid date")
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .context("Invalid timestamp")?
        .with_timezone(&Utc))
}

fn parse_optional_uuid(value: Option<String>, field: &str) -> Result<Option<Uuid>> {
    value
        .map(|s| Uuid::parse_str(&s))
        .transpose()
        .with_context(|| format!("Invalid {}", field))
}
