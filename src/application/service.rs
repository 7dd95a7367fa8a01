use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{
    age_open_items, aggregate, build_statement, build_tax_estimate, classify_items, compute_pay,
    irs_quarters, variance, vendors_1099, Aggregation, AgingReport, Cents, Employee, ExpenseClass,
    GroupBy, MenuItemAggregate, MenuItemCost, MenuItemId, MenuItemPerformance, PayType,
    PayrollRecord, Period, PnlInputs, PnlReport, PnlStatement, RunSummary, SaleKind, ScheduleC,
    TaxEstimate, TimesheetEntry, TransactionRecord, TxKind, Vendor, Vendor1099,
};
use crate::storage::{PayrollCommitError, Repository};

use super::AppError;

/// Application service providing the back-office operations. This is the
/// primary interface for any client (CLI, API, TUI, etc.).
pub struct BackOfficeService {
    repo: Repository,
}

/// Timesheet input keyed by employee name rather than id; the service
/// resolves names before computing pay.
#[derive(Debug, Clone)]
pub struct TimesheetRequest {
    pub employee_name: String,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub tips_cents: Cents,
}

/// Result of a committed payroll run.
#[derive(Debug, Clone)]
pub struct PayrollRunResult {
    pub summary: RunSummary,
    pub records: Vec<PayrollRecord>,
}

impl BackOfficeService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Data entry
    // ========================

    /// Record a sale. The menu item, when named, must already exist.
    pub async fn record_sale(
        &self,
        date: NaiveDate,
        amount_cents: Cents,
        sale_kind: Option<SaleKind>,
        menu_item: Option<&str>,
        quantity: Option<i64>,
        description: Option<String>,
    ) -> Result<TransactionRecord, AppError> {
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(
                "sale amount must be non-negative".into(),
            ));
        }

        let mut record = TransactionRecord::new(TxKind::Sale, date, amount_cents);
        if let Some(kind) = sale_kind {
            record = record.with_sale_kind(kind);
        }
        if let Some(name) = menu_item {
            let item = self
                .repo
                .get_menu_item_by_name(name)
                .await?
                .ok_or_else(|| AppError::MenuItemNotFound(name.to_string()))?;
            record = record.with_menu_item(item.menu_item_id, quantity.unwrap_or(1));
        }
        if let Some(desc) = description {
            record = record.with_description(desc);
        }

        self.repo.save_transaction(&record).await?;
        debug!(id = %record.id, date = %date, "recorded sale");
        Ok(record)
    }

    /// Record an expense. The vendor, when named, must already exist.
    pub async fn record_expense(
        &self,
        date: NaiveDate,
        amount_cents: Cents,
        category: Option<String>,
        vendor: Option<&str>,
        description: Option<String>,
    ) -> Result<TransactionRecord, AppError> {
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(
                "expense amount must be non-negative".into(),
            ));
        }

        let mut record = TransactionRecord::new(TxKind::Expense, date, amount_cents);
        if let Some(category) = category {
            record = record.with_category(category);
        }
        if let Some(name) = vendor {
            let vendor = self
                .repo
                .get_vendor_by_name(name)
                .await?
                .ok_or_else(|| AppError::VendorNotFound(name.to_string()))?;
            record = record.with_vendor(vendor.id);
        }
        if let Some(desc) = description {
            record = record.with_description(desc);
        }

        self.repo.save_transaction(&record).await?;
        debug!(id = %record.id, date = %date, "recorded expense");
        Ok(record)
    }

    /// Record a vendor invoice to be paid later.
    pub async fn record_payable(
        &self,
        date: NaiveDate,
        amount_cents: Cents,
        vendor: Option<&str>,
        due_date: Option<NaiveDate>,
        amount_paid_cents: Option<Cents>,
        category: Option<String>,
        description: Option<String>,
    ) -> Result<TransactionRecord, AppError> {
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(
                "payable amount must be non-negative".into(),
            ));
        }
        let paid = amount_paid_cents.unwrap_or(0);
        if paid < 0 || paid > amount_cents {
            return Err(AppError::InvalidAmount(format!(
                "amount paid {} must be between 0 and the invoice amount {}",
                paid, amount_cents
            )));
        }

        let mut record =
            TransactionRecord::new(TxKind::Payable, date, amount_cents).with_amount_paid(paid);
        if let Some(name) = vendor {
            let vendor = self
                .repo
                .get_vendor_by_name(name)
                .await?
                .ok_or_else(|| AppError::VendorNotFound(name.to_string()))?;
            record = record.with_vendor(vendor.id);
        }
        if let Some(due) = due_date {
            record = record.with_due_date(due);
        }
        if let Some(category) = category {
            record = record.with_category(category);
        }
        if let Some(desc) = description {
            record = record.with_description(desc);
        }

        self.repo.save_transaction(&record).await?;
        debug!(id = %record.id, date = %date, "recorded payable");
        Ok(record)
    }

    // ========================
    // Master data
    // ========================

    /// Add a new employee.
    pub async fn add_employee(
        &self,
        name: String,
        pay_type: PayType,
        pay_rate_cents: Cents,
    ) -> Result<Employee, AppError> {
        if self.repo.get_employee_by_name(&name).await?.is_some() {
            return Err(AppError::EmployeeAlreadyExists(name));
        }
        if pay_rate_cents < 0 {
            return Err(AppError::InvalidAmount(
                "pay rate must be non-negative".into(),
            ));
        }

        let employee = Employee::new(name, pay_type, pay_rate_cents);
        self.repo.save_employee(&employee).await?;
        info!(name = %employee.name, "added employee");
        Ok(employee)
    }

    pub async fn list_employees(&self, active_only: bool) -> Result<Vec<Employee>, AppError> {
        Ok(self.repo.list_employees(active_only).await?)
    }

    /// Add a new vendor.
    pub async fn add_vendor(&self, name: String) -> Result<Vendor, AppError> {
        if self.repo.get_vendor_by_name(&name).await?.is_some() {
            return Err(AppError::VendorAlreadyExists(name));
        }

        let vendor = Vendor::new(name);
        self.repo.save_vendor(&vendor).await?;
        info!(name = %vendor.name, "added vendor");
        Ok(vendor)
    }

    pub async fn list_vendors(&self) -> Result<Vec<Vendor>, AppError> {
        Ok(self.repo.list_vendors().await?)
    }

    /// Register a menu item, optionally with its recipe cost. Re-adding an
    /// existing item updates the cost.
    pub async fn add_menu_item(
        &self,
        name: String,
        recipe_cost_cents: Option<Cents>,
    ) -> Result<MenuItemCost, AppError> {
        let item = match self.repo.get_menu_item_by_name(&name).await? {
            Some(existing) => MenuItemCost {
                recipe_cost_cents,
                ..existing
            },
            None => MenuItemCost {
                menu_item_id: uuid::Uuid::new_v4(),
                name,
                recipe_cost_cents,
            },
        };
        self.repo.upsert_menu_item(&item).await?;
        Ok(item)
    }

    /// Set the recipe cost on an existing menu item.
    pub async fn set_recipe_cost(
        &self,
        name: &str,
        recipe_cost_cents: Cents,
    ) -> Result<MenuItemCost, AppError> {
        let existing = self
            .repo
            .get_menu_item_by_name(name)
            .await?
            .ok_or_else(|| AppError::MenuItemNotFound(name.to_string()))?;
        let item = MenuItemCost {
            recipe_cost_cents: Some(recipe_cost_cents),
            ..existing
        };
        self.repo.upsert_menu_item(&item).await?;
        Ok(item)
    }

    pub async fn list_menu_items(&self) -> Result<Vec<MenuItemCost>, AppError> {
        Ok(self.repo.list_menu_items().await?)
    }

    // ========================
    // Reports
    // ========================

    /// Build a P&L statement for the period, optionally with a variance
    /// against the immediately preceding period of equal length.
    pub async fn pnl_report(&self, period: Period, compare: bool) -> Result<PnlReport, AppError> {
        let current = self.build_pnl(period).await?;
        for warning in &current.warnings {
            warn!("{}", warning);
        }

        if !compare {
            return Ok(PnlReport {
                current,
                previous: None,
                variance: None,
            });
        }

        let previous = self.build_pnl(period.comparison()).await?;
        let delta = variance(&current, &previous);
        Ok(PnlReport {
            current,
            previous: Some(previous),
            variance: Some(delta),
        })
    }

    async fn build_pnl(&self, period: Period) -> Result<PnlStatement, AppError> {
        let sales = self.repo.fetch_rows(Some(TxKind::Sale), Some(&period)).await?;
        let expenses = self
            .repo
            .fetch_rows(Some(TxKind::Expense), Some(&period))
            .await?;
        let payroll = self
            .repo
            .fetch_rows(Some(TxKind::Payroll), Some(&period))
            .await?;
        let recipe_costs = self.recipe_cost_index().await?;

        Ok(build_statement(
            period,
            &PnlInputs {
                sales: &sales,
                expenses: &expenses,
                payroll: &payroll,
                recipe_costs: &recipe_costs,
            },
        ))
    }

    /// Accounts-payable aging as of `today`, over all open invoices.
    pub async fn aging_report(&self, today: NaiveDate) -> Result<AgingReport, AppError> {
        let open = self.repo.fetch_open_payables().await?;
        Ok(age_open_items(&open, today)?)
    }

    /// Group rows of one kind along a dimension for the period.
    pub async fn breakdown(
        &self,
        kind: Option<TxKind>,
        period: Period,
        group_by: GroupBy,
    ) -> Result<Aggregation, AppError> {
        let rows = self.repo.fetch_rows(kind, Some(&period)).await?;
        Ok(aggregate(&rows, group_by))
    }

    /// Menu-engineering classification over the period's item sales.
    /// Period labor cost is allocated to items by revenue share.
    pub async fn menu_engineering(
        &self,
        period: Period,
    ) -> Result<Vec<MenuItemPerformance>, AppError> {
        let sales = self.repo.fetch_rows(Some(TxKind::Sale), Some(&period)).await?;
        let recipe_costs = self.recipe_cost_index().await?;

        struct Acc {
            name: String,
            quantity: i64,
            revenue: Cents,
            food_cost: Cents,
        }

        let mut by_item: HashMap<MenuItemId, Acc> = HashMap::new();
        for sale in &sales {
            if sale.sale_kind.is_some_and(|k| k.is_deduction()) {
                continue;
            }
            let Some(item_id) = sale.menu_item_id else {
                continue;
            };
            let quantity = sale.quantity.unwrap_or(1);
            let entry = by_item.entry(item_id).or_insert_with(|| Acc {
                name: recipe_costs
                    .get(&item_id)
                    .map(|i| i.name.clone())
                    .unwrap_or_else(|| item_id.to_string()),
                quantity: 0,
                revenue: 0,
                food_cost: 0,
            });
            entry.quantity += quantity;
            entry.revenue += sale.amount_cents;
            let unit_cost = recipe_costs
                .get(&item_id)
                .and_then(|i| i.recipe_cost_cents)
                .unwrap_or(0);
            entry.food_cost += unit_cost * quantity;
        }

        let labor_total = self.period_labor_cost(&period).await?;
        let revenue_total: Cents = by_item.values().map(|a| a.revenue).sum();

        let mut aggregates: Vec<MenuItemAggregate> = by_item
            .into_iter()
            .map(|(item_id, acc)| {
                let labor = if revenue_total == 0 {
                    0
                } else {
                    (labor_total as f64 * acc.revenue as f64 / revenue_total as f64).round()
                        as Cents
                };
                MenuItemAggregate {
                    item_id,
                    name: acc.name,
                    quantity_sold: acc.quantity,
                    revenue_cents: acc.revenue,
                    food_cost_cents: acc.food_cost,
                    labor_cost_cents: labor,
                }
            })
            .collect();
        aggregates.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(classify_items(&aggregates))
    }

    async fn period_labor_cost(&self, period: &Period) -> Result<Cents, AppError> {
        let payroll = self
            .repo
            .fetch_rows(Some(TxKind::Payroll), Some(period))
            .await?;
        let expenses = self
            .repo
            .fetch_rows(Some(TxKind::Expense), Some(period))
            .await?;

        let labor_expenses: Cents = expenses
            .iter()
            .filter(|e| {
                e.category
                    .as_deref()
                    .map(ExpenseClass::from_category)
                    .is_some_and(|c| c == ExpenseClass::Labor)
            })
            .map(|e| e.amount_cents)
            .sum();
        let payroll_total: Cents = payroll.iter().map(|r| r.amount_cents).sum();
        Ok(payroll_total + labor_expenses)
    }

    async fn recipe_cost_index(&self) -> Result<HashMap<MenuItemId, MenuItemCost>, AppError> {
        let items = self.repo.list_menu_items().await?;
        Ok(items.into_iter().map(|i| (i.menu_item_id, i)).collect())
    }

    // ========================
    // Payroll
    // ========================

    /// Compute and commit a payroll run for the period. The run is atomic:
    /// a duplicate period for any employee rejects the whole run and leaves
    /// no records behind. Each committed record also lands in the ledger as
    /// a payroll row at gross pay.
    pub async fn run_payroll(
        &self,
        period: Period,
        entries: Vec<TimesheetRequest>,
    ) -> Result<PayrollRunResult, AppError> {
        if entries.is_empty() {
            return Err(AppError::InvalidRecord("no timesheet entries given".into()));
        }

        let mut records = Vec::with_capacity(entries.len());
        for request in &entries {
            if request.regular_hours < 0.0
                || request.overtime_hours < 0.0
                || request.tips_cents < 0
            {
                return Err(AppError::InvalidRecord(format!(
                    "negative hours or tips for '{}'",
                    request.employee_name
                )));
            }

            let employee = self
                .repo
                .get_employee_by_name(&request.employee_name)
                .await?
                .ok_or_else(|| AppError::EmployeeNotFound(request.employee_name.clone()))?;

            let entry = TimesheetEntry {
                employee_id: employee.id,
                regular_hours: request.regular_hours,
                overtime_hours: request.overtime_hours,
                tips_cents: request.tips_cents,
            };
            records.push(compute_pay(&employee, &entry, period));
        }

        self.repo
            .commit_payroll_run(&records)
            .await
            .map_err(|err| match err {
                PayrollCommitError::Duplicate {
                    employee_id,
                    period,
                } => AppError::DuplicatePayrollPeriod {
                    employee_id,
                    period,
                },
                PayrollCommitError::Storage(err) => AppError::Database(err),
            })?;

        let summary = RunSummary::from_records(&records);
        info!(
            employees = summary.employees_processed,
            period = %period,
            "payroll run committed"
        );
        Ok(PayrollRunResult { summary, records })
    }

    /// List committed payroll records, optionally for one period.
    pub async fn list_payroll_records(
        &self,
        period: Option<Period>,
    ) -> Result<Vec<PayrollRecord>, AppError> {
        Ok(self.repo.list_payroll_records(period.as_ref()).await?)
    }

    // ========================
    // Taxes
    // ========================

    /// Schedule-C-shaped summary plus quarterly estimated-tax projections
    /// for the year. A planning estimate, not a filing.
    pub async fn tax_estimate(
        &self,
        year: i32,
        home_office_cents: Cents,
    ) -> Result<TaxEstimate, AppError> {
        let (sales, expenses, payroll) = self.year_rows(year).await?;
        Ok(build_tax_estimate(
            year,
            &sales,
            &expenses,
            &payroll,
            home_office_cents,
        ))
    }

    /// Just the Schedule C portion of the year estimate.
    pub async fn schedule_c(
        &self,
        year: i32,
        home_office_cents: Cents,
    ) -> Result<ScheduleC, AppError> {
        Ok(self.tax_estimate(year, home_office_cents).await?.schedule_c)
    }

    /// Vendors paid at or above the 1099-NEC threshold during the year.
    pub async fn vendors_1099(&self, year: i32) -> Result<Vec<Vendor1099>, AppError> {
        let year_period = year_span(year);
        let expenses = self
            .repo
            .fetch_rows(Some(TxKind::Expense), Some(&year_period))
            .await?;
        let vendors = self.repo.list_vendors().await?;
        Ok(vendors_1099(&expenses, &vendors))
    }

    async fn year_rows(
        &self,
        year: i32,
    ) -> Result<
        (
            Vec<TransactionRecord>,
            Vec<TransactionRecord>,
            Vec<TransactionRecord>,
        ),
        AppError,
    > {
        let span = year_span(year);
        let sales = self.repo.fetch_rows(Some(TxKind::Sale), Some(&span)).await?;
        let expenses = self
            .repo
            .fetch_rows(Some(TxKind::Expense), Some(&span))
            .await?;
        let payroll = self
            .repo
            .fetch_rows(Some(TxKind::Payroll), Some(&span))
            .await?;
        Ok((sales, expenses, payroll))
    }
}

fn year_span(year: i32) -> Period {
    let quarters = irs_quarters(year);
    Period {
        start: quarters[0].start,
        end: quarters[3].end,
    }
}
