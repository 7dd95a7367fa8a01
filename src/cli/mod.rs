use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::{BackOfficeService, TimesheetRequest};
use crate::domain::{
    format_cents, parse_cents, AgingBucket, GroupBy, PayType, Period, PeriodKind, PnlLine,
    SaleKind,
};

/// Cucina - Restaurant Back-Office Analytics
#[derive(Parser)]
#[command(name = "cucina")]
#[command(about = "Financial analytics for a restaurant back office: P&L, AP aging, menu engineering, payroll and tax estimates")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "cucina.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record ledger rows
    #[command(subcommand)]
    Record(RecordCommands),

    /// Employee management commands
    #[command(subcommand)]
    Employee(EmployeeCommands),

    /// Vendor management commands
    #[command(subcommand)]
    Vendor(VendorCommands),

    /// Menu item management commands
    #[command(subcommand)]
    MenuItem(MenuItemCommands),

    /// Profit and loss statement
    Pnl {
        /// Named period: today, week, month, quarter, year, ytd
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Custom period start (YYYY-MM-DD, with --to)
        #[arg(long)]
        from: Option<String>,

        /// Custom period end (YYYY-MM-DD, with --from)
        #[arg(long)]
        to: Option<String>,

        /// Compare against the immediately preceding period of equal length
        #[arg(short, long)]
        compare: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Accounts-payable aging report
    Aging {
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Menu engineering quadrants
    Menu {
        /// Named period: today, week, month, quarter, year, ytd
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Custom period start (YYYY-MM-DD, with --to)
        #[arg(long)]
        from: Option<String>,

        /// Custom period end (YYYY-MM-DD, with --from)
        #[arg(long)]
        to: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Group ledger rows along a dimension
    Breakdown {
        /// Row kind: sale, expense, payable, receivable, payroll, bank (omit for all)
        #[arg(short, long)]
        kind: Option<String>,

        /// Dimension: category, kind, salekind, vendor, menuitem, date
        #[arg(short, long, default_value = "category")]
        by: String,

        /// Named period: today, week, month, quarter, year, ytd
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Custom period start (YYYY-MM-DD, with --to)
        #[arg(long)]
        from: Option<String>,

        /// Custom period end (YYYY-MM-DD, with --from)
        #[arg(long)]
        to: Option<String>,
    },

    /// Payroll commands
    #[command(subcommand)]
    Payroll(PayrollCommands),

    /// Schedule C summary and quarterly estimated-tax projections
    Taxes {
        /// Tax year
        year: i32,

        /// Annual home-office deduction (e.g. "1500.00")
        #[arg(long, default_value = "0")]
        home_office: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Vendors requiring a 1099-NEC for the year
    #[command(name = "vendors-1099")]
    Vendors1099 {
        /// Tax year
        year: i32,
    },
}

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Record a sale
    Sale {
        /// Business date (YYYY-MM-DD)
        date: String,

        /// Amount (e.g. "125.50")
        amount: String,

        /// Revenue sub-type: food, beverage, alcohol, catering, discount, comp, refund
        #[arg(short, long)]
        kind: Option<String>,

        /// Menu item name (must exist)
        #[arg(short, long)]
        item: Option<String>,

        /// Units sold (with --item, defaults to 1)
        #[arg(short, long)]
        quantity: Option<i64>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Record an expense
    Expense {
        /// Business date (YYYY-MM-DD)
        date: String,

        /// Amount (e.g. "80.00")
        amount: String,

        /// Expense category (e.g. "produce", "rent")
        #[arg(short, long)]
        category: Option<String>,

        /// Vendor name (must exist)
        #[arg(short, long)]
        vendor: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Record a vendor invoice to be paid later
    Payable {
        /// Invoice date (YYYY-MM-DD)
        date: String,

        /// Invoice amount (e.g. "500.00")
        amount: String,

        /// Vendor name (must exist)
        #[arg(short, long)]
        vendor: Option<String>,

        /// Due date (YYYY-MM-DD, defaults to the invoice date)
        #[arg(long)]
        due: Option<String>,

        /// Amount already paid
        #[arg(long)]
        paid: Option<String>,

        /// Expense category
        #[arg(short, long)]
        category: Option<String>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// Add a new employee
    Add {
        /// Employee name (must be unique)
        name: String,

        /// Pay type: hourly, salaried
        #[arg(short = 't', long = "type")]
        pay_type: String,

        /// Hourly rate, or per-period pay for salaried staff (e.g. "18.50")
        #[arg(short, long)]
        rate: String,
    },

    /// List employees
    List {
        /// Include inactive employees
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum VendorCommands {
    /// Add a new vendor
    Add {
        /// Vendor name (must be unique)
        name: String,
    },

    /// List all vendors
    List,
}

#[derive(Subcommand)]
pub enum MenuItemCommands {
    /// Register a menu item
    Add {
        /// Item name (must be unique)
        name: String,

        /// Per-unit recipe cost (e.g. "3.50")
        #[arg(short, long)]
        cost: Option<String>,
    },

    /// Set the recipe cost on an existing item
    SetCost {
        /// Item name
        name: String,

        /// Per-unit recipe cost (e.g. "3.50")
        cost: String,
    },

    /// List all menu items with recipe costs
    List,
}

#[derive(Subcommand)]
pub enum PayrollCommands {
    /// Compute and commit a payroll run
    Run {
        /// Pay period start (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Pay period end (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Timesheet entry NAME:REGULAR:OVERTIME:TIPS (repeatable)
        #[arg(short, long = "entry")]
        entries: Vec<String>,
    },

    /// List committed payroll records
    List {
        /// Pay period start (YYYY-MM-DD, with --end)
        #[arg(long)]
        start: Option<String>,

        /// Pay period end (YYYY-MM-DD, with --start)
        #[arg(long)]
        end: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                BackOfficeService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Record(record_cmd) => {
                let service = BackOfficeService::connect(&self.database).await?;
                run_record_command(&service, record_cmd).await?;
            }

            Commands::Employee(employee_cmd) => {
                let service = BackOfficeService::connect(&self.database).await?;
                run_employee_command(&service, employee_cmd).await?;
            }

            Commands::Vendor(vendor_cmd) => {
                let service = BackOfficeService::connect(&self.database).await?;
                run_vendor_command(&service, vendor_cmd).await?;
            }

            Commands::MenuItem(item_cmd) => {
                let service = BackOfficeService::connect(&self.database).await?;
                run_menu_item_command(&service, item_cmd).await?;
            }

            Commands::Pnl {
                period,
                from,
                to,
                compare,
                json,
            } => {
                let service = BackOfficeService::connect(&self.database).await?;
                let period = resolve_period(&period, from, to)?;
                run_pnl_command(&service, period, compare, json).await?;
            }

            Commands::Aging { as_of, json } => {
                let service = BackOfficeService::connect(&self.database).await?;
                let today = match as_of {
                    Some(s) => parse_date(&s)?,
                    None => Utc::now().date_naive(),
                };
                run_aging_command(&service, today, json).await?;
            }

            Commands::Menu {
                period,
                from,
                to,
                json,
            } => {
                let service = BackOfficeService::connect(&self.database).await?;
                let period = resolve_period(&period, from, to)?;
                run_menu_command(&service, period, json).await?;
            }

            Commands::Breakdown {
                kind,
                by,
                period,
                from,
                to,
            } => {
                let service = BackOfficeService::connect(&self.database).await?;
                let period = resolve_period(&period, from, to)?;
                run_breakdown_command(&service, kind.as_deref(), &by, period).await?;
            }

            Commands::Payroll(payroll_cmd) => {
                let service = BackOfficeService::connect(&self.database).await?;
                run_payroll_command(&service, payroll_cmd).await?;
            }

            Commands::Taxes {
                year,
                home_office,
                json,
            } => {
                let service = BackOfficeService::connect(&self.database).await?;
                let home_office_cents = parse_cents(&home_office)
                    .context("Invalid home-office amount. Use '1500.00' or '1500'")?;
                run_taxes_command(&service, year, home_office_cents, json).await?;
            }

            Commands::Vendors1099 { year } => {
                let service = BackOfficeService::connect(&self.database).await?;
                run_vendors_1099_command(&service, year).await?;
            }
        }

        Ok(())
    }
}

async fn run_record_command(service: &BackOfficeService, cmd: RecordCommands) -> Result<()> {
    match cmd {
        RecordCommands::Sale {
            date,
            amount,
            kind,
            item,
            quantity,
            description,
        } => {
            let date = parse_date(&date)?;
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '125.50' or '125'")?;
            let sale_kind = kind
                .map(|k| {
                    SaleKind::from_str(&k).ok_or_else(|| {
                        anyhow::anyhow!(
                            "Invalid sale kind '{}'. Valid: food, beverage, alcohol, catering, discount, comp, refund",
                            k
                        )
                    })
                })
                .transpose()?;

            let record = service
                .record_sale(
                    date,
                    amount_cents,
                    sale_kind,
                    item.as_deref(),
                    quantity,
                    description,
                )
                .await?;
            println!(
                "Recorded sale: {} on {} ({})",
                format_cents(record.amount_cents),
                record.date,
                record.id
            );
        }

        RecordCommands::Expense {
            date,
            amount,
            category,
            vendor,
            description,
        } => {
            let date = parse_date(&date)?;
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '80.00' or '80'")?;

            let record = service
                .record_expense(date, amount_cents, category, vendor.as_deref(), description)
                .await?;
            println!(
                "Recorded expense: {} on {} ({})",
                format_cents(record.amount_cents),
                record.date,
                record.id
            );
        }

        RecordCommands::Payable {
            date,
            amount,
            vendor,
            due,
            paid,
            category,
            description,
        } => {
            let date = parse_date(&date)?;
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '500.00' or '500'")?;
            let due_date = due.as_deref().map(parse_date).transpose()?;
            let paid_cents = paid
                .map(|p| parse_cents(&p))
                .transpose()
                .context("Invalid paid amount format")?;

            let record = service
                .record_payable(
                    date,
                    amount_cents,
                    vendor.as_deref(),
                    due_date,
                    paid_cents,
                    category,
                    description,
                )
                .await?;
            println!(
                "Recorded payable: {} due {} ({})",
                format_cents(record.amount_cents),
                record.due_date.unwrap_or(record.date),
                record.id
            );
        }
    }
    Ok(())
}

async fn run_employee_command(service: &BackOfficeService, cmd: EmployeeCommands) -> Result<()> {
    match cmd {
        EmployeeCommands::Add {
            name,
            pay_type,
            rate,
        } => {
            let pt = PayType::from_str(&pay_type).ok_or_else(|| {
                anyhow::anyhow!("Invalid pay type '{}'. Valid types: hourly, salaried", pay_type)
            })?;
            let rate_cents =
                parse_cents(&rate).context("Invalid rate format. Use '18.50' or '18'")?;

            let employee = service.add_employee(name, pt, rate_cents).await?;
            println!(
                "Added employee: {} ({}, {})",
                employee.name,
                employee.pay_type,
                format_cents(employee.pay_rate_cents)
            );
        }

        EmployeeCommands::List { all } => {
            let employees = service.list_employees(!all).await?;
            if employees.is_empty() {
                println!("No employees found.");
            } else {
                println!("{:<25} {:<10} {:>12} {:<8}", "NAME", "TYPE", "RATE", "ACTIVE");
                println!("{}", "-".repeat(60));
                for employee in employees {
                    println!(
                        "{:<25} {:<10} {:>12} {:<8}",
                        truncate(&employee.name, 25),
                        employee.pay_type,
                        format_cents(employee.pay_rate_cents),
                        if employee.active { "yes" } else { "no" }
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_vendor_command(service: &BackOfficeService, cmd: VendorCommands) -> Result<()> {
    match cmd {
        VendorCommands::Add { name } => {
            let vendor = service.add_vendor(name).await?;
            println!("Added vendor: {} ({})", vendor.name, vendor.id);
        }

        VendorCommands::List => {
            let vendors = service.list_vendors().await?;
            if vendors.is_empty() {
                println!("No vendors found.");
            } else {
                for vendor in vendors {
                    println!("{}", vendor.name);
                }
            }
        }
    }
    Ok(())
}

async fn run_menu_item_command(service: &BackOfficeService, cmd: MenuItemCommands) -> Result<()> {
    match cmd {
        MenuItemCommands::Add { name, cost } => {
            let cost_cents = cost
                .map(|c| parse_cents(&c))
                .transpose()
                .context("Invalid cost format. Use '3.50' or '3'")?;
            let item = service.add_menu_item(name, cost_cents).await?;
            match item.recipe_cost_cents {
                Some(cost) => println!(
                    "Added menu item: {} (recipe cost {})",
                    item.name,
                    format_cents(cost)
                ),
                None => println!("Added menu item: {} (no recipe cost)", item.name),
            }
        }

        MenuItemCommands::SetCost { name, cost } => {
            let cost_cents =
                parse_cents(&cost).context("Invalid cost format. Use '3.50' or '3'")?;
            let item = service.set_recipe_cost(&name, cost_cents).await?;
            println!(
                "Set recipe cost: {} -> {}",
                item.name,
                format_cents(cost_cents)
            );
        }

        MenuItemCommands::List => {
            let items = service.list_menu_items().await?;
            if items.is_empty() {
                println!("No menu items found.");
            } else {
                println!("{:<30} {:>12}", "ITEM", "RECIPE COST");
                println!("{}", "-".repeat(44));
                for item in items {
                    let cost = item
                        .recipe_cost_cents
                        .map(format_cents)
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<30} {:>12}", truncate(&item.name, 30), cost);
                }
            }
        }
    }
    Ok(())
}

async fn run_pnl_command(
    service: &BackOfficeService,
    period: Period,
    compare: bool,
    json: bool,
) -> Result<()> {
    let report = service.pnl_report(period, compare).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let stmt = &report.current;

    println!("Profit & Loss");
    println!("Period: {} to {}", stmt.period.start, stmt.period.end);
    println!();

    println!("Revenue");
    let rev = &stmt.revenue;
    let rev_line = |label: &str, amount| {
        if amount != 0 {
            println!("  {:<24} {:>12}", label, format_cents(amount));
        }
    };
    rev_line("Food", rev.food_cents);
    rev_line("Beverage", rev.beverage_cents);
    rev_line("Alcohol", rev.alcohol_cents);
    rev_line("Catering", rev.catering_cents);
    rev_line("Other", rev.other_cents);
    rev_line("Discounts", -rev.discounts_cents);
    rev_line("Comps", -rev.comps_cents);
    rev_line("Refunds", -rev.refunds_cents);

    let pnl_line = |label: &str, line: PnlLine| {
        println!(
            "{:<26} {:>12} {:>7.1}%",
            label,
            format_cents(line.amount_cents),
            line.margin_percent
        );
    };
    println!("{}", "-".repeat(48));
    pnl_line("Net revenue", stmt.net_revenue);
    println!();
    println!(
        "  {:<24} {:>12}",
        "COGS purchases",
        format_cents(stmt.cogs_breakdown.purchases_cents)
    );
    println!(
        "  {:<24} {:>12}",
        "Calculated food cost",
        format_cents(stmt.cogs_breakdown.calculated_food_cost_cents)
    );
    pnl_line("COGS", stmt.cogs);
    pnl_line("Gross profit", stmt.gross_profit);
    pnl_line("Labor", stmt.labor);
    pnl_line("Prime cost", stmt.prime_cost);
    pnl_line("Operating", stmt.operating);
    pnl_line("Marketing", stmt.marketing);
    println!("{}", "=".repeat(48));
    pnl_line("Net income", stmt.net_income);

    if !stmt.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &stmt.warnings {
            println!("  - {}", warning);
        }
    }

    if let (Some(previous), Some(v)) = (&report.previous, &report.variance) {
        println!();
        println!(
            "vs previous period {} to {}:",
            previous.period.start, previous.period.end
        );
        let var_line = |label: &str, pct: f64| {
            println!("  {:<24} {:>+7.1}%", label, pct);
        };
        var_line("Net revenue", v.net_revenue);
        var_line("COGS", v.cogs);
        var_line("Gross profit", v.gross_profit);
        var_line("Labor", v.labor);
        var_line("Prime cost", v.prime_cost);
        var_line("Operating", v.operating);
        var_line("Marketing", v.marketing);
        var_line("Net income", v.net_income);
    }

    Ok(())
}

async fn run_aging_command(
    service: &BackOfficeService,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = service.aging_report(today).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Accounts Payable Aging");
    println!("As of: {}", today);
    println!();
    println!("{:<15} {:>12} {:>8}", "BUCKET", "TOTAL", "COUNT");
    println!("{}", "-".repeat(38));
    for bucket in [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ] {
        let line = report.line(bucket);
        println!(
            "{:<15} {:>12} {:>8}",
            bucket.label(),
            format_cents(line.total_cents),
            line.count
        );
    }
    println!("{}", "-".repeat(38));
    println!(
        "{:<15} {:>12} {:>8}",
        "total",
        format_cents(report.total_cents),
        report.open_items
    );

    Ok(())
}

async fn run_menu_command(service: &BackOfficeService, period: Period, json: bool) -> Result<()> {
    let items = service.menu_engineering(period).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No menu item sales in this period.");
        return Ok(());
    }

    println!("Menu Engineering");
    println!("Period: {} to {}", period.start, period.end);
    println!();
    println!(
        "{:<25} {:>6} {:>12} {:>12} {:>8} {:<15}",
        "ITEM", "QTY", "REVENUE", "PROFIT", "FC%", "QUADRANT"
    );
    println!("{}", "-".repeat(84));
    for item in items {
        println!(
            "{:<25} {:>6} {:>12} {:>12} {:>7.1}% {:<15}",
            truncate(&item.name, 25),
            item.quantity_sold,
            format_cents(item.revenue_cents),
            format_cents(item.net_profit_cents),
            item.food_cost_percent,
            item.quadrant
        );
    }

    Ok(())
}

async fn run_breakdown_command(
    service: &BackOfficeService,
    kind: Option<&str>,
    by: &str,
    period: Period,
) -> Result<()> {
    let kind = kind
        .map(|k| {
            crate::domain::TxKind::from_str(k).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid kind '{}'. Valid: sale, expense, payable, receivable, payroll, bank",
                    k
                )
            })
        })
        .transpose()?;
    let group_by = match by.to_lowercase().as_str() {
        "category" => GroupBy::Category,
        "kind" => GroupBy::Kind,
        "salekind" => GroupBy::SaleKind,
        "vendor" => GroupBy::Vendor,
        "menuitem" => GroupBy::MenuItem,
        "date" => GroupBy::Date,
        other => anyhow::bail!(
            "Invalid dimension '{}'. Valid: category, kind, salekind, vendor, menuitem, date",
            other
        ),
    };

    let agg = service.breakdown(kind, period, group_by).await?;

    println!("Breakdown by {}", by.to_lowercase());
    println!("Period: {} to {}", period.start, period.end);
    println!();
    if agg.buckets.is_empty() {
        println!("No rows in this period.");
        return Ok(());
    }

    println!("{:<30} {:>12} {:>8} {:>8}", "KEY", "TOTAL", "COUNT", "SHARE");
    println!("{}", "-".repeat(62));
    for bucket in &agg.buckets {
        println!(
            "{:<30} {:>12} {:>8} {:>7.1}%",
            truncate(&bucket.key, 30),
            format_cents(bucket.total_cents),
            bucket.count,
            bucket.percent_of_total
        );
    }
    println!("{}", "-".repeat(62));
    println!(
        "{:<30} {:>12}",
        "total",
        format_cents(agg.grand_total_cents)
    );

    Ok(())
}

async fn run_payroll_command(service: &BackOfficeService, cmd: PayrollCommands) -> Result<()> {
    match cmd {
        PayrollCommands::Run {
            start,
            end,
            entries,
        } => {
            let period = Period::custom(parse_date(&start)?, parse_date(&end)?)?;
            let requests: Vec<TimesheetRequest> = entries
                .iter()
                .map(|e| parse_timesheet_entry(e))
                .collect::<Result<_>>()?;

            let result = service.run_payroll(period, requests).await?;

            println!(
                "Payroll committed for {} to {}",
                period.start, period.end
            );
            println!();
            println!(
                "{:<12} {:>10} {:>10} {:>10} {:>12}",
                "EMPLOYEE", "GROSS", "WITHHELD", "NET", "EMPLOYER"
            );
            println!("{}", "-".repeat(58));
            for record in &result.records {
                println!(
                    "{:<12} {:>10} {:>10} {:>10} {:>12}",
                    short_id(record.employee_id),
                    format_cents(record.gross_cents),
                    format_cents(record.withholdings.total_cents()),
                    format_cents(record.net_cents),
                    format_cents(record.employer_cost_cents)
                );
            }
            println!("{}", "-".repeat(58));
            println!(
                "Processed {} employee(s): gross {}, net {}, employer cost {}",
                result.summary.employees_processed,
                format_cents(result.summary.total_gross_cents),
                format_cents(result.summary.total_net_cents),
                format_cents(result.summary.total_employer_cost_cents)
            );
        }

        PayrollCommands::List { start, end } => {
            let period = match (start, end) {
                (Some(s), Some(e)) => Some(Period::custom(parse_date(&s)?, parse_date(&e)?)?),
                (None, None) => None,
                _ => anyhow::bail!("--start and --end must be given together"),
            };

            let records = service.list_payroll_records(period).await?;
            if records.is_empty() {
                println!("No payroll records found.");
            } else {
                println!(
                    "{:<12} {:<24} {:>10} {:>10} {:>12}",
                    "EMPLOYEE", "PERIOD", "GROSS", "NET", "EMPLOYER"
                );
                println!("{}", "-".repeat(72));
                for record in records {
                    println!(
                        "{:<12} {:<24} {:>10} {:>10} {:>12}",
                        short_id(record.employee_id),
                        format!("{}", record.period),
                        format_cents(record.gross_cents),
                        format_cents(record.net_cents),
                        format_cents(record.employer_cost_cents)
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_taxes_command(
    service: &BackOfficeService,
    year: i32,
    home_office_cents: i64,
    json: bool,
) -> Result<()> {
    let estimate = service.tax_estimate(year, home_office_cents).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }
    let sc = &estimate.schedule_c;

    println!("Schedule C (estimate) - {}", sc.year);
    println!();
    println!(
        "  {:<38} {:>12}",
        "1  Gross receipts",
        format_cents(sc.gross_receipts_cents)
    );
    println!(
        "  {:<38} {:>12}",
        "2  Returns and allowances",
        format_cents(sc.returns_cents)
    );
    println!(
        "  {:<38} {:>12}",
        "4  Cost of goods sold",
        format_cents(sc.cogs_cents)
    );
    println!(
        "  {:<38} {:>12}",
        "7  Gross income",
        format_cents(sc.gross_income_cents)
    );
    println!();
    for line in &sc.expense_lines {
        println!(
            "  {:<38} {:>12}",
            format!("{:<3} {}", line.line, line.label),
            format_cents(line.amount_cents)
        );
    }
    println!(
        "  {:<38} {:>12}",
        "28 Total expenses",
        format_cents(sc.total_expenses_cents)
    );
    if sc.home_office_cents != 0 {
        println!(
            "  {:<38} {:>12}",
            "30 Home office",
            format_cents(sc.home_office_cents)
        );
    }
    println!("{}", "=".repeat(54));
    println!(
        "  {:<38} {:>12}",
        "31 Net profit",
        format_cents(sc.net_profit_cents)
    );

    println!();
    println!("Quarterly estimated payments");
    println!(
        "{:<4} {:<24} {:>12} {:>10} {:>10} {:>12}",
        "Q", "PERIOD", "NET", "SE TAX", "INCOME", "PAYMENT"
    );
    println!("{}", "-".repeat(78));
    for q in &estimate.quarterly {
        println!(
            "{:<4} {:<24} {:>12} {:>10} {:>10} {:>12}",
            format!("Q{}", q.quarter),
            format!("{}", q.period),
            format_cents(q.net_income_cents),
            format_cents(q.se_tax_cents),
            format_cents(q.income_tax_cents),
            format_cents(q.estimated_payment_cents)
        );
    }
    println!("{}", "-".repeat(78));
    println!(
        "Annual total: {}",
        format_cents(estimate.annual_total_cents)
    );

    Ok(())
}

async fn run_vendors_1099_command(service: &BackOfficeService, year: i32) -> Result<()> {
    let flagged = service.vendors_1099(year).await?;

    if flagged.is_empty() {
        println!("No vendors reached the 1099 threshold in {}.", year);
        return Ok(());
    }

    println!("1099-NEC vendors for {}", year);
    println!();
    println!("{:<30} {:>12}", "VENDOR", "TOTAL PAID");
    println!("{}", "-".repeat(44));
    for vendor in flagged {
        println!(
            "{:<30} {:>12}",
            truncate(&vendor.name, 30),
            format_cents(vendor.total_paid_cents)
        );
    }

    Ok(())
}

/// Resolve a period from either a named kind or an explicit from/to pair.
fn resolve_period(period: &str, from: Option<String>, to: Option<String>) -> Result<Period> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Period::custom(parse_date(&from)?, parse_date(&to)?)?),
        (None, None) => {
            let kind = PeriodKind::from_str(period).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid period '{}'. Valid: today, week, month, quarter, year, ytd",
                    period
                )
            })?;
            Ok(kind.resolve(Utc::now().date_naive()))
        }
        _ => anyhow::bail!("--from and --to must be given together"),
    }
}

/// Parse NAME:REGULAR:OVERTIME:TIPS. Splits from the right so employee
/// names may contain colons.
fn parse_timesheet_entry(raw: &str) -> Result<TimesheetRequest> {
    let parts: Vec<&str> = raw.rsplitn(4, ':').collect();
    if parts.len() != 4 {
        anyhow::bail!(
            "Invalid entry '{}'. Use NAME:REGULAR:OVERTIME:TIPS, e.g. 'Sam:40:5:120.00'",
            raw
        );
    }

    // rsplitn yields fields right-to-left
    let tips_cents = parse_cents(parts[0])
        .with_context(|| format!("Invalid tips amount in entry '{}'", raw))?;
    let overtime_hours: f64 = parts[1]
        .parse()
        .with_context(|| format!("Invalid overtime hours in entry '{}'", raw))?;
    let regular_hours: f64 = parts[2]
        .parse()
        .with_context(|| format!("Invalid regular hours in entry '{}'", raw))?;

    Ok(TimesheetRequest {
        employee_name: parts[3].to_string(),
        regular_hours,
        overtime_hours,
        tips_cents,
    })
}

/// First segment of a UUID, enough to tell rows apart in a table.
fn short_id(id: uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
