use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pnl::ExpenseClass;
use super::{Cents, Period, TransactionRecord, Vendor, VendorId};

/// Statutory threshold above which a vendor needs a 1099-NEC for the year.
pub const FORM_1099_THRESHOLD_CENTS: Cents = 60_000;

/// Share of net profit subject to self-employment tax.
pub const SE_TAXABLE_SHARE: f64 = 0.9235;
/// Combined self-employment tax rate (Social Security + Medicare).
pub const SE_TAX_RATE: f64 = 0.153;
/// Flat-bracket approximation of federal income tax.
pub const ESTIMATED_INCOME_TAX_RATE: f64 = 0.22;

/// Canonical Schedule C expense lines, in form order. Lines the year
/// didn't touch are omitted from the built statement.
const EXPENSE_LINE_ORDER: [(&str, &str); 16] = [
    ("8", "Advertising"),
    ("9", "Car and truck expenses"),
    ("11", "Contract labor"),
    ("15", "Insurance"),
    ("16b", "Interest (other)"),
    ("17", "Legal and professional services"),
    ("18", "Office expense"),
    ("20b", "Rent or lease (other business property)"),
    ("21", "Repairs and maintenance"),
    ("22", "Supplies"),
    ("23", "Taxes and licenses"),
    ("24a", "Travel"),
    ("24b", "Deductible meals"),
    ("25", "Utilities"),
    ("26", "Wages"),
    ("27a", "Other expenses"),
];

/// Map an expense category to its Schedule C line. Labor-classed
/// categories are handled separately (they join payroll on line 26);
/// everything unrecognized lands on 27a rather than dropping out.
pub fn expense_line(category: &str) -> (&'static str, &'static str) {
    match category.to_lowercase().as_str() {
        "advertising" | "marketing" | "promotions" | "sponsorships" => ("8", "Advertising"),
        "vehicle" | "delivery" | "car and truck" => ("9", "Car and truck expenses"),
        "contract labor" | "contractors" => ("11", "Contract labor"),
        "insurance" => ("15", "Insurance"),
        "interest" => ("16b", "Interest (other)"),
        "legal" | "accounting" | "professional services" => {
            ("17", "Legal and professional services")
        }
        "office" | "office supplies" => ("18", "Office expense"),
        "rent" | "lease" => ("20b", "Rent or lease (other business property)"),
        "repairs" | "maintenance" => ("21", "Repairs and maintenance"),
        "supplies" | "smallwares" => ("22", "Supplies"),
        "taxes" | "licenses" | "permits" => ("23", "Taxes and licenses"),
        "travel" => ("24a", "Travel"),
        "meals" => ("24b", "Deductible meals"),
        "utilities" => ("25", "Utilities"),
        _ => ("27a", "Other expenses"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleCLine {
    pub line: &'static str,
    pub label: &'static str,
    pub amount_cents: Cents,
}

/// Schedule-C-shaped year summary. A planning estimate, not a filing.
/// Serialize-only: this is a derived view, never ingested back.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleC {
    pub year: i32,
    /// Line 1
    pub gross_receipts_cents: Cents,
    /// Line 2: returns and allowances (discounts, comps, refunds)
    pub returns_cents: Cents,
    /// Line 4
    pub cogs_cents: Cents,
    /// Line 7: receipts - returns - COGS
    pub gross_income_cents: Cents,
    /// Part II lines present this year, in form order
    pub expense_lines: Vec<ScheduleCLine>,
    pub total_expenses_cents: Cents,
    pub home_office_cents: Cents,
    pub net_profit_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterlyEstimate {
    pub quarter: u8,
    pub period: Period,
    pub net_income_cents: Cents,
    pub se_tax_cents: Cents,
    pub income_tax_cents: Cents,
    /// Suggested estimated-tax payment for the quarter
    pub estimated_payment_cents: Cents,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxEstimate {
    pub schedule_c: ScheduleC,
    pub quarterly: Vec<QuarterlyEstimate>,
    pub annual_total_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor1099 {
    pub vendor_id: VendorId,
    pub name: String,
    pub total_paid_cents: Cents,
}

/// The four IRS estimated-tax periods. Deliberately uneven: Jan-Mar,
/// Apr-May, Jun-Aug, Sep-Dec.
pub fn irs_quarters(year: i32) -> [Period; 4] {
    let period = |sm: u32, sd: u32, em: u32, ed: u32| Period {
        start: NaiveDate::from_ymd_opt(year, sm, sd).unwrap(),
        end: NaiveDate::from_ymd_opt(year, em, ed).unwrap(),
    };
    [
        period(1, 1, 3, 31),
        period(4, 1, 5, 31),
        period(6, 1, 8, 31),
        period(9, 1, 12, 31),
    ]
}

fn net_sales(sales: &[TransactionRecord]) -> (Cents, Cents) {
    let mut receipts = 0;
    let mut returns = 0;
    for sale in sales {
        if sale.sale_kind.is_some_and(|k| k.is_deduction()) {
            returns += sale.amount_cents;
        } else {
            receipts += sale.amount_cents;
        }
    }
    (receipts, returns)
}

/// Shape a full year of rows into Schedule C lines.
pub fn build_schedule_c(
    year: i32,
    sales: &[TransactionRecord],
    expenses: &[TransactionRecord],
    payroll: &[TransactionRecord],
    home_office_cents: Cents,
) -> ScheduleC {
    let (gross_receipts, returns) = net_sales(sales);

    let mut cogs = 0;
    let mut wages: Cents = payroll.iter().map(|r| r.amount_cents).sum();
    let mut lines: HashMap<&'static str, Cents> = HashMap::new();

    for expense in expenses {
        let category = expense.category.as_deref().unwrap_or("");
        match ExpenseClass::from_category(category) {
            ExpenseClass::Cogs => cogs += expense.amount_cents,
            ExpenseClass::Labor => wages += expense.amount_cents,
            _ => {
                let (line, _) = expense_line(category);
                *lines.entry(line).or_insert(0) += expense.amount_cents;
            }
        }
    }
    if wages > 0 {
        *lines.entry("26").or_insert(0) += wages;
    }

    let expense_lines: Vec<ScheduleCLine> = EXPENSE_LINE_ORDER
        .iter()
        .filter_map(|(line, label)| {
            lines.get(line).map(|&amount_cents| ScheduleCLine {
                line,
                label,
                amount_cents,
            })
        })
        .collect();

    let total_expenses: Cents = expense_lines.iter().map(|l| l.amount_cents).sum();
    let gross_income = gross_receipts - returns - cogs;

    ScheduleC {
        year,
        gross_receipts_cents: gross_receipts,
        returns_cents: returns,
        cogs_cents: cogs,
        gross_income_cents: gross_income,
        expense_lines,
        total_expenses_cents: total_expenses,
        home_office_cents,
        net_profit_cents: gross_income - total_expenses - home_office_cents,
    }
}

fn in_period<'a>(
    rows: &'a [TransactionRecord],
    period: &Period,
) -> impl Iterator<Item = &'a TransactionRecord> {
    let period = *period;
    rows.iter().filter(move |r| period.contains(r.date))
}

/// Quarterly estimated-tax projections plus the Schedule C summary.
/// A quarter that ran at a loss suggests a zero payment; taxes are never
/// projected negative.
pub fn build_tax_estimate(
    year: i32,
    sales: &[TransactionRecord],
    expenses: &[TransactionRecord],
    payroll: &[TransactionRecord],
    home_office_cents: Cents,
) -> TaxEstimate {
    let schedule_c = build_schedule_c(year, sales, expenses, payroll, home_office_cents);

    let quarterly: Vec<QuarterlyEstimate> = irs_quarters(year)
        .into_iter()
        .enumerate()
        .map(|(i, period)| {
            let q_sales: Vec<TransactionRecord> = in_period(sales, &period).cloned().collect();
            let (receipts, returns) = net_sales(&q_sales);
            let q_expenses: Cents = in_period(expenses, &period).map(|r| r.amount_cents).sum();
            let q_payroll: Cents = in_period(payroll, &period).map(|r| r.amount_cents).sum();
            let net_income = receipts - returns - q_expenses - q_payroll;

            let taxable = net_income.max(0);
            let se_tax = (taxable as f64 * SE_TAXABLE_SHARE * SE_TAX_RATE).round() as Cents;
            let income_tax = (taxable as f64 * ESTIMATED_INCOME_TAX_RATE).round() as Cents;

            QuarterlyEstimate {
                quarter: (i + 1) as u8,
                period,
                net_income_cents: net_income,
                se_tax_cents: se_tax,
                income_tax_cents: income_tax,
                estimated_payment_cents: se_tax + income_tax,
            }
        })
        .collect();

    let annual_total = quarterly.iter().map(|q| q.estimated_payment_cents).sum();

    TaxEstimate {
        schedule_c,
        quarterly,
        annual_total_cents: annual_total,
    }
}

/// Vendors paid at or above the 1099-NEC threshold for the year, from the
/// year's expense rows. Ordered by total paid descending, ties by name.
pub fn vendors_1099(expenses: &[TransactionRecord], vendors: &[Vendor]) -> Vec<Vendor1099> {
    let mut paid: HashMap<VendorId, Cents> = HashMap::new();
    for expense in expenses {
        if let Some(vendor_id) = expense.vendor_id {
            *paid.entry(vendor_id).or_insert(0) += expense.amount_cents;
        }
    }

    let mut flagged: Vec<Vendor1099> = vendors
        .iter()
        .filter_map(|vendor| {
            let total = paid.get(&vendor.id).copied().unwrap_or(0);
            (total >= FORM_1099_THRESHOLD_CENTS).then(|| Vendor1099 {
                vendor_id: vendor.id,
                name: vendor.name.clone(),
                total_paid_cents: total,
            })
        })
        .collect();

    flagged.sort_by(|a, b| {
        b.total_paid_cents
            .cmp(&a.total_paid_cents)
            .then_with(|| a.name.cmp(&b.name))
    });
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SaleKind, TxKind};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sale(day: &str, kind: SaleKind, amount: Cents) -> TransactionRecord {
        TransactionRecord::new(TxKind::Sale, date(day), amount).with_sale_kind(kind)
    }

    fn expense(day: &str, category: &str, amount: Cents) -> TransactionRecord {
        TransactionRecord::new(TxKind::Expense, date(day), amount).with_category(category)
    }

    #[test]
    fn test_irs_quarters_are_uneven() {
        let quarters = irs_quarters(2024);
        assert_eq!(quarters[0].start, date("2024-01-01"));
        assert_eq!(quarters[0].end, date("2024-03-31"));
        assert_eq!(quarters[1].end, date("2024-05-31"));
        assert_eq!(quarters[2].start, date("2024-06-01"));
        assert_eq!(quarters[2].end, date("2024-08-31"));
        assert_eq!(quarters[3].start, date("2024-09-01"));
        assert_eq!(quarters[3].end, date("2024-12-31"));
    }

    #[test]
    fn test_schedule_c_shape() {
        let sales = vec![
            sale("2024-02-01", SaleKind::Food, 5_000_00),
            sale("2024-02-02", SaleKind::Refund, 100_00),
        ];
        let expenses = vec![
            expense("2024-02-10", "produce", 1_200_00), // COGS, line 4
            expense("2024-03-01", "rent", 800_00),      // 20b
            expense("2024-03-02", "utilities", 150_00), // 25
            expense("2024-03-03", "wages", 600_00),     // labor -> 26
            expense("2024-03-04", "llama rental", 50_00), // other -> 27a
        ];
        let payroll = vec![TransactionRecord::new(
            TxKind::Payroll,
            date("2024-03-15"),
            400_00,
        )];

        let sc = build_schedule_c(2024, &sales, &expenses, &payroll, 25_00);
        assert_eq!(sc.gross_receipts_cents, 5_000_00);
        assert_eq!(sc.returns_cents, 100_00);
        assert_eq!(sc.cogs_cents, 1_200_00);
        assert_eq!(sc.gross_income_cents, 3_700_00);

        let line = |n: &str| {
            sc.expense_lines
                .iter()
                .find(|l| l.line == n)
                .map(|l| l.amount_cents)
        };
        assert_eq!(line("20b"), Some(800_00));
        assert_eq!(line("25"), Some(150_00));
        assert_eq!(line("26"), Some(1_000_00)); // payroll + labor expenses
        assert_eq!(line("27a"), Some(50_00));
        assert_eq!(line("8"), None); // untouched lines are omitted

        assert_eq!(sc.total_expenses_cents, 2_000_00);
        assert_eq!(sc.net_profit_cents, 3_700_00 - 2_000_00 - 25_00);
    }

    #[test]
    fn test_expense_lines_in_form_order() {
        let expenses = vec![
            expense("2024-03-01", "utilities", 100),
            expense("2024-03-01", "advertising", 100),
            expense("2024-03-01", "rent", 100),
        ];
        let sc = build_schedule_c(2024, &[], &expenses, &[], 0);
        let lines: Vec<&str> = sc.expense_lines.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec!["8", "20b", "25"]);
    }

    #[test]
    fn test_quarterly_estimates() {
        // All activity in Q1: net = 10000.00
        let sales = vec![sale("2024-01-15", SaleKind::Food, 1_500_000)];
        let expenses = vec![expense("2024-02-01", "rent", 500_000)];

        let estimate = build_tax_estimate(2024, &sales, &expenses, &[], 0);
        let q1 = &estimate.quarterly[0];
        assert_eq!(q1.net_income_cents, 1_000_000);
        assert_eq!(q1.se_tax_cents, (1_000_000f64 * 0.9235 * 0.153).round() as Cents);
        assert_eq!(q1.income_tax_cents, 220_000);
        assert_eq!(
            q1.estimated_payment_cents,
            q1.se_tax_cents + q1.income_tax_cents
        );

        // Other quarters saw nothing
        for q in &estimate.quarterly[1..] {
            assert_eq!(q.estimated_payment_cents, 0);
        }
        assert_eq!(estimate.annual_total_cents, q1.estimated_payment_cents);
    }

    #[test]
    fn test_loss_quarter_suggests_zero_payment() {
        let expenses = vec![expense("2024-01-10", "rent", 300_000)];
        let estimate = build_tax_estimate(2024, &[], &expenses, &[], 0);
        let q1 = &estimate.quarterly[0];
        assert_eq!(q1.net_income_cents, -300_000);
        assert_eq!(q1.se_tax_cents, 0);
        assert_eq!(q1.estimated_payment_cents, 0);
    }

    #[test]
    fn test_schedule_c_serializes_to_json() {
        let expenses = vec![expense("2024-03-01", "rent", 800_00)];
        let estimate = build_tax_estimate(2024, &[], &expenses, &[], 0);

        let value = serde_json::to_value(&estimate).unwrap();
        let lines = value["schedule_c"]["expense_lines"].as_array().unwrap();
        assert_eq!(lines[0]["line"], "20b");
        assert_eq!(lines[0]["amount_cents"], 80000);
        assert_eq!(value["quarterly"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_1099_threshold_is_inclusive() {
        let above = Vendor::new("Linens & Co".into());
        let at = Vendor::new("Knife Sharpening LLC".into());
        let below = Vendor::new("One-off Repair".into());

        let expenses = vec![
            expense("2024-02-01", "supplies", 70_000).with_vendor(above.id),
            expense("2024-05-01", "supplies", 59_999).with_vendor(at.id),
            expense("2024-06-01", "supplies", 1).with_vendor(at.id),
            expense("2024-07-01", "repairs", 59_999).with_vendor(below.id),
        ];

        let flagged = vendors_1099(&expenses, &[above.clone(), at.clone(), below]);
        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].vendor_id, above.id);
        assert_eq!(flagged[0].total_paid_cents, 70_000);
        assert_eq!(flagged[1].vendor_id, at.id);
        assert_eq!(flagged[1].total_paid_cents, 60_000);
    }
}
