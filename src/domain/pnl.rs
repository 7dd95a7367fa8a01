use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::money::{change_percent, percent_of};
use super::{Cents, MenuItemCost, MenuItemId, Period, SaleKind, TransactionRecord};

/// Which P&L section an expense category lands in. Unrecognized categories
/// fall through to Operating so no expense row ever drops out of the
/// statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseClass {
    Cogs,
    Labor,
    Operating,
    Marketing,
}

impl ExpenseClass {
    pub fn from_category(category: &str) -> Self {
        match category.to_lowercase().as_str() {
            "food" | "ingredients" | "produce" | "meat" | "seafood" | "dairy" | "bakery"
            | "beverage inventory" | "alcohol inventory" | "packaging" => ExpenseClass::Cogs,
            "wages" | "salaries" | "payroll taxes" | "benefits" | "staff meals" | "training" => {
                ExpenseClass::Labor
            }
            "advertising" | "marketing" | "promotions" | "sponsorships" => ExpenseClass::Marketing,
            _ => ExpenseClass::Operating,
        }
    }
}

/// One line of the statement: an amount plus its share of net revenue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PnlLine {
    pub amount_cents: Cents,
    pub margin_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    pub food_cents: Cents,
    pub beverage_cents: Cents,
    pub alcohol_cents: Cents,
    pub catering_cents: Cents,
    /// Sale rows without a sub-type; counted toward gross, never dropped
    pub other_cents: Cents,
    pub discounts_cents: Cents,
    pub comps_cents: Cents,
    pub refunds_cents: Cents,
}

impl RevenueBreakdown {
    pub fn gross_cents(&self) -> Cents {
        self.food_cents
            + self.beverage_cents
            + self.alcohol_cents
            + self.catering_cents
            + self.other_cents
    }

    pub fn deductions_cents(&self) -> Cents {
        self.discounts_cents + self.comps_cents + self.refunds_cents
    }

    pub fn net_cents(&self) -> Cents {
        self.gross_cents() - self.deductions_cents()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogsBreakdown {
    /// COGS-tagged expense rows (invoiced purchases)
    pub purchases_cents: Cents,
    /// Recipe cost x units sold, derived from the sales snapshot
    pub calculated_food_cost_cents: Cents,
}

impl CogsBreakdown {
    pub fn total_cents(&self) -> Cents {
        self.purchases_cents + self.calculated_food_cost_cents
    }
}

/// A full profit-and-loss statement for one period. Rebuilt from the
/// snapshot on every request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlStatement {
    pub period: Period,
    pub revenue: RevenueBreakdown,
    pub net_revenue: PnlLine,
    pub cogs_breakdown: CogsBreakdown,
    pub cogs: PnlLine,
    pub gross_profit: PnlLine,
    pub labor: PnlLine,
    pub prime_cost: PnlLine,
    pub operating: PnlLine,
    pub marketing: PnlLine,
    pub net_income: PnlLine,
    /// Missing-reference annotations (e.g. a sale whose menu item has no
    /// recorded recipe cost). These degrade to zero, they never fail the
    /// statement.
    pub warnings: Vec<String>,
}

/// Field-by-field percentage change against a comparison period.
/// Each field is 0 when the prior value was 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlVariance {
    pub net_revenue: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub labor: f64,
    pub prime_cost: f64,
    pub operating: f64,
    pub marketing: f64,
    pub net_income: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlReport {
    pub current: PnlStatement,
    pub previous: Option<PnlStatement>,
    pub variance: Option<PnlVariance>,
}

/// Snapshot feeding one statement. All slices are already filtered to the
/// statement's period by the caller; the builder itself is pure.
pub struct PnlInputs<'a> {
    pub sales: &'a [TransactionRecord],
    pub expenses: &'a [TransactionRecord],
    pub payroll: &'a [TransactionRecord],
    pub recipe_costs: &'a HashMap<MenuItemId, MenuItemCost>,
}

/// Compose the statement. The three derived totals hold to the cent by
/// construction: gross profit = net revenue - COGS, prime cost = COGS +
/// labor, net income = gross profit - labor - operating - marketing.
pub fn build_statement(period: Period, inputs: &PnlInputs) -> PnlStatement {
    let mut revenue = RevenueBreakdown {
        food_cents: 0,
        beverage_cents: 0,
        alcohol_cents: 0,
        catering_cents: 0,
        other_cents: 0,
        discounts_cents: 0,
        comps_cents: 0,
        refunds_cents: 0,
    };

    for sale in inputs.sales {
        let slot = match sale.sale_kind {
            Some(SaleKind::Food) => &mut revenue.food_cents,
            Some(SaleKind::Beverage) => &mut revenue.beverage_cents,
            Some(SaleKind::Alcohol) => &mut revenue.alcohol_cents,
            Some(SaleKind::Catering) => &mut revenue.catering_cents,
            Some(SaleKind::Discount) => &mut revenue.discounts_cents,
            Some(SaleKind::Comp) => &mut revenue.comps_cents,
            Some(SaleKind::Refund) => &mut revenue.refunds_cents,
            None => &mut revenue.other_cents,
        };
        *slot += sale.amount_cents;
    }

    let mut warnings = Vec::new();
    let calculated_food_cost =
        calculated_food_cost(inputs.sales, inputs.recipe_costs, &mut warnings);

    let mut purchases = 0;
    let mut labor_expenses = 0;
    let mut operating = 0;
    let mut marketing = 0;
    for expense in inputs.expenses {
        let class = expense
            .category
            .as_deref()
            .map(ExpenseClass::from_category)
            .unwrap_or(ExpenseClass::Operating);
        match class {
            ExpenseClass::Cogs => purchases += expense.amount_cents,
            ExpenseClass::Labor => labor_expenses += expense.amount_cents,
            ExpenseClass::Operating => operating += expense.amount_cents,
            ExpenseClass::Marketing => marketing += expense.amount_cents,
        }
    }

    let payroll_total: Cents = inputs.payroll.iter().map(|r| r.amount_cents).sum();
    let labor = payroll_total + labor_expenses;

    let cogs_breakdown = CogsBreakdown {
        purchases_cents: purchases,
        calculated_food_cost_cents: calculated_food_cost,
    };

    let net_revenue = revenue.net_cents();
    let cogs = cogs_breakdown.total_cents();
    let gross_profit = net_revenue - cogs;
    let prime_cost = cogs + labor;
    let net_income = gross_profit - labor - operating - marketing;

    let line = |amount: Cents| PnlLine {
        amount_cents: amount,
        margin_percent: percent_of(amount, net_revenue),
    };

    PnlStatement {
        period,
        revenue,
        net_revenue: line(net_revenue),
        cogs_breakdown,
        cogs: line(cogs),
        gross_profit: line(gross_profit),
        labor: line(labor),
        prime_cost: line(prime_cost),
        operating: line(operating),
        marketing: line(marketing),
        net_income: line(net_income),
        warnings,
    }
}

/// Recipe cost x units sold across the sales snapshot. A sale referencing
/// a menu item with no recorded recipe cost contributes zero and surfaces
/// one warning per item.
fn calculated_food_cost(
    sales: &[TransactionRecord],
    recipe_costs: &HashMap<MenuItemId, MenuItemCost>,
    warnings: &mut Vec<String>,
) -> Cents {
    let mut total = 0;
    let mut missing: HashSet<MenuItemId> = HashSet::new();

    for sale in sales {
        if sale.sale_kind.is_some_and(|k| k.is_deduction()) {
            continue;
        }
        let Some(item_id) = sale.menu_item_id else {
            continue;
        };
        let quantity = sale.quantity.unwrap_or(1);
        match recipe_costs.get(&item_id) {
            Some(item) => match item.recipe_cost_cents {
                Some(cost) => total += cost * quantity,
                None => {
                    if missing.insert(item_id) {
                        warnings.push(format!(
                            "no recipe cost recorded for menu item '{}'; treated as zero",
                            item.name
                        ));
                    }
                }
            },
            None => {
                if missing.insert(item_id) {
                    warnings.push(format!(
                        "no recipe cost recorded for menu item {}; treated as zero",
                        item_id
                    ));
                }
            }
        }
    }

    total
}

pub fn variance(current: &PnlStatement, previous: &PnlStatement) -> PnlVariance {
    let field = |cur: PnlLine, prev: PnlLine| change_percent(cur.amount_cents, prev.amount_cents);
    PnlVariance {
        net_revenue: field(current.net_revenue, previous.net_revenue),
        cogs: field(current.cogs, previous.cogs),
        gross_profit: field(current.gross_profit, previous.gross_profit),
        labor: field(current.labor, previous.labor),
        prime_cost: field(current.prime_cost, previous.prime_cost),
        operating: field(current.operating, previous.operating),
        marketing: field(current.marketing, previous.marketing),
        net_income: field(current.net_income, previous.net_income),
    }
}
