use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type RecordId = Uuid;
pub type VendorId = Uuid;
pub type MenuItemId = Uuid;
pub type EmployeeId = Uuid;

/// Discriminant for ledger rows. Amounts are non-negative at the record
/// level; direction is implied by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Revenue events (menu sales, catering, etc.)
    Sale,
    /// Money going out to vendors, landlords, utilities, ...
    Expense,
    /// Vendor invoices to be paid (aged by the bucketer)
    Payable,
    /// Customer invoices owed to the restaurant
    Receivable,
    /// Labor cost rows emitted by committed payroll runs
    Payroll,
    /// Bank activity (deposits, fees, transfers)
    Bank,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Sale => "sale",
            TxKind::Expense => "expense",
            TxKind::Payable => "payable",
            TxKind::Receivable => "receivable",
            TxKind::Payroll => "payroll",
            TxKind::Bank => "bank",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sale" => Some(TxKind::Sale),
            "expense" => Some(TxKind::Expense),
            "payable" => Some(TxKind::Payable),
            "receivable" => Some(TxKind::Receivable),
            "payroll" => Some(TxKind::Payroll),
            "bank" => Some(TxKind::Bank),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sub-type for sale rows. The first four add to gross revenue, the last
/// three are deductions taken out on the way to net revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleKind {
    Food,
    Beverage,
    Alcohol,
    Catering,
    Discount,
    Comp,
    Refund,
}

impl SaleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleKind::Food => "food",
            SaleKind::Beverage => "beverage",
            SaleKind::Alcohol => "alcohol",
            SaleKind::Catering => "catering",
            SaleKind::Discount => "discount",
            SaleKind::Comp => "comp",
            SaleKind::Refund => "refund",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "food" => Some(SaleKind::Food),
            "beverage" => Some(SaleKind::Beverage),
            "alcohol" => Some(SaleKind::Alcohol),
            "catering" => Some(SaleKind::Catering),
            "discount" => Some(SaleKind::Discount),
            "comp" => Some(SaleKind::Comp),
            "refund" => Some(SaleKind::Refund),
            _ => None,
        }
    }

    /// Discounts, comps and refunds reduce revenue instead of adding to it.
    pub fn is_deduction(&self) -> bool {
        matches!(self, SaleKind::Discount | SaleKind::Comp | SaleKind::Refund)
    }
}

impl std::fmt::Display for SaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dated monetary event in the ledger. Records are immutable once
/// written; corrections are new, offsetting records. The analytics engine
/// only ever reads snapshots of these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: RecordId,
    pub kind: TxKind,
    /// Business date of the event
    pub date: NaiveDate,
    /// Amount in cents, always non-negative
    pub amount_cents: Cents,
    /// Expense category (e.g. "rent", "produce"); None = uncategorized
    pub category: Option<String>,
    /// Revenue sub-type, set on sale rows
    pub sale_kind: Option<SaleKind>,
    pub vendor_id: Option<VendorId>,
    pub menu_item_id: Option<MenuItemId>,
    pub employee_id: Option<EmployeeId>,
    /// Units sold, set on sale rows tied to a menu item
    pub quantity: Option<i64>,
    /// Amount settled so far, for payable/receivable rows
    pub amount_paid_cents: Cents,
    /// Due date for payable/receivable rows; falls back to `date` when unset
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// When the row was recorded in the system
    pub recorded_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(kind: TxKind, date: NaiveDate, amount_cents: Cents) -> Self {
        assert!(amount_cents >= 0, "Record amount must be non-negative");
        Self {
            id: Uuid::new_v4(),
            kind,
            date,
            amount_cents,
            category: None,
            sale_kind: None,
            vendor_id: None,
            menu_item_id: None,
            employee_id: None,
            quantity: None,
            amount_paid_cents: 0,
            due_date: None,
            description: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sale_kind(mut self, sale_kind: SaleKind) -> Self {
        self.sale_kind = Some(sale_kind);
        self
    }

    pub fn with_vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    pub fn with_menu_item(mut self, menu_item_id: MenuItemId, quantity: i64) -> Self {
        self.menu_item_id = Some(menu_item_id);
        self.quantity = Some(quantity);
        self
    }

    pub fn with_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    pub fn with_amount_paid(mut self, amount_paid_cents: Cents) -> Self {
        self.amount_paid_cents = amount_paid_cents;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Balance still owed on a payable/receivable row.
    pub fn outstanding_cents(&self) -> Cents {
        self.amount_cents - self.amount_paid_cents
    }

    /// True while a payable/receivable row has money left on it.
    pub fn is_open(&self) -> bool {
        self.amount_paid_cents < self.amount_cents
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayType {
    /// Paid per hour worked
    Hourly,
    /// Paid a fixed amount per pay period; the stored rate is already
    /// divided down to the period
    Salaried,
}

impl PayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayType::Hourly => "hourly",
            PayType::Salaried => "salaried",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hourly" => Some(PayType::Hourly),
            "salaried" => Some(PayType::Salaried),
            _ => None,
        }
    }
}

impl std::fmt::Display for PayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub pay_type: PayType,
    /// Hourly rate for hourly staff, per-period rate for salaried staff
    pub pay_rate_cents: Cents,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(name: String, pay_type: PayType, pay_rate_cents: Cents) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            pay_type,
            pay_rate_cents,
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Vendor {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// A menu item and its per-unit recipe cost. The cost is optional: a sale
/// can reference an item whose cost has not been entered yet, which the
/// P&L builder treats as zero with a surfaced warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCost {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub recipe_cost_cents: Option<Cents>,
}
