use serde::{Deserialize, Serialize};

use super::money::percent_of;
use super::{Cents, MenuItemId};

/// Per-item aggregates for a period, as produced from the sales snapshot.
/// `net_profit` is the single source of truth downstream; any legacy
/// alternate field naming is normalized away before this struct exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemAggregate {
    pub item_id: MenuItemId,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: Cents,
    pub food_cost_cents: Cents,
    pub labor_cost_cents: Cents,
}

impl MenuItemAggregate {
    pub fn net_profit_cents(&self) -> Cents {
        self.revenue_cents - self.food_cost_cents - self.labor_cost_cents
    }
}

/// The four menu-engineering quadrants: profitability x popularity
/// relative to the item-set average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuQuadrant {
    /// High profit, high volume
    Champions,
    /// High profit, low volume
    HiddenGems,
    /// Low profit, high volume
    VolumeDrivers,
    /// Low profit, low volume
    NeedsReview,
}

impl MenuQuadrant {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuQuadrant::Champions => "champions",
            MenuQuadrant::HiddenGems => "hidden gems",
            MenuQuadrant::VolumeDrivers => "volume drivers",
            MenuQuadrant::NeedsReview => "needs review",
        }
    }
}

impl std::fmt::Display for MenuQuadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemPerformance {
    pub item_id: MenuItemId,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: Cents,
    pub food_cost_cents: Cents,
    pub labor_cost_cents: Cents,
    pub net_profit_cents: Cents,
    /// Food cost share of the item's revenue; 0 when revenue is 0
    pub food_cost_percent: f64,
    pub quadrant: MenuQuadrant,
}

/// Classify every item against the arithmetic mean of the set. Ties at
/// exactly the average resolve to the "high" side (`>=`); that rule is
/// load-bearing for reproducibility and must not drift. An empty set
/// yields an empty result - there is no average to divide by.
pub fn classify_items(items: &[MenuItemAggregate]) -> Vec<MenuItemPerformance> {
    if items.is_empty() {
        return Vec::new();
    }

    let n = items.len() as f64;
    let avg_profit = items
        .iter()
        .map(|i| i.net_profit_cents() as f64)
        .sum::<f64>()
        / n;
    let avg_quantity = items.iter().map(|i| i.quantity_sold as f64).sum::<f64>() / n;

    items
        .iter()
        .map(|item| {
            let profit = item.net_profit_cents();
            let high_profit = profit as f64 >= avg_profit;
            let high_volume = item.quantity_sold as f64 >= avg_quantity;
            let quadrant = match (high_profit, high_volume) {
                (true, true) => MenuQuadrant::Champions,
                (true, false) => MenuQuadrant::HiddenGems,
                (false, true) => MenuQuadrant::VolumeDrivers,
                (false, false) => MenuQuadrant::NeedsReview,
            };

            MenuItemPerformance {
                item_id: item.item_id,
                name: item.name.clone(),
                quantity_sold: item.quantity_sold,
                revenue_cents: item.revenue_cents,
                food_cost_cents: item.food_cost_cents,
                labor_cost_cents: item.labor_cost_cents,
                net_profit_cents: profit,
                food_cost_percent: percent_of(item.food_cost_cents, item.revenue_cents),
                quadrant,
            }
        })
        .collect()
}
