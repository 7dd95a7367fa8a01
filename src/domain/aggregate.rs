use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::money::percent_of;
use super::{Cents, TransactionRecord};

/// Dimension to group ledger rows on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Kind,
    SaleKind,
    Vendor,
    MenuItem,
    Date,
}

/// Key used for rows that carry no value on the grouped dimension. Keeping
/// them in a named bucket (instead of dropping them) is what preserves the
/// conservation property: bucket totals always sum to the source total.
pub const UNCLASSIFIED_KEY: &str = "uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub key: String,
    pub total_cents: Cents,
    pub count: i64,
    /// Share of the grand total; 0 when the grand total is 0
    pub percent_of_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    pub buckets: Vec<AggregateBucket>,
    pub grand_total_cents: Cents,
}

impl Aggregation {
    pub fn bucket(&self, key: &str) -> Option<&AggregateBucket> {
        self.buckets.iter().find(|b| b.key == key)
    }

    pub fn top(&self, n: usize) -> &[AggregateBucket] {
        &self.buckets[..n.min(self.buckets.len())]
    }
}

fn bucket_key(record: &TransactionRecord, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Category => record
            .category
            .clone()
            .unwrap_or_else(|| UNCLASSIFIED_KEY.to_string()),
        GroupBy::Kind => record.kind.as_str().to_string(),
        GroupBy::SaleKind => record
            .sale_kind
            .map(|k| k.as_str().to_string())
            .unwrap_or_else(|| UNCLASSIFIED_KEY.to_string()),
        GroupBy::Vendor => record
            .vendor_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNCLASSIFIED_KEY.to_string()),
        GroupBy::MenuItem => record
            .menu_item_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNCLASSIFIED_KEY.to_string()),
        GroupBy::Date => record.date.to_string(),
    }
}

/// Group a snapshot of rows along one dimension, producing sums, counts
/// and percent-of-total shares. Ordering is deterministic: descending by
/// total, ties broken by key ascending, so "top N" views are stable.
pub fn aggregate(records: &[TransactionRecord], group_by: GroupBy) -> Aggregation {
    let mut groups: HashMap<String, (Cents, i64)> = HashMap::new();
    let mut grand_total: Cents = 0;

    for record in records {
        let entry = groups.entry(bucket_key(record, group_by)).or_insert((0, 0));
        entry.0 += record.amount_cents;
        entry.1 += 1;
        grand_total += record.amount_cents;
    }

    let mut buckets: Vec<AggregateBucket> = groups
        .into_iter()
        .map(|(key, (total_cents, count))| AggregateBucket {
            key,
            total_cents,
            count,
            percent_of_total: percent_of(total_cents, grand_total),
        })
        .collect();

    buckets.sort_by(|a, b| {
        b.total_cents
            .cmp(&a.total_cents)
            .then_with(|| a.key.cmp(&b.key))
    });

    Aggregation {
        buckets,
        grand_total_cents: grand_total,
    }
}

/// Sum of amounts over a snapshot; the degenerate one-bucket aggregation.
pub fn sum_amounts(records: &[TransactionRecord]) -> Cents {
    records.iter().map(|r| r.amount_cents).sum()
}
