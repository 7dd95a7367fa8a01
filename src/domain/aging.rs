use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, RecordId, TransactionRecord};

/// Fixed time-since-due buckets. Together they partition the open set:
/// every open payable lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingBucket {
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::Current => "current",
            AgingBucket::Days1To30 => "1-30 days",
            AgingBucket::Days31To60 => "31-60 days",
            AgingBucket::Days61To90 => "61-90 days",
            AgingBucket::Over90 => "over 90 days",
        }
    }

    /// Bucket for a given days-overdue value. Zero or negative means the
    /// item is not yet due.
    pub fn for_days_overdue(days: i64) -> Self {
        match days {
            i64::MIN..=0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgingLine {
    pub total_cents: Cents,
    pub count: i64,
}

/// Outstanding balances partitioned by how overdue they are.
/// `total_cents` always equals the sum of the five bucket totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgingReport {
    pub current: AgingLine,
    pub days_1_30: AgingLine,
    pub days_31_60: AgingLine,
    pub days_61_90: AgingLine,
    pub over_90: AgingLine,
    pub total_cents: Cents,
    pub open_items: i64,
}

impl AgingReport {
    pub fn line(&self, bucket: AgingBucket) -> &AgingLine {
        match bucket {
            AgingBucket::Current => &self.current,
            AgingBucket::Days1To30 => &self.days_1_30,
            AgingBucket::Days31To60 => &self.days_31_60,
            AgingBucket::Days61To90 => &self.days_61_90,
            AgingBucket::Over90 => &self.over_90,
        }
    }

    fn line_mut(&mut self, bucket: AgingBucket) -> &mut AgingLine {
        match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgingError {
    /// Paid more than the invoiced amount. Surfaced, never clamped.
    PaidExceedsAmount {
        record_id: RecordId,
        amount_cents: Cents,
        amount_paid_cents: Cents,
    },
}

impl std::fmt::Display for AgingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgingError::PaidExceedsAmount {
                record_id,
                amount_cents,
                amount_paid_cents,
            } => write!(
                f,
                "record {} has amount_paid {} exceeding amount {}",
                record_id, amount_paid_cents, amount_cents
            ),
        }
    }
}

impl std::error::Error for AgingError {}

/// Partition open payables into aging buckets as of `today`. The due date
/// falls back to the transaction date when unset. An item paid beyond its
/// amount fails the whole report with `PaidExceedsAmount`.
pub fn age_open_items(
    items: &[TransactionRecord],
    today: NaiveDate,
) -> Result<AgingReport, AgingError> {
    let mut report = AgingReport::default();

    for item in items {
        if item.amount_paid_cents > item.amount_cents {
            return Err(AgingError::PaidExceedsAmount {
                record_id: item.id,
                amount_cents: item.amount_cents,
                amount_paid_cents: item.amount_paid_cents,
            });
        }
        if !item.is_open() {
            continue;
        }

        let due = item.due_date.unwrap_or(item.date);
        let days_overdue = (today - due).num_days();
        let line = report.line_mut(AgingBucket::for_days_overdue(days_overdue));
        line.total_cents += item.outstanding_cents();
        line.count += 1;
        report.total_cents += item.outstanding_cents();
        report.open_items += 1;
    }

    Ok(report)
}
