use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive day range. Every report in the engine takes one of these;
/// no component derives its own date math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl std::fmt::Display for PeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodError::EndBeforeStart { start, end } => {
                write!(f, "period end {} precedes start {}", end, start)
            }
        }
    }
}

impl std::error::Error for PeriodError {}

impl Period {
    /// Build an explicit custom period. Fails when the end precedes the start.
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if end < start {
            return Err(PeriodError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of days covered, inclusive of both ends.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The immediately preceding period of equal day-length: contiguous,
    /// non-overlapping, ending the day before this period starts.
    pub fn comparison(&self) -> Period {
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(self.day_count() - 1);
        Period { start, end }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Named periods resolvable against a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Today,
    Week,
    Month,
    Quarter,
    Year,
    Ytd,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Today => "today",
            PeriodKind::Week => "week",
            PeriodKind::Month => "month",
            PeriodKind::Quarter => "quarter",
            PeriodKind::Year => "year",
            PeriodKind::Ytd => "ytd",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "today" => Some(PeriodKind::Today),
            "week" => Some(PeriodKind::Week),
            "month" => Some(PeriodKind::Month),
            "quarter" => Some(PeriodKind::Quarter),
            "year" => Some(PeriodKind::Year),
            "ytd" => Some(PeriodKind::Ytd),
            _ => None,
        }
    }

    /// Resolve against today.
    pub fn resolve(&self, today: NaiveDate) -> Period {
        self.resolve_at(today, today)
    }

    /// Resolve against an anchor date, capped at `today`. The period covers
    /// the calendar unit containing `anchor`, running from the unit's first
    /// day through `today` - except when the unit lies fully in the past,
    /// in which case it runs through the unit's last day.
    pub fn resolve_at(&self, anchor: NaiveDate, today: NaiveDate) -> Period {
        let (start, unit_end) = match self {
            PeriodKind::Today => (today, today),
            PeriodKind::Week => {
                // Week starts on Monday
                let weekday = anchor.weekday().num_days_from_monday();
                let start = anchor - Duration::days(weekday as i64);
                (start, start + Duration::days(6))
            }
            PeriodKind::Month => {
                let start = anchor.with_day(1).unwrap();
                (start, last_day_of_month(anchor.year(), anchor.month()))
            }
            PeriodKind::Quarter => {
                let first_month = (anchor.month0() / 3) * 3 + 1;
                let start = NaiveDate::from_ymd_opt(anchor.year(), first_month, 1).unwrap();
                (start, last_day_of_month(anchor.year(), first_month + 2))
            }
            PeriodKind::Year => {
                let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap();
                (start, NaiveDate::from_ymd_opt(anchor.year(), 12, 31).unwrap())
            }
            // Year-to-date is the year anchored at today, always capped there
            PeriodKind::Ytd => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap();
                (start, today)
            }
        };

        Period {
            start,
            end: unit_end.min(today).max(start),
        }
    }
}

impl std::fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap() - Duration::days(1)
}
