use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Days after the due date that still count as on time (inclusive)
pub const GRACE_PERIOD_DAYS: i64 = 7;
/// Whole days after expense creation that count as on time when there is no due date
pub const UNDATED_ON_TIME_DAYS: i64 = 30;

pub const PAYMENT_HISTORY_WEIGHT: f64 = 0.40;
pub const PAYMENT_BEHAVIOR_WEIGHT: f64 = 0.30;
pub const DEBT_UTILIZATION_WEIGHT: f64 = 0.20;
pub const PAYMENT_PATTERNS_WEIGHT: f64 = 0.10;

const BASE_SCORE: i32 = 300;
const SCORE_SPAN: f64 = 5.5; // 0..=100 weighted maps onto 0..=550
const NEUTRAL_PATTERN_SCORE: f64 = 50.0;

/// Parse a stored timestamp, tolerating the formats legacy rows carry.
///
/// Accepts RFC 3339 (a `Z` suffix is read as `+00:00`), naive ISO date-times
/// (taken as UTC, `T` or space separated) and bare dates (midnight UTC).
/// Blank input is treated as absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = raw.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Non-blank text of a column; non-string values keep their JSON rendering
fn text(row: &Map<String, Value>, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn amount(row: &Map<String, Value>, column: &str) -> Decimal {
    let raw = match row.get(column) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Decimal::ZERO,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .unwrap_or(Decimal::ZERO)
}

/// One split of the user joined with its expense.
///
/// Timestamps stay as stored text so that a malformed value only drops the
/// split from the factor that needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitRecord {
    pub amount_owed: Decimal,
    pub paid_request: Option<String>,
    pub paid_confirmed: Option<String>,
    pub due_date: Option<String>,
    pub expense_created_at: Option<String>,
}

impl SplitRecord {
    pub fn from_rows(split: &Map<String, Value>, expense: &Map<String, Value>) -> Self {
        Self {
            amount_owed: amount(split, "amount_owed"),
            paid_request: text(split, "paid_request"),
            paid_confirmed: text(split, "paid_confirmed"),
            due_date: text(expense, "due_date"),
            expense_created_at: text(expense, "created_at"),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.paid_confirmed.is_some()
    }

    pub fn is_requested(&self) -> bool {
        self.paid_request.is_some()
    }
}

/// Outcome of a paid split against its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeliness {
    OnTime,
    Late,
    Unpaid,
}

/// Classify one split; `None` when a timestamp it depends on does not parse
pub fn timeliness(record: &SplitRecord) -> Option<Timeliness> {
    let Some(confirmed) = record.paid_confirmed.as_deref() else {
        return Some(Timeliness::Unpaid);
    };

    if let Some(due) = record.due_date.as_deref() {
        let due = parse_timestamp(due)?;
        let paid = parse_timestamp(confirmed)?;
        let on_time = paid <= due + Duration::days(GRACE_PERIOD_DAYS);
        return Some(if on_time { Timeliness::OnTime } else { Timeliness::Late });
    }

    if let Some(created) = record.expense_created_at.as_deref() {
        let created = parse_timestamp(created)?;
        let paid = parse_timestamp(confirmed)?;
        let on_time = (paid - created).num_days() <= UNDATED_ON_TIME_DAYS;
        return Some(if on_time { Timeliness::OnTime } else { Timeliness::Late });
    }

    Some(Timeliness::OnTime)
}

/// Payment history factor: 100 per on-time split, 50 per late one, averaged
/// over every split (skipped ones included)
pub fn payment_history_score(records: &[SplitRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let (mut on_time, mut late) = (0usize, 0usize);
    for record in records {
        match timeliness(record) {
            Some(Timeliness::OnTime) => on_time += 1,
            Some(Timeliness::Late) => late += 1,
            Some(Timeliness::Unpaid) | None => {}
        }
    }

    let total = records.len() as f64;
    let score = on_time as f64 / total * 100.0 + late as f64 / total * 50.0;
    score.clamp(0.0, 100.0)
}

/// Payment behavior factor: confirmation rate (60 points) plus request to
/// confirmation speed (40 points, minus one per day on average)
pub fn payment_behavior_score(records: &[SplitRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let paid: Vec<&SplitRecord> = records.iter().filter(|r| r.is_paid()).collect();
    if paid.is_empty() {
        return 0.0;
    }

    let waits: Vec<f64> = paid
        .iter()
        .filter_map(|r| {
            let requested = parse_timestamp(r.paid_request.as_deref()?)?;
            let confirmed = parse_timestamp(r.paid_confirmed.as_deref()?)?;
            Some(hours_between(requested, confirmed))
        })
        .collect();

    let confirmation_rate = paid.len() as f64 / records.len() as f64;
    let avg_wait_hours = if waits.is_empty() {
        0.0
    } else {
        waits.iter().sum::<f64>() / waits.len() as f64
    };

    let confirmation_score = confirmation_rate * 60.0;
    let speed_score = (40.0 - avg_wait_hours / 24.0).max(0.0);
    (confirmation_score + speed_score).clamp(0.0, 100.0)
}

/// Debt utilization factor: stepped on the share of historical debt still
/// outstanding
pub fn debt_utilization_score(records: &[SplitRecord]) -> f64 {
    let total: Decimal = records.iter().map(|r| r.amount_owed).sum();
    if total.is_zero() {
        return 100.0;
    }

    let outstanding: Decimal = records
        .iter()
        .filter(|r| !r.is_paid())
        .map(|r| r.amount_owed)
        .sum();
    let ratio = (outstanding / total).to_f64().unwrap_or(1.0);

    if ratio <= 0.1 {
        100.0
    } else if ratio <= 0.3 {
        80.0
    } else if ratio <= 0.5 {
        60.0
    } else if ratio <= 0.7 {
        30.0
    } else {
        0.0
    }
}

/// Payment patterns factor: request frequency (40 points) plus consistency of
/// creation to confirmation times (60 points, minus one per day of stdev)
pub fn payment_patterns_score(records: &[SplitRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let requested = records.iter().filter(|r| r.is_requested()).count();
    let request_frequency = requested as f64 / records.len() as f64;

    let paid: Vec<&SplitRecord> = records.iter().filter(|r| r.is_paid()).collect();
    if paid.len() < 2 {
        return NEUTRAL_PATTERN_SCORE;
    }

    let times: Vec<f64> = paid
        .iter()
        .filter_map(|r| {
            let created = parse_timestamp(r.expense_created_at.as_deref()?)?;
            let confirmed = parse_timestamp(r.paid_confirmed.as_deref()?)?;
            Some(hours_between(created, confirmed))
        })
        .collect();
    if times.len() < 2 {
        return NEUTRAL_PATTERN_SCORE;
    }

    let n = times.len() as f64;
    let mean = times.iter().sum::<f64>() / n;
    let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let consistency_score = (60.0 - std_dev / 24.0).max(0.0);
    let frequency_score = (request_frequency * 100.0).min(40.0);
    (consistency_score + frequency_score).clamp(0.0, 100.0)
}

/// Map a 0-100 weighted score onto the 300-850 scale
pub fn to_credit_score(weighted: f64) -> i32 {
    BASE_SCORE + (weighted.clamp(0.0, 100.0) * SCORE_SPAN).round() as i32
}

/// The four factors behind a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditScoreBreakdown {
    pub payment_history: f64,
    pub payment_behavior: f64,
    pub debt_utilization: f64,
    pub payment_patterns: f64,
    pub weighted: f64,
    pub credit_score: i32,
}

/// Score a split history; `None` when there is no history at all
pub fn calculate(records: &[SplitRecord]) -> Option<CreditScoreBreakdown> {
    if records.is_empty() {
        return None;
    }

    let payment_history = payment_history_score(records);
    let payment_behavior = payment_behavior_score(records);
    let debt_utilization = debt_utilization_score(records);
    let payment_patterns = payment_patterns_score(records);

    let weighted = payment_history * PAYMENT_HISTORY_WEIGHT
        + payment_behavior * PAYMENT_BEHAVIOR_WEIGHT
        + debt_utilization * DEBT_UTILIZATION_WEIGHT
        + payment_patterns * PAYMENT_PATTERNS_WEIGHT;

    Some(CreditScoreBreakdown {
        payment_history,
        payment_behavior,
        debt_utilization,
        payment_patterns,
        weighted,
        credit_score: to_credit_score(weighted),
    })
}
