//! Credit score heuristic.
//!
//! A pure calculation over a user's split history: four factors scored 0-100,
//! weighted 40/30/20/10 and mapped onto the 300-850 range.

pub mod calculator;

pub use calculator::{calculate, parse_timestamp, CreditScoreBreakdown, SplitRecord};
