use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::member::SlackUserId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionChange {
    Added,
    Removed,
}

/// Calendar month a reaction is credited to, rendered as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvariantViolation(format!(
                "month must be in range 1..=12, got {month}"
            )));
        }
        if !(1970..=9999).contains(&year) {
            return Err(DomainError::InvariantViolation(format!(
                "year must be in range 1970..=9999, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn of(instant: DateTime<Utc>) -> Self {
        Self { year: instant.year(), month: instant.month() }
    }

    pub fn current() -> Self {
        Self::of(Utc::now())
    }

    /// Period of a Slack event timestamp (`"1700000000.000200"`), falling back to now.
    pub fn from_slack_ts(ts: Option<&str>) -> Self {
        ts.and_then(parse_slack_ts).map(Self::of).unwrap_or_else(Self::current)
    }
}

fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let seconds = ts.split('.').next()?.parse::<i64>().ok()?;
    DateTime::from_timestamp(seconds, 0)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid =
            || DomainError::InvariantViolation(format!("period `{value}` is not in YYYY-MM form"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

/// A special-emoji reaction placed by one member on one message. Grants are
/// reserved and released per credit so removing an uncredited reaction is a no-op.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpecialCredit {
    pub giver_id: SlackUserId,
    pub target_id: SlackUserId,
    pub reaction_name: String,
    pub channel: String,
    /// Message ts or file id the reaction is attached to.
    pub item_id: String,
}

/// Canonical reaction name: no surrounding colons, no skin-tone suffix.
pub fn normalize_reaction_name(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(':');
    let base = match trimmed.find("::skin-tone-") {
        Some(position) => &trimmed[..position],
        None => trimmed,
    };
    base.to_string()
}
