use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Planned work: a user paired with a shift type on a calendar day.
/// A user holds at most one assignment per (date, shiftType); the schedule
/// board enforces this through toggle semantics rather than a hard constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub shift_type: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Append-only activity trail for schedule edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleLog {
    pub id: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
}
