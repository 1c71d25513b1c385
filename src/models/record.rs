use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::closing::{AdjustedClosingData, ShiftAuditLog, ShiftClosingData};

/// Which boundary of the shift an attendance event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    CheckIn,
    CheckOut,
}

/// Classification of a single check-in/out event against the configured
/// shift boundary. Absence is never classified here; it is derived at
/// reporting time from a missing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    OnTime,
    Late,
    EarlyLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    Completed,
    Absent,
}

/// The aggregate tracking one staff member's one shift instance, from
/// assignment through completion and reconciliation.
///
/// Identity is deterministic: the id is derived from (date, userId,
/// shiftType) so repeated materialization of the same logical shift always
/// converges on one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub shift_type: String,
    #[serde(default, with = "super::time_hm_opt", skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<NaiveTime>,
    #[serde(default, with = "super::time_hm_opt", skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<NaiveTime>,
    /// Opaque image artifacts (data URLs) captured at the geofence gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_status: Option<AttendanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_status: Option<AttendanceStatus>,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_data: Option<ShiftClosingData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_closing_data: Option<AdjustedClosingData>,
    /// One-way flag: transitions false -> true, never reverts.
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_log: Vec<ShiftAuditLog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}
