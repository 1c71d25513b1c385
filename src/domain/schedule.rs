//! Roster editing: idempotent toggle of shift assignments, with a change
//! log of who edited what.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Assignment, ScheduleLog};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Không thể chỉnh sửa lịch làm việc của ngày đã qua.")]
    PastDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Flip one (user, date, shiftType) cell of the roster: remove the
/// assignment if present, add it otherwise. Editing days before `today`
/// is rejected.
pub fn toggle_assignment(
    assignments: &mut Vec<Assignment>,
    user_id: &str,
    date: NaiveDate,
    shift_type: &str,
    editor_id: &str,
    today: NaiveDate,
) -> Result<ToggleOutcome, ScheduleError> {
    if date < today {
        return Err(ScheduleError::PastDate);
    }

    let existing = assignments
        .iter()
        .position(|a| a.user_id == user_id && a.date == date && a.shift_type == shift_type);
    match existing {
        Some(index) => {
            assignments.remove(index);
            Ok(ToggleOutcome::Removed)
        }
        None => {
            assignments.push(Assignment {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                date,
                shift_type: shift_type.to_string(),
                updated_at: Utc::now(),
                updated_by: editor_id.to_string(),
            });
            Ok(ToggleOutcome::Added)
        }
    }
}

/// Human-readable roster change entry, newest first in storage order.
pub fn log_entry(
    outcome: ToggleOutcome,
    editor_name: &str,
    staff_name: &str,
    shift_name: &str,
    date: NaiveDate,
) -> ScheduleLog {
    let action = match outcome {
        ToggleOutcome::Added => format!(
            "Thêm {} ngày {} cho {}",
            shift_name,
            date.format("%d/%m/%Y"),
            staff_name
        ),
        ToggleOutcome::Removed => format!(
            "Xóa {} ngày {} của {}",
            shift_name,
            date.format("%d/%m/%Y"),
            staff_name
        ),
    };
    ScheduleLog {
        id: Uuid::new_v4().to_string(),
        action,
        timestamp: Utc::now(),
        user_name: editor_name.to_string(),
    }
}
