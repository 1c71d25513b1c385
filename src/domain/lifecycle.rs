//! Shift record lifecycle: materialize-on-demand from an assignment, apply
//! check-in/out events, attach or skip the closing report.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::capture::CapturedShot;
use crate::models::{
    Assignment, AttendanceStatus, RecordStatus, ShiftAuditLog, ShiftClosingData, ShiftRecord, User,
};

pub const ACTION_MANAGER_CLOSING: &str = "QUẢN LÝ BỔ SUNG BÁO CÁO";
const MANAGER_CLOSING_COMMENT: &str =
    "Dữ liệu chốt ca được Quản lý bổ sung thủ công sau khi nhân viên bỏ qua.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Ca trực này đã điểm danh vào ca rồi.")]
    AlreadyCheckedIn,
    #[error("Bạn cần điểm danh vào ca trước khi ra ca.")]
    NotCheckedIn,
    #[error("Ca trực này đã hoàn tất, không thể điểm danh lại.")]
    AlreadyCompleted,
    #[error("Số tiền trong báo cáo chốt ca không được âm.")]
    NegativeAmount,
}

/// Composite identity of one logical shift: the same (date, user, shiftType)
/// always maps to the same record id, which is what makes repeated
/// materialization converge instead of duplicating records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub date: NaiveDate,
    pub user_id: String,
    pub shift_type: String,
}

impl RecordKey {
    pub fn new(date: NaiveDate, user_id: &str, shift_type: &str) -> Self {
        RecordKey {
            date,
            user_id: user_id.to_string(),
            shift_type: shift_type.to_string(),
        }
    }

    pub fn for_assignment(assignment: &Assignment) -> Self {
        RecordKey::new(assignment.date, &assignment.user_id, &assignment.shift_type)
    }

    /// Stable storage id. The `s-` prefix is the original wire format;
    /// equality and lookups go through this derived string.
    pub fn record_id(&self) -> String {
        format!("s-{}-{}-{}", self.date, self.user_id, self.shift_type)
    }
}

/// Return the stored record for this key, or synthesize a transient PENDING
/// record. The synthesized record is not persisted; persistence happens only
/// when an attendance event or closing report lands on it.
pub fn materialize(key: &RecordKey, existing: &[ShiftRecord], user: &User) -> ShiftRecord {
    let id = key.record_id();
    if let Some(record) = existing.iter().find(|r| r.id == id) {
        return record.clone();
    }
    ShiftRecord {
        id,
        user_id: key.user_id.clone(),
        user_name: Some(user.name.clone()),
        user_avatar: Some(user.avatar.clone()),
        date: key.date,
        shift_type: key.shift_type.clone(),
        check_in_time: None,
        check_out_time: None,
        check_in_photo: None,
        check_out_photo: None,
        check_in_status: None,
        check_out_status: None,
        status: RecordStatus::Pending,
        closing_data: None,
        adjusted_closing_data: None,
        is_confirmed: false,
        confirmed_by: None,
        confirmed_at: None,
        manager_comment: None,
        audit_log: Vec::new(),
        branch_id: user.branch_id.clone(),
    }
}

/// Record a completed check-in capture. Requires a PENDING record with no
/// check-in yet; the record stays PENDING afterwards.
pub fn apply_check_in(
    record: &mut ShiftRecord,
    shot: CapturedShot,
    status: Option<AttendanceStatus>,
) -> Result<(), LifecycleError> {
    if record.status != RecordStatus::Pending {
        return Err(LifecycleError::AlreadyCompleted);
    }
    if record.check_in_time.is_some() {
        return Err(LifecycleError::AlreadyCheckedIn);
    }
    record.check_in_time = Some(shot.taken_at);
    record.check_in_photo = Some(shot.photo);
    record.check_in_status = status;
    Ok(())
}

/// Record a completed check-out capture and complete the shift. Completion
/// does not require a closing report; that is a separable, deferrable step.
pub fn apply_check_out(
    record: &mut ShiftRecord,
    shot: CapturedShot,
    status: Option<AttendanceStatus>,
) -> Result<(), LifecycleError> {
    if record.check_in_time.is_none() {
        return Err(LifecycleError::NotCheckedIn);
    }
    if record.check_out_time.is_some() {
        return Err(LifecycleError::AlreadyCompleted);
    }
    record.check_out_time = Some(shot.taken_at);
    record.check_out_photo = Some(shot.photo);
    record.check_out_status = status;
    record.status = RecordStatus::Completed;
    Ok(())
}

/// Self-service closing report. Re-submission replaces the prior report
/// wholesale; the record is forced COMPLETED either way.
pub fn submit_closing(
    record: &mut ShiftRecord,
    data: ShiftClosingData,
) -> Result<(), LifecycleError> {
    if data.has_negative_amount() {
        return Err(LifecycleError::NegativeAmount);
    }
    record.closing_data = Some(data.normalized());
    record.status = RecordStatus::Completed;
    Ok(())
}

/// Explicit "worked, finances unreported" terminal state.
pub fn skip_closing(record: &mut ShiftRecord) {
    record.status = RecordStatus::Completed;
}

/// Manager/admin attaches a closing report after the fact. Same effect as
/// [`submit_closing`], plus an audit entry naming the actor, which is what
/// distinguishes this path from self-service closing.
pub fn manager_attach_closing(
    record: &mut ShiftRecord,
    data: ShiftClosingData,
    manager_name: &str,
) -> Result<(), LifecycleError> {
    submit_closing(record, data)?;
    record.audit_log.push(ShiftAuditLog::new(
        ACTION_MANAGER_CLOSING,
        manager_name,
        Some(MANAGER_CLOSING_COMMENT.to_string()),
    ));
    Ok(())
}
