//! Manager reconciliation of closing reports: approve as-is or with cash and
//! transfer corrections, and aggregate confirmed finance figures.

use regex::Regex;
use std::sync::OnceLock;

use chrono::Utc;

use crate::models::{AdjustedClosingData, AuditChange, ShiftAuditLog, ShiftRecord};

pub const ACTION_APPROVE: &str = "ĐỐI SOÁT & DUYỆT";
const DEFAULT_APPROVE_COMMENT: &str = "Đối soát ca trực hoàn tất.";

pub const FIELD_CASH: &str = "Tiền mặt";
pub const FIELD_TRANSFER: &str = "Chuyển khoản";

/// Lenient money parser for manager-typed amounts: keeps digits, drops
/// every separator and currency marker ("1.500.000 đ" -> 1500000).
/// Unparseable input is treated as zero.
pub fn parse_currency(input: &str) -> i64 {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIGITS.get_or_init(|| Regex::new(r"[^\d]").expect("static pattern"));
    re.replace_all(input, "").parse().unwrap_or(0)
}

/// Cash figure that counts for finance reporting: the manager adjustment if
/// one was recorded, else the staff-reported value, else zero.
pub fn confirmed_cash(record: &ShiftRecord) -> i64 {
    record
        .adjusted_closing_data
        .as_ref()
        .and_then(|a| a.total_cash)
        .or_else(|| record.closing_data.as_ref().map(|c| c.total_cash))
        .unwrap_or(0)
}

pub fn confirmed_transfer(record: &ShiftRecord) -> i64 {
    record
        .adjusted_closing_data
        .as_ref()
        .and_then(|a| a.total_transfer)
        .or_else(|| record.closing_data.as_ref().map(|c| c.total_transfer))
        .unwrap_or(0)
}

/// Approve a shift record, optionally overriding the reported cash and
/// transfer totals.
///
/// Only fields that actually differ from the staff report become part of
/// the adjustment and the audit changes list; approving with the reported
/// values (or with no overrides) is an approve-as-is and leaves
/// `adjusted_closing_data` untouched. Every call appends exactly one audit
/// entry, so re-approving an already confirmed record grows the trail
/// without mutating anything else.
pub fn approve(
    record: &mut ShiftRecord,
    manager_name: &str,
    adjusted_cash: Option<i64>,
    adjusted_transfer: Option<i64>,
    comment: Option<String>,
) {
    let reported_cash = record.closing_data.as_ref().map_or(0, |c| c.total_cash);
    let reported_transfer = record.closing_data.as_ref().map_or(0, |c| c.total_transfer);

    let mut changes = Vec::new();
    let mut adjustment = AdjustedClosingData::default();
    if let Some(cash) = adjusted_cash {
        if cash != reported_cash {
            adjustment.total_cash = Some(cash);
            changes.push(AuditChange {
                field: FIELD_CASH.to_string(),
                from: reported_cash,
                to: cash,
            });
        }
    }
    if let Some(transfer) = adjusted_transfer {
        if transfer != reported_transfer {
            adjustment.total_transfer = Some(transfer);
            changes.push(AuditChange {
                field: FIELD_TRANSFER.to_string(),
                from: reported_transfer,
                to: transfer,
            });
        }
    }

    let first_approval = !record.is_confirmed;
    if first_approval {
        record.is_confirmed = true;
        record.confirmed_by = Some(manager_name.to_string());
        record.confirmed_at = Some(Utc::now());
        if !changes.is_empty() {
            record.adjusted_closing_data = Some(adjustment);
        }
        record.manager_comment = comment.clone();
    }

    let entry_comment = comment.unwrap_or_else(|| DEFAULT_APPROVE_COMMENT.to_string());
    record.audit_log.push(
        ShiftAuditLog::new(ACTION_APPROVE, manager_name, Some(entry_comment))
            .with_changes(if first_approval { changes } else { Vec::new() }),
    );
}

/// Confirmed finance totals over a set of records. Discounts always come
/// from the staff report since adjustments never touch them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceTotals {
    pub total_cash: i64,
    pub total_transfer: i64,
    pub total_discounts: i64,
    pub total_revenue: i64,
    pub record_count: usize,
}

pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a ShiftRecord>) -> FinanceTotals {
    let mut totals = FinanceTotals::default();
    for record in records {
        let cash = confirmed_cash(record);
        let transfer = confirmed_transfer(record);
        totals.total_cash += cash;
        totals.total_transfer += transfer;
        totals.total_discounts += record
            .closing_data
            .as_ref()
            .map_or(0, |c| c.total_discounts);
        totals.total_revenue += cash + transfer;
        totals.record_count += 1;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::models::{RecordStatus, ShiftClosingData};

    fn record_with_closing(cash: i64, transfer: i64) -> ShiftRecord {
        ShiftRecord {
            id: "s-2024-03-20-staff_1-SHIFT_1".to_string(),
            user_id: "staff_1".to_string(),
            user_name: Some("Nhân viên 1".to_string()),
            user_avatar: None,
            date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            shift_type: "SHIFT_1".to_string(),
            check_in_time: None,
            check_out_time: None,
            check_in_photo: None,
            check_out_photo: None,
            check_in_status: None,
            check_out_status: None,
            status: RecordStatus::Completed,
            closing_data: Some(ShiftClosingData {
                total_bills: 10,
                total_transfer: transfer,
                total_cash: cash,
                total_discounts: 0,
                discounts_details: Vec::new(),
                opening_balance: 0,
                closing_balance: 0,
                incidents: String::new(),
                customer_feedback: String::new(),
            }),
            adjusted_closing_data: None,
            is_confirmed: false,
            confirmed_by: None,
            confirmed_at: None,
            manager_comment: None,
            audit_log: Vec::new(),
            branch_id: Some("1".to_string()),
        }
    }

    #[test]
    fn parse_currency_strips_separators() {
        assert_eq!(parse_currency("1.500.000"), 1_500_000);
        assert_eq!(parse_currency("1,500,000 đ"), 1_500_000);
        assert_eq!(parse_currency("500000"), 500_000);
        assert_eq!(parse_currency(""), 0);
        assert_eq!(parse_currency("abc"), 0);
    }

    #[test]
    fn approve_as_is_records_no_adjustment() {
        let mut record = record_with_closing(500_000, 200_000);
        approve(&mut record, "Quản lý", None, None, None);

        assert!(record.is_confirmed);
        assert_eq!(record.confirmed_by.as_deref(), Some("Quản lý"));
        assert!(record.confirmed_at.is_some());
        assert!(record.adjusted_closing_data.is_none());
        assert_eq!(record.audit_log.len(), 1);
        let entry = &record.audit_log[0];
        assert_eq!(entry.action, ACTION_APPROVE);
        assert_eq!(entry.comment.as_deref(), Some("Đối soát ca trực hoàn tất."));
        assert!(entry.changes.is_empty());
    }

    #[test]
    fn matching_override_is_not_an_adjustment() {
        let mut record = record_with_closing(500_000, 200_000);
        approve(&mut record, "Quản lý", Some(500_000), Some(200_000), None);
        assert!(record.adjusted_closing_data.is_none());
        assert!(record.audit_log[0].changes.is_empty());
    }

    #[test]
    fn differing_override_records_partial_adjustment_and_changes() {
        let mut record = record_with_closing(500_000, 200_000);
        approve(
            &mut record,
            "Quản lý",
            Some(480_000),
            Some(200_000),
            Some("Thiếu 20k tiền mặt.".to_string()),
        );

        let adjusted = record.adjusted_closing_data.as_ref().unwrap();
        assert_eq!(adjusted.total_cash, Some(480_000));
        assert_eq!(adjusted.total_transfer, None);
        assert_eq!(record.manager_comment.as_deref(), Some("Thiếu 20k tiền mặt."));

        let entry = &record.audit_log[0];
        assert_eq!(entry.changes.len(), 1);
        assert_eq!(entry.changes[0].field, FIELD_CASH);
        assert_eq!(entry.changes[0].from, 500_000);
        assert_eq!(entry.changes[0].to, 480_000);
    }

    #[test]
    fn reapproval_appends_audit_only() {
        let mut record = record_with_closing(500_000, 200_000);
        approve(&mut record, "Quản lý", Some(480_000), None, None);
        let confirmed_at = record.confirmed_at;

        approve(&mut record, "Quản lý khác", Some(999), Some(999), None);
        assert_eq!(record.audit_log.len(), 2);
        assert_eq!(record.confirmed_by.as_deref(), Some("Quản lý"));
        assert_eq!(record.confirmed_at, confirmed_at);
        assert_eq!(
            record.adjusted_closing_data.as_ref().unwrap().total_cash,
            Some(480_000)
        );
        assert!(record.audit_log[1].changes.is_empty());
    }

    #[test]
    fn aggregation_prefers_adjusted_values() {
        let mut adjusted = record_with_closing(500_000, 200_000);
        approve(&mut adjusted, "Quản lý", Some(480_000), None, None);
        let plain = record_with_closing(300_000, 100_000);
        let empty = {
            let mut r = record_with_closing(0, 0);
            r.closing_data = None;
            r
        };

        let totals = aggregate([&adjusted, &plain, &empty]);
        assert_eq!(totals.total_cash, 780_000);
        assert_eq!(totals.total_transfer, 300_000);
        assert_eq!(totals.total_revenue, 1_080_000);
        assert_eq!(totals.record_count, 3);
    }
}
