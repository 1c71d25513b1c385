//! Attendance reporting: display status derivation for roster cells and the
//! CSV export consumed by spreadsheet tools.

use chrono::{NaiveDate, NaiveTime};

use crate::models::{RecordStatus, ShiftRecord};

/// What a roster cell shows for an assignment, with or without a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Completed,
    Pending,
    Absent,
}

impl DisplayStatus {
    pub fn label(self) -> &'static str {
        match self {
            DisplayStatus::Completed => "Hoàn thành",
            DisplayStatus::Pending => "Đang trực",
            DisplayStatus::Absent => "Vắng mặt",
        }
    }
}

/// A stored record speaks for itself. Without one, an assignment whose date
/// has passed is an absence; today and future dates are still pending.
/// Nothing is written back; absence exists only in this derived view.
pub fn derive_display_status(
    record: Option<&ShiftRecord>,
    date: NaiveDate,
    as_of: NaiveDate,
) -> DisplayStatus {
    match record {
        Some(r) => match r.status {
            RecordStatus::Completed => DisplayStatus::Completed,
            RecordStatus::Pending => DisplayStatus::Pending,
            RecordStatus::Absent => DisplayStatus::Absent,
        },
        None => {
            if date < as_of {
                DisplayStatus::Absent
            } else {
                DisplayStatus::Pending
            }
        }
    }
}

/// One exported attendance line, already resolved to display strings except
/// for the times and hours.
#[derive(Debug, Clone)]
pub struct AttendanceRow {
    pub user_name: String,
    pub date: NaiveDate,
    pub shift_name: String,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: DisplayStatus,
}

/// Worked duration in hours, one decimal. Open or absent shifts export as
/// zero rather than a blank so the column stays numeric.
pub fn working_hours(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> f64 {
    match (check_in, check_out) {
        (Some(start), Some(end)) if end > start => {
            let minutes = (end - start).num_minutes() as f64;
            (minutes / 60.0 * 10.0).round() / 10.0
        }
        _ => 0.0,
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render rows as CSV. The leading BOM makes Excel decode the Vietnamese
/// headers as UTF-8 instead of the locale codepage.
pub fn export_csv(rows: &[AttendanceRow]) -> String {
    let mut out = String::from("\u{FEFF}");
    out.push_str("Nhân viên,Ngày,Ca trực,Check-in,Check-out,Số giờ làm,Trạng thái\n");
    for row in rows {
        let fields = [
            csv_field(&row.user_name),
            row.date.format("%d/%m/%Y").to_string(),
            csv_field(&row.shift_name),
            row.check_in
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            row.check_out
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            format!("{:.1}", working_hours(row.check_in, row.check_out)),
            row.status.label().to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn missing_record_in_the_past_is_absent() {
        assert_eq!(
            derive_display_status(None, day(19), day(20)),
            DisplayStatus::Absent
        );
        assert_eq!(
            derive_display_status(None, day(20), day(20)),
            DisplayStatus::Pending
        );
        assert_eq!(
            derive_display_status(None, day(21), day(20)),
            DisplayStatus::Pending
        );
    }

    #[test]
    fn stored_record_status_wins_over_date() {
        let record = ShiftRecord {
            id: "s-2024-03-19-staff_1-SHIFT_1".to_string(),
            user_id: "staff_1".to_string(),
            user_name: None,
            user_avatar: None,
            date: day(19),
            shift_type: "SHIFT_1".to_string(),
            check_in_time: Some(at(8, 0)),
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
            branch_id: None,
        };
        // The date is in the past but the record says the shift is open.
        assert_eq!(
            derive_display_status(Some(&record), day(19), day(20)),
            DisplayStatus::Pending
        );
    }

    #[test]
    fn hours_round_to_one_decimal() {
        assert_eq!(working_hours(Some(at(8, 0)), Some(at(12, 0))), 4.0);
        assert_eq!(working_hours(Some(at(8, 0)), Some(at(12, 10))), 4.2);
        assert_eq!(working_hours(Some(at(8, 0)), None), 0.0);
        assert_eq!(working_hours(None, Some(at(12, 0))), 0.0);
        // Clock inversion degrades to zero instead of a negative figure.
        assert_eq!(working_hours(Some(at(12, 0)), Some(at(8, 0))), 0.0);
    }

    #[test]
    fn csv_has_bom_headers_and_labels() {
        let rows = vec![AttendanceRow {
            user_name: "Nhân viên 1".to_string(),
            date: day(20),
            shift_name: "Ca 1".to_string(),
            check_in: Some(at(8, 2)),
            check_out: Some(at(12, 0)),
            status: DisplayStatus::Completed,
        }];
        let csv = export_csv(&rows);
        assert!(csv.starts_with('\u{FEFF}'));
        let mut lines = csv.trim_start_matches('\u{FEFF}').lines();
        assert_eq!(
            lines.next(),
            Some("Nhân viên,Ngày,Ca trực,Check-in,Check-out,Số giờ làm,Trạng thái")
        );
        assert_eq!(
            lines.next(),
            Some("Nhân viên 1,20/03/2024,Ca 1,08:02,12:00,4.0,Hoàn thành")
        );
    }

    #[test]
    fn csv_escapes_embedded_commas() {
        let rows = vec![AttendanceRow {
            user_name: "Trần, Văn A".to_string(),
            date: day(20),
            shift_name: "Ca 1".to_string(),
            check_in: None,
            check_out: None,
            status: DisplayStatus::Absent,
        }];
        let csv = export_csv(&rows);
        assert!(csv.contains("\"Trần, Văn A\",20/03/2024,Ca 1,,,0.0,Vắng mặt"));
    }
}
