use chrono::{NaiveTime, Timelike};

use crate::models::{AttendanceStatus, Direction, ShiftConfig};

/// Grace period applied on entry only. Leaving before the configured end is
/// flagged immediately; this asymmetry is a deliberate business rule carried
/// over from the original attendance policy.
const CHECK_IN_GRACE_MINUTES: u32 = 5;

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Classify a check-in/out event against the configured shift boundary.
///
/// Pure and total: every (time, direction) pair maps to exactly one status,
/// and `Missed`/absence is never produced here — that is a reporting-layer
/// derivation for assignments with no record at all.
pub fn classify(actual: NaiveTime, config: &ShiftConfig, direction: Direction) -> AttendanceStatus {
    let actual = minutes_since_midnight(actual);
    match direction {
        Direction::CheckIn => {
            let boundary = minutes_since_midnight(config.start);
            if actual > boundary + CHECK_IN_GRACE_MINUTES {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::OnTime
            }
        }
        Direction::CheckOut => {
            let boundary = minutes_since_midnight(config.end);
            if actual < boundary {
                AttendanceStatus::EarlyLeave
            } else {
                AttendanceStatus::OnTime
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ShiftConfig {
        ShiftConfig {
            name: "Ca 1".to_string(),
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn check_in_within_grace_is_on_time() {
        assert_eq!(
            classify(at(8, 5), &config(), Direction::CheckIn),
            AttendanceStatus::OnTime
        );
    }

    #[test]
    fn check_in_past_grace_is_late() {
        assert_eq!(
            classify(at(8, 6), &config(), Direction::CheckIn),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn early_check_in_is_on_time() {
        assert_eq!(
            classify(at(7, 30), &config(), Direction::CheckIn),
            AttendanceStatus::OnTime
        );
    }

    #[test]
    fn check_out_before_end_is_early_leave() {
        assert_eq!(
            classify(at(11, 59), &config(), Direction::CheckOut),
            AttendanceStatus::EarlyLeave
        );
    }

    #[test]
    fn check_out_at_end_is_on_time() {
        assert_eq!(
            classify(at(12, 0), &config(), Direction::CheckOut),
            AttendanceStatus::OnTime
        );
    }

    #[test]
    fn classify_is_total_over_the_whole_day() {
        let config = config();
        for h in 0..24 {
            for m in 0..60 {
                for direction in [Direction::CheckIn, Direction::CheckOut] {
                    // Must not panic, and the result set is closed.
                    let status = classify(at(h, m), &config, direction);
                    assert!(matches!(
                        status,
                        AttendanceStatus::OnTime
                            | AttendanceStatus::Late
                            | AttendanceStatus::EarlyLeave
                    ));
                }
            }
        }
    }
}
