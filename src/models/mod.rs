pub mod assignment;
pub mod branch;
pub mod closing;
pub mod leave;
pub mod notice;
pub mod record;
pub mod user;

pub use assignment::{Assignment, ScheduleLog};
pub use branch::{Branch, ShiftConfig};
pub use closing::{AdjustedClosingData, AuditChange, DiscountDetail, ShiftAuditLog, ShiftClosingData};
pub use leave::{LeaveRequest, LeaveStatus, LeaveType};
pub use notice::{AppNotification, Regulation};
pub use record::{AttendanceStatus, Direction, RecordStatus, ShiftRecord};
pub use user::{Role, User, UserInfo, UserStatus};

/// Serde adapter for shift times on the wire: "HH:MM", matching the
/// original client payloads.
pub mod time_hm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Same as [`time_hm`], for optional fields (check-in/out times).
pub mod time_hm_opt {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            Some(s) => NaiveTime::parse_from_str(&s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super::time_hm")]
        time: NaiveTime,
    }

    #[test]
    fn shift_times_round_trip_as_hh_mm() {
        let json = r#"{"time":"08:05"}"#;
        let w: Wrapper = serde_json::from_str(json).unwrap();
        assert_eq!(w.time, NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        assert_eq!(serde_json::to_string(&w).unwrap(), json);
    }
}
