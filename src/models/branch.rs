use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A configured work interval defined per branch, keyed in
/// `Branch::shifts` by a shift-type key such as `SHIFT_1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftConfig {
    pub name: String,
    #[serde(with = "super::time_hm")]
    pub start: NaiveTime,
    #[serde(with = "super::time_hm")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Allowed check-in radius around (lat, lng), in meters.
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Shift-type key -> configured interval. Business logic assumes every
    /// referenced key is present; readers degrade to the raw key when not.
    #[serde(default)]
    pub shifts: BTreeMap<String, ShiftConfig>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Branch {
    pub fn shift_config(&self, shift_type: &str) -> Option<&ShiftConfig> {
        self.shifts.get(shift_type)
    }

    /// Friendly shift name, or the raw key when the config is missing
    /// (soft data-integrity degradation, never blocks the workflow).
    pub fn shift_name(&self, shift_type: &str) -> String {
        match self.shift_config(shift_type) {
            Some(config) => config.name.clone(),
            None => {
                log::warn!(
                    "Branch {} has no shift config for key {}",
                    self.id,
                    shift_type
                );
                shift_type.to_string()
            }
        }
    }
}
