use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One discounted bill inside a closing report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountDetail {
    pub bill_id: String,
    pub reason: String,
    pub amount: i64,
}

/// End-of-shift financial report submitted by staff (or attached by a
/// manager). Monetary amounts are in the smallest currency unit (VND has
/// no fractional part).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftClosingData {
    pub total_bills: i64,
    pub total_transfer: i64,
    pub total_cash: i64,
    /// Derived: always the sum of `discounts_details` amounts.
    pub total_discounts: i64,
    #[serde(default)]
    pub discounts_details: Vec<DiscountDetail>,
    pub opening_balance: i64,
    pub closing_balance: i64,
    #[serde(default)]
    pub incidents: String,
    #[serde(default)]
    pub customer_feedback: String,
}

impl ShiftClosingData {
    /// Recompute the derived discount total from the detail lines.
    pub fn normalized(mut self) -> Self {
        self.total_discounts = self.discounts_details.iter().map(|d| d.amount).sum();
        self
    }

    pub fn has_negative_amount(&self) -> bool {
        self.total_bills < 0
            || self.total_transfer < 0
            || self.total_cash < 0
            || self.opening_balance < 0
            || self.closing_balance < 0
            || self.discounts_details.iter().any(|d| d.amount < 0)
    }
}

/// Manager override of a closing report. Partial: only the fields the
/// manager actually changed are set; everything else reads through to the
/// staff-submitted values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedClosingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cash: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transfer: Option<i64>,
}

/// A single field change recorded in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditChange {
    pub field: String,
    pub from: i64,
    pub to: i64,
}

/// Append-only record of a reconciliation action on a shift record.
/// Entries are never edited or removed once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAuditLog {
    pub id: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<AuditChange>,
}

impl ShiftAuditLog {
    pub fn new(action: &str, user_name: &str, comment: Option<String>) -> Self {
        ShiftAuditLog {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            timestamp: Utc::now(),
            user_name: user_name.to_string(),
            comment,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(mut self, changes: Vec<AuditChange>) -> Self {
        self.changes = changes;
        self
    }
}
