//! Resident profile, messages and billing history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{self, payment_date};
use crate::constants::{DEFAULT_BILLING_AMOUNT, DEFAULT_INTERNET_SPEED, WELCOME_MESSAGE};
use crate::error::DomainError;
use crate::user::UserRole;

/// Billing state of a resident or of one billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            "overdue" => Ok(PaymentStatus::Overdue),
            other => Err(DomainError::validation(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
        };
        f.write_str(s)
    }
}

/// A chat message between the administration and one resident.
///
/// Immutable once created except for `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub from: UserRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// New unread message stamped now
    pub fn new(from: UserRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            text: text.into(),
            timestamp: Utc::now(),
            read: false,
        }
    }

    /// Resident-authored and not yet seen by the administration
    pub fn is_unread_from_resident(&self) -> bool {
        self.from.is_resident() && !self.read
    }
}

/// Input for appending a message
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub from: UserRole,
    pub text: String,
}

/// One row of a resident's billing history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingHistoryEntry {
    pub id: Uuid,
    pub period: String,
    #[serde(with = "payment_date")]
    pub date: NaiveDate,
    pub amount: String,
    pub status: PaymentStatus,
}

impl BillingHistoryEntry {
    /// Apply a partial update. Only supplied fields change.
    pub fn apply(&mut self, update: HistoryItemUpdate) {
        if let Some(period) = update.period {
            self.period = period;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// Input for appending a billing-history entry
#[derive(Debug, Clone)]
pub struct NewHistoryItem {
    pub period: String,
    pub date: NaiveDate,
    pub amount: String,
    pub status: PaymentStatus,
}

impl NewHistoryItem {
    /// Materialise with a fresh id
    pub fn into_entry(self) -> BillingHistoryEntry {
        BillingHistoryEntry {
            id: Uuid::new_v4(),
            period: self.period,
            date: self.date,
            amount: self.amount,
            status: self.status,
        }
    }
}

/// Partial billing-history update
#[derive(Debug, Clone, Default)]
pub struct HistoryItemUpdate {
    pub period: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<String>,
    pub status: Option<PaymentStatus>,
}

/// Per-resident service record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Display override; empty means none
    #[serde(default)]
    pub alias: String,
    pub payment_status: PaymentStatus,
    #[serde(with = "payment_date")]
    pub next_payment_date: NaiveDate,
    /// Mbps. Forms bound it to 0..=200; the store does not.
    pub internet_speed: u32,
    #[serde(rename = "wifiSSID", default)]
    pub wifi_ssid: String,
    #[serde(rename = "wifiPass", default)]
    pub wifi_password: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub payment_history: Vec<BillingHistoryEntry>,
}

impl Profile {
    /// Default profile for a resident created on `today`.
    pub fn new_default(today: NaiveDate, next_payment_date: NaiveDate) -> Self {
        Self {
            alias: String::new(),
            payment_status: PaymentStatus::Pending,
            next_payment_date,
            internet_speed: DEFAULT_INTERNET_SPEED,
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            messages: vec![Message::new(UserRole::Admin, WELCOME_MESSAGE)],
            payment_history: seed_history(today),
        }
    }

    /// Alias if one is set
    pub fn alias(&self) -> Option<&str> {
        if self.alias.is_empty() {
            None
        } else {
            Some(&self.alias)
        }
    }

    /// WiFi credentials when both SSID and password are configured
    pub fn wifi_credentials(&self) -> Option<(&str, &str)> {
        if self.wifi_ssid.is_empty() || self.wifi_password.is_empty() {
            None
        } else {
            Some((&self.wifi_ssid, &self.wifi_password))
        }
    }

    /// Merge supplied fields.
    ///
    /// When the payment status is among them, the last history entry (by
    /// position, not by date) takes the same status.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(alias) = update.alias {
            self.alias = alias;
        }
        if let Some(next_payment_date) = update.next_payment_date {
            self.next_payment_date = next_payment_date;
        }
        if let Some(internet_speed) = update.internet_speed {
            self.internet_speed = internet_speed;
        }
        if let Some(wifi_ssid) = update.wifi_ssid {
            self.wifi_ssid = wifi_ssid;
        }
        if let Some(wifi_password) = update.wifi_password {
            self.wifi_password = wifi_password;
        }
        if let Some(status) = update.payment_status {
            self.payment_status = status;
            if let Some(last) = self.payment_history.last_mut() {
                last.status = status;
            }
        }
    }

    /// Resident messages the administration has not seen
    pub fn unread_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_unread_from_resident())
            .count()
    }

    /// Flag every unread resident message as read; returns how many flipped
    pub fn mark_resident_messages_read(&mut self) -> usize {
        let mut changed = 0;
        for message in self
            .messages
            .iter_mut()
            .filter(|m| m.is_unread_from_resident())
        {
            message.read = true;
            changed += 1;
        }
        changed
    }

    /// Position of a history entry by id
    pub fn history_position(&self, item_id: Uuid) -> Option<usize> {
        self.payment_history.iter().position(|h| h.id == item_id)
    }
}

/// Partial profile update (merge semantics)
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub alias: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub next_payment_date: Option<NaiveDate>,
    pub internet_speed: Option<u32>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

/// Two starting history rows: last month paid, this month pending.
pub fn seed_history(today: NaiveDate) -> Vec<BillingHistoryEntry> {
    let last_month = calendar::previous_month(today);
    vec![
        BillingHistoryEntry {
            id: Uuid::new_v4(),
            period: calendar::period_label(last_month),
            date: last_month,
            amount: DEFAULT_BILLING_AMOUNT.to_string(),
            status: PaymentStatus::Paid,
        },
        BillingHistoryEntry {
            id: Uuid::new_v4(),
            period: calendar::period_label(today),
            date: today,
            amount: DEFAULT_BILLING_AMOUNT.to_string(),
            status: PaymentStatus::Pending,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_profile() -> Profile {
        Profile::new_default(date(2026, 1, 20), date(2026, 2, 5))
    }

    #[test]
    fn test_default_profile() {
        let profile = sample_profile();

        assert_eq!(profile.payment_status, PaymentStatus::Pending);
        assert_eq!(profile.internet_speed, 150);
        assert_eq!(profile.messages.len(), 1);
        assert_eq!(profile.messages[0].from, UserRole::Admin);
        assert!(!profile.messages[0].read);
        assert_eq!(profile.payment_history.len(), 2);
        assert_eq!(profile.payment_history[0].period, "diciembre 2025");
        assert_eq!(profile.payment_history[0].status, PaymentStatus::Paid);
        assert_eq!(profile.payment_history[1].period, "enero 2026");
        assert_eq!(profile.payment_history[1].status, PaymentStatus::Pending);
        assert!(profile.alias().is_none());
        assert!(profile.wifi_credentials().is_none());
    }

    #[test]
    fn test_status_sync_updates_last_entry_only() {
        let mut profile = sample_profile();
        profile.apply(ProfileUpdate {
            payment_status: Some(PaymentStatus::Overdue),
            ..Default::default()
        });

        assert_eq!(profile.payment_status, PaymentStatus::Overdue);
        assert_eq!(profile.payment_history[0].status, PaymentStatus::Paid);
        assert_eq!(profile.payment_history[1].status, PaymentStatus::Overdue);
    }

    #[test]
    fn test_status_sync_uses_position_not_date() {
        let mut profile = sample_profile();
        profile.payment_history.push(BillingHistoryEntry {
            id: Uuid::new_v4(),
            period: "marzo 2020".to_string(),
            date: date(2020, 3, 1),
            amount: "$1.00".to_string(),
            status: PaymentStatus::Pending,
        });
        profile.apply(ProfileUpdate {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        });

        assert_eq!(profile.payment_history[1].status, PaymentStatus::Pending);
        assert_eq!(profile.payment_history[2].status, PaymentStatus::Paid);
    }

    #[test]
    fn test_status_update_with_empty_history() {
        let mut profile = sample_profile();
        profile.payment_history.clear();
        profile.apply(ProfileUpdate {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        });

        assert_eq!(profile.payment_status, PaymentStatus::Paid);
        assert!(profile.payment_history.is_empty());
    }

    #[test]
    fn test_merge_leaves_other_fields() {
        let mut profile = sample_profile();
        let before = profile.clone();
        profile.apply(ProfileUpdate {
            internet_speed: Some(75),
            ..Default::default()
        });

        assert_eq!(profile.internet_speed, 75);
        profile.internet_speed = before.internet_speed;
        assert_eq!(profile, before);
    }

    #[test]
    fn test_mark_read_skips_admin_messages() {
        let mut profile = sample_profile();
        profile.messages.push(Message::new(UserRole::Resident, "hola"));
        profile.messages.push(Message::new(UserRole::Resident, "sigue sin internet"));

        assert_eq!(profile.unread_count(), 2);
        assert_eq!(profile.mark_resident_messages_read(), 2);
        assert_eq!(profile.unread_count(), 0);
        assert!(!profile.messages[0].read);
        assert_eq!(profile.mark_resident_messages_read(), 0);
    }

    #[test]
    fn test_history_entry_apply() {
        let mut entry = sample_profile().payment_history.remove(0);
        let id = entry.id;
        entry.apply(HistoryItemUpdate {
            amount: Some("$3,000.00".to_string()),
            ..Default::default()
        });

        assert_eq!(entry.id, id);
        assert_eq!(entry.amount, "$3,000.00");
        assert_eq!(entry.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_profile_json_field_names() {
        let mut profile = sample_profile();
        profile.wifi_ssid = "Residencial_A101".to_string();
        profile.wifi_password = "Perez2026".to_string();
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["paymentStatus"], "pending");
        assert_eq!(json["nextPaymentDate"], "2026-02-05");
        assert_eq!(json["internetSpeed"], 150);
        assert_eq!(json["wifiSSID"], "Residencial_A101");
        assert_eq!(json["wifiPass"], "Perez2026");
        assert_eq!(json["messages"][0]["from"], "admin");
        assert_eq!(json["paymentHistory"][1]["status"], "pending");
    }

    #[test]
    fn test_message_read_defaults_false() {
        let json = r#"{
            "id": "6f1c1c1e-9a55-4c1e-8a43-0d6f3f1b2a10",
            "from": "resident",
            "text": "hola",
            "timestamp": "2026-01-20T10:00:00Z"
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert!(!message.read);
        assert!(message.is_unread_from_resident());
    }
}
