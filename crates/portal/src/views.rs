//! View models rebuilt from a fresh store snapshot on every render.

use chrono::NaiveDate;
use uuid::Uuid;

use common::AppResult;
use domain::{
    calendar,
    display::{self, StatusColors},
    wifi, BillingHistoryEntry, Message, PaymentStatus, Profile, User, UserRole,
};

/// Label shown in place of a missing alias
pub const ADD_ALIAS_LABEL: &str = "+ Agregar Alias";

/// SSID placeholder while WiFi is not configured
pub const WIFI_PENDING_LABEL: &str = "Pendiente de configurar";

/// Password placeholder while WiFi is not configured
pub const MASKED_PASSWORD: &str = "••••••••";

/// QR placeholder in the client manager
pub const QR_PLACEHOLDER: &str = "Ingrese SSID y Contraseña para ver QR";

/// Resident's own messages
pub const OWN_AUTHOR_LABEL: &str = "Tú";

/// Messages written by the administration
pub const ADMIN_AUTHOR_LABEL: &str = "Administración";

/// Payment status as the portal renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub status: PaymentStatus,
    pub label: &'static str,
    pub css_class: &'static str,
    pub colors: StatusColors,
}

impl From<PaymentStatus> for StatusBadge {
    fn from(status: PaymentStatus) -> Self {
        Self {
            status,
            label: display::status_label(status),
            css_class: display::status_class(status),
            colors: display::status_colors(status),
        }
    }
}

/// One row of the admin resident table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentRow {
    pub user_id: String,
    pub username: String,
    pub alias: Option<String>,
    pub badge: StatusBadge,
    pub next_payment_date: String,
    pub internet_speed: u32,
    pub unread: usize,
}

impl ResidentRow {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            alias: profile.alias().map(str::to_string),
            badge: profile.payment_status.into(),
            next_payment_date: calendar::format_long(profile.next_payment_date),
            internet_speed: profile.internet_speed,
            unread: profile.unread_count(),
        }
    }

    pub fn has_unread(&self) -> bool {
        self.unread > 0
    }
}

/// A chat bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub id: Uuid,
    pub from: UserRole,
    pub author: String,
    pub text: String,
    pub time: String,
    /// Written by whoever is looking at the transcript
    pub outgoing: bool,
    pub read: bool,
}

impl ChatLine {
    /// Bubble as the administration sees it
    pub fn for_admin(message: &Message, resident_label: &str) -> Self {
        let outgoing = message.from.is_admin();
        let author = if outgoing {
            ADMIN_AUTHOR_LABEL
        } else {
            resident_label
        };
        Self::build(message, author, outgoing)
    }

    /// Bubble as the resident sees it
    pub fn for_resident(message: &Message) -> Self {
        let outgoing = message.from.is_resident();
        let author = if outgoing {
            OWN_AUTHOR_LABEL
        } else {
            ADMIN_AUTHOR_LABEL
        };
        Self::build(message, author, outgoing)
    }

    fn build(message: &Message, author: &str, outgoing: bool) -> Self {
        Self {
            id: message.id,
            from: message.from,
            author: author.to_string(),
            text: message.text.clone(),
            time: calendar::format_chat_timestamp(message.timestamp),
            outgoing,
            read: message.read,
        }
    }
}

/// Admin chat with one resident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub user_id: String,
    pub title: String,
    pub lines: Vec<ChatLine>,
}

/// One billing-history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: Uuid,
    pub period: String,
    pub date: NaiveDate,
    pub amount: String,
    pub badge: StatusBadge,
}

impl From<&BillingHistoryEntry> for HistoryRow {
    fn from(entry: &BillingHistoryEntry) -> Self {
        Self {
            id: entry.id,
            period: entry.period.clone(),
            date: entry.date,
            amount: entry.amount.clone(),
            badge: entry.status.into(),
        }
    }
}

/// WiFi block, configured or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiView {
    Configured {
        ssid: String,
        password: String,
        qr_url: String,
    },
    Pending,
}

impl WifiView {
    pub fn from_profile(profile: &Profile, qr_service_url: &str) -> AppResult<Self> {
        match profile.wifi_credentials() {
            Some((ssid, password)) => Ok(WifiView::Configured {
                ssid: ssid.to_string(),
                password: password.to_string(),
                qr_url: wifi::qr_image_url(qr_service_url, ssid, password)?,
            }),
            None => Ok(WifiView::Pending),
        }
    }

    pub fn qr_url(&self) -> Option<&str> {
        match self {
            WifiView::Configured { qr_url, .. } => Some(qr_url),
            WifiView::Pending => None,
        }
    }

    /// SSID text to display
    pub fn ssid_label(&self) -> &str {
        match self {
            WifiView::Configured { ssid, .. } => ssid,
            WifiView::Pending => WIFI_PENDING_LABEL,
        }
    }

    /// Password text to display
    pub fn password_label(&self) -> &str {
        match self {
            WifiView::Configured { password, .. } => password,
            WifiView::Pending => MASKED_PASSWORD,
        }
    }
}

/// The client manager dialog for one resident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerView {
    pub user_id: String,
    pub title: String,
    pub username: String,
    pub alias: String,
    pub badge: StatusBadge,
    pub next_payment_date: NaiveDate,
    pub internet_speed: u32,
    pub wifi_ssid: String,
    pub wifi_password: String,
    pub wifi: WifiView,
    /// Newest first
    pub history: Vec<HistoryRow>,
}

impl ManagerView {
    pub fn new(user: &User, profile: &Profile, qr_service_url: &str) -> AppResult<Self> {
        let title = match profile.alias() {
            Some(alias) => format!("{} ({})", user.username, alias),
            None => user.username.clone(),
        };

        Ok(Self {
            user_id: user.id.clone(),
            title,
            username: user.username.clone(),
            alias: profile.alias.clone(),
            badge: profile.payment_status.into(),
            next_payment_date: profile.next_payment_date,
            internet_speed: profile.internet_speed,
            wifi_ssid: profile.wifi_ssid.clone(),
            wifi_password: profile.wifi_password.clone(),
            wifi: WifiView::from_profile(profile, qr_service_url)?,
            history: profile.payment_history.iter().rev().map(HistoryRow::from).collect(),
        })
    }
}

/// Everything the resident dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub display_name: String,
    pub alias_label: String,
    pub has_alias: bool,
    pub badge: StatusBadge,
    pub next_payment_date: String,
    pub internet_speed: u32,
    /// Speed gauge fill, 0..=100, on a 200 Mbps scale
    pub speed_percent: u8,
    pub messages: Vec<ChatLine>,
    pub wifi: WifiView,
}

impl DashboardView {
    pub fn new(display_name: &str, profile: &Profile, qr_service_url: &str) -> AppResult<Self> {
        let alias = profile.alias();
        Ok(Self {
            display_name: display_name.to_string(),
            alias_label: alias.unwrap_or(ADD_ALIAS_LABEL).to_string(),
            has_alias: alias.is_some(),
            badge: profile.payment_status.into(),
            next_payment_date: calendar::format_long(profile.next_payment_date),
            internet_speed: profile.internet_speed,
            speed_percent: speed_percent(profile.internet_speed),
            messages: profile.messages.iter().map(ChatLine::for_resident).collect(),
            wifi: WifiView::from_profile(profile, qr_service_url)?,
        })
    }
}

fn speed_percent(speed: u32) -> u8 {
    let scaled = u64::from(speed) * 100 / u64::from(domain::MAX_INTERNET_SPEED);
    scaled.min(100) as u8
}
