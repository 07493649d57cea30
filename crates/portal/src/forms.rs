//! Input forms submitted by the admin console, validated before they reach
//! the record store.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{
    HistoryItemUpdate, NewHistoryItem, PaymentStatus, ProfileUpdate, UpdateUser, UserRole,
};

/// Validate a form, surfacing the first failing field's message.
pub fn validated<T: Validate>(form: T) -> AppResult<T> {
    form.validate().map_err(|e| {
        let message = e
            .field_errors()
            .values()
            .next()
            .and_then(|errors| errors.first())
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Datos inválidos".to_string());
        AppError::validation(message)
    })?;
    Ok(form)
}

/// Trimmed text, `None` when nothing is left.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Account and alias edits from the client manager.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, message = "El usuario no puede estar vacío"))]
    pub username: String,
    pub alias: String,
    /// Blank keeps the current password
    pub password: Option<String>,
}

impl ProfileForm {
    pub fn new(username: &str, alias: &str, password: Option<&str>) -> Self {
        Self {
            username: username.trim().to_string(),
            alias: alias.trim().to_string(),
            password: password.and_then(non_empty),
        }
    }

    pub(crate) fn into_updates(self) -> (UpdateUser, ProfileUpdate) {
        let user = UpdateUser {
            username: Some(self.username),
            password: self.password,
            ..Default::default()
        };
        let profile = ProfileUpdate {
            alias: Some(self.alias),
            ..Default::default()
        };
        (user, profile)
    }
}

/// Billing status, service speed and WiFi settings, saved together.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceForm {
    pub payment_status: PaymentStatus,
    /// `None` keeps the stored date
    pub next_payment_date: Option<NaiveDate>,
    #[validate(range(max = 200, message = "La velocidad debe estar entre 0 y 200 Mbps"))]
    pub internet_speed: u32,
    pub wifi_ssid: String,
    pub wifi_password: String,
}

impl ServiceForm {
    pub(crate) fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            payment_status: Some(self.payment_status),
            next_payment_date: self.next_payment_date,
            internet_speed: Some(self.internet_speed),
            wifi_ssid: Some(self.wifi_ssid.trim().to_string()),
            wifi_password: Some(self.wifi_password.trim().to_string()),
            ..Default::default()
        }
    }
}

/// A billing-history row being added or edited.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HistoryForm {
    /// Present when editing an existing row
    pub id: Option<Uuid>,
    pub period: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "El monto es obligatorio"))]
    pub amount: String,
    pub status: PaymentStatus,
}

impl HistoryForm {
    pub(crate) fn into_new_item(self) -> NewHistoryItem {
        NewHistoryItem {
            period: self.period,
            date: self.date,
            amount: self.amount,
            status: self.status,
        }
    }

    pub(crate) fn into_update(self) -> HistoryItemUpdate {
        HistoryItemUpdate {
            period: Some(self.period),
            date: Some(self.date),
            amount: Some(self.amount),
            status: Some(self.status),
        }
    }
}

/// Account created from the admin console.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUserForm {
    #[validate(length(min = 1, message = "El usuario es obligatorio"))]
    pub username: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
    pub role: UserRole,
}

impl NewUserForm {
    pub fn new(username: &str, password: &str, role: UserRole) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.trim().to_string(),
            role,
        }
    }
}
