//! Fixed seed data written on first initialization.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use once_cell::sync::OnceCell;

use common::AppResult;
use domain::{
    profile::seed_history, Message, Password, PaymentStatus, Profile, User, UserRole,
    SEED_PASSWORD, WELCOME_MESSAGE,
};

use crate::database::Database;

/// Due date every seeded resident starts with
pub const SEED_PAYMENT_DATE: (i32, u32, u32) = (2026, 2, 5);

/// Number of generic department accounts (`d1`..`d5`)
pub const SEED_DEPARTMENTS: usize = 5;

/// Hash of the shared demo password, computed once per process.
static SEED_CREDENTIAL: OnceCell<Password> = OnceCell::new();

fn seed_credential() -> AppResult<Password> {
    let password = SEED_CREDENTIAL.get_or_try_init(|| Password::new(SEED_PASSWORD))?;
    Ok(password.clone())
}

fn seed_payment_date() -> NaiveDate {
    let (y, m, d) = SEED_PAYMENT_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn seed_user(id: &str, username: &str, role: UserRole, name: &str, password: &Password) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        password: password.clone(),
        role,
        name: name.to_string(),
    }
}

/// The demo tower apartment with WiFi already provisioned.
fn demo_resident_profile(today: NaiveDate) -> Profile {
    let mut welcome = Message::new(UserRole::Admin, WELCOME_MESSAGE);
    welcome.timestamp = Utc::now() - Duration::seconds(100);

    Profile {
        alias: String::new(),
        payment_status: PaymentStatus::Paid,
        next_payment_date: seed_payment_date(),
        internet_speed: 100,
        wifi_ssid: "Residencial_A101".to_string(),
        wifi_password: "Perez2026".to_string(),
        messages: vec![welcome],
        payment_history: seed_history(today),
    }
}

/// Seeded database: one admin, the demo resident and five departments.
pub fn seed_database(today: NaiveDate) -> AppResult<Database> {
    let password = seed_credential()?;

    let mut users = vec![
        seed_user("u1", "admin", UserRole::Admin, "Administrador", &password),
        seed_user("u2", "TorreA-101", UserRole::Resident, "Familia Perez", &password),
    ];
    let mut profiles = BTreeMap::new();
    profiles.insert("u2".to_string(), demo_resident_profile(today));

    for n in 1..=SEED_DEPARTMENTS {
        let id = format!("d{}", n);
        users.push(seed_user(
            &id,
            &format!("Departamento{}", n),
            UserRole::Resident,
            &format!("Departamento {}", n),
            &password,
        ));
        profiles.insert(id, Profile::new_default(today, seed_payment_date()));
    }

    Ok(Database { users, profiles })
}
