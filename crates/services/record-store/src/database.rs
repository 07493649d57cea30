//! The persisted database blob.
//!
//! Shape on disk: `{ "users": [User...], "profiles": { "<userId>": Profile } }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use domain::{Profile, User, UserRole};

/// Whole-database snapshot. Every read deserializes a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Insertion order is preserved
    pub users: Vec<User>,
    /// Resident profiles keyed by user id
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Database {
    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Exact, case-sensitive username lookup
    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn residents(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| u.role == UserRole::Resident)
    }

    /// Resident users paired with their profiles, skipping any without one
    pub fn resident_profiles(&self) -> impl Iterator<Item = (&User, &Profile)> {
        self.residents()
            .filter_map(|u| self.profiles.get(&u.id).map(|p| (u, p)))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
