//! User domain entity and related types.

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_RESIDENT};
use crate::error::DomainError;
use crate::password::Password;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Resident,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Check if this role owns a resident profile
    pub fn is_resident(&self) -> bool {
        matches!(self, UserRole::Resident)
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_RESIDENT => Ok(UserRole::Resident),
            other => Err(DomainError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::Resident => write!(f, "{}", ROLE_RESIDENT),
        }
    }
}

/// User identity record as persisted in the database blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(rename = "passwordHash")]
    pub password: Password,
    pub role: UserRole,
    pub name: String,
}

impl User {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if user is a resident
    pub fn is_resident(&self) -> bool {
        self.role.is_resident()
    }

    /// Check a plain text password against the stored credential
    pub fn verify_password(&self, plain_text: &str) -> bool {
        self.password.verify(plain_text)
    }

    /// Apply a partial update. Only supplied fields change.
    ///
    /// The password in `changes` must already be hashed by the caller.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(password) = changes.password {
            self.password = password;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
    }
}

/// User creation input
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    /// Unique login name (case-sensitive)
    pub username: String,
    /// Plain text password, hashed before storage
    pub password: String,
    pub role: UserRole,
    /// Display name
    pub name: String,
}

/// User update input (plain text password)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub name: Option<String>,
}

impl UpdateUser {
    /// Hash the password (if any) and produce changes ready to apply.
    pub fn into_changes(self) -> Result<UserChanges, DomainError> {
        let password = self.password.as_deref().map(Password::new).transpose()?;
        Ok(UserChanges {
            username: self.username,
            password,
            role: self.role,
            name: self.name,
        })
    }
}

/// User update with the credential already hashed
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<Password>,
    pub role: Option<UserRole>,
    pub name: Option<String>,
}

/// User snapshot without credentials (what a session carries)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub name: String,
}

impl SessionUser {
    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            name: user.name,
        }
    }
}
