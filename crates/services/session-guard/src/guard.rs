//! Session guard - establishes the current actor and gates pages by role.
//!
//! Credentials are checked against the record store; the session itself is a
//! snapshot persisted under its own key next to the database blob.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

use common::{AppError, AppResult};
use domain::{CreateUser, Password, SessionUser, UserRole, SESSION_KEY};
use record_store_lib::{KeyValueStore, RecordStore};

use crate::session::{Redirect, Session};

/// Hash checked when the username is unknown so both failure paths do the
/// same work.
static DECOY_CREDENTIAL: Lazy<Option<Password>> =
    Lazy::new(|| Password::new("portal-decoy-credential").ok());

pub struct SessionGuard {
    records: Arc<RecordStore>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionGuard {
    /// Guard persisting its session into the same backend as `records`.
    pub fn new(records: Arc<RecordStore>) -> Self {
        let storage = records.storage();
        Self { records, storage }
    }

    /// Guard persisting its session into a separate backend.
    pub fn with_storage(records: Arc<RecordStore>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { records, storage }
    }

    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    /// Check credentials and start a session.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown user and for a wrong password
    /// alike.
    pub fn login(&self, username: &str, password: &str) -> AppResult<SessionUser> {
        let user = self.records.find_user_by_username(username)?;

        let verified = match &user {
            Some(user) => user.verify_password(password),
            None => {
                if let Some(decoy) = DECOY_CREDENTIAL.as_ref() {
                    let _ = decoy.verify(password);
                }
                false
            }
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                info!(username = %username, "login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let session = Session::new(SessionUser::from(user));
        self.storage
            .set(SESSION_KEY, &serde_json::to_string(&session)?)?;

        info!(user_id = %session.user.id, role = %session.user.role, "signed in");
        Ok(session.user)
    }

    /// Create a resident named after its username and sign it in.
    ///
    /// # Errors
    /// `DuplicateUsername` when the username is taken.
    pub fn register(&self, username: &str, password: &str) -> AppResult<SessionUser> {
        let user = self.records.create_user(CreateUser {
            username: username.to_string(),
            password: password.to_string(),
            role: UserRole::Resident,
            name: username.to_string(),
        })?;
        info!(user_id = %user.id, "resident registered");

        self.login(username, password)
    }

    /// The signed-in user, if any. An unreadable record counts as none.
    pub fn current_user(&self) -> AppResult<Option<SessionUser>> {
        Ok(self.current_session()?.map(|s| s.user))
    }

    pub fn current_session(&self) -> AppResult<Option<Session>> {
        let Some(raw) = self.storage.get(SESSION_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "session record is unreadable, treating as signed out");
                Ok(None)
            }
        }
    }

    pub fn logout(&self) -> AppResult<()> {
        self.storage.remove(SESSION_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    /// Current user, or a redirect to the login page.
    pub fn require_authenticated(&self) -> AppResult<Result<SessionUser, Redirect>> {
        Ok(self.current_user()?.ok_or(Redirect::ToLogin))
    }

    /// Current admin, or a redirect to the login page or resident landing.
    pub fn require_admin(&self) -> AppResult<Result<SessionUser, Redirect>> {
        Ok(self.require_authenticated()?.and_then(|user| {
            if user.is_admin() {
                Ok(user)
            } else {
                debug!(user_id = %user.id, "admin page refused");
                Err(Redirect::ToResidentDashboard)
            }
        }))
    }
}
