//! The persisted session record and page redirects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::AppError;
use domain::{SessionUser, LOGIN_PAGE, RESIDENT_PAGE};

/// Who is acting, as captured at login.
///
/// The user snapshot is not refreshed when the account is edited later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: SessionUser) -> Self {
        Self {
            user,
            signed_in_at: Utc::now(),
        }
    }
}

/// Page a caller must be sent to instead of the one it asked for.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    #[error("sign-in required, redirecting to {}", LOGIN_PAGE)]
    ToLogin,

    #[error("admin role required, redirecting to {}", RESIDENT_PAGE)]
    ToResidentDashboard,
}

impl Redirect {
    /// Landing page path
    pub fn target(&self) -> &'static str {
        match self {
            Redirect::ToLogin => LOGIN_PAGE,
            Redirect::ToResidentDashboard => RESIDENT_PAGE,
        }
    }
}

impl From<Redirect> for AppError {
    fn from(redirect: Redirect) -> Self {
        match redirect {
            Redirect::ToLogin => AppError::Unauthorized,
            Redirect::ToResidentDashboard => AppError::Forbidden,
        }
    }
}
