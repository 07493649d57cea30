//! Resident dashboard - billing badge, speed, WiFi and the chat with the
//! administration.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use common::{AppError, AppResult, OptionExt};
use domain::{Message, NewMessage, Profile, ProfileUpdate, SessionUser, UserRole};
use record_store_lib::RecordStore;
use session_guard_lib::{Redirect, SessionGuard};

use crate::forms::non_empty;
use crate::notify::{Notifier, RESIDENT_NOTIFICATION_TITLE};
use crate::poller::MessageWatch;
use crate::views::{DashboardView, HistoryRow};

pub struct ResidentDashboard {
    user: SessionUser,
    records: Arc<RecordStore>,
    notifier: Arc<dyn Notifier>,
    qr_service_url: String,
    watch: Mutex<MessageWatch>,
}

impl ResidentDashboard {
    /// Open the dashboard for whoever is signed in.
    pub async fn open(
        guard: &SessionGuard,
        notifier: Arc<dyn Notifier>,
        qr_service_url: impl Into<String>,
    ) -> AppResult<Result<Self, Redirect>> {
        let user = match guard.require_authenticated()? {
            Ok(user) => user,
            Err(redirect) => return Ok(Err(redirect)),
        };

        if !notifier.request_permission().await {
            debug!("notification permission denied");
        }
        info!(user_id = %user.id, "resident dashboard opened");

        Ok(Ok(Self {
            user,
            records: Arc::clone(guard.records()),
            notifier,
            qr_service_url: qr_service_url.into(),
            watch: Mutex::new(MessageWatch::new()),
        }))
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    fn profile(&self) -> AppResult<Profile> {
        self.records.get_profile(&self.user.id)?.ok_or_not_found()
    }

    fn render(&self, profile: &Profile) -> AppResult<DashboardView> {
        DashboardView::new(self.user.display_name(), profile, &self.qr_service_url)
    }

    /// Current dashboard.
    ///
    /// # Errors
    /// `NotFound` when the signed-in account has no profile (admins, deleted
    /// residents).
    pub fn view(&self) -> AppResult<DashboardView> {
        self.render(&self.profile()?)
    }

    /// Refresh and notify when the administration wrote since the previous
    /// tick.
    pub async fn tick(&self) -> AppResult<DashboardView> {
        let profile = self.profile()?;
        let view = self.render(&profile)?;

        let grown = self.lock_watch()?.observe(profile.messages.len());
        if let Some(previous) = grown {
            let incoming = profile.messages[previous..]
                .iter()
                .filter(|m| m.from.is_admin())
                .last();
            if let Some(message) = incoming {
                info!(user_id = %self.user.id, message_id = %message.id, "new message from administration");
                self.notifier.play_received().await;
                self.notifier
                    .show(RESIDENT_NOTIFICATION_TITLE, &message.text)
                    .await;
            }
        }

        Ok(view)
    }

    /// Write to the administration. Blank text is ignored.
    pub async fn send_message(&self, text: &str) -> AppResult<Option<Message>> {
        let Some(text) = non_empty(text) else {
            return Ok(None);
        };

        let message = self.records.add_message(
            &self.user.id,
            NewMessage {
                from: UserRole::Resident,
                text,
            },
        )?;
        if message.is_some() {
            self.notifier.play_sent().await;
        }
        Ok(message)
    }

    /// Set or, with blank input, clear the alias.
    pub fn set_alias(&self, alias: &str) -> AppResult<DashboardView> {
        let profile = self
            .records
            .update_profile(
                &self.user.id,
                ProfileUpdate {
                    alias: Some(alias.trim().to_string()),
                    ..Default::default()
                },
            )?
            .ok_or_not_found()?;
        self.render(&profile)
    }

    /// Billing history in stored order.
    pub fn history(&self) -> AppResult<Vec<HistoryRow>> {
        Ok(self
            .profile()?
            .payment_history
            .iter()
            .map(HistoryRow::from)
            .collect())
    }

    fn lock_watch(&self) -> AppResult<MutexGuard<'_, MessageWatch>> {
        self.watch
            .lock()
            .map_err(|_| AppError::internal("message watch lock poisoned"))
    }
}
