//! Admin console - resident table, chat, client manager and account admin.
//!
//! Every call reads the store afresh; nothing is cached between calls except
//! the message count used to detect new resident messages.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{CreateUser, Message, NewMessage, Profile, SessionUser, User, UserRole};
use record_store_lib::RecordStore;
use session_guard_lib::{Redirect, SessionGuard};

use crate::forms::{non_empty, validated, HistoryForm, NewUserForm, ProfileForm, ServiceForm};
use crate::notify::{Notifier, ADMIN_NOTIFICATION_BODY, ADMIN_NOTIFICATION_TITLE};
use crate::poller::MessageWatch;
use crate::views::{ChatLine, ChatView, HistoryRow, ManagerView, ResidentRow};

pub struct AdminConsole {
    admin: SessionUser,
    records: Arc<RecordStore>,
    notifier: Arc<dyn Notifier>,
    qr_service_url: String,
    watch: Mutex<MessageWatch>,
}

impl AdminConsole {
    /// Open the console for the signed-in admin and ask for notification
    /// permission. Anyone else gets the redirect they need.
    pub async fn open(
        guard: &SessionGuard,
        notifier: Arc<dyn Notifier>,
        qr_service_url: impl Into<String>,
    ) -> AppResult<Result<Self, Redirect>> {
        let admin = match guard.require_admin()? {
            Ok(admin) => admin,
            Err(redirect) => return Ok(Err(redirect)),
        };

        if !notifier.request_permission().await {
            debug!("notification permission denied");
        }
        info!(user_id = %admin.id, "admin console opened");

        Ok(Ok(Self {
            admin,
            records: Arc::clone(guard.records()),
            notifier,
            qr_service_url: qr_service_url.into(),
            watch: Mutex::new(MessageWatch::new()),
        }))
    }

    /// The admin as captured at sign-in
    pub fn admin(&self) -> &SessionUser {
        &self.admin
    }

    // =========================================================================
    // Resident table
    // =========================================================================

    /// Resident rows in insertion order; residents without a profile are
    /// skipped.
    pub fn residents(&self) -> AppResult<Vec<ResidentRow>> {
        let db = self.records.read_all()?;
        Ok(db
            .resident_profiles()
            .map(|(user, profile)| ResidentRow::new(user, profile))
            .collect())
    }

    /// Refresh the resident table and notify when residents wrote since the
    /// previous tick.
    pub async fn tick(&self) -> AppResult<Vec<ResidentRow>> {
        let db = self.records.read_all()?;
        let rows: Vec<_> = db
            .resident_profiles()
            .map(|(user, profile)| ResidentRow::new(user, profile))
            .collect();
        let total: usize = db
            .resident_profiles()
            .map(|(_, profile)| profile.messages.len())
            .sum();

        let grown = self.lock_watch()?.observe(total);
        if let Some(previous) = grown {
            info!(previous, total, "new resident messages");
            self.notifier.play_received().await;
            self.notifier
                .show(ADMIN_NOTIFICATION_TITLE, ADMIN_NOTIFICATION_BODY)
                .await;
        }

        Ok(rows)
    }

    // =========================================================================
    // Chat
    // =========================================================================

    /// Mark the resident's messages read and return the transcript.
    pub fn open_chat(&self, user_id: &str) -> AppResult<ChatView> {
        let (user, _) = self.resident(user_id)?;
        self.records.mark_messages_read(user_id)?;

        let profile = self.records.get_profile(user_id)?.ok_or_not_found()?;
        let label = profile.alias().unwrap_or(&user.username).to_string();
        Ok(ChatView {
            user_id: user.id,
            title: format!("Chat: {}", label),
            lines: profile
                .messages
                .iter()
                .map(|m| ChatLine::for_admin(m, &label))
                .collect(),
        })
    }

    /// Send a message to a resident. Blank text is ignored.
    pub async fn send_message(&self, user_id: &str, text: &str) -> AppResult<Option<Message>> {
        let Some(text) = non_empty(text) else {
            return Ok(None);
        };

        let message = self.records.add_message(
            user_id,
            NewMessage {
                from: UserRole::Admin,
                text,
            },
        )?;
        if message.is_some() {
            self.lock_watch()?.record_own(1);
            self.notifier.play_sent().await;
        }
        Ok(message)
    }

    // =========================================================================
    // Client manager
    // =========================================================================

    pub fn open_manager(&self, user_id: &str) -> AppResult<ManagerView> {
        let (user, profile) = self.resident(user_id)?;
        ManagerView::new(&user, &profile, &self.qr_service_url)
    }

    /// Save username, alias and (when given) a new password.
    pub fn save_profile(&self, user_id: &str, form: ProfileForm) -> AppResult<ManagerView> {
        let form = validated(form)?;
        self.resident(user_id)?;

        let (user_update, profile_update) = form.into_updates();
        self.records.update_user(user_id, user_update)?;
        self.records.update_profile(user_id, profile_update)?;

        info!(user_id = %user_id, "resident profile saved");
        self.open_manager(user_id)
    }

    /// Save billing status, due date, speed and WiFi in one update.
    pub fn save_service(&self, user_id: &str, form: ServiceForm) -> AppResult<ManagerView> {
        let form = validated(form)?;

        self.records
            .update_profile(user_id, form.into_update())?
            .ok_or_not_found()?;

        info!(user_id = %user_id, "service settings saved");
        self.open_manager(user_id)
    }

    /// Edit the row named by the form's id, or append a new one.
    pub fn save_history_item(&self, user_id: &str, form: HistoryForm) -> AppResult<Vec<HistoryRow>> {
        let form = validated(form)?;

        match form.id {
            Some(item_id) => {
                self.records
                    .update_history_item(user_id, item_id, form.into_update())?
                    .ok_or_not_found()?;
            }
            None => {
                self.records
                    .add_history_item(user_id, form.into_new_item())?
                    .ok_or_not_found()?;
            }
        }

        Ok(self.open_manager(user_id)?.history)
    }

    pub fn delete_history_item(&self, user_id: &str, item_id: Uuid) -> AppResult<Vec<HistoryRow>> {
        if !self.records.delete_history_item(user_id, item_id)? {
            debug!(user_id = %user_id, item_id = %item_id, "history item already gone");
        }
        Ok(self.open_manager(user_id)?.history)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Delete a user and their profile for good.
    pub fn delete_user(&self, user_id: &str) -> AppResult<()> {
        if user_id == self.admin.id {
            return Err(AppError::validation("No puede eliminar su propia cuenta"));
        }
        if !self.records.delete_user(user_id)? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Create an account whose display name is its username.
    pub fn create_user(&self, form: NewUserForm) -> AppResult<User> {
        let form = validated(form)?;
        self.records.create_user(CreateUser {
            name: form.username.clone(),
            username: form.username,
            password: form.password,
            role: form.role,
        })
    }

    fn resident(&self, user_id: &str) -> AppResult<(User, Profile)> {
        let user = self.records.find_user_by_id(user_id)?.ok_or_not_found()?;
        let profile = self.records.get_profile(user_id)?.ok_or_not_found()?;
        Ok((user, profile))
    }

    fn lock_watch(&self) -> AppResult<MutexGuard<'_, MessageWatch>> {
        self.watch
            .lock()
            .map_err(|_| AppError::internal("message watch lock poisoned"))
    }
}
