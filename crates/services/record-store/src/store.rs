//! Record store - CRUD over the single persisted database blob.
//!
//! Every operation is a full read-modify-write cycle: deserialize the whole
//! blob, apply the change, reserialize, persist. Operations on unknown ids
//! are silent no-ops; the only modelled failure is a duplicate username.

use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    calendar, BillingHistoryEntry, CreateUser, HistoryItemUpdate, Message, NewHistoryItem,
    NewMessage, Password, Profile, ProfileUpdate, UpdateUser, User, STORAGE_KEY,
};

use crate::database::Database;
use crate::seed::seed_database;
use crate::storage::KeyValueStore;

/// Outcome of a mutation closure: the value to return and whether the
/// database changed and must be written back.
struct Mutation<T> {
    value: T,
    dirty: bool,
}

impl<T> Mutation<T> {
    fn changed(value: T) -> Self {
        Self { value, dirty: true }
    }

    fn unchanged(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }
}

/// Owner of all users, profiles, messages and billing history.
pub struct RecordStore {
    storage: Arc<dyn KeyValueStore>,
    /// Seed served while the backend holds no usable database; built once so
    /// ids stay stable across reads.
    fallback: OnceCell<Database>,
}

impl RecordStore {
    /// Wrap a backend without touching it
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            fallback: OnceCell::new(),
        }
    }

    /// Wrap a backend and seed it if it holds no database yet
    pub fn open(storage: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let store = Self::new(storage);
        store.initialize_if_absent()?;
        Ok(store)
    }

    /// The backend this store persists into
    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.storage)
    }

    // =========================================================================
    // Blob access
    // =========================================================================

    /// Write the seed database unless one already exists. Returns whether it
    /// seeded.
    pub fn initialize_if_absent(&self) -> AppResult<bool> {
        if self.storage.get(STORAGE_KEY)?.is_some() {
            debug!("database already initialized");
            return Ok(false);
        }

        let seeded = seed_database(Utc::now().date_naive())?;
        self.save(&seeded)?;
        info!(users = seeded.users.len(), "database seeded");
        Ok(true)
    }

    /// Fresh snapshot of the whole database.
    ///
    /// A missing or malformed blob reads as the seed defaults. The same seed
    /// is returned until a mutation writes it back.
    pub fn read_all(&self) -> AppResult<Database> {
        match self.storage.get(STORAGE_KEY)? {
            Some(raw) => match Database::from_json(&raw) {
                Ok(db) => Ok(db),
                Err(e) => {
                    warn!(error = %e, "stored database is malformed, using seed defaults");
                    self.fallback_seed()
                }
            },
            None => self.fallback_seed(),
        }
    }

    fn fallback_seed(&self) -> AppResult<Database> {
        self.fallback
            .get_or_try_init(|| seed_database(Utc::now().date_naive()))
            .cloned()
    }

    fn save(&self, db: &Database) -> AppResult<()> {
        let raw = db.to_json()?;
        self.storage.set(STORAGE_KEY, &raw)
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Database) -> AppResult<Mutation<T>>,
    ) -> AppResult<T> {
        let mut db = self.read_all()?;
        let Mutation { value, dirty } = op(&mut db)?;
        if dirty {
            self.save(&db)?;
        }
        Ok(value)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All users in insertion order
    pub fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.read_all()?.users)
    }

    /// Resident users in insertion order
    pub fn list_residents(&self) -> AppResult<Vec<User>> {
        Ok(self.read_all()?.residents().cloned().collect())
    }

    pub fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.read_all()?.find_user_by_username(username).cloned())
    }

    pub fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.read_all()?.find_user(id).cloned())
    }

    /// Create a user; residents also get a default profile due on the 5th of
    /// next month.
    ///
    /// # Errors
    /// `DuplicateUsername` when the exact username is taken; the store is
    /// left untouched.
    pub fn create_user(&self, input: CreateUser) -> AppResult<User> {
        self.mutate(|db| {
            if db.find_user_by_username(&input.username).is_some() {
                return Err(AppError::duplicate_username(input.username));
            }

            let user = User {
                id: format!("u{}", Uuid::new_v4().simple()),
                username: input.username,
                password: Password::new(&input.password)?,
                role: input.role,
                name: input.name,
            };

            if user.is_resident() {
                let today = Utc::now().date_naive();
                let profile = Profile::new_default(today, calendar::next_payment_date(today));
                db.profiles.insert(user.id.clone(), profile);
            }
            db.users.push(user.clone());

            info!(user_id = %user.id, username = %user.username, role = %user.role, "user created");
            Ok(Mutation::changed(user))
        })
    }

    /// Merge supplied fields into a user. Unknown ids are ignored.
    ///
    /// A changed username is not checked for uniqueness.
    pub fn update_user(&self, id: &str, update: UpdateUser) -> AppResult<Option<User>> {
        let changes = update.into_changes()?;
        self.mutate(|db| {
            if let Some(username) = &changes.username {
                if db
                    .find_user_by_username(username)
                    .is_some_and(|other| other.id != id)
                {
                    warn!(user_id = %id, username = %username, "username now shared by two users");
                }
            }

            let Some(user) = db.find_user_mut(id) else {
                debug!(user_id = %id, "update_user: unknown id");
                return Ok(Mutation::unchanged(None));
            };
            user.apply(changes);

            info!(user_id = %id, "user updated");
            Ok(Mutation::changed(Some(user.clone())))
        })
    }

    /// Remove a user and their profile in one write. Returns whether anything
    /// was removed.
    pub fn delete_user(&self, id: &str) -> AppResult<bool> {
        self.mutate(|db| {
            let before = db.users.len();
            db.users.retain(|u| u.id != id);
            let had_profile = db.profiles.remove(id).is_some();
            let existed = db.users.len() != before;

            if !existed && !had_profile {
                debug!(user_id = %id, "delete_user: unknown id");
                return Ok(Mutation::unchanged(false));
            }

            info!(user_id = %id, "user deleted");
            Ok(Mutation::changed(existed || had_profile))
        })
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// The resident's profile; `None` for admins and unknown ids
    pub fn get_profile(&self, id: &str) -> AppResult<Option<Profile>> {
        Ok(self.read_all()?.profiles.remove(id))
    }

    /// Merge supplied fields into a profile, keeping the last billing-history
    /// entry in step with a changed payment status.
    pub fn update_profile(&self, id: &str, update: ProfileUpdate) -> AppResult<Option<Profile>> {
        self.mutate(|db| {
            let Some(profile) = db.profiles.get_mut(id) else {
                debug!(user_id = %id, "update_profile: no profile");
                return Ok(Mutation::unchanged(None));
            };

            if let Some(status) = update.payment_status {
                debug!(user_id = %id, status = %status, "payment status set");
            }
            profile.apply(update);

            Ok(Mutation::changed(Some(profile.clone())))
        })
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Append an unread message. Returns `None` when the user has no profile.
    pub fn add_message(&self, user_id: &str, message: NewMessage) -> AppResult<Option<Message>> {
        self.mutate(|db| {
            let Some(profile) = db.profiles.get_mut(user_id) else {
                debug!(user_id = %user_id, "add_message: no profile");
                return Ok(Mutation::unchanged(None));
            };

            let message = Message::new(message.from, message.text);
            profile.messages.push(message.clone());

            info!(user_id = %user_id, from = %message.from, message_id = %message.id, "message added");
            Ok(Mutation::changed(Some(message)))
        })
    }

    /// Flag the user's unread resident-authored messages as read. Writes only
    /// when something flipped; returns how many did.
    pub fn mark_messages_read(&self, user_id: &str) -> AppResult<usize> {
        self.mutate(|db| {
            let Some(profile) = db.profiles.get_mut(user_id) else {
                return Ok(Mutation::unchanged(0));
            };

            let flipped = profile.mark_resident_messages_read();
            if flipped == 0 {
                return Ok(Mutation::unchanged(0));
            }

            debug!(user_id = %user_id, count = flipped, "messages marked read");
            Ok(Mutation::changed(flipped))
        })
    }

    // =========================================================================
    // Billing history
    // =========================================================================

    /// Append a billing-history entry with a fresh id
    pub fn add_history_item(
        &self,
        user_id: &str,
        item: NewHistoryItem,
    ) -> AppResult<Option<BillingHistoryEntry>> {
        self.mutate(|db| {
            let Some(profile) = db.profiles.get_mut(user_id) else {
                return Ok(Mutation::unchanged(None));
            };

            let entry = item.into_entry();
            profile.payment_history.push(entry.clone());

            info!(user_id = %user_id, item_id = %entry.id, "history item added");
            Ok(Mutation::changed(Some(entry)))
        })
    }

    /// Merge supplied fields into one billing-history entry
    pub fn update_history_item(
        &self,
        user_id: &str,
        item_id: Uuid,
        update: HistoryItemUpdate,
    ) -> AppResult<Option<BillingHistoryEntry>> {
        self.mutate(|db| {
            let Some(profile) = db.profiles.get_mut(user_id) else {
                return Ok(Mutation::unchanged(None));
            };
            let Some(index) = profile.history_position(item_id) else {
                debug!(user_id = %user_id, item_id = %item_id, "update_history_item: unknown item");
                return Ok(Mutation::unchanged(None));
            };

            let entry = &mut profile.payment_history[index];
            entry.apply(update);

            info!(user_id = %user_id, item_id = %item_id, "history item updated");
            Ok(Mutation::changed(Some(entry.clone())))
        })
    }

    /// Remove exactly the entry with `item_id`. Returns whether it existed.
    pub fn delete_history_item(&self, user_id: &str, item_id: Uuid) -> AppResult<bool> {
        self.mutate(|db| {
            let Some(profile) = db.profiles.get_mut(user_id) else {
                return Ok(Mutation::unchanged(false));
            };

            let before = profile.payment_history.len();
            profile.payment_history.retain(|h| h.id != item_id);
            if profile.payment_history.len() == before {
                return Ok(Mutation::unchanged(false));
            }

            info!(user_id = %user_id, item_id = %item_id, "history item deleted");
            Ok(Mutation::changed(true))
        })
    }
}
