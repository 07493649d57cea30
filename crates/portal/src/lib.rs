//! Portal Library
//!
//! The two presentation loops over the record store: the admin console and
//! the resident dashboard. Both rebuild their view models from a fresh
//! snapshot on every call and are driven by a fixed-interval poller.

pub mod admin;
pub mod forms;
pub mod notify;
pub mod poller;
pub mod resident;
pub mod views;

pub use admin::AdminConsole;
pub use forms::{HistoryForm, NewUserForm, ProfileForm, ServiceForm};
pub use notify::{Notifier, TracingNotifier};
pub use poller::{run_polling, MessageWatch};
pub use resident::ResidentDashboard;

#[cfg(any(test, feature = "test-utils"))]
pub use notify::MockNotifier;
