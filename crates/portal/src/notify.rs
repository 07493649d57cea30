//! Notification collaborator - sounds and system notifications.
//!
//! The loops only decide *when* to notify; how it is rendered belongs to
//! whatever front end hosts them.

use async_trait::async_trait;
use tracing::info;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Title of the admin console's new-message notification
pub const ADMIN_NOTIFICATION_TITLE: &str = "Portal Admin";

/// Body of the admin console's new-message notification
pub const ADMIN_NOTIFICATION_BODY: &str = "Tiene nuevos mensajes de residentes.";

/// Title of the resident dashboard's new-message notification
pub const RESIDENT_NOTIFICATION_TITLE: &str = "Nuevo Mensaje";

/// Notifier trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask the host for permission to show notifications
    async fn request_permission(&self) -> bool;

    /// Feedback after the local user sent a message
    async fn play_sent(&self);

    /// Feedback after a new message was observed
    async fn play_received(&self);

    /// Show a system notification
    async fn show(&self, title: &str, body: &str);
}

/// Notifier for terminal hosts: every call becomes a log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn play_sent(&self) {
        info!(sound = "sent", "notification sound");
    }

    async fn play_received(&self) {
        info!(sound = "received", "notification sound");
    }

    async fn show(&self, title: &str, body: &str) {
        info!(title = %title, body = %body, "notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracing_notifier_grants_permission() {
        let notifier = TracingNotifier;
        assert!(notifier.request_permission().await);
        notifier.play_sent().await;
        notifier.show(RESIDENT_NOTIFICATION_TITLE, "hola").await;
    }
}
