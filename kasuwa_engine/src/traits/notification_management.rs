use crate::{
    db_types::{NewNotification, Notification},
    traits::AccountApiError,
};

/// Notification persistence. Creation normally happens through event hooks, so failures here
/// are logged by the caller and never propagate into the money path.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, AccountApiError>;

    /// The user's notifications, newest first. `unread_only` filters out read ones.
    async fn fetch_notifications_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AccountApiError>;

    /// Marks one of the user's notifications as read. Returns the number of rows changed
    /// (zero if the notification does not exist or belongs to someone else).
    async fn mark_notification_read(&self, notification_id: i64, user_id: i64) -> Result<u64, AccountApiError>;
}
