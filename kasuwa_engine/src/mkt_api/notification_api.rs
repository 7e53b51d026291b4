use crate::{
    db_types::{NewNotification, Notification},
    traits::{AccountApiError, NotificationManagement},
};

/// In-app notifications. Writes normally happen via the event hooks wired up at server start.
#[derive(Debug, Clone)]
pub struct NotificationApi<B> {
    db: B,
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn notify(&self, notification: NewNotification) -> Result<Notification, AccountApiError> {
        self.db.create_notification(notification).await
    }

    pub async fn notifications_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AccountApiError> {
        self.db.fetch_notifications_for_user(user_id, unread_only).await
    }

    pub async fn mark_read(&self, notification_id: i64, user_id: i64) -> Result<u64, AccountApiError> {
        self.db.mark_notification_read(notification_id, user_id).await
    }
}
