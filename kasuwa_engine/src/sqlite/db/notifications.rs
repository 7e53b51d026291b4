use sqlx::SqliteConnection;

use crate::db_types::{NewNotification, Notification};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, category, title, message)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(notification.user_id)
    .bind(notification.category.to_string())
    .bind(notification.title)
    .bind(notification.message)
    .fetch_one(conn)
    .await
}

pub async fn notifications_for_user(
    user_id: i64,
    unread_only: bool,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let query = if unread_only {
        "SELECT * FROM notifications WHERE user_id = $1 AND is_read = 0 ORDER BY created_at DESC"
    } else {
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC"
    };
    sqlx::query_as(query).bind(user_id).fetch_all(conn).await
}

/// Marks one of the user's notifications as read. The user id guard stops users marking other
/// people's notifications. Returns the number of rows touched (0 or 1).
pub async fn mark_read(notification_id: i64, user_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = $1 AND user_id = $2")
        .bind(notification_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
