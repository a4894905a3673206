//! Fire-and-forget notification delivery.

use sqlx::PgPool;

use crate::models::NewNotification;

/// Inserts `notification` on a background task.
///
/// The caller never waits for the insert; failures are logged and dropped.
pub fn spawn_notification(pool: &PgPool, notification: NewNotification) {
    let pool = pool.clone();
    tokio::spawn(async move {
        if let Err(e) = insert_notification(&pool, &notification).await {
            tracing::warn!(
                user_id = %notification.user_id,
                kind = notification.kind.as_str(),
                error = %e,
                "Failed to create notification"
            );
        }
    });
}

async fn insert_notification(pool: &PgPool, notification: &NewNotification) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind, read, created_at)
        VALUES (gen_random_uuid(), $1, $2, $3, $4, FALSE, NOW())
        "#,
    )
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.kind.as_str())
    .execute(pool)
    .await?;
    Ok(())
}
