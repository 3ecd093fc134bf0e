//! NotificationRepository - Repository per le notifiche utente

use super::Create;
use crate::dtos::{CreateNotificationDTO, Page};
use crate::entities::Notification;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

pub struct NotificationRepository {
    connection_pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Get one page of a user's notifications, newest first
    #[instrument(skip(self))]
    pub async fn find_many_by_user_id(
        &self,
        user_id: &i32,
        page: &Page,
    ) -> Result<Vec<Notification>, Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, notification_type, title, content, link, is_read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, notification_id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(notifications)
    }

    #[instrument(skip(self))]
    pub async fn count_by_user_id(&self, user_id: &i32) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn count_unread_by_user_id(&self, user_id: &i32) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Mark a notification as read, only if it belongs to `user_id`.
    /// Returns `false` when no such notification exists for that user.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, notification_id: &i32, user_id: &i32) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE notification_id = ? AND user_id = ?",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl Create<Notification, CreateNotificationDTO> for NotificationRepository {
    #[instrument(skip(self, data), fields(user_id = %data.user_id))]
    async fn create(&self, data: &CreateNotificationDTO) -> Result<Notification, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, notification_type, title, content, link, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(data.user_id)
        .bind(data.notification_type)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.link)
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid() as i32;
        debug!("Notification created with id {}", new_id);

        Ok(Notification {
            notification_id: new_id,
            user_id: data.user_id,
            notification_type: data.notification_type,
            title: data.title.clone(),
            content: data.content.clone(),
            link: data.link.clone(),
            is_read: false,
            created_at: data.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NotificationType;
    use chrono::Utc;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_mark_read_only_by_owner(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = NotificationRepository::new(pool);

        let created = repo
            .create(&CreateNotificationDTO {
                user_id: 2,
                notification_type: NotificationType::Message,
                title: "New message from alice".to_string(),
                content: "Training".to_string(),
                link: "/messages/2".to_string(),
                created_at: Utc::now(),
            })
            .await?;

        assert_eq!(repo.count_unread_by_user_id(&2).await?, 1);
        assert!(!repo.mark_read(&created.notification_id, &1).await?);
        assert!(repo.mark_read(&created.notification_id, &2).await?);
        assert_eq!(repo.count_unread_by_user_id(&2).await?, 0);
        assert_eq!(repo.count_by_user_id(&2).await?, 1);

        let page = Page { page: 1, page_size: 10 };
        let listed = repo.find_many_by_user_id(&2, &page).await?;
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_read);
        Ok(())
    }
}
