//! Notification DTOs - Data Transfer Objects per notifiche

use crate::entities::{Notification, NotificationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationDTO {
    pub notification_id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDTO {
    fn from(value: Notification) -> Self {
        Self {
            notification_id: value.notification_id,
            notification_type: value.notification_type,
            title: value.title,
            content: value.content,
            link: value.link,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare una nuova notifica (is_read parte sempre da false)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateNotificationDTO {
    pub user_id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct NotificationCountDTO {
    pub unread: i64,
}
