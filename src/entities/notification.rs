//! Notification entity - Entità notifica per l'utente

use super::enums::NotificationType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Notification {
    pub notification_id: i32,
    pub user_id: i32, // proprietario e destinatario della notifica
    pub notification_type: NotificationType,
    pub title: String,
    pub content: String,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
