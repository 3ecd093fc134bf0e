//! Notification Dispatcher - notifiche best-effort sugli eventi dei messaggi
//!
//! Riceve un [`MessageEvent`] dopo che il messaggio è già stato scritto. Un errore
//! nella creazione della notifica viene loggato e assorbito: il chiamante non lo vede
//! e il messaggio resta salvato.

use crate::dtos::CreateNotificationDTO;
use crate::entities::{Addressee, Message, NotificationType};
use crate::messaging::router::resolve_addressee;
use crate::repositories::{Create, NotificationRepository};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone)]
pub enum MessageEvent {
    MessageCreated(Message),
    ReplyCreated { reply: Message, parent: Message },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Notifica creata, con il suo id
    Notified(i32),
    /// Broadcast agli amministratori: nessuna notifica per singolo admin
    NoUserAddressee,
    /// Scrittura fallita, già loggata
    Failed,
}

pub struct NotificationDispatcher {
    notifications: NotificationRepository,
}

impl NotificationDispatcher {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self {
            notifications: NotificationRepository::new(connection_pool),
        }
    }

    #[instrument(skip(self, event))]
    pub async fn dispatch(&self, event: MessageEvent) -> DispatchOutcome {
        let draft = match &event {
            MessageEvent::MessageCreated(message) => on_message_created(message),
            MessageEvent::ReplyCreated { reply, parent } => on_reply_created(reply, parent),
        };

        let Some(draft) = draft else {
            debug!("Message addressed to all administrators, no notification");
            return DispatchOutcome::NoUserAddressee;
        };

        match self.notifications.create(&draft).await {
            Ok(notification) => {
                info!(
                    "Notification {} created for user {}",
                    notification.notification_id, notification.user_id
                );
                DispatchOutcome::Notified(notification.notification_id)
            }
            Err(e) => {
                error!(
                    "Failed to create notification for user {}: {:?}",
                    draft.user_id, e
                );
                DispatchOutcome::Failed
            }
        }
    }
}

fn on_message_created(message: &Message) -> Option<CreateNotificationDTO> {
    let Addressee::SingleUser { user_id } = resolve_addressee(message) else {
        return None;
    };
    Some(CreateNotificationDTO {
        user_id,
        notification_type: NotificationType::Message,
        title: "New message".to_string(),
        content: message.subject.clone(),
        link: format!("/messages/{}", message.message_id),
        created_at: Utc::now(),
    })
}

fn on_reply_created(reply: &Message, parent: &Message) -> Option<CreateNotificationDTO> {
    let Addressee::SingleUser { user_id } = resolve_addressee(reply) else {
        return None;
    };
    Some(CreateNotificationDTO {
        user_id,
        notification_type: NotificationType::Message,
        title: "New reply".to_string(),
        content: reply.subject.clone(),
        link: format!("/messages/{}/thread", parent.thread_id()),
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MessageStatus, Sender};
    use sqlx::SqlitePool;

    fn message(id: i32, recipient: Option<i32>, root_id: Option<i32>) -> Message {
        Message {
            message_id: id,
            sender: Sender::User { user_id: 1 },
            addressee: Addressee::from(recipient),
            subject: "Training".to_string(),
            body: "See you on Monday".to_string(),
            parent_id: root_id,
            root_id,
            status: MessageStatus::Unread,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reply_notification_links_the_thread() {
        let parent = message(2, Some(2), None);
        let reply = message(9, Some(1), Some(2));

        let draft = on_reply_created(&reply, &parent).expect("user addressee");
        assert_eq!(draft.user_id, 1);
        assert_eq!(draft.link, "/messages/2/thread");
        assert!(on_message_created(&message(3, None, None)).is_none());
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_dispatch_creates_one_notification(pool: SqlitePool) -> sqlx::Result<()> {
        let dispatcher = NotificationDispatcher::new(pool.clone());

        let outcome = dispatcher
            .dispatch(MessageEvent::MessageCreated(message(10, Some(2), None)))
            .await;
        assert!(matches!(outcome, DispatchOutcome::Notified(_)));

        let repo = NotificationRepository::new(pool);
        assert_eq!(repo.count_unread_by_user_id(&2).await?, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_dispatch_failure_is_absorbed(pool: SqlitePool) -> sqlx::Result<()> {
        sqlx::query("DROP TABLE notifications").execute(&pool).await?;
        let dispatcher = NotificationDispatcher::new(pool);

        let outcome = dispatcher
            .dispatch(MessageEvent::MessageCreated(message(10, Some(2), None)))
            .await;
        assert_eq!(outcome, DispatchOutcome::Failed);
        Ok(())
    }
}
