//! MessageRepository - Repository per la gestione dei messaggi
//!
//! Tutte le viste (inbox, inviati, archiviati, non letti, broadcast admin) leggono dalla
//! stessa tabella; i predicati sono composti da [`MessageFilter`] del Recipient Router.

use super::{Create, Delete, Read};
use crate::dtos::{CreateMessageDTO, Page};
use crate::entities::{Message, MessageStatus, Sender};
use crate::messaging::router::MessageFilter;
use chrono::{DateTime, Utc};
use sqlx::{Error, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, instrument};

const MESSAGE_COLUMNS: &str = "message_id, sender_id, sender_name, sender_email, recipient_id, \
     subject, body, parent_id, root_id, status, read_at, created_at";

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Get one page of messages matching a router filter
    #[instrument(skip(self))]
    pub async fn find_many_by_filter(
        &self,
        filter: &MessageFilter,
        page: &Page,
    ) -> Result<Vec<Message>, Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE "));
        filter.push_predicate(&mut query);
        filter.push_order(&mut query);
        query
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let messages = query
            .build_query_as::<Message>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Found {} messages", messages.len());
        Ok(messages)
    }

    /// Count every message matching a router filter (ignores pagination)
    #[instrument(skip(self))]
    pub async fn count_by_filter(&self, filter: &MessageFilter) -> Result<i64, Error> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM messages WHERE ");
        filter.push_predicate(&mut query);

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        Ok(count)
    }

    /// Get every reply of a thread, oldest first
    #[instrument(skip(self))]
    pub async fn find_replies_by_root_id(&self, root_id: &i32) -> Result<Vec<Message>, Error> {
        let replies = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE root_id = ? \
             ORDER BY created_at ASC, message_id ASC"
        ))
        .bind(root_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(replies)
    }

    /// Set an explicit status.
    ///
    /// `Read` stamps `read_at` only the first time, `Unread` clears it,
    /// any other status leaves it untouched. Fails with `RowNotFound` if the row is gone.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &i32,
        status: MessageStatus,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let result = match status {
            MessageStatus::Read => {
                sqlx::query(
                    "UPDATE messages SET status = ?, read_at = COALESCE(read_at, ?) WHERE message_id = ?",
                )
                .bind(status)
                .bind(now)
                .bind(id)
                .execute(&self.connection_pool)
                .await?
            }
            MessageStatus::Unread => {
                sqlx::query("UPDATE messages SET status = ?, read_at = NULL WHERE message_id = ?")
                    .bind(status)
                    .bind(id)
                    .execute(&self.connection_pool)
                    .await?
            }
            _ => {
                sqlx::query("UPDATE messages SET status = ? WHERE message_id = ?")
                    .bind(status)
                    .bind(id)
                    .execute(&self.connection_pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }

    /// `unread -> read` on first view; no-op for any other status.
    /// Returns whether the row changed.
    #[instrument(skip(self))]
    pub async fn mark_read_if_unread(&self, id: &i32, now: DateTime<Utc>) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE messages SET status = ?, read_at = COALESCE(read_at, ?) \
             WHERE message_id = ? AND status = ?",
        )
        .bind(MessageStatus::Read)
        .bind(now)
        .bind(id)
        .bind(MessageStatus::Unread)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// `unread|read -> replied`; archived or already replied messages are left as they are.
    #[instrument(skip(self))]
    pub async fn mark_replied(&self, id: &i32) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE messages SET status = ? WHERE message_id = ? AND status IN (?, ?)",
        )
        .bind(MessageStatus::Replied)
        .bind(id)
        .bind(MessageStatus::Unread)
        .bind(MessageStatus::Read)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    #[instrument(skip(self, data), fields(recipient = ?data.addressee.recipient_id(), root = ?data.root_id))]
    async fn create(&self, data: &CreateMessageDTO) -> Result<Message, Error> {
        debug!("Inserting new message");
        let (sender_id, sender_name, sender_email) = match &data.sender {
            Sender::User { user_id } => (Some(*user_id), "", ""),
            Sender::Guest { name, email } => (None, name.as_str(), email.as_str()),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_id, sender_name, sender_email, recipient_id, subject, body,
                                  parent_id, root_id, status, is_from_guest, read_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?)
            "#,
        )
        .bind(sender_id)
        .bind(sender_name)
        .bind(sender_email)
        .bind(data.addressee.recipient_id())
        .bind(&data.subject)
        .bind(&data.body)
        .bind(data.parent_id)
        .bind(data.root_id)
        .bind(MessageStatus::Unread)
        .bind(sender_id.is_none())
        .bind(data.created_at)
        .execute(&self.connection_pool)
        .await?;

        // Get the last inserted ID
        let new_id = result.last_insert_rowid() as i32;
        info!("Message created with id {}", new_id);

        Ok(Message {
            message_id: new_id,
            sender: data.sender.clone(),
            addressee: data.addressee,
            subject: data.subject.clone(),
            body: data.body.clone(),
            parent_id: data.parent_id,
            root_id: data.root_id,
            status: MessageStatus::Unread,
            read_at: None,
            created_at: data.created_at,
        })
    }
}

impl Read<Message, i32> for MessageRepository {
    #[instrument(skip(self), fields(message_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Message>, Error> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE message_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(message)
    }
}

impl Delete<i32> for MessageRepository {
    /// Hard delete: replies are not cascaded and keep pointing at the removed root
    #[instrument(skip(self), fields(message_id = %id))]
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM messages WHERE message_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Addressee;
    use sqlx::SqlitePool;

    fn page() -> Page {
        Page { page: 1, page_size: 20 }
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "messages")))]
    async fn test_create_starts_unread(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        let created = repo
            .create(&CreateMessageDTO {
                sender: Sender::User { user_id: 3 },
                addressee: Addressee::SingleUser { user_id: 1 },
                subject: "Kit".to_string(),
                body: "Where is the kit?".to_string(),
                parent_id: None,
                root_id: None,
                created_at: Utc::now(),
            })
            .await?;

        let stored = repo.read(&created.message_id).await?.expect("message stored");
        assert_eq!(stored.status, MessageStatus::Unread);
        assert!(stored.read_at.is_none());
        assert_eq!(stored.sender, Sender::User { user_id: 3 });
        assert_eq!(stored.addressee, Addressee::SingleUser { user_id: 1 });
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "messages")))]
    async fn test_guest_message_round_trips_sender_fields(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        let stored = repo.read(&1).await?.expect("fixture message");
        assert!(stored.is_from_guest());
        assert!(stored.is_broadcast());
        assert_eq!(
            stored.sender,
            Sender::Guest {
                name: "Ada".to_string(),
                email: "ada@x.com".to_string()
            }
        );
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "messages")))]
    async fn test_inbox_filter(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        // alice: risposta di bob (3) in inbox, il 4 è archiviato
        let inbox = repo
            .find_many_by_filter(&MessageFilter::Inbox(1), &page())
            .await?;
        let ids: Vec<i32> = inbox.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, vec![3]);

        let archived = repo
            .find_many_by_filter(&MessageFilter::Archived(1), &page())
            .await?;
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].message_id, 4);

        assert_eq!(repo.count_by_filter(&MessageFilter::Unread(1)).await?, 1);
        // anche il 4, archiviato da alice, resta tra gli inviati di bob
        assert_eq!(repo.count_by_filter(&MessageFilter::Sent(2)).await?, 2);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "messages")))]
    async fn test_read_at_stamped_once_and_cleared_on_unread(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);
        let first = Utc::now();

        assert!(repo.mark_read_if_unread(&3, first).await?);
        let stored = repo.read(&3).await?.expect("message");
        assert_eq!(stored.status, MessageStatus::Read);
        let read_at = stored.read_at.expect("read_at stamped");

        // una seconda lettura non sposta read_at
        repo.update_status(&3, MessageStatus::Read, first + chrono::Duration::hours(1))
            .await?;
        let stored = repo.read(&3).await?.expect("message");
        assert_eq!(stored.read_at, Some(read_at));

        repo.update_status(&3, MessageStatus::Unread, Utc::now()).await?;
        let stored = repo.read(&3).await?.expect("message");
        assert_eq!(stored.status, MessageStatus::Unread);
        assert!(stored.read_at.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "messages")))]
    async fn test_mark_replied_skips_archived(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        assert!(repo.mark_replied(&1).await?);
        assert!(!repo.mark_replied(&4).await?);
        assert_eq!(
            repo.read(&4).await?.expect("message").status,
            MessageStatus::Archived
        );
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "messages")))]
    async fn test_delete_keeps_orphaned_replies(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        assert!(repo.delete(&2).await?);
        assert!(!repo.delete(&2).await?);
        assert!(repo.read(&2).await?.is_none());

        let replies = repo.find_replies_by_root_id(&2).await?;
        assert_eq!(replies.len(), 1);
        assert!(matches!(
            repo.update_status(&2, MessageStatus::Read, Utc::now()).await,
            Err(Error::RowNotFound)
        ));
        Ok(())
    }
}
