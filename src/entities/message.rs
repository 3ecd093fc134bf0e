//! Message entity - Entità messaggio
//!
//! Nella tabella `messages` il mittente e il destinatario sono colonne nullable:
//! `sender_id NULL` indica un ospite non autenticato (nome ed email salvati sulla riga),
//! `recipient_id NULL` indica il broadcast a tutti gli amministratori.
//! Qui entrambe le convenzioni diventano tipi espliciti ([`Sender`], [`Addressee`]).

use super::enums::MessageStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Chi ha scritto il messaggio
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sender {
    User { user_id: i32 },
    Guest { name: String, email: String },
}

/// A chi è indirizzato il messaggio
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Addressee {
    SingleUser { user_id: i32 },
    AllAdministrators,
}

impl Addressee {
    /// Valore della colonna `recipient_id`
    pub fn recipient_id(&self) -> Option<i32> {
        match self {
            Addressee::SingleUser { user_id } => Some(*user_id),
            Addressee::AllAdministrators => None,
        }
    }
}

impl From<Option<i32>> for Addressee {
    fn from(recipient_id: Option<i32>) -> Self {
        match recipient_id {
            Some(user_id) => Addressee::SingleUser { user_id },
            None => Addressee::AllAdministrators,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i32,
    pub sender: Sender,
    pub addressee: Addressee,
    pub subject: String,
    pub body: String,
    // messaggio a cui si risponde direttamente (solo informativo)
    pub parent_id: Option<i32>,
    // radice del thread, normalizzata in scrittura: None = il messaggio è una radice
    pub root_id: Option<i32>,
    pub status: MessageStatus,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn sender_id(&self) -> Option<i32> {
        match self.sender {
            Sender::User { user_id } => Some(user_id),
            Sender::Guest { .. } => None,
        }
    }

    pub fn recipient_id(&self) -> Option<i32> {
        self.addressee.recipient_id()
    }

    pub fn is_from_guest(&self) -> bool {
        matches!(self.sender, Sender::Guest { .. })
    }

    pub fn is_broadcast(&self) -> bool {
        self.addressee == Addressee::AllAdministrators
    }

    pub fn is_thread_root(&self) -> bool {
        self.root_id.is_none()
    }

    /// Id del thread a cui appartiene il messaggio
    pub fn thread_id(&self) -> i32 {
        self.root_id.unwrap_or(self.message_id)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Message {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sender = match row.try_get::<Option<i32>, _>("sender_id")? {
            Some(user_id) => Sender::User { user_id },
            None => Sender::Guest {
                name: row.try_get("sender_name")?,
                email: row.try_get("sender_email")?,
            },
        };
        let addressee = Addressee::from(row.try_get::<Option<i32>, _>("recipient_id")?);

        Ok(Message {
            message_id: row.try_get("message_id")?,
            sender,
            addressee,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            parent_id: row.try_get("parent_id")?,
            root_id: row.try_get("root_id")?,
            status: row.try_get("status")?,
            read_at: row.try_get("read_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addressee_from_nullable_recipient() {
        assert_eq!(
            Addressee::from(Some(7)),
            Addressee::SingleUser { user_id: 7 }
        );
        assert_eq!(Addressee::from(None), Addressee::AllAdministrators);
        assert_eq!(Addressee::AllAdministrators.recipient_id(), None);
    }

    #[test]
    fn test_thread_id_falls_back_to_own_id() {
        let mut message = Message {
            message_id: 10,
            sender: Sender::Guest {
                name: "Ada".to_string(),
                email: "ada@x.com".to_string(),
            },
            addressee: Addressee::AllAdministrators,
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            parent_id: None,
            root_id: None,
            status: MessageStatus::Unread,
            read_at: None,
            created_at: Utc::now(),
        };
        assert!(message.is_thread_root());
        assert!(message.is_from_guest());
        assert_eq!(message.thread_id(), 10);

        message.root_id = Some(3);
        assert!(!message.is_thread_root());
        assert_eq!(message.thread_id(), 3);
    }
}
