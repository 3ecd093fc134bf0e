//! Message DTOs - Data Transfer Objects per messaggi

use crate::entities::{Addressee, Message, MessageStatus, Sender, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub message_id: i32,
    pub thread_id: i32,
    pub parent_id: Option<i32>,
    pub sender_id: Option<i32>,
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_id: Option<i32>,
    pub is_broadcast: bool,
    pub is_from_guest: bool,
    pub subject: String,
    pub body: String,
    pub status: MessageStatus,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl MessageDTO {
    /// Per i mittenti registrati nome ed email vengono presi dall'utente salvato
    pub fn with_sender_user(mut self, user: Option<&User>) -> Self {
        if let Some(user) = user {
            self.sender_name = user.username.clone();
            self.sender_email = user.email.clone();
        }
        self
    }
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        let thread_id = value.thread_id();
        let is_broadcast = value.is_broadcast();
        let is_from_guest = value.is_from_guest();
        let recipient_id = value.recipient_id();
        let (sender_id, sender_name, sender_email) = match value.sender {
            Sender::User { user_id } => (Some(user_id), String::new(), String::new()),
            Sender::Guest { name, email } => (None, name, email),
        };

        Self {
            message_id: value.message_id,
            thread_id,
            parent_id: value.parent_id,
            sender_id,
            sender_name,
            sender_email,
            recipient_id,
            is_broadcast,
            is_from_guest,
            subject: value.subject,
            body: value.body,
            status: value.status,
            read_at: value.read_at,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare un nuovo messaggio (senza message_id, lo stato iniziale è sempre UNREAD)
#[derive(Debug, Clone, Validate)]
pub struct CreateMessageDTO {
    pub sender: Sender,
    pub addressee: Addressee,

    #[validate(length(min = 1, max = 255, message = "Subject must be between 1 and 255 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 10000, message = "Body must be between 1 and 10000 characters"))]
    pub body: String,

    pub parent_id: Option<i32>,
    pub root_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Body di POST /messages
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendMessageRequestDTO {
    pub recipient_id: Option<i32>, // assente = a tutti gli amministratori
    pub subject: String,
    pub body: String,
}

/// Body di POST /contact (form pubblico)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ContactMessageRequestDTO {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Email address is not valid"), length(max = 255))]
    pub email: String,

    pub subject: String,
    pub body: String,
    pub csrf_token: String,
}

/// Body di POST /messages/{id}/reply
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReplyRequestDTO {
    pub body: String,
}

/// Body di PATCH /messages/{id}/status
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateStatusDTO {
    pub status: MessageStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct BulkStatusRequestDTO {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 ids are allowed"))]
    pub ids: Vec<i32>,
    pub status: MessageStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct BulkDeleteRequestDTO {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 ids are allowed"))]
    pub ids: Vec<i32>,
}

/// Esito di un'operazione bulk per un singolo id
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BulkItemOutcome {
    Ok,
    NotFound,
    Forbidden,
    Invalid,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BulkItemResultDTO {
    pub id: i32,
    pub outcome: BulkItemOutcome,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BulkOutcomeDTO {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkItemResultDTO>,
}

impl BulkOutcomeDTO {
    pub fn push(&mut self, id: i32, outcome: BulkItemOutcome) {
        if outcome == BulkItemOutcome::Ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(BulkItemResultDTO { id, outcome });
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ThreadDTO {
    pub root: MessageDTO,
    pub replies: Vec<MessageDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadCountDTO {
    pub inbox: i64,
    pub broadcast: i64, // sempre 0 per chi non è amministratore
    pub total: i64,
}
