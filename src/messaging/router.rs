//! Recipient Router - indirizzamento e autorizzazione dei messaggi
//!
//! Unica fonte di verità per:
//! - a chi è indirizzato un messaggio ([`resolve_addressee`], [`reply_addressee`])
//! - chi può vederlo o modificarlo ([`can_view`], [`can_mutate`])
//! - quali righe compongono ogni vista elencabile ([`MessageFilter`])

use crate::entities::{Addressee, Message, MessageStatus, User};
use sqlx::{QueryBuilder, Sqlite};

/// Identità di chi sta operando, ridotta a ciò che serve per autorizzare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: i32,
    pub is_admin: bool,
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            is_admin: user.is_admin(),
        }
    }
}

/// Operazioni che modificano un messaggio esistente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MarkRead,
    MarkUnread,
    Archive,
    Unarchive,
    Reply,
    Delete,
}

pub fn resolve_addressee(message: &Message) -> Addressee {
    message.addressee
}

/// `viewer_id` è il mittente o il destinatario, oppure il messaggio è un broadcast
/// e chi guarda è amministratore
pub fn visible_to(message: &Message, viewer_id: i32, viewer_is_admin: bool) -> bool {
    message.sender_id() == Some(viewer_id)
        || message.recipient_id() == Some(viewer_id)
        || (message.is_broadcast() && viewer_is_admin)
}

pub fn can_view(viewer: &Viewer, message: &Message) -> bool {
    visible_to(message, viewer.user_id, viewer.is_admin)
}

/// Il viewer è un destinatario valido del messaggio (ogni amministratore lo è per i broadcast)
pub fn is_addressee(viewer: &Viewer, message: &Message) -> bool {
    match resolve_addressee(message) {
        Addressee::SingleUser { user_id } => user_id == viewer.user_id,
        Addressee::AllAdministrators => viewer.is_admin,
    }
}

fn is_sender(viewer: &Viewer, message: &Message) -> bool {
    message.sender_id() == Some(viewer.user_id)
}

pub fn can_mutate(viewer: &Viewer, message: &Message, action: Action) -> bool {
    match action {
        Action::MarkRead | Action::MarkUnread => is_addressee(viewer, message),
        Action::Archive | Action::Unarchive | Action::Delete => {
            is_addressee(viewer, message) || is_sender(viewer, message)
        }
        Action::Reply => can_view(viewer, message),
    }
}

/// Azione richiesta da una transizione esplicita `current -> requested`.
///
/// Ritorna `None` per `Replied`, che viene applicato solo automaticamente.
pub fn action_for_transition(current: MessageStatus, requested: MessageStatus) -> Option<Action> {
    match (current, requested) {
        (_, MessageStatus::Replied) => None,
        (_, MessageStatus::Archived) => Some(Action::Archive),
        (MessageStatus::Archived, _) => Some(Action::Unarchive),
        (_, MessageStatus::Read) => Some(Action::MarkRead),
        (_, MessageStatus::Unread) => Some(Action::MarkUnread),
    }
}

/// Destinatario di una risposta: "l'altra parte" rispetto a chi risponde.
///
/// Se risponde il mittente originale la risposta va al destinatario originale (anche se
/// era il gruppo degli amministratori). Altrimenti va al mittente originale; un ospite
/// non ha un utente da indirizzare, quindi la risposta resta agli amministratori.
pub fn reply_addressee(original: &Message, replier: &Viewer) -> Addressee {
    if is_sender(replier, original) {
        return resolve_addressee(original);
    }
    match original.sender_id() {
        Some(user_id) => Addressee::SingleUser { user_id },
        None => Addressee::AllAdministrators,
    }
}

/// Viste elencabili sulla tabella `messages`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    Inbox(i32),
    Sent(i32),
    Archived(i32),
    Unread(i32),
    /// Radici broadcast; senza stato esplicito esclude le archiviate
    AdminBroadcast(Option<MessageStatus>),
}

pub fn compose_inbox_filter(user_id: i32) -> MessageFilter {
    MessageFilter::Inbox(user_id)
}

impl MessageFilter {
    /// Aggiunge la clausola WHERE (senza la keyword) al builder
    pub fn push_predicate(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        match *self {
            MessageFilter::Inbox(user_id) => {
                query
                    .push("recipient_id = ")
                    .push_bind(user_id)
                    .push(" AND status <> ")
                    .push_bind(MessageStatus::Archived);
            }
            // lo stato è condiviso col destinatario: la vista sent non filtra per stato
            MessageFilter::Sent(user_id) => {
                query.push("sender_id = ").push_bind(user_id);
            }
            MessageFilter::Archived(user_id) => {
                query
                    .push("status = ")
                    .push_bind(MessageStatus::Archived)
                    .push(" AND (recipient_id = ")
                    .push_bind(user_id)
                    .push(" OR sender_id = ")
                    .push_bind(user_id)
                    .push(")");
            }
            MessageFilter::Unread(user_id) => {
                query
                    .push("recipient_id = ")
                    .push_bind(user_id)
                    .push(" AND status = ")
                    .push_bind(MessageStatus::Unread);
            }
            MessageFilter::AdminBroadcast(status) => {
                query.push("recipient_id IS NULL AND root_id IS NULL AND ");
                match status {
                    Some(status) => query.push("status = ").push_bind(status),
                    None => query
                        .push("status <> ")
                        .push_bind(MessageStatus::Archived),
                };
            }
        }
    }

    /// Aggiunge la clausola ORDER BY; a parità di data vince l'id più alto
    pub fn push_order(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            MessageFilter::AdminBroadcast(_) => query.push(
                " ORDER BY CASE WHEN status = 'UNREAD' THEN 0 ELSE 1 END, created_at DESC, message_id DESC",
            ),
            _ => query.push(" ORDER BY created_at DESC, message_id DESC"),
        };
    }
}
