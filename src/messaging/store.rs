//! Message Store - ciclo di vita dei messaggi
//!
//! Tutte le operazioni passano da qui: validazione, autorizzazione tramite il
//! Recipient Router, persistenza e, dopo la scrittura, l'evento per il dispatcher.

use crate::dtos::{BulkItemOutcome, BulkOutcomeDTO, CreateMessageDTO, Page, PageDTO, UnreadCountDTO};
use crate::entities::{Addressee, Message, MessageStatus, Sender};
use crate::messaging::dispatcher::{MessageEvent, NotificationDispatcher};
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::router::{
    Action, MessageFilter, Viewer, action_for_transition, can_mutate, can_view, is_addressee,
    reply_addressee,
};
use crate::messaging::thread::{Thread, resolve_thread};
use crate::repositories::{Create, Delete, MessageRepository, Read, UserRepository};
use chrono::Utc;
use futures::try_join;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidateEmail};

const REPLY_PREFIX: &str = "Re: ";
const MAX_SUBJECT_CHARS: usize = 255;

pub struct MessageStore {
    messages: MessageRepository,
    users: UserRepository,
    dispatcher: NotificationDispatcher,
}

impl MessageStore {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self {
            messages: MessageRepository::new(connection_pool.clone()),
            users: UserRepository::new(connection_pool.clone()),
            dispatcher: NotificationDispatcher::new(connection_pool),
        }
    }

    /// Crea un messaggio radice e notifica il destinatario se è un utente
    #[instrument(skip(self, data), fields(recipient = ?data.addressee.recipient_id()))]
    pub async fn create(&self, data: CreateMessageDTO) -> MessagingResult<Message> {
        let message = self.insert(data).await?;
        // la notifica parte solo dopo che il messaggio è salvato e non può farlo fallire
        self.dispatcher
            .dispatch(MessageEvent::MessageCreated(message.clone()))
            .await;
        Ok(message)
    }

    /// Restituisce il messaggio se visibile; se chi guarda è il destinatario lo segna come letto
    #[instrument(skip(self, viewer), fields(viewer = viewer.user_id))]
    pub async fn get(&self, id: i32, viewer: &Viewer) -> MessagingResult<Message> {
        let mut message = self.load_visible(id, viewer).await?;

        if message.status == MessageStatus::Unread && is_addressee(viewer, &message) {
            let now = Utc::now();
            if self.messages.mark_read_if_unread(&id, now).await? {
                debug!("Message {} marked as read on first view", id);
                message.status = MessageStatus::Read;
                message.read_at = Some(now);
            }
        }

        Ok(message)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: MessageFilter, page: Page) -> MessagingResult<PageDTO<Message>> {
        let (items, total) = try_join!(
            self.messages.find_many_by_filter(&filter, &page),
            self.messages.count_by_filter(&filter)
        )?;
        Ok(PageDTO::new(items, page, total))
    }

    #[instrument(skip(self, viewer), fields(viewer = viewer.user_id))]
    pub async fn unread_count(&self, viewer: &Viewer) -> MessagingResult<UnreadCountDTO> {
        let inbox = self
            .messages
            .count_by_filter(&MessageFilter::Unread(viewer.user_id))
            .await?;
        let broadcast = if viewer.is_admin {
            self.messages
                .count_by_filter(&MessageFilter::AdminBroadcast(Some(MessageStatus::Unread)))
                .await?
        } else {
            0
        };

        Ok(UnreadCountDTO {
            inbox,
            broadcast,
            total: inbox + broadcast,
        })
    }

    /// Transizione esplicita di stato.
    ///
    /// * `NotFound` - il messaggio non esiste o non è visibile al viewer
    /// * `Forbidden` - visibile ma il viewer non può applicare questa transizione
    /// * `Validation` - `Replied` non è impostabile a mano
    #[instrument(skip(self, viewer), fields(viewer = viewer.user_id))]
    pub async fn set_status(
        &self,
        id: i32,
        viewer: &Viewer,
        status: MessageStatus,
    ) -> MessagingResult<Message> {
        let mut message = self.load_visible(id, viewer).await.map_err(|e| e.conceal_forbidden())?;

        let action = action_for_transition(message.status, status).ok_or_else(|| {
            MessagingError::invalid_field(
                "status",
                "not_settable",
                "Status 'replied' is applied automatically when replying",
            )
        })?;

        if !can_mutate(viewer, &message, action) {
            warn!("User {} cannot apply {:?} to message {}", viewer.user_id, action, id);
            return Err(MessagingError::Forbidden(id));
        }

        let now = Utc::now();
        self.messages
            .update_status(&id, status, now)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => MessagingError::NotFound(id),
                other => MessagingError::Store(other),
            })?;

        match status {
            MessageStatus::Read => {
                message.read_at.get_or_insert(now);
            }
            MessageStatus::Unread => message.read_at = None,
            _ => {}
        }
        message.status = status;

        info!("Message {} set to {:?} by user {}", id, status, viewer.user_id);
        Ok(message)
    }

    /// Cancellazione definitiva, solo per mittente o destinatario (o admin per i broadcast)
    #[instrument(skip(self, viewer), fields(viewer = viewer.user_id))]
    pub async fn delete(&self, id: i32, viewer: &Viewer) -> MessagingResult<()> {
        let message = self.load_visible(id, viewer).await?;

        if !can_mutate(viewer, &message, Action::Delete) {
            warn!("User {} cannot delete message {}", viewer.user_id, id);
            return Err(MessagingError::Forbidden(id));
        }

        if !self.messages.delete(&id).await? {
            // cancellato da un'altra richiesta nel frattempo
            return Err(MessagingError::NotFound(id));
        }

        info!("Message {} deleted by user {}", id, viewer.user_id);
        Ok(())
    }

    /// Risponde a `parent_id`: la risposta va "all'altra parte", si aggancia alla radice
    /// del thread e la radice (insieme al messaggio a cui si risponde) passa a `replied`
    #[instrument(skip(self, viewer, body), fields(viewer = viewer.user_id))]
    pub async fn reply(&self, parent_id: i32, viewer: &Viewer, body: String) -> MessagingResult<Message> {
        let parent = self
            .messages
            .read(&parent_id)
            .await?
            .ok_or(MessagingError::NotFound(parent_id))?;

        if !can_mutate(viewer, &parent, Action::Reply) {
            warn!("User {} cannot reply to message {}", viewer.user_id, parent_id);
            return Err(MessagingError::Forbidden(parent_id));
        }

        let root_id = parent.thread_id();
        let root_subject = if parent.is_thread_root() {
            parent.subject.clone()
        } else {
            match self.messages.read(&root_id).await? {
                Some(root) => root.subject,
                None => parent.subject.clone(),
            }
        };

        let reply = self
            .insert(CreateMessageDTO {
                sender: Sender::User {
                    user_id: viewer.user_id,
                },
                addressee: reply_addressee(&parent, viewer),
                subject: reply_subject(&root_subject),
                body,
                parent_id: Some(parent_id),
                root_id: Some(root_id),
                created_at: Utc::now(),
            })
            .await?;

        // radice cancellata: mark_replied non trova la riga e restituisce false
        let mut answered = vec![root_id];
        if parent_id != root_id {
            answered.push(parent_id);
        }
        for id in answered {
            if self.messages.mark_replied(&id).await? {
                debug!("Message {} marked as replied", id);
            }
        }

        self.dispatcher
            .dispatch(MessageEvent::ReplyCreated {
                reply: reply.clone(),
                parent,
            })
            .await;

        Ok(reply)
    }

    pub async fn thread(&self, id: i32, viewer: &Viewer) -> MessagingResult<Thread> {
        resolve_thread(&self.messages, id, viewer).await
    }

    /// Applica `set_status` a ogni id; gli errori non interrompono gli id successivi
    #[instrument(skip(self, ids, viewer), fields(viewer = viewer.user_id, count = ids.len()))]
    pub async fn bulk_set_status(
        &self,
        ids: &[i32],
        viewer: &Viewer,
        status: MessageStatus,
    ) -> BulkOutcomeDTO {
        let mut outcome = BulkOutcomeDTO::default();
        for id in dedup(ids) {
            let result = self.set_status(id, viewer, status).await.map(|_| ());
            outcome.push(id, bulk_outcome(result));
        }
        info!("Bulk status: {} ok, {} failed", outcome.succeeded, outcome.failed);
        outcome
    }

    #[instrument(skip(self, ids, viewer), fields(viewer = viewer.user_id, count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[i32], viewer: &Viewer) -> BulkOutcomeDTO {
        let mut outcome = BulkOutcomeDTO::default();
        for id in dedup(ids) {
            let result = self
                .delete(id, viewer)
                .await
                .map_err(MessagingError::conceal_forbidden);
            outcome.push(id, bulk_outcome(result));
        }
        info!("Bulk delete: {} ok, {} failed", outcome.succeeded, outcome.failed);
        outcome
    }

    /// Legge il messaggio e verifica la visibilità (Forbidden se esiste ma non è visibile)
    async fn load_visible(&self, id: i32, viewer: &Viewer) -> MessagingResult<Message> {
        let message = self
            .messages
            .read(&id)
            .await?
            .ok_or(MessagingError::NotFound(id))?;

        if !can_view(viewer, &message) {
            warn!("User {} cannot view message {}", viewer.user_id, id);
            return Err(MessagingError::Forbidden(id));
        }
        Ok(message)
    }

    /// Valida e salva, senza eventi
    async fn insert(&self, data: CreateMessageDTO) -> MessagingResult<Message> {
        validate_message(&data)?;

        if let Addressee::SingleUser { user_id } = data.addressee {
            if let Sender::User { user_id: sender_id } = data.sender {
                if sender_id == user_id {
                    return Err(MessagingError::invalid_field(
                        "recipient_id",
                        "self",
                        "Cannot send a message to yourself",
                    ));
                }
            }
            if self.users.read(&user_id).await?.is_none() {
                return Err(MessagingError::invalid_field(
                    "recipient_id",
                    "unknown",
                    "Recipient does not exist",
                ));
            }
        }

        let message = self.messages.create(&data).await?;
        Ok(message)
    }
}

/// Subject non vuoto, body non vuoto e, per gli ospiti, nome ed email validi
fn validate_message(data: &CreateMessageDTO) -> MessagingResult<()> {
    data.validate()?;

    if data.subject.trim().is_empty() {
        return Err(MessagingError::invalid_field("subject", "blank", "Subject is required"));
    }
    if data.body.trim().is_empty() {
        return Err(MessagingError::invalid_field("body", "blank", "Body is required"));
    }
    if let Sender::Guest { name, email } = &data.sender {
        if name.trim().is_empty() {
            return Err(MessagingError::invalid_field("name", "blank", "Name is required"));
        }
        if !email.validate_email() {
            return Err(MessagingError::invalid_field(
                "email",
                "email",
                "Email address is not valid",
            ));
        }
    }
    Ok(())
}

/// Prefisso "Re: " una sola volta, troncato al limite del subject
fn reply_subject(subject: &str) -> String {
    let already_prefixed = subject
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("re:"));
    let subject = if already_prefixed {
        subject.to_string()
    } else {
        format!("{REPLY_PREFIX}{subject}")
    };
    if subject.chars().count() > MAX_SUBJECT_CHARS {
        subject.chars().take(MAX_SUBJECT_CHARS).collect()
    } else {
        subject
    }
}

fn dedup(ids: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn bulk_outcome(result: MessagingResult<()>) -> BulkItemOutcome {
    match result {
        Ok(()) => BulkItemOutcome::Ok,
        Err(MessagingError::NotFound(_)) => BulkItemOutcome::NotFound,
        Err(MessagingError::Forbidden(_)) => BulkItemOutcome::Forbidden,
        Err(MessagingError::Validation(_)) => BulkItemOutcome::Invalid,
        Err(MessagingError::Store(e)) => {
            warn!("Bulk item failed on store error: {:?}", e);
            BulkItemOutcome::Failed
        }
    }
}
