//! Thread Resolver - ricostruisce una conversazione dalla radice
//!
//! Ogni risposta salva `root_id` già normalizzato alla radice, quindi il thread è
//! sempre piatto: radice + risposte ordinate per data crescente. La visibilità è
//! controllata solo sulla radice, le risposte la ereditano.

use crate::entities::Message;
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::router::{Viewer, can_view};
use crate::repositories::{MessageRepository, Read};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct Thread {
    pub root: Message,
    pub replies: Vec<Message>,
}

/// Risolve il thread di `id`, che può essere la radice o una qualsiasi risposta.
///
/// Se la radice è stata cancellata la risposta orfana viene restituita come radice
/// di un thread senza altre risposte.
#[instrument(skip(messages, viewer), fields(viewer = viewer.user_id))]
pub async fn resolve_thread(
    messages: &MessageRepository,
    id: i32,
    viewer: &Viewer,
) -> MessagingResult<Thread> {
    let requested = messages
        .read(&id)
        .await?
        .ok_or(MessagingError::NotFound(id))?;

    let (root, orphaned) = match requested.root_id {
        None => (requested, false),
        Some(root_id) => match messages.read(&root_id).await? {
            Some(root) => (root, false),
            None => {
                debug!("Root {} of message {} no longer exists", root_id, id);
                (requested, true)
            }
        },
    };

    if !can_view(viewer, &root) {
        warn!("User {} cannot view thread {}", viewer.user_id, root.message_id);
        return Err(MessagingError::Forbidden(root.message_id));
    }

    let replies = if orphaned {
        Vec::new()
    } else {
        messages.find_replies_by_root_id(&root.message_id).await?
    };

    debug!("Thread {} has {} replies", root.message_id, replies.len());
    Ok(Thread { root, replies })
}
