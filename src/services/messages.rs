//! Message services - Endpoint HTTP del sottosistema messaggi

use crate::core::sanitize::{sanitize_plain_text, sanitize_rich_text};
use crate::core::{AppError, AppState};
use crate::dtos::{
    BulkDeleteRequestDTO, BulkOutcomeDTO, BulkStatusRequestDTO, CreateMessageDTO, MessageDTO,
    PageDTO, PaginationQuery, ReplyRequestDTO, SendMessageRequestDTO, ThreadDTO, UnreadCountDTO,
    UpdateStatusDTO,
};
use crate::entities::{Addressee, Message, Sender, User};
use crate::messaging::router::compose_inbox_filter;
use crate::messaging::{MessageFilter, MessagingError, Viewer};
use crate::repositories::ReadMany;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Converte i messaggi in DTO risolvendo nome ed email dei mittenti registrati
/// con una sola query sugli utenti
pub(crate) async fn to_message_dtos(
    state: &AppState,
    messages: Vec<Message>,
) -> Result<Vec<MessageDTO>, AppError> {
    let sender_ids: Vec<i32> = messages
        .iter()
        .filter_map(Message::sender_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let senders: HashMap<i32, User> = if sender_ids.is_empty() {
        HashMap::new()
    } else {
        state
            .user
            .read_many(&sender_ids)
            .await?
            .into_iter()
            .map(|user| (user.user_id, user))
            .collect()
    };

    Ok(messages
        .into_iter()
        .map(|message| {
            let sender = message.sender_id().and_then(|id| senders.get(&id));
            MessageDTO::from(message).with_sender_user(sender)
        })
        .collect())
}

async fn to_message_dto(state: &AppState, message: Message) -> Result<MessageDTO, AppError> {
    to_message_dtos(state, vec![message])
        .await?
        .pop()
        .ok_or_else(|| AppError::internal_server_error("Internal server error"))
}

async fn list_with_filter(
    state: &AppState,
    filter: MessageFilter,
    pagination: &PaginationQuery,
) -> Result<Json<PageDTO<MessageDTO>>, AppError> {
    let page = state.page(pagination);
    let listed = state.store.list(filter, page).await?;
    let total = listed.total;
    let items = to_message_dtos(state, listed.items).await?;
    debug!("Listed {} of {} messages", items.len(), total);
    Ok(Json(PageDTO::new(items, page, total)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, recipient = ?body.recipient_id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<SendMessageRequestDTO>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    debug!("Sending message");
    // 1. Sanitizzare subject (testo semplice) e body (rich text)
    // 2. Destinatario assente = messaggio per tutti gli amministratori
    // 3. Il Message Store valida, salva e notifica il destinatario
    let new_message = CreateMessageDTO {
        sender: Sender::User {
            user_id: current_user.user_id,
        },
        addressee: Addressee::from(body.recipient_id),
        subject: sanitize_plain_text(&body.subject),
        body: sanitize_rich_text(&body.body),
        parent_id: None,
        root_id: None,
        created_at: Utc::now(),
    };

    let message = state.store.create(new_message).await?;
    info!("Message {} sent", message.message_id);
    Ok((StatusCode::CREATED, Json(to_message_dto(&state, message).await?)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, parent_id = %message_id))]
pub async fn reply_to_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(message_id): Path<i32>,
    Json(body): Json<ReplyRequestDTO>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    debug!("Replying to message");
    let viewer = Viewer::from(&current_user);
    let reply = state
        .store
        .reply(message_id, &viewer, sanitize_rich_text(&body.body))
        .await
        .map_err(MessagingError::conceal_forbidden)?;

    info!("Reply {} created", reply.message_id);
    Ok((StatusCode::CREATED, Json(to_message_dto(&state, reply).await?)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(message_id): Path<i32>,
) -> Result<Json<MessageDTO>, AppError> {
    let viewer = Viewer::from(&current_user);
    let message = state
        .store
        .get(message_id, &viewer)
        .await
        .map_err(MessagingError::conceal_forbidden)?;
    Ok(Json(to_message_dto(&state, message).await?))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(message_id): Path<i32>,
) -> Result<Json<ThreadDTO>, AppError> {
    let viewer = Viewer::from(&current_user);
    let thread = state
        .store
        .thread(message_id, &viewer)
        .await
        .map_err(MessagingError::conceal_forbidden)?;

    // radice in testa, poi le risposte: una sola risoluzione dei mittenti
    let mut messages = Vec::with_capacity(thread.replies.len() + 1);
    messages.push(thread.root);
    messages.extend(thread.replies);
    let mut dtos = to_message_dtos(&state, messages).await?.into_iter();
    let root = dtos
        .next()
        .ok_or_else(|| AppError::internal_server_error("Internal server error"))?;

    Ok(Json(ThreadDTO {
        root,
        replies: dtos.collect(),
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, status = ?body.status))]
pub async fn update_message_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(message_id): Path<i32>,
    Json(body): Json<UpdateStatusDTO>,
) -> Result<Json<MessageDTO>, AppError> {
    let viewer = Viewer::from(&current_user);
    let message = state
        .store
        .set_status(message_id, &viewer, body.status)
        .await?;
    Ok(Json(to_message_dto(&state, message).await?))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(message_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let viewer = Viewer::from(&current_user);
    state
        .store
        .delete(message_id, &viewer)
        .await
        .map_err(MessagingError::conceal_forbidden)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user, pagination), fields(user_id = %current_user.user_id))]
pub async fn list_inbox(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageDTO<MessageDTO>>, AppError> {
    list_with_filter(&state, compose_inbox_filter(current_user.user_id), &pagination).await
}

#[instrument(skip(state, current_user, pagination), fields(user_id = %current_user.user_id))]
pub async fn list_sent(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageDTO<MessageDTO>>, AppError> {
    list_with_filter(&state, MessageFilter::Sent(current_user.user_id), &pagination).await
}

#[instrument(skip(state, current_user, pagination), fields(user_id = %current_user.user_id))]
pub async fn list_archived(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageDTO<MessageDTO>>, AppError> {
    list_with_filter(&state, MessageFilter::Archived(current_user.user_id), &pagination).await
}

#[instrument(skip(state, current_user, pagination), fields(user_id = %current_user.user_id))]
pub async fn list_unread(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageDTO<MessageDTO>>, AppError> {
    list_with_filter(&state, MessageFilter::Unread(current_user.user_id), &pagination).await
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_unread_count(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<UnreadCountDTO>, AppError> {
    let viewer = Viewer::from(&current_user);
    Ok(Json(state.store.unread_count(&viewer).await?))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, count = body.ids.len()))]
pub async fn bulk_update_status(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<BulkStatusRequestDTO>,
) -> Result<Json<BulkOutcomeDTO>, AppError> {
    body.validate()?;
    let viewer = Viewer::from(&current_user);
    Ok(Json(
        state
            .store
            .bulk_set_status(&body.ids, &viewer, body.status)
            .await,
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, count = body.ids.len()))]
pub async fn bulk_delete_messages(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<BulkDeleteRequestDTO>,
) -> Result<Json<BulkOutcomeDTO>, AppError> {
    body.validate()?;
    let viewer = Viewer::from(&current_user);
    Ok(Json(state.store.bulk_delete(&body.ids, &viewer).await))
}
