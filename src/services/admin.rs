//! Admin services - Vista dei messaggi indirizzati a tutti gli amministratori

use crate::core::{AppError, AppState, require_administrator};
use crate::dtos::{AdminMessagesQuery, MessageDTO, PageDTO};
use crate::entities::User;
use crate::messaging::MessageFilter;
use crate::services::messages::to_message_dtos;
use axum::{
    Extension,
    extract::{Json, Query, State},
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, instrument};

#[debug_handler]
#[instrument(skip(state, current_user, query), fields(user_id = %current_user.user_id, status = ?query.status))]
pub async fn list_admin_broadcast(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
    Query(query): Query<AdminMessagesQuery>,
) -> Result<Json<PageDTO<MessageDTO>>, AppError> {
    // 1. Solo gli amministratori vedono i broadcast
    // 2. Senza filtro di stato gli archiviati restano fuori, non letti in testa
    // 3. Le risposte non sono elencate: si leggono dal thread della radice
    require_administrator(&current_user)?;

    let page = state.page(&query.pagination());
    let listed = state
        .store
        .list(MessageFilter::AdminBroadcast(query.status), page)
        .await?;
    let total = listed.total;
    let items = to_message_dtos(&state, listed.items).await?;

    debug!("Listed {} broadcast messages of {}", items.len(), total);
    Ok(Json(PageDTO::new(items, page, total)))
}
