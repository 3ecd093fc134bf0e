//! Notification services - Notifiche dell'utente corrente

use crate::core::{AppError, AppState};
use crate::dtos::{NotificationCountDTO, NotificationDTO, PageDTO, PaginationQuery};
use crate::entities::User;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use futures::try_join;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[instrument(skip(state, current_user, pagination), fields(user_id = %current_user.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PageDTO<NotificationDTO>>, AppError> {
    let page = state.page(&pagination);
    let (items, total) = try_join!(
        state.notification.find_many_by_user_id(&current_user.user_id, &page),
        state.notification.count_by_user_id(&current_user.user_id)
    )?;

    Ok(Json(PageDTO::new(items, page, total).map(NotificationDTO::from)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_notification_unread_count(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<NotificationCountDTO>, AppError> {
    let unread = state
        .notification
        .count_unread_by_user_id(&current_user.user_id)
        .await?;
    Ok(Json(NotificationCountDTO { unread }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(notification_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    // le notifiche di altri utenti risultano inesistenti
    if !state
        .notification
        .mark_read(&notification_id, &current_user.user_id)
        .await?
    {
        warn!("Notification {} not found for user", notification_id);
        return Err(AppError::not_found("Notification not found"));
    }

    info!("Notification {} marked as read", notification_id);
    Ok(StatusCode::NO_CONTENT)
}
