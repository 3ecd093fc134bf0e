//! Contact services - Form contatti pubblico (nessuna autenticazione, token CSRF)

use crate::core::sanitize::{sanitize_plain_text, sanitize_rich_text};
use crate::core::{AppError, AppState};
use crate::dtos::{ContactMessageRequestDTO, CreateMessageDTO, MessageDTO};
use crate::entities::{Addressee, Sender};
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct CsrfTokenDTO {
    pub csrf_token: String,
}

#[instrument(skip(state))]
pub async fn issue_contact_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CsrfTokenDTO>, AppError> {
    let csrf_token = state
        .csrf
        .issue()
        .map_err(|_| AppError::internal_server_error("Failed to issue CSRF token"))?;
    Ok(Json(CsrfTokenDTO { csrf_token }))
}

#[instrument(skip(state, body))]
pub async fn send_contact_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactMessageRequestDTO>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    debug!("Contact form submission");
    // 1. Verificare il token CSRF prima di qualsiasi scrittura
    // 2. Sanitizzare nome e subject (testo semplice) e body (rich text)
    // 3. Validare nome ed email dell'ospite
    // 4. Creare il messaggio per tutti gli amministratori, senza mittente registrato
    if !state.csrf.verify(&body.csrf_token) {
        warn!("Contact form rejected: invalid CSRF token");
        return Err(AppError::forbidden("Invalid or expired form token"));
    }

    let form = ContactMessageRequestDTO {
        name: sanitize_plain_text(&body.name),
        email: body.email.trim().to_string(),
        subject: sanitize_plain_text(&body.subject),
        body: sanitize_rich_text(&body.body),
        csrf_token: body.csrf_token,
    };
    form.validate()?;

    let message = state
        .store
        .create(CreateMessageDTO {
            sender: Sender::Guest {
                name: form.name,
                email: form.email,
            },
            addressee: Addressee::AllAdministrators,
            subject: form.subject,
            body: form.body,
            parent_id: None,
            root_id: None,
            created_at: Utc::now(),
        })
        .await?;

    info!("Contact message {} stored for administrators", message.message_id);
    Ok((StatusCode::CREATED, Json(MessageDTO::from(message))))
}
