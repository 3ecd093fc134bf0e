//! Auth services - Login e rilascio del token di sessione

use crate::core::{AppError, AppState, encode_jwt};
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const SESSION_MAX_AGE_SECS: u32 = 24 * 60 * 60;

/// DTO per il login (solo username e password)
#[derive(Deserialize)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Verificare che la password sia stata fornita (fail-fast prima della query DB)
    // 2. Cercare l'utente tramite username, UNAUTHORIZED se non esiste
    // 3. Verificare la password con bcrypt, UNAUTHORIZED se non corrisponde
    // 4. Generare il token JWT (userid, username, segreto)
    // 5. Ritornare Set-Cookie (HttpOnly, Secure, SameSite=Lax, 24 ore) e Authorization
    if body.password.is_empty() {
        return Err(AppError::unauthorized("Username or password are not correct."));
    }

    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) => user,
        None => {
            warn!("Login failed: unknown username");
            return Err(AppError::unauthorized("Username or password are not correct."));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Login failed: wrong password for user {}", user.user_id);
        return Err(AppError::unauthorized("Username or password are not correct."));
    }

    let token = encode_jwt(user.username, user.user_id, &state.jwt_secret)
        .map_err(|_| AppError::internal_server_error("Failed to create session token"))?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token, SESSION_MAX_AGE_SECS
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie_value)
            .map_err(|_| AppError::internal_server_error("Failed to create session token"))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Failed to create session token"))?,
    );

    info!("User {} logged in", user.user_id);
    Ok((StatusCode::OK, headers))
}
