//! Club inbox library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod messaging;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/contact", configure_contact_routes())
        .nest("/messages", configure_message_routes(state.clone()))
        .nest("/admin", configure_admin_routes(state.clone()))
        .nest("/notifications", configure_notification_routes(state.clone()))
        .with_state(state)
}

/// Configura le routes di autenticazione (login)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new().route("/login", post(login_user))
}

/// Form contatti pubblico: nessuna autenticazione, protetto dal token CSRF
fn configure_contact_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/", post(send_contact_message))
        .route("/token", get(issue_contact_token))
}

/// Configura le routes per i messaggi dell'utente autenticato
fn configure_message_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", post(send_message))
        .route("/inbox", get(list_inbox))
        .route("/sent", get(list_sent))
        .route("/archived", get(list_archived))
        .route("/unread", get(list_unread))
        .route("/unread/count", get(get_unread_count))
        .route("/bulk/status", post(bulk_update_status))
        .route("/bulk/delete", post(bulk_delete_messages))
        .route("/{message_id}", get(get_message).delete(delete_message))
        .route("/{message_id}/thread", get(get_thread))
        .route("/{message_id}/status", patch(update_message_status))
        .route("/{message_id}/reply", post(reply_to_message))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes riservate agli amministratori
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/messages", get(list_admin_broadcast))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes per le notifiche dell'utente
fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_notifications))
        .route("/unread/count", get(get_notification_unread_count))
        .route("/{notification_id}/read", patch(mark_notification_read))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
