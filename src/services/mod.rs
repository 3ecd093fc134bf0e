//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod admin;
pub mod auth;
pub mod contact;
pub mod messages;
pub mod notifications;

// Re-exports per facilitare l'import
pub use admin::list_admin_broadcast;
pub use auth::login_user;
pub use contact::{issue_contact_token, send_contact_message};
pub use messages::{
    bulk_delete_messages, bulk_update_status, delete_message, get_message, get_thread,
    get_unread_count, list_archived, list_inbox, list_sent, list_unread, reply_to_message,
    send_message, update_message_status,
};
pub use notifications::{
    get_notification_unread_count, list_notifications, mark_notification_read,
};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
