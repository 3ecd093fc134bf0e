//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//!
//! Le query usano `sqlx::query` / `sqlx::query_as` con il bind dei parametri a run-time
//! (niente macro `query!`), così il crate compila anche senza un database raggiungibile.
//! Le entità implementano `FromRow` (derive oppure a mano, vedi `Message`).
//! I filtri delle liste messaggi sono composti con `QueryBuilder` dal Recipient Router.

pub mod message;
pub mod notification;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, ReadMany};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;
