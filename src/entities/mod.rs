//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod enums;
pub mod message;
pub mod notification;
pub mod user;

// Re-exports per facilitare l'import
pub use enums::{MessageStatus, NotificationType, UserRole};
pub use message::{Addressee, Message, Sender};
pub use notification::Notification;
pub use user::User;
