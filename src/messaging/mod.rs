//! Messaging Module - sottosistema dei messaggi interni del club
//!
//! - `router`: indirizzamento (utente singolo o tutti gli admin) e autorizzazione
//! - `store`: creazione, lettura, liste, stati e cancellazione dei messaggi
//! - `thread`: ricostruzione delle conversazioni
//! - `dispatcher`: notifiche best-effort come effetto collaterale

pub mod dispatcher;
pub mod error;
pub mod router;
pub mod store;
pub mod thread;

pub use dispatcher::{DispatchOutcome, MessageEvent, NotificationDispatcher};
pub use error::{MessagingError, MessagingResult};
pub use router::{Action, MessageFilter, Viewer};
pub use store::MessageStore;
pub use thread::Thread;
