//! Application State - Stato globale dell'applicazione
//!
//! Contiene i repository, il Message Store e le configurazioni condivise
//! necessarie per gestire le richieste.

use crate::core::config::Config;
use crate::core::csrf::CsrfGuard;
use crate::dtos::{Page, PaginationQuery};
use crate::messaging::MessageStore;
use crate::repositories::{NotificationRepository, UserRepository};
use sqlx::SqlitePool;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_CSRF_TTL_SECS: i64 = 3600;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la lettura degli utenti (identità)
    pub user: UserRepository,

    /// Repository per le notifiche dell'utente
    pub notification: NotificationRepository,

    /// Message Store: unico punto di accesso ai messaggi
    pub store: MessageStore,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Emissione e verifica dei token CSRF del form contatti
    pub csrf: CsrfGuard,

    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppState {
    /// Crea una nuova istanza di AppState con paginazione e CSRF di default.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni SQLite condiviso
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    pub fn new(pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            notification: NotificationRepository::new(pool.clone()),
            store: MessageStore::new(pool),
            csrf: CsrfGuard::new(&jwt_secret, DEFAULT_CSRF_TTL_SECS),
            jwt_secret,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Come [`AppState::new`] ma con i valori letti dalla configurazione
    pub fn from_config(pool: SqlitePool, config: &Config) -> Self {
        let mut state = Self::new(pool, config.jwt_secret.clone());
        state.csrf = CsrfGuard::new(&config.jwt_secret, config.csrf_token_ttl_secs);
        state.default_page_size = config.default_page_size;
        state.max_page_size = config.max_page_size;
        state
    }

    pub fn page(&self, query: &PaginationQuery) -> Page {
        query.resolve(self.default_page_size, self.max_page_size)
    }
}
