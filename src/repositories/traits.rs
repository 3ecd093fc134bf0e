//! Common repository traits
//!
//! Interfacce generiche per le operazioni di database. Ogni repository implementa solo
//! quelle che le servono; le query specifiche restano metodi inerenti.

/// Creazione di una nuova entità, l'id viene assegnato dal database
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Lettura per chiave primaria
///
/// * `Ok(Some(Entity))` - entità trovata
/// * `Ok(None)` - nessuna entità con quell'id
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Lettura di più entità per lista di chiavi primarie
///
/// L'ordine del risultato non corrisponde necessariamente a quello degli id forniti,
/// gli id inesistenti vengono semplicemente ignorati.
pub trait ReadMany<Entity, Id> {
    async fn read_many(&self, ids: &[Id]) -> Result<Vec<Entity>, sqlx::Error>;
}

/// Cancellazione definitiva per chiave primaria
///
/// Ritorna `true` se una riga è stata rimossa, `false` se l'id non esisteva.
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<bool, sqlx::Error>;
}
