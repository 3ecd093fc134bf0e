//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod message;
pub mod notification;
pub mod query;

pub use message::{
    BulkDeleteRequestDTO, BulkItemOutcome, BulkItemResultDTO, BulkOutcomeDTO,
    BulkStatusRequestDTO, ContactMessageRequestDTO, CreateMessageDTO, MessageDTO, ReplyRequestDTO,
    SendMessageRequestDTO, ThreadDTO, UnreadCountDTO, UpdateStatusDTO,
};
pub use notification::{CreateNotificationDTO, NotificationCountDTO, NotificationDTO};
pub use query::{AdminMessagesQuery, Page, PageDTO, PaginationQuery};
