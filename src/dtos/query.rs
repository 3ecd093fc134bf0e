//! Query DTOs - Data Transfer Objects per query string e paginazione

use crate::entities::MessageStatus;
use serde::{Deserialize, Serialize};

/// Query parameters di paginazione: ?page=1&page_size=20
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct PaginationQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PaginationQuery {
    /// Normalizza pagina (1-based) e dimensione, limitata a `max_page_size`
    pub fn resolve(&self, default_page_size: u32, max_page_size: u32) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self
            .page_size
            .unwrap_or(default_page_size)
            .clamp(1, max_page_size.max(1));
        Page { page, page_size }
    }
}

/// Query parameters della vista broadcast degli amministratori
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct AdminMessagesQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub status: Option<MessageStatus>,
}

impl AdminMessagesQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Pagina già normalizzata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

/// Risposta paginata
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PageDTO<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

impl<T> PageDTO<T> {
    pub fn new(items: Vec<T>, page: Page, total: i64) -> Self {
        Self {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageDTO<U> {
        PageDTO {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let page = PaginationQuery::default().resolve(20, 100);
        assert_eq!(page, Page { page: 1, page_size: 20 });
        assert_eq!(page.offset(), 0);

        let page = PaginationQuery {
            page: Some(3),
            page_size: Some(500),
        }
        .resolve(20, 100);
        assert_eq!(page.page_size, 100);
        assert_eq!(page.offset(), 200);

        let page = PaginationQuery {
            page: Some(0),
            page_size: Some(0),
        }
        .resolve(20, 100);
        assert_eq!(page, Page { page: 1, page_size: 1 });
    }
}
