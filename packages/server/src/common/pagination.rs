//! Offset pagination for list endpoints.
//!
//! ```rust,ignore
//! async fn list(Query(page): Query<PageParams>) {
//!     let page = page.validate();
//!     Notification::find_for_recipient(member_id, page, pool).await
//! }
//! ```

use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 25;
const MAX_LIMIT: i64 = 100;

/// Raw `?limit=&offset=` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Pagination with defaults applied and bounds enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Number of items to fetch (1-100, default 25).
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    pub fn validate(&self) -> Page {
        Page {
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        PageParams::default().validate()
    }
}
