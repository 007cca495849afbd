//! Page domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::Block;
use crate::repository::Pagination;

pub use super::status::ContentStatus as PageStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    /// Empty in single-tenant mode.
    pub tenant_id: String,
    pub slug: String,
    pub title: String,
    pub status: PageStatus,
    pub blocks: Vec<Block>,
    /// Free-form SEO and custom fields. Always a JSON object.
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePage {
    /// Generated when absent.
    pub id: Option<Uuid>,
    pub tenant_id: String,
    pub slug: String,
    pub title: String,
    /// Defaults to draft.
    pub status: Option<PageStatus>,
    pub blocks: Vec<Block>,
    pub meta: Option<serde_json::Value>,
}

/// Partial update. `None` leaves a field untouched; `blocks: Some(vec![])`
/// clears the blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePage {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub status: Option<PageStatus>,
    pub blocks: Option<Vec<Block>>,
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct PageListOptions {
    pub pagination: Pagination,
    pub status: Option<PageStatus>,
    /// Case-insensitive substring match over title or slug.
    pub search: Option<String>,
}
