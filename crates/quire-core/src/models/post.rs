//! Blog post domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use crate::repository::Pagination;

pub use super::status::ContentStatus as PostStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub tenant_id: String,
    pub title: String,
    /// Unique across the store.
    pub slug: String,
    pub excerpt: String,
    /// Free-form body, conventionally a serialized block sequence.
    pub content: String,
    pub featured_image: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePost {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub tenant_id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub status: Option<PostStatus>,
    pub author_id: Option<Uuid>,
    /// Every id must name an existing category.
    pub category_ids: Vec<Uuid>,
}

/// Partial update. `category_ids: Some(..)` replaces every category link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
    pub category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default)]
pub struct PostListOptions {
    pub pagination: Pagination,
    pub status: Option<PostStatus>,
    pub category_id: Option<Uuid>,
}
