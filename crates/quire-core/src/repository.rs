//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Content repositories take the
//! request's `tenant_id` to enforce data isolation; users belong to the
//! storage handle itself and carry no tenant id.

use uuid::Uuid;

use crate::error::QuireResult;
use crate::models::{
    category::{Category, CreateCategory, UpdateCategory},
    menu::{CreateMenu, Menu, UpdateMenu},
    page::{CreatePage, Page, PageListOptions, UpdatePage},
    post::{CreatePost, Post, PostListOptions, UpdatePost},
    settings::{ContentStats, GlobalSettings},
    user::{CreateUser, UpdateUser, User},
};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Pagination parameters for list queries. `limit: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

impl Pagination {
    pub fn unbounded() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }

    /// Build from raw query values. A missing limit uses the default page
    /// size, a non-positive limit disables the limit, and a non-positive
    /// offset starts at the beginning.
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            None => Some(DEFAULT_PAGE_SIZE),
            Some(l) if l <= 0 => None,
            Some(l) => Some(l as u64),
        };
        let offset = offset.filter(|o| *o > 0).map_or(0, |o| o as u64);
        Self { offset, limit }
    }

    /// SurrealQL `LIMIT .. START ..` suffix for this page.
    pub fn clause(&self) -> String {
        match self.limit {
            Some(limit) => format!("LIMIT {limit} START {}", self.offset),
            None if self.offset > 0 => format!("START {}", self.offset),
            None => String::new(),
        }
    }
}

/// A paginated result set. `total` counts matches before pagination.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

pub trait PageRepository: Send + Sync {
    fn create(&self, input: CreatePage) -> impl Future<Output = QuireResult<Page>> + Send;
    fn get_by_id(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> impl Future<Output = QuireResult<Page>> + Send;
    fn get_by_slug(
        &self,
        tenant_id: &str,
        slug: &str,
    ) -> impl Future<Output = QuireResult<Page>> + Send;
    fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        input: UpdatePage,
    ) -> impl Future<Output = QuireResult<Page>> + Send;
    /// Soft delete: the page stays stored but disappears from every read.
    fn delete(&self, tenant_id: &str, id: Uuid) -> impl Future<Output = QuireResult<()>> + Send;
    fn list(
        &self,
        tenant_id: &str,
        options: PageListOptions,
    ) -> impl Future<Output = QuireResult<PaginatedResult<Page>>> + Send;
    fn publish(&self, tenant_id: &str, id: Uuid)
    -> impl Future<Output = QuireResult<Page>> + Send;
    /// Back to draft, clearing `published_at`.
    fn unpublish(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> impl Future<Output = QuireResult<Page>> + Send;
}

pub trait MenuRepository: Send + Sync {
    fn create(&self, input: CreateMenu) -> impl Future<Output = QuireResult<Menu>> + Send;
    fn get_by_id(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> impl Future<Output = QuireResult<Menu>> + Send;
    fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        input: UpdateMenu,
    ) -> impl Future<Output = QuireResult<Menu>> + Send;
    fn delete(&self, tenant_id: &str, id: Uuid) -> impl Future<Output = QuireResult<()>> + Send;
    fn list(
        &self,
        tenant_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = QuireResult<PaginatedResult<Menu>>> + Send;
}

pub trait CategoryRepository: Send + Sync {
    fn create(&self, input: CreateCategory)
    -> impl Future<Output = QuireResult<Category>> + Send;
    fn get_by_id(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> impl Future<Output = QuireResult<Category>> + Send;
    fn get_by_slug(
        &self,
        tenant_id: &str,
        slug: &str,
    ) -> impl Future<Output = QuireResult<Category>> + Send;
    fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        input: UpdateCategory,
    ) -> impl Future<Output = QuireResult<Category>> + Send;
    /// Removes the category and every post link to it.
    fn delete(&self, tenant_id: &str, id: Uuid) -> impl Future<Output = QuireResult<()>> + Send;
    fn list(
        &self,
        tenant_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = QuireResult<PaginatedResult<Category>>> + Send;
}

pub trait PostRepository: Send + Sync {
    fn create(&self, input: CreatePost) -> impl Future<Output = QuireResult<Post>> + Send;
    fn get_by_id(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> impl Future<Output = QuireResult<Post>> + Send;
    /// Public lookup: only published posts are visible.
    fn get_published_by_slug(
        &self,
        tenant_id: &str,
        slug: &str,
    ) -> impl Future<Output = QuireResult<Post>> + Send;
    fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        input: UpdatePost,
    ) -> impl Future<Output = QuireResult<Post>> + Send;
    fn delete(&self, tenant_id: &str, id: Uuid) -> impl Future<Output = QuireResult<()>> + Send;
    fn list(
        &self,
        tenant_id: &str,
        options: PostListOptions,
    ) -> impl Future<Output = QuireResult<PaginatedResult<Post>>> + Send;
}

// ---------------------------------------------------------------------------
// Accounts & site configuration
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = QuireResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = QuireResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = QuireResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = QuireResult<User>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = QuireResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = QuireResult<PaginatedResult<User>>> + Send;
    fn count(&self) -> impl Future<Output = QuireResult<u64>> + Send;
}

pub trait SettingsRepository: Send + Sync {
    /// Returns the defaults when nothing has been stored yet.
    fn get_global_settings(
        &self,
        tenant_id: &str,
    ) -> impl Future<Output = QuireResult<GlobalSettings>> + Send;
    fn update_global_settings(
        &self,
        tenant_id: &str,
        settings: GlobalSettings,
    ) -> impl Future<Output = QuireResult<GlobalSettings>> + Send;
}

pub trait StatsRepository: Send + Sync {
    fn content_stats(
        &self,
        tenant_id: &str,
    ) -> impl Future<Output = QuireResult<ContentStats>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_from_query() {
        assert_eq!(
            Pagination::from_query(None, None),
            Pagination {
                offset: 0,
                limit: Some(DEFAULT_PAGE_SIZE)
            }
        );
        assert_eq!(
            Pagination::from_query(Some(5), Some(10)),
            Pagination {
                offset: 10,
                limit: Some(5)
            }
        );
        assert_eq!(Pagination::from_query(Some(0), Some(-3)), Pagination::unbounded());
        assert_eq!(Pagination::from_query(Some(-1), None).limit, None);
    }

    #[test]
    fn pagination_clause() {
        assert_eq!(Pagination::from_query(Some(5), Some(10)).clause(), "LIMIT 5 START 10");
        assert_eq!(Pagination::unbounded().clause(), "");
        assert_eq!(
            Pagination {
                offset: 4,
                limit: None
            }
            .clause(),
            "START 4"
        );
    }
}
