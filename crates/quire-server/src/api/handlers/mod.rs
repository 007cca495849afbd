pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod dashboard;
pub(crate) mod health;
pub(crate) mod menus;
pub(crate) mod pages;
pub(crate) mod posts;
pub(crate) mod settings;
pub(crate) mod users;

use quire_core::models::status::ContentStatus;
use quire_core::repository::Pagination;
use serde::Deserialize;

use super::error::ApiError;

/// `?limit=&offset=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.limit, self.offset)
    }
}

/// Status strings arrive untyped so that an unknown value is a 400 with a
/// useful message rather than a generic body rejection. Blank means unset.
pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<ContentStatus>, ApiError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<ContentStatus>)
        .transpose()
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("")).unwrap(), None);
        assert_eq!(
            parse_status(Some("published")).unwrap(),
            Some(ContentStatus::Published)
        );
        assert_eq!(parse_status(Some("invalid")).unwrap_err().status(), 400);
    }
}
