//! Publication status shared by pages and posts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuireError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, ContentStatus::Published)
    }

    /// The `published_at` value a record must carry after moving to this
    /// status.
    ///
    /// A record that stays published keeps its original timestamp; one
    /// entering published gets `now`; any other status clears it.
    pub fn published_at(
        &self,
        current: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if self.is_published() {
            Some(current.unwrap_or(now))
        } else {
            None
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            other => Err(QuireError::validation(format!(
                "invalid status '{other}', expected draft, published or archived"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_only_lowercase_tags() {
        assert_eq!(
            "published".parse::<ContentStatus>().unwrap(),
            ContentStatus::Published
        );
        assert!("Published".parse::<ContentStatus>().is_err());
        assert!("invalid".parse::<ContentStatus>().is_err());
    }

    #[test]
    fn published_at_follows_status() {
        let now = Utc::now();
        let earlier = now - Duration::days(3);

        assert_eq!(ContentStatus::Published.published_at(None, now), Some(now));
        assert_eq!(
            ContentStatus::Published.published_at(Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(ContentStatus::Draft.published_at(Some(earlier), now), None);
        assert_eq!(ContentStatus::Archived.published_at(None, now), None);
    }
}
