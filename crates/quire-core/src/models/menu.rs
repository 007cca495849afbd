//! Navigation menu domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One menu entry; entries nest to any depth. Missing fields take their
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub label: String,
    pub url: String,
    /// e.g. `_blank`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Menu {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub items: Vec<MenuItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMenu {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub items: Vec<MenuItem>,
}

/// Partial update. `items: Some(vec![])` clears the entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMenu {
    pub name: Option<String>,
    pub description: Option<String>,
    pub items: Option<Vec<MenuItem>>,
}
