//! Site-wide settings and dashboard counters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which [`GlobalSettings`] are stored in `system_config`.
pub const GLOBAL_SETTINGS_KEY: &str = "global_settings";

pub const DEFAULT_SITE_NAME: &str = "Quire CMS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub site_name: String,
    pub logo: String,
    pub favicon: String,
    pub contact_email: String,
    pub header_menu_id: Option<Uuid>,
    pub footer_menu_id: Option<Uuid>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.into(),
            logo: String::new(),
            favicon: String::new(),
            contact_email: String::new(),
            header_menu_id: None,
            footer_menu_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
    pub pages: u64,
    pub posts: u64,
    pub categories: u64,
    pub users: u64,
}
