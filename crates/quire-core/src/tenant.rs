//! Tenant identity resolution.
//!
//! Only the pure part lives here: deciding which tenant a request targets.
//! Selecting a storage handle for that tenant is done by the db layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuireError;

/// Tenant id used when a request carries no usable tenant hint.
pub const DEFAULT_TENANT: &str = "default";

/// Longest accepted tenant id.
pub const MAX_TENANT_ID_LEN: usize = 63;

/// Storage isolation mode, fixed at start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenancyMode {
    #[default]
    Single,
    Multi,
}

impl TenancyMode {
    pub fn is_multi(&self) -> bool {
        matches!(self, TenancyMode::Multi)
    }
}

impl fmt::Display for TenancyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenancyMode::Single => f.write_str("single"),
            TenancyMode::Multi => f.write_str("multi"),
        }
    }
}

impl FromStr for TenancyMode {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(TenancyMode::Single),
            "multi" => Ok(TenancyMode::Multi),
            other => Err(QuireError::validation(format!(
                "unknown tenancy mode '{other}'"
            ))),
        }
    }
}

/// Pick the tenant id for a request.
///
/// Precedence: explicit header, then the first label of a host name with
/// more than two labels (`acme.example.com` → `acme`), then
/// [`DEFAULT_TENANT`]. Any port suffix on the host is ignored.
pub fn resolve_tenant_id(header: Option<&str>, host: Option<&str>) -> String {
    if let Some(id) = header.map(str::trim).filter(|h| !h.is_empty()) {
        return id.to_string();
    }

    if let Some(host) = host {
        let name = host.split(':').next().unwrap_or_default();
        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() > 2 && !labels[0].is_empty() {
            return labels[0].to_string();
        }
    }

    DEFAULT_TENANT.to_string()
}

/// Reject tenant ids that cannot safely name a database.
pub fn validate_tenant_id(id: &str) -> Result<(), QuireError> {
    if id.is_empty() || id.len() > MAX_TENANT_ID_LEN {
        return Err(QuireError::validation(format!(
            "tenant id must be 1 to {MAX_TENANT_ID_LEN} characters"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(QuireError::validation(
            "tenant id may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_host() {
        assert_eq!(
            resolve_tenant_id(Some("acme"), Some("other.example.com")),
            "acme"
        );
    }

    #[test]
    fn blank_header_is_ignored() {
        assert_eq!(
            resolve_tenant_id(Some("  "), Some("shop.example.com")),
            "shop"
        );
    }

    #[test]
    fn subdomain_is_used_when_host_has_three_labels() {
        assert_eq!(resolve_tenant_id(None, Some("acme.example.com")), "acme");
        assert_eq!(
            resolve_tenant_id(None, Some("acme.example.com:8080")),
            "acme"
        );
    }

    #[test]
    fn short_hosts_fall_back_to_default() {
        assert_eq!(resolve_tenant_id(None, Some("example.com")), DEFAULT_TENANT);
        assert_eq!(resolve_tenant_id(None, Some("localhost:3000")), DEFAULT_TENANT);
        assert_eq!(resolve_tenant_id(None, None), DEFAULT_TENANT);
    }

    #[test]
    fn tenant_id_charset_and_length() {
        assert!(validate_tenant_id("acme").is_ok());
        assert!(validate_tenant_id("acme_co-2").is_ok());
        assert!(validate_tenant_id("").is_err());
        assert!(validate_tenant_id("bad tenant").is_err());
        assert!(validate_tenant_id("x;DROP").is_err());
        assert!(validate_tenant_id(&"a".repeat(64)).is_err());
        assert!(validate_tenant_id(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn tenancy_mode_parses_case_insensitively() {
        assert_eq!("Multi".parse::<TenancyMode>().unwrap(), TenancyMode::Multi);
        assert_eq!("single".parse::<TenancyMode>().unwrap(), TenancyMode::Single);
        assert!("both".parse::<TenancyMode>().is_err());
    }
}
