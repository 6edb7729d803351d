//! The hand-authored site description: which domain serves content, which ones redirect to it,
//! and optionally the hosted zones backing them.
//!
//! ```json
//! {
//!   "primary": { "registeredDomain": "example.com", "supportedSubdomains": ["www.example.com"] },
//!   "redirects": [{ "registeredDomain": "example.org", "supportedSubdomains": ["*.example.org"] }],
//!   "certificateName": "Example homepage",
//!   "zones": { "example.com": "Z0123456789", "example.org": "Z9876543210" }
//! }
//! ```

use std::{collections::HashMap, fs, path::Path};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    domain::{normalize, DomainConfig},
    error::ResolveError,
    resolver::DomainSet,
    site::SiteSettings,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("could not parse site configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid zone assignment '{0}', expected DOMAIN=ZONE_ID")]
    InvalidZone(String),
    #[error("zone for domain {0} is configured more than once")]
    DuplicateZone(String),
    #[error("{0}")]
    Domain(#[from] ResolveError),
}

/// A [`DomainConfig`] as written in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DomainEntry {
    pub registered_domain: String,
    #[serde(default)]
    pub supported_subdomains: Vec<String>,
}

impl TryFrom<&DomainEntry> for DomainConfig {
    type Error = ResolveError;

    fn try_from(e: &DomainEntry) -> Result<Self, Self::Error> {
        DomainConfig::new(&e.registered_domain, e.supported_subdomains.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteConfig {
    pub primary: DomainEntry,
    #[serde(default)]
    pub redirects: Vec<DomainEntry>,
    #[serde(default)]
    pub certificate_name: Option<String>,
    #[serde(default)]
    pub site: SiteSettings,
    /// Registered domain -> hosted zone id, used by the fixed provider
    #[serde(default)]
    pub zones: HashMap<String, String>,
}

impl SiteConfig {
    pub fn from_file(path: &Path) -> Result<SiteConfig, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Read site configuration from {}", path.display());
        SiteConfig::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<SiteConfig, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Validate all entries and assemble them into a [`DomainSet`]
    pub fn domain_set(&self) -> Result<DomainSet, ConfigError> {
        let primary = DomainConfig::try_from(&self.primary)?;
        let redirects = self
            .redirects
            .iter()
            .map(DomainConfig::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DomainSet::new(primary, redirects)?)
    }

    /// The configured zones keyed by normalized domain, with `DOMAIN=ZONE_ID` assignments applied on top.
    ///
    /// Later assignments replace earlier ones and the configuration file. Two file entries naming the
    /// same domain are rejected, as there is no order between them.
    pub fn zones_with_overrides<S: AsRef<str>>(
        &self,
        assignments: &[S],
    ) -> Result<HashMap<String, String>, ConfigError> {
        let mut zones = HashMap::with_capacity(self.zones.len() + assignments.len());
        for (domain, id) in &self.zones {
            let domain = normalize(domain);
            if zones.insert(domain.to_owned(), id.to_owned()).is_some() {
                return Err(ConfigError::DuplicateZone(domain));
            }
        }
        for a in assignments {
            let (domain, id) = parse_zone_assignment(a.as_ref())?;
            if let Some(previous) = zones.insert(normalize(&domain), id.to_owned()) {
                debug!("Zone {} for {} replaces {}", id, domain, previous);
            }
        }
        Ok(zones)
    }
}

/// Parse a `DOMAIN=ZONE_ID` pair as given on the command line
pub fn parse_zone_assignment(s: &str) -> Result<(String, String), ConfigError> {
    match s.split_once('=') {
        Some((domain, zone)) if !domain.trim().is_empty() && !zone.trim().is_empty() => {
            Ok((domain.trim().to_owned(), zone.trim().to_owned()))
        }
        _ => Err(ConfigError::InvalidZone(s.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use totems::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn should_parse_full_config() {
        let raw = json!({
            "primary": { "registeredDomain": "example.com", "supportedSubdomains": ["www.example.com"] },
            "redirects": [
                { "registeredDomain": "example.org", "supportedSubdomains": ["*.example.org"] },
                { "registeredDomain": "example.net" }
            ],
            "certificateName": "Example homepage",
            "site": { "logRetentionDays": 7 },
            "zones": { "example.com": "Z1", "example.org": "Z2", "example.net": "Z3" }
        })
        .to_string();

        let config = SiteConfig::from_json(&raw).unwrap();
        assert_eq!(config.certificate_name.as_deref(), Some("Example homepage"));
        assert_eq!(config.site.log_retention_days, 7);
        assert_eq!(config.site.index_document, "index.html");
        assert_eq!(config.zones.len(), 3);

        let set = config.domain_set().unwrap();
        assert_eq!(set.primary().registered_domain(), "example.com");
        assert_eq!(set.redirects().len(), 2);
        assert!(set.redirects()[1].supported_subdomains().is_empty());
    }

    #[test]
    fn should_parse_minimal_config() {
        let raw = json!({ "primary": { "registeredDomain": "example.com" } }).to_string();
        let config = SiteConfig::from_json(&raw).unwrap();
        assert!(config.redirects.is_empty());
        assert_eq!(config.site, SiteSettings::default());
        assert_ok!(config.domain_set());
    }

    #[test]
    fn should_reject_unknown_fields() {
        let raw = json!({
            "primary": { "registeredDomain": "example.com", "subdomains": ["www.example.com"] }
        })
        .to_string();
        assert!(matches!(
            SiteConfig::from_json(&raw),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn should_reject_invalid_domains() {
        let raw = json!({
            "primary": { "registeredDomain": "example.com", "supportedSubdomains": ["*.other.com"] }
        })
        .to_string();
        let config = SiteConfig::from_json(&raw).unwrap();
        assert!(matches!(
            config.domain_set(),
            Err(ConfigError::Domain(ResolveError::InvalidDomainConfig(_)))
        ));
    }

    #[test]
    fn should_reject_self_redirect() {
        let raw = json!({
            "primary": { "registeredDomain": "example.com" },
            "redirects": [{ "registeredDomain": "EXAMPLE.com" }]
        })
        .to_string();
        assert_err!(SiteConfig::from_json(&raw).unwrap().domain_set());
    }

    #[test]
    fn should_reject_collisions_before_zone_lookup() {
        // No zone is configured for shop.example.com, the authoring error is still what gets reported
        let raw = json!({
            "primary": { "registeredDomain": "example.com", "supportedSubdomains": ["shop.example.com"] },
            "redirects": [{ "registeredDomain": "shop.example.com" }],
            "zones": { "example.com": "Z1" }
        })
        .to_string();
        let config = SiteConfig::from_json(&raw).unwrap();
        assert!(matches!(
            config.domain_set(),
            Err(ConfigError::Domain(ResolveError::DuplicateDomainAssignment { ref name, .. }))
                if name == "shop.example.com"
        ));
    }

    #[test]
    fn should_override_zones_case_insensitively() {
        let raw = json!({
            "primary": { "registeredDomain": "example.com" },
            "zones": { "Example.com": "FROM_FILE", "example.org.": "Z2" }
        })
        .to_string();
        let config = SiteConfig::from_json(&raw).unwrap();
        let zones = config
            .zones_with_overrides(&["example.com=FROM_CLI", "EXAMPLE.net=Z3"])
            .unwrap();
        assert_eq!(
            zones,
            HashMap::from([
                ("example.com".to_string(), "FROM_CLI".to_string()),
                ("example.org".to_string(), "Z2".to_string()),
                ("example.net".to_string(), "Z3".to_string()),
            ])
        );
    }

    #[test]
    fn should_reject_zones_configured_twice() {
        let raw = json!({
            "primary": { "registeredDomain": "example.com" },
            "zones": { "Example.com": "Z1", "example.com": "Z2" }
        })
        .to_string();
        let config = SiteConfig::from_json(&raw).unwrap();
        assert!(matches!(
            config.zones_with_overrides::<&str>(&[]),
            Err(ConfigError::DuplicateZone(ref d)) if d == "example.com"
        ));
        assert!(matches!(
            config.zones_with_overrides(&["example.org"]),
            Err(ConfigError::DuplicateZone(_))
        ));
    }

    #[test]
    fn should_report_missing_file() {
        let r = SiteConfig::from_file(Path::new("/nonexistent/site.json"));
        assert!(matches!(r, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn should_parse_zone_assignments() {
        assert_eq!(
            parse_zone_assignment("example.com=Z1").unwrap(),
            ("example.com".to_string(), "Z1".to_string())
        );
        assert_err!(parse_zone_assignment("example.com"));
        assert_err!(parse_zone_assignment("=Z1"));
        assert_err!(parse_zone_assignment("example.com="));
    }
}
