//! Registered domains and the subdomain patterns they support.
//!
//! A [`DomainConfig`] is validated once when it is created and is immutable afterwards,
//! so every other module can rely on its patterns being subordinate to its registered domain.

use std::fmt::Display;

use itertools::Itertools;
use log::trace;

use crate::error::ResolveError;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const WILDCARD_LABEL: &str = "*";

pub type DomainName = String;

/// One registered domain together with the subdomains that should be served for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainConfig {
    registered_domain: DomainName,
    supported_subdomains: Vec<DomainName>,
}

impl DomainConfig {
    /// Create a new config, normalizing all names to lowercase without a trailing dot.
    ///
    /// Returns [`ResolveError::InvalidDomainConfig`] if any name is malformed or
    /// if a subdomain pattern does not belong to `registered_domain`.
    pub fn new<S: AsRef<str>>(
        registered_domain: &str,
        supported_subdomains: &[S],
    ) -> Result<DomainConfig, ResolveError> {
        let registered_domain = normalize(registered_domain);
        validate_name(&registered_domain, false)?;

        let supported_subdomains = supported_subdomains
            .iter()
            .map(|s| normalize(s.as_ref()))
            .collect_vec();
        for sub in &supported_subdomains {
            validate_subdomain(sub, &registered_domain)?;
        }
        trace!(
            "Validated domain {} with subdomains {:?}",
            registered_domain,
            supported_subdomains
        );

        Ok(DomainConfig {
            registered_domain,
            supported_subdomains,
        })
    }

    /// Config for a registered domain without any subdomains
    pub fn bare(registered_domain: &str) -> Result<DomainConfig, ResolveError> {
        DomainConfig::new::<&str>(registered_domain, &[])
    }

    pub fn registered_domain(&self) -> &str {
        &self.registered_domain
    }

    pub fn supported_subdomains(&self) -> &[DomainName] {
        &self.supported_subdomains
    }

    /// The registered domain followed by all of its subdomain patterns, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.registered_domain.as_str())
            .chain(self.supported_subdomains.iter().map(String::as_str))
    }
}

impl Display for DomainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.supported_subdomains.is_empty() {
            write!(f, "{}", self.registered_domain)
        } else {
            write!(
                f,
                "{} [{}]",
                self.registered_domain,
                self.supported_subdomains.iter().join(", ")
            )
        }
    }
}

/// Returns whether a name is a wildcard pattern such as `*.example.com`
pub fn is_wildcard(name: &str) -> bool {
    name.starts_with("*.")
}

/// Lowercase a name and strip its trailing root dot. DNS names are case-insensitive and may be written fully qualified
pub fn normalize(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase()
}

fn validate_name(name: &str, allow_wildcard: bool) -> Result<(), ResolveError> {
    let invalid = |reason: &str| {
        Err(ResolveError::InvalidDomainConfig(format!(
            "'{}' is not a valid domain name: {}",
            name, reason
        )))
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.len() > MAX_NAME_LEN {
        return invalid("name is longer than 253 characters");
    }

    let labels = name.split('.').collect_vec();
    if labels.len() < 2 {
        return invalid("name must contain at least two labels");
    }
    for (idx, label) in labels.iter().enumerate() {
        if *label == WILDCARD_LABEL {
            if !allow_wildcard {
                return invalid("wildcards are not allowed here");
            }
            if idx != 0 {
                return invalid("a wildcard may only be the leftmost label");
            }
            continue;
        }
        if label.is_empty() {
            return invalid("empty label");
        }
        if label.len() > MAX_LABEL_LEN {
            return invalid("label is longer than 63 characters");
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return invalid("labels may only contain letters, digits and '-'");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return invalid("labels may not start or end with '-'");
        }
    }
    Ok(())
}

fn validate_subdomain(sub: &str, registered_domain: &str) -> Result<(), ResolveError> {
    validate_name(sub, true)?;

    let belongs = match sub.strip_prefix("*.") {
        // Single-level wildcards only: *.X is valid iff X is the registered domain itself
        Some(parent) => parent == registered_domain,
        None => sub
            .strip_suffix(registered_domain)
            .is_some_and(|prefix| prefix.len() > 1 && prefix.ends_with('.')),
    };

    if belongs {
        Ok(())
    } else {
        Err(ResolveError::InvalidDomainConfig(format!(
            "subdomain pattern {} does not belong to registered domain {}",
            sub, registered_domain
        )))
    }
}

#[cfg(test)]
mod tests {
    use totems::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn should_accept_exact_and_wildcard_subdomains() {
        let d = DomainConfig::new(
            "example.com",
            &["www.example.com", "*.example.com", "a.b.example.com"],
        )
        .unwrap();
        assert_eq!(d.registered_domain(), "example.com");
        assert_eq!(
            d.supported_subdomains(),
            &["www.example.com", "*.example.com", "a.b.example.com"]
        );
    }

    #[test]
    fn should_accept_empty_subdomains() {
        assert_ok!(DomainConfig::bare("example.org"));
        let d = DomainConfig::bare("example.org").unwrap();
        assert!(d.supported_subdomains().is_empty());
        assert_eq!(d.names().collect_vec(), vec!["example.org"]);
    }

    #[test]
    fn should_normalize_names() {
        let d = DomainConfig::new("Example.COM.", &["WWW.example.com."]).unwrap();
        assert_eq!(d.registered_domain(), "example.com");
        assert_eq!(d.supported_subdomains(), &["www.example.com"]);
    }

    #[test]
    fn should_reject_wildcard_of_other_domain() {
        let r = DomainConfig::new("example.com", &["*.other.com"]);
        assert!(matches!(r, Err(ResolveError::InvalidDomainConfig(_))));
    }

    #[test]
    fn should_reject_exact_subdomain_of_other_domain() {
        assert_err!(DomainConfig::new("example.com", &["www.other.com"]));
        // Suffix match must happen on a label boundary
        assert_err!(DomainConfig::new("example.com", &["wwwexample.com"]));
    }

    #[test]
    fn should_reject_registered_domain_as_its_own_subdomain() {
        assert_err!(DomainConfig::new("example.com", &["example.com"]));
    }

    #[test]
    fn should_reject_multi_level_wildcards() {
        assert_err!(DomainConfig::new("example.com", &["*.shop.example.com"]));
        assert_err!(DomainConfig::new("example.com", &["shop.*.example.com"]));
        assert_err!(DomainConfig::new("example.com", &["*.*.example.com"]));
    }

    #[test]
    fn should_reject_wildcard_registered_domain() {
        assert_err!(DomainConfig::bare("*.example.com"));
    }

    #[test]
    fn should_reject_malformed_names() {
        assert_err!(DomainConfig::bare(""));
        assert_err!(DomainConfig::bare("localhost"));
        assert_err!(DomainConfig::bare("exa mple.com"));
        assert_err!(DomainConfig::bare("-example.com"));
        assert_err!(DomainConfig::bare("example..com"));
        assert_err!(DomainConfig::bare(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn should_detect_wildcards() {
        assert!(is_wildcard("*.example.com"));
        assert!(!is_wildcard("www.example.com"));
    }

    #[test]
    fn should_display_subdomains() {
        let d = DomainConfig::new("example.com", &["www.example.com", "*.example.com"]).unwrap();
        assert_eq!(d.to_string(), "example.com [www.example.com, *.example.com]");
        assert_eq!(
            DomainConfig::bare("example.org").unwrap().to_string(),
            "example.org"
        );
    }
}
