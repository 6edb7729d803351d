//! The two edge components every deployment consists of: the content site for the primary domain
//! and the shared redirect responder for everything else.

use std::fmt::Display;

use http::{StatusCode, Uri};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    domain::{normalize, DomainName},
    error::ResolveError,
    resolver::Resolution,
};

const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
const DEFAULT_ERROR_DOCUMENT: &str = "error.html";
const DEFAULT_LOG_RETENTION_DAYS: u32 = 14;
const ACCESS_LOG_BUCKET_SUFFIX: &str = "-access-logs";

/// Tunables of the content site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SiteSettings {
    pub index_document: String,
    pub error_document: String,
    /// Days after which access logs expire
    pub log_retention_days: u32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings {
            index_document: DEFAULT_INDEX_DOCUMENT.to_string(),
            error_document: DEFAULT_ERROR_DOCUMENT.to_string(),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
        }
    }
}

/// Bucket plus distribution serving the primary domain's content over HTTPS
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentSite {
    pub domain_name: DomainName,
    pub bucket_name: String,
    pub index_document: String,
    pub error_document: String,
    pub access_log_bucket: String,
    pub access_log_prefix: String,
    pub log_retention_days: u32,
    /// HTTP requests are redirected to HTTPS by the distribution
    pub redirect_to_https: bool,
    /// Names served by the distribution. Only ever the primary domain, its subdomains go through the redirect responder
    pub aliases: Vec<DomainName>,
}

impl ContentSite {
    pub fn for_primary(primary_domain: &str, settings: &SiteSettings) -> Self {
        ContentSite {
            domain_name: primary_domain.to_owned(),
            bucket_name: primary_domain.to_owned(),
            index_document: settings.index_document.to_owned(),
            error_document: settings.error_document.to_owned(),
            access_log_bucket: format!("{}{}", primary_domain, ACCESS_LOG_BUCKET_SUFFIX),
            access_log_prefix: format!("{}/", primary_domain),
            log_retention_days: settings.log_retention_days,
            redirect_to_https: true,
            aliases: vec![primary_domain.to_owned()],
        }
    }
}

/// The single responder answering all redirect domains with a redirect to the primary domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponder {
    pub primary_domain: DomainName,
    pub status: StatusCode,
    pub location: Uri,
    /// Every name routed to the responder, identical to the certificate's SANs
    pub aliases: Vec<DomainName>,
}

/// The response returned for every request hitting the redirect responder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    pub status: StatusCode,
    pub location: Uri,
}

impl RedirectResponder {
    pub fn new(primary_domain: &str, aliases: Vec<DomainName>) -> Result<Self, ResolveError> {
        let location = format!("https://{}", primary_domain)
            .parse::<Uri>()
            .map_err(|e| {
                ResolveError::InvalidDomainConfig(format!(
                    "cannot redirect to {}: {}",
                    primary_domain, e
                ))
            })?;
        Ok(RedirectResponder {
            primary_domain: primary_domain.to_owned(),
            status: StatusCode::FOUND,
            location,
            aliases,
        })
    }

    /// Identifier for the edge function, e.g. `examplecomRedirect` for `example.com`
    pub fn function_name(&self) -> String {
        format!("{}Redirect", self.primary_domain.replace('.', ""))
    }

    pub fn respond(&self) -> RedirectResponse {
        RedirectResponse {
            status: self.status,
            location: self.location.to_owned(),
        }
    }

    /// Whether this responder answers for a host, honouring single-level wildcard aliases
    pub fn serves(&self, host: &str) -> bool {
        let host = normalize(host);
        self.aliases.iter().any(|alias| match alias.strip_prefix("*.") {
            Some(parent) => host
                .split_once('.')
                .is_some_and(|(label, rest)| !label.is_empty() && rest == parent),
            None => *alias == host,
        })
    }
}

impl Display for RedirectResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Location: {}", self.status, self.location)
    }
}

/// URLs published after a successful deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteOutputs {
    pub url: String,
    pub redirect_urls: Vec<String>,
}

impl SiteOutputs {
    pub fn new(primary_domain: &str, resolution: &Resolution) -> Self {
        SiteOutputs {
            url: format!("https://{}", primary_domain),
            redirect_urls: resolution
                .san_list
                .iter()
                .map(|name| format!("https://{}", name))
                .collect_vec(),
        }
    }
}

impl Display for SiteOutputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)?;
        if !self.redirect_urls.is_empty() {
            write!(f, " (redirected from {})", self.redirect_urls.iter().join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::DomainConfig,
        resolver::{resolve, DomainSet},
    };

    #[test]
    fn should_build_content_site_with_defaults() {
        let site = ContentSite::for_primary("example.com", &SiteSettings::default());
        assert_eq!(site.bucket_name, "example.com");
        assert_eq!(site.index_document, "index.html");
        assert_eq!(site.error_document, "error.html");
        assert_eq!(site.access_log_bucket, "example.com-access-logs");
        assert_eq!(site.access_log_prefix, "example.com/");
        assert_eq!(site.log_retention_days, 14);
        assert_eq!(site.aliases, vec!["example.com"]);
        assert!(site.redirect_to_https);
    }

    #[test]
    fn should_apply_site_settings() {
        let settings = SiteSettings {
            index_document: "home.html".to_string(),
            error_document: "404.html".to_string(),
            log_retention_days: 30,
        };
        let site = ContentSite::for_primary("example.com", &settings);
        assert_eq!(site.index_document, "home.html");
        assert_eq!(site.error_document, "404.html");
        assert_eq!(site.log_retention_days, 30);
    }

    #[test]
    fn should_redirect_to_primary() {
        let responder =
            RedirectResponder::new("example.com", vec!["www.example.com".to_string()]).unwrap();
        let response = responder.respond();
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location.scheme_str(), Some("https"));
        assert_eq!(response.location.host(), Some("example.com"));
        assert_eq!(responder.function_name(), "examplecomRedirect");
    }

    #[test]
    fn should_serve_aliases_and_wildcards() {
        let responder = RedirectResponder::new(
            "example.com",
            vec![
                "www.example.com".to_string(),
                "example.org".to_string(),
                "*.example.org".to_string(),
            ],
        )
        .unwrap();
        assert!(responder.serves("www.example.com"));
        assert!(responder.serves("Example.org"));
        assert!(responder.serves("blog.example.org"));
        assert!(!responder.serves("a.b.example.org"));
        assert!(!responder.serves("example.com"));
        assert!(!responder.serves("example.net"));
    }

    #[test]
    fn should_serve_fully_qualified_hosts() {
        let responder = RedirectResponder::new(
            "example.com",
            vec!["www.example.com".to_string(), "*.example.org".to_string()],
        )
        .unwrap();
        assert!(responder.serves("www.example.com."));
        assert!(responder.serves("Blog.Example.org."));
        assert!(!responder.serves("example.com."));
    }

    #[test]
    fn should_publish_outputs() {
        let set = DomainSet::new(
            DomainConfig::new("example.com", &["www.example.com"]).unwrap(),
            vec![DomainConfig::bare("example.org").unwrap()],
        )
        .unwrap();
        let outputs = SiteOutputs::new("example.com", &resolve(&set));
        assert_eq!(outputs.url, "https://example.com");
        assert_eq!(
            outputs.redirect_urls,
            vec!["https://www.example.com", "https://example.org"]
        );
        assert_eq!(
            outputs.to_string(),
            "https://example.com (redirected from https://www.example.com,https://example.org)"
        );
    }
}
