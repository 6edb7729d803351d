//! Errors raised while resolving a [`DomainSet`](crate::resolver::DomainSet) into certificates, zones and records.
//!
//! None of these are recoverable: any of them aborts the provisioning run before the provider is asked to change anything.

use thiserror::Error;

use crate::{plan::TargetKind, provider::ProviderError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A subdomain pattern is not subordinate to its registered domain, a name is malformed,
    /// or the primary domain is also listed as a redirect domain
    #[error("invalid domain configuration: {0}")]
    InvalidDomainConfig(String),
    /// The same name would receive two alias records
    #[error("domain {name} is assigned twice (as {first} and as {second})")]
    DuplicateDomainAssignment {
        name: String,
        first: TargetKind,
        second: TargetKind,
    },
    /// The provider has no hosted zone for a registered domain. Zones are never created automatically
    #[error("no hosted zone found for registered domain {0}")]
    ZoneNotFound(String),
    /// A record references a registered domain that was never bound to a zone
    #[error("registered domain {0} has no zone binding")]
    UnboundZone(String),
    #[error("provider error: {0}")]
    Provider(ProviderError),
}

impl From<ProviderError> for ResolveError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::ZoneNotFound(domain) => ResolveError::ZoneNotFound(domain),
            other => ResolveError::Provider(other),
        }
    }
}
