//! The provisioning backend that ultimately looks up zones, issues certificates and creates distributions and records.
//!
//! Everything behind this trait is a side effect. The resolution core only ever calls [`Provider::lookup_zone()`],
//! all other methods are driven by the [`Executor`](crate::executor::Executor) once a plan has fully resolved.

pub mod fixed;

pub use self::fixed::{FixedProvider, FixedProviderConfig};

use std::fmt::Display;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::{
    plan::RecordPlanEntry,
    site::{ContentSite, RedirectResponder},
    zone::ZoneBindings,
};

/// A provider is any cloud backend able to host a static site, such as AWS (Route53, ACM, CloudFront).
#[cfg_attr(test, automock)]
pub trait Provider {
    /// Put the provider into dry-run mode, where no changes are made.
    /// Returns an error if the provider does not support dry-runs
    fn enable_dry_run(&mut self) -> Result<(), ProviderError>;

    /// Look up the existing hosted zone of a registered domain.
    /// Must return [`ProviderError::ZoneNotFound`] if there is none, zones are never created.
    fn lookup_zone(&self, registered_domain: &str) -> Result<ZoneId, ProviderError>;

    /// Request a certificate for the primary domain and all subject alternative names,
    /// validated through DNS in the given zones
    fn request_certificate(
        &self,
        request: &CertificateRequest,
    ) -> Result<CertificateId, ProviderError>;

    /// Create the edge distribution serving the primary domain's content
    fn create_content_distribution(
        &self,
        site: &ContentSite,
        certificate: &CertificateId,
    ) -> Result<DistributionId, ProviderError>;

    /// Create the single distribution that answers every redirect domain
    fn create_redirect_distribution(
        &self,
        responder: &RedirectResponder,
        certificate: &CertificateId,
    ) -> Result<DistributionId, ProviderError>;

    /// Create an alias record for a plan entry, pointing at the given distribution
    fn create_alias_record(
        &self,
        entry: &RecordPlanEntry,
        distribution: &DistributionId,
    ) -> Result<(), ProviderError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderError {
    #[error("no hosted zone exists for {0}")]
    ZoneNotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl From<String> for ProviderError {
    fn from(s: String) -> Self {
        ProviderError::Internal(s)
    }
}

/// Opaque zone handle as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistributionId(pub String);

impl Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Display for DistributionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the certificate backend needs to issue one certificate covering the whole domain set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    pub primary_domain_name: String,
    pub subject_alternative_names: Vec<String>,
    /// Zones in which DNS validation records are created, one per registered domain
    pub validation_zones: ZoneBindings,
    /// Human readable certificate name
    pub name: Option<String>,
}

impl Display for CertificateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "certificate for {} (SANs: {:?})",
            self.primary_domain_name, self.subject_alternative_names
        )
    }
}
