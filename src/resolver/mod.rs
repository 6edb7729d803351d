//! Resolution of a [`DomainSet`] into the names a certificate has to cover
//! and the list of names that need an alias record.

use std::{collections::HashMap, fmt::Display};

use itertools::Itertools;
use log::{debug, error, trace};

use crate::{
    domain::{DomainConfig, DomainName},
    error::ResolveError,
    plan::TargetKind,
};

/// One primary domain serving content plus any number of domains redirecting to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSet {
    primary: DomainConfig,
    redirects: Vec<DomainConfig>,
}

impl DomainSet {
    /// Returns [`ResolveError::InvalidDomainConfig`] if the primary domain is also listed as a redirect domain,
    /// and [`ResolveError::DuplicateDomainAssignment`] if any name (registered domain or subdomain pattern)
    /// is listed more than once across the whole set
    pub fn new(primary: DomainConfig, redirects: Vec<DomainConfig>) -> Result<Self, ResolveError> {
        if let Some(d) = redirects
            .iter()
            .find(|d| d.registered_domain() == primary.registered_domain())
        {
            return Err(ResolveError::InvalidDomainConfig(format!(
                "primary domain {} cannot also redirect to itself",
                d.registered_domain()
            )));
        }
        check_distinct_names(&primary, &redirects)?;
        Ok(DomainSet { primary, redirects })
    }

    pub fn primary(&self) -> &DomainConfig {
        &self.primary
    }

    pub fn redirects(&self) -> &[DomainConfig] {
        &self.redirects
    }

    /// All distinct registered domains in this set, primary first
    pub fn registered_domains(&self) -> Vec<&str> {
        std::iter::once(&self.primary)
            .chain(self.redirects.iter())
            .map(DomainConfig::registered_domain)
            .unique()
            .collect()
    }
}

// Every name ends up as exactly one alias record, so it may only be listed once
fn check_distinct_names(
    primary: &DomainConfig,
    redirects: &[DomainConfig],
) -> Result<(), ResolveError> {
    let primary_names = primary.names().enumerate().map(|(idx, name)| {
        let kind = if idx == 0 {
            TargetKind::PrimaryContent
        } else {
            TargetKind::RedirectResponder
        };
        (name, kind)
    });
    let redirect_names = redirects
        .iter()
        .flat_map(DomainConfig::names)
        .map(|name| (name, TargetKind::RedirectResponder));

    let mut seen: HashMap<&str, TargetKind> = HashMap::new();
    for (name, kind) in primary_names.chain(redirect_names) {
        if let Some(first) = seen.insert(name, kind) {
            error!("Domain {} is listed more than once", name);
            return Err(ResolveError::DuplicateDomainAssignment {
                name: name.to_owned(),
                first,
                second: kind,
            });
        }
    }
    Ok(())
}

/// A name that needs an alias record, along with the registered domain whose zone will hold it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordWork {
    pub domain_name: DomainName,
    pub registered_domain: DomainName,
    pub target_kind: TargetKind,
}

impl RecordWork {
    fn new(domain_name: &str, registered_domain: &str, target_kind: TargetKind) -> Self {
        RecordWork {
            domain_name: domain_name.to_owned(),
            registered_domain: registered_domain.to_owned(),
            target_kind,
        }
    }
}

impl Display for RecordWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} (zone of {})",
            self.domain_name, self.target_kind, self.registered_domain
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Subject alternative names for the certificate. The primary domain itself is the certificate's main name
    /// and is not part of this list.
    pub san_list: Vec<DomainName>,
    pub record_work: Vec<RecordWork>,
}

/// Compute the certificate SAN list and the record worklist for a domain set.
///
/// Ordering is deterministic: primary first, then redirects in input order, subdomains in input order.
/// A [`DomainSet`] never lists a name twice, so neither list contains duplicates.
pub fn resolve(set: &DomainSet) -> Resolution {
    let primary = set.primary();

    let san_list = primary
        .supported_subdomains()
        .iter()
        .map(String::as_str)
        .chain(set.redirects().iter().flat_map(DomainConfig::names))
        .map(str::to_owned)
        .collect_vec();
    debug!("Certificate SANs: {:?}", san_list);

    let mut record_work = vec![RecordWork::new(
        primary.registered_domain(),
        primary.registered_domain(),
        TargetKind::PrimaryContent,
    )];
    // Subdomains of the primary never serve content, they redirect to the canonical URL
    record_work.extend(primary.supported_subdomains().iter().map(|sub| {
        RecordWork::new(
            sub,
            primary.registered_domain(),
            TargetKind::RedirectResponder,
        )
    }));
    for redirect in set.redirects() {
        record_work.extend(redirect.names().map(|name| {
            RecordWork::new(
                name,
                redirect.registered_domain(),
                TargetKind::RedirectResponder,
            )
        }));
    }
    for w in &record_work {
        trace!("Record work: {}", w);
    }

    Resolution {
        san_list,
        record_work,
    }
}
