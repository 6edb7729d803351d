//! Binding of registered domains to the provider's hosted zones.

use std::collections::{btree_map, BTreeMap};

use itertools::Itertools;
use log::{debug, error, info};

use crate::{
    domain::{is_wildcard, DomainName},
    error::ResolveError,
    provider::{Provider, ZoneId},
};

/// Registered domain -> hosted zone. Every registered domain appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneBindings {
    zones: BTreeMap<DomainName, ZoneId>,
}

impl ZoneBindings {
    pub fn get(&self, registered_domain: &str) -> Option<&ZoneId> {
        self.zones.get(registered_domain)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DomainName, ZoneId> {
        self.zones.iter()
    }
}

impl FromIterator<(DomainName, ZoneId)> for ZoneBindings {
    fn from_iter<T: IntoIterator<Item = (DomainName, ZoneId)>>(iter: T) -> Self {
        ZoneBindings {
            zones: iter.into_iter().collect(),
        }
    }
}

/// Look up the hosted zone of every registered domain, issuing exactly one lookup per distinct domain.
///
/// Only registered domains may be passed in, zone lookups are not defined for wildcard patterns.
/// A missing zone is fatal: zones are created when registering a domain, creating one here would
/// leave the domain delegated to different name servers.
pub fn bind_zones<'a, I>(
    registered_domains: I,
    provider: &dyn Provider,
) -> Result<ZoneBindings, ResolveError>
where
    I: IntoIterator<Item = &'a str>,
{
    let domains = registered_domains.into_iter().unique().collect_vec();
    if let Some(w) = domains.iter().find(|d| is_wildcard(d)) {
        return Err(ResolveError::InvalidDomainConfig(format!(
            "zone lookups require a registered domain, got pattern {}",
            w
        )));
    }

    let mut zones = BTreeMap::new();
    for domain in domains {
        let zone = provider.lookup_zone(domain).map_err(|e| {
            error!("Zone lookup for {} failed: {}", domain, e);
            ResolveError::from(e)
        })?;
        debug!("Registered domain {} is served by zone {}", domain, zone);
        zones.insert(domain.to_owned(), zone);
    }
    info!("Bound {} registered domain(s) to their zones", zones.len());
    Ok(ZoneBindings { zones })
}
