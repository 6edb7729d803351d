use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use log::{debug, info};

use super::{
    CertificateId, CertificateRequest, DistributionId, Provider, ProviderError, ZoneId,
};
use crate::{
    domain::normalize,
    plan::{RecordPlanEntry, TargetKind},
    site::{ContentSite, RedirectResponder},
};

/// A [`Provider`] whose hosted zones are known up front, for example from the site configuration.
///
/// Certificates and distributions are handed out sequential ids and every operation is logged and kept in a journal,
/// so a full run can be reviewed without touching any cloud account.
///
/// To create a provider, use the [`FixedProvider::from_config()`] function
#[derive(Debug)]
#[non_exhaustive]
pub struct FixedProvider {
    zones: HashMap<String, ZoneId>,
    dry_run: bool,
    next_id: Cell<u32>,
    journal: RefCell<Vec<String>>,
}

/// Configuration for [`FixedProvider`]. Must be supplied when creating the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedProviderConfig {
    /// Registered domain -> hosted zone id
    pub zones: HashMap<String, String>,
}

impl FixedProvider {
    /// Create a new [`FixedProvider`] with the supplied configuration.
    /// Returns an error if a zone id is empty or if two entries name the same domain
    pub fn from_config(config: &FixedProviderConfig) -> Result<FixedProvider, ProviderError> {
        let mut zones = HashMap::new();
        for (domain, id) in &config.zones {
            let id = id.trim();
            if id.is_empty() {
                return Err(format!("zone id for domain {} is empty", domain).into());
            }
            let domain = normalize(domain);
            if zones.insert(domain.to_owned(), ZoneId(id.to_owned())).is_some() {
                return Err(format!("zone for domain {} is configured more than once", domain).into());
            }
        }
        debug!("Fixed provider knows {} zone(s)", zones.len());
        Ok(FixedProvider {
            zones,
            dry_run: false,
            next_id: Cell::new(1),
            journal: RefCell::new(Vec::new()),
        })
    }

    /// All mutating operations performed (or, in dry-run mode, skipped) so far
    pub fn journal(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        format!("{}-{}", prefix, id)
    }

    fn record(&self, action: String) {
        if self.dry_run {
            info!("[dry-run] Would {}", action);
        } else {
            info!("{}", action);
        }
        self.journal.borrow_mut().push(action);
    }
}

impl Provider for FixedProvider {
    fn enable_dry_run(&mut self) -> Result<(), ProviderError> {
        self.dry_run = true;
        Ok(())
    }

    fn lookup_zone(&self, registered_domain: &str) -> Result<ZoneId, ProviderError> {
        self.zones
            .get(registered_domain)
            .cloned()
            .ok_or_else(|| ProviderError::ZoneNotFound(registered_domain.to_owned()))
    }

    fn request_certificate(
        &self,
        request: &CertificateRequest,
    ) -> Result<CertificateId, ProviderError> {
        let id = CertificateId(self.next_id("cert"));
        self.record(format!("request {} as {}", request, id));
        for (domain, zone) in request.validation_zones.iter() {
            debug!("Certificate {} validates {} in zone {}", id, domain, zone);
        }
        Ok(id)
    }

    fn create_content_distribution(
        &self,
        site: &ContentSite,
        certificate: &CertificateId,
    ) -> Result<DistributionId, ProviderError> {
        let id = DistributionId(self.next_id("dist"));
        self.record(format!(
            "create content distribution {} for bucket {} (index {}, errors {}, logs to {}/{} for {} days) using {}",
            id,
            site.bucket_name,
            site.index_document,
            site.error_document,
            site.access_log_bucket,
            site.access_log_prefix,
            site.log_retention_days,
            certificate
        ));
        Ok(id)
    }

    fn create_redirect_distribution(
        &self,
        responder: &RedirectResponder,
        certificate: &CertificateId,
    ) -> Result<DistributionId, ProviderError> {
        let id = DistributionId(self.next_id("dist"));
        self.record(format!(
            "create redirect distribution {} ({}: {}) for {:?} using {}",
            id,
            responder.function_name(),
            responder.respond(),
            responder.aliases,
            certificate
        ));
        Ok(id)
    }

    fn create_alias_record(
        &self,
        entry: &RecordPlanEntry,
        distribution: &DistributionId,
    ) -> Result<(), ProviderError> {
        if !self.zones.values().any(|z| *z == entry.zone) {
            return Err(format!("unknown zone {} for record {}", entry.zone, entry.domain_name).into());
        }
        let kind = match entry.target_kind {
            TargetKind::PrimaryContent => "content",
            TargetKind::RedirectResponder => "redirect",
        };
        self.record(format!(
            "create alias {} in zone {} -> {} distribution {}",
            entry.domain_name, entry.zone, kind, distribution
        ));
        Ok(())
    }
}
