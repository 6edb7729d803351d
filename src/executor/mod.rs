use log::{debug, error, info};
use thiserror::Error;

use crate::{
    error::ResolveError,
    plan::{Plan, RecordPlanEntry},
    provider::{CertificateRequest, DistributionId, Provider, ProviderError},
    resolver::{resolve, DomainSet, Resolution},
    site::{ContentSite, RedirectResponder, SiteOutputs, SiteSettings},
    zone::{bind_zones, ZoneBindings},
};

/// An executor performs the complete set of actions needed to deploy a site across all of its domains
pub struct Executor<'a> {
    provider: &'a mut dyn Provider,
    settings: SiteSettings,
    certificate_name: Option<String>,
}

#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum ExecutorError {
    #[error("`{0}`")]
    Resolve(ResolveError),
    #[error("`{0}`")]
    Provider(ProviderError),
}
impl From<ResolveError> for ExecutorError {
    fn from(r: ResolveError) -> Self {
        ExecutorError::Resolve(r)
    }
}
impl From<ProviderError> for ExecutorError {
    fn from(p: ProviderError) -> Self {
        ExecutorError::Provider(p)
    }
}

/// Everything derived from a [`DomainSet`] before the provider is asked to change anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioning {
    pub zones: ZoneBindings,
    pub resolution: Resolution,
    pub plan: Plan,
    pub certificate: CertificateRequest,
    pub content: ContentSite,
    pub responder: RedirectResponder,
    pub outputs: SiteOutputs,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunResult {
    pub outputs: SiteOutputs,
    pub successes: Vec<RecordPlanEntry>,
    pub failures: Vec<(RecordPlanEntry, ExecutorError)>,
}

impl<'a> Executor<'a> {
    /// Create a new basic executor
    pub fn try_new(
        provider: &'a mut dyn Provider,
        settings: SiteSettings,
        certificate_name: Option<String>,
        dry_run: bool,
    ) -> Result<Executor<'a>, ExecutorError> {
        if dry_run {
            provider.enable_dry_run()?;
        }
        Ok(Self {
            provider,
            settings,
            certificate_name,
        })
    }

    /// Resolve zones, certificate names and the record plan for a domain set.
    /// The only provider calls made here are zone lookups.
    pub fn resolve(&self, set: &DomainSet) -> Result<Provisioning, ExecutorError> {
        let primary = set.primary().registered_domain();

        info!("Looking up hosted zones...");
        let zones = bind_zones(set.registered_domains(), &*self.provider)?;

        let resolution = resolve(set);
        info!(
            "Resolved {} certificate SAN(s) and {} record(s)",
            resolution.san_list.len(),
            resolution.record_work.len()
        );

        let plan = Plan::build(&resolution.record_work, &zones)?;
        debug!("Generated plan: {:?}", plan);

        let certificate = CertificateRequest {
            primary_domain_name: primary.to_owned(),
            subject_alternative_names: resolution.san_list.to_owned(),
            validation_zones: zones.to_owned(),
            name: self.certificate_name.to_owned(),
        };
        let content = ContentSite::for_primary(primary, &self.settings);
        let responder = RedirectResponder::new(primary, resolution.san_list.to_owned())?;
        let outputs = SiteOutputs::new(primary, &resolution);

        Ok(Provisioning {
            zones,
            resolution,
            plan,
            certificate,
            content,
            responder,
            outputs,
        })
    }

    /// Resolve the domain set, then create the certificate, both distributions and all alias records.
    ///
    /// Any resolution failure aborts the run before the first change is made.
    /// Failures while creating individual records are collected in the [`RunResult`].
    pub fn run(&mut self, set: &DomainSet) -> Result<RunResult, ExecutorError> {
        let provisioning = self.resolve(set)?;

        info!("Requesting {}", provisioning.certificate);
        let certificate = self
            .provider
            .request_certificate(&provisioning.certificate)?;

        let content_dist = self
            .provider
            .create_content_distribution(&provisioning.content, &certificate)?;
        info!("Content distribution: {}", content_dist);

        let redirect_dist = if provisioning.plan.redirect_entries().next().is_some() {
            let d = self
                .provider
                .create_redirect_distribution(&provisioning.responder, &certificate)?;
            info!("Redirect distribution: {}", d);
            Some(d)
        } else {
            info!("No redirect domains configured, skipping redirect distribution");
            None
        };

        let mut result = RecordResults::default();
        self.create_records(provisioning.plan.content_entries(), &content_dist, &mut result);
        // Only None when the plan has no redirect entries
        if let Some(redirect_dist) = &redirect_dist {
            self.create_records(
                provisioning.plan.redirect_entries(),
                redirect_dist,
                &mut result,
            );
        }

        Ok(RunResult {
            outputs: provisioning.outputs,
            successes: result.successes,
            failures: result.failures,
        })
    }

    fn create_records<'p>(
        &mut self,
        entries: impl Iterator<Item = &'p RecordPlanEntry>,
        target: &DistributionId,
        result: &mut RecordResults,
    ) {
        for entry in entries {
            match self.provider.create_alias_record(entry, target) {
                Ok(_) => result.successes.push(entry.to_owned()),
                Err(e) => {
                    error!("Could not create record {}: {}", entry, e);
                    result.failures.push((entry.to_owned(), e.into()));
                }
            }
        }
    }
}

#[derive(Default)]
struct RecordResults {
    successes: Vec<RecordPlanEntry>,
    failures: Vec<(RecordPlanEntry, ExecutorError)>,
}
