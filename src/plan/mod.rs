//! The record plan: every alias record that has to exist, the zone it lives in and what it points at.

use std::{collections::HashMap, fmt::Display};

use log::{debug, error, trace};

use crate::{
    domain::DomainName, error::ResolveError, provider::ZoneId, resolver::RecordWork,
    zone::ZoneBindings,
};

/// What an alias record points at
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// The distribution serving the primary domain's content
    PrimaryContent,
    /// The shared distribution redirecting to the primary domain
    RedirectResponder,
}

impl Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::PrimaryContent => write!(f, "primary content"),
            TargetKind::RedirectResponder => write!(f, "redirect responder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordPlanEntry {
    pub domain_name: DomainName,
    pub zone: ZoneId,
    pub target_kind: TargetKind,
}

impl Display for RecordPlanEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (zone {}) -> {}",
            self.domain_name, self.zone, self.target_kind
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    entries: Vec<RecordPlanEntry>,
}

impl Plan {
    /// Attach a zone to each piece of record work.
    ///
    /// Fails with [`ResolveError::DuplicateDomainAssignment`] if a name would receive more than one record,
    /// and with [`ResolveError::UnboundZone`] if a registered domain was not bound beforehand.
    pub fn build(work: &[RecordWork], zones: &ZoneBindings) -> Result<Plan, ResolveError> {
        let mut seen: HashMap<&str, TargetKind> = HashMap::new();
        let mut entries = Vec::with_capacity(work.len());

        for w in work {
            if let Some(first) = seen.insert(&w.domain_name, w.target_kind) {
                error!(
                    "Domain {} is assigned to both {} and {}",
                    w.domain_name, first, w.target_kind
                );
                return Err(ResolveError::DuplicateDomainAssignment {
                    name: w.domain_name.to_owned(),
                    first,
                    second: w.target_kind,
                });
            }

            let zone = zones
                .get(&w.registered_domain)
                .ok_or_else(|| ResolveError::UnboundZone(w.registered_domain.to_owned()))?;
            let entry = RecordPlanEntry {
                domain_name: w.domain_name.to_owned(),
                zone: zone.to_owned(),
                target_kind: w.target_kind,
            };
            trace!("Planned record {}", entry);
            entries.push(entry);
        }
        debug!("Record plan contains {} entries", entries.len());
        Ok(Plan { entries })
    }

    pub fn entries(&self) -> &[RecordPlanEntry] {
        &self.entries
    }

    pub fn content_entries(&self) -> impl Iterator<Item = &RecordPlanEntry> {
        self.entries
            .iter()
            .filter(|e| e.target_kind == TargetKind::PrimaryContent)
    }

    pub fn redirect_entries(&self) -> impl Iterator<Item = &RecordPlanEntry> {
        self.entries
            .iter()
            .filter(|e| e.target_kind == TargetKind::RedirectResponder)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Plan {
    type Item = RecordPlanEntry;
    type IntoIter = std::vec::IntoIter<RecordPlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
