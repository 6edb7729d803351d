//! Main crate for the `static_site_planner` application.
//!
//! A static website is served on one primary domain, while any number of other domains and subdomains
//! redirect visitors to it over HTTPS. This crate works out everything that setup needs before a single
//! cloud resource is touched: the certificate names, the hosted zone of every registered domain and the
//! complete list of alias records.
//!
//! For more information, choose one of the modules below:
//! - [`domain`] describes registered domains and their subdomain patterns
//! - [`resolver`] derives certificate SANs and the record worklist from a [`resolver::DomainSet`]
//! - [`zone`] binds registered domains to the provider's hosted zones
//! - [`plan`] turns the worklist into a conflict-free record plan
//! - [`provider`]s are the cloud backends that ultimately create certificates, distributions and records
//! - [`executor`] drives a full provisioning run against a provider

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod plan;
pub mod provider;
pub mod resolver;
pub mod site;
pub mod zone;
