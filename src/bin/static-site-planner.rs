mod cli;

use std::process;

use clap::Parser;
use env_logger::Builder;
use itertools::Itertools;
use log::{error, info};

use static_site_planner::{
    config::SiteConfig,
    executor::{Executor, Provisioning},
    provider::{FixedProvider, FixedProviderConfig, Provider, ProviderError},
};

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    Builder::new().filter_level(cli.loglevel.into()).init();

    if cli.dry_run {
        info!("Running in dry-run mode, no changes to the provider will be made");
    }

    if run(&cli).is_err() {
        error!("Run completed with errors");
        process::exit(1);
    }
}

fn get_provider(cli: &Cli, site: &SiteConfig) -> Result<Box<dyn Provider>, ProviderError> {
    match cli.provider {
        cli::Provider::Fixed => {
            let zones = site
                .zones_with_overrides(cli.zone.as_slice())
                .map_err(|e| ProviderError::Internal(e.to_string()))?;
            Ok(Box::new(FixedProvider::from_config(&FixedProviderConfig {
                zones,
            })?))
        }
    }
}

fn print_plan(p: &Provisioning) {
    println!("Certificate: {}", p.certificate.primary_domain_name);
    for san in &p.certificate.subject_alternative_names {
        println!("  SAN {}", san);
    }
    println!("Zones:");
    for (domain, zone) in p.zones.iter() {
        println!("  {} -> {}", domain, zone);
    }
    println!("Records:");
    for entry in p.plan.entries() {
        println!("  {}", entry);
    }
    println!("Redirect: {}", p.responder.respond());
}

fn run(cli: &Cli) -> Result<(), ()> {
    let site = match SiteConfig::from_file(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            error!("Unable to load site configuration: {}", e);
            return Err(());
        }
    };
    let set = match site.domain_set() {
        Ok(s) => {
            info!(
                "Primary domain {}, redirecting {}",
                s.primary(),
                s.redirects().iter().join("; ")
            );
            s
        }
        Err(e) => {
            error!("Invalid site configuration: {}", e);
            return Err(());
        }
    };
    let mut provider = match get_provider(cli, &site) {
        Ok(p) => {
            info!("Created provider");
            p
        }
        Err(e) => {
            error!("Unable to create provider: {}", e);
            return Err(());
        }
    };

    let mut executor = match Executor::try_new(
        provider.as_mut(),
        site.site.clone(),
        site.certificate_name.clone(),
        cli.dry_run,
    ) {
        Ok(e) => e,
        Err(e) => {
            error!("Unable to create executor: {}", e);
            return Err(());
        }
    };

    if cli.plan_only {
        return match executor.resolve(&set) {
            Ok(p) => {
                print_plan(&p);
                Ok(())
            }
            Err(e) => {
                error!("Could not resolve plan: {}", e);
                Err(())
            }
        };
    }

    let result = match executor.run(&set) {
        Ok(r) => r,
        Err(e) => {
            error!("Provisioning aborted: {}", e);
            return Err(());
        }
    };

    if result.failures.is_empty() {
        info!(
            "All {} record(s) created. No errors were encountered",
            result.successes.len()
        );
    } else {
        error!(
            "The following errors were encountered while creating records: {}",
            result
                .failures
                .iter()
                .map(|(entry, e)| format!("{}: {}", entry.domain_name, e))
                .join(", ")
        );
        return Err(());
    }

    println!("{}", result.outputs.url);
    for url in &result.outputs.redirect_urls {
        println!("{}", url);
    }
    info!("Completed");
    Ok(())
}
