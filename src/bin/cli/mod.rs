use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

macro_rules! env_prefix {
    () => {
        "STATIC_SITE_"
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Site configuration file (JSON) listing the primary and redirect domains
    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        env = concat!(env_prefix!(), "CONFIG")
    )]
    pub config: PathBuf,

    /// Provisioning backend to use
    #[arg(
        value_enum,
        short = 'p',
        long,
        default_value_t = Provider::Fixed,
        env = concat!(env_prefix!(), "PROVIDER")
    )]
    pub provider: Provider,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,

    /// Do not make any changes, only show what would happen
    #[arg(long, short = 'd', action, default_value_t = false)]
    pub dry_run: bool,

    /// Only resolve and print the certificate and record plan, without provisioning anything
    #[arg(long, action, default_value_t = false)]
    pub plan_only: bool,

    /// Hosted zone ids for the 'fixed' provider, as comma-separated DOMAIN=ZONE_ID pairs.
    /// Added to (and overriding) the zones listed in the configuration file
    #[arg(
        long,
        value_name = "DOMAIN=ZONE_ID",
        use_value_delimiter = true,
        value_delimiter = ',',
        env = concat!(env_prefix!(), "ZONES")
    )]
    pub zone: Vec<String>,
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log:Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Which provisioning backend to use. Currently only contains the fixed-zone backend
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Provider {
    Fixed,
}
