//! Command line options.
//!
//! Numeric and address flags are taken as text here and validated by the
//! plan resolver, so each bad value fails with its own exit code.

use crate::config;
use crate::error::WgError;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Generate WireGuard server and client configs for a small VPN.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "wg-config-gen")]
pub struct Options {
    /// Number of client configs to generate (required)
    #[arg(short = 'n', long = "nclients")]
    pub nclients: Option<String>,

    /// Public host or IP clients connect to [default: probed public IP]
    #[arg(long, visible_alias = "server", env = "WG_ENDPOINT")]
    pub endpoint: Option<String>,

    /// UDP listen port
    #[arg(long, env = "WG_PORT", default_value_t = config::DEFAULT_PORT.to_string())]
    pub port: String,

    /// LAN network routed to clients [default: probed]
    #[arg(long)]
    pub network: Option<String>,

    /// LAN prefix length 0-32 [default: probed]
    #[arg(long)]
    pub netmask: Option<String>,

    /// Server interface used for NAT [default: probed default route]
    #[arg(long, env = "WG_DEVICE")]
    pub device: Option<String>,

    /// VPN subnet base address
    #[arg(long, env = "WG_VPNB", default_value = config::DEFAULT_VPN_BASE)]
    pub vpnb: String,

    /// VPN subnet prefix length 0-32
    #[arg(long, env = "WG_VPNM", default_value_t = config::DEFAULT_VPN_MASK.to_string())]
    pub vpnm: String,

    /// VPN server address [default: VPN base + 1]
    #[arg(long)]
    pub vpns: Option<String>,

    /// Run the server install script after packaging
    #[arg(long)]
    pub install: bool,

    /// Show what would be generated and exit
    #[arg(long)]
    pub what: bool,

    /// Keep loose files after packaging, debug logging
    #[arg(short = 'd', long)]
    pub development: bool,

    /// Debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Directory the files and archives are written to
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,
}

/// Outcome of argument parsing.
#[derive(Debug)]
pub enum Parsed {
    Run(Box<Options>),
    /// Help text to print before exiting with 0.
    Help(String),
}

/// Parse `args` (program name first).
pub fn parse_args<I, T>(args: I) -> Result<Parsed, WgError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Options::try_parse_from(args) {
        Ok(options) => Ok(Parsed::Run(Box::new(options))),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Parsed::Help(e.render().to_string()))
            }
            ErrorKind::UnknownArgument => {
                let flag = match e.get(ContextKind::InvalidArg) {
                    Some(ContextValue::String(flag)) => flag.clone(),
                    _ => e.to_string(),
                };
                Err(WgError::UnknownOption(flag))
            }
            _ => Err(WgError::Usage(e.render().to_string())),
        },
    }
}

/// A flag value, treating blank text as not given.
pub fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
