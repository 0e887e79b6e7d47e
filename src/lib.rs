//! WireGuard config generator.
//!
//! Parses options, probes the host, allocates VPN addresses, renders the
//! server and client configs and packages them:
//! - [`cli`] - command line options
//! - [`models`] - address arithmetic and the resolved plan
//! - [`processing`] - address allocation and plan resolution
//! - [`output`] - rendering of configs and scripts
//! - [`tools`] - external tools (`wg`, `ip`, `tar`, `zip`, HTTP)

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;
pub mod tools;

use cli::Options;
use colored::Colorize;
use error::WgError;
use models::VpnPlan;
use output::{print_plan, render_artifacts, RenderMeta};
use processing::build_plan;
use std::path::PathBuf;
use tools::{
    generate_keyring, install_server, package_artifacts, remove_loose_files, require_tools,
    write_artifacts, HostProbe, KeyGenerator, PublicIpLookup, ToolRunner,
};

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub plan: VpnPlan,
    /// Loose files written; removed again unless in development mode.
    pub written: Vec<PathBuf>,
    /// Archive names inside the output directory.
    pub archives: Vec<String>,
    pub installed: bool,
}

/// Warn when the firewall tool the generated hooks call is missing.
pub fn warn_if_no_firewall<R: ToolRunner>(runner: &R) -> bool {
    let present = runner.has_tool("iptables");
    if !present {
        log::warn!(
            "{} not found, the PostUp/PostDown NAT rules need it on the server",
            "iptables".yellow()
        );
    }
    present
}

/// One complete generation run.
///
/// With `--what` the plan is printed and nothing is written.
pub async fn run<R, P, L, K>(
    opts: &Options,
    runner: &R,
    probe: &P,
    lookup: &L,
    keys: &K,
    meta: &RenderMeta,
) -> Result<RunReport, WgError>
where
    R: ToolRunner,
    P: HostProbe,
    L: PublicIpLookup,
    K: KeyGenerator,
{
    log::info!("#Start run()");
    if !opts.what {
        require_tools(runner, &config::required_tools())?;
    }
    warn_if_no_firewall(runner);

    let plan = build_plan(opts, probe, lookup).await?;
    if opts.what {
        print_plan(&plan);
        return Ok(RunReport {
            plan,
            written: vec![],
            archives: vec![],
            installed: false,
        });
    }

    let keyring = generate_keyring(keys, plan.client_count()).await?;
    let artifacts = render_artifacts(&plan, &keyring, meta);
    let written = write_artifacts(&opts.outdir, &artifacts)?;
    log::info!(
        "wrote {} files to {}",
        written.len(),
        opts.outdir.display()
    );

    let archives = package_artifacts(runner, &opts.outdir, &artifacts).await?;

    if opts.install {
        install_server(runner, &opts.outdir).await?;
    }
    if !opts.development {
        remove_loose_files(&opts.outdir, &artifacts)?;
    }

    Ok(RunReport {
        plan,
        written,
        archives,
        installed: opts.install,
    })
}
