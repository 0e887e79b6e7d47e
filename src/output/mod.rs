//! Rendering of every generated file.
//!
//! - [`wireguard`] - server and client tunnel configs
//! - [`install`] - installer scripts
//! - [`terminal`] - plan summary printed to the terminal
//!
//! Rendering is pure: the same plan, keys and [`RenderMeta`] always give
//! byte-identical files.

mod install;
mod terminal;
mod wireguard;

use crate::config;
use crate::models::{Keyring, VpnPlan};

pub use install::{render_client_install_bat, render_client_install_sh, render_server_install};
pub use terminal::{format_field, plan_summary, print_plan};
pub use wireguard::{render_client_config, render_server_config};

/// Header data stamped into every file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderMeta {
    pub generator: String,
    pub generated: String,
}

impl RenderMeta {
    pub fn new(generated: impl Into<String>) -> Self {
        RenderMeta {
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            generated: generated.into(),
        }
    }

    /// Stamp with the current UTC time.
    pub fn now() -> Self {
        RenderMeta::new(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub contents: String,
    /// Scripts are written executable, configs owner-only.
    pub executable: bool,
}

impl Artifact {
    fn config(name: impl Into<String>, contents: String) -> Self {
        Artifact {
            name: name.into(),
            contents,
            executable: false,
        }
    }

    fn script(name: impl Into<String>, contents: String) -> Self {
        Artifact {
            name: name.into(),
            contents,
            executable: true,
        }
    }
}

/// Every file of one run.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub server_conf: Artifact,
    pub server_install: Artifact,
    /// `wg0_client<N>.conf`, index 0 is client 1.
    pub client_confs: Vec<Artifact>,
    pub client_install_sh: Artifact,
    pub client_install_bat: Artifact,
}

impl ArtifactSet {
    /// All files, server first.
    pub fn all(&self) -> Vec<&Artifact> {
        let mut files = vec![&self.server_conf, &self.server_install];
        files.extend(self.client_confs.iter());
        files.push(&self.client_install_sh);
        files.push(&self.client_install_bat);
        files
    }

    /// Files that go into the server archive.
    pub fn server_bundle(&self) -> Vec<&str> {
        vec![self.server_conf.name.as_str(), self.server_install.name.as_str()]
    }

    /// Files that go into the archive of client `n` (from 1).
    pub fn client_bundle(&self, n: usize) -> Option<Vec<&str>> {
        let conf = self.client_confs.get(n.checked_sub(1)?)?;
        Some(vec![
            conf.name.as_str(),
            self.client_install_sh.name.as_str(),
            self.client_install_bat.name.as_str(),
        ])
    }
}

/// Names of every file a run would write, in write order.
pub fn planned_file_names(plan: &VpnPlan) -> Vec<String> {
    let mut names = vec![
        config::SERVER_CONF.to_string(),
        config::SERVER_INSTALL_SH.to_string(),
    ];
    names.extend((1..=plan.client_count()).map(config::client_conf_name));
    names.push(config::CLIENT_INSTALL_SH.to_string());
    names.push(config::CLIENT_INSTALL_BAT.to_string());
    names
}

/// Render every file for `plan`; `keys.clients` must match the client addresses.
pub fn render_artifacts(plan: &VpnPlan, keys: &Keyring, meta: &RenderMeta) -> ArtifactSet {
    debug_assert_eq!(plan.client_count(), keys.clients.len());

    let client_confs = plan
        .client_addresses
        .iter()
        .zip(&keys.clients)
        .enumerate()
        .map(|(i, (address, client_keys))| {
            let n = i + 1;
            Artifact::config(
                config::client_conf_name(n),
                render_client_config(
                    plan,
                    n,
                    *address,
                    client_keys,
                    &keys.server.public_key,
                    meta,
                ),
            )
        })
        .collect();

    ArtifactSet {
        server_conf: Artifact::config(
            config::SERVER_CONF,
            render_server_config(plan, &keys.server, &keys.clients, meta),
        ),
        server_install: Artifact::script(
            config::SERVER_INSTALL_SH,
            render_server_install(plan, meta),
        ),
        client_confs,
        client_install_sh: Artifact::script(
            config::CLIENT_INSTALL_SH,
            render_client_install_sh(meta),
        ),
        client_install_bat: Artifact::script(
            config::CLIENT_INSTALL_BAT,
            render_client_install_bat(meta),
        ),
    }
}
