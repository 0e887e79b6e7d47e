//! External tool interaction.
//!
//! This module handles everything the generator delegates to the host:
//! - [`cli`] - command execution for external tools
//! - [`probe`] - default route and LAN discovery via `ip`
//! - [`public_ip`] - public address lookup over HTTP
//! - [`keys`] - key pairs from `wg`
//! - [`package`] - writing files, archiving and installing

mod cli;
mod keys;
mod package;
mod probe;
mod public_ip;

// Re-export public types and functions
pub use cli::{find_in_path, require_tools, SystemRunner, ToolRunner};
pub use keys::{generate_keyring, KeyGenerator, WgKeyTool};
pub use package::{install_server, package_artifacts, remove_loose_files, write_artifacts};
pub use probe::{HostProbe, IpRouteProbe};
pub use public_ip::{check_public_ip, HttpLookup, PublicIpLookup};
