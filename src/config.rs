//! Defaults and fixed names used across the generator.

/// WireGuard default listen port.
pub const DEFAULT_PORT: u16 = 51820;
/// Default VPN subnet base address.
pub const DEFAULT_VPN_BASE: &str = "10.10.0.0";
/// Default VPN subnet prefix length.
pub const DEFAULT_VPN_MASK: u8 = 24;
/// Keepalive written into every client peer stanza.
pub const PERSISTENT_KEEPALIVE: u16 = 25;
/// Interface name used in generated configs and install scripts.
pub const WG_INTERFACE: &str = "wg0";

/// Upper bound for any single external command.
pub const COMMAND_TIMEOUT_SECS: u64 = 15;
/// Upper bound for the public IP lookup.
pub const PUBLIC_IP_TIMEOUT_SECS: u64 = 10;
/// Where the public IP is fetched from unless `WG_PUBLIC_IP_URL` is set.
pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";
/// Probe name reported by public IP timeouts.
pub const PUBLIC_IP_PROBE: &str = "public-ip";
/// Refuse command output larger than this.
/// Upper bound on up-front vector reservations sized by the client count.
pub const PREALLOCATE_MAX: usize = 1024;

pub const MAX_OUTPUT_BYTES: usize = 500_000;

pub const SERVER_CONF: &str = "wg0_server.conf";
pub const SERVER_INSTALL_SH: &str = "install_wg_server.sh";
pub const CLIENT_INSTALL_SH: &str = "install_wg_client.sh";
pub const CLIENT_INSTALL_BAT: &str = "install_wg_client.bat";
pub const SERVER_ARCHIVE: &str = "wg_server.tgz";

/// `wg0_client<N>.conf`, N counted from 1.
pub fn client_conf_name(n: usize) -> String {
    format!("wg0_client{n}.conf")
}

/// `wg_client<N>.zip`, N counted from 1.
pub fn client_archive_name(n: usize) -> String {
    format!("wg_client{n}.zip")
}

/// Tools that must be present before anything is generated.
pub fn required_tools() -> Vec<&'static str> {
    vec!["wg", "tar", "zip"]
}
