//! Turn parsed options plus probe results into one [`VpnPlan`].
//!
//! Explicit options always win; probes run only for what is still unset.

use super::allocator::{
    allocate_client_addresses, allocate_server_address, check_capacity,
};
use crate::cli::{given, Options};
use crate::error::WgError;
use crate::models::{cut_addr, parse_addr, parse_prefix, HostNetwork, Subnet, VpnPlan};
use crate::tools::{HostProbe, PublicIpLookup};
use regex::Regex;
use std::sync::OnceLock;

static IFNAME_REGEX: OnceLock<Regex> = OnceLock::new();

/// Linux interface names: up to 15 chars, no whitespace or slashes.
fn ifname_regex() -> &'static Regex {
    IFNAME_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.:@-]{1,15}$").expect("Invalid Regex"))
}

static ENDPOINT_REGEX: OnceLock<Regex> = OnceLock::new();

/// DNS hostname or dotted quad: dot-separated labels of letters, digits and
/// inner hyphens, 63 chars per label.
fn endpoint_regex() -> &'static Regex {
    ENDPOINT_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
            .expect("Invalid Regex")
    })
}

/// Endpoint text that is safe to write into a client config line.
pub fn check_endpoint(text: &str) -> Result<String, WgError> {
    if text.len() <= 253 && endpoint_regex().is_match(text) {
        Ok(text.to_string())
    } else {
        log::error!("invalid endpoint {text:?}");
        Err(WgError::InvalidEndpoint(text.escape_debug().to_string()))
    }
}

/// Positive client count from `-n`.
pub fn parse_client_count(value: &Option<String>) -> Result<u32, WgError> {
    let text = given(value).ok_or_else(|| WgError::MissingClientCount(String::new()))?;
    match text.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(WgError::MissingClientCount(format!(" ('{text}')"))),
    }
}

/// VPN subnet from `--vpnb` / `--vpnm`.
pub fn parse_vpn_subnet(vpnb: &str, vpnm: &str) -> Result<Subnet, WgError> {
    let vpnb = vpnb.trim();
    if vpnb.is_empty() {
        return Err(WgError::MissingVpnBase(String::new()));
    }
    let base = parse_addr(vpnb).map_err(|_| WgError::MissingVpnBase(format!(" ('{vpnb}')")))?;
    let vpnm = vpnm.trim();
    if vpnm.is_empty() {
        return Err(WgError::MissingVpnMask(String::new()));
    }
    let prefix = parse_prefix(vpnm).map_err(|_| WgError::MissingVpnMask(format!(" ('{vpnm}')")))?;
    let subnet = Subnet::from_parts(base, prefix)
        .map_err(|e| WgError::MissingVpnBase(format!(" ({e})")))?;
    if subnet.has_host_bits() {
        log::warn!("VPN base {base} has host bits set for /{prefix}, using it as given");
    }
    Ok(subnet)
}

/// Listen port, 1-65535.
pub fn parse_port(value: &str) -> Result<u16, WgError> {
    let value = value.trim();
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(WgError::InvalidPort(value.to_string())),
    }
}

/// Ask the host for every value the options leave unset.
pub async fn probe_host<P: HostProbe, L: PublicIpLookup>(
    opts: &Options,
    probe: &P,
    lookup: &L,
) -> Result<HostNetwork, WgError> {
    let mut host = HostNetwork::default();

    if given(&opts.device).is_none() {
        host.default_device = probe.default_device().await?;
    }
    let device = given(&opts.device)
        .map(str::to_string)
        .or_else(|| host.default_device.clone());

    if given(&opts.network).is_none() || given(&opts.netmask).is_none() {
        if let Some(device) = &device {
            if let Some((address, prefix)) = probe.device_network(device).await? {
                host.local_address = Some(address);
                host.local_subnet = Some(Subnet::from_parts(cut_addr(address, prefix)?, prefix)?);
            }
        }
    }

    if given(&opts.endpoint).is_none() {
        host.public_endpoint = Some(lookup.public_ip().await?);
    }

    log::debug!("host network: {host:?}");
    Ok(host)
}

/// Remote LAN from explicit flags, falling back to the probed subnet.
fn resolve_remote_network(opts: &Options, host: &HostNetwork) -> Result<Subnet, WgError> {
    let network = match given(&opts.network) {
        Some(text) => Some(
            parse_addr(text).map_err(|_| WgError::NetworkUnresolved(format!(" ('{text}')")))?,
        ),
        None => host.local_subnet.map(|s| s.base),
    };
    let prefix = match given(&opts.netmask) {
        Some(text) => Some(
            parse_prefix(text).map_err(|_| WgError::NetmaskUnresolved(format!(" ('{text}')")))?,
        ),
        None => host.local_subnet.map(|s| s.prefix),
    };
    let network = network.ok_or_else(|| WgError::NetworkUnresolved(String::new()))?;
    let prefix = prefix.ok_or_else(|| WgError::NetmaskUnresolved(String::new()))?;
    Subnet::from_parts(cut_addr(network, prefix)?, prefix)
}

/// Build the immutable plan for this run.
pub async fn build_plan<P: HostProbe, L: PublicIpLookup>(
    opts: &Options,
    probe: &P,
    lookup: &L,
) -> Result<VpnPlan, WgError> {
    let count = parse_client_count(&opts.nclients)?;
    let vpn_subnet = parse_vpn_subnet(&opts.vpnb, &opts.vpnm)?;
    check_capacity(&vpn_subnet, count)?;

    let explicit_server = match given(&opts.vpns) {
        Some(text) => Some(parse_addr(text).map_err(|e| WgError::ServerAddress(e.to_string()))?),
        None => None,
    };
    let server_address = allocate_server_address(&vpn_subnet, explicit_server)?;
    let port = parse_port(&opts.port)?;

    if let Some(device) = given(&opts.device) {
        if !ifname_regex().is_match(device) {
            log::error!("invalid interface name '{device}'");
            return Err(WgError::DeviceUnresolved);
        }
    }

    let host = probe_host(opts, probe, lookup).await?;
    let device = given(&opts.device)
        .map(str::to_string)
        .or(host.default_device.clone())
        .ok_or(WgError::DeviceUnresolved)?;
    let remote_network = resolve_remote_network(opts, &host)?;
    if remote_network.overlaps(&vpn_subnet) {
        log::warn!("VPN subnet {vpn_subnet} overlaps the remote network {remote_network}");
    }
    let endpoint = given(&opts.endpoint)
        .map(str::to_string)
        .or(host.public_endpoint)
        .ok_or_else(|| WgError::PublicIpFetch("no endpoint".to_string()))?;
    let endpoint = check_endpoint(&endpoint)?;

    let client_addresses = allocate_client_addresses(&vpn_subnet, server_address, count as usize)?;

    let plan = VpnPlan {
        vpn_subnet,
        server_address,
        client_addresses,
        endpoint,
        port,
        remote_network,
        device,
    };
    log::info!(
        "plan: {} clients in {}, server {}, endpoint {}, LAN {} via {}",
        plan.client_count(),
        plan.vpn_subnet,
        plan.server_address,
        plan.endpoint_with_port(),
        plan.remote_network,
        plan.device
    );
    Ok(plan)
}
