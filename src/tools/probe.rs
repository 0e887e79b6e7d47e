//! Host network introspection through `ip -json`.

use super::cli::ToolRunner;
use crate::error::WgError;
use crate::models::parse_addr;
use serde::Deserialize;
use std::net::Ipv4Addr;

const ROUTE_QUERY: &str = "ip -json route show default";

/// Answers the questions the plan resolver asks about the host.
#[allow(async_fn_in_trait)]
pub trait HostProbe {
    /// Interface carrying the default route.
    async fn default_device(&self) -> Result<Option<String>, WgError>;

    /// First global IPv4 address and prefix length on `device`.
    async fn device_network(&self, device: &str) -> Result<Option<(Ipv4Addr, u8)>, WgError>;
}

/// One entry of `ip -json route`.
#[derive(Deserialize, Debug)]
struct RouteEntry {
    dst: String,
    dev: Option<String>,
    #[serde(default)]
    metric: Option<u32>,
}

/// One interface of `ip -json addr`.
#[derive(Deserialize, Debug)]
struct LinkAddrs {
    ifname: String,
    #[serde(default)]
    addr_info: Vec<AddrInfo>,
}

#[derive(Deserialize, Debug)]
struct AddrInfo {
    family: String,
    local: String,
    prefixlen: u8,
    #[serde(default)]
    scope: Option<String>,
}

fn parse_json<T: for<'de> Deserialize<'de>>(output: &str, what: &str) -> Result<T, String> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        format!("Error parsing {what}: path={} error={}", e.path(), e)
    })
}

/// Device of the lowest-metric default route.
fn parse_default_route(output: &str) -> Result<Option<String>, String> {
    if output.trim().is_empty() {
        return Ok(None);
    }
    let routes: Vec<RouteEntry> = parse_json(output, "route list")?;
    Ok(routes
        .into_iter()
        .filter(|r| r.dst == "default")
        .filter_map(|r| r.dev.map(|dev| (r.metric.unwrap_or(0), dev)))
        .min_by_key(|(metric, _)| *metric)
        .map(|(_, dev)| dev))
}

/// First IPv4 address on `device`, global scope preferred.
fn parse_device_network(output: &str, device: &str) -> Result<Option<(Ipv4Addr, u8)>, String> {
    if output.trim().is_empty() {
        return Ok(None);
    }
    let links: Vec<LinkAddrs> = parse_json(output, "address list")?;
    let inet: Vec<&AddrInfo> = links
        .iter()
        .filter(|link| link.ifname == device)
        .flat_map(|link| link.addr_info.iter())
        .filter(|info| info.family == "inet")
        .collect();
    let chosen = inet
        .iter()
        .find(|info| info.scope.as_deref() == Some("global"))
        .or_else(|| inet.first());
    match chosen {
        Some(info) => {
            let addr = parse_addr(&info.local).map_err(|e| e.to_string())?;
            if info.prefixlen > 32 {
                return Err(format!("prefix length {} on {device}", info.prefixlen));
            }
            Ok(Some((addr, info.prefixlen)))
        }
        None => Ok(None),
    }
}

/// [`HostProbe`] backed by the `ip` tool.
pub struct IpRouteProbe<'a, R: ToolRunner> {
    runner: &'a R,
}

impl<'a, R: ToolRunner> IpRouteProbe<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        IpRouteProbe { runner }
    }

    /// Run an `ip` query; a missing tool or a failed command gives `None`.
    async fn query(&self, cmd: &str) -> Result<Option<String>, WgError> {
        if !self.runner.has_tool("ip") {
            log::warn!("'ip' not found, cannot probe host network");
            return Ok(None);
        }
        match self.runner.run(cmd, None, None).await {
            Ok(output) => Ok(Some(output)),
            Err(WgError::ExternalTool(msg)) => {
                log::warn!("probe '{cmd}' failed: {msg}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl<'a, R: ToolRunner> HostProbe for IpRouteProbe<'a, R> {
    async fn default_device(&self) -> Result<Option<String>, WgError> {
        let Some(output) = self.query(ROUTE_QUERY).await? else {
            return Ok(None);
        };
        let device = parse_default_route(&output).unwrap_or_else(|e| {
            log::warn!("{e}");
            None
        });
        log::info!("probed default device: {device:?}");
        Ok(device)
    }

    async fn device_network(&self, device: &str) -> Result<Option<(Ipv4Addr, u8)>, WgError> {
        let cmd = format!("ip -json -4 addr show dev '{device}'");
        let Some(output) = self.query(&cmd).await? else {
            return Ok(None);
        };
        let network = parse_device_network(&output, device).unwrap_or_else(|e| {
            log::warn!("{e}");
            None
        });
        log::info!("probed address on {device}: {network:?}");
        Ok(network)
    }
}
