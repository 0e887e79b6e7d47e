//! Installer scripts shipped inside the archives.

use super::RenderMeta;
use crate::config;
use crate::models::VpnPlan;

/// `install_wg_server.sh`: installs the server config and starts `wg-quick`.
pub fn render_server_install(plan: &VpnPlan, meta: &RenderMeta) -> String {
    format!(
        r#"#!/bin/sh
# {script} generated by {generator} on {generated}
set -e
cd "$(dirname "$0")"

if ! command -v wg-quick >/dev/null 2>&1; then
    if command -v apt-get >/dev/null 2>&1; then
        apt-get update && apt-get install -y wireguard
    else
        echo "wireguard-tools not installed, install it first" >&2
        exit 1
    fi
fi
if ! command -v iptables >/dev/null 2>&1; then
    echo "WARNING: iptables not found, the NAT rules in {conf} will fail" >&2
fi

install -d -m 700 /etc/wireguard
install -m 600 {conf} /etc/wireguard/{iface}.conf
sysctl -w net.ipv4.ip_forward=1
echo net.ipv4.ip_forward=1 > /etc/sysctl.d/99-{iface}-forward.conf
systemctl enable --now wg-quick@{iface}
echo "{iface} up: {server}/{prefix} on UDP {port}, NAT via {device}"
"#,
        script = config::SERVER_INSTALL_SH,
        generator = meta.generator,
        generated = meta.generated,
        conf = config::SERVER_CONF,
        iface = config::WG_INTERFACE,
        server = plan.server_address,
        prefix = plan.vpn_subnet.prefix,
        port = plan.port,
        device = plan.device,
    )
}

/// `install_wg_client.sh`: installs the one client config found next to it.
pub fn render_client_install_sh(meta: &RenderMeta) -> String {
    format!(
        r#"#!/bin/sh
# {script} generated by {generator} on {generated}
set -e
cd "$(dirname "$0")"

conf=$(ls wg0_client*.conf 2>/dev/null | head -n 1)
if [ -z "$conf" ]; then
    echo "no wg0_client*.conf next to this script" >&2
    exit 1
fi
if ! command -v wg-quick >/dev/null 2>&1; then
    echo "wireguard-tools not installed, install it first" >&2
    exit 1
fi

install -d -m 700 /etc/wireguard
install -m 600 "$conf" /etc/wireguard/{iface}.conf
wg-quick up {iface}
"#,
        script = config::CLIENT_INSTALL_SH,
        generator = meta.generator,
        generated = meta.generated,
        iface = config::WG_INTERFACE,
    )
}

/// `install_wg_client.bat`: registers the tunnel with WireGuard for Windows.
pub fn render_client_install_bat(meta: &RenderMeta) -> String {
    let lines = [
        "@echo off".to_string(),
        format!(
            "rem {} generated by {} on {}",
            config::CLIENT_INSTALL_BAT,
            meta.generator,
            meta.generated
        ),
        r#"set WG="%ProgramFiles%\WireGuard\wireguard.exe""#.to_string(),
        r#"if not exist %WG% (echo Install WireGuard for Windows first & exit /b 1)"#.to_string(),
        r#"for %%f in ("%~dp0wg0_client*.conf") do (%WG% /installtunnelservice "%%~ff" & goto :done)"#
            .to_string(),
        "echo No wg0_client*.conf next to this script".to_string(),
        "exit /b 1".to_string(),
        ":done".to_string(),
    ];
    // cmd.exe wants CRLF
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}
