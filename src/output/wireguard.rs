//! WireGuard configuration text for the server and each client.

use super::RenderMeta;
use crate::config;
use crate::models::{cut_addr, KeyPair, Subnet, VpnPlan};
use itertools::Itertools;
use std::net::Ipv4Addr;

/// Firewall/NAT rules run by `wg-quick`; `op` is `-A` on up and `-D` on down.
fn firewall_rules(op: &str, vpn: &Subnet, device: &str) -> String {
    let network = cut_addr(vpn.base, vpn.prefix).unwrap_or(vpn.base);
    [
        format!("iptables {op} FORWARD -i %i -j ACCEPT"),
        format!("iptables {op} FORWARD -o %i -j ACCEPT"),
        format!(
            "iptables -t nat {op} POSTROUTING -s {network}/{prefix} -o {device} -j MASQUERADE",
            prefix = vpn.prefix
        ),
    ]
    .iter()
    .join("; ")
}

/// `wg0_server.conf`: the interface plus one peer per client, in allocation order.
pub fn render_server_config(
    plan: &VpnPlan,
    server: &KeyPair,
    clients: &[KeyPair],
    meta: &RenderMeta,
) -> String {
    let mut lines = vec![
        format!(
            "# {} generated by {} on {}",
            config::SERVER_CONF,
            meta.generator,
            meta.generated
        ),
        "[Interface]".to_string(),
        format!("Address = {}/{}", plan.server_address, plan.vpn_subnet.prefix),
        format!("ListenPort = {}", plan.port),
        format!("PrivateKey = {}", server.private_key),
        format!("PostUp = {}", firewall_rules("-A", &plan.vpn_subnet, &plan.device)),
        format!("PostDown = {}", firewall_rules("-D", &plan.vpn_subnet, &plan.device)),
    ];

    for (n, (address, keys)) in plan.client_addresses.iter().zip(clients).enumerate() {
        lines.extend([
            String::new(),
            "[Peer]".to_string(),
            format!("# client{}", n + 1),
            format!("PublicKey = {}", keys.public_key),
            format!("AllowedIPs = {address}/32"),
        ]);
    }
    lines.push(String::new());
    lines.join("\n")
}

/// `wg0_client<N>.conf`: one interface and a single peer pointing at the server.
pub fn render_client_config(
    plan: &VpnPlan,
    n: usize,
    address: Ipv4Addr,
    client: &KeyPair,
    server_public_key: &str,
    meta: &RenderMeta,
) -> String {
    [
        format!(
            "# {} generated by {} on {}",
            config::client_conf_name(n),
            meta.generator,
            meta.generated
        ),
        "[Interface]".to_string(),
        format!("PrivateKey = {}", client.private_key),
        format!("Address = {address}/32"),
        String::new(),
        "[Peer]".to_string(),
        format!("PublicKey = {server_public_key}"),
        format!("Endpoint = {}", plan.endpoint_with_port()),
        format!("AllowedIPs = {}/32, {}", plan.server_address, plan.remote_network),
        format!("PersistentKeepalive = {}", config::PERSISTENT_KEEPALIVE),
        String::new(),
    ]
    .join("\n")
}
