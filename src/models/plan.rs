//! Resolved generation plan and key material.

use super::Subnet;
use std::fmt;
use std::net::Ipv4Addr;

/// Everything the renderer needs to know about one generation run.
///
/// Built once by [`crate::processing::build_plan`] and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct VpnPlan {
    /// Range used for tunnel addresses.
    pub vpn_subnet: Subnet,
    /// Server tunnel address.
    pub server_address: Ipv4Addr,
    /// Client tunnel addresses in allocation order.
    pub client_addresses: Vec<Ipv4Addr>,
    /// Host or IP clients dial.
    pub endpoint: String,
    /// Server listen port.
    pub port: u16,
    /// LAN the server bridges clients into.
    pub remote_network: Subnet,
    /// Server interface used for NAT.
    pub device: String,
}

impl VpnPlan {
    /// `endpoint:port` as written into client configs.
    pub fn endpoint_with_port(&self) -> String {
        format!("{}:{}", self.endpoint, self.port)
    }

    pub fn client_count(&self) -> usize {
        self.client_addresses.len()
    }
}

/// What the environment prober could find out about the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostNetwork {
    pub default_device: Option<String>,
    pub local_address: Option<Ipv4Addr>,
    pub local_subnet: Option<Subnet>,
    pub public_endpoint: Option<String>,
}

/// A WireGuard key pair as base64 text.
#[derive(Clone, PartialEq)]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Keys for the server and every client, clients in allocation order.
#[derive(Debug, Clone)]
pub struct Keyring {
    pub server: KeyPair,
    pub clients: Vec<KeyPair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_debug_hides_private_key() {
        let keys = KeyPair {
            private_key: "cHJpdmF0ZQ==".to_string(),
            public_key: "cHVibGlj".to_string(),
        };
        let debug = format!("{keys:?}");
        assert!(!debug.contains("cHJpdmF0ZQ=="));
        assert!(debug.contains("cHVibGlj"));
    }

    #[test]
    fn test_endpoint_with_port() {
        let plan = VpnPlan {
            vpn_subnet: Subnet::new("10.10.0.0/24").unwrap(),
            server_address: Ipv4Addr::new(10, 10, 0, 1),
            client_addresses: vec![Ipv4Addr::new(10, 10, 0, 2)],
            endpoint: "vpn.example.org".to_string(),
            port: 51820,
            remote_network: Subnet::new("192.168.1.0/24").unwrap(),
            device: "eth0".to_string(),
        };
        assert_eq!(plan.endpoint_with_port(), "vpn.example.org:51820");
        assert_eq!(plan.client_count(), 1);
    }
}
