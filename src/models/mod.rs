//! Domain models for the config generator.
//!
//! - [`Subnet`] and the IPv4 helpers - address arithmetic
//! - [`VpnPlan`] - the resolved run configuration
//! - [`KeyPair`] and [`Keyring`] - key material
//! - [`HostNetwork`] - what the environment prober found

mod ipv4;
mod plan;

// Re-export public types
pub use ipv4::{
    cut_addr, get_cidr_mask, next_addr, parse_addr, parse_prefix, to_dotted_quad,
    to_number, Subnet, MAX_LENGTH,
};
pub use plan::{HostNetwork, KeyPair, Keyring, VpnPlan};
