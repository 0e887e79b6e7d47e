//! Address allocation and plan resolution.
//!
//! - [`allocator`] - server and client address allocation
//! - [`resolve`] - merging options and probe results into a [`crate::models::VpnPlan`]

mod allocator;
mod resolve;

// Re-export public functions
pub use allocator::{
    allocate_client_addresses, allocate_server_address, check_capacity, max_clients,
};
pub use resolve::{
    build_plan, check_endpoint, parse_client_count, parse_port, parse_vpn_subnet, probe_host,
};
