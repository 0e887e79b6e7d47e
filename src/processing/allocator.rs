//! VPN address allocation.
//!
//! Server gets `base + 1` unless overridden; clients are handed out in
//! order from the bottom of the subnet, stepping over the server address.

use crate::config;
use crate::error::WgError;
use crate::models::{get_cidr_mask, next_addr, Subnet, MAX_LENGTH};
use std::net::Ipv4Addr;

/// Client bound for a prefix length: `mask(32) - mask(prefix) - 1`.
///
/// A request must stay strictly below this value, which keeps the subnet
/// base, the server and the top (broadcast) address away from clients.
pub fn max_clients(prefix: u8) -> Result<u64, WgError> {
    let full = u64::from(get_cidr_mask(MAX_LENGTH)?);
    let mask = u64::from(get_cidr_mask(prefix)?);
    Ok((full - mask).saturating_sub(1))
}

/// Reject client counts the subnet cannot hold, before anything is allocated.
pub fn check_capacity(subnet: &Subnet, count: u32) -> Result<(), WgError> {
    let bound = max_clients(subnet.prefix)?;
    log::debug!("subnet {subnet} client bound {bound}, requested {count}");
    if u64::from(count) >= bound {
        return Err(WgError::TooManyClients {
            count,
            subnet: subnet.to_string(),
            max: bound.saturating_sub(1),
        });
    }
    Ok(())
}

/// Pick the server tunnel address.
///
/// An explicit address must lie inside the subnet and must not be its base.
pub fn allocate_server_address(
    subnet: &Subnet,
    explicit: Option<Ipv4Addr>,
) -> Result<Ipv4Addr, WgError> {
    match explicit {
        Some(address) => {
            if subnet.contains(address) && address != subnet.base {
                Ok(address)
            } else {
                Err(WgError::ServerAddressOutOfSubnet {
                    address: address.to_string(),
                    subnet: subnet.to_string(),
                })
            }
        }
        None => next_addr(subnet.base)
            .filter(|address| subnet.contains(*address))
            .ok_or_else(|| WgError::ServerAddress(format!("no room above base of {subnet}"))),
    }
}

/// Hand out `count` client addresses in increasing order.
///
/// The cursor starts at the subnet base and only moves forward, skipping
/// `server` once, so the result has no duplicates and never holds the server.
pub fn allocate_client_addresses(
    subnet: &Subnet,
    server: Ipv4Addr,
    count: usize,
) -> Result<Vec<Ipv4Addr>, WgError> {
    let top = u64::from(u32::from(subnet.max_usable()));
    let server = u64::from(u32::from(server));
    let mut cursor = u64::from(u32::from(subnet.base));
    let mut clients = Vec::with_capacity(count.min(config::PREALLOCATE_MAX));

    while clients.len() < count {
        cursor += 1;
        if cursor == server {
            cursor += 1;
        }
        if cursor > top {
            return Err(WgError::SubnetExhausted {
                subnet: subnet.to_string(),
                allocated: clients.len(),
            });
        }
        clients.push(Ipv4Addr::from(cursor as u32));
    }
    log::debug!(
        "allocated {} client addresses in {subnet}: {:?}..{:?}",
        clients.len(),
        clients.first(),
        clients.last()
    );
    Ok(clients)
}
