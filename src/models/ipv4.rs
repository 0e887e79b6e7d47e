//! IPv4 address and CIDR notation utilities.
//!
//! Addresses are [`Ipv4Addr`] values; arithmetic is done on their `u32`
//! form. [`Subnet`] is a base address plus prefix length.

use crate::error::WgError;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Parse dotted-quad text into its 32-bit value.
///
/// Exactly four decimal octets, each 0-255.
///
/// # Examples
/// ```
/// use wg_config_gen::models::to_number;
/// assert_eq!(to_number("10.10.0.1").unwrap(), 0x0A0A0001);
/// assert!(to_number("10.10.0").is_err());
/// ```
pub fn to_number(dotted: &str) -> Result<u32, WgError> {
    let dotted = dotted.trim();
    let octets: Vec<&str> = dotted.split('.').collect();
    if octets.len() != 4 {
        return Err(WgError::MalformedAddress(dotted.to_string()));
    }
    let mut value: u32 = 0;
    for octet in octets {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WgError::MalformedAddress(dotted.to_string()));
        }
        let byte: u8 = octet
            .parse()
            .map_err(|_| WgError::MalformedAddress(dotted.to_string()))?;
        value = (value << 8) | u32::from(byte);
    }
    Ok(value)
}

/// Format a 32-bit value as dotted-quad text.
pub fn to_dotted_quad(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// Parse dotted-quad text into an [`Ipv4Addr`].
pub fn parse_addr(dotted: &str) -> Result<Ipv4Addr, WgError> {
    to_number(dotted).map(Ipv4Addr::from)
}

/// Parse a prefix length, rejecting anything outside 0-32.
pub fn parse_prefix(text: &str) -> Result<u8, WgError> {
    let text = text.trim();
    let len: u8 = text
        .parse()
        .map_err(|_| WgError::InvalidPrefixLength(text.to_string()))?;
    if len > MAX_LENGTH {
        return Err(WgError::InvalidPrefixLength(text.to_string()));
    }
    Ok(len)
}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use wg_config_gen::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, WgError> {
    if len > MAX_LENGTH {
        Err(WgError::InvalidPrefixLength(len.to_string()))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, WgError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// The address after `addr`, or `None` past 255.255.255.255.
pub fn next_addr(addr: Ipv4Addr) -> Option<Ipv4Addr> {
    u32::from(addr).checked_add(1).map(Ipv4Addr::from)
}

/// IPv4 subnet: base address plus prefix length.
///
/// The base is kept as given, host bits included.
#[derive(Eq, Ord, Debug, Copy, Clone, Hash)]
pub struct Subnet {
    /// First address of the range.
    pub base: Ipv4Addr,
    /// The prefix length (0-32).
    pub prefix: u8,
}

impl Subnet {
    /// Create a new [`Subnet`] from a CIDR string (e.g., "10.0.0.0/24").
    pub fn new(addr_cidr: &str) -> Result<Subnet, WgError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, prefix) = addr_cidr
            .split_once('/')
            .ok_or_else(|| WgError::MalformedAddress(addr_cidr.to_string()))?;
        Subnet::from_parts(parse_addr(addr)?, parse_prefix(prefix)?)
    }

    /// Create a [`Subnet`] from an address and prefix length.
    pub fn from_parts(base: Ipv4Addr, prefix: u8) -> Result<Subnet, WgError> {
        if prefix > MAX_LENGTH {
            return Err(WgError::InvalidPrefixLength(prefix.to_string()));
        }
        let subnet = Subnet { base, prefix };
        if subnet.max_usable_bits() > u64::from(u32::MAX) {
            return Err(WgError::MalformedAddress(format!(
                "{subnet} runs past 255.255.255.255"
            )));
        }
        Ok(subnet)
    }

    /// Number of addresses in the subnet, `2^(32-prefix)`.
    pub fn capacity(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.prefix)
    }

    /// Highest offset from the base that still lies inside the subnet.
    pub fn max_usable_offset(&self) -> u64 {
        self.capacity() - 1
    }

    fn max_usable_bits(&self) -> u64 {
        u64::from(u32::from(self.base)) + self.max_usable_offset()
    }

    /// Highest address inside the subnet, `base + capacity - 1`.
    pub fn max_usable(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.max_usable_bits().min(u64::from(u32::MAX)) as u32)
    }

    /// True iff `base <= addr <= base + capacity - 1`.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let addr = u64::from(u32::from(addr));
        let base = u64::from(u32::from(self.base));
        base <= addr && addr <= self.max_usable_bits()
    }

    /// True when the base has bits set below the prefix.
    pub fn has_host_bits(&self) -> bool {
        cut_addr(self.base, self.prefix)
            .map(|network| network != self.base)
            .unwrap_or(false)
    }

    /// True when the two ranges share at least one address.
    pub fn overlaps(&self, other: &Subnet) -> bool {
        self.contains(other.base) || other.contains(self.base)
    }
}

impl FromStr for Subnet {
    type Err = WgError;

    fn from_str(s: &str) -> Result<Subnet, WgError> {
        Subnet::new(s)
    }
}

impl std::fmt::Display for Subnet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}

impl PartialEq for Subnet {
    fn eq(&self, other: &Subnet) -> bool {
        self.base == other.base && self.prefix == other.prefix
    }
}

impl PartialOrd for Subnet {
    fn partial_cmp(&self, other: &Subnet) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number() {
        assert_eq!(to_number("0.0.0.0").unwrap(), 0);
        assert_eq!(to_number("10.10.0.0").unwrap(), 0x0A0A0000);
        assert_eq!(to_number(" 192.168.1.42 ").unwrap(), 0xC0A8012A);
        assert_eq!(to_number("255.255.255.255").unwrap(), u32::MAX);
    }

    #[test]
    fn test_to_number_malformed() {
        for bad in [
            "", "10.10.0", "10.10.0.0.1", "10.10.0.x", "10.10.0.256", "10..0.1", "-1.0.0.0",
            "+1.0.0.0", "1.2.3.4/24",
        ] {
            assert!(
                matches!(to_number(bad), Err(WgError::MalformedAddress(_))),
                "expected MalformedAddress for '{bad}'"
            );
        }
    }

    #[test]
    fn test_dotted_quad_round_trip() {
        for x in [
            0u32,
            1,
            255,
            256,
            0x0A0A0001,
            0x7FFFFFFF,
            0x80000000,
            0xC0A80101,
            u32::MAX - 1,
            u32::MAX,
        ] {
            assert_eq!(to_number(&to_dotted_quad(x)).unwrap(), x);
        }
        let mut x: u32 = 1;
        while let Some(next) = x.checked_mul(7) {
            assert_eq!(to_number(&to_dotted_quad(x)).unwrap(), x);
            x = next.wrapping_add(3);
        }
    }

    #[test]
    fn test_get_cidr_mask() {
        assert_eq!(get_cidr_mask(0).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(8).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(16).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
        assert_eq!(get_cidr_mask(31).unwrap(), 0xFFFFFFFE);
        assert_eq!(get_cidr_mask(32).unwrap(), 0xFFFFFFFF);
        assert!(matches!(
            get_cidr_mask(33),
            Err(WgError::InvalidPrefixLength(_))
        ));
    }

    #[test]
    fn test_parse_prefix() {
        assert_eq!(parse_prefix("24").unwrap(), 24);
        assert_eq!(parse_prefix("0").unwrap(), 0);
        assert!(parse_prefix("33").is_err());
        assert!(parse_prefix("-1").is_err());
        assert!(parse_prefix("").is_err());
    }

    #[test]
    fn test_cut_addr() {
        let ip = Ipv4Addr::new(192, 168, 1, 42);
        assert_eq!(cut_addr(ip, 24).unwrap(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cut_addr(ip, 16).unwrap(), Ipv4Addr::new(192, 168, 0, 0));
        assert_eq!(cut_addr(ip, 32).unwrap(), ip);
        assert_eq!(cut_addr(ip, 0).unwrap(), Ipv4Addr::new(0, 0, 0, 0));
        assert!(cut_addr(ip, 33).is_err());
    }

    #[test]
    fn test_next_addr() {
        assert_eq!(
            next_addr(Ipv4Addr::new(10, 10, 0, 255)),
            Some(Ipv4Addr::new(10, 10, 1, 0))
        );
        assert_eq!(next_addr(Ipv4Addr::BROADCAST), None);
    }

    #[test]
    fn test_subnet_new() {
        let subnet = Subnet::new("10.10.0.0/24").unwrap();
        assert_eq!(subnet.base, Ipv4Addr::new(10, 10, 0, 0));
        assert_eq!(subnet.prefix, 24);
        assert_eq!(subnet.capacity(), 256);
        assert_eq!(subnet.max_usable_offset(), 255);
        assert_eq!(subnet.max_usable(), Ipv4Addr::new(10, 10, 0, 255));
        assert_eq!(subnet.to_string(), "10.10.0.0/24");
        assert_eq!("10.10.0.0/24".parse::<Subnet>().unwrap(), subnet);

        assert!(Subnet::new("10.10.0.0").is_err());
        assert!(Subnet::new("10.10.0.0/33").is_err());
        assert!(Subnet::new("10.10.0/24").is_err());
        assert!(Subnet::new("255.255.255.1/24").is_err());
        assert_eq!(Subnet::new("0.0.0.0/0").unwrap().capacity(), 1u64 << 32);
    }

    #[test]
    fn test_membership_boundaries() {
        for cidr in [
            "10.10.0.0/24",
            "192.168.1.128/25",
            "172.16.0.0/12",
            "10.0.0.4/30",
            "10.0.0.7/32",
            "1.0.0.0/8",
        ] {
            let subnet = Subnet::new(cidr).unwrap();
            assert!(subnet.contains(subnet.base), "{cidr} must contain its base");
            assert!(subnet.contains(subnet.max_usable()));
            let below = Ipv4Addr::from(u32::from(subnet.base) - 1);
            assert!(!subnet.contains(below), "{cidr} must not contain {below}");
            if let Some(above) = next_addr(subnet.max_usable()) {
                assert!(!subnet.contains(above));
            }
        }
        let all = Subnet::new("0.0.0.0/0").unwrap();
        assert!(all.contains(Ipv4Addr::BROADCAST));
    }

    #[test]
    fn test_host_bits_tolerated() {
        let subnet = Subnet::new("10.10.0.5/24").unwrap();
        assert!(subnet.has_host_bits());
        assert_eq!(subnet.max_usable(), Ipv4Addr::new(10, 10, 1, 4));
        assert!(subnet.contains(Ipv4Addr::new(10, 10, 1, 0)));
        assert!(!subnet.contains(Ipv4Addr::new(10, 10, 0, 4)));
        assert!(!Subnet::new("10.10.0.0/24").unwrap().has_host_bits());
    }

    #[test]
    fn test_overlaps() {
        let vpn = Subnet::new("10.10.0.0/24").unwrap();
        let lan = Subnet::new("192.168.1.0/24").unwrap();
        let wide = Subnet::new("10.0.0.0/8").unwrap();
        assert!(!vpn.overlaps(&lan));
        assert!(vpn.overlaps(&wide));
        assert!(wide.overlaps(&vpn));
    }

    #[test]
    fn test_subnet_cmp() {
        let a = Subnet::new("10.0.0.0/8").unwrap();
        let b = Subnet::new("10.0.10.0/24").unwrap();
        assert!(a < b);
    }
}
