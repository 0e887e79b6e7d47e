//! Error type shared by every stage of the generator.
//!
//! Each variant maps to one process exit code, see [`WgError::exit_code`].

use thiserror::Error;

/// Every way a generation run can fail.
#[derive(Debug, Error)]
pub enum WgError {
    /// Unknown command line flag.
    #[error("Unknown option {0}")]
    UnknownOption(String),

    /// Any other command line syntax problem reported by the parser.
    #[error("{0}")]
    Usage(String),

    /// `-n|--nclients` was not given or is not a positive number.
    #[error("Number of clients missing or invalid{0}, pass it with -n|--nclients")]
    MissingClientCount(String),

    /// A required external tool is not on the PATH.
    #[error("Required tool '{0}' not found in PATH")]
    MissingTool(String),

    /// Text that is not a dotted-quad IPv4 address.
    #[error("Malformed IPv4 address '{0}'")]
    MalformedAddress(String),

    /// Prefix length outside 0-32.
    #[error("Invalid prefix length '{0}', expected 0-32")]
    InvalidPrefixLength(String),

    /// Requested client count does not fit the VPN subnet.
    #[error("Too many clients: {count} requested, subnet {subnet} allows at most {max}")]
    TooManyClients { count: u32, subnet: String, max: u64 },

    /// The allocator ran past the top of the subnet.
    #[error("Subnet {subnet} exhausted after {allocated} client addresses")]
    SubnetExhausted { subnet: String, allocated: usize },

    /// Explicit server address does not lie strictly inside the VPN subnet.
    #[error("Server address {address} is outside VPN subnet {subnet}")]
    ServerAddressOutOfSubnet { address: String, subnet: String },

    /// The server address could not be computed (malformed `--vpns`).
    #[error("Could not compute VPN server address: {0}")]
    ServerAddress(String),

    /// `--vpnb` missing or unusable.
    #[error("VPN base address missing or invalid{0}, pass it with --vpnb")]
    MissingVpnBase(String),

    /// `--vpnm` missing or unusable.
    #[error("VPN netmask missing or invalid{0}, pass it with --vpnm")]
    MissingVpnMask(String),

    /// Network device could not be probed and was not given.
    #[error("Could not determine network device, pass it with --device")]
    DeviceUnresolved,

    /// LAN network could not be probed and was not given.
    #[error("Could not determine local network{0}, pass it with --network")]
    NetworkUnresolved(String),

    /// LAN netmask could not be probed and was not given.
    #[error("Could not determine local netmask{0}, pass it with --netmask")]
    NetmaskUnresolved(String),

    /// Listen port outside 1-65535.
    #[error("Invalid port '{0}', expected 1-65535")]
    InvalidPort(String),

    /// Public IP lookup failed and no `--endpoint` was given.
    #[error("Could not fetch public IP ({0}), pass it with --endpoint")]
    PublicIpFetch(String),

    /// `--endpoint` is neither a hostname nor a dotted-quad address.
    #[error("Invalid endpoint '{0}', expected a hostname or IPv4 address")]
    InvalidEndpoint(String),

    /// A network probe or the public IP lookup did not answer in time.
    #[error("Environment probe '{probe}' timed out after {secs}s")]
    EnvironmentProbeTimeout { probe: String, secs: u64 },

    /// External tool ran but failed (key generation, archiving).
    #[error("External tool failed: {0}")]
    ExternalTool(String),

    /// Server install script failed.
    #[error("Install step failed: {0}")]
    InstallFailed(String),

    /// Writing or removing a generated file failed.
    #[error("File error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl WgError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            WgError::UnknownOption(_) | WgError::Usage(_) => 1,
            WgError::MissingClientCount(_) | WgError::MissingTool(_) => 2,
            WgError::TooManyClients { .. }
            | WgError::SubnetExhausted { .. }
            | WgError::PublicIpFetch(_)
            | WgError::InvalidEndpoint(_) => 4,
            WgError::DeviceUnresolved
            | WgError::NetworkUnresolved(_)
            | WgError::NetmaskUnresolved(_)
            | WgError::InvalidPort(_) => 5,
            WgError::EnvironmentProbeTimeout { probe, .. } => {
                if probe == crate::config::PUBLIC_IP_PROBE {
                    4
                } else {
                    5
                }
            }
            WgError::MissingVpnBase(_) => 8,
            WgError::MissingVpnMask(_) => 9,
            WgError::MalformedAddress(_)
            | WgError::InvalidPrefixLength(_)
            | WgError::ServerAddress(_) => 10,
            WgError::ServerAddressOutOfSubnet { .. } => 12,
            WgError::ExternalTool(_) | WgError::InstallFailed(_) | WgError::Io { .. } => 21,
        }
    }

    /// Wrap an io error with the path it happened on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> WgError {
        WgError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(WgError::UnknownOption("--foo".into()).exit_code(), 1);
        assert_eq!(WgError::MissingClientCount(String::new()).exit_code(), 2);
        assert_eq!(WgError::MissingTool("wg".into()).exit_code(), 2);
        let too_many = WgError::TooManyClients {
            count: 254,
            subnet: "10.10.0.0/24".into(),
            max: 254,
        };
        assert_eq!(too_many.exit_code(), 4);
        assert_eq!(WgError::PublicIpFetch("dns".into()).exit_code(), 4);
        assert_eq!(WgError::InvalidEndpoint("a\\nb".into()).exit_code(), 4);
        assert_eq!(WgError::DeviceUnresolved.exit_code(), 5);
        assert_eq!(WgError::InvalidPort("0".into()).exit_code(), 5);
        assert_eq!(WgError::MissingVpnBase(String::new()).exit_code(), 8);
        assert_eq!(WgError::MissingVpnMask(String::new()).exit_code(), 9);
        assert_eq!(WgError::ServerAddress("x".into()).exit_code(), 10);
        let outside = WgError::ServerAddressOutOfSubnet {
            address: "10.20.0.1".into(),
            subnet: "10.10.0.0/24".into(),
        };
        assert_eq!(outside.exit_code(), 12);
        assert_eq!(WgError::InstallFailed("sh".into()).exit_code(), 21);
    }

    #[test]
    fn test_probe_timeout_exit_code() {
        let public = WgError::EnvironmentProbeTimeout {
            probe: crate::config::PUBLIC_IP_PROBE.to_string(),
            secs: 10,
        };
        assert_eq!(public.exit_code(), 4);
        let route = WgError::EnvironmentProbeTimeout {
            probe: "ip -json route show default".to_string(),
            secs: 10,
        };
        assert_eq!(route.exit_code(), 5);
    }

    #[test]
    fn test_unknown_option_message() {
        assert_eq!(
            WgError::UnknownOption("--bogus".into()).to_string(),
            "Unknown option --bogus"
        );
    }
}
