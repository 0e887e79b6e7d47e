//! Public IP discovery over HTTP.

use crate::config;
use crate::error::WgError;
use crate::models::parse_addr;
use std::time::Duration;

/// Source of the address clients should dial when no `--endpoint` is given.
#[allow(async_fn_in_trait)]
pub trait PublicIpLookup {
    async fn public_ip(&self) -> Result<String, WgError>;
}

/// Plain-text "what is my IP" service fetched with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    url: String,
    timeout: Duration,
}

impl HttpLookup {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        HttpLookup {
            url: url.into(),
            timeout,
        }
    }

    /// Lookup against `WG_PUBLIC_IP_URL`, or the default service.
    pub fn from_env() -> Self {
        let url = std::env::var("WG_PUBLIC_IP_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| config::DEFAULT_PUBLIC_IP_URL.to_string());
        HttpLookup::new(
            url,
            Duration::from_secs(config::PUBLIC_IP_TIMEOUT_SECS),
        )
    }
}

impl PublicIpLookup for HttpLookup {
    async fn public_ip(&self) -> Result<String, WgError> {
        log::info!("fetching public IP from {}", self.url);
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| WgError::PublicIpFetch(e.to_string()))?;

        let response = client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                WgError::EnvironmentProbeTimeout {
                    probe: config::PUBLIC_IP_PROBE.to_string(),
                    secs: self.timeout.as_secs(),
                }
            } else {
                WgError::PublicIpFetch(e.to_string())
            }
        })?;
        let response = response
            .error_for_status()
            .map_err(|e| WgError::PublicIpFetch(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| WgError::PublicIpFetch(e.to_string()))?;
        check_public_ip(&body)
    }
}

/// The service must answer with a bare dotted-quad address.
pub fn check_public_ip(body: &str) -> Result<String, WgError> {
    let body = body.trim();
    parse_addr(body)
        .map(|addr| addr.to_string())
        .map_err(|_| WgError::PublicIpFetch(format!("unexpected answer '{body}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_public_ip() {
        assert_eq!(check_public_ip("203.0.113.7\n").unwrap(), "203.0.113.7");
        assert!(matches!(
            check_public_ip("<html>rate limited</html>"),
            Err(WgError::PublicIpFetch(_))
        ));
        assert!(check_public_ip("").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Nothing listens on port 9 of the loopback interface.
        let lookup = HttpLookup::new("http://127.0.0.1:9/", Duration::from_secs(2));
        let err = lookup.public_ip().await.unwrap_err();
        assert!(matches!(
            err,
            WgError::PublicIpFetch(_) | WgError::EnvironmentProbeTimeout { .. }
        ));
        assert_eq!(err.exit_code(), 4);
    }
}
