use std::time::Duration;

use async_trait::async_trait;
use tokio::net::lookup_host;

use crate::settings::ProbeSettings;

/// Answers whether the monitored network is reachable right now.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Never fails; any lookup problem reads as unreachable.
    async fn is_reachable(&self) -> bool;
}

/// Resolves an internal host name that only exists on the campus network.
#[derive(Debug, Clone)]
pub struct DnsProbe {
    host: String,
    timeout: Duration,
}

impl DnsProbe {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &ProbeSettings) -> Self {
        Self::new(
            settings.host.clone(),
            Duration::from_millis(settings.timeout_ms),
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl ConnectivityProbe for DnsProbe {
    async fn is_reachable(&self) -> bool {
        let lookup = lookup_host((self.host.as_str(), 0));
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(err)) => {
                log::debug!("lookup of {} failed: {err}", self.host);
                false
            }
            Err(_) => {
                log::debug!("lookup of {} timed out after {:?}", self.host, self.timeout);
                false
            }
        }
    }
}
