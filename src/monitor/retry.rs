use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{error::PageError, page::PageSession};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Capped, fixed-delay retry used for page navigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug)]
pub enum Navigation {
    Loaded { attempts: u32 },
    /// Every attempt failed; carries the last error.
    Exhausted(PageError),
    Cancelled,
}

pub async fn navigate_with_retry(
    page: &mut dyn PageSession,
    url: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Navigation {
    let attempts = policy.attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            return Navigation::Cancelled;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Navigation::Cancelled,
            result = page.navigate(url) => result,
        };

        match result {
            Ok(()) => {
                log_debug!("loaded {url} on attempt {attempt}/{attempts}");
                return Navigation::Loaded { attempts: attempt };
            }
            Err(err) => {
                log_warn!("navigation attempt {attempt}/{attempts} failed: {err}");
                last_error = Some(err);
            }
        }

        if attempt < attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Navigation::Cancelled,
                _ = tokio::time::sleep(policy.delay()) => {}
            }
        }
    }

    Navigation::Exhausted(last_error.unwrap_or_else(|| PageError::Navigation {
        url: url.to_string(),
        reason: "no attempts made".into(),
    }))
}
