use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TermCode;

/// Per-run monitor state owned by the monitor loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub term_code: TermCode,
    /// Set once the "monitoring started" email went out.
    pub confirmation_sent: bool,
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(term_code: TermCode) -> Self {
        Self {
            term_code,
            confirmation_sent: false,
            started_at: Utc::now(),
        }
    }
}
