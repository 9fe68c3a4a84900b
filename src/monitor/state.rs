use serde::{Deserialize, Serialize};

use crate::{models::SessionState, registry::CourseRegistry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MonitorPhase {
    Init,
    Confirming,
    Polling,
    Sleeping,
    Done,
    Aborted,
}

impl Default for MonitorPhase {
    fn default() -> Self {
        MonitorPhase::Init
    }
}

/// How a monitor run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Every watched CRN was notified.
    Completed,
    /// The operator asked the monitor to stop.
    Stopped,
    /// The run could not continue, e.g. no browser session could be opened.
    Aborted(String),
}

impl MonitorOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            MonitorOutcome::Completed | MonitorOutcome::Stopped => 0,
            MonitorOutcome::Aborted(_) => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub outcome: MonitorOutcome,
    pub phase: MonitorPhase,
    /// CRNs that were still unsatisfied when the run ended.
    pub registry: CourseRegistry,
    pub session: SessionState,
    pub cycles_run: u32,
}
