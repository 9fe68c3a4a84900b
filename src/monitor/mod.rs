pub mod controller;
pub mod poll_cycle;
pub mod retry;
pub mod state;

pub use controller::MonitorLoop;
pub use poll_cycle::{run_cycle, CrnOutcome, CycleContext, CycleReport};
pub use retry::{navigate_with_retry, Navigation, RetryPolicy};
pub use state::{MonitorOutcome, MonitorPhase, MonitorReport};
