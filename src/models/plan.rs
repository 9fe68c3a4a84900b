use crate::registry::CourseRegistry;

use super::TermCode;

/// Everything interactive setup hands to the monitor loop.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Validated institutional address; used as both sender and recipient.
    pub email: String,
    pub term_code: TermCode,
    pub registry: CourseRegistry,
}
