pub mod course;
pub mod plan;
pub mod session;
pub mod term;

pub use course::{CourseRecord, Crn, StatusReading, CRN_LEN};
pub use plan::RunPlan;
pub use session::SessionState;
pub use term::{parse_school_year, Term, TermCode};
