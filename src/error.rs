use thiserror::Error;

/// Fatal problems found before the monitor loop starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("'{email}' is not an institutional address; use an address ending in {domain}")]
    InvalidEmail { email: String, domain: String },

    #[error("'{0}' is not a school year; enter the 4-digit year the academic year ends in (e.g. 2025)")]
    InvalidSchoolYear(String),

    #[error("'{0}' is not a term; choose Fall, Winter, Spring or Summer (or 1-4)")]
    InvalidTerm(String),

    #[error("'{0}' is not a valid term code; expected 6 digits such as 202510")]
    InvalidTermCode(String),

    #[error("'{0}' is not a CRN; expected a 5-digit number")]
    InvalidCrn(String),

    #[error("no CRNs were entered; add at least one course to monitor")]
    NoCrns,

    #[error("cannot reach {host}; connect to the campus network or VPN and try again")]
    NoConnectivity { host: String },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a page session.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("could not open a browser session: {0}")]
    Session(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout_ms}ms waiting for element #{id}")]
    Timeout { id: String, timeout_ms: u64 },

    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("page command failed: {0}")]
    Command(String),
}

/// Failures while dispatching an email.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("mail relay rejected or dropped the message: {0}")]
    Transport(String),
}

/// A status element whose text is not `<current>/<capacity>`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadingError {
    #[error("status text '{0}' is not of the form current/capacity")]
    Malformed(String),
}
