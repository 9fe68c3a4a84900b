use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReadingError, SetupError};

/// Number of digits in an institution CRN.
pub const CRN_LEN: usize = 5;

/// Course Reference Number identifying one course section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crn(String);

impl Crn {
    pub fn parse(raw: &str) -> Result<Self, SetupError> {
        let trimmed = raw.trim();
        if trimmed.len() == CRN_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(SetupError::InvalidCrn(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Crn {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub crn: Crn,
    pub notified: bool,
}

impl CourseRecord {
    pub fn new(crn: Crn) -> Self {
        Self {
            crn,
            notified: false,
        }
    }
}

/// One enrolled/capacity sample read from the status element of a CRN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReading {
    pub current: u32,
    pub capacity: u32,
}

impl StatusReading {
    /// Parse status text shaped like `"29/30"`. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, ReadingError> {
        let malformed = || ReadingError::Malformed(text.to_string());

        let (current, capacity) = text.trim().split_once('/').ok_or_else(malformed)?;
        let current = current.trim().parse::<u32>().map_err(|_| malformed())?;
        let capacity = capacity.trim().parse::<u32>().map_err(|_| malformed())?;

        Ok(Self { current, capacity })
    }

    /// Negative when the section is over-enrolled.
    pub fn open_seats(&self) -> i64 {
        i64::from(self.capacity) - i64::from(self.current)
    }

    pub fn has_open_seats(&self) -> bool {
        self.open_seats() > 0
    }
}

impl fmt::Display for StatusReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.capacity)
    }
}
