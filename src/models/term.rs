use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Term {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl Term {
    pub const ALL: [Term; 4] = [Term::Fall, Term::Winter, Term::Spring, Term::Summer];

    /// Two-digit suffix the registration system appends to the school year.
    pub fn code(&self) -> &'static str {
        match self {
            Term::Fall => "10",
            Term::Winter => "20",
            Term::Spring => "30",
            Term::Summer => "40",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Fall => "Fall",
            Term::Winter => "Winter",
            Term::Spring => "Spring",
            Term::Summer => "Summer",
        }
    }

    /// Accepts a term name (any case) or its 1-based menu position.
    pub fn from_selection(input: &str) -> Result<Self, SetupError> {
        let input = input.trim();
        if let Ok(index) = input.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| SetupError::InvalidTerm(input.to_string()));
        }

        Self::ALL
            .into_iter()
            .find(|term| term.as_str().eq_ignore_ascii_case(input))
            .ok_or_else(|| SetupError::InvalidTerm(input.to_string()))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Six-digit `YYYYTT` token selecting the registration term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermCode(String);

impl TermCode {
    pub fn new(school_year: &str, term: Term) -> Result<Self, SetupError> {
        let year = parse_school_year(school_year)?;
        Self::parse(&format!("{year}{}", term.code()))
    }

    pub fn parse(raw: &str) -> Result<Self, SetupError> {
        let raw = raw.trim();
        let valid_suffix = Term::ALL.iter().any(|term| raw.ends_with(term.code()));
        if raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_digit()) && valid_suffix {
            Ok(Self(raw.to_string()))
        } else {
            Err(SetupError::InvalidTermCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The school year is the 4-digit calendar year the academic year ends in.
pub fn parse_school_year(input: &str) -> Result<String, SetupError> {
    let input = input.trim();
    let plausible = input.len() == 4
        && input.bytes().all(|b| b.is_ascii_digit())
        && !input.starts_with('0');
    if plausible {
        Ok(input.to_string())
    } else {
        Err(SetupError::InvalidSchoolYear(input.to_string()))
    }
}
