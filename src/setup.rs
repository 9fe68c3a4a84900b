//! Collects the user's address, term and CRNs before monitoring starts.

use std::io::{BufRead, Write};

use crate::{
    error::SetupError,
    models::{parse_school_year, Crn, RunPlan, Term, TermCode},
    registry::CourseRegistry,
};

/// Values already supplied on the command line; anything missing is prompted for.
#[derive(Debug, Clone, Default)]
pub struct SetupArgs {
    pub email: Option<String>,
    pub year: Option<String>,
    pub term: Option<String>,
    pub crns: Vec<String>,
}

pub fn validate_email(raw: &str, domain: &str) -> Result<String, SetupError> {
    let email = raw.trim().to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    let local = email.strip_suffix(domain.as_str()).unwrap_or_default();

    let deliverable = email.parse::<lettre::Address>().is_ok();
    if local.is_empty() || local.contains('@') || !deliverable {
        return Err(SetupError::InvalidEmail {
            email: raw.trim().to_string(),
            domain,
        });
    }
    Ok(email)
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// End of input reads as an empty answer.
    fn ask(&mut self, question: &str) -> Result<String, SetupError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> Result<(), SetupError> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    pub fn email(&mut self, domain: &str) -> Result<String, SetupError> {
        let answer = self.ask(&format!("Email address ({domain}): "))?;
        validate_email(&answer, domain)
    }

    pub fn school_year(&mut self) -> Result<String, SetupError> {
        let answer = self.ask("School year the academic year ends in (e.g. 2025): ")?;
        parse_school_year(&answer)
    }

    pub fn term(&mut self) -> Result<Term, SetupError> {
        let menu = Term::ALL
            .iter()
            .enumerate()
            .map(|(i, term)| format!("{}) {term}", i + 1))
            .collect::<Vec<_>>()
            .join("  ");
        self.say(&menu)?;
        let answer = self.ask("Term: ")?;
        Term::from_selection(&answer)
    }

    /// Reads CRNs until an empty line. Bad entries are reported and skipped.
    pub fn crns(&mut self) -> Result<CourseRegistry, SetupError> {
        let mut registry = CourseRegistry::new();
        loop {
            let answer = self.ask("CRN (blank to finish): ")?;
            if answer.is_empty() {
                break;
            }
            match Crn::parse(&answer) {
                Ok(crn) => {
                    if !registry.add(crn) {
                        self.say(&format!("{answer} is already in the list"))?;
                    }
                }
                Err(err) => self.say(&err.to_string())?,
            }
        }

        if registry.is_empty() {
            return Err(SetupError::NoCrns);
        }
        Ok(registry)
    }

    /// Validates what `args` carries and prompts for the rest.
    pub fn collect(&mut self, args: &SetupArgs, domain: &str) -> Result<RunPlan, SetupError> {
        let email = match &args.email {
            Some(email) => validate_email(email, domain)?,
            None => self.email(domain)?,
        };
        let year = match &args.year {
            Some(year) => parse_school_year(year)?,
            None => self.school_year()?,
        };
        let term = match &args.term {
            Some(term) => Term::from_selection(term)?,
            None => self.term()?,
        };
        let term_code = TermCode::new(&year, term)?;

        let registry = if args.crns.is_empty() {
            self.crns()?
        } else {
            let mut registry = CourseRegistry::new();
            for raw in &args.crns {
                registry.add(Crn::parse(raw)?);
            }
            registry
        };

        Ok(RunPlan {
            email,
            term_code,
            registry,
        })
    }
}
