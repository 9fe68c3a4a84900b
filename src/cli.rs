use std::path::PathBuf;

use clap::Parser;

use crate::setup::SetupArgs;

/// Watch course sections for open seats and email when one appears.
#[derive(Debug, Parser)]
#[command(name = "seatwatch", version, about)]
pub struct Cli {
    /// Institutional email address to notify.
    #[arg(long)]
    pub email: Option<String>,

    /// School year the academic year ends in, e.g. 2025.
    #[arg(long)]
    pub year: Option<String>,

    /// Term name (Fall, Winter, Spring, Summer) or its number 1-4.
    #[arg(long)]
    pub term: Option<String>,

    /// CRN to monitor; repeat for several. Skips the CRN prompt.
    #[arg(long = "crn", value_name = "CRN")]
    pub crns: Vec<String>,

    /// JSON config file layered under environment overrides.
    /// Falls back to `SEATWATCH_CONFIG`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn setup_args(&self) -> SetupArgs {
        SetupArgs {
            email: self.email.clone(),
            year: self.year.clone(),
            term: self.term.clone(),
            crns: self.crns.clone(),
        }
    }
}
