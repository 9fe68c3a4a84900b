pub mod cli;
pub mod connectivity;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod page;
pub mod registry;
pub mod settings;
pub mod setup;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use cli::Cli;
use connectivity::{ConnectivityProbe, DnsProbe};
use error::SetupError;
use monitor::MonitorLoop;
use notify::SmtpNotifier;
use page::WebDriverFactory;
use settings::MonitorConfig;
use setup::Prompter;

/// Exit code for setup failures: bad input or no campus network.
const SETUP_FAILURE: u8 = 1;

/// Binary entry point: setup, then the monitor loop until done or Ctrl-C.
pub fn run(cli: Cli) -> ExitCode {
    utils::init_logging();
    log::info!("seatwatch starting up...");

    match run_inner(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            if let Some(setup) = err.downcast_ref::<SetupError>() {
                eprintln!("{setup}");
            } else {
                eprintln!("error: {err:#}");
            }
            ExitCode::from(SETUP_FAILURE)
        }
    }
}

fn run_inner(cli: Cli) -> Result<u8> {
    let config = MonitorConfig::load(cli.config.as_deref())?;
    log::debug!("loaded config: {config:?}");

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let plan = prompter.collect(&cli.setup_args(), &config.institution.email_domain)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let probe = DnsProbe::from_settings(&config.probe);
        if !probe.is_reachable().await {
            return Err(anyhow::Error::new(SetupError::NoConnectivity {
                host: probe.host().to_string(),
            }));
        }

        let notifier = SmtpNotifier::new(&config.mail).context("failed to configure mail relay")?;
        let pages = WebDriverFactory::new(config.browser.clone());

        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("stop requested; shutting down");
                stop.cancel();
            }
        });

        log::info!(
            "watching {} CRN(s) for term {}",
            plan.registry.count(),
            plan.term_code
        );
        let report = MonitorLoop::new(
            config,
            plan,
            Box::new(probe),
            Box::new(notifier),
            Box::new(pages),
            cancel,
        )
        .run()
        .await;

        log::info!(
            "monitor finished: {:?} after {} cycle(s), {} CRN(s) left",
            report.outcome,
            report.cycles_run,
            report.registry.count()
        );
        Ok::<u8, anyhow::Error>(report.outcome.exit_code())
    })
}
