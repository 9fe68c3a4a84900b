use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    connectivity::ConnectivityProbe,
    models::{RunPlan, SessionState},
    notify::{confirmation_message, Notifier},
    page::{PageSession, PageSessionFactory},
    registry::CourseRegistry,
    settings::MonitorConfig,
};

use super::{
    poll_cycle::{run_cycle, CycleContext},
    retry::{navigate_with_retry, Navigation},
    MonitorOutcome, MonitorPhase, MonitorReport,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Drives poll cycles until every CRN is satisfied or a stop is requested.
pub struct MonitorLoop {
    config: MonitorConfig,
    email: String,
    registry: CourseRegistry,
    session: SessionState,
    probe: Box<dyn ConnectivityProbe>,
    notifier: Box<dyn Notifier>,
    pages: Box<dyn PageSessionFactory>,
    cancel: CancellationToken,
    phase: MonitorPhase,
    cycles_run: u32,
}

impl MonitorLoop {
    pub fn new(
        config: MonitorConfig,
        plan: RunPlan,
        probe: Box<dyn ConnectivityProbe>,
        notifier: Box<dyn Notifier>,
        pages: Box<dyn PageSessionFactory>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            email: plan.email,
            registry: plan.registry,
            session: SessionState::new(plan.term_code),
            probe,
            notifier,
            pages,
            cancel,
            phase: MonitorPhase::Init,
            cycles_run: 0,
        }
    }

    /// Runs to a terminal phase. The page session, once opened, is closed
    /// exactly once on every path out of here.
    pub async fn run(mut self) -> MonitorReport {
        let outcome = match self.open_page().await {
            Ok(mut page) => {
                let outcome = self.drive(page.as_mut()).await;
                if let Err(err) = page.close().await {
                    log_warn!("failed to close page session: {err}");
                }
                outcome
            }
            Err(outcome) => outcome,
        };

        let terminal = match &outcome {
            MonitorOutcome::Completed => MonitorPhase::Done,
            MonitorOutcome::Stopped | MonitorOutcome::Aborted(_) => MonitorPhase::Aborted,
        };
        self.enter(terminal);

        MonitorReport {
            outcome,
            phase: self.phase,
            registry: self.registry,
            session: self.session,
            cycles_run: self.cycles_run,
        }
    }

    async fn open_page(&mut self) -> Result<Box<dyn PageSession>, MonitorOutcome> {
        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(MonitorOutcome::Stopped),
            opened = self.pages.open() => opened,
        };

        opened.map_err(|err| {
            log_error!("cannot start monitoring: {err}");
            MonitorOutcome::Aborted(err.to_string())
        })
    }

    async fn drive(&mut self, page: &mut dyn PageSession) -> MonitorOutcome {
        if self.cancel.is_cancelled() {
            return MonitorOutcome::Stopped;
        }

        self.enter(MonitorPhase::Confirming);
        self.send_confirmation().await;

        loop {
            if self.cancel.is_cancelled() {
                return MonitorOutcome::Stopped;
            }
            if self.registry.is_empty() {
                return MonitorOutcome::Completed;
            }

            self.enter(MonitorPhase::Polling);
            if !self.await_connectivity().await {
                return MonitorOutcome::Stopped;
            }

            let url = self.config.page.url.clone();
            match navigate_with_retry(page, &url, &self.config.navigation, &self.cancel).await {
                Navigation::Loaded { .. } => self.poll_once(page).await,
                Navigation::Exhausted(err) => {
                    log_warn!(
                        "giving up on this cycle after {} navigation attempt(s): {err}",
                        self.config.navigation.attempts
                    );
                }
                Navigation::Cancelled => return MonitorOutcome::Stopped,
            }

            if self.cancel.is_cancelled() {
                return MonitorOutcome::Stopped;
            }
            if self.registry.is_empty() {
                log_info!("all monitored courses have open seats; done");
                return MonitorOutcome::Completed;
            }

            self.enter(MonitorPhase::Sleeping);
            log_info!(
                "{} CRN(s) still watched; next check in {:?}",
                self.registry.count(),
                self.config.cadence()
            );
            if !self.sleep(self.config.cadence()).await {
                return MonitorOutcome::Stopped;
            }
        }
    }

    async fn send_confirmation(&mut self) {
        if self.session.confirmation_sent {
            return;
        }

        let message = confirmation_message(
            &self.email,
            &self.registry.list(),
            &self.session.term_code,
            self.config.cadence(),
            self.session.started_at,
        );
        match self.notifier.send(&message).await {
            Ok(()) => {
                self.session.confirmation_sent = true;
                log_info!("confirmation sent to {}", self.email);
            }
            Err(err) => log_warn!("confirmation email failed, monitoring anyway: {err}"),
        }
    }

    /// Re-checks forever with the long back-off. `false` means stop requested.
    async fn await_connectivity(&mut self) -> bool {
        loop {
            let reachable = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return false,
                reachable = self.probe.is_reachable() => reachable,
            };
            if reachable {
                return true;
            }

            log_warn!(
                "monitoring network unreachable; retrying in {:?}",
                self.config.connectivity_backoff()
            );
            if !self.sleep(self.config.connectivity_backoff()).await {
                return false;
            }
        }
    }

    async fn poll_once(&mut self, page: &mut dyn PageSession) {
        self.cycles_run += 1;
        let ctx = CycleContext {
            recipient: &self.email,
            term_code: &self.session.term_code,
            layout: &self.config.page,
            element_timeout: self.config.element_timeout(),
        };

        let result = run_cycle(
            &mut self.registry,
            page,
            self.notifier.as_ref(),
            &ctx,
            &self.cancel,
        )
        .await;

        match result {
            Ok(report) if report.interrupted => {
                log_info!(
                    "cycle {} stopped after {} CRN(s)",
                    self.cycles_run,
                    report.outcomes.len()
                );
            }
            Ok(report) => {
                log_info!(
                    "cycle {} checked {} CRN(s): {} notified, {} failed, {} still watched",
                    self.cycles_run,
                    report.outcomes.len(),
                    report.notified(),
                    report.failures(),
                    self.registry.count()
                );
            }
            Err(err) => {
                log_warn!("cycle {} failed before checking CRNs: {err}", self.cycles_run);
            }
        }
    }

    async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn enter(&mut self, next: MonitorPhase) {
        if self.phase != next {
            log_info!("monitor {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }
}
