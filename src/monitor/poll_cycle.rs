use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    error::PageError,
    models::{Crn, StatusReading, TermCode},
    notify::{availability_message, Notifier},
    page::{PageLayout, PageSession},
    registry::CourseRegistry,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Read-only inputs of one poll cycle.
pub struct CycleContext<'a> {
    pub recipient: &'a str,
    pub term_code: &'a TermCode,
    pub layout: &'a PageLayout,
    pub element_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrnOutcome {
    /// No seats; the CRN stays monitored.
    Full(StatusReading),
    /// Email sent and the CRN removed from the registry.
    Notified(StatusReading),
    /// Seats open but the email failed; retried next cycle.
    NotifyFailed(StatusReading),
    /// Status element missing or the page misbehaved.
    Unreadable(String),
    /// Status text was not `current/capacity`.
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcomes: Vec<(Crn, CrnOutcome)>,
    /// True when a stop request cut the cycle short.
    pub interrupted: bool,
}

impl CycleReport {
    pub fn outcome(&self, crn: &Crn) -> Option<&CrnOutcome> {
        self.outcomes
            .iter()
            .find(|(checked, _)| checked == crn)
            .map(|(_, outcome)| outcome)
    }

    pub fn notified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, CrnOutcome::Notified(_)))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| {
                matches!(
                    outcome,
                    CrnOutcome::Unreadable(_) | CrnOutcome::Malformed(_) | CrnOutcome::NotifyFailed(_)
                )
            })
            .count()
    }
}

/// Checks every CRN currently in `registry` once.
///
/// Only the page filters can fail the whole cycle; anything that goes wrong
/// for a single CRN is recorded in the report and the next CRN is checked.
/// A stop request abandons the CRN in flight, including a pending send.
pub async fn run_cycle(
    registry: &mut CourseRegistry,
    page: &mut dyn PageSession,
    notifier: &dyn Notifier,
    ctx: &CycleContext<'_>,
    cancel: &CancellationToken,
) -> Result<CycleReport, PageError> {
    apply_filters(page, ctx).await?;

    let plan = registry.list();
    let mut outcomes = Vec::with_capacity(plan.len());
    let mut interrupted = false;

    for crn in plan {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                interrupted = true;
                break;
            }
            outcome = check(registry, page, notifier, &crn, ctx) => outcome,
        };
        outcomes.push((crn, outcome));
    }

    Ok(CycleReport {
        outcomes,
        interrupted,
    })
}

async fn check(
    registry: &mut CourseRegistry,
    page: &mut dyn PageSession,
    notifier: &dyn Notifier,
    crn: &Crn,
    ctx: &CycleContext<'_>,
) -> CrnOutcome {
    match read_status(page, crn, ctx).await {
        Ok(reading) => {
            log_info!("{crn}: {reading}");
            settle(registry, notifier, crn, reading, ctx).await
        }
        Err(outcome) => outcome,
    }
}

async fn apply_filters(page: &mut dyn PageSession, ctx: &CycleContext<'_>) -> Result<(), PageError> {
    let layout = ctx.layout;
    page.select_option(&layout.term_select_id, ctx.term_code.as_str())
        .await?;
    page.select_option(&layout.campus_select_id, &layout.campus_value)
        .await
}

async fn read_status(
    page: &mut dyn PageSession,
    crn: &Crn,
    ctx: &CycleContext<'_>,
) -> Result<StatusReading, CrnOutcome> {
    let layout = ctx.layout;
    let status_id = layout.status_id(crn);

    let text = async {
        page.set_value(&layout.crn_input_id, crn.as_str()).await?;
        page.click(&layout.search_button_id).await?;
        page.wait_for_element(&status_id, ctx.element_timeout).await?;
        page.read_text(&status_id).await
    }
    .await
    .map_err(|err| {
        log_warn!("{crn}: status unavailable: {err}");
        CrnOutcome::Unreadable(err.to_string())
    })?;

    StatusReading::parse(&text).map_err(|err| {
        log_warn!("{crn}: {err}");
        CrnOutcome::Malformed(text)
    })
}

async fn settle(
    registry: &mut CourseRegistry,
    notifier: &dyn Notifier,
    crn: &Crn,
    reading: StatusReading,
    ctx: &CycleContext<'_>,
) -> CrnOutcome {
    if !reading.has_open_seats() {
        return CrnOutcome::Full(reading);
    }

    let message = availability_message(ctx.recipient, crn, &reading);
    match notifier.send(&message).await {
        Ok(()) => {
            registry.settle(crn);
            log_info!(
                "{crn}: {} seat(s) open, notified {}",
                reading.open_seats(),
                ctx.recipient
            );
            CrnOutcome::Notified(reading)
        }
        Err(err) => {
            log_error!("{crn}: seat open but notification failed, will retry: {err}");
            CrnOutcome::NotifyFailed(reading)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{crn, FakeNotifier, FakePage};

    struct Fixture {
        term: TermCode,
        layout: PageLayout,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                term: TermCode::parse("202510").unwrap(),
                layout: PageLayout::default(),
            }
        }

        fn ctx(&self) -> CycleContext<'_> {
            CycleContext {
                recipient: "me@university.edu",
                term_code: &self.term,
                layout: &self.layout,
                element_timeout: Duration::from_secs(10),
            }
        }
    }

    fn registry(crns: &[&str]) -> CourseRegistry {
        crns.iter().map(|raw| crn(raw)).collect()
    }

    #[tokio::test]
    async fn full_section_stays_monitored() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("12345", &[Some("30/30")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["12345"]);

        let report = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            report.outcome(&crn("12345")),
            Some(&CrnOutcome::Full(StatusReading { current: 30, capacity: 30 }))
        );
        assert!(notifier.sent().is_empty());
        assert!(registry.contains(&crn("12345")));
    }

    #[tokio::test]
    async fn open_seat_notifies_and_removes() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("12345", &[Some("29/30")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["12345"]);

        let report = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.notified(), 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("1 seat(s)"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn one_bad_crn_does_not_block_the_next() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("11111", &[None]);
        page.script("22222", &[Some("5/10")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["11111", "22222"]);

        let report = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(report.outcome(&crn("11111")), Some(CrnOutcome::Unreadable(_))));
        assert!(matches!(report.outcome(&crn("22222")), Some(CrnOutcome::Notified(_))));
        assert_eq!(registry.list(), vec![crn("11111")]);
        assert_eq!(page.searched(), vec!["11111", "22222"]);
    }

    #[tokio::test]
    async fn malformed_text_is_isolated() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("11111", &[Some("Closed")]);
        page.script("22222", &[Some("10/10")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["11111", "22222"]);

        let report = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            report.outcome(&crn("11111")),
            Some(&CrnOutcome::Malformed("Closed".into()))
        );
        assert!(matches!(report.outcome(&crn("22222")), Some(CrnOutcome::Full(_))));
        assert_eq!(registry.count(), 2);
        assert_eq!(report.failures(), 1);
    }

    #[tokio::test]
    async fn failed_send_keeps_the_crn() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("12345", &[Some("29/30")]);
        let notifier = FakeNotifier::new();
        notifier.fail_attempts(&[1]);
        let mut registry = registry(&["12345"]);

        let report = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(report.outcome(&crn("12345")), Some(CrnOutcome::NotifyFailed(_))));
        assert!(registry.contains(&crn("12345")));
        assert!(notifier.sent().is_empty());
        assert_eq!(notifier.attempts(), 1);
    }

    #[tokio::test]
    async fn filters_use_term_code_and_campus() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("12345", &[Some("30/30")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["12345"]);

        run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new())
            .await
            .unwrap();

        let ops = page.ops();
        assert_eq!(ops[0], "select txt_term=202510");
        assert_eq!(ops[1], "select txt_campus=MAIN");
    }

    #[tokio::test]
    async fn filter_failure_fails_the_cycle_without_touching_registry() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.fail_filters(1);
        page.script("12345", &[Some("29/30")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["12345"]);

        let result = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &CancellationToken::new()).await;

        assert!(result.is_err());
        assert_eq!(registry.count(), 1);
        assert!(page.searched().is_empty());
    }

    #[tokio::test]
    async fn stop_request_skips_remaining_crns() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("12345", &[Some("29/30")]);
        let notifier = FakeNotifier::new();
        let mut registry = registry(&["12345"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = run_cycle(&mut registry, &mut page, &notifier, &fixture.ctx(), &cancel)
            .await
            .unwrap();

        assert!(report.interrupted);
        assert!(report.outcomes.is_empty());
        assert_eq!(registry.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_request_abandons_a_stalled_send() {
        let fixture = Fixture::new();
        let mut page = FakePage::new();
        page.script("12345", &[Some("29/30")]);
        let notifier = FakeNotifier::new();
        notifier.stall_for(Duration::from_secs(60));
        let mut registry = registry(&["12345"]);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        let started = tokio::time::Instant::now();
        let ctx = fixture.ctx();
        let (report, ()) = tokio::join!(
            run_cycle(&mut registry, &mut page, &notifier, &ctx, &cancel),
            async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                stop.cancel();
            }
        );
        let report = report.unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert!(report.interrupted);
        assert!(report.outcomes.is_empty());
        assert!(registry.contains(&crn("12345")));
        assert!(notifier.sent().is_empty());
        assert_eq!(notifier.attempts(), 1);
    }
}
