//! In-memory stand-ins for the probe, notifier and browser used by tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    connectivity::ConnectivityProbe,
    error::{NotifyError, PageError},
    models::Crn,
    notify::{Notification, Notifier},
    page::{PageLayout, PageSession, PageSessionFactory},
};

pub fn crn(raw: &str) -> Crn {
    Crn::parse(raw).unwrap()
}

/// Replays scripted answers, repeating the last one forever.
#[derive(Clone, Default)]
pub struct FakeProbe {
    answers: Arc<Mutex<VecDeque<bool>>>,
    checks: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.iter().copied().collect())),
            checks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always(reachable: bool) -> Self {
        Self::new(&[reachable])
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for FakeProbe {
    async fn is_reachable(&self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.pop_front().unwrap_or(true)
        } else {
            answers.front().copied().unwrap_or(true)
        }
    }
}

/// Records every delivered message; fails the attempts it is told to.
#[derive(Clone, Default)]
pub struct FakeNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    /// 1-based attempt numbers that should fail.
    failing: Arc<Mutex<Vec<usize>>>,
    attempts: Arc<AtomicUsize>,
    stall: Arc<Mutex<Option<Duration>>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_attempts(&self, attempts: &[usize]) {
        self.failing.lock().unwrap().extend_from_slice(attempts);
    }

    /// Every send waits this long before completing.
    pub fn stall_for(&self, delay: Duration) {
        *self.stall.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let stall = *self.stall.lock().unwrap();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&attempt) {
            return Err(NotifyError::Transport("relay unavailable".into()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Default)]
struct PageState {
    /// Status texts per element id; `None` means the element never shows up.
    statuses: HashMap<String, VecDeque<Option<String>>>,
    navigation_failures: usize,
    filter_failures: usize,
    navigations: usize,
    closes: usize,
    ops: Vec<String>,
}

impl PageState {
    fn next_status(&mut self, id: &str) -> Option<Option<String>> {
        let queue = self.statuses.get_mut(id)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn peek_status(&self, id: &str) -> Option<&Option<String>> {
        self.statuses.get(id).and_then(|queue| queue.front())
    }
}

/// Scripted browser. Clones share state so tests can inspect a page the
/// monitor owns.
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
    layout: PageLayout,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script successive status readings for `crn`; `None` is a missing element.
    pub fn script(&self, crn: &str, statuses: &[Option<&str>]) {
        let id = self.layout.status_id(&Crn::parse(crn).unwrap());
        let queue = statuses.iter().map(|s| s.map(str::to_string)).collect();
        self.state.lock().unwrap().statuses.insert(id, queue);
    }

    pub fn fail_navigations(&self, n: usize) {
        self.state.lock().unwrap().navigation_failures = n;
    }

    pub fn fail_filters(&self, n: usize) {
        self.state.lock().unwrap().filter_failures = n;
    }

    pub fn navigations(&self) -> usize {
        self.state.lock().unwrap().navigations
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    /// CRNs typed into the search box, in order.
    pub fn searched(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .ops
            .iter()
            .filter_map(|op| op.strip_prefix("search ").map(str::to_string))
            .collect()
    }

    pub fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.navigations += 1;
        state.ops.push(format!("navigate {url}"));
        if state.navigation_failures > 0 {
            state.navigation_failures -= 1;
            return Err(PageError::Navigation {
                url: url.to_string(),
                reason: "connection reset".into(),
            });
        }
        Ok(())
    }

    async fn wait_for_element(&mut self, id: &str, timeout: Duration) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("wait {id}"));
        let scripted = state.peek_status(id).cloned();
        match scripted {
            Some(Some(_)) => Ok(()),
            Some(None) => {
                state.next_status(id);
                Err(PageError::Timeout {
                    id: id.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            None => Err(PageError::Timeout {
                id: id.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn read_text(&mut self, id: &str) -> Result<String, PageError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("read {id}"));
        state
            .next_status(id)
            .flatten()
            .ok_or_else(|| PageError::MissingElement(id.to_string()))
    }

    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        if id == self.layout.crn_input_id {
            state.ops.push(format!("search {value}"));
        } else {
            state.ops.push(format!("set {id}={value}"));
        }
        Ok(())
    }

    async fn select_option(&mut self, id: &str, value: &str) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("select {id}={value}"));
        if state.filter_failures > 0 {
            state.filter_failures -= 1;
            return Err(PageError::MissingElement(id.to_string()));
        }
        Ok(())
    }

    async fn click(&mut self, id: &str) -> Result<(), PageError> {
        self.state.lock().unwrap().ops.push(format!("click {id}"));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PageError> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Hands out clones of one [`FakePage`], or fails to open.
#[derive(Clone, Default)]
pub struct FakePageFactory {
    page: FakePage,
    broken: bool,
    opens: Arc<AtomicUsize>,
}

impl FakePageFactory {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            broken: false,
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSessionFactory for FakePageFactory {
    async fn open(&self) -> Result<Box<dyn PageSession>, PageError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(PageError::Session("webdriver refused connection".into()));
        }
        Ok(Box::new(self.page.clone()))
    }
}
