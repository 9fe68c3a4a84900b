use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{elements::Element, error::CmdError, Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};

use crate::{error::PageError, settings::BrowserSettings};

use super::{PageSession, PageSessionFactory};

/// Page session driven through a W3C WebDriver endpoint.
pub struct WebDriverSession {
    client: Client,
    slow_mo: Option<Duration>,
    closed: bool,
}

impl WebDriverSession {
    pub async fn connect(settings: &BrowserSettings) -> Result<Self, PageError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities(settings));
        let client = builder
            .connect(&settings.webdriver_url)
            .await
            .map_err(|err| PageError::Session(format!("{}: {err}", settings.webdriver_url)))?;

        Ok(Self {
            client,
            slow_mo: settings.slow_mo_ms.map(Duration::from_millis),
            closed: false,
        })
    }

    async fn find(&self, id: &str) -> Result<Element, PageError> {
        self.client
            .find(Locator::Id(id))
            .await
            .map_err(|err| element_error(id, err))
    }

    async fn pace(&self) {
        if let Some(delay) = self.slow_mo {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        self.client
            .goto(url)
            .await
            .map_err(|err| PageError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
        self.pace().await;
        Ok(())
    }

    async fn wait_for_element(&mut self, id: &str, timeout: Duration) -> Result<(), PageError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Id(id))
            .await
            .map(|_| ())
            .map_err(|err| match err {
                CmdError::WaitTimeout => PageError::Timeout {
                    id: id.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                },
                other => element_error(id, other),
            })
    }

    async fn read_text(&mut self, id: &str) -> Result<String, PageError> {
        let element = self.find(id).await?;
        element
            .text()
            .await
            .map_err(|err| PageError::Command(err.to_string()))
    }

    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), PageError> {
        let element = self.find(id).await?;
        element
            .clear()
            .await
            .map_err(|err| PageError::Command(err.to_string()))?;
        element
            .send_keys(value)
            .await
            .map_err(|err| PageError::Command(err.to_string()))?;
        self.pace().await;
        Ok(())
    }

    async fn select_option(&mut self, id: &str, value: &str) -> Result<(), PageError> {
        let element = self.find(id).await?;
        element
            .select_by_value(value)
            .await
            .map_err(|err| PageError::Command(err.to_string()))?;
        self.pace().await;
        Ok(())
    }

    async fn click(&mut self, id: &str) -> Result<(), PageError> {
        let element = self.find(id).await?;
        element
            .click()
            .await
            .map_err(|err| PageError::Command(err.to_string()))?;
        self.pace().await;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PageError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client
            .clone()
            .close()
            .await
            .map_err(|err| PageError::Command(err.to_string()))
    }
}

/// Opens a fresh [`WebDriverSession`] per call.
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    settings: BrowserSettings,
}

impl WebDriverFactory {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PageSessionFactory for WebDriverFactory {
    async fn open(&self) -> Result<Box<dyn PageSession>, PageError> {
        let session = WebDriverSession::connect(&self.settings).await?;
        Ok(Box::new(session))
    }
}

fn element_error(id: &str, err: CmdError) -> PageError {
    if err.is_no_such_element() {
        PageError::MissingElement(id.to_string())
    } else {
        PageError::Command(err.to_string())
    }
}

fn capabilities(settings: &BrowserSettings) -> Map<String, Value> {
    let mut args = vec!["--disable-gpu".to_string()];
    if settings.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
    if settings.headless {
        caps.insert("moz:firefoxOptions".into(), json!({ "args": ["-headless"] }));
    }
    caps
}
