use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{monitor::RetryPolicy, page::PageLayout};

pub const CONFIG_PATH_ENV: &str = "SEATWATCH_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeSettings {
    /// Internal host that only resolves on the campus network.
    pub host: String,
    pub timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            host: "banner.university.edu".into(),
            timeout_ms: 3_000,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub starttls: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: "smtp.university.edu".into(),
            port: 25,
            username: None,
            password: None,
            starttls: false,
        }
    }
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("starttls", &self.starttls)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    /// Pause inserted after every page interaction.
    pub slow_mo_ms: Option<u64>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".into(),
            headless: true,
            slow_mo_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstitutionSettings {
    /// Suffix every user address must carry, including the `@`.
    pub email_domain: String,
}

impl Default for InstitutionSettings {
    fn default() -> Self {
        Self {
            email_domain: "@university.edu".into(),
        }
    }
}

/// Run-wide configuration. Read once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    pub cadence_ms: u64,
    pub connectivity_backoff_ms: u64,
    pub element_timeout_ms: u64,
    pub navigation: RetryPolicy,
    pub probe: ProbeSettings,
    pub mail: MailSettings,
    pub browser: BrowserSettings,
    pub institution: InstitutionSettings,
    pub page: PageLayout,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            cadence_ms: 120_000,
            connectivity_backoff_ms: 300_000,
            element_timeout_ms: 10_000,
            navigation: RetryPolicy::default(),
            probe: ProbeSettings::default(),
            mail: MailSettings::default(),
            browser: BrowserSettings::default(),
            institution: InstitutionSettings::default(),
            page: PageLayout::default(),
        }
    }
}

impl MonitorConfig {
    /// Defaults, then the optional JSON file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config in {}", path.display()))
    }

    /// Overlay environment overrides. `lookup` stands in for `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SEATWATCH_CADENCE_MS") {
            self.cadence_ms = parse_env("SEATWATCH_CADENCE_MS", &v)?;
        }
        if let Some(v) = lookup("SEATWATCH_BACKOFF_MS") {
            self.connectivity_backoff_ms = parse_env("SEATWATCH_BACKOFF_MS", &v)?;
        }
        if let Some(v) = lookup("SEATWATCH_NAV_ATTEMPTS") {
            self.navigation.attempts = parse_env("SEATWATCH_NAV_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("SEATWATCH_NAV_DELAY_MS") {
            self.navigation.delay_ms = parse_env("SEATWATCH_NAV_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("SEATWATCH_ELEMENT_TIMEOUT_MS") {
            self.element_timeout_ms = parse_env("SEATWATCH_ELEMENT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SEATWATCH_PROBE_HOST") {
            self.probe.host = v;
        }
        if let Some(v) = lookup("SMTP_HOST") {
            self.mail.host = v;
        }
        if let Some(v) = lookup("SMTP_PORT") {
            self.mail.port = parse_env("SMTP_PORT", &v)?;
        }
        if let Some(v) = lookup("SMTP_USERNAME") {
            self.mail.username = Some(v);
        }
        if let Some(v) = lookup("SMTP_PASSWORD") {
            self.mail.password = Some(v);
        }
        if let Some(v) = lookup("SMTP_STARTTLS") {
            self.mail.starttls = parse_flag("SMTP_STARTTLS", &v)?;
        }
        if let Some(v) = lookup("WEBDRIVER_URL") {
            self.browser.webdriver_url = v;
        }
        if let Some(v) = lookup("SEATWATCH_HEADLESS") {
            self.browser.headless = parse_flag("SEATWATCH_HEADLESS", &v)?;
        }
        if let Some(v) = lookup("SEATWATCH_SLOW_MO_MS") {
            self.browser.slow_mo_ms = Some(parse_env("SEATWATCH_SLOW_MO_MS", &v)?);
        }
        if let Some(v) = lookup("SEATWATCH_EMAIL_DOMAIN") {
            self.institution.email_domain = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cadence_ms == 0 {
            bail!("cadence must be greater than zero");
        }
        if self.connectivity_backoff_ms == 0 {
            bail!("connectivity backoff must be greater than zero");
        }
        if self.navigation.attempts == 0 {
            bail!("navigation attempts must be at least 1");
        }
        if !self.institution.email_domain.starts_with('@') {
            bail!(
                "institution email domain '{}' must start with '@'",
                self.institution.email_domain
            );
        }
        Ok(())
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    pub fn connectivity_backoff(&self) -> Duration {
        Duration::from_millis(self.connectivity_backoff_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} has invalid value '{value}'"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} has invalid boolean '{value}'"),
    }
}
