//! Browser capabilities the monitor relies on.
//!
//! The poll cycle never looks at page structure directly. It only calls the
//! named capabilities below with element ids taken from [`PageLayout`].

pub mod layout;
pub mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PageError;

pub use layout::PageLayout;
pub use webdriver::{WebDriverFactory, WebDriverSession};

#[async_trait]
pub trait PageSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError>;

    /// Resolves once the element exists or fails with [`PageError::Timeout`].
    async fn wait_for_element(&mut self, id: &str, timeout: Duration) -> Result<(), PageError>;

    async fn read_text(&mut self, id: &str) -> Result<String, PageError>;

    /// Clears the field, then types `value`.
    async fn set_value(&mut self, id: &str, value: &str) -> Result<(), PageError>;

    /// Picks the `<option>` whose value attribute is `value`.
    async fn select_option(&mut self, id: &str, value: &str) -> Result<(), PageError>;

    async fn click(&mut self, id: &str) -> Result<(), PageError>;

    async fn close(&mut self) -> Result<(), PageError>;
}

/// Opens the single page session a monitor run uses.
#[async_trait]
pub trait PageSessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSession>, PageError>;
}
