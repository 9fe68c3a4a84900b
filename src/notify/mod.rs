pub mod message;
pub mod smtp;

use async_trait::async_trait;

use crate::error::NotifyError;

pub use message::{availability_message, confirmation_message};
pub use smtp::SmtpNotifier;

/// One outbound email. The sender is always the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Sends a single message through the mail relay.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
