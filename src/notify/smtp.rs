use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{error::NotifyError, settings::MailSettings};

use super::{Notification, Notifier};

/// Delivers notifications through the institution's SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(settings: &MailSettings) -> Result<Self, NotifyError> {
        let mut builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|err| NotifyError::Transport(err.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };
        builder = builder.port(settings.port);

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = build_message(notification)?;
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| NotifyError::Transport(err.to_string()))
    }
}

fn build_message(notification: &Notification) -> Result<Message, NotifyError> {
    let mailbox: Mailbox = notification
        .to
        .parse()
        .map_err(|err: lettre::address::AddressError| NotifyError::Address {
            address: notification.to.clone(),
            reason: err.to_string(),
        })?;

    Message::builder()
        .from(mailbox.clone())
        .to(mailbox)
        .subject(notification.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())
        .map_err(|err| NotifyError::Build(err.to_string()))
}
