//! SMTP delivery of verification codes.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{NotifyError, Notifier, VerificationCode};
use pledge_types::Email;

/// Default message subject.
const DEFAULT_SUBJECT: &str = "Your pledge verification code";

/// Connection settings for the outbound mail relay.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    /// Relay host, e.g. `smtp.gmail.com`. Implicit TLS on port 465.
    pub relay: String,
    pub username: String,
    pub password: String,
    /// From mailbox, e.g. `Pledge <signup@example.org>`.
    pub from_address: String,
    pub subject: String,
}

impl SmtpConfig {
    pub fn new(relay: &str, username: &str, password: &str, from_address: &str) -> Self {
        Self {
            relay: relay.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            from_address: from_address.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// Notifier delivering codes through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    subject: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.relay)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        let from = config
            .from_address
            .parse()
            .map_err(|e| NotifyError::Transport(format!("invalid from address: {e}")))?;
        Ok(Self {
            transport,
            from,
            subject: config.subject.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_code(&self, to: &Email, code: VerificationCode) -> Result<(), NotifyError> {
        let to: Mailbox = to
            .as_str()
            .parse()
            .map_err(|e| NotifyError::Message(format!("invalid recipient: {e}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(format!("Your pledge verification code is: {code}"))
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(())
    }
}
