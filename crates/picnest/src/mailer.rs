//! Outgoing emails.
use picnest_core::{BoxFuture, error::Error, extension::TomlTableExt};
use std::sync::{Arc, Mutex};
use toml::Table;

/// An email message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MailMessage {
    /// Sender address.
    pub(crate) from: String,
    /// Recipient address.
    pub(crate) to: String,
    /// Subject.
    pub(crate) subject: String,
    /// Plain text body.
    pub(crate) body: String,
}

/// Delivery of email messages.
pub(crate) trait Mailer: Send + Sync {
    /// Sends the message.
    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<(), Error>>;
}

/// Templates of the account emails.
#[derive(Debug, Clone)]
pub(crate) struct MailTemplate {
    /// Sender address.
    sender: String,
    /// Base URL of the API used in links.
    base_url: String,
}

impl MailTemplate {
    /// Creates a new instance with the `[mail]` config.
    pub(crate) fn with_config(config: Option<&Table>) -> Self {
        let sender = config
            .and_then(|config| config.get_str("sender"))
            .unwrap_or("noreply@picnest.local");
        let base_url = config
            .and_then(|config| config.get_str("base-url"))
            .unwrap_or("http://localhost:6080/api/v1");
        Self {
            sender: sender.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Builds the email confirmation message with the token.
    pub(crate) fn confirmation(&self, to: &str, username: &str, token: &str) -> MailMessage {
        let link = format!("{}/auth/confirmed_email/{token}", self.base_url);
        MailMessage {
            from: self.sender.clone(),
            to: to.to_owned(),
            subject: "Confirm your email".to_owned(),
            body: format!(
                "Hi {username},\n\nplease confirm your email address by opening the link:\n{link}\n"
            ),
        }
    }
}

/// A mailer which writes the messages to the tracing logs.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogMailer;

impl Mailer for LogMailer {
    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            tracing::info!(
                from = %message.from,
                to = %message.to,
                subject = %message.subject,
                "{}",
                message.body
            );
            Ok(())
        })
    }
}

/// A mailer which keeps the messages in memory.
#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryMailer {
    /// Sent messages.
    messages: Arc<Mutex<Vec<MailMessage>>>,
}

impl MemoryMailer {
    /// Returns the messages sent so far.
    #[cfg(test)]
    pub(crate) fn sent_messages(&self) -> Vec<MailMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl Mailer for MemoryMailer {
    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            self.messages
                .lock()
                .map_err(|err| Error::new(format!("fail to lock the mailbox: {err}")))?
                .push(message.clone());
            Ok(())
        })
    }
}

/// Creates the mailer selected by the `backend` field of the `[mail]` config.
pub(crate) fn with_config(config: Option<&Table>) -> Result<Arc<dyn Mailer>, Error> {
    let backend = config
        .and_then(|config| config.get_str("backend"))
        .unwrap_or("log");
    match backend {
        "log" => Ok(Arc::new(LogMailer)),
        "memory" => Ok(Arc::new(MemoryMailer::default())),
        _ => picnest_core::bail!("mail backend `{backend}` is not supported"),
    }
}
