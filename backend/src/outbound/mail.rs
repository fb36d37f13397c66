//! Outbound mail adapters.
//!
//! Deployments without an SMTP relay run the logging adapter, which records
//! each message instead of dispatching it. The sign-up flow only needs the
//! success/failure signal to decide whether to keep the account.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Mail, MailError, Mailer};

/// Mailer that records messages via the tracing pipeline.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, body = %mail.body, "outbound mail");
        Ok(())
    }
}
