//! Port abstraction for outbound mail.
//!
//! Mail transport is an external collaborator; the domain only needs
//! "dispatch this message or tell me it failed" so sign-up can compensate.

use async_trait::async_trait;

/// An outbound message.
#[derive(Debug, Clone)]
pub struct Mail {
    pub subject: String,
    pub to: String,
    pub body: String,
}

/// Dispatch failures; recovered locally by compensating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    #[error("mail dispatch failed: {message}")]
    Dispatch { message: String },
}

impl MailError {
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> Result<(), MailError>;
}
