//! Mail provider seams and implementations

pub mod mandrill;
pub mod transport;

pub use mandrill::Mandrill;
pub use transport::ReqwestTransport;

use crate::error::MailResult;
use crate::models::{Message, Recipient, RecipientResponse, SendParams};
use crate::templates::MailTemplate;
use async_trait::async_trait;
use std::collections::HashMap;

/// Generic mail interface for the common ways an application sends email
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message to potentially many recipients.
    ///
    /// Returns one record per recipient reported by the provider. The list
    /// may be shorter than `recipients`, or empty; callers check the length.
    async fn bulk_mail(
        &self,
        recipients: &[Recipient],
        message: &Message,
        params: &SendParams,
    ) -> MailResult<Vec<RecipientResponse>>;

    /// Render `template` with `vars` and send it to a single recipient
    async fn template_mail(
        &self,
        to_email: &str,
        subject: &str,
        template: &MailTemplate,
        vars: &HashMap<String, String>,
    ) -> MailResult<RecipientResponse>;

    /// Send a plain text email
    async fn simple_mail(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> MailResult<RecipientResponse>;
}

/// Raw result of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport used by adapters to reach the provider.
///
/// Implementations perform exactly one request per call and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as `application/json` to `url`
    async fn post_json(&self, url: &str, body: String) -> MailResult<TransportResponse>;
}
