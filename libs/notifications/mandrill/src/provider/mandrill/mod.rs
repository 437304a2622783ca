//! Mandrill (Mailchimp Transactional) adapter
//!
//! Maps the generic mail model onto `messages/send.json` and normalizes the
//! per-recipient status records that come back. Each send is one HTTP POST;
//! failures are returned as-is, never retried.

mod mapping;
mod wire;

use super::{Mailer, ReqwestTransport, Transport, TransportResponse};
use crate::config::MandrillConfig;
use crate::error::{MailError, MailResult};
use crate::models::{Message, Recipient, RecipientResponse, SendParams};
use crate::templates::{MailTemplate, TemplateKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, instrument, trace, Level};
use wire::{MandrillErrorResponse, MandrillParams, MandrillRecipientResponse};

/// Mandrill API root
pub const MANDRILL_BASE_URL: &str = "https://mandrillapp.com/api/1.0";

/// Path of the send endpoint, relative to the API root
pub const MANDRILL_MESSAGE_PATH: &str = "/messages/send.json";

/// Mandrill adapter.
///
/// Holds only immutable configuration, so it can be shared across tasks as
/// long as the transport can.
pub struct Mandrill<T: Transport = ReqwestTransport> {
    key: String,
    domain: String,
    default_sender: Recipient,
    base_url: String,
    transport: Arc<T>,
}

impl<T: Transport> Mandrill<T> {
    /// Create an adapter. No network activity happens here.
    pub fn new(
        api_key: impl Into<String>,
        domain: impl Into<String>,
        sender: Recipient,
        transport: T,
    ) -> MailResult<Self> {
        let key = api_key.into();
        let domain = domain.into();

        if key.is_empty() {
            return Err(MailError::Config("API key is required".to_string()));
        }

        if domain.is_empty() {
            return Err(MailError::Config("domain is required".to_string()));
        }

        if sender.email.is_empty() {
            return Err(MailError::Config("sender is required".to_string()));
        }

        Ok(Self {
            key,
            domain,
            default_sender: sender,
            base_url: MANDRILL_BASE_URL.to_string(),
            transport: Arc::new(transport),
        })
    }

    pub fn from_config(config: MandrillConfig, transport: T) -> MailResult<Self> {
        Ok(Self::new(config.api_key, config.domain, config.sender, transport)?
            .with_base_url(config.base_url))
    }

    /// Point the adapter at another API root (regional host, local fake)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn default_sender(&self) -> &Recipient {
        &self.default_sender
    }

    /// Full URL of the send endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, MANDRILL_MESSAGE_PATH)
    }

    /// Submit the request and normalize the per-recipient results
    async fn send(&self, params: &MandrillParams) -> MailResult<Vec<RecipientResponse>> {
        let payload =
            serde_json::to_string(params).map_err(|e| MailError::Serialization(e.to_string()))?;

        debug!(
            recipients = params.message.to.len(),
            subject = %params.message.subject,
            send_async = params.send_async,
            send_at = params.send_at.as_deref().unwrap_or(""),
            "Sending email via Mandrill"
        );

        if tracing::enabled!(Level::TRACE) {
            if let Ok(message) = serde_json::to_string(&params.message) {
                trace!(%message, "Mandrill message payload");
            }
        }

        let response = self.transport.post_json(&self.endpoint(), payload).await?;

        if !response.is_success() {
            return Err(self.api_error(&response, params));
        }

        let records: Vec<MandrillRecipientResponse> = serde_json::from_slice(&response.body)
            .map_err(|e| MailError::Decode(e.to_string()))?;

        debug!(records = records.len(), "Mandrill accepted request");

        Ok(mapping::normalize_responses(records))
    }

    /// Build a descriptive error from a non-2xx reply
    fn api_error(&self, response: &TransportResponse, params: &MandrillParams) -> MailError {
        let body: MandrillErrorResponse = match serde_json::from_slice(&response.body) {
            Ok(body) => body,
            Err(e) => {
                error!(status = response.status, error = %e, "Undecodable Mandrill error response");
                return MailError::Decode(format!("HTTP {}: {}", response.status, e));
            }
        };

        error!(
            status = response.status,
            code = body.code,
            name = %body.name,
            message = %body.message,
            "Mandrill API error"
        );

        MailError::Provider {
            status: body.status,
            code: body.code,
            name: body.name,
            message: body.message,
            recipients: params.message.to.len(),
            first_recipient: params
                .message
                .to
                .first()
                .map(|r| r.email.clone())
                .unwrap_or_default(),
        }
    }
}

impl Mandrill<ReqwestTransport> {
    /// Build an adapter from `MANDRILL_*` environment variables with a default HTTP client
    pub fn from_env() -> MailResult<Self> {
        Self::from_config(MandrillConfig::from_env()?, ReqwestTransport::new())
    }
}

impl<T: Transport> Clone for Mandrill<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            domain: self.domain.clone(),
            default_sender: self.default_sender.clone(),
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> fmt::Debug for Mandrill<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mandrill")
            .field("domain", &self.domain)
            .field("default_sender", &self.default_sender.email)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Transport> Mailer for Mandrill<T> {
    #[instrument(skip_all, fields(recipients = recipients.len()))]
    async fn bulk_mail(
        &self,
        recipients: &[Recipient],
        message: &Message,
        params: &SendParams,
    ) -> MailResult<Vec<RecipientResponse>> {
        if recipients.is_empty() {
            return Err(MailError::validation(
                "BulkMail: must specify at least one recipient",
            ));
        }

        for recipient in recipients {
            recipient.validate()?;
        }
        message.validate()?;

        let mut msg = mapping::build_message(recipients, message, &self.domain, &self.default_sender)?;
        msg.track_opens = params.track_opens;
        msg.track_clicks = params.track_clicks;

        let mandrill_params = mapping::build_params(&self.key, params, msg);
        mandrill_params.validate()?;

        self.send(&mandrill_params).await
    }

    #[instrument(skip_all, fields(to = %to_email, template = template.name()))]
    async fn template_mail(
        &self,
        to_email: &str,
        subject: &str,
        template: &MailTemplate,
        vars: &HashMap<String, String>,
    ) -> MailResult<RecipientResponse> {
        let to_email = to_email.trim();
        if to_email.is_empty() {
            return Err(MailError::validation(
                "TemplateMail: must specify destination email address",
            ));
        }
        if template.is_blank() {
            return Err(MailError::validation("TemplateMail: must specify template"));
        }

        let recipients = [Recipient::to(to_email)];
        let mut message = Message::new(subject).with_vars(vars.clone());
        match template.kind() {
            TemplateKind::Html => message.html_template = Some(template.clone()),
            TemplateKind::Text => message.text_template = Some(template.clone()),
        }

        let params = SendParams::single_recipient();
        let mut msg = mapping::build_message(&recipients, &message, &self.domain, &self.default_sender)?;
        msg.track_opens = params.track_opens;
        msg.track_clicks = params.track_clicks;

        let mandrill_params = mapping::build_params(&self.key, &params, msg);
        mandrill_params.validate()?;

        self.send(&mandrill_params)
            .await?
            .into_iter()
            .next()
            .ok_or(MailError::EmptyResponse("TemplateMail"))
    }

    #[instrument(skip_all, fields(to = %to.trim()))]
    async fn simple_mail(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> MailResult<RecipientResponse> {
        let from = from.trim();
        let to = to.trim();
        let subject = subject.trim();

        if from.is_empty() {
            return Err(MailError::validation(
                "SimpleMail: must specify source email address",
            ));
        }
        if to.is_empty() {
            return Err(MailError::validation(
                "SimpleMail: must specify destination email address",
            ));
        }
        if subject.is_empty() {
            return Err(MailError::validation("SimpleMail: must specify subject"));
        }

        let msg = mapping::simple_message(&self.domain, from, to, subject, body);
        let mandrill_params = mapping::build_params(&self.key, &SendParams::default(), msg);

        self.send(&mandrill_params)
            .await?
            .into_iter()
            .next()
            .ok_or(MailError::EmptyResponse("SimpleMail"))
    }
}
