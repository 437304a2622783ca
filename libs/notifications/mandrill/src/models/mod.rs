//! Provider-agnostic mail model.
//!
//! These types are what application code builds and receives. They carry no
//! knowledge of any provider's wire format; adapters in `provider` map them.

use crate::error::{MailError, MailResult};
use crate::templates::MailTemplate;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Address visibility of a recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecipientRole {
    To,
    Cc,
    Bcc,
}

/// Normalized delivery status of one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MailStatus {
    /// The provider took the message (sent, queued, scheduled, rejected or invalid)
    Accepted,
    /// The provider reported a status this library does not recognize
    Unknown,
}

/// One message recipient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub role: Option<RecipientRole>,
    /// Free-form per-recipient data, only really useful when tracking is on
    pub metadata: HashMap<String, String>,
}

impl Recipient {
    /// Create a recipient with an explicit role
    pub fn new(email: impl Into<String>, role: RecipientRole) -> Self {
        Self {
            email: email.into(),
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn to(email: impl Into<String>) -> Self {
        Self::new(email, RecipientRole::To)
    }

    pub fn cc(email: impl Into<String>) -> Self {
        Self::new(email, RecipientRole::Cc)
    }

    pub fn bcc(email: impl Into<String>) -> Self {
        Self::new(email, RecipientRole::Bcc)
    }

    /// A sender identity; senders need no role
    pub fn sender(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check required fields
    pub fn validate(&self) -> MailResult<()> {
        if self.email.is_empty() {
            return Err(MailError::validation("the recipient email is required"));
        }

        if self.role.is_none() {
            return Err(MailError::validation(format!(
                "the recipient type must be set for {}",
                self.email
            )));
        }

        Ok(())
    }
}

/// Binary content attached to, or inlined in, a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name; for inline images this is the Content ID (`cid:NAME`)
    pub name: String,
    pub mime_type: String,
    pub base64_content: String,
}

impl Attachment {
    /// Create from content that is already base64 encoded
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        base64_content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            base64_content: base64_content.into(),
        }
    }

    /// Create from raw bytes, encoding them as standard base64
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(name, mime_type, STANDARD.encode(bytes))
    }
}

/// Content and metadata of an email.
///
/// Tags vs metadata: the provider aggregates stats by tag, and tags are a
/// small, long-lived set (email type, region, customer type). Metadata is
/// searchable and returned in webhooks but not aggregated, and is kept for
/// a limited time (booking number, user id, language).
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub html_template: Option<MailTemplate>,
    pub text_template: Option<MailTemplate>,
    pub template_vars: HashMap<String, String>,
    /// Let the provider derive the text part from HTML even if a text template is set
    pub auto_text: bool,
    pub subject: String,
    pub from: Option<Recipient>,
    pub reply_to: Option<String>,
    pub attachments: Vec<Attachment>,
    pub images: Vec<Attachment>,
    pub mark_important: bool,
    pub tags: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl Message {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, template: MailTemplate) -> Self {
        self.html_template = Some(template);
        self
    }

    pub fn with_text(mut self, template: MailTemplate) -> Self {
        self.text_template = Some(template);
        self
    }

    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.template_vars = vars;
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.template_vars.insert(key.into(), value.into());
        self
    }

    pub fn with_from(mut self, from: Recipient) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_image(mut self, image: Attachment) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn important(mut self) -> Self {
        self.mark_important = true;
        self
    }

    /// Check required fields
    pub fn validate(&self) -> MailResult<()> {
        if self.html_template.is_none() && self.text_template.is_none() {
            return Err(MailError::validation(
                "must set an HTML or text template for message",
            ));
        }

        if self.subject.is_empty() {
            return Err(MailError::validation("must set subject for message"));
        }

        match &self.from {
            Some(from) if !from.email.is_empty() => Ok(()),
            _ => Err(MailError::validation("must set from for message")),
        }
    }
}

/// Per-call delivery options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendParams {
    /// Ask the provider to process the call in the background
    pub send_async: bool,
    /// Schedule delivery; `None` sends immediately
    pub send_at: Option<DateTime<FixedOffset>>,
    /// Dedicated IP pool; `None` uses the account default
    pub ip_pool: Option<String>,
    pub track_opens: bool,
    pub track_clicks: bool,
}

impl SendParams {
    /// Parameters suited to single-recipient sends: asynchronous, stamped
    /// with the current time, default pool and no tracking. Bulk sends
    /// usually want their own.
    pub fn single_recipient() -> Self {
        Self {
            send_async: true,
            send_at: Some(Utc::now().fixed_offset()),
            ip_pool: None,
            track_opens: false,
            track_clicks: false,
        }
    }

    pub fn scheduled(mut self, at: DateTime<FixedOffset>) -> Self {
        self.send_at = Some(at);
        self
    }

    pub fn with_ip_pool(mut self, pool: impl Into<String>) -> Self {
        self.ip_pool = Some(pool.into());
        self
    }

    pub fn with_tracking(mut self, opens: bool, clicks: bool) -> Self {
        self.track_opens = opens;
        self.track_clicks = clicks;
        self
    }
}

/// Outcome of a send for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientResponse {
    /// Provider message id
    pub id: String,
    pub email: String,
    pub status: MailStatus,
    /// Rejection reason as reported by the provider
    pub error: Option<String>,
}
