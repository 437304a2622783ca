//! Mandrill JSON request and response shapes.
//!
//! See https://mailchimp.com/developer/transactional/api/messages/send-new-message/
//! Nothing here is exported from the crate; `mapping` converts to and from
//! the generic model.

use crate::error::{MailError, MailResult};
use crate::models::RecipientRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level body of `POST /messages/send.json`
#[derive(Debug, Serialize)]
pub(crate) struct MandrillParams {
    pub key: String,
    pub message: MandrillMessage,
    #[serde(rename = "async")]
    pub send_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_pool: Option<String>,
    /// UTC, formatted `YYYY-MM-DD HH:MM:SS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_at: Option<String>,
}

impl MandrillParams {
    /// Check that the request can identify the account and carries a sendable message
    pub fn validate(&self) -> MailResult<()> {
        if self.key.is_empty() {
            return Err(MailError::validation(
                "the API key identifies this transaction and must be set",
            ));
        }

        self.message.validate()
    }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct MandrillMessage {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub html: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    pub subject: String,
    pub from_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from_name: String,
    pub to: Vec<MandrillRecipient>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(rename = "important")]
    pub mark_important: bool,
    pub track_opens: bool,
    pub track_clicks: bool,
    pub auto_text: bool,
    pub auto_html: bool,
    pub inline_css: bool,
    #[serde(rename = "url_strip_qs")]
    pub strip_query_string: bool,
    pub preserve_recipients: bool,
    pub view_content_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc_address: Option<String>,
    pub tracking_domain: String,
    pub signing_domain: String,
    pub return_path_domain: String,
    pub merge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_language: Option<String>,
    // Bodies are rendered locally, so Mandrill merge tags stay unused.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_merge_vars: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merge_vars: Vec<serde_json::Value>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub google_analytics_domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics_campaign: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_metadata: Option<Vec<MandrillRecipientMetadata>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<MandrillAttachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<MandrillAttachment>>,
}

impl MandrillMessage {
    pub fn validate(&self) -> MailResult<()> {
        if self.html.is_empty() && self.text.is_empty() {
            return Err(MailError::validation("must set html or text for message"));
        }

        if self.subject.is_empty() {
            return Err(MailError::validation("must set subject for message"));
        }

        if self.from_email.is_empty() {
            return Err(MailError::validation("must set from_email for message"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MandrillRecipient {
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub role: RecipientRole,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MandrillRecipientMetadata {
    pub rcpt: String,
    pub values: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct MandrillAttachment {
    #[serde(rename = "type")]
    pub mime_type: String,
    /// For images this is the Content ID: `<img src="cid:NAME">`
    pub name: String,
    #[serde(rename = "content")]
    pub base64_content: String,
}

/// Delivery status as Mandrill reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ProviderStatus {
    Sent,
    Queued,
    Scheduled,
    Rejected,
    Invalid,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One element of the success response array
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MandrillRecipientResponse {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub status: ProviderStatus,
    #[serde(default)]
    pub reject_reason: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: String,
}

/// Body of a failed call
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MandrillErrorResponse {
    #[serde(default)]
    pub status: String,
    // Documented as a string, sent as a number.
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sendable() -> MandrillMessage {
        MandrillMessage {
            text: "body".to_string(),
            subject: "Subject".to_string(),
            from_email: "from@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_params_validate_requires_key() {
        let params = MandrillParams {
            key: String::new(),
            message: sendable(),
            send_async: false,
            ip_pool: None,
            send_at: None,
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_message_validate() {
        assert!(sendable().validate().is_ok());

        let mut no_content = sendable();
        no_content.text.clear();
        assert!(no_content.validate().is_err());

        let mut no_subject = sendable();
        no_subject.subject.clear();
        assert!(no_subject.validate().is_err());

        let mut no_from = sendable();
        no_from.from_email.clear();
        assert!(no_from.validate().is_err());
    }

    #[test]
    fn test_params_serialization_field_names() {
        let params = MandrillParams {
            key: "k".to_string(),
            message: sendable(),
            send_async: true,
            ip_pool: Some("main".to_string()),
            send_at: Some("2024-01-01 10:00:00".to_string()),
        };

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["key"], "k");
        assert_eq!(value["async"], true);
        assert_eq!(value["ip_pool"], "main");
        assert_eq!(value["send_at"], "2024-01-01 10:00:00");
        assert_eq!(value["message"]["url_strip_qs"], false);
        assert_eq!(value["message"]["important"], false);
        assert!(value["message"].get("html").is_none());
        assert!(value["message"].get("attachments").is_none());
    }

    #[test]
    fn test_attachment_field_names() {
        let attachment = MandrillAttachment {
            mime_type: "image/png".to_string(),
            name: "logo".to_string(),
            base64_content: "aGk=".to_string(),
        };

        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value, json!({"type": "image/png", "name": "logo", "content": "aGk="}));
    }

    #[test]
    fn test_recipient_response_decoding() {
        let body = json!([
            {"email": "a@example.com", "status": "sent", "reject_reason": null, "_id": "abc"},
            {"email": "b@example.com", "status": "rejected", "reject_reason": "hard-bounce", "_id": "def"},
            {"email": "c@example.com", "status": "deferred", "_id": "ghi"}
        ]);

        let records: Vec<MandrillRecipientResponse> = serde_json::from_value(body).unwrap();
        assert_eq!(records[0].status, ProviderStatus::Sent);
        assert_eq!(records[0].id, "abc");
        assert_eq!(records[1].status, ProviderStatus::Rejected);
        assert_eq!(records[1].reject_reason.as_deref(), Some("hard-bounce"));
        assert_eq!(records[2].status, ProviderStatus::Unknown);
        assert!(records[2].reject_reason.is_none());
    }

    #[test]
    fn test_error_response_decoding() {
        let body = json!({
            "status": "error",
            "code": -1,
            "name": "Invalid_Key",
            "message": "Invalid API key"
        });

        let err: MandrillErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(err.code, -1);
        assert_eq!(err.name, "Invalid_Key");
    }
}
