//! Pure conversions between the generic mail model and the Mandrill wire model

use super::wire::{
    MandrillAttachment, MandrillMessage, MandrillParams, MandrillRecipient,
    MandrillRecipientMetadata, MandrillRecipientResponse, ProviderStatus,
};
use crate::error::MailResult;
use crate::models::{
    Attachment, MailStatus, Message, Recipient, RecipientResponse, RecipientRole, SendParams,
};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

/// Mandrill expects scheduled times in UTC without zone information
const SEND_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const REPLY_TO_HEADER: &str = "Reply-To";

/// Common defaults for every message sent through an adapter. Not sendable on its own.
pub(super) fn base_message(domain: &str) -> MandrillMessage {
    MandrillMessage {
        inline_css: true,
        track_clicks: true,
        track_opens: true,
        strip_query_string: true,
        tracking_domain: domain.to_string(),
        signing_domain: domain.to_string(),
        return_path_domain: domain.to_string(),
        ..Default::default()
    }
}

/// Minimal plain text message used by `simple_mail`
pub(super) fn simple_message(
    domain: &str,
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> MandrillMessage {
    MandrillMessage {
        subject: subject.to_string(),
        from_email: from.to_string(),
        to: vec![MandrillRecipient {
            email: to.to_string(),
            name: String::new(),
            role: RecipientRole::To,
        }],
        headers: HashMap::from([(REPLY_TO_HEADER.to_string(), from.to_string())]),
        mark_important: true,
        text: body.to_string(),
        inline_css: false,
        track_clicks: false,
        track_opens: false,
        ..base_message(domain)
    }
}

/// Map recipients and a generic message into a Mandrill message
pub(super) fn build_message(
    recipients: &[Recipient],
    message: &Message,
    domain: &str,
    default_sender: &Recipient,
) -> MailResult<MandrillMessage> {
    let mut msg = base_message(domain);

    msg.subject = message.subject.clone();
    set_from(message, default_sender, &mut msg);

    msg.mark_important = message.mark_important;
    msg.metadata = message.metadata.clone();
    msg.tags = message.tags.clone();

    set_content(message, &mut msg)?;
    set_recipients(recipients, &mut msg);

    msg.attachments = map_attachments(&message.attachments);
    msg.images = map_attachments(&message.images);

    Ok(msg)
}

/// Wrap a message with the account key and delivery options
pub(super) fn build_params(key: &str, params: &SendParams, message: MandrillMessage) -> MandrillParams {
    MandrillParams {
        key: key.to_string(),
        message,
        send_async: params.send_async,
        ip_pool: params.ip_pool.clone(),
        send_at: params.send_at.as_ref().map(format_send_at),
    }
}

/// Format a zoned timestamp as UTC wall-clock time
pub(super) fn format_send_at(send_at: &DateTime<FixedOffset>) -> String {
    send_at.naive_utc().format(SEND_AT_FORMAT).to_string()
}

/// Convert Mandrill status records into generic responses.
///
/// Every status Mandrill documents collapses to `Accepted`, including
/// `rejected` and `invalid`; `error` keeps the reject reason for callers
/// that need the distinction.
pub(super) fn normalize_responses(records: Vec<MandrillRecipientResponse>) -> Vec<RecipientResponse> {
    records
        .into_iter()
        .map(|record| RecipientResponse {
            id: record.id,
            email: record.email,
            status: normalize_status(record.status),
            error: record.reject_reason,
        })
        .collect()
}

fn normalize_status(status: ProviderStatus) -> MailStatus {
    match status {
        ProviderStatus::Sent
        | ProviderStatus::Queued
        | ProviderStatus::Scheduled
        | ProviderStatus::Rejected
        | ProviderStatus::Invalid => MailStatus::Accepted,
        ProviderStatus::Unknown => MailStatus::Unknown,
    }
}

/// Prefer the message's own sender, fall back to the adapter default
fn set_from(src: &Message, default_sender: &Recipient, dest: &mut MandrillMessage) {
    let sender = src
        .from
        .as_ref()
        .filter(|from| !from.email.is_empty())
        .unwrap_or(default_sender);

    dest.from_email = sender.email.clone();
    dest.from_name = sender.name.clone();

    if let Some(reply_to) = src.reply_to.as_ref().filter(|r| !r.is_empty()) {
        dest.headers
            .insert(REPLY_TO_HEADER.to_string(), reply_to.clone());
    }
}

fn set_content(src: &Message, dest: &mut MandrillMessage) -> MailResult<()> {
    let vars = &src.template_vars;

    if let Some(template) = &src.html_template {
        dest.html = template.render(vars)?;
    }

    // auto_text wins over an explicit text template
    if let Some(template) = src.text_template.as_ref().filter(|_| !src.auto_text) {
        dest.text = template.render(vars)?;
    }

    if dest.text.is_empty() {
        dest.auto_text = true;
    }

    Ok(())
}

fn set_recipients(recipients: &[Recipient], dest: &mut MandrillMessage) {
    dest.to = recipients
        .iter()
        .map(|r| MandrillRecipient {
            email: r.email.clone(),
            name: r.name.clone(),
            role: r.role.unwrap_or(RecipientRole::To),
        })
        .collect();

    let metadata: Vec<MandrillRecipientMetadata> = recipients
        .iter()
        .filter(|r| !r.metadata.is_empty())
        .map(|r| MandrillRecipientMetadata {
            rcpt: r.email.clone(),
            values: r.metadata.clone(),
        })
        .collect();

    if !metadata.is_empty() {
        dest.recipient_metadata = Some(metadata);
    }
}

fn map_attachments(attachments: &[Attachment]) -> Option<Vec<MandrillAttachment>> {
    if attachments.is_empty() {
        return None;
    }

    Some(
        attachments
            .iter()
            .map(|a| MandrillAttachment {
                mime_type: a.mime_type.clone(),
                name: a.name.clone(),
                base64_content: a.base64_content.clone(),
            })
            .collect(),
    )
}
