//! Transactional email through Mandrill
//!
//! A small, provider-neutral mail model plus an adapter that sends it through
//! the Mandrill (Mailchimp Transactional) HTTP API.
//!
//! ## Components
//!
//! - **Models**: `Recipient`, `Message`, `Attachment`, `SendParams`, `RecipientResponse`
//! - **Templates**: Handlebars-backed `MailTemplate`, rendered locally before sending
//! - **Providers**: the `Mailer` trait and its `Mandrill` implementation
//! - **Transport**: `Transport` seam with a reqwest-backed default
//!
//! ## Usage
//!
//! ```ignore
//! use mandrill_mail::{Mailer, Mandrill, Recipient, ReqwestTransport};
//!
//! let mailer = Mandrill::new(
//!     api_key,
//!     "mail.example.com",
//!     Recipient::sender("noreply@example.com", "Example"),
//!     ReqwestTransport::new(),
//! )?;
//! let response = mailer
//!     .simple_mail("noreply@example.com", "user@example.com", "Hello", "Hi there")
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod templates;

pub use config::MandrillConfig;
pub use error::{MailError, MailResult};
pub use models::{
    Attachment, MailStatus, Message, Recipient, RecipientResponse, RecipientRole, SendParams,
};
pub use provider::{Mailer, Mandrill, ReqwestTransport, Transport, TransportResponse};
pub use templates::{MailTemplate, TemplateKind};
