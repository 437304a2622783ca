//! Mandrill CLI
//!
//! Sends a single plain text, templated, or bulk email through Mandrill and
//! prints the per-recipient results as JSON. Credentials come from the
//! `MANDRILL_*` environment variables.

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use mandrill_mail::{
    Attachment, MailTemplate, Mailer, Mandrill, MandrillConfig, Message, Recipient,
    RecipientResponse, ReqwestTransport, SendParams,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

mod telemetry;

use telemetry::{LogFormat, init_tracing, install_color_eyre};

#[derive(Parser)]
#[command(name = "mandrill-cli")]
#[command(about = "Send transactional email through Mandrill")]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a plain text email to one recipient
    Simple {
        /// Sender address. Defaults to MANDRILL_FROM_EMAIL.
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: String,

        #[arg(short, long)]
        subject: String,

        #[arg(short, long)]
        body: String,
    },

    /// Render a Handlebars template and send it to one recipient
    Template {
        #[arg(long)]
        to: String,

        #[arg(short, long)]
        subject: String,

        /// Template file
        #[arg(short, long)]
        template: PathBuf,

        /// Treat the template as plain text instead of HTML
        #[arg(long)]
        text: bool,

        /// Template variable as KEY=VALUE, repeatable
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },

    /// Send one message to many recipients
    Bulk {
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        cc: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        bcc: Vec<String>,

        #[arg(short, long)]
        subject: String,

        /// HTML template file
        #[arg(long)]
        html: Option<PathBuf>,

        /// Plain text template file
        #[arg(long)]
        text: Option<PathBuf>,

        /// Let Mandrill generate the text part from the HTML
        #[arg(long)]
        auto_text: bool,

        /// Template variable as KEY=VALUE, repeatable
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Sender address. Defaults to MANDRILL_FROM_EMAIL.
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        from_name: Option<String>,

        #[arg(long)]
        reply_to: Option<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,

        /// File to attach, repeatable
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,

        #[arg(long)]
        important: bool,

        #[arg(long)]
        ip_pool: Option<String>,

        /// Delivery time in RFC 3339, e.g. 2030-01-02T09:00:00+03:00
        #[arg(long, value_parser = parse_send_at)]
        send_at: Option<DateTime<FixedOffset>>,

        #[arg(long = "async")]
        send_async: bool,

        #[arg(long)]
        track_opens: bool,

        #[arg(long)]
        track_clicks: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(LogFormat::from_env());

    let cli = Cli::parse();

    let config = MandrillConfig::from_env().wrap_err("Mandrill is not configured")?;
    let default_from = config.sender.clone();
    let mailer = Mandrill::from_config(config, ReqwestTransport::new())?;

    let responses = match cli.command {
        Commands::Simple {
            from,
            to,
            subject,
            body,
        } => {
            let from = from.unwrap_or(default_from.email);
            vec![mailer.simple_mail(&from, &to, &subject, &body).await?]
        }

        Commands::Template {
            to,
            subject,
            template,
            text,
            vars,
        } => {
            let template = load_template(&template, text)?;
            let vars: HashMap<String, String> = vars.into_iter().collect();
            vec![mailer.template_mail(&to, &subject, &template, &vars).await?]
        }

        Commands::Bulk {
            to,
            cc,
            bcc,
            subject,
            html,
            text,
            auto_text,
            vars,
            from,
            from_name,
            reply_to,
            tags,
            attachments,
            important,
            ip_pool,
            send_at,
            send_async,
            track_opens,
            track_clicks,
        } => {
            let recipients: Vec<Recipient> = to
                .into_iter()
                .map(Recipient::to)
                .chain(cc.into_iter().map(Recipient::cc))
                .chain(bcc.into_iter().map(Recipient::bcc))
                .collect();

            let sender = match from {
                Some(email) => Recipient::sender(email, from_name.unwrap_or_default()),
                None => default_from,
            };

            let mut message = Message::new(subject)
                .with_vars(vars.into_iter().collect())
                .with_from(sender);
            message.auto_text = auto_text;
            message.mark_important = important;
            message.tags = tags;
            message.reply_to = reply_to;

            if let Some(path) = html {
                message = message.with_html(load_template(&path, false)?);
            }
            if let Some(path) = text {
                message = message.with_text(load_template(&path, true)?);
            }
            for path in &attachments {
                message = message.with_attachment(load_attachment(path)?);
            }

            let mut params = SendParams::default().with_tracking(track_opens, track_clicks);
            params.send_async = send_async;
            params.send_at = send_at;
            params.ip_pool = ip_pool;

            mailer.bulk_mail(&recipients, &message, &params).await?
        }
    };

    info!(count = responses.len(), "Mandrill responded");
    print_responses(&responses, cli.pretty)?;

    Ok(())
}

fn print_responses(responses: &[RecipientResponse], pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(responses)?
    } else {
        serde_json::to_string(responses)?
    };
    println!("{}", output);
    Ok(())
}

fn load_template(path: &Path, text: bool) -> Result<MailTemplate> {
    let source = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read template {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let template = if text {
        MailTemplate::text(name, &source)?
    } else {
        MailTemplate::html(name, &source)?
    };
    Ok(template)
}

fn load_attachment(path: &Path) -> Result<Attachment> {
    let bytes = std::fs::read(path)
        .wrap_err_with(|| format!("Failed to read attachment {}", path.display()))?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Attachment::from_bytes(name, mime_type(path), &bytes))
}

/// Guess a MIME type from the file extension
fn mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;

    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }

    Ok((key.to_string(), value.to_string()))
}

fn parse_send_at(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid RFC 3339 time '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("name=Ann").unwrap(),
            ("name".to_string(), "Ann".to_string())
        );
        assert_eq!(
            parse_var("url=https://x.com/?a=b").unwrap(),
            ("url".to_string(), "https://x.com/?a=b".to_string())
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=value").is_err());
    }

    #[test]
    fn test_parse_send_at() {
        let at = parse_send_at("2030-01-02T09:00:00+03:00").unwrap();
        assert_eq!(at.offset().local_minus_utc(), 3 * 3600);
        assert!(parse_send_at("tomorrow").is_err());
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("logo.PNG")), "image/png");
        assert_eq!(mime_type(Path::new("report.pdf")), "application/pdf");
        assert_eq!(
            mime_type(Path::new("q3.docx")),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(mime_type(Path::new("photo.webp")), "image/webp");
        assert_eq!(mime_type(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_cli_parses_bulk() {
        let cli = Cli::try_parse_from([
            "mandrill-cli",
            "bulk",
            "--to",
            "a@x.com,b@x.com",
            "--bcc",
            "c@x.com",
            "--subject",
            "Hello",
            "--var",
            "name=Ann",
            "--send-at",
            "2030-01-02T09:00:00Z",
            "--async",
            "--pretty",
        ])
        .unwrap();

        assert!(cli.pretty);
        match cli.command {
            Commands::Bulk {
                to,
                bcc,
                vars,
                send_at,
                send_async,
                ..
            } => {
                assert_eq!(to, vec!["a@x.com", "b@x.com"]);
                assert_eq!(bcc, vec!["c@x.com"]);
                assert_eq!(vars, vec![("name".to_string(), "Ann".to_string())]);
                assert!(send_at.is_some());
                assert!(send_async);
            }
            _ => panic!("expected bulk command"),
        }
    }

    #[test]
    fn test_cli_bulk_requires_to() {
        assert!(Cli::try_parse_from(["mandrill-cli", "bulk", "--subject", "Hello"]).is_err());
    }
}
