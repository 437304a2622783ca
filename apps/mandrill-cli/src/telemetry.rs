use tracing::debug;
use tracing_subscriber::{EnvFilter, prelude::*};

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `APP_ENV=production` selects JSON, anything else is pretty-printed
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV") {
            Ok(env) if env.eq_ignore_ascii_case("production") || env.eq_ignore_ascii_case("prod") => {
                LogFormat::Json
            }
            _ => LogFormat::Pretty,
        }
    }
}

/// Install color-eyre with location sections and without the env dump.
///
/// Safe to call more than once.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize the global subscriber with an ErrorLayer for span traces.
///
/// `RUST_LOG` overrides the default filter. Logs go to stderr so stdout
/// stays reserved for command output.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match format {
        LogFormat::Json => EnvFilter::new("warn"),
        LogFormat::Pretty => EnvFilter::new("info,mandrill_mail=debug"),
    });

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init(),
    };

    // Already initialized elsewhere (tests)
    if result.is_ok() {
        debug!(?format, "Tracing initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_env() {
        temp_env::with_var("APP_ENV", Some("production"), || {
            assert_eq!(LogFormat::from_env(), LogFormat::Json);
        });
        temp_env::with_var("APP_ENV", Some("development"), || {
            assert_eq!(LogFormat::from_env(), LogFormat::Pretty);
        });
        temp_env::with_var_unset("APP_ENV", || {
            assert_eq!(LogFormat::from_env(), LogFormat::Pretty);
        });
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(LogFormat::Pretty);
        init_tracing(LogFormat::Json);
    }
}
