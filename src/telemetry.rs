use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// is harmless; the second call loses and returns `false`.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format.as_str() {
        "pretty" => builder.pretty().try_init().is_ok(),
        _ => builder.json().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected() {
        let config = LoggingConfig {
            level: "debug".into(),
            format: "pretty".into(),
        };
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
