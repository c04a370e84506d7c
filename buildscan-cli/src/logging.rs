use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_LOG_FORMAT: &str = "BUILDSCAN_LOG_FORMAT";

/// Installs the global subscriber and routes `log` records through it.
///
/// `RUST_LOG` takes precedence over the verbosity flag. Output goes to
/// stderr so the report on stdout stays machine-readable.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    let use_json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v == "json")
        .unwrap_or(false);

    let fmt_layer = if use_json {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer().with_target(false).with_writer(std::io::stderr).boxed()
    };

    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(filter);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
        return;
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
}
