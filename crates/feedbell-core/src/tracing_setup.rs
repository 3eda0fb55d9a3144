use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `default_filter`.
/// When `FEEDBELL_LOG_FILE` is set, logs go to that file at debug level so they
/// don't interleave with terminal rendering.
pub fn init_tracing_with_default(default_filter: &str) {
    let file_logging = std::env::var("FEEDBELL_LOG_FILE").ok();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if let Some(log_path) = file_logging {
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => {
                let file_layer = fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);
                let _ = tracing_subscriber::registry().with(file_layer).try_init();
                return;
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_path, e);
            }
        }
    }

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
