use tracing_subscriber::{fmt, EnvFilter};

/// Console logging, filtered by `RUST_LOG` when set.
pub fn init_logging() {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sqlite_practice=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
}
