use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Maps anything unrecognised to `warn`.
fn normalize_level(level: &str) -> &'static str {
    let level = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .copied()
        .find(|known| *known == level)
        .unwrap_or("warn")
}

/// Console logging on stderr so stdout stays parseable. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    let level = normalize_level(level);
    let filter = EnvFilter::builder()
        .with_default_directive(level.parse().unwrap_or_else(|_| LevelFilter::WARN.into()))
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default());

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}
