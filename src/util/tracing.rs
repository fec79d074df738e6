use std::io::stderr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[cfg(debug_assertions)]
const FMT_PRETTY: bool = true;

#[cfg(not(debug_assertions))]
const FMT_PRETTY: bool = false;

const QUIET_TARGETS: [&str; 4] = ["reqwest", "rustls", "hyper", "h2"];

pub fn init() {
    let mut tracing_env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // Keep HTTP internals at info so that RUST_LOG=debug
    // shows what altsync itself is doing, not every socket read
    for target in QUIET_TARGETS {
        if let Ok(directive) = format!("{target}=info").parse() {
            tracing_env_filter = tracing_env_filter.add_directive(directive);
        }
    }

    // Use the excessively verbose and pretty tracing-subscriber during
    // development, and a more concise and less pretty output in production.
    if FMT_PRETTY {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_env_filter)
            .with_writer(stderr)
            .pretty()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_env_filter)
            .with_writer(stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}
