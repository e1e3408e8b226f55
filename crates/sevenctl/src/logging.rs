//! Tracing subscriber setup.

use std::any::Any;
use std::panic::Location;
use tracing_subscriber::EnvFilter;

/// Filter variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "SEVEN_LOG";

/// Filter directive: `--verbose` wins, then `SEVEN_LOG`, then `RUST_LOG`
pub fn filter_directive(verbose: bool) -> String {
    if verbose {
        return "debug".to_string();
    }
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string())
}

/// Install the fmt subscriber on stderr so replies on stdout stay clean
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_new(filter_directive(verbose)).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Report panics through tracing instead of the default stderr hook
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %describe_panic(info.payload(), info.location()), "panic caught");
    }));
}

/// Panic payload text, with the source location when known
pub fn describe_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown".to_string());
    match location {
        Some(loc) => format!("{} at {}:{}", message, loc.file(), loc.line()),
        None => message,
    }
}
