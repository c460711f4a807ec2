//! Process-wide setup for the CLI: logging and the rayon pool.

use tracing_subscriber::EnvFilter;

/// Rayon thread stack size (8MB for deeply nested Python syntax trees)
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Filter directive for a `-v` count; `None` defers to `RUST_LOG`
pub fn verbosity_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Install the global subscriber, writing to stderr so stdout stays clean for output
pub fn init_logging(verbosity: u8) {
    let filter = match verbosity_directive(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // A subscriber may already be installed (tests, embedding); keep it
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Configure rayon global thread pool once at startup
pub fn configure_thread_pool() {
    let builder = rayon::ThreadPoolBuilder::new().stack_size(RAYON_STACK_SIZE);

    if let Err(e) = builder.build_global() {
        // Already configured - this is fine, just ignore
        eprintln!("Note: Thread pool already configured: {}", e);
    }
}
