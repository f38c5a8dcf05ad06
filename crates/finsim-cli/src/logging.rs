use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber.
///
/// `RUST_LOG` controls the filter (default `warn`), e.g. `RUST_LOG=finsim_core=debug`
/// to trace every computed year. Stdout is left to the command output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}
