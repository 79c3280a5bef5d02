use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "weigh=debug,weigh_core=debug"
    } else {
        "weigh=warn,weigh_core=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
