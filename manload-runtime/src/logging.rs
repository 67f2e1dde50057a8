use tracing_subscriber::{fmt, EnvFilter};

/// Installs a stderr subscriber so stdout carries only the report. `RUST_LOG`
/// takes precedence over `log_level` when set.
pub fn init_tracing(log_level: &str) {
    let level_filter = format!(
        "manload={log_level},manload_balancer={log_level},manload_structs={log_level}"
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level_filter));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .try_init();
}
