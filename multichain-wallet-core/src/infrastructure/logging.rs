//! Logger bootstrap

use env_logger::{Builder, Env};

/// Install the `env_logger` backend, honouring `RUST_LOG` and defaulting
/// to `info`. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    if Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
    {
        log::debug!("Logger initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        init_logging();
        log::info!("still logging");
    }
}
