use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the `--debug` flag.
/// Output goes to stderr so stdout stays clean for command output.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(true);
        init(false);
        tracing::debug!("logger initialised");
    }
}
