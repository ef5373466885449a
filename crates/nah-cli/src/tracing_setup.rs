//! Structured logging setup. `RUST_LOG` wins outright, then `--debug`, then
//! `--verbose`, then a quiet default. No progress-bar layer — composition
//! is synchronous and finishes before a bar would ever render.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing with the default, quietest filter. Safe to call
/// more than once; only the first call takes effect.
pub fn setup_tracing() {
    init_tracing(false, false);
}

/// Initialize tracing honoring `--verbose`/`--debug`. `RUST_LOG` always
/// takes precedence over both when set.
pub fn init_tracing(verbose: bool, debug: bool) {
    INIT.call_once(|| {
        let env_filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else if debug {
            tracing_subscriber::EnvFilter::new("debug")
        } else if verbose {
            tracing_subscriber::EnvFilter::new("nah=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new("nah=info,warn,error")
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(debug)
            .with_level(verbose || debug)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    });
}
