//! tracing subscriber setup for the binaries.
//!
//! Filter priority: `STATGROWTH_LOG` > `RUST_LOG` > the caller's default.
//! Output goes to stderr so stdout stays free for reports.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "STATGROWTH_LOG";

fn build_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(default_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_tracing(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(default_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
