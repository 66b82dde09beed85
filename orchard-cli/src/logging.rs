//! Diagnostic logging on stderr.
//!
//! `ORCHARD_LOG` takes an `EnvFilter` directive (default `warn`);
//! `ORCHARD_LOG_FORMAT=json` switches to one JSON object per event.

use tracing_subscriber::{fmt, EnvFilter};

const FILTER_ENV: &str = "ORCHARD_LOG";
const FORMAT_ENV: &str = "ORCHARD_LOG_FORMAT";

pub fn init() {
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let json = std::env::var(FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
