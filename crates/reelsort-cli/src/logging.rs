//! Tracing initialization, matching the teacher's `EnvFilter` +
//! JSON-or-human formatter convention.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::LogFormat;

pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_env("REELSORT_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(fmt::layer().json()).with(filter).init();
        }
        LogFormat::Human => {
            tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
        }
    }
}
