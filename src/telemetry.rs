// SPDX-License-Identifier: MIT
//! Tracing initialisation for embedders and tests.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter, e.g.
/// `TASKSYNC_LOG=tasksync=debug`.
pub const LOG_ENV: &str = "TASKSYNC_LOG";

/// Install the global tracing subscriber with a compact formatter.
///
/// `default_directive` applies when [`LOG_ENV`] is unset. Fails if a global
/// subscriber is already installed.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_instead_of_panicking() {
        init("info").unwrap();
        assert!(init("info").is_err());
    }
}
