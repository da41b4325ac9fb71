//! CLI command implementations

pub mod batch;
pub mod change;
pub mod locales;

use std::path::Path;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::config::{CoinageConfig, Overrides};

/// Loads config from file and env, then applies command-line flags.
pub fn resolve_config(config_path: Option<&Path>, overrides: Overrides) -> Result<CoinageConfig> {
    let config =
        CoinageConfig::load(config_path, overrides).context("Failed to load configuration")?;
    debug!(?config, "Resolved configuration");
    Ok(config)
}

/// RNG for the random strategy: seeded when a seed is configured,
/// otherwise from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
