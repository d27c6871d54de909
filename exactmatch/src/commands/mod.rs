// exactmatch/src/commands/mod.rs
//! Command implementations and the configuration loading they share.

pub mod extract;
pub mod inspect;
pub mod rules;

use anyhow::Result;
use log::debug;
use std::path::Path;

use exactmatch_core::{merge_config, ConfigFile, ExtractorConfig};

use crate::cli::DEFAULT_MINIMAL_FRAGMENT_LENGTH;

/// Builds the run configuration: embedded defaults, then the user file, then
/// command-line overrides.
pub fn load_config(path: Option<&Path>, threshold: Option<usize>, disabled_rules: &[String]) -> Result<ExtractorConfig> {
    let default_config = ConfigFile::load_default()?;
    let user_config = path.map(ConfigFile::load_from_file).transpose()?;
    let merged = merge_config(default_config, user_config);

    let threshold = threshold
        .or(merged.minimal_fragment_length)
        .unwrap_or(DEFAULT_MINIMAL_FRAGMENT_LENGTH);
    let mut config = merged.resolve(Some(threshold))?;

    for name in disabled_rules {
        if !config.pattern.disabled_rules.contains(name) {
            config.pattern.disabled_rules.push(name.clone());
        }
    }
    config.pattern.validate()?;
    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}
