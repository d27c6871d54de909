//! Configuration management for `exactmatch-core`.
//!
//! This module defines the threshold and pattern-extraction settings of a run.
//! It handles deserialization of YAML configuration files and provides
//! utilities for loading, merging and validating them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ExactmatchError;

/// Metacharacters whose escaped form is canonicalized to `\xHH` by default.
pub const DEFAULT_METACHARACTERS: [char; 15] = [
    '.', '^', '$', '*', '+', '?', '{', '}', '[', ']', '(', ')', '|', '\\', '/',
];

/// Default upper bound for `c{n}` expansion.
pub const DEFAULT_MAX_EXACT_REPEAT: usize = 255;

/// Retention threshold for extracted fragments.
///
/// There is deliberately no `Default`: every caller states its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThresholdConfig {
    /// Fragments with `length <= minimal_fragment_length` are not retained.
    pub minimal_fragment_length: usize,
}

impl ThresholdConfig {
    pub fn new(minimal_fragment_length: usize) -> Self {
        Self { minimal_fragment_length }
    }

    /// Whether a fragment of `length` bytes is kept.
    pub fn retains(&self, length: usize) -> bool {
        length > self.minimal_fragment_length
    }
}

/// Settings for the pattern literal extractor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Escaped characters rewritten to `\xHH` before ambiguity removal.
    pub metacharacters: Vec<char>,
    /// Largest `{n}` expanded into literal copies.
    pub max_exact_repeat: usize,
    /// Rewrite rules to skip, by name.
    pub disabled_rules: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            metacharacters: DEFAULT_METACHARACTERS.to_vec(),
            max_exact_repeat: DEFAULT_MAX_EXACT_REPEAT,
            disabled_rules: Vec::new(),
        }
    }
}

/// The complete configuration of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub threshold: ThresholdConfig,
    pub pattern: PatternConfig,
}

impl ExtractorConfig {
    /// A configuration with the given threshold and default pattern settings.
    pub fn new(threshold: ThresholdConfig) -> Self {
        Self {
            threshold,
            pattern: PatternConfig::default(),
        }
    }
}

/// A configuration file as written on disk. Every field is optional so a
/// user file only needs to state what it overrides.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigFile {
    pub minimal_fragment_length: Option<usize>,
    #[serde(default)]
    pub pattern: Option<PatternConfig>,
}

impl ConfigFile {
    /// Loads a configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading extractor configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ConfigFile = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Loads the built-in configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default extractor configuration from embedded string...");
        let default_yaml = include_str!("../config/default_extractor.yaml");
        let config: ConfigFile =
            serde_yml::from_str(default_yaml).context("Failed to parse default extractor configuration")?;
        Ok(config)
    }

    /// Turns the file into a run configuration. `threshold_override` wins over
    /// the file; having neither is an error.
    pub fn resolve(self, threshold_override: Option<usize>) -> Result<ExtractorConfig> {
        let minimal = threshold_override
            .or(self.minimal_fragment_length)
            .ok_or_else(|| anyhow!("No minimal_fragment_length given in configuration or on the command line"))?;

        Ok(ExtractorConfig {
            threshold: ThresholdConfig::new(minimal),
            pattern: self.pattern.unwrap_or_default(),
        })
    }
}

/// Merges a user configuration over the defaults, field by field.
pub fn merge_config(default_config: ConfigFile, user_config: Option<ConfigFile>) -> ConfigFile {
    let Some(user_cfg) = user_config else {
        debug!("No user configuration provided, using defaults.");
        return default_config;
    };

    let mut merged = default_config;
    if let Some(threshold) = user_cfg.minimal_fragment_length {
        debug!("Overriding minimal_fragment_length with user value: {}", threshold);
        merged.minimal_fragment_length = Some(threshold);
    }
    if let Some(pattern) = user_cfg.pattern {
        debug!(
            "Overriding pattern settings with user values ({} disabled rule(s)).",
            pattern.disabled_rules.len()
        );
        merged.pattern = Some(pattern);
    }
    merged
}

impl PatternConfig {
    /// Checks the settings that cannot be expressed in the type.
    pub fn validate(&self) -> Result<(), ExactmatchError> {
        let mut errors = Vec::new();
        for c in &self.metacharacters {
            if !c.is_ascii_punctuation() {
                errors.push(format!(
                    "metacharacter '{}' is not ASCII punctuation; alphanumeric escapes are character classes",
                    c
                ));
            }
        }
        if self.disabled_rules.iter().any(|name| name.trim().is_empty()) {
            errors.push("a disabled rule name is empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ExactmatchError::InvalidConfig(errors.join("; ")))
        }
    }
}

fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(pattern) = &config.pattern {
        pattern.validate().context("Configuration validation failed")?;
    }
    Ok(())
}
