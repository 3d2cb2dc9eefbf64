//! Configuration structures for semisus.
//!
//! This module provides configuration types for the components of the application:
//!
//! - [`DiscoveryConfig`] - Which files are picked up when paths are added
//! - [`SubstitutionSettings`] - The two persisted randomization options
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and are loaded from JSON with
//! `#[serde(default)]`, so a partial file only overrides what it names.

use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default file patterns offered when adding files.
const DEFAULT_PATTERNS: &[&str] = &["*.c", "*.cs", "*.java", "*.js", "*.cpp", "*.h"];

/// Default keep chance, in percent, for randomized substitution.
const DEFAULT_RANDOMIZED_CHANCE: u8 = 90;

/// Configuration for file discovery.
///
/// Controls which files are accepted when paths or directories are added to
/// the work list.
///
/// # Examples
///
/// ```
/// use sus_core::DiscoveryConfig;
///
/// let config = DiscoveryConfig::default();
/// assert!(config.patterns.contains(&"*.cs".to_owned()));
/// assert!(!config.recursive);
/// assert!(config.effective_patterns().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Glob patterns matched against file names (e.g., `*.cs`).
    pub patterns: Vec<String>,

    /// Accept every file regardless of [`patterns`](Self::patterns).
    pub all_files: bool,

    /// Descend into subdirectories when a directory is added.
    ///
    /// Directories are listed flat by default.
    pub recursive: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| (*p).to_owned()).collect(),
            all_files: false,
            recursive: false,
        }
    }
}

impl DiscoveryConfig {
    /// Returns the patterns to filter with, or `None` when every file is accepted.
    #[must_use]
    pub fn effective_patterns(&self) -> Option<&[String]> {
        if self.all_files {
            None
        } else {
            Some(&self.patterns)
        }
    }
}

/// The randomization settings read by a substitution run.
///
/// `randomized_chance` is inverted: it is the chance that a semicolon is
/// *kept*. A value of 90 replaces roughly one semicolon in ten.
///
/// # Examples
///
/// ```
/// use sus_core::SubstitutionSettings;
///
/// let settings = SubstitutionSettings::default();
/// assert!(!settings.randomized);
/// assert_eq!(settings.randomized_chance, 90);
/// assert_eq!(settings.replacement_percent(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionSettings {
    /// Whether each semicolon is replaced independently at random.
    pub randomized: bool,

    /// Chance (0-100) that a semicolon is left untouched in a randomized run.
    pub randomized_chance: u8,
}

impl Default for SubstitutionSettings {
    fn default() -> Self {
        Self {
            randomized: false,
            randomized_chance: DEFAULT_RANDOMIZED_CHANCE,
        }
    }
}

impl SubstitutionSettings {
    /// Returns the approximate share of semicolons replaced in a randomized run.
    #[inline]
    #[must_use]
    pub const fn replacement_percent(self) -> u8 {
        100_u8.saturating_sub(self.randomized_chance)
    }
}

/// Root configuration for semisus.
///
/// # Examples
///
/// ```
/// use sus_core::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
///
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("randomized_chance"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File discovery configuration.
    pub discovery: DiscoveryConfig,

    /// Randomization settings for substitution runs.
    pub substitution: SubstitutionSettings,
}

impl Config {
    /// Loads and validates a configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validates and writes the configuration as pretty-printed JSON.
    ///
    /// Missing parent directories are created.
    pub fn save(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }

    /// Checks option ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.substitution.randomized_chance > 100 {
            return Err(ConfigError::invalid_option(
                "substitution.randomized_chance",
                format!(
                    "must be between 0 and 100, got {}",
                    self.substitution.randomized_chance
                ),
            ));
        }
        if !self.discovery.all_files && self.discovery.patterns.is_empty() {
            return Err(ConfigError::invalid_option(
                "discovery.patterns",
                "must not be empty unless all_files is set",
            ));
        }
        Ok(())
    }
}
