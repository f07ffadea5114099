//! Crate configuration parser.

use std::fs;
use std::path::Path;
use thiserror::Error;
use u_crating::CrateConfiguration;

/// Errors that can occur when reading a configuration.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidConfiguration(#[from] u_crating::Error),
}

/// Parser for JSON crate configurations.
///
/// Missing fields take their defaults, so `{"product": {"weight": 900}}` is a
/// complete configuration.
#[derive(Debug)]
pub struct ConfigParser {
    validate: bool,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    /// Creates a parser that validates what it reads.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Enables or disables validation after parsing.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Parses a configuration from a JSON file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<CrateConfiguration, ParseError> {
        let content = fs::read_to_string(path)?;
        self.parse_json(&content)
    }

    /// Parses a configuration from a JSON string.
    pub fn parse_json(&self, json: &str) -> Result<CrateConfiguration, ParseError> {
        let config: CrateConfiguration = serde_json::from_str(json)?;
        if self.validate {
            config.validate()?;
        }
        Ok(config)
    }

    /// Default configuration as pretty JSON.
    pub fn sample() -> Result<String, ParseError> {
        Ok(serde_json::to_string_pretty(&CrateConfiguration::default())?)
    }
}
