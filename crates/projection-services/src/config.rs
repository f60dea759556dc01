/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Configuration for span services.
 */

//! Configuration for span services.
//!
//! Configuration is read from YAML with kebab-case keys. Every key is
//! optional:
//!
//! ```yaml
//! excerpt:
//!   tooltip-context-lines: 1
//! preview:
//!   trim-line-text: true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanError};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServicesConfig {
    pub excerpt: ExcerptConfig,
    pub preview: PreviewConfig,
}

/// Settings for excerpt extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExcerptConfig {
    /// Lines shown before and after the located line in tooltip excerpts
    pub tooltip_context_lines: usize,
}

impl Default for ExcerptConfig {
    fn default() -> Self {
        Self {
            tooltip_context_lines: 1,
        }
    }
}

/// Settings for reference-list previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PreviewConfig {
    /// Strip surrounding whitespace from the previewed line
    pub trim_line_text: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            trim_line_text: true,
        }
    }
}

impl ServicesConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            let message = format!("Failed to parse services config: {}", e);
            SpanError::Config(message)
        })
    }
}
