//! Configuration for the tagger.
//!
//! `TransformConfig` is everything the core needs for one call. `HostOptions`
//! is the superset a build-tool plugin receives (the options object), adding
//! the on/off switch and the file filter that decide *whether* the core runs.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, TransformError};

pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "data-simplify";
pub const DEFAULT_INCLUDE_PATTERN: &str = r"\.(jsx|tsx)$";

lazy_static! {
    static ref DEFAULT_INCLUDE_RE: Regex = Regex::new(DEFAULT_INCLUDE_PATTERN).unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// CORE CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformConfig {
    /// Base for the `-id`, `-name` and `-props` attributes. Any attribute
    /// starting with it marks an element as already tagged.
    pub attribute_prefix: String,
    pub include_static_snapshot: bool,
    /// Root that identities and `data-component-path` are relative to.
    pub base_directory: PathBuf,
    pub include_content_preview: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
            include_static_snapshot: true,
            base_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            include_content_preview: false,
        }
    }
}

impl TransformConfig {
    pub fn with_base_directory(mut self, base: impl Into<PathBuf>) -> Self {
        self.base_directory = base.into();
        self
    }

    pub fn attribute(&self, suffix: &str) -> String {
        format!("{}-{}", self.attribute_prefix, suffix)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostOptions {
    pub enabled: bool,
    /// Regex matched against the module id. Defaults to `.jsx`/`.tsx` files.
    pub include: Option<String>,
    #[serde(flatten)]
    pub transform: TransformConfig,
}

impl Default for HostOptions {
    fn default() -> Self {
        HostOptions {
            enabled: true,
            include: None,
            transform: TransformConfig::default(),
        }
    }
}

impl HostOptions {
    pub fn from_json(value: serde_json::Value) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn file_filter(&self) -> Result<FileFilter> {
        let pattern = match &self.include {
            Some(src) => Regex::new(src).map_err(|source| TransformError::InvalidPattern {
                pattern: src.clone(),
                source,
            })?,
            None => DEFAULT_INCLUDE_RE.clone(),
        };
        Ok(FileFilter {
            enabled: self.enabled,
            pattern,
        })
    }
}

/// Decides which module ids reach the core.
#[derive(Debug, Clone)]
pub struct FileFilter {
    enabled: bool,
    pattern: Regex,
}

impl FileFilter {
    pub fn should_transform(&self, id: &str) -> bool {
        self.enabled && self.pattern.is_match(id)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        FileFilter {
            enabled: true,
            pattern: DEFAULT_INCLUDE_RE.clone(),
        }
    }
}
