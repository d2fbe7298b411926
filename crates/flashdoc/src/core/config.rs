//! Configuration loading and management.
//!
//! This module provides utilities for loading extraction configuration from various
//! sources (TOML, YAML, JSON) and discovering configuration files in the project hierarchy.

use crate::ocr::OcrLanguages;
use crate::{FlashdocError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pages whose native text layer is shorter than this are sent to OCR.
pub const MIN_TEXT_LENGTH_PER_PAGE: usize = 20;

/// Lowest accepted rasterization scale for OCR rendering.
pub const MIN_RENDER_SCALE: f32 = 2.0;

/// Uploads larger than this are rejected before dispatch.
pub const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Main extraction configuration.
///
/// Fixed for the lifetime of a job. It can be loaded from TOML, YAML, or JSON
/// files, or created programmatically.
///
/// # Example
///
/// ```rust
/// use flashdoc::core::config::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.min_text_length_per_page, 20);
///
/// // let config = ExtractionConfig::from_toml_file("flashdoc.toml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum native text length (in chars) for a PDF page to skip OCR
    #[serde(default = "default_min_text_length")]
    pub min_text_length_per_page: usize,

    /// Rasterization scale relative to the page's native size (clamped to >= 2.0)
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Remove "Page N of M" running headers before normalization
    #[serde(default = "default_true")]
    pub strip_page_markers: bool,

    /// Number of chars kept in the result preview
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,

    #[serde(default)]
    pub ocr: OcrConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length_per_page: default_min_text_length(),
            render_scale: default_render_scale(),
            max_file_size: default_max_file_size(),
            strip_page_markers: true,
            preview_length: default_preview_length(),
            ocr: OcrConfig::default(),
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Recognition languages, `+`-separated in priority order
    #[serde(default = "default_languages")]
    pub languages: String,

    /// Directory holding `<lang>.traineddata` files (None = auto-detect)
    #[serde(default)]
    pub tessdata_path: Option<PathBuf>,

    /// Tesseract page segmentation mode
    #[serde(default = "default_psm")]
    pub page_segmentation_mode: i32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            tessdata_path: None,
            page_segmentation_mode: default_psm(),
        }
    }
}

impl OcrConfig {
    pub fn language_set(&self) -> OcrLanguages {
        OcrLanguages::parse(&self.languages)
    }
}

fn default_true() -> bool {
    true
}
fn default_min_text_length() -> usize {
    MIN_TEXT_LENGTH_PER_PAGE
}
fn default_render_scale() -> f32 {
    MIN_RENDER_SCALE
}
fn default_max_file_size() -> u64 {
    MAX_FILE_SIZE
}
fn default_preview_length() -> usize {
    250
}
fn default_languages() -> String {
    "ind+eng".to_string()
}
fn default_psm() -> i32 {
    3
}

impl ExtractionConfig {
    /// Render scale actually used for rasterization.
    pub fn effective_render_scale(&self) -> f32 {
        if self.render_scale.is_finite() {
            self.render_scale.max(MIN_RENDER_SCALE)
        } else {
            MIN_RENDER_SCALE
        }
    }

    /// Check values that would make every job fail.
    pub fn validate(&self) -> Result<()> {
        if self.ocr.language_set().is_empty() {
            return Err(FlashdocError::validation("OCR language set cannot be empty"));
        }
        if self.max_file_size == 0 {
            return Err(FlashdocError::validation("max_file_size must be greater than zero"));
        }
        if !self.render_scale.is_finite() || self.render_scale <= 0.0 {
            return Err(FlashdocError::validation(format!(
                "render_scale must be a positive number, got {}",
                self.render_scale
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `FlashdocError::Validation` if the file doesn't exist or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| FlashdocError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| FlashdocError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| FlashdocError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, choosing the parser from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
            Some(ext) if ext == "yaml" || ext == "yml" => Self::from_yaml_file(path),
            Some(ext) if ext == "json" => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `flashdoc.toml` in current directory and parent directories.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(FlashdocError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`discover`](Self::discover), starting at `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join("flashdoc.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| FlashdocError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
