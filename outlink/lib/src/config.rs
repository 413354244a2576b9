//! Decoration options.
//!
//! [`DecorateOptions`] is the fully resolved configuration the decorator reads.
//! [`PartialOptions`] is what callers supply: every field is optional and
//! unspecified fields fall back to the defaults when merged.
//!
//! ## Examples
//!
//! ```rust
//! use outlink_lib::{DecorateOptions, PartialOptions};
//!
//! let partial = PartialOptions::from_json_str(r#"{ "cssClass": "ext" }"#).unwrap();
//! let options = DecorateOptions::merged(partial);
//!
//! assert_eq!(options.css_class, "ext");
//! assert_eq!(options.icon_url, "images/externalink.png");
//! assert_eq!(options.start_url, "");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OutlinkError;

/// Class added to external anchors when the caller does not pick one.
pub const DEFAULT_CSS_CLASS: &str = "external";

/// Icon appended to external anchors when the caller does not pick one.
pub const DEFAULT_ICON_URL: &str = "images/externalink.png";

/// Resolved options for a decoration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorateOptions {
    /// Class name added to every external anchor.
    #[serde(alias = "cssClass")]
    pub css_class: String,

    /// Source of the icon image appended to external anchors.
    ///
    /// An empty string disables the icon.
    #[serde(alias = "iconUrl")]
    pub icon_url: String,

    /// Extra prefix that also qualifies an href as external.
    ///
    /// Ignored when empty.
    #[serde(alias = "startUrl")]
    pub start_url: String,
}

impl Default for DecorateOptions {
    fn default() -> Self {
        Self {
            css_class: DEFAULT_CSS_CLASS.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            start_url: String::new(),
        }
    }
}

impl DecorateOptions {
    /// Builds options from the defaults with every field present in
    /// `partial` taking precedence.
    pub fn merged(partial: PartialOptions) -> Self {
        let defaults = Self::default();
        Self {
            css_class: partial.css_class.unwrap_or(defaults.css_class),
            icon_url: partial.icon_url.unwrap_or(defaults.icon_url),
            start_url: partial.start_url.unwrap_or(defaults.start_url),
        }
    }
}

impl From<PartialOptions> for DecorateOptions {
    fn from(partial: PartialOptions) -> Self {
        Self::merged(partial)
    }
}

/// Caller-supplied options where any field may be left out.
///
/// Unknown fields are ignored and an explicit `null` counts as "not
/// specified". Both `snake_case` and `camelCase` field names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialOptions {
    #[serde(default, alias = "cssClass", skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,

    #[serde(default, alias = "iconUrl", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(default, alias = "startUrl", skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
}

impl PartialOptions {
    pub fn with_css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    pub fn with_icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    pub fn with_start_url(mut self, start_url: impl Into<String>) -> Self {
        self.start_url = Some(start_url.into());
        self
    }

    /// Layers `other` on top of `self`; fields specified in `other` win.
    pub fn overlay(self, other: PartialOptions) -> Self {
        Self {
            css_class: other.css_class.or(self.css_class),
            icon_url: other.icon_url.or(self.icon_url),
            start_url: other.start_url.or(self.start_url),
        }
    }

    /// Parses a TOML options record.
    pub fn from_toml_str(content: &str) -> Result<Self, OutlinkError> {
        Ok(toml::from_str(content)?)
    }

    /// Parses a JSON options record.
    pub fn from_json_str(content: &str) -> Result<Self, OutlinkError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads an options file.
    ///
    /// Files with a `.json` extension are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, OutlinkError> {
        let content = std::fs::read_to_string(path).map_err(|source| OutlinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        tracing::debug!(path = %path.display(), is_json, "Loading decoration options");

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}
