//! URL schemes for tile servers.
//!
//! A [`UrlScheme`] knows how one family of tile servers lays out its
//! descriptor and tile URLs. Two schemes are provided:
//!
//! | Scheme                 | Descriptor                    | Tile                                   |
//! |------------------------|-------------------------------|----------------------------------------|
//! | [`PathTemplateScheme`] | `{base}/info.json`            | `{base}/{level}/{col}-{row}.{ext}`     |
//! | [`QueryApiScheme`]     | `{api}?id={id}&info`          | `{api}?id={id}&l={level}&r={row}&c={col}` |

use std::fmt;

use url::Url;

use crate::error::ExtensionError;
use crate::format::Descriptor;

/// Tile extension used until a descriptor says otherwise.
pub const DEFAULT_EXTENSION: &str = "jpeg";

/// Addressing strategy plugged into a pyramid source.
pub trait UrlScheme: Send + Sync + fmt::Debug {
    /// Location of the pyramid descriptor.
    fn config_url(&self) -> String;

    /// Location of one tile. Coordinates are not range-checked here.
    fn tile_url(&self, row: u32, col: u32, level: usize) -> String;

    /// Hook to pick up scheme-specific settings from a freshly parsed descriptor.
    fn on_descriptor_parsed(&mut self, _descriptor: &Descriptor) {}
}

fn check_url(value: &str, what: &str) -> Result<(), ExtensionError> {
    if value.contains("://") {
        Url::parse(value).map_err(|e| ExtensionError::InvalidExtension {
            reason: format!("{} is not a valid URL: {}", what, e),
        })?;
    }
    Ok(())
}

// =============================================================================
// Path template
// =============================================================================

/// Static file layout: one directory per level, `{col}-{row}.{ext}` per tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplateScheme {
    base: String,
    extension: String,
}

impl PathTemplateScheme {
    pub fn new(base: impl Into<String>) -> Result<Self, ExtensionError> {
        let base = base.into();
        let base = base.trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(ExtensionError::InvalidExtension {
                reason: "path base must not be empty".to_string(),
            });
        }
        check_url(&base, "path base")?;

        Ok(Self {
            base,
            extension: DEFAULT_EXTENSION.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl UrlScheme for PathTemplateScheme {
    fn config_url(&self) -> String {
        format!("{}/info.json", self.base)
    }

    fn tile_url(&self, row: u32, col: u32, level: usize) -> String {
        format!("{}/{}/{}-{}.{}", self.base, level, col, row, self.extension)
    }

    fn on_descriptor_parsed(&mut self, descriptor: &Descriptor) {
        if let Some(ext) = descriptor.extension.as_deref() {
            let ext = ext.trim_start_matches('.');
            if !ext.is_empty() {
                self.extension = ext.to_string();
            }
        }
    }
}

// =============================================================================
// Query API
// =============================================================================

/// Dynamic tile service addressed by query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryApiScheme {
    api: String,
    id: String,
}

impl QueryApiScheme {
    pub fn new(api: impl Into<String>, id: impl Into<String>) -> Result<Self, ExtensionError> {
        let api = api.into();
        let id = id.into();

        if api.is_empty() {
            return Err(ExtensionError::InvalidExtension {
                reason: "API endpoint must not be empty".to_string(),
            });
        }
        if id.is_empty() {
            return Err(ExtensionError::InvalidExtension {
                reason: "image id must not be empty".to_string(),
            });
        }
        check_url(&api, "API endpoint")?;

        Ok(Self { api, id })
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn query_prefix(&self) -> String {
        let separator = if self.api.contains('?') { '&' } else { '?' };
        format!(
            "{}{}id={}",
            self.api,
            separator,
            urlencoding::encode(&self.id)
        )
    }
}

impl UrlScheme for QueryApiScheme {
    fn config_url(&self) -> String {
        format!("{}&info", self.query_prefix())
    }

    fn tile_url(&self, row: u32, col: u32, level: usize) -> String {
        format!("{}&l={}&r={}&c={}", self.query_prefix(), level, row, col)
    }
}
