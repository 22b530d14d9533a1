//! Command-line configuration for the `zoompane` binary.
//!
//! The binary loads a pyramid descriptor and reports either the pyramid
//! itself (`inspect`) or the exact tile set a viewport would materialize
//! for a given frame and zoom (`plan`).
//!
//! # Example
//!
//! ```text
//! zoompane inspect --path-base https://tiles.example.com/folio-12r
//! zoompane plan --api https://tiles.example.com/api --image-id folio-12r \
//!     --frame-width 800 --frame-height 600 --ratio 0.25 --center 4000,3000
//! ```
//!
//! # Environment Variables
//!
//! - `ZOOMPANE_PATH_BASE` - Base location of a path-templated pyramid
//! - `ZOOMPANE_API` - Query API endpoint
//! - `ZOOMPANE_IMAGE_ID` - Image id for the query API
//! - `ZOOMPANE_FRAME_WIDTH` - Frame width in pixels (default: 600)
//! - `ZOOMPANE_FRAME_HEIGHT` - Frame height in pixels (default: 400)

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::ExtensionError;
use crate::source::{PathTemplateScheme, QueryApiScheme, UrlScheme};
use crate::viewport::{
    ViewportConfig, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_MAX_RATIO,
    DEFAULT_MIN_RATIO,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// zoompane - tile visibility planner for pyramid-tiled images.
#[derive(Parser, Debug, Clone)]
#[command(name = "zoompane")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a pyramid descriptor and print its levels.
    Inspect(InspectConfig),

    /// Print the tiles a viewport would materialize.
    Plan(PlanConfig),
}

/// Output format for command results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,

    /// JSON document
    Json,
}

// =============================================================================
// Source Selection
// =============================================================================

/// Where the pyramid lives.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Base location of a path-templated pyramid (`{base}/info.json`).
    ///
    /// May be an http(s) URL or a local directory.
    #[arg(long, env = "ZOOMPANE_PATH_BASE", conflicts_with = "api")]
    pub path_base: Option<String>,

    /// Query API endpoint (`{api}?id={id}&info`).
    #[arg(long, env = "ZOOMPANE_API", requires = "image_id")]
    pub api: Option<String>,

    /// Image id for the query API.
    #[arg(long, env = "ZOOMPANE_IMAGE_ID")]
    pub image_id: Option<String>,
}

impl SourceArgs {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.path_base, &self.api) {
            (Some(_), Some(_)) => Err("--path-base and --api are mutually exclusive".to_string()),
            (None, None) => Err(
                "No pyramid given. Set --path-base (ZOOMPANE_PATH_BASE) or --api with --image-id"
                    .to_string(),
            ),
            (Some(base), None) if base.is_empty() => Err("--path-base must not be empty".to_string()),
            (None, Some(_)) if self.image_id.as_deref().unwrap_or("").is_empty() => {
                Err("--api requires --image-id (ZOOMPANE_IMAGE_ID)".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Build the URL scheme for the selected pyramid.
    pub fn build_scheme(&self) -> Result<Box<dyn UrlScheme>, ExtensionError> {
        match (&self.path_base, &self.api) {
            (Some(base), _) => Ok(Box::new(PathTemplateScheme::new(base.as_str())?)),
            (None, Some(api)) => Ok(Box::new(QueryApiScheme::new(
                api.as_str(),
                self.image_id.clone().unwrap_or_default(),
            )?)),
            (None, None) => Err(ExtensionError::InvalidExtension {
                reason: "no pyramid location given".to_string(),
            }),
        }
    }

    /// Id used for the source in tile ids and logs.
    pub fn source_id(&self) -> String {
        if let Some(id) = &self.image_id {
            return id.clone();
        }
        self.path_base
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
            .and_then(|base| base.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("image")
            .to_string()
    }
}

// =============================================================================
// Inspect Command
// =============================================================================

/// Configuration for the inspect subcommand.
#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl InspectConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()
    }
}

// =============================================================================
// Plan Command
// =============================================================================

/// Configuration for the plan subcommand.
#[derive(Args, Debug, Clone)]
pub struct PlanConfig {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Frame width in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH, env = "ZOOMPANE_FRAME_WIDTH")]
    pub frame_width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT, env = "ZOOMPANE_FRAME_HEIGHT")]
    pub frame_height: u32,

    /// Zoom ratio (1.0 = full resolution).
    #[arg(long, conflicts_with_all = ["level", "fit"])]
    pub ratio: Option<f64>,

    /// Show a stored level at its native ratio.
    #[arg(long, conflicts_with = "fit")]
    pub level: Option<usize>,

    /// Zoom so the whole image fits the frame.
    #[arg(long, default_value_t = false)]
    pub fit: bool,

    /// Center the frame on this full-resolution point, as `X,Y`.
    #[arg(long, allow_hyphen_values = true)]
    pub center: Option<String>,

    /// Lower zoom bound.
    #[arg(long, default_value_t = DEFAULT_MIN_RATIO)]
    pub min_ratio: f64,

    /// Upper zoom bound.
    #[arg(long, default_value_t = DEFAULT_MAX_RATIO)]
    pub max_ratio: f64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl PlanConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.source.validate()?;

        if self.frame_width == 0 || self.frame_height == 0 {
            return Err("frame dimensions must be greater than 0".to_string());
        }

        if let Some(ratio) = self.ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(format!("ratio must be a positive number, got {}", ratio));
            }
        }

        self.parse_center()?;
        self.viewport_config().validate()
    }

    /// Parse `--center`.
    pub fn parse_center(&self) -> Result<Option<(f64, f64)>, String> {
        let Some(raw) = self.center.as_deref() else {
            return Ok(None);
        };

        let (x, y) = raw
            .split_once(',')
            .ok_or_else(|| format!("Invalid center '{}': expected X,Y", raw))?;
        let x: f64 = x
            .trim()
            .parse()
            .map_err(|_| format!("Invalid center x '{}'", x.trim()))?;
        let y: f64 = y
            .trim()
            .parse()
            .map_err(|_| format!("Invalid center y '{}'", y.trim()))?;

        if x < 0.0 || y < 0.0 {
            return Err(format!("Center must not be negative, got {},{}", x, y));
        }
        Ok(Some((x, y)))
    }

    /// Viewport settings for this plan.
    ///
    /// Content starts at one pixel so it grows to exactly the image size.
    pub fn viewport_config(&self) -> ViewportConfig {
        ViewportConfig {
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            content_width: 1,
            content_height: 1,
            min_ratio: self.min_ratio,
            max_ratio: self.max_ratio,
            ratio: self.max_ratio,
            ..ViewportConfig::default()
        }
    }
}
