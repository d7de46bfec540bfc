//! Renderer configuration
//!
//! The level-of-detail break points and divisors encode a quality/
//! performance trade-off rather than a correctness rule, so they ship as
//! configuration with the empirically chosen defaults instead of being
//! hard-coded in the pipeline.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Level-of-detail policy for curved primitives
///
/// Detail selection is a step function of projected on-screen radius:
/// below `low_pixel_radius` the requested segment counts are divided by
/// `low_divisor`, below `medium_pixel_radius` by `medium_divisor`, and
/// above that the full requested counts are used. Divided counts are
/// floor-clamped to the tessellation minimums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LodConfig {
    /// Projected radius (pixels) below which the lowest detail tier applies
    pub low_pixel_radius: f32,

    /// Projected radius (pixels) below which the medium detail tier applies
    pub medium_pixel_radius: f32,

    /// Segment-count divisor for the lowest detail tier
    pub low_divisor: u32,

    /// Segment-count divisor for the medium detail tier
    pub medium_divisor: u32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            low_pixel_radius: 4.0,
            medium_pixel_radius: 12.0,
            low_divisor: 4,
            medium_divisor: 2,
        }
    }
}

/// Top-level renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Level-of-detail policy for spheres and cylinders
    pub lod: LodConfig,

    /// Initial vertex capacity reserved for the shared triangle batch
    pub batch_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            lod: LodConfig::default(),
            batch_capacity: 4096,
        }
    }
}

impl Config for RendererConfig {}
