//! Configuration for the reprojection engine.

use serde::{Deserialize, Serialize};

/// Precision mode for the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    /// Approximate the inverse transform with a control-point mesh
    /// (recommended; bounded sub-pixel error).
    #[default]
    Approximate,
    /// Transform every destination pixel exactly.
    Exact,
}

impl Precision {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "exact" => Self::Exact,
            _ => Self::Approximate,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approximate => write!(f, "approximate"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// Configuration for the projector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Maximum allowed deviation at a mesh validation sample, in
    /// destination pixels.
    pub tolerance_px: f64,

    /// Spacing of the initial anchor mesh, in destination pixels.
    pub anchor_spacing: usize,

    /// Maximum cell subdivision depth before a cell falls back to exact
    /// per-pixel transforms.
    pub max_depth: usize,

    /// Precision mode.
    pub precision: Precision,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            tolerance_px: 0.25,
            anchor_spacing: 64,
            max_depth: 4,
            precision: Precision::Approximate,
        }
    }
}

impl ProjectorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PROJECTOR_TOLERANCE_PX") {
            if let Ok(tolerance) = val.parse() {
                config.tolerance_px = tolerance;
            }
        }

        if let Ok(val) = std::env::var("PROJECTOR_ANCHOR_SPACING") {
            if let Ok(spacing) = val.parse() {
                config.anchor_spacing = spacing;
            }
        }

        if let Ok(val) = std::env::var("PROJECTOR_MAX_DEPTH") {
            if let Ok(depth) = val.parse() {
                config.max_depth = depth;
            }
        }

        if let Ok(val) = std::env::var("PROJECTOR_PRECISION") {
            config.precision = Precision::from_str(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tolerance_px > 0.0) {
            return Err("tolerance_px must be > 0".to_string());
        }

        if self.anchor_spacing < 2 {
            return Err("anchor_spacing must be >= 2".to_string());
        }

        if self.max_depth > 16 {
            return Err("max_depth must be <= 16".to_string());
        }

        Ok(())
    }
}
