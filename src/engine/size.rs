//! Fallback classifier for corner pictures without a readable link.

use super::geometry::NormalizedPosition;
use super::options::EngineConfig;
use crate::model::{CanvasUnit, Geometry};

/// Small-logo-in-the-extreme-corner test.
#[derive(Debug, Clone)]
pub struct SizeHeuristic {
    enabled: bool,
    strict_left: f64,
    strict_top: f64,
    max_width_in: f64,
    max_height_in: f64,
}

impl SizeHeuristic {
    /// Build from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            enabled: config.size_heuristic,
            strict_left: config.strict_left,
            strict_top: config.strict_top,
            max_width_in: config.logo_max_width_in,
            max_height_in: config.logo_max_height_in,
        }
    }

    /// Whether the heuristic fires.
    ///
    /// Requires both absolute dimensions strictly below the logo bounds and
    /// the origin strictly beyond the strict corner. An element with an
    /// unknown size never fires.
    pub fn fires(
        &self,
        geometry: &Geometry,
        position: &NormalizedPosition,
        unit: CanvasUnit,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        let (Some(width), Some(height)) = (geometry.width, geometry.height) else {
            return false;
        };
        let small = unit.to_inches(width) < self.max_width_in
            && unit.to_inches(height) < self.max_height_in;
        small && position.left > self.strict_left && position.top > self.strict_top
    }
}
