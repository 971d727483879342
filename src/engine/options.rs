//! Engine configuration.

use crate::error::{Error, Result};
use crate::model::EMU_PER_INCH;

/// Default watermark issuer domain.
pub const DEFAULT_TARGET_DOMAIN: &str = "gamma.app";

/// Default corner threshold: origin within the bottom-right 30% x 30%.
pub const DEFAULT_CORNER_THRESHOLD: f64 = 0.70;

/// Default stricter horizontal threshold for the size heuristic (exclusive).
pub const DEFAULT_STRICT_LEFT: f64 = 0.85;

/// Default stricter vertical threshold for the size heuristic (exclusive).
pub const DEFAULT_STRICT_TOP: f64 = 0.90;

/// Default small-logo width bound, 2 000 000 EMU (about 2.2in).
pub const DEFAULT_LOGO_MAX_WIDTH_IN: f64 = 2_000_000.0 / EMU_PER_INCH;

/// Default small-logo height bound, 600 000 EMU (about 0.66in).
pub const DEFAULT_LOGO_MAX_HEIGHT_IN: f64 = 600_000.0 / EMU_PER_INCH;

/// Default bound on group nesting for diagnostic traversal.
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 32;

/// Options controlling watermark classification.
///
/// A built configuration is never mutated by the engine, so one value can
/// back any number of concurrent calls.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Domain looked for in element links (stored lowercase)
    pub target_domain: String,

    /// Corner threshold `T` in `[0, 1]`
    pub corner_threshold: f64,

    /// Size heuristic: origin must lie beyond this left fraction
    pub strict_left: f64,

    /// Size heuristic: origin must lie beyond this top fraction
    pub strict_top: f64,

    /// Size heuristic: maximum logo width in inches (exclusive)
    pub logo_max_width_in: f64,

    /// Size heuristic: maximum logo height in inches (exclusive)
    pub logo_max_height_in: f64,

    /// Whether the size heuristic runs at all
    pub size_heuristic: bool,

    /// Maximum group nesting walked for diagnostics
    pub max_group_depth: usize,
}

impl EngineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target domain.
    pub fn with_target_domain(mut self, domain: impl Into<String>) -> Self {
        self.target_domain = domain.into().trim().to_lowercase();
        self
    }

    /// Set the corner threshold.
    pub fn with_corner_threshold(mut self, threshold: f64) -> Self {
        self.corner_threshold = threshold;
        self
    }

    /// Set the stricter corner used by the size heuristic.
    pub fn with_strict_corner(mut self, left: f64, top: f64) -> Self {
        self.strict_left = left;
        self.strict_top = top;
        self
    }

    /// Set the small-logo bounds in inches.
    pub fn with_logo_bounds(mut self, max_width_in: f64, max_height_in: f64) -> Self {
        self.logo_max_width_in = max_width_in;
        self.logo_max_height_in = max_height_in;
        self
    }

    /// Enable or disable the size heuristic.
    pub fn with_size_heuristic(mut self, enabled: bool) -> Self {
        self.size_heuristic = enabled;
        self
    }

    /// Set the maximum group depth.
    pub fn with_max_group_depth(mut self, depth: usize) -> Self {
        self.max_group_depth = depth;
        self
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.target_domain.is_empty() {
            return Err(Error::InvalidConfig("target domain is empty".into()));
        }
        for (name, value) in [
            ("corner threshold", self.corner_threshold),
            ("strict left threshold", self.strict_left),
            ("strict top threshold", self.strict_top),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} {} is outside [0, 1]",
                    name, value
                )));
            }
        }
        if !(self.logo_max_width_in > 0.0 && self.logo_max_height_in > 0.0) {
            return Err(Error::InvalidConfig(
                "logo bounds must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_domain: DEFAULT_TARGET_DOMAIN.to_string(),
            corner_threshold: DEFAULT_CORNER_THRESHOLD,
            strict_left: DEFAULT_STRICT_LEFT,
            strict_top: DEFAULT_STRICT_TOP,
            logo_max_width_in: DEFAULT_LOGO_MAX_WIDTH_IN,
            logo_max_height_in: DEFAULT_LOGO_MAX_HEIGHT_IN,
            size_heuristic: true,
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
        }
    }
}
