//! Canvas-relative positions.

use crate::model::{Canvas, Geometry};
use serde::{Deserialize, Serialize};

/// Element edges as fractions of the canvas (0.0 = left/top edge, 1.0 =
/// right/bottom edge). Values above 1.0 mean the element overflows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Right edge (falls back to `left` when width is absent or zero)
    pub right: f64,
    /// Bottom edge (falls back to `top` when height is absent or zero)
    pub bottom: f64,
}

impl NormalizedPosition {
    /// Whether the origin lies in the bottom-right region `[t, ..] x [t, ..]`.
    ///
    /// Only the origin is tested; the element may extend past the canvas.
    pub fn in_corner(&self, threshold: f64) -> bool {
        self.left >= threshold && self.top >= threshold
    }

    /// Left and top as percentages, for display.
    pub fn percent(&self) -> (f64, f64) {
        (self.left * 100.0, self.top * 100.0)
    }
}

/// Resolve an element's geometry against its canvas.
///
/// Returns `None` when the canvas has no area or the element has no
/// position; such an element is never in a corner.
pub fn resolve(geometry: &Geometry, canvas: Canvas) -> Option<NormalizedPosition> {
    if !canvas.is_usable() {
        return None;
    }
    let (left, top) = (geometry.left?, geometry.top?);

    let left_pct = left / canvas.width;
    let top_pct = top / canvas.height;
    let right_pct = match geometry.width {
        Some(w) if w != 0.0 => (left + w) / canvas.width,
        _ => left_pct,
    };
    let bottom_pct = match geometry.height {
        Some(h) if h != 0.0 => (top + h) / canvas.height,
        _ => top_pct,
    };

    Some(NormalizedPosition {
        left: left_pct,
        top: top_pct,
        right: right_pct,
        bottom: bottom_pct,
    })
}

/// Corner membership of an element, `false` when its position is undefined.
pub fn in_corner(geometry: &Geometry, canvas: Canvas, threshold: f64) -> bool {
    resolve(geometry, canvas).is_some_and(|p| p.in_corner(threshold))
}
