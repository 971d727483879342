//! Document-level types.

use super::Container;
use crate::detect::DocumentFormat;
use serde::{Deserialize, Serialize};

/// EMUs (English Metric Units) per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// PDF points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Native length unit of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasUnit {
    /// English Metric Units (presentations)
    Emu,
    /// PDF points
    Point,
}

impl CanvasUnit {
    /// Units per inch.
    pub fn per_inch(&self) -> f64 {
        match self {
            CanvasUnit::Emu => EMU_PER_INCH,
            CanvasUnit::Point => POINTS_PER_INCH,
        }
    }

    /// Convert a length in this unit to inches.
    pub fn to_inches(&self, value: f64) -> f64 {
        value / self.per_inch()
    }
}

/// Coordinate space an element position is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width in document units
    pub width: f64,
    /// Height in document units
    pub height: f64,
}

impl Canvas {
    /// Create a canvas.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A canvas with no area; nothing on it is ever classified.
    pub fn empty() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Whether percentages can be computed against this canvas.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// One loaded document: a format, a shared canvas and its containers.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Source format
    pub format: DocumentFormat,

    /// Length unit of every geometry in the document
    pub unit: CanvasUnit,

    /// Shared canvas, overridden per container where a container has its own
    pub canvas: Canvas,

    /// Top-level containers in document order
    pub containers: Vec<Container>,
}

impl Document {
    /// Create an empty document.
    pub fn new(format: DocumentFormat, unit: CanvasUnit, canvas: Canvas) -> Self {
        Self {
            format,
            unit,
            canvas,
            containers: Vec::new(),
        }
    }

    /// Add a top-level container.
    pub fn add_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    /// Get a container by its index path (top-level index, then child indices).
    pub fn container(&self, path: &[usize]) -> Option<&Container> {
        let (first, rest) = path.split_first()?;
        let mut current = self.containers.get(*first)?;
        for idx in rest {
            current = current.children.get(*idx)?;
        }
        Some(current)
    }

    /// Get a mutable container by its index path.
    pub fn container_mut(&mut self, path: &[usize]) -> Option<&mut Container> {
        let (first, rest) = path.split_first()?;
        let mut current = self.containers.get_mut(*first)?;
        for idx in rest {
            current = current.children.get_mut(*idx)?;
        }
        Some(current)
    }

    /// Total number of containers at every nesting level.
    pub fn container_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Container> = self.containers.iter().collect();
        while let Some(c) = stack.pop() {
            count += 1;
            stack.extend(c.children.iter());
        }
        count
    }

    /// Check if the document has no containers.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
