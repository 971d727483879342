//! Document model shared by both container formats.
//!
//! A [`Document`] owns an ordered list of [`Container`]s (pages, or slide
//! masters with their layouts). Each container owns an ordered list of
//! [`VisualElement`]s. Format parsers build this model; the engine
//! classifies and detaches elements; format serializers write what is
//! left back out.

mod container;
mod document;
mod element;

pub use crate::error::DetachError;
pub use container::{Container, ContainerKind, ContainerRef};
pub use document::{Canvas, CanvasUnit, Document, EMU_PER_INCH, POINTS_PER_INCH};
pub use element::{
    ElementId, ElementKind, Geometry, KindTag, LinkTarget, NodeAnchor, VisualElement,
};
