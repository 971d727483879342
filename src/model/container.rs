//! Containers: pages, slide masters and slide layouts.

use super::{Canvas, DetachError, ElementId, VisualElement};
use serde::{Deserialize, Serialize};

/// Structural role of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// PDF page
    Page,
    /// Presentation slide master
    SlideMaster,
    /// Presentation slide layout
    SlideLayout,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ContainerKind::Page => "page",
            ContainerKind::SlideMaster => "slide_master",
            ContainerKind::SlideLayout => "slide_layout",
        };
        f.write_str(s)
    }
}

/// Kind plus name: how results refer back to a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Container role
    pub kind: ContainerKind,
    /// Display name
    pub name: String,
}

impl std::fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A structural grouping with an ordered, mutable list of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Container role
    pub kind: ContainerKind,

    /// Stable display name (e.g. `Page2`, `SlideMaster1`, `Title Slide`)
    pub name: String,

    /// Position among its siblings (0-indexed)
    pub index: usize,

    /// Own canvas, when it differs from the document canvas
    pub canvas: Option<Canvas>,

    /// Direct child elements in document order
    pub elements: Vec<VisualElement>,

    /// Nested containers (layouts under a master)
    pub children: Vec<Container>,

    /// Why the container could not be enumerated, if it could not
    pub fault: Option<String>,
}

impl Container {
    /// Create an empty container.
    pub fn new(kind: ContainerKind, name: impl Into<String>, index: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            index,
            canvas: None,
            elements: Vec::new(),
            children: Vec::new(),
            fault: None,
        }
    }

    /// Create a container that could not be read.
    pub fn faulted(
        kind: ContainerKind,
        name: impl Into<String>,
        index: usize,
        reason: impl Into<String>,
    ) -> Self {
        let mut container = Self::new(kind, name, index);
        container.fault = Some(reason.into());
        container
    }

    /// Set a container-specific canvas.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = Some(canvas);
        self
    }

    /// Append an element.
    pub fn add_element(&mut self, element: VisualElement) {
        self.elements.push(element);
    }

    /// Append a nested container.
    pub fn add_child(&mut self, child: Container) {
        self.children.push(child);
    }

    /// Kind plus name.
    pub fn reference(&self) -> ContainerRef {
        ContainerRef {
            kind: self.kind,
            name: self.name.clone(),
        }
    }

    /// Canvas used for this container's elements.
    pub fn effective_canvas(&self, document_canvas: Canvas) -> Canvas {
        self.canvas.unwrap_or(document_canvas)
    }

    /// Remove a direct child element, keeping sibling order.
    pub fn detach(&mut self, id: ElementId) -> Result<VisualElement, DetachError> {
        if let Some(pos) = self.elements.iter().position(|e| e.id == id) {
            return Ok(self.elements.remove(pos));
        }
        if self.elements.iter().any(|e| e.contains(id)) {
            return Err(DetachError::ParentMismatch(id.0, self.name.clone()));
        }
        Err(DetachError::NotFound(id.0, self.name.clone()))
    }

    /// Number of direct child elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the container has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
