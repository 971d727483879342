//! Visual elements: the nodes a container owns.

use serde::{Deserialize, Serialize};

/// Identity of an element, unique within one loaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position and size in canvas units. Any component may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Distance of the left edge from the canvas left edge
    pub left: Option<f64>,
    /// Distance of the top edge from the canvas top edge
    pub top: Option<f64>,
    /// Width
    pub width: Option<f64>,
    /// Height
    pub height: Option<f64>,
}

impl Geometry {
    /// Geometry with every component present.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Geometry with no position at all.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// A link slot as read from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LinkTarget {
    /// No click target on the element.
    #[default]
    None,
    /// A resolved URI.
    Uri(String),
    /// A target exists but could not be read; carries the reason.
    Unresolved(String),
}

/// Where an element lives in the serialized document.
///
/// Serializers use this to drop detached elements from the output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeAnchor {
    /// Built in memory; nothing to reconcile.
    #[default]
    Detached,
    /// Byte range of the element inside its XML part.
    XmlSpan {
        /// Offset of the opening `<`
        start: usize,
        /// Offset just past the closing tag
        end: usize,
    },
    /// A `Do` operator in a page content stream.
    ContentOperation {
        /// Index of the operator in the decoded content
        index: usize,
        /// Indices into the page `/Annots` array of overlapping link annotations
        annotations: Vec<usize>,
    },
    /// Child of a group; never removed on its own.
    Nested,
}

/// Element variants. Only pictures carry a link and only pictures are
/// watermark candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Raster or vector picture.
    Picture {
        /// Direct click target of the picture itself
        link: LinkTarget,
    },
    /// Group of nested elements.
    Group {
        /// Children, in document order
        children: Vec<VisualElement>,
    },
    /// Any other shape.
    Other,
}

/// Short label for an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindTag {
    /// Picture
    Picture,
    /// Group
    Group,
    /// Other
    Other,
}

impl std::fmt::Display for KindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            KindTag::Picture => "picture",
            KindTag::Group => "group",
            KindTag::Other => "other",
        };
        f.write_str(s)
    }
}

/// A leaf or group node owned by exactly one container or group.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualElement {
    /// Document-unique id
    pub id: ElementId,

    /// Display name (shape name, XObject name)
    pub name: String,

    /// Variant and variant data
    pub kind: ElementKind,

    /// Position and size in canvas units
    pub geometry: Geometry,

    /// Hyperlinks on text runs inside the element, for diagnostics only
    pub text_links: Vec<String>,

    /// Location in the serialized document
    pub anchor: NodeAnchor,
}

impl VisualElement {
    /// Create an element of the given kind.
    pub fn new(
        id: ElementId,
        name: impl Into<String>,
        kind: ElementKind,
        geometry: Geometry,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            geometry,
            text_links: Vec::new(),
            anchor: NodeAnchor::Detached,
        }
    }

    /// Create a picture.
    pub fn picture(
        id: ElementId,
        name: impl Into<String>,
        geometry: Geometry,
        link: LinkTarget,
    ) -> Self {
        Self::new(id, name, ElementKind::Picture { link }, geometry)
    }

    /// Create a group.
    pub fn group(
        id: ElementId,
        name: impl Into<String>,
        geometry: Geometry,
        children: Vec<VisualElement>,
    ) -> Self {
        Self::new(id, name, ElementKind::Group { children }, geometry)
    }

    /// Create a non-picture, non-group element.
    pub fn other(id: ElementId, name: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(id, name, ElementKind::Other, geometry)
    }

    /// Set the anchor.
    pub fn with_anchor(mut self, anchor: NodeAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Label of the element kind.
    pub fn tag(&self) -> KindTag {
        match self.kind {
            ElementKind::Picture { .. } => KindTag::Picture,
            ElementKind::Group { .. } => KindTag::Group,
            ElementKind::Other => KindTag::Other,
        }
    }

    /// Check if this element is a picture.
    pub fn is_picture(&self) -> bool {
        matches!(self.kind, ElementKind::Picture { .. })
    }

    /// Children of a group, empty for every other kind.
    pub fn children(&self) -> &[VisualElement] {
        match &self.kind {
            ElementKind::Group { children } => children,
            _ => &[],
        }
    }

    /// Mutable children of a group.
    pub fn children_mut(&mut self) -> Option<&mut Vec<VisualElement>> {
        match &mut self.kind {
            ElementKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// Whether `id` names this element or anything below it.
    pub fn contains(&self, id: ElementId) -> bool {
        let mut stack = vec![self];
        while let Some(el) = stack.pop() {
            if el.id == id {
                return true;
            }
            stack.extend(el.children());
        }
        false
    }
}
