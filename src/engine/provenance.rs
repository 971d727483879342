//! Link provenance: does an element point at the watermark issuer?

use crate::error::ElementMetadataError;
use crate::model::{ElementKind, LinkTarget, VisualElement};

/// Matches element click targets against a target domain.
#[derive(Debug, Clone)]
pub struct ProvenanceMatcher {
    domain: String,
}

impl ProvenanceMatcher {
    /// Create a matcher for `domain` (matched case-insensitively).
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_lowercase(),
        }
    }

    /// The domain this matcher looks for.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Resolve the element's own click target.
    ///
    /// Text-run links are ignored here. Groups never inherit a link.
    pub fn resolve<'e>(
        &self,
        element: &'e VisualElement,
    ) -> Result<Option<&'e str>, ElementMetadataError> {
        match &element.kind {
            ElementKind::Picture { link } => match link {
                LinkTarget::None => Ok(None),
                LinkTarget::Uri(uri) => Ok(Some(uri.as_str())),
                LinkTarget::Unresolved(reason) => Err(ElementMetadataError {
                    element: element.name.clone(),
                    reason: reason.clone(),
                }),
            },
            ElementKind::Group { .. } | ElementKind::Other => Ok(None),
        }
    }

    /// Substring containment of the domain in the full URI.
    ///
    /// Not a host-boundary match: `https://example.com/gamma.app` matches too.
    pub fn matches(&self, uri: &str) -> bool {
        uri.to_lowercase().contains(&self.domain)
    }
}
