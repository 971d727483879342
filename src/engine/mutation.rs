//! Detaching condemned elements from their containers.

use crate::error::DetachError;
use crate::model::{Container, ElementId, VisualElement};

/// Result of detaching elements from one container.
#[derive(Debug, Clone, Default)]
pub struct Detachment {
    /// Elements actually removed, in the order they were detached
    pub removed: Vec<VisualElement>,
    /// Per-element failures, recovered
    pub failures: Vec<DetachError>,
}

impl Detachment {
    /// Number of elements actually removed.
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Removes elements from a container's child list.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationEngine;

impl MutationEngine {
    /// Detach each condemned element from `container`.
    ///
    /// A failure on one element is logged and the rest are still processed.
    /// Sibling order and other containers are untouched.
    pub fn remove(&self, container: &mut Container, condemned: &[ElementId]) -> Detachment {
        let mut detachment = Detachment::default();
        for id in condemned {
            match container.detach(*id) {
                Ok(element) => {
                    log::info!("[{}] removed {} ({})", container.name, element.name, id);
                    detachment.removed.push(element);
                }
                Err(e) => {
                    log::error!("[{}] failed to remove element: {}", container.name, e);
                    detachment.failures.push(e);
                }
            }
        }
        detachment
    }
}
