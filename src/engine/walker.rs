//! Document traversal.
//!
//! Containers are visited in document order, each parent before its
//! children (master, then every layout of that master). Only direct
//! children of a container are classified; group contents are walked for
//! the diagnostic trace alone.

use super::classifier::{ClassificationResult, ElementClassifier};
use super::geometry;
use super::report::SkippedContainer;
use super::trace::DiagnosticTrace;
use crate::model::{Canvas, Container, Document, ElementKind, VisualElement};

/// A classified element together with the index path of its container.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// Index path of the owning container (see [`Document::container`])
    pub path: Vec<usize>,
    /// The verdict
    pub result: ClassificationResult,
}

/// Everything one walk produced.
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    /// Classified pictures in traversal order
    pub visits: Vec<Visit>,
    /// Containers that could not be enumerated
    pub skipped: Vec<SkippedContainer>,
}

/// Drives the classifier over a whole document.
#[derive(Debug, Clone)]
pub struct TreeWalker<'c> {
    classifier: &'c ElementClassifier,
    max_depth: usize,
}

impl<'c> TreeWalker<'c> {
    /// Create a walker with a group depth bound for diagnostics.
    pub fn new(classifier: &'c ElementClassifier, max_depth: usize) -> Self {
        Self {
            classifier,
            max_depth,
        }
    }

    /// Visit every container and classify its direct elements.
    pub fn walk(&self, doc: &Document, trace: &mut DiagnosticTrace) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let mut stack: Vec<(Vec<usize>, &Container)> = doc
            .containers
            .iter()
            .enumerate()
            .rev()
            .map(|(i, c)| (vec![i], c))
            .collect();

        while let Some((path, container)) = stack.pop() {
            for (i, child) in container.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child_path, child));
            }

            if let Some(reason) = &container.fault {
                trace.warn(&container.name, None, 0, format!("skipped: {}", reason));
                outcome.skipped.push(SkippedContainer {
                    container: container.reference(),
                    reason: reason.clone(),
                });
                continue;
            }

            let canvas = container.effective_canvas(doc.canvas);
            trace.note(
                &container.name,
                None,
                0,
                format!(
                    "{} with {} elements on {:.0} x {:.0} canvas",
                    container.kind,
                    container.element_count(),
                    canvas.width,
                    canvas.height
                ),
            );

            let reference = container.reference();
            for element in &container.elements {
                if let Some(result) =
                    self.classifier
                        .classify(element, &reference, canvas, doc.unit, trace)
                {
                    outcome.visits.push(Visit {
                        path: path.clone(),
                        result,
                    });
                }
                self.trace_text_links(&container.name, element, 0, trace);
                if matches!(element.kind, ElementKind::Group { .. }) {
                    self.trace_group(&container.name, element, canvas, trace);
                }
            }
        }

        outcome
    }

    /// Walk a group's descendants for the trace only.
    fn trace_group(
        &self,
        container: &str,
        group: &VisualElement,
        canvas: Canvas,
        trace: &mut DiagnosticTrace,
    ) {
        trace.note(
            container,
            Some(&group.name),
            0,
            format!("group with {} children", group.children().len()),
        );

        let mut stack: Vec<(&VisualElement, usize)> =
            group.children().iter().rev().map(|c| (c, 1)).collect();
        while let Some((element, depth)) = stack.pop() {
            if depth > self.max_depth {
                trace.warn(
                    container,
                    Some(&element.name),
                    depth,
                    format!("group nesting deeper than {}; not walked", self.max_depth),
                );
                continue;
            }

            let position = geometry::resolve(&element.geometry, canvas)
                .map(|p| {
                    let (l, t) = p.percent();
                    format!(" at ({:.1}%, {:.1}%)", l, t)
                })
                .unwrap_or_default();

            match &element.kind {
                ElementKind::Picture { .. } => {
                    let link = match self.classifier.provenance().resolve(element) {
                        Ok(Some(uri)) => format!(" -> {}", uri),
                        Ok(None) => String::new(),
                        Err(e) => format!(" (link unreadable: {})", e.reason),
                    };
                    trace.note(
                        container,
                        Some(&element.name),
                        depth,
                        format!("nested picture{}{}; not removal-eligible", position, link),
                    );
                }
                ElementKind::Group { children } => {
                    trace.note(
                        container,
                        Some(&element.name),
                        depth,
                        format!("nested group{} with {} children", position, children.len()),
                    );
                    stack.extend(children.iter().rev().map(|c| (c, depth + 1)));
                }
                ElementKind::Other => {
                    trace.note(
                        container,
                        Some(&element.name),
                        depth,
                        format!("nested shape{}", position),
                    );
                }
            }
            self.trace_text_links(container, element, depth, trace);
        }
    }

    fn trace_text_links(
        &self,
        container: &str,
        element: &VisualElement,
        depth: usize,
        trace: &mut DiagnosticTrace,
    ) {
        for uri in &element.text_links {
            let flag = if self.classifier.provenance().matches(uri) {
                " (target domain)"
            } else {
                ""
            };
            trace.note(
                container,
                Some(&element.name),
                depth,
                format!("text hyperlink {}{}", uri, flag),
            );
        }
    }
}
