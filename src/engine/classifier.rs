//! Per-element watermark verdicts.

use super::geometry::{self, NormalizedPosition};
use super::options::EngineConfig;
use super::provenance::ProvenanceMatcher;
use super::size::SizeHeuristic;
use super::trace::DiagnosticTrace;
use crate::model::{Canvas, CanvasUnit, ContainerRef, ElementId, Geometry, KindTag, VisualElement};
use serde::{Deserialize, Serialize};

/// Which rule condemned an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Click target contains the target domain
    LinkMatch,
    /// Small logo in the extreme corner, no usable link
    SizeHeuristic,
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchRule::LinkMatch => f.write_str("link match"),
            MatchRule::SizeHeuristic => f.write_str("size heuristic"),
        }
    }
}

/// Verdict for one examined picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Owning container
    pub container: ContainerRef,
    /// Element id within the loaded document
    pub element_id: ElementId,
    /// Element name
    pub element_name: String,
    /// Element kind
    pub kind: KindTag,
    /// Raw geometry in document units
    pub geometry: Geometry,
    /// Canvas-relative position, `None` when undefined
    pub position: Option<NormalizedPosition>,
    /// Resolved click target
    pub link: Option<String>,
    /// Final verdict
    pub is_watermark: bool,
    /// Rule that produced a positive verdict
    pub rule: Option<MatchRule>,
    /// Link metadata fault, if the link could not be read
    pub metadata_error: Option<String>,
}

/// Composes geometry, provenance and size checks into one verdict.
///
/// Geometry gates everything; a domain match is authoritative; the size
/// heuristic is only a fallback.
#[derive(Debug, Clone)]
pub struct ElementClassifier {
    corner_threshold: f64,
    provenance: ProvenanceMatcher,
    size: SizeHeuristic,
}

impl ElementClassifier {
    /// Build from configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            corner_threshold: config.corner_threshold,
            provenance: ProvenanceMatcher::new(&config.target_domain),
            size: SizeHeuristic::from_config(config),
        }
    }

    /// The provenance matcher in use.
    pub fn provenance(&self) -> &ProvenanceMatcher {
        &self.provenance
    }

    /// Classify one element. Returns `None` for anything that is not a
    /// picture.
    pub fn classify(
        &self,
        element: &VisualElement,
        container: &ContainerRef,
        canvas: Canvas,
        unit: CanvasUnit,
        trace: &mut DiagnosticTrace,
    ) -> Option<ClassificationResult> {
        if !element.is_picture() {
            return None;
        }

        let position = geometry::resolve(&element.geometry, canvas);
        let (link, metadata_error) = match self.provenance.resolve(element) {
            Ok(link) => (link.map(String::from), None),
            Err(e) => {
                trace.warn(&container.name, Some(&element.name), 0, e.to_string());
                (None, Some(e.reason))
            }
        };

        let in_corner = position.is_some_and(|p| p.in_corner(self.corner_threshold));
        let rule = match (in_corner, position, link.as_deref()) {
            (false, _, _) | (_, None, _) => None,
            (true, Some(_), Some(uri)) if self.provenance.matches(uri) => {
                Some(MatchRule::LinkMatch)
            }
            // A readable link to somewhere else vetoes the fallback.
            (true, Some(_), Some(_)) => None,
            (true, Some(pos), None) => self
                .size
                .fires(&element.geometry, &pos, unit)
                .then_some(MatchRule::SizeHeuristic),
        };

        let message = match (rule, position) {
            (Some(rule), Some(p)) => {
                let (l, t) = p.percent();
                format!("watermark ({}) at ({:.1}%, {:.1}%)", rule, l, t)
            }
            (None, Some(p)) if in_corner => {
                let (l, t) = p.percent();
                format!("corner picture at ({:.1}%, {:.1}%) kept", l, t)
            }
            (None, Some(p)) => {
                let (l, t) = p.percent();
                format!("picture at ({:.1}%, {:.1}%) outside corner", l, t)
            }
            (_, None) => "picture without a resolvable position".to_string(),
        };
        trace.note(&container.name, Some(&element.name), 0, message);

        Some(ClassificationResult {
            container: container.clone(),
            element_id: element.id,
            element_name: element.name.clone(),
            kind: element.tag(),
            geometry: element.geometry,
            position,
            link,
            is_watermark: rule.is_some(),
            rule,
            metadata_error,
        })
    }
}
