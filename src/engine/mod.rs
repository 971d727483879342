//! Watermark classification and tree-mutation engine.
//!
//! The engine works on the format-independent [`Document`] model only.
//! Detection runs the [`TreeWalker`] with the [`ElementClassifier`];
//! cleaning additionally hands condemned elements to the
//! [`MutationEngine`] and folds the outcome with the [`ReportAggregator`].
//! Loading and saving belong to the format parsers.
//!
//! # Example
//!
//! ```
//! use unmark::engine::{DiagnosticTrace, Engine, EngineConfig};
//! use unmark::model::{
//!     Canvas, CanvasUnit, Container, ContainerKind, Document, ElementId, Geometry, LinkTarget,
//!     VisualElement,
//! };
//! use unmark::DocumentFormat;
//!
//! let mut doc = Document::new(DocumentFormat::Pdf, CanvasUnit::Point, Canvas::new(612.0, 792.0));
//! let mut page = Container::new(ContainerKind::Page, "Page1", 0);
//! page.add_element(VisualElement::picture(
//!     ElementId(1),
//!     "Im0",
//!     Geometry::new(560.0, 760.0, 40.0, 12.0),
//!     LinkTarget::Uri("https://gamma.app".into()),
//! ));
//! doc.add_container(page);
//!
//! let engine = Engine::new(EngineConfig::default()).unwrap();
//! let report = engine.clean(&mut doc, &mut DiagnosticTrace::disabled());
//! assert_eq!(report.watermarks_removed, 1);
//! assert!(doc.containers[0].is_empty());
//! ```

mod classifier;
pub mod geometry;
mod mutation;
mod options;
mod provenance;
mod report;
mod size;
mod trace;
mod walker;

pub use classifier::{ClassificationResult, ElementClassifier, MatchRule};
pub use geometry::NormalizedPosition;
pub use mutation::{Detachment, MutationEngine};
pub use options::{
    EngineConfig, DEFAULT_CORNER_THRESHOLD, DEFAULT_LOGO_MAX_HEIGHT_IN, DEFAULT_LOGO_MAX_WIDTH_IN,
    DEFAULT_MAX_GROUP_DEPTH, DEFAULT_STRICT_LEFT, DEFAULT_STRICT_TOP, DEFAULT_TARGET_DOMAIN,
};
pub use provenance::ProvenanceMatcher;
pub use report::{
    ContainerTally, DetectionReport, RemovalReport, ReportAggregator, SkippedContainer,
};
pub use size::SizeHeuristic;
pub use trace::{DiagnosticTrace, TraceEvent, TraceLevel};
pub use walker::{TreeWalker, Visit, WalkOutcome};

use crate::error::Result;
use crate::model::{Document, ElementId};

/// Immutable watermark engine. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    classifier: ElementClassifier,
}

impl Engine {
    /// Create an engine from a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let classifier = ElementClassifier::new(&config);
        Ok(Self { config, classifier })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn walker(&self) -> TreeWalker<'_> {
        TreeWalker::new(&self.classifier, self.config.max_group_depth)
    }

    /// Classify every picture in the document without changing it.
    pub fn detect(&self, doc: &Document, trace: &mut DiagnosticTrace) -> DetectionReport {
        let outcome = self.walker().walk(doc, trace);
        let report = DetectionReport {
            format: doc.format,
            canvas: doc.canvas,
            results: outcome.visits.into_iter().map(|v| v.result).collect(),
            skipped: outcome.skipped,
        };

        log::info!(
            "{} document: {} pictures examined, {} watermarks ({})",
            doc.format,
            report.results.len(),
            report.watermark_count(),
            self.config.target_domain
        );
        report
    }

    /// Classify and detach every watermark.
    ///
    /// Never fails: unreadable containers and failed detachments only lower
    /// the counts. Serialization is the caller's job.
    pub fn clean(&self, doc: &mut Document, trace: &mut DiagnosticTrace) -> RemovalReport {
        let outcome = self.walker().walk(doc, trace);

        // Group condemned ids by container, keeping traversal order.
        let mut plan: Vec<(Vec<usize>, Vec<ElementId>)> = Vec::new();
        for visit in outcome.visits.iter().filter(|v| v.result.is_watermark) {
            match plan.iter_mut().find(|(path, _)| *path == visit.path) {
                Some((_, ids)) => ids.push(visit.result.element_id),
                None => plan.push((visit.path.clone(), vec![visit.result.element_id])),
            }
        }

        let mut aggregator = ReportAggregator::new(doc.format);
        aggregator.skipped(outcome.skipped.len());
        for (path, ids) in plan {
            let Some(container) = doc.container_mut(&path) else {
                log::error!("container path {:?} vanished during removal", path);
                continue;
            };
            let detachment = MutationEngine.remove(container, &ids);
            aggregator.record(container.reference(), ids.len(), &detachment);
        }

        let report = aggregator.finish();
        log::info!(
            "Removed {} watermarks (masters cleaned: {}, layouts cleaned: {}, pages cleaned: {})",
            report.watermarks_removed,
            report.masters_cleaned,
            report.layouts_cleaned,
            report.pages_cleaned
        );
        report
    }
}

impl Default for Engine {
    fn default() -> Self {
        let config = EngineConfig::default();
        let classifier = ElementClassifier::new(&config);
        Self { config, classifier }
    }
}
