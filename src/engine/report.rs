//! Detection and removal reports.

use super::classifier::ClassificationResult;
use super::mutation::Detachment;
use crate::detect::DocumentFormat;
use crate::error::Result;
use crate::model::{Canvas, ContainerKind, ContainerRef, NodeAnchor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A container the walk could not enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedContainer {
    /// The container
    pub container: ContainerRef,
    /// Why it was skipped
    pub reason: String,
}

/// Output of a detection call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Source format
    pub format: DocumentFormat,
    /// Document canvas (pages may override it)
    pub canvas: Canvas,
    /// Every examined picture, in traversal order
    pub results: Vec<ClassificationResult>,
    /// Containers that could not be read
    pub skipped: Vec<SkippedContainer>,
}

impl DetectionReport {
    /// Results classified as watermarks.
    pub fn watermarks(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.results.iter().filter(|r| r.is_watermark)
    }

    /// Number of watermarks found.
    pub fn watermark_count(&self) -> usize {
        self.watermarks().count()
    }

    /// Whether any watermark was found.
    pub fn has_watermarks(&self) -> bool {
        self.results.iter().any(|r| r.is_watermark)
    }
}

/// Removal tally for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerTally {
    /// The container
    pub container: ContainerRef,
    /// Elements condemned
    pub attempted: usize,
    /// Elements actually detached
    pub removed: usize,
    /// Companion link annotations dropped with the removed elements
    pub links_removed: usize,
}

/// Terminal value of one removal call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalReport {
    /// Whether a cleaned document was produced
    pub success: bool,
    /// Source format, when it was known
    pub format: Option<DocumentFormat>,
    /// Total elements removed (sum of `containers[].removed`)
    pub watermarks_removed: usize,
    /// Slide masters with at least one removal
    pub masters_cleaned: usize,
    /// Slide layouts with at least one removal
    pub layouts_cleaned: usize,
    /// Pages with at least one removal
    pub pages_cleaned: usize,
    /// Link annotations removed together with pictures
    pub links_removed: usize,
    /// Condemned elements that could not be detached
    pub detach_failures: usize,
    /// Containers that could not be read
    pub containers_skipped: usize,
    /// Containers with at least one condemned element
    pub containers: Vec<ContainerTally>,
    /// Where the cleaned document was written
    pub output: Option<PathBuf>,
    /// When the call finished
    pub finished_at: DateTime<Utc>,
    /// Failure message of an unsuccessful call
    pub error: Option<String>,
}

impl RemovalReport {
    /// A report for a call that failed outright.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            format: None,
            watermarks_removed: 0,
            masters_cleaned: 0,
            layouts_cleaned: 0,
            pages_cleaned: 0,
            links_removed: 0,
            detach_failures: 0,
            containers_skipped: 0,
            containers: Vec::new(),
            output: None,
            finished_at: Utc::now(),
            error: Some(format!("Error removing watermarks: {}", error)),
        }
    }

    /// Fold a hard failure into a report.
    pub fn from_result(result: Result<RemovalReport>) -> Self {
        result.unwrap_or_else(|e| Self::failed(e))
    }

    /// Sum of per-container removals.
    pub fn container_total(&self) -> usize {
        self.containers.iter().map(|c| c.removed).sum()
    }
}

/// Folds per-container detachments into a [`RemovalReport`].
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    format: DocumentFormat,
    containers: Vec<ContainerTally>,
    detach_failures: usize,
    skipped: usize,
}

impl ReportAggregator {
    /// Start aggregating for a document format.
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            containers: Vec::new(),
            detach_failures: 0,
            skipped: 0,
        }
    }

    /// Record the outcome for one container.
    pub fn record(&mut self, container: ContainerRef, attempted: usize, detachment: &Detachment) {
        let annotations: BTreeSet<usize> = detachment
            .removed
            .iter()
            .filter_map(|e| match &e.anchor {
                NodeAnchor::ContentOperation { annotations, .. } => {
                    Some(annotations.iter().copied())
                }
                _ => None,
            })
            .flatten()
            .collect();

        self.detach_failures += detachment.failures.len();
        self.containers.push(ContainerTally {
            container,
            attempted,
            removed: detachment.removed_count(),
            links_removed: annotations.len(),
        });
    }

    /// Record containers that were skipped.
    pub fn skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Build the report. `output` is filled in by the caller after writing.
    pub fn finish(self) -> RemovalReport {
        let cleaned = |kind: ContainerKind| {
            self.containers
                .iter()
                .filter(|t| t.container.kind == kind && t.removed > 0)
                .count()
        };
        let masters_cleaned = cleaned(ContainerKind::SlideMaster);
        let layouts_cleaned = cleaned(ContainerKind::SlideLayout);
        let pages_cleaned = cleaned(ContainerKind::Page);

        RemovalReport {
            success: true,
            format: Some(self.format),
            watermarks_removed: self.containers.iter().map(|t| t.removed).sum(),
            masters_cleaned,
            layouts_cleaned,
            pages_cleaned,
            links_removed: self.containers.iter().map(|t| t.links_removed).sum(),
            detach_failures: self.detach_failures,
            containers_skipped: self.skipped,
            containers: self.containers,
            output: None,
            finished_at: Utc::now(),
            error: None,
        }
    }
}
