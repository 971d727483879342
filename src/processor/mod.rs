//! Format processors with a plugin-style registry.
//!
//! A processor ties a container format to the engine: it loads bytes into a
//! [`Package`], runs detection or removal, and writes the cleaned document.
//! The registry dispatches on file extension, falling back to magic bytes
//! for paths without one.
//!
//! # Example
//!
//! ```no_run
//! use unmark::engine::{DiagnosticTrace, Engine};
//! use unmark::processor::ProcessorRegistry;
//! use std::path::Path;
//!
//! fn main() -> unmark::Result<()> {
//!     let registry = ProcessorRegistry::with_defaults();
//!     let engine = Engine::default();
//!     let report = registry.remove(
//!         Path::new("deck.pptx"),
//!         Path::new("deck_cleaned.pptx"),
//!         &engine,
//!         &mut DiagnosticTrace::disabled(),
//!     )?;
//!     println!("{} watermarks removed", report.watermarks_removed);
//!     Ok(())
//! }
//! ```

mod pdf;
mod pptx;

pub use pdf::PdfProcessor;
pub use pptx::PptxProcessor;

use crate::detect::{detect_format_from_path, DocumentFormat};
use crate::engine::{DetectionReport, DiagnosticTrace, Engine, RemovalReport};
use crate::error::{Error, Result};
use crate::parser::Package;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A cleaned document held in memory.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    /// Serialized document
    pub bytes: Vec<u8>,
    /// What was removed
    pub report: RemovalReport,
}

/// Trait for format processors.
///
/// Implementors only provide loading; detection and removal are shared.
pub trait WatermarkProcessor: Send + Sync {
    /// Get the supported file extensions for this processor.
    ///
    /// Extensions are lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this processor.
    fn name(&self) -> &str;

    /// The container format this processor reads.
    fn format(&self) -> DocumentFormat;

    /// Load a document from bytes.
    fn load(&self, bytes: &[u8], engine: &Engine) -> Result<Box<dyn Package>>;

    /// Check if this processor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }

    /// Classify every picture without changing anything.
    fn detect_bytes(
        &self,
        bytes: &[u8],
        engine: &Engine,
        trace: &mut DiagnosticTrace,
    ) -> Result<DetectionReport> {
        let package = self.load(bytes, engine)?;
        Ok(engine.detect(package.document(), trace))
    }

    /// Classify every picture of a file.
    fn detect(
        &self,
        path: &Path,
        engine: &Engine,
        trace: &mut DiagnosticTrace,
    ) -> Result<DetectionReport> {
        let bytes = std::fs::read(path)?;
        self.detect_bytes(&bytes, engine, trace)
    }

    /// Remove watermarks and serialize the result in memory.
    fn remove_bytes(
        &self,
        bytes: &[u8],
        engine: &Engine,
        trace: &mut DiagnosticTrace,
    ) -> Result<CleanOutput> {
        let mut package = self.load(bytes, engine)?;
        let report = engine.clean(package.document_mut(), trace);
        let bytes = package.serialize()?;
        Ok(CleanOutput { bytes, report })
    }

    /// Remove watermarks from `input` and write the result to `output`.
    ///
    /// Nothing is written unless the document loads and serializes.
    fn remove(
        &self,
        input: &Path,
        output: &Path,
        engine: &Engine,
        trace: &mut DiagnosticTrace,
    ) -> Result<RemovalReport> {
        if same_file(input, output) {
            return Err(Error::SamePath(output.display().to_string()));
        }

        let bytes = std::fs::read(input)?;
        let CleanOutput { bytes, mut report } = self.remove_bytes(&bytes, engine, trace)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output, &bytes)?;
        log::info!("Saved cleaned document to {}", output.display());

        report.output = Some(output.to_path_buf());
        Ok(report)
    }
}

/// Whether two paths name the same file.
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Registry for format processors.
///
/// The registry maps file extensions and names to processors.
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn WatermarkProcessor>>,
    by_name: HashMap<String, Arc<dyn WatermarkProcessor>>,
}

impl ProcessorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF and PPTX processors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfProcessor::new()));
        registry.register(Arc::new(PptxProcessor::new()));
        registry
    }

    /// Register a processor for all its supported extensions.
    pub fn register(&mut self, processor: Arc<dyn WatermarkProcessor>) {
        for ext in processor.supported_extensions() {
            self.processors
                .insert(ext.to_lowercase(), processor.clone());
        }
        self.by_name
            .insert(processor.name().to_lowercase(), processor);
    }

    /// Get a processor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn WatermarkProcessor>> {
        self.processors.get(&ext.to_lowercase()).cloned()
    }

    /// Get a processor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn WatermarkProcessor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Get the processor for a format.
    pub fn get_by_format(&self, format: DocumentFormat) -> Option<Arc<dyn WatermarkProcessor>> {
        self.by_name
            .values()
            .find(|p| p.format() == format)
            .cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.processors.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.processors.keys().map(|s| s.as_str()).collect()
    }

    /// Pick the processor for a path: by extension, or by magic bytes when
    /// the path has none.
    pub fn get_for_path(&self, path: &Path) -> Result<Arc<dyn WatermarkProcessor>> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .get_by_extension(ext)
                .ok_or_else(|| Error::UnsupportedExtension(ext.to_string())),
            None => {
                let format = detect_format_from_path(path)?;
                self.get_by_format(format)
                    .ok_or_else(|| Error::UnsupportedExtension(format.extension().to_string()))
            }
        }
    }

    /// Pick the processor for in-memory bytes by magic.
    pub fn get_for_bytes(&self, bytes: &[u8]) -> Result<Arc<dyn WatermarkProcessor>> {
        let format = crate::detect::detect_format_from_bytes(bytes)?;
        self.get_by_format(format)
            .ok_or_else(|| Error::UnsupportedExtension(format.extension().to_string()))
    }

    /// Detect watermarks in a file using the appropriate processor.
    pub fn detect(
        &self,
        path: &Path,
        engine: &Engine,
        trace: &mut DiagnosticTrace,
    ) -> Result<DetectionReport> {
        self.get_for_path(path)?.detect(path, engine, trace)
    }

    /// Remove watermarks from a file using the appropriate processor.
    pub fn remove(
        &self,
        input: &Path,
        output: &Path,
        engine: &Engine,
        trace: &mut DiagnosticTrace,
    ) -> Result<RemovalReport> {
        self.get_for_path(input)?.remove(input, output, engine, trace)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
