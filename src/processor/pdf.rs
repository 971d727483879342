//! PDF watermark processor.

use crate::detect::DocumentFormat;
use crate::engine::{Engine, ProvenanceMatcher};
use crate::error::Result;
use crate::parser::{Package, PdfParser};

use super::WatermarkProcessor;

/// Processor for page-based PDF documents.
///
/// Watermarks are image placements on pages; removing one also drops the
/// target-domain link annotations drawn over it.
#[derive(Debug, Clone, Default)]
pub struct PdfProcessor {
    _private: (),
}

impl PdfProcessor {
    /// Create a new PDF processor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl WatermarkProcessor for PdfProcessor {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn load(&self, bytes: &[u8], engine: &Engine) -> Result<Box<dyn Package>> {
        let config = engine.config();
        let parser = PdfParser::from_bytes(bytes)?
            .with_max_depth(config.max_group_depth)
            .with_provenance(ProvenanceMatcher::new(&config.target_domain));
        log::debug!("PDF {} with {} pages", parser.version(), parser.page_count());
        Ok(Box::new(parser.parse()?))
    }
}
