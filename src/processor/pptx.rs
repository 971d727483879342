//! Presentation watermark processor.

use crate::detect::DocumentFormat;
use crate::engine::Engine;
use crate::error::Result;
use crate::parser::{Package, PptxParser};

use super::WatermarkProcessor;

/// Processor for presentations.
///
/// Only slide masters and layouts are cleaned; slide content is left alone.
#[derive(Debug, Clone, Default)]
pub struct PptxProcessor {
    _private: (),
}

impl PptxProcessor {
    /// Create a new presentation processor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl WatermarkProcessor for PptxProcessor {
    fn supported_extensions(&self) -> &[&str] {
        &["pptx"]
    }

    fn name(&self) -> &str {
        "pptx"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn load(&self, bytes: &[u8], _engine: &Engine) -> Result<Box<dyn Package>> {
        Ok(Box::new(PptxParser::from_bytes(bytes)?.parse()?))
    }
}
