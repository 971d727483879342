//! Format parsers and serializers.
//!
//! Each parser turns a fully-buffered file into a [`Package`]: the
//! format-independent [`Document`] model plus whatever the format needs to
//! write the document back out after the engine has detached elements.

mod matrix;
mod pdf_parser;
mod pptx_parser;
mod rels;

pub use matrix::Matrix;
pub use pdf_parser::{PdfPackage, PdfParser};
pub use pptx_parser::{PptxPackage, PptxParser};
pub use rels::{part_rels_path, resolve_part_target, Relationship, Relationships};

use crate::detect::{detect_format_from_bytes, DocumentFormat};
use crate::error::Result;
use crate::model::Document;

/// A loaded document that can be serialized back to its container format.
pub trait Package: Send {
    /// Container format of the package.
    fn format(&self) -> DocumentFormat;

    /// The document model.
    fn document(&self) -> &Document;

    /// The document model, for the mutation engine.
    fn document_mut(&mut self) -> &mut Document;

    /// Write the current model out.
    ///
    /// Elements still present in the model are preserved byte-for-byte
    /// where the format allows it; detached elements are dropped. Calling
    /// this more than once yields the same bytes for the same model.
    fn serialize(&mut self) -> Result<Vec<u8>>;
}

/// Load a document of either format, sniffing the magic bytes.
pub fn load(data: &[u8], max_group_depth: usize) -> Result<Box<dyn Package>> {
    match detect_format_from_bytes(data)? {
        DocumentFormat::Pdf => Ok(Box::new(
            PdfParser::from_bytes(data)?
                .with_max_depth(max_group_depth)
                .parse()?,
        )),
        DocumentFormat::Pptx => Ok(Box::new(PptxParser::from_bytes(data)?.parse()?)),
    }
}
