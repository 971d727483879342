//! Container format detection and validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The two supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Page-based fixed layout (PDF).
    Pdf,
    /// Slide master / layout hierarchy (PPTX).
    Pptx,
}

impl DocumentFormat {
    /// Canonical lowercase file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Pptx => "pptx",
        }
    }

}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Pptx => write!(f, "PPTX"),
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";

/// ZIP local file header, the outer shell of every OOXML package.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the document format from a file path.
///
/// # Example
/// ```no_run
/// use unmark::detect::{detect_format_from_path, DocumentFormat};
///
/// let format = detect_format_from_path("deck.pptx").unwrap();
/// assert_eq!(format, DocumentFormat::Pptx);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentFormat> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the document format from the first bytes of a file.
///
/// # Returns
/// * `Ok(DocumentFormat::Pdf)` for a `%PDF-x.y` header
/// * `Ok(DocumentFormat::Pptx)` for a ZIP local file header
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentFormat> {
    if data.starts_with(ZIP_MAGIC) {
        return Ok(DocumentFormat::Pptx);
    }
    pdf_version(data)?;
    Ok(DocumentFormat::Pdf)
}

/// Validate a PDF header and return its version string (e.g. "1.7").
pub fn pdf_version(data: &[u8]) -> Result<String> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    let version = rest.get(..3).ok_or(Error::UnknownFormat)?;

    if !is_valid_version(version) {
        return Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).into_owned(),
        ));
    }
    Ok(String::from_utf8_lossy(version).into_owned())
}

/// `d.d`, the only header version shape in use.
fn is_valid_version(version: &[u8]) -> bool {
    matches!(version, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}

/// Check if a file is a supported document.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start like a supported document.
pub fn is_supported_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
