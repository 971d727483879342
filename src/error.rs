//! Error types for unmark library.

use std::io;
use thiserror::Error;

/// Result type alias for unmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while detecting or removing watermarks.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF or PPTX.
    #[error("Unknown file format: not a PDF or PPTX document")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The input is not a well-formed document of the expected format.
    #[error("Document parsing error: {0}")]
    Parse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A page could not be enumerated.
    ///
    /// Presentation masters and layouts that cannot be read are skipped and
    /// reported instead, so this only reaches callers for PDF pages.
    #[error("Cannot access {container}: {reason}")]
    ContainerAccess {
        /// Container name (e.g. `Page3`, `SlideMaster1`).
        container: String,
        /// What went wrong.
        reason: String,
    },

    /// Writing the cleaned document failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Engine configuration is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No processor is registered for the file extension.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// The output path points at the input document.
    #[error("Output path must differ from input path: {0}")]
    SamePath(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an error, matching how the engine treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input could not be read or parsed. Aborts the call.
    Parse,
    /// A PDF page could not be enumerated. Aborts the call.
    ContainerAccess,
    /// Writing the output failed. Aborts the call.
    Serialization,
    /// Caller-side misuse (configuration, paths, extensions).
    Usage,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_)
            | Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::Parse(_)
            | Error::Encrypted => ErrorKind::Parse,
            Error::ContainerAccess { .. } => ErrorKind::ContainerAccess,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::InvalidConfig(_)
            | Error::UnsupportedExtension(_)
            | Error::SamePath(_)
            | Error::Other(_) => ErrorKind::Usage,
        }
    }

    /// Whether the document itself failed, aborting the call.
    ///
    /// Usage errors are raised before any document is read.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Usage)
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Parse(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(format!("XML: {}", err))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Parse(format!("archive: {}", err))
    }
}

/// A single element's link or geometry could not be read.
///
/// Always recovered by the classifier: the element is treated as having
/// no link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unreadable metadata on {element}: {reason}")]
pub struct ElementMetadataError {
    /// Element name.
    pub element: String,
    /// What could not be read.
    pub reason: String,
}

/// An element could not be detached from its container.
///
/// Recovered by the mutation engine and reflected only in a reduced count.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetachError {
    /// No direct child with this id (never present or already removed).
    #[error("element {0} is not a child of {1}")]
    NotFound(u32, String),

    /// The element exists but is owned by a nested group, not the container.
    #[error("element {0} is nested inside a group of {1}")]
    ParentMismatch(u32, String),
}
