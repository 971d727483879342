//! # unmark
//!
//! Locate and remove generator branding watermarks from PDF and PPTX
//! documents.
//!
//! A watermark is a small picture hyperlinked to the generator's domain,
//! or an unlinked picture of logo size parked in the bottom-right corner
//! of a page, slide master or slide layout. Everything else in the
//! document is left byte-for-byte alone.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> unmark::Result<()> {
//!     // Look first
//!     let report = unmark::detect_file("deck.pptx")?;
//!     for result in report.watermarks() {
//!         println!("{} / {}", result.container, result.element_name);
//!     }
//!
//!     // Then clean
//!     let removal = unmark::remove_watermarks("deck.pptx", "deck_cleaned.pptx")?;
//!     println!("{} watermarks removed", removal.watermarks_removed);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two formats**: PDF pages and PPTX slide masters/layouts
//! - **Provenance first**: a hyperlink to the target domain decides
//! - **Corner heuristic**: unlinked logo-sized pictures in the corner
//! - **Nested groups**: pictures inside groups and form XObjects are found
//! - **Diagnostics**: optional per-element trace of every decision
//! - **Parallel batches**: Rayon across independent files

pub mod detect;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod render;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_supported, DocumentFormat};
pub use engine::{
    ClassificationResult, DetectionReport, DiagnosticTrace, Engine, EngineConfig, MatchRule,
    RemovalReport,
};
pub use error::{Error, ErrorKind, Result};
pub use model::{Container, ContainerKind, Document, ElementId, LinkTarget, VisualElement};
pub use processor::{CleanOutput, ProcessorRegistry, WatermarkProcessor};
pub use render::JsonFormat;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Suffix appended to the file stem of a cleaned document.
pub const CLEANED_SUFFIX: &str = "_cleaned";

/// Detect watermarks in a file with the default configuration.
///
/// # Example
///
/// ```no_run
/// use unmark::detect_file;
///
/// let report = detect_file("report.pdf").unwrap();
/// println!("{} watermarks", report.watermark_count());
/// ```
pub fn detect_file<P: AsRef<Path>>(path: P) -> Result<DetectionReport> {
    detect_file_with(path, &Engine::default())
}

/// Detect watermarks in a file with a custom engine.
pub fn detect_file_with<P: AsRef<Path>>(path: P, engine: &Engine) -> Result<DetectionReport> {
    ProcessorRegistry::with_defaults().detect(
        path.as_ref(),
        engine,
        &mut DiagnosticTrace::disabled(),
    )
}

/// Whether the file contains at least one watermark.
pub fn has_watermarks<P: AsRef<Path>>(path: P) -> Result<bool> {
    Ok(detect_file(path)?.has_watermarks())
}

/// Number of watermarks in the file.
pub fn watermark_count<P: AsRef<Path>>(path: P) -> Result<usize> {
    Ok(detect_file(path)?.watermark_count())
}

/// Remove watermarks from `input` and write the cleaned copy to `output`.
///
/// The output directory is created when missing. Nothing is written when
/// the input cannot be loaded.
///
/// # Example
///
/// ```no_run
/// use unmark::remove_watermarks;
///
/// let report = remove_watermarks("deck.pptx", "out/deck.pptx").unwrap();
/// assert!(report.success);
/// ```
pub fn remove_watermarks<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<RemovalReport> {
    remove_watermarks_with(input, output, &Engine::default())
}

/// Remove watermarks with a custom engine.
///
/// # Example
///
/// ```no_run
/// use unmark::{remove_watermarks_with, Engine, EngineConfig};
///
/// let engine = Engine::new(
///     EngineConfig::new()
///         .with_target_domain("example.com")
///         .with_size_heuristic(false),
/// )?;
/// let report = remove_watermarks_with("deck.pptx", "clean.pptx", &engine)?;
/// # Ok::<(), unmark::Error>(())
/// ```
pub fn remove_watermarks_with<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    engine: &Engine,
) -> Result<RemovalReport> {
    ProcessorRegistry::with_defaults().remove(
        input.as_ref(),
        output.as_ref(),
        engine,
        &mut DiagnosticTrace::disabled(),
    )
}

/// Remove watermarks, writing next to the input unless `output` is given.
///
/// The default output is `<stem>_cleaned.<ext>` in the input's directory.
///
/// # Example
///
/// ```no_run
/// use unmark::clean_file;
///
/// let report = clean_file("slides/deck.pptx", None).unwrap();
/// // slides/deck_cleaned.pptx
/// println!("{}", report.output.unwrap().display());
/// ```
pub fn clean_file<P: AsRef<Path>>(input: P, output: Option<&Path>) -> Result<RemovalReport> {
    let input = input.as_ref();
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => cleaned_path(input, None),
    };
    remove_watermarks(input, output)
}

/// Default output path for a cleaned copy of `input`.
///
/// With `dir`, the cleaned file goes there instead of next to the input.
pub fn cleaned_path(input: &Path, dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, CLEANED_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, CLEANED_SUFFIX),
    };
    match dir.or_else(|| input.parent()) {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Clean many independent files in parallel.
///
/// Each input is written to `<output_dir>/<stem>_cleaned.<ext>`. Failures
/// do not stop the batch; they come back as reports with
/// `success == false`, in input order.
pub fn remove_batch<P: AsRef<Path> + Sync>(
    inputs: &[P],
    output_dir: &Path,
    engine: &Engine,
) -> Vec<RemovalReport> {
    let registry = ProcessorRegistry::with_defaults();
    inputs
        .par_iter()
        .map(|input| {
            let input = input.as_ref();
            let output = cleaned_path(input, Some(output_dir));
            let result = registry.remove(input, &output, engine, &mut DiagnosticTrace::disabled());
            if let Err(e) = &result {
                log::warn!("{}: {}", input.display(), e);
            }
            RemovalReport::from_result(result)
        })
        .collect()
}

/// Async wrappers around the synchronous engine.
///
/// File I/O goes through `tokio::fs`; the engine runs on the blocking pool.
#[cfg(feature = "async")]
pub mod tasks {
    use super::*;

    /// Detect watermarks in a file without blocking the runtime.
    pub async fn detect_file_async<P: AsRef<Path>>(
        path: P,
        engine: Engine,
    ) -> Result<DetectionReport> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        tokio::task::spawn_blocking(move || {
            let registry = ProcessorRegistry::with_defaults();
            registry
                .get_for_bytes(&bytes)?
                .detect_bytes(&bytes, &engine, &mut DiagnosticTrace::disabled())
        })
        .await
        .map_err(|e| Error::Other(format!("detection task failed: {}", e)))?
    }

    /// Remove watermarks without blocking the runtime.
    pub async fn remove_watermarks_async<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output: Q,
        engine: Engine,
    ) -> Result<RemovalReport> {
        let input = input.as_ref();
        let output = output.as_ref().to_path_buf();
        if processor::same_file(input, &output) {
            return Err(Error::SamePath(output.display().to_string()));
        }

        let bytes = tokio::fs::read(input).await?;
        let CleanOutput { bytes, mut report } = tokio::task::spawn_blocking(move || {
            let registry = ProcessorRegistry::with_defaults();
            registry
                .get_for_bytes(&bytes)?
                .remove_bytes(&bytes, &engine, &mut DiagnosticTrace::disabled())
        })
        .await
        .map_err(|e| Error::Other(format!("removal task failed: {}", e)))??;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&output, &bytes).await?;
        report.output = Some(output);
        Ok(report)
    }
}

#[cfg(feature = "async")]
pub use tasks::{detect_file_async, remove_watermarks_async};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_path_next_to_input() {
        assert_eq!(
            cleaned_path(Path::new("slides/deck.pptx"), None),
            PathBuf::from("slides/deck_cleaned.pptx")
        );
        assert_eq!(
            cleaned_path(Path::new("report.pdf"), None),
            PathBuf::from("report_cleaned.pdf")
        );
    }

    #[test]
    fn test_cleaned_path_in_directory() {
        assert_eq!(
            cleaned_path(Path::new("in/a.pdf"), Some(Path::new("out"))),
            PathBuf::from("out/a_cleaned.pdf")
        );
        assert_eq!(
            cleaned_path(Path::new("noext"), Some(Path::new("out"))),
            PathBuf::from("out/noext_cleaned")
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = detect_file("definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_rejects_same_path_and_missing_input() {
        let err = remove_watermarks_async("deck.pptx", "deck.pptx", Engine::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SamePath(_)));

        let err = detect_file_async("definitely/not/here.pdf", Engine::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
