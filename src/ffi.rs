//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using unmark from other
//! languages such as C#, Python, and Node.js. Reports come back as JSON.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::render::{self, JsonFormat};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct UnmarkResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The JSON report (null if failed). Freed by `unmark_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Freed by `unmark_free_result`.
    pub error: *mut c_char,
}

impl UnmarkResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

/// Borrow a C string as a path, or explain why not.
unsafe fn path_arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{} cannot be null", what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| format!("Invalid UTF-8 {}", what.to_lowercase()))
}

/// Detect watermarks in a PDF or PPTX file.
///
/// On success `data` holds the detection report as JSON.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `unmark_free_result`.
#[no_mangle]
pub unsafe extern "C" fn unmark_detect(path: *const c_char) -> UnmarkResult {
    let path_str = match path_arg(path, "Path") {
        Ok(s) => s,
        Err(e) => return UnmarkResult::error(e),
    };

    match detect_internal(Path::new(path_str)) {
        Ok(json) => UnmarkResult::success(json),
        Err(e) => UnmarkResult::error(e.to_string()),
    }
}

fn detect_internal(path: &Path) -> crate::Result<String> {
    let report = crate::detect_file(path)?;
    render::to_json(&report, JsonFormat::Compact)
}

/// Remove watermarks from `input`, writing the cleaned copy to `output`.
///
/// On success `data` holds the removal report as JSON.
///
/// # Safety
///
/// `input` and `output` must be valid null-terminated UTF-8 strings.
/// The returned result must be freed with `unmark_free_result`.
#[no_mangle]
pub unsafe extern "C" fn unmark_remove(
    input: *const c_char,
    output: *const c_char,
) -> UnmarkResult {
    let input_str = match path_arg(input, "Input path") {
        Ok(s) => s,
        Err(e) => return UnmarkResult::error(e),
    };
    let output_str = match path_arg(output, "Output path") {
        Ok(s) => s,
        Err(e) => return UnmarkResult::error(e),
    };

    match remove_internal(Path::new(input_str), Path::new(output_str)) {
        Ok(json) => UnmarkResult::success(json),
        Err(e) => UnmarkResult::error(e.to_string()),
    }
}

fn remove_internal(input: &Path, output: &Path) -> crate::Result<String> {
    let report = crate::remove_watermarks(input, output)?;
    render::to_json(&report, JsonFormat::Compact)
}

/// Check if a file is a PDF or PPTX by its magic bytes.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn unmark_is_supported(path: *const c_char) -> bool {
    match path_arg(path, "Path") {
        Ok(s) => crate::detect::is_supported(Path::new(s)),
        Err(_) => false,
    }
}

/// Free a result returned by any unmark function.
///
/// # Safety
///
/// The `result` must have been returned by an unmark function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn unmark_free_result(result: UnmarkResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by unmark.
///
/// # Safety
///
/// The `ptr` must have been allocated by unmark.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn unmark_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the unmark library.
///
/// The returned string is statically allocated and must not be freed.
#[no_mangle]
pub extern "C" fn unmark_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
