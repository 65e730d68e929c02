//! C-ABI FFI bindings for cross-language integration.
//!
//! Snapshots are passed as a pointer and a length. Results are JSON strings
//! inside a [`BlocktextResult`], which must be released with
//! [`blocktext_free_result`].

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::slice;

use serde::Serialize;

use crate::render::{to_json, JsonFormat};
use crate::{
    flatten_blocks, harvest_referenced_doc_ids, parse_page, parse_workspace_root,
    project_markdown, SummaryMode,
};

/// Result structure returned by FFI functions.
#[repr(C)]
pub struct BlocktextResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `blocktext_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `blocktext_free_result`.
    pub error: *mut c_char,
}

impl BlocktextResult {
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

    fn from_json<T: Serialize>(result: crate::Result<T>) -> Self {
        match result.and_then(|value| to_json(&value, JsonFormat::Compact)) {
            Ok(json) => Self::success(json),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

unsafe fn bytes_arg<'a>(data: *const u8, len: usize) -> Result<&'a [u8], String> {
    if data.is_null() {
        return Err("Snapshot data cannot be null".to_string());
    }
    Ok(slice::from_raw_parts(data, len))
}

unsafe fn str_arg<'a>(s: *const c_char, name: &str) -> Result<&'a str, String> {
    if s.is_null() {
        return Err(format!("{} cannot be null", name));
    }
    CStr::from_ptr(s)
        .to_str()
        .map_err(|_| format!("Invalid UTF-8 {}", name))
}

unsafe fn doc_args<'a>(
    doc_id: *const c_char,
    data: *const u8,
    len: usize,
) -> Result<(&'a str, &'a [u8]), String> {
    Ok((str_arg(doc_id, "doc id")?, bytes_arg(data, len)?))
}

/// Extract title and summary from a page snapshot as JSON.
///
/// `max_summary_length` of `-1` disables the bound. The data is `null` JSON
/// when the snapshot has no page block.
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
/// The returned result must be freed with `blocktext_free_result`.
#[no_mangle]
pub unsafe extern "C" fn blocktext_parse_page(
    data: *const u8,
    len: usize,
    max_summary_length: i64,
) -> BlocktextResult {
    let bytes = match bytes_arg(data, len) {
        Ok(b) => b,
        Err(e) => return BlocktextResult::error(e),
    };
    let mode = SummaryMode::from_max_length(max_summary_length);
    BlocktextResult::from_json(parse_page(bytes, mode))
}

/// Read workspace name and avatar as JSON (`null` without a meta region).
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
/// The returned result must be freed with `blocktext_free_result`.
#[no_mangle]
pub unsafe extern "C" fn blocktext_parse_workspace_root(
    data: *const u8,
    len: usize,
) -> BlocktextResult {
    let bytes = match bytes_arg(data, len) {
        Ok(b) => b,
        Err(e) => return BlocktextResult::error(e),
    };
    BlocktextResult::from_json(parse_workspace_root(bytes))
}

/// Flatten every block of a page snapshot as a JSON array.
///
/// # Safety
///
/// `doc_id` must be a valid null-terminated UTF-8 string.
/// `data` must point to `len` readable bytes.
/// The returned result must be freed with `blocktext_free_result`.
#[no_mangle]
pub unsafe extern "C" fn blocktext_flatten_blocks(
    doc_id: *const c_char,
    data: *const u8,
    len: usize,
) -> BlocktextResult {
    match doc_args(doc_id, data, len) {
        Ok((id, bytes)) => BlocktextResult::from_json(flatten_blocks(id, bytes)),
        Err(e) => BlocktextResult::error(e),
    }
}

/// Render a page snapshot as Markdown, returned as `{title, markdown}` JSON.
///
/// # Safety
///
/// `doc_id` must be a valid null-terminated UTF-8 string.
/// `data` must point to `len` readable bytes.
/// The returned result must be freed with `blocktext_free_result`.
#[no_mangle]
pub unsafe extern "C" fn blocktext_project_markdown(
    doc_id: *const c_char,
    data: *const u8,
    len: usize,
    ai_editable: bool,
) -> BlocktextResult {
    match doc_args(doc_id, data, len) {
        Ok((id, bytes)) => BlocktextResult::from_json(project_markdown(id, bytes, ai_editable)),
        Err(e) => BlocktextResult::error(e),
    }
}

/// List document ids referenced from a workspace root as a JSON array.
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
/// The returned result must be freed with `blocktext_free_result`.
#[no_mangle]
pub unsafe extern "C" fn blocktext_harvest_doc_ids(data: *const u8, len: usize) -> BlocktextResult {
    let bytes = match bytes_arg(data, len) {
        Ok(b) => b,
        Err(e) => return BlocktextResult::error(e),
    };
    BlocktextResult::from_json(harvest_referenced_doc_ids(bytes))
}

/// Check if bytes look like a snapshot this library can decode.
///
/// # Safety
///
/// `data` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn blocktext_is_snapshot(data: *const u8, len: usize) -> bool {
    match bytes_arg(data, len) {
        Ok(bytes) => crate::detect::is_snapshot_bytes(bytes),
        Err(_) => false,
    }
}

/// Free a result returned by any blocktext function.
///
/// # Safety
///
/// The `result` must have been returned by a blocktext function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn blocktext_free_result(result: BlocktextResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a string allocated by blocktext.
///
/// # Safety
///
/// The `ptr` must have been allocated by blocktext.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn blocktext_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the blocktext library.
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn blocktext_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
