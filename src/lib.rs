//! scorelayout — grand-staff page layout for MusicXML scores.
//!
//! Parses uncompressed MusicXML (.musicxml) and compressed MXL (.mxl)
//! files, then lays the first part out as treble/bass staff pairs: chord
//! tones merged, short notes beamed, measures packed into rows. The result
//! is a [`RenderPlan`] for an external engraving backend to draw.
//!
//! # Example
//! ```no_run
//! use scorelayout::{layout_file, LayoutConfig};
//!
//! let plan = layout_file("path/to/score.musicxml", &LayoutConfig::default()).unwrap();
//! println!("Rows: {}", plan.rows);
//! println!("Page height: {}", plan.page.height);
//! println!("Beams: {}", plan.beam_count());
//! ```

pub mod error;
pub mod layout;
pub mod model;
pub mod mxl;
pub mod parser;

use std::path::Path;

pub use error::{Result, ScoreError};
pub use layout::*;
pub use model::*;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ScoreError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => parse_musicxml(std::str::from_utf8(data)?),
        _ => {
            // Auto-detect: try as XML first, then as MXL
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return parse_musicxml(xml);
                }
            }
            parse_mxl(data)
        }
    }
}

/// Parse a MusicXML file and lay it out.
pub fn layout_file<P: AsRef<Path>>(path: P, config: &LayoutConfig) -> Result<RenderPlan> {
    let score = parse_file(path)?;
    Ok(layout_score(&score, config))
}

/// Parse MusicXML bytes and lay them out.
pub fn layout_bytes(
    data: &[u8],
    extension: Option<&str>,
    config: &LayoutConfig,
) -> Result<RenderPlan> {
    let score = parse_bytes(data, extension)?;
    Ok(layout_score(&score, config))
}

/// Convert a render plan to a JSON string.
/// Useful for passing data across FFI boundaries.
pub fn plan_to_json(plan: &RenderPlan) -> Result<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — static library / cdylib consumers
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Resolve an optional JSON config from FFI; null means defaults.
unsafe fn ffi_config(config_json: *const c_char) -> Option<LayoutConfig> {
    if config_json.is_null() {
        return Some(LayoutConfig::default());
    }
    let json = unsafe { CStr::from_ptr(config_json) }.to_str().ok()?;
    LayoutConfig::from_json(json).ok()
}

fn ffi_json(plan: Result<RenderPlan>) -> *mut c_char {
    match plan.and_then(|p| plan_to_json(&p)) {
        Ok(json) => CString::new(json).map_or(std::ptr::null_mut(), CString::into_raw),
        Err(e) => {
            log::warn!("layout failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Lay out a MusicXML file and return the render plan as a JSON C string.
/// The caller must free the returned string with `scorelayout_free_string`.
///
/// `config_json` may be null for the default page geometry.
///
/// # Safety
/// `path` must be a valid null-terminated UTF-8 C string. `config_json`
/// must be null or a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn scorelayout_plan_file(
    path: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let path_str = match unsafe { CStr::from_ptr(path) }.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };
    let Some(config) = (unsafe { ffi_config(config_json) }) else {
        return std::ptr::null_mut();
    };

    ffi_json(layout_file(path_str, &config))
}

/// Lay out MusicXML bytes and return the render plan as a JSON C string.
/// The caller must free the returned string with `scorelayout_free_string`.
///
/// # Safety
/// `data` must point to `len` valid bytes. `extension` and `config_json`
/// may be null.
#[no_mangle]
pub unsafe extern "C" fn scorelayout_plan_bytes(
    data: *const u8,
    len: usize,
    extension: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    if data.is_null() || len == 0 {
        return std::ptr::null_mut();
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    let ext = if extension.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(extension) }.to_str().ok()
    };
    let Some(config) = (unsafe { ffi_config(config_json) }) else {
        return std::ptr::null_mut();
    };

    ffi_json(layout_bytes(bytes, ext, &config))
}

/// Free a string previously returned by scorelayout functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a scorelayout function, or null.
#[no_mangle]
pub unsafe extern "C" fn scorelayout_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
