pub mod bindings;
pub mod config;
pub mod editor;
mod ffi;
pub mod normalize;
pub mod suspend;

#[cfg(target_arch = "wasm32")]
mod bridge;

pub use bindings::{sanitize, BindingTable, KeyBinding, KeyTarget, TAB};
pub use config::FixConfig;
pub use editor::{CopyHandler, GuardedClipboard, HtmlSource, NormalizedHtml, SelectionRange};
pub use normalize::{normalize_html, normalize_html_with};
pub use suspend::{NormalizationGate, Suspension};

use crate::ffi::{with_input, write_out, ErrorCode};

#[no_mangle]
pub extern "C" fn quill_fix_api_version() -> u32 {
    1
}

/// Fixes serialized editor HTML, or returns it untouched while a copy holds
/// the shared gate. Empty input yields empty output.
#[no_mangle]
pub extern "C" fn fix_html(ptr: u32, len: u32) -> u32 {
    if len == 0 {
        return write_out("");
    }
    with_input(ptr, len, |html| Ok(fixed_html(html)))
}

/// JSON binding table in, JSON array of the Tab binding names out.
#[no_mangle]
pub extern "C" fn tab_binding_names(ptr: u32, len: u32) -> u32 {
    with_input(ptr, len, tab_names_json)
}

/// JSON binding table in, the same table without its Tab bindings out.
#[no_mangle]
pub extern "C" fn sanitize_bindings_json(ptr: u32, len: u32) -> u32 {
    with_input(ptr, len, sanitized_json)
}

/// Suspends `fix_html` until the matching `clipboard_resume`. Returns the new depth.
#[no_mangle]
pub extern "C" fn clipboard_suspend() -> u32 {
    NormalizationGate::shared().acquire() as u32
}

#[no_mangle]
pub extern "C" fn clipboard_resume() -> u32 {
    NormalizationGate::shared().release() as u32
}

fn fixed_html(html: &str) -> String {
    if NormalizationGate::shared().is_enabled() {
        normalize_html(html)
    } else {
        html.to_string()
    }
}

fn parse_table(json: &str) -> Result<BindingTable, (ErrorCode, String)> {
    BindingTable::from_json(json).map_err(|e| (ErrorCode::InvalidJson, e))
}

fn tab_names_json(json: &str) -> Result<String, (ErrorCode, String)> {
    let names = bindings::matching_names(&parse_table(json)?, &TAB);
    serde_json::to_string(&names).map_err(|e| (ErrorCode::InvalidJson, e.to_string()))
}

fn sanitized_json(json: &str) -> Result<String, (ErrorCode, String)> {
    let mut table = parse_table(json)?;
    sanitize(&mut table);
    table.to_json().map_err(|e| (ErrorCode::InvalidJson, e))
}
