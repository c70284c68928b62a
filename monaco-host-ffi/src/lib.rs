//! C-compatible FFI wrappers around monaco-host-core and monaco-host-editor.
//!
//! Native hosts own the web view and drive it themselves; these exports give
//! them the page, the scripts and the decoding rules the Rust views use.
//! All functions take C strings and return JSON or plain text. Callers must
//! free returned strings with `monaco_host_free_string`.
//!
//! Every export runs inside `ffi_catch` so a panic never crosses the boundary.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use monaco_host_core::config::BridgeConfig;
use monaco_host_core::transport::{self, Encoding};
use monaco_host_editor::assets::{self, PageOptions};
use monaco_host_editor::protocol::{DiffStatistics, EditorEvent, LineChange};
use monaco_host_editor::scripts::{self, TextTarget};

/// Run `f` inside `catch_unwind`, logging the panic payload before returning the
/// fallback value.
fn ffi_catch<T>(fallback: T, f: impl FnOnce() -> T + std::panic::UnwindSafe) -> T {
    match catch_unwind(f) {
        Ok(v) => v,
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            log::error!("FFI panic caught: {}", msg);
            fallback
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_rust_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: Caller guarantees `ptr` is a valid, null-terminated C string
    // whose memory remains valid for the duration of this call.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .map(String::from)
}

fn to_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            log::warn!(
                "String contains interior NUL bytes, sanitizing ({} chars)",
                s.len()
            );
            let sanitized: String = s.chars().filter(|&c| c != '\0').collect();
            CString::new(sanitized).unwrap_or_default().into_raw()
        }
    }
}

/// A null or empty pointer means "use the defaults".
fn parse_config(config_json: *const c_char) -> Result<BridgeConfig, String> {
    match to_rust_str(config_json) {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse config: {}", e)),
        _ => Ok(BridgeConfig::default()),
    }
}

fn parse_target(target: Option<String>) -> Result<TextTarget, String> {
    match target.as_deref() {
        None | Some("value") => Ok(TextTarget::Value),
        Some("original") => Ok(TextTarget::Original),
        Some("modified") => Ok(TextTarget::Modified),
        Some(other) => Err(format!("Unknown text target: {}", other)),
    }
}

fn parse_encoding(encoding: Option<String>) -> Result<Encoding, String> {
    match encoding.as_deref() {
        None | Some("raw-escaped") => Ok(Encoding::RawEscaped),
        Some("base64") => Ok(Encoding::Base64),
        Some(other) => Err(format!("Unknown encoding: {}", other)),
    }
}

fn error_result(e: &str) -> *mut c_char {
    to_c_string(&format!("ERROR:{}", e))
}

// ---------------------------------------------------------------------------
// Memory management / logging
// ---------------------------------------------------------------------------

/// Free a string previously returned by a `monaco_host_*` function.
#[no_mangle]
pub extern "C" fn monaco_host_free_string(s: *mut c_char) {
    ffi_catch(
        (),
        AssertUnwindSafe(|| {
            if !s.is_null() {
                // SAFETY: `s` was previously returned by `CString::into_raw` from
                // one of the `monaco_host_*` functions, so it is valid to reclaim it.
                unsafe {
                    drop(CString::from_raw(s));
                }
            }
        }),
    );
}

/// Install the `env_logger` backend. Safe to call more than once.
#[no_mangle]
pub extern "C" fn monaco_host_init_logging() {
    ffi_catch(
        (),
        AssertUnwindSafe(|| {
            if env_logger::try_init().is_err() {
                log::debug!("logger already initialized");
            }
        }),
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Load the user's bridge config (or defaults) as JSON.
#[no_mangle]
pub extern "C" fn monaco_host_load_config() -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| {
            let config = monaco_host_core::config::load();
            match serde_json::to_string(&config) {
                Ok(json) => to_c_string(&json),
                Err(e) => error_result(&e.to_string()),
            }
        }),
    )
}

/// JSON Schema describing the config file.
#[no_mangle]
pub extern "C" fn monaco_host_config_schema() -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| to_c_string(&BridgeConfig::json_schema().to_string())),
    )
}

/// Probe delays in milliseconds for the config's readiness policy, as a JSON
/// array.
#[no_mangle]
pub extern "C" fn monaco_host_readiness_delays(config_json: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| {
            let config = match parse_config(config_json) {
                Ok(c) => c,
                Err(e) => return error_result(&e),
            };
            let delays: Vec<u64> = config
                .readiness_policy()
                .delays()
                .map(|d| d.as_millis() as u64)
                .collect();
            to_c_string(&serde_json::Value::from(delays).to_string())
        }),
    )
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

fn render(config_json: *const c_char, diff: bool) -> *mut c_char {
    let config = match parse_config(config_json) {
        Ok(c) => c,
        Err(e) => return error_result(&e),
    };
    let page = PageOptions::from_config(&config);
    let html = if diff {
        assets::render_diff_page(&page)
    } else {
        assets::render_editor_page(&page)
    };
    to_c_string(&html)
}

/// Render the single-editor page for a config (null for defaults).
#[no_mangle]
pub extern "C" fn monaco_host_render_editor_page(config_json: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| render(config_json, false)),
    )
}

/// Render the diff-editor page for a config (null for defaults).
#[no_mangle]
pub extern "C" fn monaco_host_render_diff_page(config_json: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| render(config_json, true)),
    )
}

/// Write both pages to the platform data directory.
///
/// Returns the directory path on success or `ERROR:<message>` on failure.
#[no_mangle]
pub extern "C" fn monaco_host_ensure_pages_written(config_json: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| {
            let result = parse_config(config_json).and_then(|config| {
                let dir = assets::pages_dir()?;
                assets::ensure_pages_written(&dir, &PageOptions::from_config(&config))
            });
            match result {
                Ok(path) => to_c_string(&path.to_string_lossy()),
                Err(e) => error_result(&e),
            }
        }),
    )
}

// ---------------------------------------------------------------------------
// Scripts and transport
// ---------------------------------------------------------------------------

/// The readiness probe. Evaluates to `true` once the editor exists.
#[no_mangle]
pub extern "C" fn monaco_host_probe_script() -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| to_c_string(scripts::PROBE)),
    )
}

/// Script that pulls queued events when no message handler is wired.
/// Evaluates to a JSON array of event strings.
#[no_mangle]
pub extern "C" fn monaco_host_drain_events_script() -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| to_c_string(scripts::DRAIN_EVENTS)),
    )
}

/// Normalize text the way the views do before sending it.
#[no_mangle]
pub extern "C" fn monaco_host_clean_text(text: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| match to_rust_str(text) {
            Some(text) => to_c_string(&transport::clean(&text)),
            None => std::ptr::null_mut(),
        }),
    )
}

/// Build the script that sets `text` on `target` (`value`, `original` or
/// `modified`) using `encoding` (`raw-escaped` or `base64`). Null target or
/// encoding picks the first choice.
///
/// Hosts walk the encodings in order until the script evaluates to `success`.
#[no_mangle]
pub extern "C" fn monaco_host_set_text_script(
    target: *const c_char,
    text: *const c_char,
    encoding: *const c_char,
) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| {
            let text = match to_rust_str(text) {
                Some(s) => s,
                None => return std::ptr::null_mut(),
            };
            let target = match parse_target(to_rust_str(target)) {
                Ok(t) => t,
                Err(e) => return error_result(&e),
            };
            let encoding = match parse_encoding(to_rust_str(encoding)) {
                Ok(enc) => enc,
                Err(e) => return error_result(&e),
            };
            let payload = transport::encode(&text, encoding);
            to_c_string(&scripts::set_text(target, &payload))
        }),
    )
}

/// Whether a script result counts as success.
#[no_mangle]
pub extern "C" fn monaco_host_is_success(result: *const c_char) -> bool {
    ffi_catch(
        false,
        AssertUnwindSafe(|| {
            to_rust_str(result).is_some_and(|r| transport::is_success_marker(&r))
        }),
    )
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Validate a posted message and return it re-serialized in canonical form.
/// Returns null when the message is not a known event.
#[no_mangle]
pub extern "C" fn monaco_host_parse_event(json: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| {
            let json = match to_rust_str(json) {
                Some(s) => s,
                None => return std::ptr::null_mut(),
            };
            let event = match EditorEvent::from_json(&json) {
                Ok(ev) => ev,
                Err(e) => {
                    log::warn!("{}", e);
                    return std::ptr::null_mut();
                }
            };
            match serde_json::to_string(&event) {
                Ok(out) => to_c_string(&out),
                Err(_) => std::ptr::null_mut(),
            }
        }),
    )
}

/// Summarize a JSON array of diff line changes as
/// `{"additions":..,"deletions":..,"modifications":..}`.
#[no_mangle]
pub extern "C" fn monaco_host_diff_statistics(line_changes_json: *const c_char) -> *mut c_char {
    ffi_catch(
        std::ptr::null_mut(),
        AssertUnwindSafe(|| {
            let json = match to_rust_str(line_changes_json) {
                Some(s) => s,
                None => return std::ptr::null_mut(),
            };
            let changes: Vec<LineChange> = match serde_json::from_str(&json) {
                Ok(c) => c,
                Err(e) => return error_result(&format!("Failed to parse line changes: {}", e)),
            };
            let stats = DiffStatistics::from_line_changes(&changes);
            match serde_json::to_string(&stats) {
                Ok(out) => to_c_string(&out),
                Err(e) => error_result(&e.to_string()),
            }
        }),
    )
}
