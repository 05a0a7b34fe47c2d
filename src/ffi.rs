//! FFI bindings for Sprout Insight
//!
//! This module provides C-compatible functions for calling the engine from the
//! Android and web hosts. All functions use C strings (null-terminated) and
//! return allocated memory that must be freed by the caller using
//! `sprout_free_string`.
//!
//! Timestamps are epoch milliseconds; pass `0` or a negative value to use the
//! current wall-clock time.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::pipeline::{metrics_to_profile_json, signals_to_interest_json, InsightProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Resolve an epoch-millisecond argument, falling back to the wall clock
fn resolve_now(now_ms: i64) -> Option<DateTime<Utc>> {
    if now_ms <= 0 {
        Some(Utc::now())
    } else {
        DateTime::<Utc>::from_timestamp_millis(now_ms)
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score one target from a JSON signal array and return the report JSON.
///
/// # Safety
/// - `signals_json` and `target` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `sprout_free_string`.
/// - Returns NULL on error; call `sprout_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sprout_score_interest(
    signals_json: *const c_char,
    target: *const c_char,
    now_ms: i64,
) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(signals_json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    let Some(target_str) = cstr_to_string(target) else {
        set_last_error("Invalid target string pointer");
        return ptr::null_mut();
    };

    let Some(now) = resolve_now(now_ms) else {
        set_last_error("Timestamp out of range");
        return ptr::null_mut();
    };

    match signals_to_interest_json(&json_str, &target_str, now) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Classify a JSON activity-metric array and return the report JSON.
///
/// # Safety
/// - `metrics_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `sprout_free_string`.
/// - Returns NULL on error; call `sprout_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sprout_analyze_profile(metrics_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(metrics_json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    match metrics_to_profile_json(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an InsightProcessor
pub struct InsightProcessorHandle {
    processor: InsightProcessor,
}

/// Create a new processor.
///
/// # Safety
/// - `config_json` may be NULL (default configuration) or a valid
///   null-terminated C string holding an engine config.
/// - Must be freed with `sprout_processor_free`.
/// - Returns NULL on error; call `sprout_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sprout_processor_new(
    config_json: *const c_char,
) -> *mut InsightProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        EngineConfig::default()
    } else {
        let Some(json_str) = cstr_to_string(config_json) else {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        };
        match EngineConfig::from_json(&json_str) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let processor = match InsightProcessor::with_config(config) {
        Ok(processor) => processor,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let handle = Box::new(InsightProcessorHandle { processor });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sprout_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sprout_processor_free(processor: *mut InsightProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Append a JSON signal array to the processor's log.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sprout_processor_new`.
/// - `signals_json` must be a valid null-terminated C string.
/// - Returns the number of signals logged, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn sprout_processor_log_signals(
    processor: *mut InsightProcessorHandle,
    signals_json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(json_str) = cstr_to_string(signals_json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };

    match handle.processor.log_signals_json(&json_str) {
        Ok(count) => i32::try_from(count).unwrap_or(i32::MAX),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Score every logged target and return the report JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sprout_processor_new`.
/// - Returns a newly allocated string that must be freed with `sprout_free_string`.
/// - Returns NULL on error; call `sprout_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sprout_processor_interests(
    processor: *mut InsightProcessorHandle,
    now_ms: i64,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    let Some(now) = resolve_now(now_ms) else {
        set_last_error("Timestamp out of range");
        return ptr::null_mut();
    };

    match handle.processor.report_json(now, None) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save the processor's signal log to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sprout_processor_new`.
/// - Returns a newly allocated string that must be freed with `sprout_free_string`.
/// - Returns NULL on error; call `sprout_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sprout_processor_save_log(
    processor: *mut InsightProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_log() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load a signal log from JSON, replacing the current one.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `sprout_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn sprout_processor_load_log(
    processor: *mut InsightProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return -1;
    };

    match handle.processor.load_log(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Sprout functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Sprout function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sprout_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string, valid until the next
///   Sprout function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sprout_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sprout_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
