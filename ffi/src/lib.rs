//! C-ABI wrapper around `resume-core`.
//!
//! # Overview
//! Exposes the dashboard's request building, response parsing and pure
//! derivations through `extern "C"` functions so a mobile or desktop host can
//! do its own networking and still share the Rust logic.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary. A caught panic is recorded in the
//!   process-wide crash log.
//! - The host executes each `FfiHttpRequest` and hands the raw response back
//!   to the matching `resume_parse_*` function.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data` conveys
//!   success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `resume_free_*` function to release them.

pub mod logging;
pub mod types;

use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::sync::OnceLock;

use resume_core::config::{AppConfig, DEFAULT_CRASH_LOG_CAPACITY};
use resume_core::dashboard::{assemble_dashboard, recover};
use resume_core::insights::{default_insights, insights_for};
use resume_core::stats::{derive_stats, display_name_from_email, select_avatar};
use resume_core::{BackendClient, CrashFields, CrashLogger, HttpResponse, Profile, Resume};

use types::*;

// ---------------------------------------------------------------------------
// Process-wide crash log
// ---------------------------------------------------------------------------

static CRASH_LOG: OnceLock<CrashLogger> = OnceLock::new();

/// The shared crash log, created on first use with the capacity from
/// `RESUME_CRASH_LOG_CAPACITY` when set.
fn crash_log() -> &'static CrashLogger {
    CRASH_LOG.get_or_init(|| {
        let capacity = AppConfig::default()
            .apply_env()
            .map(|c| c.crash_log.capacity)
            .unwrap_or(DEFAULT_CRASH_LOG_CAPACITY);
        CrashLogger::new(capacity)
    })
}

/// Record a caught panic and build the matching error result.
fn panicked(function: &str) -> *mut FfiResult {
    crash_log().log_message(&format!("panic in {function}"), function, None);
    FfiResult::panic(&format!("panic in {function}"))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url` with the default dashboard settings.
///
/// Returns null if either argument is null or not UTF-8.
/// The caller must free the returned pointer with `resume_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_client_new(
    base_url: *const c_char,
    anon_key: *const c_char,
) -> *mut FfiBackendClient {
    catch_unwind(|| {
        let (Some(url), Some(key)) = (unsafe { read_str(base_url) }, unsafe { read_str(anon_key) })
        else {
            return std::ptr::null_mut();
        };
        let config = AppConfig::default();
        Box::into_raw(Box::new(FfiBackendClient {
            inner: BackendClient::new(url, key),
            dashboard: config.dashboard,
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from a JSON configuration document. Environment
/// overrides (`RESUME_BACKEND_URL`, `RESUME_BACKEND_ANON_KEY`) apply on top.
///
/// Returns null if `config_json` is null or the configuration is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn resume_client_from_config(config_json: *const c_char) -> *mut FfiBackendClient {
    catch_unwind(|| {
        let Some(raw) = (unsafe { read_str(config_json) }) else {
            return std::ptr::null_mut();
        };
        let config = match AppConfig::from_json(raw).and_then(AppConfig::apply_env) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "rejected client configuration");
                return std::ptr::null_mut();
            }
        };
        Box::into_raw(Box::new(FfiBackendClient {
            inner: BackendClient::new(&config.backend.base_url, &config.backend.anon_key),
            dashboard: config.dashboard,
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Set the signed-in user's access token. A null `token` signs out.
///
/// Returns false if `client` is null or `token` is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn resume_client_set_access_token(
    client: *mut FfiBackendClient,
    token: *const c_char,
) -> bool {
    catch_unwind(|| {
        if client.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        if token.is_null() {
            client.inner.set_access_token(None);
            return true;
        }
        match unsafe { read_str(token) } {
            Some(token) => {
                client.inner.set_access_token(Some(token.to_string()));
                true
            }
            None => false,
        }
    })
    .unwrap_or(false)
}

/// Free a client created by `resume_client_new` or
/// `resume_client_from_config`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn resume_client_free(client: *mut FfiBackendClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the lookup of the profile whose id is `user_id`.
///
/// Returns null if an argument is null or `user_id` is not a UUID.
/// The caller must free the returned pointer with `resume_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_build_profile_by_id(
    client: *const FfiBackendClient,
    user_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = (unsafe { read_str(user_id) }).and_then(|s| uuid::Uuid::parse_str(s).ok())
        else {
            return std::ptr::null_mut();
        };
        let req = client
            .inner
            .build_lookup_by_key(&client.dashboard.profiles_table, "id", &id.to_string());
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the lookup of the profile registered under `email`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_build_profile_by_email(
    client: *const FfiBackendClient,
    email: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(email) = (unsafe { read_str(email) }) else {
            return std::ptr::null_mut();
        };
        let req = client
            .inner
            .build_lookup_by_key(&client.dashboard.profiles_table, "email", email);
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the listing of resumes owned by `owner_id`, newest first.
///
/// A negative `limit` means no limit. Pass 1 to fetch only the latest
/// resume for `resume_parse_insights`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_build_resumes_by_owner(
    client: *const FfiBackendClient,
    owner_id: *const c_char,
    limit: i32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(owner) = (unsafe { read_str(owner_id) }).and_then(|s| uuid::Uuid::parse_str(s).ok())
        else {
            return std::ptr::null_mut();
        };
        let limit = u32::try_from(limit).ok();
        let req = client.inner.build_list_by_owner(
            &client.dashboard.resumes_table,
            &client.dashboard.owner_column,
            &owner.to_string(),
            limit,
        );
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request for the user behind the client's access token.
#[unsafe(no_mangle)]
pub extern "C" fn resume_build_session_user(client: *const FfiBackendClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_session_user())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty; `None` means the body is not UTF-8.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Option<HttpResponse> {
    if resp.body.is_null() {
        return Some(HttpResponse::new(resp.status, ""));
    }
    unsafe { read_str(resp.body) }.map(|body| HttpResponse::new(resp.status, body))
}

const NOT_UTF8: &str = "body is not UTF-8";

/// Parse the session-user response into the signed-in user's email.
///
/// Returns `data_tag = String` on success. No signed-in user, or a user
/// without an email, is `NotFound`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_parse_session_email(
    client: *const FfiBackendClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = match ffi_response_to_core(unsafe { &*response }) {
            Some(resp) => resp,
            None => return FfiResult::invalid_arg("response", NOT_UTF8),
        };
        match client.inner.parse_session_user(resp) {
            Ok(user) => match user.and_then(|u| u.email) {
                Some(email) => FfiResult::ok_string(email),
                None => FfiResult::from_error(resume_core::ApiError::NotFound),
            },
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| panicked("resume_parse_session_email"))
}

/// Assemble the dashboard from a profile lookup and a resume listing.
///
/// A failed profile lookup is returned as an error so the host can retry by
/// session email. `resumes` may be null; a null or failed listing counts as
/// no resumes. Returns `data_tag = Dashboard` on success.
#[unsafe(no_mangle)]
pub extern "C" fn resume_parse_dashboard(
    client: *const FfiBackendClient,
    profile: *const FfiHttpResponse,
    resumes: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if profile.is_null() {
            return FfiResult::null_arg("profile");
        }
        let client = unsafe { &*client };
        let profile_resp = match ffi_response_to_core(unsafe { &*profile }) {
            Some(resp) => resp,
            None => return FfiResult::invalid_arg("profile", NOT_UTF8),
        };
        let profile: Profile = match client.inner.parse_lookup(profile_resp) {
            Ok(profile) => profile,
            Err(e) => return FfiResult::from_error(e),
        };
        let resumes: Vec<Resume> = if resumes.is_null() {
            Vec::new()
        } else {
            let resp = match ffi_response_to_core(unsafe { &*resumes }) {
                Some(resp) => resp,
                None => return FfiResult::invalid_arg("resumes", NOT_UTF8),
            };
            recover(client.inner.parse_list(resp), "list_resumes").unwrap_or_default()
        };
        FfiResult::ok_dashboard(assemble_dashboard(&profile, &resumes, &client.dashboard))
    })
    .unwrap_or_else(|_| panicked("resume_parse_dashboard"))
}

/// Derive insights from a newest-first resume listing.
///
/// Never fails for a valid client: a null, unreadable or failed listing
/// yields the default insight.
/// Returns `data_tag = InsightList`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_parse_insights(
    client: *const FfiBackendClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let client = unsafe { &*client };
        if response.is_null() {
            return FfiResult::ok_insights(default_insights());
        }
        let insights = ffi_response_to_core(unsafe { &*response })
            .and_then(|resp| recover(client.inner.parse_list::<Resume>(resp), "get_ai_insights"))
            .map(|rows| insights_for(rows.first()))
            .unwrap_or_else(default_insights);
        FfiResult::ok_insights(insights)
    })
    .unwrap_or_else(|_| panicked("resume_parse_insights"))
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Stats for `record_count` resumes of which `processed_count` are processed,
/// against the default baseline.
#[unsafe(no_mangle)]
pub extern "C" fn resume_derive_stats(record_count: u32, processed_count: u32) -> FfiDashboardStats {
    let baseline = resume_core::DashboardStats::default();
    derive_stats(record_count, processed_count, &baseline).into()
}

/// Display name derived from the local part of `email`.
///
/// Returns null if `email` is null. Free with `resume_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_display_name_from_email(email: *const c_char) -> *mut c_char {
    catch_unwind(|| match unsafe { read_str(email) } {
        Some(email) => into_c_string(display_name_from_email(email)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Avatar URL for `seed` from the client's configured pool.
///
/// Returns null if an argument is null. Free with `resume_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_select_avatar(
    client: *const FfiBackendClient,
    seed: *const c_char,
) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match unsafe { read_str(seed) }.and_then(|s| select_avatar(s, &client.dashboard.avatars)) {
            Some(avatar) => into_c_string(avatar.to_string()),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Crash log
// ---------------------------------------------------------------------------

/// Create the crash log with `capacity` entries. Returns false if it already
/// exists, in which case the existing capacity stays.
#[unsafe(no_mangle)]
pub extern "C" fn resume_crash_log_init(capacity: u32) -> bool {
    catch_unwind(|| CRASH_LOG.set(CrashLogger::new(capacity as usize)).is_ok()).unwrap_or(false)
}

/// Record a failure reported by the host. `user_id` may be null.
///
/// Returns false if `action` or `message` is null.
#[unsafe(no_mangle)]
pub extern "C" fn resume_crash_log(
    action: *const c_char,
    message: *const c_char,
    user_id: *const c_char,
) -> bool {
    catch_unwind(|| {
        let (Some(action), Some(message)) = (unsafe { read_str(action) }, unsafe { read_str(message) })
        else {
            return false;
        };
        let fields = unsafe { read_str(user_id) }.map(CrashFields::user);
        crash_log().log_message(message, action, fields);
        true
    })
    .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn resume_crash_log_len() -> u32 {
    catch_unwind(|| crash_log().len() as u32).unwrap_or(0)
}

/// The buffered entries as a JSON array, oldest first.
///
/// Free with `resume_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn resume_crash_logs_json() -> *mut c_char {
    catch_unwind(|| match serde_json::to_string(&crash_log().get_logs()) {
        Ok(json) => into_c_string(json),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn resume_crash_log_clear() {
    let _ = catch_unwind(|| crash_log().clear_logs());
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install the stderr logger. Returns false if one is already installed.
#[unsafe(no_mangle)]
pub extern "C" fn resume_init_logging() -> bool {
    catch_unwind(logging::init).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `resume_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn resume_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        unsafe { req.free_fields() };
    });
}

/// Free an `FfiResult` returned by any `resume_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn resume_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        unsafe { result.free_fields() };
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn resume_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| unsafe { free_c_string(s) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
