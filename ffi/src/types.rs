//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, boxed slices instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use resume_core::config::DashboardConfig;
use resume_core::{
    ApiError, BackendClient, DashboardStats, HttpMethod, Insight, InsightType, Priority,
    UserDashboardData,
};

/// Opaque handle to a `BackendClient` plus the dashboard settings used when
/// parsing. C callers pass it back into every FFI function.
pub struct FfiBackendClient {
    pub(crate) inner: BackendClient,
    pub(crate) dashboard: DashboardConfig,
}

/// Copy `s` into a C string owned by the caller. Interior NULs are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|&b| b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned reference.
pub(crate) unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Move a `Vec` to the heap as a raw pointer + length pair.
fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let boxed: Box<[T]> = items.into_boxed_slice();
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaim a slice produced by `into_raw_slice`.
///
/// # Safety
/// `ptr`/`len` must come from `into_raw_slice` and not have been freed.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

/// Free a C string produced by `into_c_string`. Null is ignored.
///
/// # Safety
/// `ptr` must be null or come from `into_c_string` and not have been freed.
pub(crate) unsafe fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `resume_build_*` functions. The C caller executes the request
/// and passes the response back through `resume_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: resume_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: into_c_string(k),
                value: into_c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_slice(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: into_c_string(req.path),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), into_c_string),
        }))
    }

    /// Release every allocation owned by this request.
    ///
    /// # Safety
    /// The fields must have been produced by `from_core`.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.path);
            free_c_string(self.body);
            for header in from_raw_slice(self.headers, self.headers_len) {
                free_c_string(header.key);
                free_c_string(header.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `resume_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result payloads
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Unauthorized = 2,
    Http = 3,
    Transport = 4,
    Deserialization = 5,
    Serialization = 6,
    Panic = 7,
    NullArg = 8,
    InvalidArg = 9,
}

/// Tag that tells `resume_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Dashboard = 1,
    InsightList = 2,
    String = 3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FfiDashboardStats {
    pub score: u32,
    pub views: u32,
    pub interviews: u32,
    pub applications: u32,
    pub responses: u32,
    pub views_change: i32,
    pub applications_change: i32,
    pub responses_change: i32,
    pub interviews_change: i32,
}

impl From<DashboardStats> for FfiDashboardStats {
    fn from(s: DashboardStats) -> Self {
        Self {
            score: s.score,
            views: s.views,
            interviews: s.interviews,
            applications: s.applications,
            responses: s.responses,
            views_change: s.views_change,
            applications_change: s.applications_change,
            responses_change: s.responses_change,
            interviews_change: s.interviews_change,
        }
    }
}

/// The dashboard header: user identity plus derived stats.
#[repr(C)]
pub struct FfiDashboard {
    pub user_id: *mut c_char,
    pub name: *mut c_char,
    pub email: *mut c_char,
    pub avatar: *mut c_char,
    pub stats: FfiDashboardStats,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiInsightType {
    Suggestion = 0,
    Improvement = 1,
    Achievement = 2,
}

impl From<InsightType> for FfiInsightType {
    fn from(kind: InsightType) -> Self {
        match kind {
            InsightType::Suggestion => FfiInsightType::Suggestion,
            InsightType::Improvement => FfiInsightType::Improvement,
            InsightType::Achievement => FfiInsightType::Achievement,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPriority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl From<Priority> for FfiPriority {
    fn from(p: Priority) -> Self {
        match p {
            Priority::Low => FfiPriority::Low,
            Priority::Medium => FfiPriority::Medium,
            Priority::High => FfiPriority::High,
        }
    }
}

#[repr(C)]
pub struct FfiInsight {
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub kind: FfiInsightType,
    pub priority: FfiPriority,
}

#[repr(C)]
pub struct FfiInsightList {
    pub items: *mut FfiInsight,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: into_c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Build a success result carrying an `FfiDashboard`.
    pub(crate) fn ok_dashboard(data: UserDashboardData) -> *mut Self {
        let dashboard = Box::new(FfiDashboard {
            user_id: into_c_string(data.user.id.to_string()),
            name: into_c_string(data.user.name),
            email: into_c_string(data.user.email),
            avatar: into_c_string(data.user.avatar),
            stats: data.stats.into(),
        });
        Self::ok(FfiDataTag::Dashboard, Box::into_raw(dashboard) as *mut c_void)
    }

    /// Build a success result carrying an `FfiInsightList`.
    pub(crate) fn ok_insights(insights: Vec<Insight>) -> *mut Self {
        let items: Vec<FfiInsight> = insights
            .into_iter()
            .map(|i| FfiInsight {
                title: into_c_string(i.title),
                description: into_c_string(i.description),
                kind: i.kind.into(),
                priority: i.priority.into(),
            })
            .collect();
        let (items, len) = into_raw_slice(items);
        let list = Box::new(FfiInsightList { items, len });
        Self::ok(FfiDataTag::InsightList, Box::into_raw(list) as *mut c_void)
    }

    /// Build a success result carrying a C string.
    pub(crate) fn ok_string(s: String) -> *mut Self {
        Self::ok(FfiDataTag::String, into_c_string(s) as *mut c_void)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::Unauthorized { status } => (FfiErrorCode::Unauthorized, *status),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
        };
        Self::error(code, status, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn invalid_arg(name: &str, reason: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidArg, 0, format!("invalid argument {name}: {reason}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// Release the payload according to `data_tag`.
    ///
    /// # Safety
    /// `data` must have been produced by one of the `ok_*` constructors.
    pub(crate) unsafe fn free_fields(&self) {
        unsafe {
            free_c_string(self.error_message);
            if self.data.is_null() {
                return;
            }
            match self.data_tag {
                FfiDataTag::Dashboard => {
                    let d = Box::from_raw(self.data as *mut FfiDashboard);
                    free_c_string(d.user_id);
                    free_c_string(d.name);
                    free_c_string(d.email);
                    free_c_string(d.avatar);
                }
                FfiDataTag::InsightList => {
                    let list = Box::from_raw(self.data as *mut FfiInsightList);
                    for item in from_raw_slice(list.items, list.len) {
                        free_c_string(item.title);
                        free_c_string(item.description);
                    }
                }
                FfiDataTag::String => free_c_string(self.data as *mut c_char),
                FfiDataTag::None => {}
            }
        }
    }
}
