//! Client core for the résumé dashboard app.
//!
//! # Overview
//! Resolves a user's profile and resumes from the hosted backend, derives
//! dashboard stats and insights, and provides the crash log and the
//! safe-async guard used around UI-triggered operations.
//!
//! # Design
//! - `BackendClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. `HttpBackend` drives it through a
//!   host-supplied `Transport`.
//! - `DashboardService` is generic over the `Backend` trait and every public
//!   operation returns a value, never an error.
//! - Derivation (`stats`, `insights`) is pure and shared with the C ABI.
//! - `CrashLogger` and `SafeAsync` are constructed by the composition root
//!   and passed where needed; nothing here is a global.

pub mod backend;
pub mod client;
pub mod config;
pub mod crash_log;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod http;
pub mod insights;
pub mod stats;
pub mod types;

pub use backend::{Backend, HttpBackend};
pub use client::BackendClient;
pub use config::{AppConfig, ConfigError, DashboardConfig};
pub use crash_log::{CrashFields, CrashLogEntry, CrashLogger, CrashSink};
pub use dashboard::{assemble_dashboard, DashboardService};
pub use error::ApiError;
pub use guard::{safe_async, GuardOptions, Notifier, SafeAsync};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{
    DashboardStats, DashboardUser, Insight, InsightType, ParsedContent, Priority, Profile, Resume,
    ResumeStatus, Role, SessionUser, UserDashboardData,
};
