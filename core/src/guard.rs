//! Guard combinator for fallible async operations.
//!
//! `SafeAsync::run` awaits an operation and turns any `Err` into `None`
//! after recording it in the crash log, optionally telling the user that
//! something went wrong and running a fallback. The caller only ever sees
//! `Some(value)` or `None`.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::crash_log::{BoxError, CrashFields, CrashLogger};

/// Shown to the user instead of the underlying error.
pub const GENERIC_ERROR_TITLE: &str = "Error";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Surfaces a user-facing alert. Implemented by the UI layer.
pub trait Notifier: Send + Sync {
    fn show_error(&self, title: &str, message: &str);
}

pub type Fallback = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync>;

#[derive(Clone)]
pub struct GuardOptions {
    fallback: Option<Fallback>,
    show_error: bool,
    log_error: bool,
    action: String,
    fields: Option<CrashFields>,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            fallback: None,
            show_error: false,
            log_error: true,
            action: "unknown".to_string(),
            fields: None,
        }
    }
}

impl std::fmt::Debug for GuardOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardOptions")
            .field("action", &self.action)
            .field("show_error", &self.show_error)
            .field("log_error", &self.log_error)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl GuardOptions {
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn show_error(mut self, show: bool) -> Self {
        self.show_error = show;
        self
    }

    pub fn log_error(mut self, log: bool) -> Self {
        self.log_error = log;
        self
    }

    pub fn fields(mut self, fields: CrashFields) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn action_label(&self) -> &str {
        &self.action
    }
}

#[derive(Clone)]
pub struct SafeAsync {
    logger: Arc<CrashLogger>,
    notifier: Option<Arc<dyn Notifier>>,
    interactive: bool,
}

impl SafeAsync {
    /// A guard with no UI attached; `show_error` has no effect.
    pub fn new(logger: Arc<CrashLogger>) -> Self {
        Self {
            logger,
            notifier: None,
            interactive: false,
        }
    }

    /// Attach a notifier and mark the environment interactive.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self.interactive = true;
        self
    }

    /// Override interactivity, e.g. to silence alerts under test.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn logger(&self) -> &Arc<CrashLogger> {
        &self.logger
    }

    pub async fn run<T, E, Fut>(&self, op: Fut, options: &GuardOptions) -> Option<T>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        match op.await {
            Ok(value) => Some(value),
            Err(e) => {
                self.handle_failure(e.into(), options);
                None
            }
        }
    }

    /// Wrap `f` so every call through `Wrapped::call` is guarded with
    /// `options`.
    pub fn wrap<F>(&self, f: F, options: GuardOptions) -> Wrapped<F> {
        Wrapped {
            guard: self.clone(),
            f,
            options,
        }
    }

    fn handle_failure(&self, error: BoxError, options: &GuardOptions) {
        if options.log_error {
            self.logger.log(&*error, &options.action, options.fields.clone());
        } else {
            tracing::debug!(action = %options.action, error = %error, "guarded failure");
        }

        if options.show_error && self.interactive {
            if let Some(notifier) = &self.notifier {
                notifier.show_error(GENERIC_ERROR_TITLE, GENERIC_ERROR_MESSAGE);
            }
        }

        if let Some(fallback) = &options.fallback {
            match catch_unwind(AssertUnwindSafe(|| fallback())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(action = %options.action, error = %e, "fallback failed");
                }
                Err(_) => {
                    tracing::warn!(action = %options.action, "fallback panicked");
                }
            }
        }
    }
}

/// A function whose every invocation runs under the same guard.
pub struct Wrapped<F> {
    guard: SafeAsync,
    f: F,
    options: GuardOptions,
}

impl<F> Wrapped<F> {
    pub async fn call<A, T, E, Fut>(&self, args: A) -> Option<T>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        self.guard.run((self.f)(args), &self.options).await
    }
}

/// Run `op` under a non-interactive guard.
pub async fn safe_async<T, E, Fut>(
    logger: &Arc<CrashLogger>,
    op: Fut,
    options: &GuardOptions,
) -> Option<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    SafeAsync::new(Arc::clone(logger)).run(op, options).await
}
