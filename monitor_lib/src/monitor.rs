//! Execution monitoring: time a unit of work and report failures upstream.

use crate::client::Client;
use crate::error::Error;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

/// Sink for monitoring diagnostics. The library never writes to the console
/// directly; embedders can route these wherever they want via
/// [`Client::with_observer`].
pub trait TimingObserver: Send + Sync {
    /// Called once per monitored execution, success or failure, with the
    /// elapsed wall-clock time.
    fn on_complete(&self, function_name: &str, elapsed: Duration);

    /// Called when reporting a failure to the API itself failed. The
    /// reporting failure is never raised to the caller.
    fn on_report_failure(&self, function_name: &str, error: &Error) {
        let _ = (function_name, error);
    }
}

/// Default observer: prints timing lines to stderr.
pub struct StderrObserver;

impl TimingObserver for StderrObserver {
    fn on_complete(&self, function_name: &str, elapsed: Duration) {
        eprintln!(
            "[monitor] {} completed in {:.2}s",
            function_name,
            elapsed.as_secs_f64()
        );
    }

    fn on_report_failure(&self, function_name: &str, error: &Error) {
        eprintln!(
            "[monitor] failed to report error for {}: {}",
            function_name, error
        );
    }
}

impl Client {
    /// Execute `op`, measure its duration, and pass its result through
    /// unchanged.
    ///
    /// On failure a best-effort error report is sent via
    /// [`Client::log_test_error`] with the error's type name (uppercased)
    /// and a `"<name>: <error>"` message. A failed report goes to the
    /// observer and never replaces the original error. The timing
    /// diagnostic is emitted in every case before returning.
    pub async fn monitor_function<T, E, F, Fut>(&self, function_name: &str, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = Instant::now();
        let result = op().await;
        if let Err(ref err) = result {
            let message = format!("{}: {}", function_name, err);
            if let Err(report_err) = self
                .log_test_error(Some(&error_category::<E>()), Some(&message))
                .await
            {
                self.observer.on_report_failure(function_name, &report_err);
            }
        }
        self.observer.on_complete(function_name, start.elapsed());
        result
    }
}

/// Uppercased short type name of `E`, e.g. `monitor_lib::error::Error`
/// becomes `ERROR`. Generic parameters are stripped.
fn error_category<E: ?Sized>() -> String {
    let name = std::any::type_name::<E>();
    let name = name.split('<').next().unwrap_or(name);
    let name = name.rsplit("::").next().unwrap_or(name);
    name.to_uppercase()
}
