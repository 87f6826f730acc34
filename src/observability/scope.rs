//! RequestScope for per-request lifecycle logging
//!
//! - Logs REQUEST_RECEIVED on creation
//! - Logs REQUEST_COMPLETE or REQUEST_FAILED (with the phase reached) on finish
//! - Logs REQUEST_INCOMPLETE on drop if never finished

use std::fmt;

use uuid::Uuid;

use super::events::Event;
use super::logger::{Logger, Severity};

/// Phases a request moves through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestPhase {
    /// Body read, route resolved
    Received,
    /// Payload checked against the entity schema
    Validated,
    /// Store operation performed
    Executed,
    /// Response produced
    Responded,
}

impl RequestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPhase::Received => "received",
            RequestPhase::Validated => "validated",
            RequestPhase::Executed => "executed",
            RequestPhase::Responded => "responded",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one request from receipt to response
///
/// # Usage
///
/// ```ignore
/// let mut scope = RequestScope::begin("vevent/get");
/// scope.advance(RequestPhase::Validated);
/// // ... do work ...
/// scope.complete(&[("count", "3")]);
/// ```
pub struct RequestScope {
    request_id: String,
    route: String,
    phase: RequestPhase,
    finished: bool,
    timer: Timer,
}

impl RequestScope {
    /// Starts a scope with a fresh request id
    pub fn begin(route: impl Into<String>) -> Self {
        let scope = Self {
            request_id: Uuid::new_v4().to_string(),
            route: route.into(),
            phase: RequestPhase::Received,
            finished: false,
            timer: Timer::new(),
        };
        Logger::trace(
            Event::RequestReceived.as_str(),
            &[("request_id", scope.request_id.as_str()), ("route", scope.route.as_str())],
        );
        scope
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Last phase reached
    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    /// Moves the scope forward; phases never go back.
    pub fn advance(&mut self, phase: RequestPhase) {
        if phase > self.phase {
            self.phase = phase;
        }
    }

    /// Logs REQUEST_COMPLETE at INFO level.
    pub fn complete(mut self, extra_fields: &[(&str, &str)]) {
        self.advance(RequestPhase::Responded);
        self.finished = true;

        let elapsed = self.timer.elapsed_ms();
        let mut fields: Vec<(&str, &str)> = vec![
            ("elapsed_ms", elapsed.as_str()),
            ("request_id", self.request_id.as_str()),
            ("route", self.route.as_str()),
        ];
        fields.extend(extra_fields.iter().copied());

        Logger::info(Event::RequestComplete.as_str(), &fields);
    }

    /// Logs REQUEST_FAILED with the phase the request had reached.
    ///
    /// Client errors log at WARN, server errors at ERROR.
    pub fn fail(mut self, status: u16, reason: &str) {
        self.finished = true;

        let severity = if status >= 500 {
            Severity::Error
        } else {
            Severity::Warn
        };
        let status = status.to_string();
        let elapsed = self.timer.elapsed_ms();
        let fields = [
            ("elapsed_ms", elapsed.as_str()),
            ("phase", self.phase.as_str()),
            ("reason", reason),
            ("request_id", self.request_id.as_str()),
            ("route", self.route.as_str()),
            ("status", status.as_str()),
        ];

        match severity {
            Severity::Error => Logger::error(Event::RequestFailed.as_str(), &fields),
            _ => Logger::warn(Event::RequestFailed.as_str(), &fields),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                Event::RequestIncomplete.as_str(),
                &[
                    ("phase", self.phase.as_str()),
                    ("request_id", self.request_id.as_str()),
                    ("route", self.route.as_str()),
                ],
            );
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Get elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_has_unique_request_id() {
        let a = RequestScope::begin("vnote/get");
        let b = RequestScope::begin("vnote/get");
        assert_ne!(a.request_id(), b.request_id());
        assert!(Uuid::parse_str(a.request_id()).is_ok());
        a.complete(&[]);
        b.complete(&[]);
    }

    #[test]
    fn test_phase_only_moves_forward() {
        let mut scope = RequestScope::begin("vevent/new");
        assert_eq!(scope.phase(), RequestPhase::Received);

        scope.advance(RequestPhase::Executed);
        scope.advance(RequestPhase::Validated);
        assert_eq!(scope.phase(), RequestPhase::Executed);

        scope.fail(404, "Event not found");
    }

    #[test]
    fn test_scope_finish_marks_finished() {
        let scope = RequestScope::begin("vrecipe/get");
        assert!(!scope.is_finished());
        scope.complete(&[("count", "0")]);
    }

    #[test]
    fn test_scope_drop_without_finish() {
        // Logs a warning, must not panic
        let scope = RequestScope::begin("vrecipe/delete");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 10);
    }
}
