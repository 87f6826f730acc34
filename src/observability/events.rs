//! Observable lifecycle events
//!
//! Events are explicit and typed; the string form is what appears in the
//! `event` field of a log line.

use std::fmt;

/// Observable events in the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration resolved from file, arguments and environment
    ConfigLoaded,
    /// Document store opened and reachable
    StoreConnected,
    /// Listener bound, ready to serve
    ServerListening,
    /// Server loop exited
    ServerStopped,

    // Requests
    /// Request accepted by a handler
    RequestReceived,
    /// Store filter resolved for a list request
    QueryBuilt,
    /// Response written with a success status
    RequestComplete,
    /// Request failed at some phase
    RequestFailed,
    /// Request scope dropped without an outcome
    RequestIncomplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreConnected => "STORE_CONNECTED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::ServerStopped => "SERVER_STOPPED",

            Event::RequestReceived => "REQUEST_RECEIVED",
            Event::QueryBuilt => "QUERY_BUILT",
            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::RequestIncomplete => "REQUEST_INCOMPLETE",
        }
    }

    /// Whether this event indicates a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::RequestFailed | Event::RequestIncomplete)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
