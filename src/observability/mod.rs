//! Observability subsystem
//!
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//! - Per-request scopes carrying a request id and the phase reached
//!
//! # Usage
//!
//! ```ignore
//! use docgate::observability::{Event, Logger, RequestScope};
//!
//! Logger::info(Event::ServerListening.as_str(), &[("addr", "127.0.0.1:8000")]);
//!
//! let scope = RequestScope::begin("vnote/get");
//! // ... do work ...
//! scope.complete(&[("count", "2")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{RequestPhase, RequestScope, Timer};
