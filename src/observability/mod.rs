//! Observability subsystem
//!
//! Structured JSON logging, counters, and begin/complete scopes.
//!
//! # Principles
//!
//! 1. Observability is read-only; it never changes a decision or outcome
//! 2. No async or background threads
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use covercanon::observability::{Event, Logger, MetricsRegistry, ObservationScope};
//!
//! Logger::info(Event::AliasIndexBuilt.as_str(), &[("entries", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_recall(false);
//!
//! let scope = ObservationScope::new("COMPARISON");
//! // ... resolve ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log an event with fields at the severity its kind implies
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
