//! Begin/complete logging around a unit of work
//!
//! A scope logs `<NAME>_BEGIN` when opened and `<NAME>_COMPLETE` when
//! closed. A scope dropped without being closed logs `<NAME>_ERROR`, so a
//! request that bailed out early still leaves a trace.

use std::time::Instant;

use super::logger::Logger;

/// Logging scope for one pipeline run.
///
/// ```ignore
/// let scope = ObservationScope::with_fields("COMPARISON", &[("request_id", id)]);
/// // ... resolve ...
/// scope.complete_with_fields(&[("state", "comparable")]);
/// ```
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    closed: bool,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Opens a scope; `fields` are repeated on every event it logs.
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);
        Self {
            name,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            closed: false,
        }
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Closes the scope, adding `extra` to the scope's own fields.
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        let mut fields = self.borrowed_fields();
        fields.extend_from_slice(extra);
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Closes the scope as failed.
    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        let mut fields = self.borrowed_fields();
        fields.push(("reason", reason));
        Logger::error(&format!("{}_ERROR", self.name), &fields);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn borrowed_fields(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            let mut fields = self.borrowed_fields();
            fields.push(("reason", "scope dropped without completion"));
            Logger::error(&format!("{}_ERROR", self.name), &fields);
        }
    }
}

/// Wall-clock timer for `elapsed_ms` log fields.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

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
    fn test_scope_keeps_fields() {
        let scope = ObservationScope::with_fields("COMPARISON", &[("request_id", "r-1")]);
        assert_eq!(scope.name(), "COMPARISON");
        assert_eq!(scope.borrowed_fields(), vec![("request_id", "r-1")]);
        scope.complete_with_fields(&[("state", "comparable")]);
    }

    #[test]
    fn test_scope_close_paths() {
        ObservationScope::new("CLASSIFY").complete();
        ObservationScope::new("CLASSIFY").fail("bad rows");
        drop(ObservationScope::new("CLASSIFY"));
    }

    #[test]
    fn test_timer_counts_up() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let ms: u64 = timer.elapsed_ms().parse().unwrap();
        assert!(ms >= 5);
    }
}
