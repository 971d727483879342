//! Request-scoped diagnostic trace.
//!
//! Each detect/remove call owns one trace and passes it down explicitly.
//! Every event is also forwarded to the `log` facade, so a disabled trace
//! still shows up under `RUST_LOG=unmark=debug`.

use serde::{Deserialize, Serialize};

/// Severity of a trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Routine decision
    Info,
    /// Recovered fault
    Warn,
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Severity
    pub level: TraceLevel,
    /// Container name, when the event belongs to one
    pub container: Option<String>,
    /// Element name, when the event belongs to one
    pub element: Option<String>,
    /// Group nesting depth (0 = direct child of the container)
    pub depth: usize,
    /// Human-readable message
    pub message: String,
}

/// Collects diagnostic events for one invocation.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticTrace {
    enabled: bool,
    events: Vec<TraceEvent>,
    warnings: usize,
}

impl DiagnosticTrace {
    /// A trace that records events.
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// A trace that only forwards to the logger.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether events are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a routine event.
    pub fn note(
        &mut self,
        container: &str,
        element: Option<&str>,
        depth: usize,
        message: impl Into<String>,
    ) {
        let message = message.into();
        log::debug!("[{}] {}{}", container, indent(depth), message);
        self.push(TraceLevel::Info, container, element, depth, message);
    }

    /// Record a recovered fault.
    pub fn warn(
        &mut self,
        container: &str,
        element: Option<&str>,
        depth: usize,
        message: impl Into<String>,
    ) {
        let message = message.into();
        log::warn!("[{}] {}", container, message);
        self.warnings += 1;
        self.push(TraceLevel::Warn, container, element, depth, message);
    }

    fn push(
        &mut self,
        level: TraceLevel,
        container: &str,
        element: Option<&str>,
        depth: usize,
        message: String,
    ) {
        if !self.enabled {
            return;
        }
        self.events.push(TraceEvent {
            level,
            container: Some(container.to_string()),
            element: element.map(String::from),
            depth,
            message,
        });
    }

    /// Recorded events in order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of warnings seen, recorded or not.
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Consume the trace and return its events.
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_trace_records() {
        let mut trace = DiagnosticTrace::new();
        trace.note("Layout1", Some("Picture 3"), 0, "corner picture");
        trace.warn("Layout1", None, 0, "rels unreadable");

        assert_eq!(trace.events().len(), 2);
        assert_eq!(trace.events()[1].level, TraceLevel::Warn);
        assert_eq!(trace.events()[0].element.as_deref(), Some("Picture 3"));
        assert_eq!(trace.warning_count(), 1);
    }

    #[test]
    fn test_disabled_trace_counts_only() {
        let mut trace = DiagnosticTrace::disabled();
        trace.note("Page1", None, 0, "ignored");
        trace.warn("Page1", None, 0, "counted");

        assert!(!trace.is_enabled());
        assert!(trace.events().is_empty());
        assert_eq!(trace.warning_count(), 1);
    }
}
