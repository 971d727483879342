//! Plain text rendering for reports.

use std::fmt::Write;

use crate::engine::{DetectionReport, RemovalReport, TraceEvent, TraceLevel};

/// Human-readable summary of a detection run.
pub fn detection_summary(report: &DetectionReport) -> String {
    let mut out = String::new();
    let count = report.watermark_count();
    let _ = writeln!(
        out,
        "{}: {} pictures examined, {} watermark{}",
        report.format,
        report.results.len(),
        count,
        if count == 1 { "" } else { "s" }
    );

    for result in report.watermarks() {
        let position = result
            .position
            .map(|p| {
                let (l, t) = p.percent();
                format!(" at ({:.1}%, {:.1}%)", l, t)
            })
            .unwrap_or_default();
        let rule = result.rule.map(|r| format!(" [{}]", r)).unwrap_or_default();
        let link = result
            .link
            .as_deref()
            .map(|l| format!(" -> {}", l))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} / {}{}{}{}",
            result.container, result.element_name, position, rule, link
        );
    }

    for skipped in &report.skipped {
        let _ = writeln!(out, "  skipped {}: {}", skipped.container, skipped.reason);
    }

    out.trim_end().to_string()
}

/// Human-readable summary of a removal run.
pub fn removal_summary(report: &RemovalReport) -> String {
    if !report.success {
        return report
            .error
            .clone()
            .unwrap_or_else(|| "Error removing watermarks".to_string());
    }

    let mut out = format!("Removed {} watermarks", report.watermarks_removed);
    match report.format {
        Some(crate::DocumentFormat::Pdf) => {
            let _ = write!(
                out,
                " from {} pages ({} links)",
                report.pages_cleaned, report.links_removed
            );
        }
        _ => {
            let _ = write!(
                out,
                " (masters cleaned: {}, layouts cleaned: {})",
                report.masters_cleaned, report.layouts_cleaned
            );
        }
    }
    if report.detach_failures > 0 {
        let _ = write!(out, "; {} could not be detached", report.detach_failures);
    }
    if report.containers_skipped > 0 {
        let _ = write!(out, "; {} containers skipped", report.containers_skipped);
    }
    if let Some(output) = &report.output {
        let _ = write!(out, "\nSaved to {}", output.display());
    }
    out
}

/// One line per trace event, indented by group depth.
pub fn trace_listing(events: &[TraceEvent]) -> String {
    let mut out = String::new();
    for event in events {
        let indent = "  ".repeat(event.depth + 1);
        let marker = match event.level {
            TraceLevel::Info => "",
            TraceLevel::Warn => "WARN ",
        };
        let subject = match (&event.container, &event.element) {
            (Some(c), Some(e)) => format!("[{}] {}: ", c, e),
            (Some(c), None) => format!("[{}] ", c),
            (None, Some(e)) => format!("{}: ", e),
            (None, None) => String::new(),
        };
        let _ = writeln!(out, "{}{}{}{}", indent, marker, subject, event.message);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DocumentFormat;
    use crate::engine::{DiagnosticTrace, ReportAggregator};

    #[test]
    fn test_removal_summary() {
        let report = ReportAggregator::new(DocumentFormat::Pptx).finish();
        assert_eq!(
            removal_summary(&report),
            "Removed 0 watermarks (masters cleaned: 0, layouts cleaned: 0)"
        );

        let failed = RemovalReport::failed("archive: invalid Zip archive");
        assert!(removal_summary(&failed).starts_with("Error removing watermarks"));
    }

    #[test]
    fn test_trace_listing_indents_by_depth() {
        let mut trace = DiagnosticTrace::new();
        trace.note("Page1", Some("Fm0"), 0, "group with 1 children");
        trace.warn("Page1", Some("Im3"), 2, "too deep");

        let listing = trace_listing(trace.events());
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], "  [Page1] Fm0: group with 1 children");
        assert_eq!(lines[1], "      WARN [Page1] Im3: too deep");
    }
}
