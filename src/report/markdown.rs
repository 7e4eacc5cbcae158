//! Deterministic markdown rendering of a validated report.

use super::IncidentReport;

/// Render a report as a markdown document.
///
/// Pure and deterministic: the same report always yields a byte-identical
/// document. Section order is fixed, and every section is emitted even
/// when its list is empty — except `## Related Incidents`, which only
/// appears when related incidents are present. Field content is trusted
/// human-authored prose and is not escaped.
pub fn render(report: &IncidentReport) -> String {
    let systems = report.affected_systems.iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n");

    let timeline = report
        .timeline
        .iter()
        .map(|event| {
            let severity = event.severity.as_deref().filter(|s| !s.is_empty()).map(|s| format!(" [{s}]")).unwrap_or_default();
            format!("**{}** - {}{}", event.timestamp, event.event_description, severity)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let actions = report
        .action_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let assigned = item.assigned_to.as_deref().filter(|a| !a.is_empty()).map(|a| format!(" (Assigned: {a})")).unwrap_or_default();
            format!("{}. **[{}]** {}{}", i + 1, item.priority, item.task, assigned)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut md = String::new();
    md.push_str(&format!("# Incident Report: {}\n\n", report.title));
    md.push_str(&format!("## Executive Summary\n{}\n\n", report.executive_summary));
    md.push_str(&format!("## Affected Systems\n{systems}\n\n"));
    md.push_str(&format!("## Timeline\n{timeline}\n\n"));
    md.push_str(&format!("## Root Cause Analysis\n{}\n\n", report.root_cause_hypothesis));
    md.push_str(&format!("## Impact Assessment\n{}\n\n", report.impact_assessment));
    md.push_str(&format!("## Resolution\n{}\n\n", report.resolution_summary));
    md.push_str(&format!("## Action Items\n{actions}\n"));

    if let Some(related) = &report.related_incidents
        && !related.is_empty()
    {
        let lines = related.iter().map(|id| format!("- {id}")).collect::<Vec<_>>().join("\n");
        md.push_str(&format!("\n## Related Incidents\n{lines}"));
    }

    md
}

// Tests.
