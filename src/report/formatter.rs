use crate::types::{DependencyReport, ReferenceEdge};

/// Header line printed above the text report.
pub const SUMMARY_HEADER: &str = "===== Summary of dependencies";

/// Formats a report as plain text: one `FROM:` line per source type, then
/// one line per target with its count and qualified name.
pub fn format_report_as_text(report: &DependencyReport) -> String {
    let mut out = String::new();
    out.push_str(SUMMARY_HEADER);
    out.push('\n');

    for group in &report.groups {
        out.push_str(&format!("FROM: {}\n", group.from));
        for target in &group.targets {
            out.push_str(&format!("     \t=>\t{}\t\t{}\n", target.count, target.to));
        }
    }

    out
}

/// Formats a report as pretty-printed JSON.
pub fn format_report_as_json(report: &DependencyReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Formats raw edges one per line as `file:line:col<TAB>from -> to`.
pub fn format_edges_as_text(edges: &[ReferenceEdge]) -> String {
    let mut out = String::new();
    for edge in edges {
        out.push_str(&format!("{}\t{} -> {}\n", edge.location, edge.from, edge.to));
    }
    out
}

/// Formats raw edges as a pretty-printed JSON array.
pub fn format_edges_as_json(edges: &[ReferenceEdge]) -> String {
    serde_json::to_string_pretty(edges).unwrap_or_else(|_| "[]".to_string())
}
