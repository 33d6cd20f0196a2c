/// Formats dependency reports and raw edges as text or JSON.
pub mod formatter;

pub use formatter::{
    format_edges_as_json, format_edges_as_text, format_report_as_json, format_report_as_text,
    SUMMARY_HEADER,
};
