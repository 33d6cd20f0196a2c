/// Reference aggregation module.
///
/// Turns the raw edge stream of an analysis run into per-pair counts and a
/// ranked per-source-type report.
mod aggregator;

pub use aggregator::{aggregate, ReferenceAggregator};
