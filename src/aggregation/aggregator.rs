use std::collections::HashMap;

use tracing::debug;

use crate::config::TypeDepsConfig;
use crate::types::{AggregatedEdge, DependencyReport, ReferenceEdge, SourceGroup, TargetCount};

/// Groups raw reference edges into a ranked per-source-type report.
///
/// Edges are keyed by the qualified display names of both ends, so two
/// identities that differ only in module collapse into one entry.
#[derive(Debug, Clone)]
pub struct ReferenceAggregator {
    exclude_self_references: bool,
    min_count: usize,
}

impl ReferenceAggregator {
    /// An aggregator that keeps every edge.
    pub fn new() -> Self {
        Self {
            exclude_self_references: false,
            min_count: 1,
        }
    }

    /// Applies the report filters from the configuration.
    pub fn from_config(config: &TypeDepsConfig) -> Self {
        Self {
            exclude_self_references: config.exclude_self_references,
            min_count: config.min_count.max(1),
        }
    }

    /// Drops edges whose source and target are the same type.
    pub fn exclude_self_references(mut self, exclude: bool) -> Self {
        self.exclude_self_references = exclude;
        self
    }

    /// Drops pairs seen fewer than `min_count` times.
    pub fn min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count.max(1);
        self
    }

    /// Counts edges per `(from, to)` pair, in order of first appearance.
    pub fn pairs(&self, edges: &[ReferenceEdge]) -> Vec<AggregatedEdge> {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut pairs: Vec<AggregatedEdge> = Vec::new();

        for edge in edges {
            let key = (edge.from.qualified_name(), edge.to.qualified_name());
            // Same key as the report, so `T -> T` across modules is still a self edge.
            if self.exclude_self_references && key.0 == key.1 {
                continue;
            }
            match index.get(&key) {
                Some(&i) => pairs[i].count += 1,
                None => {
                    index.insert(key.clone(), pairs.len());
                    pairs.push(AggregatedEdge {
                        from: key.0,
                        to: key.1,
                        count: 1,
                    });
                }
            }
        }

        pairs.retain(|p| p.count >= self.min_count);
        pairs
    }

    /// Builds the ranked report.
    ///
    /// Source groups appear in order of their first edge. Inside a group,
    /// targets are sorted by count, highest first; the sort is stable so
    /// equal counts keep their first-appearance order.
    pub fn aggregate(&self, edges: &[ReferenceEdge]) -> DependencyReport {
        let pairs = self.pairs(edges);
        let mut group_index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<SourceGroup> = Vec::new();

        for pair in pairs {
            let i = *group_index.entry(pair.from.clone()).or_insert_with(|| {
                groups.push(SourceGroup {
                    from: pair.from.clone(),
                    targets: Vec::new(),
                });
                groups.len() - 1
            });
            groups[i].targets.push(TargetCount {
                to: pair.to,
                count: pair.count,
            });
        }

        for group in &mut groups {
            group.targets.sort_by(|a, b| b.count.cmp(&a.count));
        }

        debug!(
            edges = edges.len(),
            groups = groups.len(),
            "aggregated reference edges"
        );
        DependencyReport { groups }
    }
}

impl Default for ReferenceAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregates with default settings.
pub fn aggregate(edges: &[ReferenceEdge]) -> DependencyReport {
    ReferenceAggregator::new().aggregate(edges)
}
