use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::aggregation::ReferenceAggregator;
use crate::config::{load_config, TypeDepsConfig};
use crate::errors::{Result, TypeDepsError};
use crate::extraction::process;
use crate::semantic::BoundModel;
use crate::snapshot::{discover_snapshots, load_units, BoundTree, CompiledUnit};
use crate::types::{DependencyReport, ReferenceEdge};

/// Drives reference extraction over compiled units and aggregates the result.
pub struct Analyzer {
    config: TypeDepsConfig,
}

/// A tree whose walk hit a resolution inconsistency and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFailure {
    pub path: String,
    pub error: String,
}

/// Result of a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// All raw edges, unit by unit and tree by tree.
    pub edges: Vec<ReferenceEdge>,
    /// The ranked dependency summary.
    pub report: DependencyReport,
    /// Number of compiled units analyzed.
    pub unit_count: usize,
    /// Number of trees walked, failed ones included.
    pub tree_count: usize,
    /// Trees skipped under `continue_on_error`.
    pub failed_trees: Vec<TreeFailure>,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

impl Analyzer {
    pub fn new(config: TypeDepsConfig) -> Self {
        Self { config }
    }

    /// Creates an analyzer with the configuration stored under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        Ok(Self::new(load_config(root)?))
    }

    pub fn config(&self) -> &TypeDepsConfig {
        &self.config
    }

    /// Loads the snapshot at `path` (a file, or a directory searched for
    /// snapshot files) and analyzes it.
    pub async fn analyze_path(&self, path: &Path) -> Result<AnalysisResult> {
        let paths = self.snapshot_paths(path)?;
        let units = load_units(&paths).await?;
        self.analyze_units(&units)
    }

    /// Resolves the snapshot files to load for `path`.
    pub fn snapshot_paths(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        if !path.is_dir() {
            return Err(TypeDepsError::Snapshot {
                message: "no such file or directory".to_string(),
                path: path.display().to_string(),
            });
        }
        let found = discover_snapshots(path, &self.config);
        if found.is_empty() {
            return Err(TypeDepsError::Snapshot {
                message: "no snapshot files found".to_string(),
                path: path.display().to_string(),
            });
        }
        Ok(found)
    }

    /// Walks every tree of every unit, then aggregates all edges.
    pub fn analyze_units(&self, units: &[CompiledUnit]) -> Result<AnalysisResult> {
        let start = Instant::now();
        let mut edges = Vec::new();
        let mut failed_trees = Vec::new();
        let mut tree_count = 0;

        for unit in units {
            let (unit_edges, unit_failures) = self.extract_unit(unit)?;
            tree_count += unit.trees.len();
            edges.extend(unit_edges);
            failed_trees.extend(unit_failures);
        }

        let report = ReferenceAggregator::from_config(&self.config).aggregate(&edges);
        Ok(AnalysisResult {
            edges,
            report,
            unit_count: units.len(),
            tree_count,
            failed_trees,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Extracts the edges of one unit.
    ///
    /// Each tree gets its own walker. Per-tree edge lists are concatenated
    /// in tree order whether or not the walk ran in parallel.
    #[instrument(skip_all, fields(module = %unit.module))]
    pub fn extract_unit(
        &self,
        unit: &CompiledUnit,
    ) -> Result<(Vec<ReferenceEdge>, Vec<TreeFailure>)> {
        if !unit.references.is_empty() {
            info!(references = ?unit.references, "module references");
        }

        let walk_tree = |bound: &BoundTree| {
            info!(path = %bound.tree.path(), "walking tree");
            let model = BoundModel::new(&unit.symbols, &bound.bindings);
            process(&bound.tree, &model)
        };

        let results: Vec<Result<Vec<ReferenceEdge>>> = if self.config.parallel {
            unit.trees.par_iter().map(walk_tree).collect()
        } else {
            unit.trees.iter().map(walk_tree).collect()
        };

        let mut edges = Vec::new();
        let mut failures = Vec::new();
        for (bound, result) in unit.trees.iter().zip(results) {
            match result {
                Ok(tree_edges) => edges.extend(tree_edges),
                Err(e) if self.config.continue_on_error && e.is_fatal_resolution() => {
                    warn!(path = %bound.tree.path(), error = %e, "skipping tree");
                    failures.push(TreeFailure {
                        path: bound.tree.path().to_string(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok((edges, failures))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(TypeDepsConfig::default())
    }
}
