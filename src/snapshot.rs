//! Compiled-unit snapshots: the hand-off format between a language
//! front-end and the reference walker.
//!
//! A snapshot holds one unit's module identity, the modules it references,
//! its symbol table, and every bound syntax tree. Loading validates the
//! whole document up front so the walker can rely on well-formed input.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::config::{should_include_file, TypeDepsConfig};
use crate::errors::{Result, TypeDepsError};
use crate::semantic::{BoundModel, ConstantValue, SymbolId, SymbolTable, TreeBindings};
use crate::syntax::{NodeId, SyntaxNode, SyntaxTree};

/// Serialized form of a compiled unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub module: String,
    #[serde(default)]
    pub references: Vec<String>,
    pub symbols: SymbolTable,
    pub trees: Vec<TreeSnapshot>,
}

/// Serialized form of one bound syntax tree. Map keys are node indices,
/// binding values are symbol indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub path: String,
    pub nodes: Vec<SyntaxNode>,
    #[serde(default)]
    pub bindings: BTreeMap<u32, u32>,
    #[serde(default)]
    pub constants: BTreeMap<u32, ConstantValue>,
    #[serde(default)]
    pub declarations: BTreeMap<u32, u32>,
}

/// A syntax tree together with the binder output for it.
#[derive(Debug, Clone)]
pub struct BoundTree {
    pub tree: SyntaxTree,
    pub bindings: TreeBindings,
}

/// A validated compiled unit, ready to be walked.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub module: String,
    pub references: Vec<String>,
    pub symbols: SymbolTable,
    pub trees: Vec<BoundTree>,
}

impl CompiledUnit {
    /// Validates a snapshot and builds the in-memory unit.
    ///
    /// `source` names the snapshot in error messages.
    pub fn from_snapshot(snapshot: UnitSnapshot, source: &str) -> Result<Self> {
        snapshot.symbols.validate(source)?;
        let symbol_count = snapshot.symbols.len();

        let mut trees = Vec::with_capacity(snapshot.trees.len());
        for tree_snapshot in snapshot.trees {
            let tree = SyntaxTree::from_nodes(tree_snapshot.path, tree_snapshot.nodes)?;
            let node_in_range = |node: u32, map: &str| -> Result<NodeId> {
                if (node as usize) < tree.len() {
                    Ok(NodeId(node))
                } else {
                    Err(TypeDepsError::Snapshot {
                        message: format!("{map} refers to node {node}, tree has {}", tree.len()),
                        path: tree.path().to_string(),
                    })
                }
            };
            let symbol_in_range = |symbol: u32, map: &str| -> Result<SymbolId> {
                if (symbol as usize) < symbol_count {
                    Ok(SymbolId(symbol))
                } else {
                    Err(TypeDepsError::Snapshot {
                        message: format!(
                            "{map} refers to symbol {symbol}, table has {symbol_count}"
                        ),
                        path: tree.path().to_string(),
                    })
                }
            };

            let mut bindings = TreeBindings::new();
            for (node, symbol) in tree_snapshot.bindings {
                bindings.bind(
                    node_in_range(node, "bindings")?,
                    symbol_in_range(symbol, "bindings")?,
                );
            }
            for (node, value) in tree_snapshot.constants {
                bindings.constant(node_in_range(node, "constants")?, value);
            }
            for (node, symbol) in tree_snapshot.declarations {
                let id = symbol_in_range(symbol, "declarations")?;
                let declared = snapshot.symbols.get(id).map(|s| s.kind);
                if !declared.is_some_and(|kind| kind.is_type()) {
                    return Err(TypeDepsError::Snapshot {
                        message: format!(
                            "declarations maps node {node} to symbol {symbol}, which is not a type"
                        ),
                        path: tree.path().to_string(),
                    });
                }
                bindings.declare(node_in_range(node, "declarations")?, id);
            }
            trees.push(BoundTree { tree, bindings });
        }

        Ok(Self {
            module: snapshot.module,
            references: snapshot.references,
            symbols: snapshot.symbols,
            trees,
        })
    }

    /// Converts back to the serialized form.
    pub fn to_snapshot(&self) -> UnitSnapshot {
        let trees = self
            .trees
            .iter()
            .map(|bound| TreeSnapshot {
                path: bound.tree.path().to_string(),
                nodes: bound.tree.nodes().to_vec(),
                bindings: bound
                    .bindings
                    .bindings
                    .iter()
                    .map(|(n, s)| (n.0, s.0))
                    .collect(),
                constants: bound
                    .bindings
                    .constants
                    .iter()
                    .map(|(n, v)| (n.0, v.clone()))
                    .collect(),
                declarations: bound
                    .bindings
                    .declarations
                    .iter()
                    .map(|(n, s)| (n.0, s.0))
                    .collect(),
            })
            .collect();
        UnitSnapshot {
            module: self.module.clone(),
            references: self.references.clone(),
            symbols: self.symbols.clone(),
            trees,
        }
    }

    /// The `(tree, resolver)` pairs of this unit, in tree order.
    pub fn bound_trees(&self) -> impl Iterator<Item = (&SyntaxTree, BoundModel<'_>)> {
        self.trees
            .iter()
            .map(|bound| (&bound.tree, BoundModel::new(&self.symbols, &bound.bindings)))
    }
}

/// Reads and validates one snapshot file.
#[instrument]
pub async fn load_unit(path: &Path) -> Result<CompiledUnit> {
    let source = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TypeDepsError::Snapshot {
            message: format!("failed to read snapshot: {e}"),
            path: source.clone(),
        })?;
    let snapshot: UnitSnapshot =
        serde_json::from_str(&contents).map_err(|e| TypeDepsError::Snapshot {
            message: format!("failed to parse snapshot: {e}"),
            path: source.clone(),
        })?;
    let unit = CompiledUnit::from_snapshot(snapshot, &source)?;
    debug!(module = %unit.module, trees = unit.trees.len(), "snapshot loaded");
    Ok(unit)
}

/// Loads several snapshot files concurrently, returning units in the order
/// of `paths`. Fails with the first error in that order.
pub async fn load_units(paths: &[PathBuf]) -> Result<Vec<CompiledUnit>> {
    let mut tasks = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        tasks.spawn(async move { (index, load_unit(&path).await) });
    }

    let mut results: Vec<(usize, Result<CompiledUnit>)> = Vec::with_capacity(paths.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| TypeDepsError::Snapshot {
            message: format!("snapshot loading task failed: {e}"),
            path: String::new(),
        })?;
        results.push((index, result));
    }
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

/// Writes a unit as a pretty-printed snapshot, via a temporary file and a
/// rename.
pub async fn write_unit(path: &Path, unit: &CompiledUnit) -> Result<()> {
    let json = serde_json::to_string_pretty(&unit.to_snapshot())?;
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, json).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Finds snapshot files below `root` that the configuration selects.
///
/// Paths are matched relative to `root` and returned sorted, so runs over
/// the same directory see units in the same order.
pub fn discover_snapshots(root: &Path, config: &TypeDepsConfig) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            should_include_file(&relative, config)
        })
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}
