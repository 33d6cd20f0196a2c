use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TypeDepsError};

/// Name of the configuration file stored inside the `.typedeps` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory used to store typedeps metadata.
pub const TYPEDEPS_DIR: &str = ".typedeps";

/// File suffix of compiled-unit snapshots written by front-ends.
pub const SNAPSHOT_SUFFIX: &str = ".typedeps.json";

/// Configuration for an analysis run.
///
/// Controls which snapshot files are picked up, how trees are walked, and
/// how the report is filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDepsConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Glob patterns (relative to the root) for snapshot files to analyze.
    pub include: Vec<String>,
    /// Glob patterns for snapshot files to skip. Exclusion wins.
    pub exclude: Vec<String>,
    /// Walk trees on the rayon pool instead of one after another.
    pub parallel: bool,
    /// Skip a tree that hits a resolution inconsistency instead of aborting.
    pub continue_on_error: bool,
    /// Leave `T -> T` edges out of the report.
    pub exclude_self_references: bool,
    /// Leave pairs seen fewer times than this out of the report.
    pub min_count: usize,
}

impl Default for TypeDepsConfig {
    fn default() -> Self {
        Self {
            version: 1,
            include: vec![
                format!("*{SNAPSHOT_SUFFIX}"),
                format!("**/*{SNAPSHOT_SUFFIX}"),
            ],
            exclude: vec![
                ".typedeps/**".to_string(),
                ".git/**".to_string(),
                "bin/**".to_string(),
                "obj/**".to_string(),
                "target/**".to_string(),
                "node_modules/**".to_string(),
            ],
            parallel: false,
            continue_on_error: false,
            exclude_self_references: false,
            min_count: 1,
        }
    }
}

/// Returns the path to the `.typedeps` directory within the given root.
pub fn get_typedeps_dir(root: &Path) -> PathBuf {
    root.join(TYPEDEPS_DIR)
}

/// Returns the path to the configuration file within the `.typedeps` directory.
pub fn get_config_path(root: &Path) -> PathBuf {
    get_typedeps_dir(root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// Returns the default configuration if the file does not exist. Missing
/// fields in an existing file take their default values.
pub fn load_config(root: &Path) -> Result<TypeDepsConfig> {
    let config_path = get_config_path(root);
    if !config_path.exists() {
        return Ok(TypeDepsConfig::default());
    }
    let contents = fs::read_to_string(&config_path)?;
    serde_json::from_str(&contents).map_err(|e| TypeDepsError::Config {
        message: format!("{}: {e}", config_path.display()),
    })
}

/// Saves the configuration under `root`, creating `.typedeps` if needed.
///
/// The file is written next to its final name and renamed into place.
pub fn save_config(root: &Path, config: &TypeDepsConfig) -> Result<()> {
    fs::create_dir_all(get_typedeps_dir(root))?;
    let config_path = get_config_path(root);
    let tmp_path = config_path.with_extension("tmp");
    fs::write(&tmp_path, serde_json::to_string_pretty(config)?)?;
    fs::rename(&tmp_path, &config_path)?;
    Ok(())
}

/// True when a snapshot path (relative to the root, `/`-separated) matches
/// an include pattern and no exclude pattern. Invalid patterns never match.
pub fn should_include_file(file_path: &str, config: &TypeDepsConfig) -> bool {
    let matches_any = |patterns: &[String]| {
        patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches(file_path))
    };
    !matches_any(&config.exclude) && matches_any(&config.include)
}
