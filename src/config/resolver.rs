//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `--config <file>`, which replaces file discovery entirely
//! 3. Project config: `.cardgen.kdl` next to the input file
//! 4. System config: `<config dir>/cardgen/config.kdl`
//! 5. Built-in defaults
//!
//! Scalar settings take the highest source that sets them. Styling rules
//! from every file are concatenated, project rules first.

use crate::config::CardgenConfig;
use crate::layout::{OverflowPolicy, StyleRule};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that replaces the system config directory.
pub const CONFIG_DIR_ENV: &str = "CARDGEN_CONFIG_DIR";

/// File name of the per-project config.
pub const PROJECT_CONFIG_FILE: &str = ".cardgen.kdl";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from a file passed with `--config`
    Explicit(PathBuf),
    /// Value from the project config next to the input
    Project,
    /// Value from the system config
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Explicit(path) => write!(f, "config:{}", path.display()),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub overflow_policy: Resolved<OverflowPolicy>,
    pub open_viewer: Resolved<bool>,
    /// Color seed; `None` means seed from entropy
    pub seed: Option<Resolved<u64>>,
    /// User styling rules, highest-precedence file first
    pub rules: Vec<StyleRule>,
    /// Config files that were read
    pub files: Vec<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            overflow_policy: Resolved::new(OverflowPolicy::default(), ValueSource::Default),
            open_viewer: Resolved::new(true, ValueSource::Default),
            seed: None,
            rules: Vec::new(),
            files: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy.value
    }

    pub fn open_viewer(&self) -> bool {
        self.open_viewer.value
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed.as_ref().map(|r| r.value)
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file (`--config`)
    pub config_file: Option<PathBuf>,
    pub overflow_policy: Option<OverflowPolicy>,
    pub open_viewer: Option<bool>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = Some(policy);
        self
    }

    pub fn with_open_viewer(mut self, open: bool) -> Self {
        self.open_viewer = Some(open);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Project config path for an input file.
pub fn project_config_path(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(PROJECT_CONFIG_FILE)
}

/// System config path (`~/.config/cardgen/config.kdl` on Linux).
///
/// `CARDGEN_CONFIG_DIR` replaces the platform config directory.
pub fn system_config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir).join("config.kdl")),
        None => dirs::config_dir().map(|d| d.join("cardgen").join("config.kdl")),
    }
}

/// Read and parse one config file.
pub fn load_config_file(path: &Path) -> Result<CardgenConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    CardgenConfig::parse(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Resolve configuration for a run over `input`.
pub fn resolve_config(input: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let mut layers: Vec<(ValueSource, PathBuf, CardgenConfig)> = Vec::new();

    if let Some(ref path) = overrides.config_file {
        let config = load_config_file(path)?;
        layers.push((ValueSource::Explicit(path.clone()), path.clone(), config));
    } else {
        let candidates = [
            (ValueSource::Project, Some(project_config_path(input))),
            (ValueSource::System, system_config_path()),
        ];
        for (source, path) in candidates {
            if let Some(path) = path.filter(|p| p.is_file()) {
                let config = load_config_file(&path)?;
                layers.push((source, path, config));
            }
        }
    }

    let mut result = ResolvedConfig::default();
    for (_, path, _) in &layers {
        debug!(path = %path.display(), "loaded config file");
        result.files.push(path.clone());
    }

    // Resolve overflow_policy
    if let Some(policy) = overrides.overflow_policy {
        result.overflow_policy = Resolved::new(policy, ValueSource::CliFlag);
    } else if let Some((source, policy)) = first_set(&layers, |c| c.overflow_policy) {
        result.overflow_policy = Resolved::new(policy, source);
    }

    // Resolve open_viewer
    if let Some(open) = overrides.open_viewer {
        result.open_viewer = Resolved::new(open, ValueSource::CliFlag);
    } else if let Some((source, open)) = first_set(&layers, |c| c.open_viewer) {
        result.open_viewer = Resolved::new(open, source);
    }

    // Resolve seed (no default: entropy)
    if let Some(seed) = overrides.seed {
        result.seed = Some(Resolved::new(seed, ValueSource::CliFlag));
    } else if let Some((source, seed)) = first_set(&layers, |c| c.seed) {
        result.seed = Some(Resolved::new(seed, source));
    }

    result.rules = layers
        .into_iter()
        .flat_map(|(_, _, config)| config.rules)
        .collect();

    Ok(result)
}

fn first_set<T>(
    layers: &[(ValueSource, PathBuf, CardgenConfig)],
    get: impl Fn(&CardgenConfig) -> Option<T>,
) -> Option<(ValueSource, T)> {
    layers
        .iter()
        .find_map(|(source, _, config)| get(config).map(|value| (source.clone(), value)))
}
