//! Configuration for cardgen.
//!
//! Settings live in KDL files:
//!
//! - System: `~/.config/cardgen/config.kdl` (or `$CARDGEN_CONFIG_DIR/config.kdl`)
//! - Project: `.cardgen.kdl` in the directory of the input file
//! - Explicit: any file passed with `--config`
//!
//! Contains:
//! - `overflow-policy` - "cycle" or "fixed", what to do when the palette runs out
//! - `open-viewer` - open the PDF after generation
//! - `seed` - fixed seed for the color shuffle
//! - `rule` blocks - styling rules checked before the built-in ones
//!
//! ## Precedence
//!
//! CLI flag > explicit file > project config > system config > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, PROJECT_CONFIG_FILE, Resolved, ResolvedConfig, ValueSource,
    load_config_file, project_config_path, resolve_config, system_config_path,
};
pub use schema::CardgenConfig;
