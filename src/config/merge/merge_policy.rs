//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("paths.projects_dir", "projects")?
        .set_default("paths.data_dir", "data")?
        .set_default("shell.prompt", ">> ")?
        .set_default("shell.fold_case", true)?
        .set_default("ml.n_splits", 10)?
        .set_default("ml.random_state", 42)?
        .set_default("ml.tuning_folds", 5)
}
