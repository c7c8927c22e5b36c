//! Command registry: name to [`CommandSpec`], built once and injected into the dispatcher.

use crate::error::{ParseError, ShellError};
use crate::shell::action::{self, Decoder};
use std::collections::HashMap;

/// Static description of one shell command.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub about: &'static str,
    pub usage: &'static str,
    pub decode: Decoder,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    specs: Vec<CommandSpec>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The full command set of the shell.
    pub fn standard() -> Result<Registry, ShellError> {
        register_standard(Registry::builder()).build()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&CommandSpec, ParseError> {
        self.index
            .get(name)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| ParseError::UnknownCommand(name.to_string()))
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    specs: Vec<CommandSpec>,
}

impl RegistryBuilder {
    pub fn register(
        mut self,
        name: &'static str,
        about: &'static str,
        usage: &'static str,
        decode: Decoder,
    ) -> Self {
        self.specs.push(CommandSpec {
            name,
            about,
            usage,
            decode,
        });
        self
    }

    /// Fails naming every command registered more than once.
    pub fn build(self) -> Result<Registry, ShellError> {
        let mut index = HashMap::with_capacity(self.specs.len());
        let mut duplicates = Vec::new();
        for (i, spec) in self.specs.iter().enumerate() {
            if index.insert(spec.name, i).is_some() && !duplicates.contains(&spec.name) {
                duplicates.push(spec.name);
            }
        }
        if !duplicates.is_empty() {
            return Err(ShellError::Config(format!(
                "Duplicate command registration: {}",
                duplicates.join(", ")
            )));
        }
        Ok(Registry {
            specs: self.specs,
            index,
        })
    }
}

const FIT_USAGE: &str = "[--n_splits k] [--shuffle b] [--random_state s] [--<hyperparam> v ...]";

pub fn register_standard(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register("help", "List commands or show one command's usage", "help [command]", action::decode_help)
        .register(
            "config",
            "Show, read or move the projects/data directories",
            "config show | config get <projects_dir|data_dir> | config set <projects_dir|data_dir> <path>",
            action::decode_config,
        )
        .register(
            "create",
            "Create a project and make it current",
            "create <alias> <regression|r|classification|c> [--description text]",
            action::decode_create,
        )
        .register(
            "delete",
            "Remove a project from memory, or its saved directory",
            "delete <alias> [--from_dir true]",
            action::decode_delete,
        )
        .register("listproj", "List projects in memory and on disk", "listproj", action::decode_listproj)
        .register("chproj", "Switch the current project", "chproj <alias>", action::decode_chproj)
        .register("pcp", "Describe the current project", "pcp", action::decode_pcp)
        .register("load", "Load a saved project and make it current", "load <alias>", action::decode_load)
        .register("save", "Save the current project", "save [--overwrite true]", action::decode_save)
        .register(
            "add_data",
            "Load <data_dir>/<name>.csv into the current project",
            "add_data <name> [--delimiter ,]",
            action::decode_add_data,
        )
        .register("read_data", "Show the first rows of the data", "read_data [head]", action::decode_read_data)
        .register("list_cols", "List columns with type and missing counts", "list_cols", action::decode_list_cols)
        .register("make_x_y", "Build the feature matrix and target", "make_x_y <target>", action::decode_make_x_y)
        .register("clean_data", "Drop rows with missing values", "clean_data", action::decode_clean_data)
        .register("summary", "Table of logged models", "summary", action::decode_summary)
        .register("stats", "Descriptive statistics of numeric columns", "stats", action::decode_stats)
        .register("linreg", "Linear regression", FIT_USAGE, action::decode_fit)
        .register("mlpreg", "Multi-layer perceptron regressor", FIT_USAGE, action::decode_fit)
        .register("naivebayes", "Gaussian naive Bayes classifier", FIT_USAGE, action::decode_fit)
        .register("mlpclas", "Multi-layer perceptron classifier", FIT_USAGE, action::decode_fit)
        .register("logisticreg", "Multinomial logistic regression", FIT_USAGE, action::decode_fit)
        .register("decisiontree", "CART decision tree classifier", FIT_USAGE, action::decode_fit)
        .register("randomforest", "Random forest classifier", FIT_USAGE, action::decode_fit)
        .register("gradientboosting", "Gradient boosting classifier", FIT_USAGE, action::decode_fit)
        .register(
            "tune",
            "Grid search one model and log the best candidate",
            "tune <model> [--n_values n] [--cv k]",
            action::decode_tune,
        )
        .register(
            "runall",
            "Tune and log every model for the project type",
            "runall [--n_values n] [--cv k]",
            action::decode_runall,
        )
        .register(
            "plot",
            "Queue a text plot",
            "plot <hist|box|scatter|show|close> [label | [a, b]] [--show true]",
            action::decode_plot,
        )
        .register("show", "Render queued plots", "show", action::decode_show)
        .register("pca", "Principal component analysis", "pca <run|plot> [--show true]", action::decode_pca)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::kind::ModelKind;

    #[test]
    fn test_standard_registry_resolves_every_model_command() {
        let registry = Registry::standard().unwrap();
        for kind in ModelKind::ALL {
            assert!(registry.exists(kind.command()), "{} missing", kind.command());
        }
        assert!(registry.resolve("create").is_ok());
        assert_eq!(
            registry.resolve("frobnicate").unwrap_err(),
            ParseError::UnknownCommand("frobnicate".into())
        );
    }

    #[test]
    fn test_standard_table_is_unique() {
        assert!(register_standard(Registry::builder()).build().is_ok());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let err = Registry::builder()
            .register("save", "a", "save", action::decode_save)
            .register("save", "b", "save", action::decode_save)
            .register("load", "c", "load", action::decode_load)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Duplicate command registration: save"
        );
    }

    #[test]
    fn test_iter_keeps_registration_order() {
        let registry = Registry::standard().unwrap();
        let first: Vec<_> = registry.iter().take(3).map(|spec| spec.name).collect();
        assert_eq!(first, vec!["help", "config", "create"]);
    }
}
