//! Typed actions and the decoders that build them from parsed commands.
//!
//! Every registered command owns one decoder. Decoders pull typed fields out of an
//! [`ArgReader`]; the dispatcher reports whatever they leave behind.

use crate::config::PATH_KEYS;
use crate::error::{ParseError, ShellError};
use crate::ml::params::{Hyperparams, ParamValue};
use crate::project::kind::{ModelKind, ProjectKind};
use crate::project::plots::PlotRequest;
use crate::shell::args::ArgReader;
use crate::shell::envelope::Diagnostics;
use crate::shell::value::Value;
use std::path::PathBuf;

/// Default number of grid points per tuned numeric hyperparameter.
pub const DEFAULT_GRID_POINTS: usize = 3;

/// Default number of rows shown by `read_data`.
pub const DEFAULT_HEAD: usize = 5;

/// One fully decoded shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Help { topic: Option<String> },
    Config(ConfigAction),
    Create { alias: String, kind: ProjectKind, description: Option<String> },
    Delete { alias: String, from_dir: bool },
    ListProjects,
    ChangeProject { alias: String },
    CurrentProject,
    Load { alias: String },
    Save { overwrite: bool },
    AddData { name: String, delimiter: u8 },
    ReadData { head: usize },
    ListColumns,
    MakeXy { target: String },
    CleanData,
    Summary,
    Stats,
    Fit { model: ModelKind, hyperparams: Hyperparams, cv: CvOptions },
    Tune { model: ModelKind, n_values: usize, folds: Option<usize> },
    RunAll { n_values: usize, folds: Option<usize> },
    Plot { request: PlotRequest, show: bool },
    Show,
    Pca { step: PcaStep, show: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    Get { key: String },
    Set { key: String, path: PathBuf },
}

/// Per-call cross-validation overrides; unset fields fall back to `[ml]` settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CvOptions {
    pub n_splits: Option<usize>,
    pub shuffle: Option<bool>,
    pub random_state: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcaStep {
    Run,
    Plot,
}

pub type Decoder = fn(&mut ArgReader, &mut Diagnostics) -> Result<Action, ShellError>;

pub fn decode_help(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Help {
        topic: args.optional_str("command")?,
    })
}

pub fn decode_config(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    let sub = args.optional_str("action")?.unwrap_or_else(|| "show".to_string());
    let action = match sub.as_str() {
        "show" => ConfigAction::Show,
        "get" => ConfigAction::Get {
            key: path_key(args)?,
        },
        "set" => {
            let key = path_key(args)?;
            let path = args
                .optional_str("path")?
                .ok_or_else(|| ShellError::validation("New path must be provided."))?;
            ConfigAction::Set {
                key,
                path: PathBuf::from(path),
            }
        }
        other => {
            return Err(ParseError::InvalidArgument {
                name: "action".to_string(),
                reason: format!("expected show, get or set, got {}", other),
            }
            .into())
        }
    };
    Ok(Action::Config(action))
}

fn path_key(args: &mut ArgReader) -> Result<String, ShellError> {
    let key = args
        .optional_str("dir")?
        .ok_or_else(|| ShellError::validation("Directory must be provided."))?;
    if !PATH_KEYS.contains(&key.as_str()) {
        return Err(ShellError::validation("Invalid directory"));
    }
    Ok(key)
}

pub fn decode_create(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    let alias = args.required_str("alias")?;
    let kind = ProjectKind::parse(&args.required_str("type")?)?;
    let description = args.keyword_str("description");
    Ok(Action::Create {
        alias,
        kind,
        description,
    })
}

pub fn decode_delete(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Delete {
        alias: args.required_str("alias")?,
        from_dir: args.keyword_bool("from_dir")?.unwrap_or(false),
    })
}

pub fn decode_listproj(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::ListProjects)
}

pub fn decode_chproj(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::ChangeProject {
        alias: args.required_str("alias")?,
    })
}

pub fn decode_pcp(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::CurrentProject)
}

pub fn decode_load(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Load {
        alias: args.required_str("alias")?,
    })
}

pub fn decode_save(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Save {
        overwrite: args.keyword_bool("overwrite")?.unwrap_or(false),
    })
}

pub fn decode_add_data(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    let name = args.required_str("name")?;
    let name = name.strip_suffix(".csv").map(str::to_string).unwrap_or(name);
    let delimiter = match args.keyword_str("delimiter") {
        None => b',',
        Some(text) => parse_delimiter(&text)?,
    };
    Ok(Action::AddData { name, delimiter })
}

fn parse_delimiter(text: &str) -> Result<u8, ParseError> {
    match text {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if text.len() == 1 && text.is_ascii() => Ok(text.as_bytes()[0]),
        _ => Err(ParseError::InvalidArgument {
            name: "delimiter".to_string(),
            reason: format!("expected a single ASCII character, got {}", text),
        }),
    }
}

pub fn decode_read_data(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::ReadData {
        head: args.optional_usize("head")?.unwrap_or(DEFAULT_HEAD),
    })
}

pub fn decode_list_cols(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::ListColumns)
}

pub fn decode_make_x_y(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::MakeXy {
        target: args.required_str("target")?,
    })
}

pub fn decode_clean_data(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::CleanData)
}

pub fn decode_summary(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Summary)
}

pub fn decode_stats(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Stats)
}

/// Shared by every estimator command; the model comes from the command name.
pub fn decode_fit(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    let model = ModelKind::from_name(args.command())
        .ok_or_else(|| ParseError::UnknownCommand(args.command().to_string()))?;
    let cv = CvOptions {
        n_splits: args.keyword_usize("n_splits")?,
        shuffle: args.keyword_bool("shuffle")?,
        random_state: args.keyword_u64("random_state")?,
    };
    let hyperparams = args
        .take_keywords()
        .into_iter()
        .map(|(key, value)| (key, to_param(value)))
        .collect();
    Ok(Action::Fit {
        model,
        hyperparams,
        cv,
    })
}

pub fn decode_tune(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    let name = args.required_str("model")?;
    let model = ModelKind::from_name(&name).ok_or_else(|| ParseError::InvalidArgument {
        name: "model".to_string(),
        reason: format!("unknown model {}", name),
    })?;
    Ok(Action::Tune {
        model,
        n_values: grid_points(args)?,
        folds: args.keyword_usize("cv")?,
    })
}

pub fn decode_runall(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::RunAll {
        n_values: grid_points(args)?,
        folds: args.keyword_usize("cv")?,
    })
}

fn grid_points(args: &mut ArgReader) -> Result<usize, ShellError> {
    match args.keyword_usize("n_values")? {
        None => Ok(DEFAULT_GRID_POINTS),
        Some(0) => Err(ParseError::InvalidArgument {
            name: "n_values".to_string(),
            reason: "must be at least 1".to_string(),
        }
        .into()),
        Some(n) => Ok(n),
    }
}

pub fn decode_plot(args: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    let cmd = args.required_str("cmd")?;
    let labels = args.optional_list("labels").unwrap_or_default();
    let show = args.keyword_bool("show")?.unwrap_or(false);
    let request = PlotRequest::from_parts(&cmd, labels)?;
    Ok(Action::Plot { request, show })
}

pub fn decode_show(_: &mut ArgReader, _: &mut Diagnostics) -> Result<Action, ShellError> {
    Ok(Action::Show)
}

pub fn decode_pca(args: &mut ArgReader, diagnostics: &mut Diagnostics) -> Result<Action, ShellError> {
    let cmd = args.required_str("cmd")?;
    let show = args.keyword_bool("show")?;
    let step = match cmd.as_str() {
        "run" => {
            if show.is_some() {
                diagnostics.warn("show argument will be ignored for run command.");
            }
            PcaStep::Run
        }
        "plot" => PcaStep::Plot,
        other => {
            return Err(ShellError::validation(format!(
                "Invalid PCA command {}.",
                other
            )))
        }
    };
    Ok(Action::Pca {
        step,
        show: show.unwrap_or(false),
    })
}

/// Map a parsed value onto an estimator hyperparameter.
pub fn to_param(value: Value) -> ParamValue {
    match value {
        Value::Int(i) => ParamValue::Int(i),
        Value::Float(f) => ParamValue::Float(f),
        Value::List(items) => ParamValue::List(items),
        Value::Str(s) => match s.as_str() {
            "true" | "yes" => ParamValue::Bool(true),
            "false" | "no" => ParamValue::Bool(false),
            _ => ParamValue::Text(s),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::parse::Command;

    fn decode(decoder: Decoder, line: &str) -> (Result<Action, ShellError>, Diagnostics) {
        let mut tokens = line.split_whitespace();
        let mut command = Command::new(tokens.next().unwrap_or_default());
        let mut pending_key: Option<String> = None;
        for token in tokens {
            if let Some(key) = pending_key.take() {
                command.keywords.insert(key, Value::coerce(token));
            } else if let Some(key) = token.strip_prefix("--") {
                pending_key = Some(key.to_string());
            } else {
                command.positional.push(Value::coerce(token));
            }
        }
        let mut diagnostics = Diagnostics::new();
        let mut args = ArgReader::new(command);
        let result = decoder(&mut args, &mut diagnostics);
        args.finish(&mut diagnostics);
        (result, diagnostics)
    }

    #[test]
    fn test_create_positional_and_keyword_type() {
        let (action, _) = decode(decode_create, "create p1 r");
        assert_eq!(
            action.unwrap(),
            Action::Create {
                alias: "p1".into(),
                kind: ProjectKind::Regression,
                description: None
            }
        );
        let (action, _) = decode(decode_create, "create p1 --type classification");
        assert!(matches!(
            action.unwrap(),
            Action::Create {
                kind: ProjectKind::Classification,
                ..
            }
        ));
    }

    #[test]
    fn test_fit_keeps_hyperparams_and_cv() {
        let (action, diagnostics) = decode(
            decode_fit,
            "randomforest --n_splits 5 --n_estimators 20 --bootstrap false",
        );
        match action.unwrap() {
            Action::Fit {
                model,
                hyperparams,
                cv,
            } => {
                assert_eq!(model, ModelKind::RandomForest);
                assert_eq!(cv.n_splits, Some(5));
                assert_eq!(hyperparams["n_estimators"], ParamValue::Int(20));
                assert_eq!(hyperparams["bootstrap"], ParamValue::Bool(false));
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_config_requires_directory() {
        let (action, _) = decode(decode_config, "config get");
        assert_eq!(action.unwrap_err().to_string(), "Directory must be provided.");
        let (action, _) = decode(decode_config, "config set model_dir x");
        assert_eq!(action.unwrap_err().to_string(), "Invalid directory");
        let (action, _) = decode(decode_config, "config set data_dir");
        assert_eq!(action.unwrap_err().to_string(), "New path must be provided.");
    }

    #[test]
    fn test_plot_requires_labels() {
        let (action, _) = decode(decode_plot, "plot hist");
        assert_eq!(
            action.unwrap_err().to_string(),
            "Label must be provided for cmd hist."
        );
    }

    #[test]
    fn test_pca_run_warns_about_show() {
        let (action, diagnostics) = decode(decode_pca, "pca run --show true");
        assert_eq!(
            action.unwrap(),
            Action::Pca {
                step: PcaStep::Run,
                show: false
            }
        );
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_extra_arguments_are_reported() {
        let (action, diagnostics) = decode(decode_listproj, "listproj now");
        assert_eq!(action.unwrap(), Action::ListProjects);
        assert_eq!(
            diagnostics.warnings(),
            &["extra arguments now will be ignored.".to_string()]
        );
    }

    #[test]
    fn test_add_data_delimiter() {
        let (action, _) = decode(decode_add_data, "add_data iris.csv --delimiter tab");
        assert_eq!(
            action.unwrap(),
            Action::AddData {
                name: "iris".into(),
                delimiter: b'\t'
            }
        );
    }
}
