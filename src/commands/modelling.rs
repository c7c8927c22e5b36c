//! Fitting, tuning and summarizing models on the current project.

use crate::config::MlSettings;
use crate::error::ShellError;
use crate::ml::cross_validation::{cross_validate, KFold};
use crate::ml::params::Hyperparams;
use crate::ml::tuning::grid_search;
use crate::ml::ModelSpec;
use crate::project::{FitReport, ModelKind, Project};
use crate::session::Session;
use crate::shell::action::CvOptions;
use crate::shell::envelope::{Diagnostics, Envelope};

/// Folds for one fit: per-call overrides first, then the `[ml]` settings.
fn folds_for(cv: CvOptions, settings: &MlSettings) -> KFold {
    KFold {
        n_splits: cv.n_splits.unwrap_or(settings.n_splits),
        shuffle: cv.shuffle.unwrap_or(settings.shuffle),
        random_state: Some(cv.random_state.unwrap_or(settings.random_state)),
    }
}

/// Cross-validate `spec` on the project's design matrix and log the result.
fn fit_and_log(
    project: &mut Project,
    spec: &ModelSpec,
    folds: &KFold,
    seed: u64,
    diagnostics: &mut Diagnostics,
) -> Result<String, ShellError> {
    let model = spec.kind;
    model.check_task(project.kind())?;
    let design = project.design()?;
    let outcome = cross_validate(&design.x, &design.y, folds, model.task(), || {
        spec.build(design.n_classes(), seed)
    })?;
    tracing::info!(
        project = project.alias(),
        model = model.log_name(),
        folds = folds.n_splits,
        mean_score = outcome.mean_score(),
        "Cross-validation finished"
    );
    let report = FitReport::from_outcome(model, &outcome, spec.params().clone());
    project.log_model(report, diagnostics)
}

pub fn fit(
    session: &mut Session,
    model: ModelKind,
    hyperparams: &Hyperparams,
    cv: CvOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Envelope, ShellError> {
    let settings = session.config().ml.clone();
    let project = session.store.current_project_mut()?;
    let spec = ModelSpec::new(model, hyperparams, diagnostics);
    let folds = folds_for(cv, &settings);
    let seed = cv.random_state.unwrap_or(settings.random_state);
    Ok(Envelope::text(fit_and_log(
        project,
        &spec,
        &folds,
        seed,
        diagnostics,
    )?))
}

/// Grid search `model`, then log the winning parameters with the standard folds.
fn tune_and_log(
    project: &mut Project,
    model: ModelKind,
    n_values: usize,
    tuning_folds: usize,
    settings: &MlSettings,
    diagnostics: &mut Diagnostics,
) -> Result<String, ShellError> {
    model.check_task(project.kind())?;
    let search_folds = KFold {
        n_splits: tuning_folds,
        shuffle: settings.shuffle,
        random_state: Some(settings.random_state),
    };
    let result = grid_search(
        model,
        project.design()?,
        n_values,
        &search_folds,
        settings.random_state,
    )?;
    if result.failed > 0 {
        diagnostics.warn(format!(
            "{} of {} candidates for {} failed and were skipped.",
            result.failed,
            result.failed + result.evaluated,
            model.command()
        ));
    }
    let chosen = result
        .best
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ");
    diagnostics.note(format!(
        "Best parameters for {}: {}",
        model.log_name(),
        if chosen.is_empty() { "defaults" } else { chosen.as_str() }
    ));

    let spec = ModelSpec::new(model, &result.best, diagnostics);
    let folds = folds_for(CvOptions::default(), settings);
    fit_and_log(project, &spec, &folds, settings.random_state, diagnostics)
}

pub fn tune(
    session: &mut Session,
    model: ModelKind,
    n_values: usize,
    folds: Option<usize>,
    diagnostics: &mut Diagnostics,
) -> Result<Envelope, ShellError> {
    let settings = session.config().ml.clone();
    let project = session.store.current_project_mut()?;
    let message = tune_and_log(
        project,
        model,
        n_values,
        folds.unwrap_or(settings.tuning_folds),
        &settings,
        diagnostics,
    )?;
    Ok(Envelope::text(message))
}

/// Tune every model matching the project type. Failing models are skipped with a warning.
pub fn run_all(
    session: &mut Session,
    n_values: usize,
    folds: Option<usize>,
    diagnostics: &mut Diagnostics,
) -> Result<Envelope, ShellError> {
    let settings = session.config().ml.clone();
    let project = session.store.current_project_mut()?;
    project.design()?;
    let tuning_folds = folds.unwrap_or(settings.tuning_folds);

    let mut logged = Vec::new();
    for model in ModelKind::for_task(project.kind()) {
        match tune_and_log(project, model, n_values, tuning_folds, &settings, diagnostics) {
            Ok(message) => logged.push(message),
            Err(err) => {
                tracing::warn!(model = model.log_name(), error = %err, "Model skipped");
                diagnostics.warn(format!("Model {} failed. Skipping...", model.log_name()));
            }
        }
    }
    if logged.is_empty() {
        return Err(ShellError::Model(
            "No model could be fitted for this project.".to_string(),
        ));
    }
    Ok(Envelope::text(logged.join("\n")))
}

pub fn summary(session: &Session) -> Result<Envelope, ShellError> {
    Ok(Envelope::from(session.store.current_project()?.summary()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::project::ProjectKind;
    use tempfile::TempDir;

    fn session_with_data(kind: ProjectKind, csv: &str, target: &str) -> (TempDir, Session) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("data")).unwrap();
        std::fs::write(temp.path().join("data").join("toy.csv"), csv).unwrap();
        let mut config = ShellConfig::default();
        config.ml.n_splits = 3;
        config.ml.tuning_folds = 2;
        let mut session = Session::new(temp.path().to_path_buf(), config, None);
        let mut diagnostics = Diagnostics::new();
        session.store.create("p", kind, "", &mut diagnostics).unwrap();
        let project = session.store.current_project_mut().unwrap();
        project.add_df(&temp.path().join("data"), "toy", b',').unwrap();
        project.clean_data().unwrap();
        project.make_x_y(target, &mut diagnostics).unwrap();
        (temp, session)
    }

    fn line_csv() -> String {
        let mut csv = String::from("x,y\n");
        for i in 0..12 {
            csv.push_str(&format!("{},{}\n", i, 2 * i + 1));
        }
        csv
    }

    #[test]
    fn test_fit_logs_linear_regression() {
        let (_temp, mut session) = session_with_data(ProjectKind::Regression, &line_csv(), "y");
        let mut diagnostics = Diagnostics::new();
        let envelope = fit(
            &mut session,
            ModelKind::LinearRegression,
            &Hyperparams::new(),
            CvOptions::default(),
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(
            envelope.primary_text().as_deref(),
            Some("Model linear_regression logged successfully.")
        );
        assert!(diagnostics.notes()[0].starts_with("CI: ["));
        let record = &session.store.current_project().unwrap().models()[0];
        assert_eq!(record.n_splits, 3);
        assert!(record.score < 1e-6);
    }

    #[test]
    fn test_fit_rejects_wrong_project_type() {
        let (_temp, mut session) = session_with_data(ProjectKind::Regression, &line_csv(), "y");
        let err = fit(
            &mut session,
            ModelKind::NaiveBayes,
            &Hyperparams::new(),
            CvOptions::default(),
            &mut Diagnostics::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ShellError::Validation(_)));
    }

    #[test]
    fn test_run_all_logs_every_regression_model() {
        let (_temp, mut session) = session_with_data(ProjectKind::Regression, &line_csv(), "y");
        let mut diagnostics = Diagnostics::new();
        let envelope = run_all(&mut session, 1, None, &mut diagnostics).unwrap();
        let text = envelope.primary_text().unwrap();
        assert!(text.contains("linear_regression"));
        let logged = session.store.current_project().unwrap().models().len();
        let skipped = diagnostics
            .warnings()
            .iter()
            .filter(|w| w.ends_with("failed. Skipping..."))
            .count();
        assert_eq!(logged + skipped, 2);
    }

    #[test]
    fn test_summary_requires_project() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(temp.path().to_path_buf(), ShellConfig::default(), None);
        assert_eq!(
            summary(&session).unwrap_err().to_string(),
            "No current project set."
        );
    }
}
