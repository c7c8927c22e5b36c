//! Dispatcher: decode a parsed [`Command`] and route the resulting [`Action`].

use crate::commands::{data, modelling, plotting, projects, settings};
use crate::error::ShellError;
use crate::session::Session;
use crate::shell::action::Action;
use crate::shell::args::ArgReader;
use crate::shell::envelope::{Diagnostics, Envelope};
use crate::shell::help;
use crate::shell::parse::Command;
use crate::shell::registry::Registry;
use std::time::Instant;

/// Single route table from command to handler.
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one command. On success the collected diagnostics are sealed into the
    /// envelope; on error they stay in `diagnostics` for the caller to render.
    pub fn execute(
        &self,
        command: Command,
        session: &mut Session,
        diagnostics: &mut Diagnostics,
    ) -> Result<Envelope, ShellError> {
        let started = Instant::now();
        let name = command.name.clone();
        let result = self.execute_inner(command, session, diagnostics);
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => tracing::info!(command = %name, elapsed_ms, outcome = "ok", "Command finished"),
            Err(err) => tracing::warn!(
                command = %name,
                elapsed_ms,
                outcome = "error",
                error = %err,
                "Command failed"
            ),
        }
        let envelope = result?;
        Ok(Envelope::seal(envelope, std::mem::take(diagnostics)))
    }

    fn execute_inner(
        &self,
        command: Command,
        session: &mut Session,
        diagnostics: &mut Diagnostics,
    ) -> Result<Envelope, ShellError> {
        let spec = self.registry.resolve(&command.name)?;
        let mut args = ArgReader::new(command);
        let action = (spec.decode)(&mut args, diagnostics)?;
        args.finish(diagnostics);
        self.route(action, session, diagnostics)
    }

    fn route(
        &self,
        action: Action,
        session: &mut Session,
        diagnostics: &mut Diagnostics,
    ) -> Result<Envelope, ShellError> {
        match action {
            Action::Help { topic } => help::render(&self.registry, topic.as_deref()),
            Action::Config(action) => settings::config(session, &action),
            Action::Create {
                alias,
                kind,
                description,
            } => projects::create(session, &alias, kind, description.as_deref(), diagnostics),
            Action::Delete { alias, from_dir } => projects::delete(session, &alias, from_dir),
            Action::ListProjects => projects::list(session),
            Action::ChangeProject { alias } => projects::change(session, &alias),
            Action::CurrentProject => Ok(projects::current(session)),
            Action::Load { alias } => projects::load(session, &alias, diagnostics),
            Action::Save { overwrite } => projects::save(session, overwrite),
            Action::AddData { name, delimiter } => data::add_data(session, &name, delimiter),
            Action::ReadData { head } => data::read_data(session, head),
            Action::ListColumns => data::list_cols(session),
            Action::MakeXy { target } => data::make_x_y(session, &target, diagnostics),
            Action::CleanData => data::clean_data(session),
            Action::Summary => modelling::summary(session),
            Action::Stats => data::stats(session),
            Action::Fit {
                model,
                hyperparams,
                cv,
            } => modelling::fit(session, model, &hyperparams, cv, diagnostics),
            Action::Tune {
                model,
                n_values,
                folds,
            } => modelling::tune(session, model, n_values, folds, diagnostics),
            Action::RunAll { n_values, folds } => {
                modelling::run_all(session, n_values, folds, diagnostics)
            }
            Action::Plot { request, show } => plotting::plot(session, &request, show),
            Action::Show => plotting::show(session),
            Action::Pca { step, show } => plotting::pca(session, step, show),
        }
    }
}
