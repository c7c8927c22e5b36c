//! Project lifecycle: create, delete, list, switch, describe, load and save.

use crate::error::ShellError;
use crate::project::ProjectKind;
use crate::session::Session;
use crate::shell::envelope::{Diagnostics, Envelope};

pub fn create(
    session: &mut Session,
    alias: &str,
    kind: ProjectKind,
    description: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Result<Envelope, ShellError> {
    let message = session
        .store
        .create(alias, kind, description.unwrap_or_default(), diagnostics)?;
    Ok(Envelope::text(message))
}

pub fn delete(session: &mut Session, alias: &str, from_dir: bool) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.delete(alias, from_dir)?))
}

pub fn list(session: &Session) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.list_projects()?))
}

pub fn change(session: &mut Session, alias: &str) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.set_current_project(alias)?))
}

pub fn current(session: &Session) -> Envelope {
    Envelope::text(session.store.describe_current())
}

pub fn load(session: &mut Session, alias: &str, diagnostics: &mut Diagnostics) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.load_project(alias, diagnostics)?))
}

pub fn save(session: &Session, overwrite: bool) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.save_current(overwrite)?))
}
