//! Data commands on the current project.

use crate::error::ShellError;
use crate::project::Project;
use crate::session::Session;
use crate::shell::envelope::{Diagnostics, Envelope};

pub fn add_data(session: &mut Session, name: &str, delimiter: u8) -> Result<Envelope, ShellError> {
    let data_dir = session.data_dir().to_path_buf();
    let project = session.store.current_project_mut()?;
    Ok(Envelope::text(project.add_df(&data_dir, name, delimiter)?))
}

pub fn read_data(session: &Session, head: usize) -> Result<Envelope, ShellError> {
    let project = session.store.current_project()?;
    Ok(note_if_no_rows(project, Envelope::table(project.read_data(head)?)))
}

pub fn list_cols(session: &Session) -> Result<Envelope, ShellError> {
    let project = session.store.current_project()?;
    Ok(note_if_no_rows(project, Envelope::table(project.list_cols()?)))
}

/// A header-only dataframe still renders its header, plus a note saying why it is bare.
fn note_if_no_rows(project: &Project, envelope: Envelope) -> Envelope {
    match project.frame() {
        Some(frame) if frame.n_rows() == 0 => envelope.with_note("Dataframe has no rows."),
        _ => envelope,
    }
}

pub fn make_x_y(session: &mut Session, target: &str, diagnostics: &mut Diagnostics) -> Result<Envelope, ShellError> {
    let project = session.store.current_project_mut()?;
    Ok(Envelope::text(project.make_x_y(target, diagnostics)?))
}

pub fn clean_data(session: &mut Session) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.current_project_mut()?.clean_data()?))
}

pub fn stats(session: &Session) -> Result<Envelope, ShellError> {
    Ok(Envelope::table(session.store.current_project()?.stats()?))
}
