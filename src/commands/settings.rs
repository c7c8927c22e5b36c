//! `config show | get | set`: inspect and relocate the projects and data directories.

use crate::error::{ShellError, StorageError};
use crate::session::Session;
use crate::shell::action::ConfigAction;
use crate::shell::envelope::Envelope;
use comfy_table::Table;
use std::fs;
use std::path::{Path, PathBuf};

pub fn config(session: &mut Session, action: &ConfigAction) -> Result<Envelope, ShellError> {
    match action {
        ConfigAction::Show => Ok(Envelope::table(show(session))),
        ConfigAction::Get { key } => Ok(Envelope::text(
            session.resolved_path(key)?.display().to_string(),
        )),
        ConfigAction::Set { key, path } => set(session, key, path),
    }
}

fn show(session: &Session) -> Table {
    let config = session.config();
    let paths = session.paths();
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Setting", "Value"]);
    let rows = [
        ("workspace", session.workspace_root().display().to_string()),
        ("paths.projects_dir", paths.projects_dir.display().to_string()),
        ("paths.data_dir", paths.data_dir.display().to_string()),
        ("shell.fold_case", config.shell.fold_case.to_string()),
        ("shell.color", config.shell.color.to_string()),
        ("ml.n_splits", config.ml.n_splits.to_string()),
        ("ml.shuffle", config.ml.shuffle.to_string()),
        ("ml.random_state", config.ml.random_state.to_string()),
        ("ml.tuning_folds", config.ml.tuning_folds.to_string()),
        ("logging.level", config.logging.level.clone()),
    ];
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value]);
    }
    table
}

fn set(session: &mut Session, key: &str, path: &Path) -> Result<Envelope, ShellError> {
    let old = session.resolved_path(key)?.to_path_buf();
    let new = if path.is_absolute() {
        path.to_path_buf()
    } else {
        session.workspace_root().join(path)
    };
    let moves = if new != old {
        plan_moves(&old, &new)?
    } else {
        Vec::new()
    };

    // The config file changes first so a failed write moves nothing
    let previous = session
        .config()
        .paths
        .get(key)
        .map(Path::to_path_buf)
        .ok_or_else(|| ShellError::validation("Invalid directory"))?;
    session.set_path(key, path.to_path_buf())?;
    if new != old {
        if let Err(err) = apply_moves(&old, &new, &moves) {
            tracing::warn!(key, error = %err, "Directory move failed; restoring previous path");
            session.set_path(key, previous)?;
            return Err(err);
        }
    }
    tracing::info!(key, from = %old.display(), to = %new.display(), "Directory relocated");
    Ok(Envelope::text(format!(
        "Path {} set to {}. Files moved accordingly.",
        key,
        path.display()
    )))
}

/// Every `(from, to)` rename needed to move `old` into `new`.
///
/// Fails when `new` lies inside `old` or any entry would clobber an existing one.
fn plan_moves(old: &Path, new: &Path) -> Result<Vec<(PathBuf, PathBuf)>, ShellError> {
    if new.starts_with(old) {
        return Err(ShellError::validation(format!(
            "New path {} is inside {}.",
            new.display(),
            old.display()
        )));
    }
    let mut moves = Vec::new();
    if !old.exists() {
        return Ok(moves);
    }
    for entry in fs::read_dir(old).map_err(StorageError::from)? {
        let entry = entry.map_err(StorageError::from)?;
        let target = new.join(entry.file_name());
        if target.exists() {
            return Err(ShellError::validation(format!(
                "Cannot move {}: {} already exists.",
                entry.path().display(),
                target.display()
            )));
        }
        moves.push((entry.path(), target));
    }
    Ok(moves)
}

/// Perform planned renames, putting finished ones back when a later one fails.
fn apply_moves(old: &Path, new: &Path, moves: &[(PathBuf, PathBuf)]) -> Result<(), ShellError> {
    fs::create_dir_all(new).map_err(StorageError::from)?;
    for (done, (from, to)) in moves.iter().enumerate() {
        if let Err(err) = fs::rename(from, to) {
            for (back_from, back_to) in moves[..done].iter().rev() {
                if let Err(undo) = fs::rename(back_to, back_from) {
                    tracing::error!(path = %back_to.display(), error = %undo, "Failed to restore moved entry");
                }
            }
            return Err(StorageError::from(err).into());
        }
    }
    if old.exists() {
        fs::remove_dir(old).map_err(StorageError::from)?;
    }
    tracing::debug!(moved = moves.len(), "Directory contents moved");
    Ok(())
}
