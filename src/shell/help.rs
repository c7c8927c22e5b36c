//! `help` output built from the registry.

use crate::error::{ParseError, ShellError};
use crate::shell::envelope::Envelope;
use crate::shell::registry::Registry;
use comfy_table::Table;

/// Command table, or the usage line of a single command.
pub fn render(registry: &Registry, topic: Option<&str>) -> Result<Envelope, ShellError> {
    match topic {
        Some(name) => {
            let spec = registry
                .resolve(name)
                .map_err(|_| ParseError::UnknownCommand(name.to_string()))?;
            Ok(Envelope::text(format!(
                "{}\nUsage: {}",
                spec.about,
                usage_line(spec.name, spec.usage)
            )))
        }
        None => {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Command", "Description"]);
            for spec in registry.iter() {
                table.add_row(vec![spec.name, spec.about]);
            }
            Ok(Envelope::table(table).with_note("Use help <command> for its arguments."))
        }
    }
}

/// Usage strings of estimator commands omit the command name.
fn usage_line(name: &str, usage: &str) -> String {
    if usage.starts_with(name) {
        usage.to_string()
    } else {
        format!("{} {}", name, usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_command_usage() {
        let registry = Registry::standard().unwrap();
        let envelope = render(&registry, Some("save")).unwrap();
        assert!(envelope
            .primary_text()
            .unwrap()
            .ends_with("Usage: save [--overwrite true]"));

        let envelope = render(&registry, Some("linreg")).unwrap();
        assert!(envelope
            .primary_text()
            .unwrap()
            .contains("Usage: linreg [--n_splits k]"));
    }

    #[test]
    fn test_table_lists_every_command() {
        let registry = Registry::standard().unwrap();
        let text = render(&registry, None).unwrap().primary_text().unwrap();
        for spec in registry.iter() {
            assert!(text.contains(spec.name));
        }
    }

    #[test]
    fn test_unknown_topic() {
        let registry = Registry::standard().unwrap();
        assert_eq!(
            render(&registry, Some("nope")).unwrap_err().to_string(),
            "Command nope does not exist."
        );
    }
}
