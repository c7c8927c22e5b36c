//! Properties of envelope sealing

use mlsh::shell::envelope::dedup_lines;
use mlsh::shell::{Diagnostics, Envelope};
use proptest::prelude::*;
use std::collections::HashSet;

fn message() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z .]{0,12}[a-z.]"
}

proptest! {
    /// Sealed warnings hold each distinct line once, in first-seen order
    #[test]
    fn sealed_warnings_are_unique(messages in prop::collection::vec(message(), 0..12)) {
        let mut diagnostics = Diagnostics::new();
        for m in &messages {
            diagnostics.warn(m.clone());
        }
        let envelope = Envelope::seal("ok", diagnostics);
        let lines: Vec<&str> = envelope.warning_lines().collect();

        let mut seen = HashSet::new();
        let expected: Vec<&str> = messages
            .iter()
            .map(|m| m.trim_end())
            .filter(|m| seen.insert(m.to_string()))
            .collect();
        prop_assert_eq!(lines, expected);
    }

    /// Deduplicating twice changes nothing
    #[test]
    fn dedup_is_idempotent(messages in prop::collection::vec(message(), 0..12)) {
        let text = messages.join("\n");
        let once = dedup_lines(&text);
        prop_assert_eq!(dedup_lines(&once), once.clone());
    }
}
