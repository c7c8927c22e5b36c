//! Properties of the statement grammar

use mlsh::shell::tokenize::split_statements;
use mlsh::shell::value::Value;
use mlsh::shell::{Diagnostics, Parser, Registry};
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

proptest! {
    /// Parsing the same line twice yields equal commands
    #[test]
    fn parse_is_deterministic(
        positional in prop::collection::vec(word(), 0..4),
        keywords in prop::collection::btree_map(word(), word(), 0..4),
    ) {
        let registry = Registry::standard().unwrap();
        let parser = Parser::new(&registry);
        let mut line = format!("create {}", positional.join(" "));
        for (key, value) in &keywords {
            line.push_str(&format!(" --{} {}", key, value));
        }

        let first = parser.parse(&line, &mut Diagnostics::new());
        let second = parser.parse(&line, &mut Diagnostics::new());
        prop_assert_eq!(first, second);
    }

    /// `--key=value` and `--key value` produce the same keyword
    #[test]
    fn flag_forms_agree(key in word(), value in word()) {
        let registry = Registry::standard().unwrap();
        let parser = Parser::new(&registry);
        let spaced = parser
            .parse(&format!("save --{} {}", key, value), &mut Diagnostics::new())
            .unwrap();
        let inline = parser
            .parse(&format!("save --{}={}", key, value), &mut Diagnostics::new())
            .unwrap();
        prop_assert_eq!(&spaced, &inline);
        prop_assert_eq!(spaced.keywords.get(&key), Some(&Value::coerce(&value)));
    }

    /// Integer tokens always coerce to integers
    #[test]
    fn integers_coerce_to_int(n in any::<i64>()) {
        prop_assert_eq!(Value::coerce(&n.to_string()), Value::Int(n));
    }

    /// One statement per separator when nothing is quoted
    #[test]
    fn statements_follow_separators(pieces in prop::collection::vec("[a-z ]{0,6}", 1..6)) {
        let line = pieces.join(";");
        let statements = split_statements(&line);
        prop_assert_eq!(statements.len(), pieces.len());
        for (statement, piece) in statements.iter().zip(&pieces) {
            prop_assert_eq!(*statement, piece.trim());
        }
    }
}
