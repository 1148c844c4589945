//! Property-based checks for resolution and parsing.

use http_script::models::{Header, OutcomeTable, Variable, VariableSet};
use http_script::parser::parse_document;
use http_script::variables::{evaluate, ResolutionScope};
use proptest::prelude::*;
use std::collections::HashMap;

proptest! {
    #[test]
    fn literal_text_resolves_to_itself(text in "[a-z{} ]{0,24}") {
        prop_assume!(!text.contains("{{"));

        let env = HashMap::new();
        let mut locals = VariableSet::new();
        locals.insert("unused", Variable::local("value"));
        let globals = VariableSet::new();
        let outcomes = OutcomeTable::new();
        let scope = ResolutionScope::new(&env, &globals, &locals, &outcomes);

        prop_assert_eq!(scope.resolve(&text).unwrap(), text);
    }

    #[test]
    fn lone_braces_are_literal(prefix in "[a-z ]{0,8}", suffix in "[a-z ]{0,8}") {
        let env = HashMap::new();
        let globals = VariableSet::new();
        let locals = VariableSet::new();
        let outcomes = OutcomeTable::new();
        let scope = ResolutionScope::new(&env, &globals, &locals, &outcomes);

        for text in [
            format!("{}{{ {{{}", prefix, suffix),
            format!("{}{{{}", prefix, suffix),
            format!("{}}}}}{{{}", prefix, suffix),
        ] {
            prop_assert_eq!(scope.resolve(&text).unwrap(), text.clone());
        }
    }

    #[test]
    fn random_int_stays_in_range(min in -1000i64..1000, span in 0i64..1000) {
        let max = min + span;
        let value: i64 = evaluate(&format!("randomInt {} {}", min, max))
            .unwrap()
            .parse()
            .unwrap();
        prop_assert!(value >= min && value <= max);
    }

    #[test]
    fn headers_keep_order_and_duplicates(
        headers in proptest::collection::vec(("[A-Za-z][A-Za-z0-9-]{0,11}", "[a-z0-9/;=]{1,16}"), 0..8)
    ) {
        let mut content = String::from("GET https://example.com/\n");
        for (name, value) in &headers {
            content.push_str(&format!("{}: {}\n", name, value));
        }

        let document = parse_document(&content).unwrap();
        let request = document.requests().next().unwrap();
        let expected: Vec<Header> = headers
            .iter()
            .map(|(name, value)| Header::new(name.as_str(), value.as_str()))
            .collect();

        prop_assert_eq!(&request.headers, &expected);
    }
}
