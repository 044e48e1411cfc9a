//! Property tests for dispatch, colorization and sequence insertion

use proptest::prelude::*;

use replpad::document::mutation::insert_sequence;
use replpad::document::{Document, Inline};
use replpad::{Colorizer, LexicalColorizer, Outcome, ReplError, Syntax};

use crate::common::{session, ScriptedEngine};

/// Language names that are never registered by the fixtures
fn unknown_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("registered", |name| name != "ruby" && name != "python")
}

fn syntax_strategy() -> impl Strategy<Value = Syntax> {
    prop_oneof![
        Just(Syntax::ruby()),
        Just(Syntax::python()),
        Just(Syntax::plain()),
    ]
}

proptest! {
    #[test]
    fn prop_registered_directive_switches(name in "[a-z][a-z0-9_]{0,8}") {
        let (mut session, _, _) = session();
        let (engine, _) = ScriptedEngine::boxed(&name, &[]);
        session.register(engine);

        let outcome = session.execute(&format!("%{}", name)).unwrap();
        prop_assert_eq!(session.current_name(), name.as_str());
        prop_assert!(outcome.to_string().contains(&name));
        prop_assert_eq!(outcome, Outcome::Switched(name.clone()));
    }

    #[test]
    fn prop_unknown_directive_keeps_current(name in unknown_name_strategy(), first in prop::bool::ANY) {
        let (mut session, _, _) = session();
        if first {
            session.execute("%python").unwrap();
        }
        let before = session.current_name().to_string();

        let err = session.execute(&format!("%{}", name)).unwrap_err();
        prop_assert!(matches!(err, ReplError::UnknownLanguage(ref n) if *n == name));
        prop_assert_eq!(session.current_name(), before.as_str());
    }

    #[test]
    fn prop_colorize_is_lossless(code in "\\PC{0,40}|[ -~\n\t]{0,60}", syntax in syntax_strategy()) {
        let fragments = LexicalColorizer::new().colorize(&syntax, &code);
        let joined: String = fragments.iter().map(Inline::plain_text).collect();
        prop_assert_eq!(joined, code);
    }

    #[test]
    fn prop_sequence_keeps_order(texts in prop::collection::vec("[a-z]{1,5}", 0..8)) {
        let mut document = Document::with_text("head");
        let anchor = document.leaves()[0];
        let tail = document.insert_after(anchor, Inline::plain("tail"));

        let elements: Vec<Inline> = texts.iter().map(|t| Inline::plain(t.as_str())).collect();
        let last = insert_sequence(&mut document, anchor, elements);

        let leaves = document.leaves();
        let inserted: Vec<String> = leaves[1..leaves.len() - 1]
            .iter()
            .map(|id| document.run_text(*id).unwrap().to_string())
            .collect();
        prop_assert_eq!(&inserted, &texts);
        prop_assert_eq!(*leaves.last().unwrap(), tail);
        if texts.is_empty() {
            prop_assert_eq!(last, anchor);
        } else {
            prop_assert_eq!(last, leaves[leaves.len() - 2]);
        }
    }
}
