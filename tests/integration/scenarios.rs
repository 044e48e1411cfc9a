//! End-to-end runs through the pad with scripted engines

use replpad::document::{Document, Inline, TextPointer, TextRange};
use replpad::{GuestValue, Style};

use crate::common::{error_texts, last_leaf, pad, runs_with};

#[test]
fn test_expression_renders_inspected_value() {
    let (mut pad, ruby, python) = pad("1+1");
    ruby.borrow_mut().returns("1+1", GuestValue::Int(2));

    pad.run_current_line();

    let document = pad.document();
    assert_eq!(document.plain_text(), "1+1\n2\n");
    assert_eq!(pad.session().current_name(), "ruby");
    assert_eq!(ruby.borrow().calls, vec!["execute 1+1", "invoke as_markup 2"]);
    assert!(python.borrow().calls.is_empty());
}

#[test]
fn test_switch_directive_confirms() {
    let (mut pad, ruby, python) = pad("%python");

    pad.run_current_line();

    assert_eq!(pad.session().current_name(), "python");
    assert_eq!(pad.document().plain_text(), "%python\nSwitched to python\n");
    assert!(ruby.borrow().calls.is_empty());
    assert!(python.borrow().calls.is_empty());
}

#[test]
fn test_unknown_language_becomes_error_fragment() {
    let (mut pad, _, _) = pad("%scheme");

    pad.run_current_line();

    let errors = error_texts(pad.document());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("scheme"));
    assert_eq!(pad.session().current_name(), "ruby");
}

#[test]
fn test_guest_error_leaves_partial_insertions() {
    let (mut pad, ruby, _) = pad("1/0");
    ruby.borrow_mut().fails("1/0", "divide by zero");

    pad.run_current_line();

    let document = pad.document();
    assert_eq!(error_texts(document), vec!["divide by zero"]);
    assert_eq!(ruby.borrow().count("invoke"), 0);
    // The raw input stays, the error sits right after it, and the echo and
    // its line break from the failed attempt remain.
    assert_eq!(document.plain_text(), "1/0divide by zero1/0\n");
}

#[test]
fn test_captured_output_skips_inspection() {
    let (mut pad, ruby, _) = pad("puts 42");
    {
        let mut script = ruby.borrow_mut();
        script.prints("puts 42", "hello\n");
        script.returns("puts 42", GuestValue::Int(42));
    }

    pad.run_current_line();

    assert_eq!(pad.document().plain_text(), "puts 42\nhello\n");
    assert_eq!(ruby.borrow().count("invoke"), 0);
    assert_eq!(pad.session().inspector().visited_count(), 0);
}

#[test]
fn test_switch_then_run_in_new_language() {
    let (mut pad, ruby, python) = pad("%python");
    python.borrow_mut().returns("len([1])", GuestValue::Int(1));

    pad.run_current_line();
    pad.type_text("len([1])");
    pad.run_current_line();

    assert_eq!(
        pad.document().plain_text(),
        "%python\nSwitched to python\nlen([1])\n1\n"
    );
    assert_eq!(python.borrow().calls, vec!["execute len([1])"]);
    // Inspection stays with the first engine
    assert_eq!(ruby.borrow().calls, vec!["invoke as_markup 1"]);
}

#[test]
fn test_visual_result_is_not_implemented() {
    let (mut pad, ruby, _) = pad("plot");
    {
        let mut script = ruby.borrow_mut();
        script.returns(
            "plot",
            GuestValue::Object {
                type_name: "Plot".to_string(),
                repr: "#<Plot>".to_string(),
            },
        );
        script.markup.insert(
            "#<Plot>".to_string(),
            GuestValue::Element {
                type_name: "Canvas".to_string(),
            },
        );
    }

    pad.run_current_line();

    assert_eq!(
        error_texts(pad.document()),
        vec!["Not implemented: cannot insert a Canvas in the middle of a document yet"]
    );
}

#[test]
fn test_echo_is_colorized() {
    let (mut pad, _, _) = pad("x = 10");
    pad.run_current_line();
    let numbers = runs_with(pad.document(), |style| style == Style::Number);
    assert!(numbers.contains(&"10".to_string()));
}

#[test]
fn test_caret_ends_in_trailing_empty_run() {
    let (mut pad, ruby, _) = pad("1");
    ruby.borrow_mut().returns("1", GuestValue::Int(1));

    let prompt = pad.run_current_line();

    let document = pad.document();
    assert_eq!(prompt, last_leaf(document));
    assert_eq!(document.run_text(prompt), Some(""));
    assert_eq!(document.caret(), TextPointer::new(prompt, 0));
}

#[test]
fn test_backwards_selection_runs_like_forwards() {
    let run = |backwards: bool| {
        let (mut pad, ruby, _) = pad("a\nb");
        ruby.borrow_mut().returns("a\nb", GuestValue::Int(3));
        let leaves = pad.document().leaves();
        let first = TextPointer::new(leaves[0], 0);
        let last = TextPointer::new(leaves[2], 1);
        let selection = if backwards {
            TextRange::new(last, first)
        } else {
            TextRange::new(first, last)
        };

        let prompt = pad.run_selection(selection);

        let document = pad.document();
        assert_eq!(document.caret(), TextPointer::new(prompt, 0));
        assert_eq!(prompt, last_leaf(document));
        assert!(error_texts(document).is_empty());
        assert_eq!(ruby.borrow().calls, vec!["execute a\nb", "invoke as_markup 3"]);
        document.plain_text()
    };

    let forwards = run(false);
    assert_eq!(forwards, "a\nb\n3\n");
    assert_eq!(run(true), forwards);
}

#[test]
fn test_backwards_live_selection_error_lands_after_it() {
    let (mut pad, ruby, _) = pad("1/0");
    ruby.borrow_mut().fails("1/0", "divide by zero");
    let input = pad.document().leaves()[0];
    pad.document_mut()
        .select(TextRange::new(TextPointer::new(input, 3), TextPointer::new(input, 0)));

    pad.run_live_selection();

    assert_eq!(pad.document().plain_text(), "1/0divide by zero1/0\n");
}

#[test]
fn test_bind_reaches_current_engine() {
    let (mut pad, ruby, python) = pad("");
    pad.bind("doc", GuestValue::Str("pad".to_string())).unwrap();
    pad.session_mut().execute("%python").unwrap();
    pad.bind("n", GuestValue::Int(3)).unwrap();

    assert_eq!(ruby.borrow().calls, vec!["set doc=pad"]);
    assert_eq!(python.borrow().calls, vec!["set n=3"]);
}

#[test]
#[should_panic(expected = "structural invariant violation")]
fn test_run_inside_span_is_structural_violation() {
    let mut document = Document::new();
    document.push_paragraph(vec![Inline::Span {
        style: Style::None,
        children: vec![Inline::plain("1+1")],
    }]);
    let nested = last_leaf(&document);
    document.set_caret(TextPointer::new(nested, 3));

    let (pad, _, _) = pad("");
    let mut pad = pad.with_document(document);
    pad.run_current_line();
}
