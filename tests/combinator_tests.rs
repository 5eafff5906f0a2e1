//! Engine-level behaviour that only shows up when combinators are composed

use std::cell::Cell;
use std::rc::Rc;

use parsley::parser::{
    BoxedParser, Forward, ParseError, ParseState, Parser, any_char, any_indention, between,
    chain_left, choice, combine2, dedent, digits, dispatch_on_first_char, end_of_line,
    end_of_stream, except, indent, indention, letters, literal, many, many_as_string, optional,
    whitespace,
};

/// A parser that records where it was started and then fails.
fn record_start(seen: Rc<Cell<Option<usize>>>) -> BoxedParser<String> {
    BoxedParser::new(move |state: &mut ParseState| {
        seen.set(Some(state.position()));
        Err(ParseError)
    })
}

#[test]
fn choice_starts_every_alternative_at_the_same_position() {
    let seen = Rc::new(Cell::new(None));
    // consumes "ab" before failing on the missing "x"
    let greedy = (literal("ab") + literal("x")) >> |(a, x): (String, String)| a + &x;
    let parser = choice([greedy, record_start(Rc::clone(&seen)), literal("abc")]);

    let mut state = ParseState::new("zzabc");
    state.advance();
    state.advance();

    assert_eq!(parser.parse(&mut state), Ok("abc".to_string()));
    assert_eq!(seen.get(), Some(2));
    assert!(state.is_at_end());
}

#[test]
fn failed_choice_leaves_cursor_untouched() {
    let parser = choice([
        (literal("a") + literal("b") + literal("c")) >> |_| (),
        (digits() - literal("!")) >> |_| (),
    ]);

    let mut state = ParseState::new("ab123?");
    let before = state.snapshot();
    assert!(parser.parse(&mut state).is_err());
    assert_eq!(state.snapshot(), before);
}

#[test]
fn failed_optional_inside_sequence_is_rewound() {
    let seen = Rc::new(Cell::new(None));
    let maybe_sign = optional(literal("-") + literal("-"));
    let parser = maybe_sign + record_start(Rc::clone(&seen));

    let mut state = ParseState::new("-5");
    assert!(parser.parse(&mut state).is_err());
    assert_eq!(seen.get(), Some(0));
    assert_eq!(state.position(), 0);
}

#[derive(Debug, PartialEq)]
enum Tree {
    Leaf(String),
    Node(Vec<Tree>),
}

/// tree := word | "[" tree* "]"   (entries separated by whitespace)
fn tree_grammar() -> BoxedParser<Tree> {
    let tree = Forward::new();
    let leaf = (letters() - whitespace()) >> Tree::Leaf;
    let node = between(
        literal("[") - whitespace(),
        many(tree.parser()),
        literal("]") - whitespace(),
    ) >> Tree::Node;
    tree.define(leaf | node)
}

#[test]
fn forward_reference_supports_nesting() {
    let grammar = tree_grammar();
    let mut state = ParseState::new("[a [b c] []]");

    let expected = Tree::Node(vec![
        Tree::Leaf("a".to_string()),
        Tree::Node(vec![
            Tree::Leaf("b".to_string()),
            Tree::Leaf("c".to_string()),
        ]),
        Tree::Node(vec![]),
    ]);
    assert_eq!(grammar.parse(&mut state), Ok(expected));
    assert!(state.is_at_end());
}

#[test]
fn forward_reference_failure_rewinds_nested_attempts() {
    let grammar = tree_grammar();
    let mut state = ParseState::new("[a [b]");
    assert!(grammar.parse(&mut state).is_err());
    assert_eq!(state.position(), 0);
}

#[test]
fn rest_of_line_with_except() {
    let rest_of_line = many_as_string(except(any_char(), end_of_line())) - end_of_line();
    let lines = many(except(rest_of_line, end_of_stream()));

    let mut state = ParseState::new("first\r\nsecond\nthird");
    assert_eq!(
        lines.parse(&mut state),
        Ok(vec![
            "first".to_string(),
            "second".to_string(),
            "third".to_string()
        ])
    );
    assert!(state.is_at_end());
}

#[test]
fn chain_left_with_mapped_values() {
    let number = (digits() - whitespace()) >> |d: String| d.parse::<i64>().unwrap_or_default();
    let op = (literal("-") | literal("+")) - whitespace();
    let sum = chain_left(number, op, |l, op, r| if op == "+" { l + r } else { l - r });

    let mut state = ParseState::new("10 - 4 - 3 + 1");
    assert_eq!(sum.parse(&mut state), Ok(4));
}

#[test]
fn dispatch_matches_choice_on_disjoint_prefixes() {
    let word = || letters() >> |w: String| format!("word:{w}");
    let number = || digits() >> |d: String| format!("number:{d}");
    let fallback = || any_char() >> |c: char| format!("other:{c}");

    let dispatched = dispatch_on_first_char(
        fallback(),
        [
            ("abcdefghijklmnopqrstuvwxyz", word()),
            ("0123456789", number()),
        ],
    );
    let chosen = choice([word(), number(), fallback()]);

    for input in ["hello", "123", "?", "h1"] {
        let mut a = ParseState::new(input);
        let mut b = ParseState::new(input);
        assert_eq!(dispatched.parse(&mut a), chosen.parse(&mut b), "{input}");
        assert_eq!(a.position(), b.position());
    }
}

#[test]
fn combine2_pairs_values() {
    let assignment = combine2(letters() - literal("="), digits());
    let mut state = ParseState::new("x=42");
    assert_eq!(
        assignment.parse(&mut state),
        Ok(("x".to_string(), "42".to_string()))
    );
}

#[derive(Debug, PartialEq)]
struct Outline {
    title: String,
    children: Vec<Outline>,
}

/// outline := indention word eol (indent outline* dedent)
fn outline_grammar() -> BoxedParser<Outline> {
    let outline = Forward::new();
    let heading = indention() * letters() - end_of_line();
    let children = indent() * many(outline.parser()) - dedent();
    outline.define(
        (heading + children)
            >> |(title, children): (String, Vec<Outline>)| Outline { title, children },
    )
}

#[test]
fn indentation_drives_nesting() {
    let grammar = outline_grammar();
    let mut state = ParseState::new("root\n\tleft\n\t\tleaf\n\tright\n");

    let leaf = Outline {
        title: "leaf".to_string(),
        children: vec![],
    };
    let expected = Outline {
        title: "root".to_string(),
        children: vec![
            Outline {
                title: "left".to_string(),
                children: vec![leaf],
            },
            Outline {
                title: "right".to_string(),
                children: vec![],
            },
        ],
    };

    assert_eq!(grammar.parse(&mut state), Ok(expected));
    assert!(state.is_at_end());
    assert_eq!(state.indent_level(), 0);
}

#[test]
fn any_indention_measures_mixed_indentation() {
    let mut state = ParseState::new("        \tx");
    assert_eq!(any_indention().parse(&mut state), Ok(3));
    assert_eq!(state.rest(), "x");
}
