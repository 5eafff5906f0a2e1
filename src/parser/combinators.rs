use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::state::{ParseError, ParseResult, ParseState, Parser};

type ParserFn<T> = Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>;

type ParserSlot<T> = Rc<RefCell<Option<Weak<dyn Fn(&mut ParseState) -> ParseResult<T>>>>>;

/// A parser behind a shared pointer. Cloning shares the parser, it does not
/// rebuild it.
pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

/// Run `body` speculatively: if it fails, the cursor is put back exactly
/// where it was before `body` started.
pub fn attempt<T, F>(state: &mut ParseState, body: F) -> ParseResult<T>
where
    F: FnOnce(&mut ParseState) -> ParseResult<T>,
{
    let snapshot = state.snapshot();
    let result = body(state);
    if result.is_err() {
        state.restore(snapshot);
    }
    result
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state| parser.parse(state)),
        }
    }

    /// Both parsers in order, keeping both values.
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParseState| {
            attempt(state, |state| {
                let a = self.parse(state)?;
                let b = other.parse(state)?;
                Ok((a, b))
            })
        })
    }

    /// Both parsers in order, keeping only this parser's value.
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            attempt(state, |state| {
                let a = self.parse(state)?;
                other.parse(state)?;
                Ok(a)
            })
        })
    }

    /// Both parsers in order, keeping only `other`'s value.
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            attempt(state, |state| {
                self.parse(state)?;
                other.parse(state)
            })
        })
    }

    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| self.parse(state).map(&f))
    }

    /// On failure, rewind and run `other` instead.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let snapshot = state.snapshot();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(_) => {
                    state.restore(snapshot);
                    other.parse(state)
                }
            }
        })
    }

    /// Keep a successful result only if `predicate` accepts it
    pub fn filter<F: Fn(&T) -> bool + 'static>(self, predicate: F) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            attempt(state, |state| {
                let value = self.parse(state)?;
                if predicate(&value) {
                    Ok(value)
                } else {
                    Err(ParseError)
                }
            })
        })
    }

    /// Trace every attempt under `name`, with where it started and ended.
    pub fn label(self, name: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let start = state.position();
            trace!(parser = name, position = start, "attempt");
            let result = self.parse(state);
            match &result {
                Ok(_) => trace!(parser = name, from = start, to = state.position(), "matched"),
                Err(_) => trace!(parser = name, position = start, "no match"),
            }
            result
        })
    }
}

// a + b: both values
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

// a - b: a's value
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

// a * b: b's value
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

// a | b: first success
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

// a >> f: mapped value
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

pub fn keep_left<T: 'static, U: 'static>(
    left: BoxedParser<T>,
    right: BoxedParser<U>,
) -> BoxedParser<T> {
    left.skip(right)
}

pub fn keep_right<T: 'static, U: 'static>(
    left: BoxedParser<T>,
    right: BoxedParser<U>,
) -> BoxedParser<U> {
    left.skip_left(right)
}

/// open inner close -> inner
pub fn between<O: 'static, T: 'static, C: 'static>(
    open: BoxedParser<O>,
    inner: BoxedParser<T>,
    close: BoxedParser<C>,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        attempt(state, |state| {
            open.parse(state)?;
            let value = inner.parse(state)?;
            close.parse(state)?;
            Ok(value)
        })
    })
}

/// Run `parser` unless `excluded` matches at the current position. The
/// lookahead never consumes input.
pub fn except<T: 'static, U: 'static>(
    parser: BoxedParser<T>,
    excluded: BoxedParser<U>,
) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let snapshot = state.snapshot();
        let blocked = excluded.parse(state).is_ok();
        state.restore(snapshot);
        if blocked {
            return Err(ParseError);
        }
        parser.parse(state)
    })
}

/// `Some` on a match, `None` (with the cursor untouched) otherwise.
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let snapshot = state.snapshot();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(snapshot);
                Ok(None)
            }
        }
    })
}

pub fn test<T: 'static, F: Fn(&T) -> bool + 'static>(
    parser: BoxedParser<T>,
    predicate: F,
) -> BoxedParser<T> {
    parser.filter(predicate)
}

pub fn transform<T: 'static, U: 'static, F: Fn(T) -> U + 'static>(
    parser: BoxedParser<T>,
    f: F,
) -> BoxedParser<U> {
    parser.map(f)
}

/// Zero or more matches of `parser`, in order.
///
/// The inner parser is expected to consume input whenever it succeeds. A
/// success that consumes nothing is recorded once and ends the repetition.
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = Vec::new();
        repeat_into(&parser, state, &mut results);
        Ok(results)
    })
}

/// Like [`many`], but at least one match is required.
pub fn many1<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let first = parser.parse(state)?;
        let mut results = vec![first];
        repeat_into(&parser, state, &mut results);
        Ok(results)
    })
}

fn repeat_into<T>(parser: &BoxedParser<T>, state: &mut ParseState, results: &mut Vec<T>) {
    loop {
        let snapshot = state.snapshot();
        match parser.parse(state) {
            Ok(item) => {
                results.push(item);
                if state.position() == snapshot.position() {
                    warn!(
                        position = snapshot.position(),
                        "repeated parser succeeded without consuming input"
                    );
                    break;
                }
            }
            Err(_) => {
                state.restore(snapshot);
                break;
            }
        }
    }
}

/// Like [`many`], concatenating every result into one string
pub fn many_as_string<T: Into<String> + 'static>(
    parser: BoxedParser<T>,
) -> BoxedParser<String> {
    many(parser)
        >> |items: Vec<T>| {
            items.into_iter().fold(String::new(), |mut acc, item| {
                acc.push_str(&item.into());
                acc
            })
        }
}

/// Try each alternative in order from the same position; the first success
/// wins.
pub fn choice<T: 'static>(
    alternatives: impl IntoIterator<Item = BoxedParser<T>>,
) -> BoxedParser<T> {
    let alternatives: Vec<BoxedParser<T>> = alternatives.into_iter().collect();
    BoxedParser::new(move |state: &mut ParseState| {
        let snapshot = state.snapshot();
        for alternative in &alternatives {
            match alternative.parse(state) {
                Ok(value) => return Ok(value),
                Err(_) => state.restore(snapshot),
            }
        }
        Err(ParseError)
    })
}

/// chain := term (separator term)*
///
/// Folds to the left. A separator that is not followed by a term is left
/// unconsumed.
pub fn chain_left<T, S, F>(
    term: BoxedParser<T>,
    separator: BoxedParser<S>,
    combine: F,
) -> BoxedParser<T>
where
    T: 'static,
    S: 'static,
    F: Fn(T, S, T) -> T + 'static,
{
    BoxedParser::new(move |state: &mut ParseState| {
        let mut left = term.parse(state)?;

        loop {
            let snapshot = state.snapshot();

            let Ok(op) = separator.parse(state) else {
                state.restore(snapshot);
                break;
            };

            match term.parse(state) {
                Ok(right) => left = combine(left, op, right),
                Err(_) => {
                    state.restore(snapshot);
                    break;
                }
            }
        }

        Ok(left)
    })
}

pub fn combine2<A: 'static, B: 'static>(
    a: BoxedParser<A>,
    b: BoxedParser<B>,
) -> BoxedParser<(A, B)> {
    a.seq(b)
}

pub fn combine3<A: 'static, B: 'static, C: 'static>(
    a: BoxedParser<A>,
    b: BoxedParser<B>,
    c: BoxedParser<C>,
) -> BoxedParser<(A, B, C)> {
    BoxedParser::new(move |state: &mut ParseState| {
        attempt(state, |state| {
            let first = a.parse(state)?;
            let second = b.parse(state)?;
            let third = c.parse(state)?;
            Ok((first, second, third))
        })
    })
}

/// Pick a parser by peeking at the next character.
///
/// Every character of a case's key string routes to that case; for a
/// character listed more than once the earliest case wins. Characters with no
/// case, and the end of input, go to `default`. Once a case is chosen its
/// outcome is final.
pub fn dispatch_on_first_char<T: 'static>(
    default: BoxedParser<T>,
    cases: impl IntoIterator<Item = (&'static str, BoxedParser<T>)>,
) -> BoxedParser<T> {
    let mut table: HashMap<char, BoxedParser<T>> = HashMap::new();
    for (differentiators, parser) in cases {
        for c in differentiators.chars() {
            table.entry(c).or_insert_with(|| parser.clone());
        }
    }

    BoxedParser::new(move |state: &mut ParseState| {
        match state.peek().and_then(|c| table.get(&c)) {
            Some(parser) => parser.parse(state),
            None => default.parse(state),
        }
    })
}

// === Forward references ===

/// A placeholder for a parser that is defined after the parsers that use it.
///
/// Every parser handed out by [`Forward::parser`] shares one slot, so a later
/// [`Forward::define`] is observed by all of them. The slot only holds a weak
/// reference: whoever keeps the parser returned by `define` keeps the
/// recursive grammar alive.
pub struct Forward<T> {
    slot: ParserSlot<T>,
}

impl<T> Clone for Forward<T> {
    fn clone(&self) -> Self {
        Forward {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: 'static> Default for Forward<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Forward<T> {
    pub fn new() -> Self {
        Forward {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    pub fn parser(&self) -> BoxedParser<T> {
        let slot = Rc::clone(&self.slot);
        BoxedParser::new(move |state: &mut ParseState| {
            let target = slot.borrow().as_ref().and_then(Weak::upgrade);
            match target {
                Some(parser) => parser(state),
                None => {
                    warn!(
                        position = state.position(),
                        "forward parser used while undefined"
                    );
                    Err(ParseError)
                }
            }
        })
    }

    /// Bind (or rebind) the placeholder and hand the definition back.
    #[must_use = "the placeholder only keeps a weak reference to its definition"]
    pub fn define(&self, parser: BoxedParser<T>) -> BoxedParser<T> {
        *self.slot.borrow_mut() = Some(Rc::downgrade(&parser.parser));
        parser
    }

    pub fn is_defined(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::primitives::{any_char, digits, literal};

    fn run<T>(parser: &BoxedParser<T>, input: &str) -> (ParseResult<T>, usize) {
        let mut state = ParseState::new(input);
        let result = parser.parse(&mut state);
        (result, state.position())
    }

    #[test]
    fn test_seq_restores_on_second_failure() {
        let parser = literal("ab") + literal("cd");
        let (result, position) = run(&parser, "abXX");
        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_keep_left_and_keep_right() {
        let (left, _) = run(&keep_left(literal("a"), literal("b")), "ab");
        assert_eq!(left, Ok("a".to_string()));
        let (right, _) = run(&keep_right(literal("a"), literal("b")), "ab");
        assert_eq!(right, Ok("b".to_string()));
    }

    #[test]
    fn test_between_keeps_inner() {
        let parser = between(literal("["), digits(), literal("]"));
        assert_eq!(run(&parser, "[42]").0, Ok("42".to_string()));

        let (result, position) = run(&parser, "[42");
        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_except_blocks_excluded_prefix() {
        let not_newline = except(any_char(), literal("\n"));
        assert_eq!(run(&not_newline, "x").0, Ok('x'));

        let (result, position) = run(&not_newline, "\nx");
        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_optional_yields_none_without_consuming() {
        let parser = optional(literal("ab"));
        let (result, position) = run(&parser, "ax");
        assert_eq!(result, Ok(None));
        assert_eq!(position, 0);
    }

    #[test]
    fn test_filter_restores_rejected_value() {
        let short = test(digits(), |d: &String| d.len() < 3);
        assert_eq!(run(&short, "12").0, Ok("12".to_string()));

        let (result, position) = run(&short, "1234");
        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_transform_maps_value() {
        let parser = transform(digits(), |d| d.len());
        assert_eq!(run(&parser, "123x").0, Ok(3));
    }

    #[test]
    fn test_many_collects_until_failure() {
        let parser = many(literal("ab"));
        let (result, position) = run(&parser, "ababa");
        assert_eq!(result.map(|v| v.len()), Ok(2));
        assert_eq!(position, 4);
    }

    #[test]
    fn test_many_accepts_zero_repetitions() {
        let (result, position) = run(&many(literal("x")), "yyy");
        assert_eq!(result, Ok(vec![]));
        assert_eq!(position, 0);
    }

    #[test]
    fn test_many_stops_on_non_consuming_success() {
        let (result, position) = run(&many(optional(literal("x"))), "yyy");
        assert_eq!(result, Ok(vec![None]));
        assert_eq!(position, 0);
    }

    #[test]
    fn test_many1_requires_one() {
        assert!(run(&many1(literal("x")), "y").0.is_err());
        assert_eq!(run(&many1(literal("x")), "xxy").0.map(|v| v.len()), Ok(2));
    }

    #[test]
    fn test_many_as_string_concatenates() {
        let parser = many_as_string(except(any_char(), literal(";")));
        assert_eq!(run(&parser, "abc;def").0, Ok("abc".to_string()));
    }

    #[test]
    fn test_choice_picks_first_success() {
        let parser = choice([literal("a"), literal("ab")]);
        let (result, position) = run(&parser, "abc");
        assert_eq!(result, Ok("a".to_string()));
        assert_eq!(position, 1);
    }

    #[test]
    fn test_choice_restores_between_alternatives() {
        let long = (literal("a") + literal("x")) >> |_| 1;
        let short = literal("ab") >> |_| 2;
        let (result, position) = run(&choice([long, short]), "ab");
        assert_eq!(result, Ok(2));
        assert_eq!(position, 2);
    }

    #[test]
    fn test_choice_failure_leaves_cursor() {
        let (result, position) = run(&choice([literal("x"), literal("y")]), "abc");
        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_chain_left_folds_left() {
        let number = digits();
        let parser = chain_left(number, literal("-"), |l, _, r| format!("({l}-{r})"));
        assert_eq!(run(&parser, "1-2-3").0, Ok("((1-2)-3)".to_string()));
    }

    #[test]
    fn test_chain_left_leaves_dangling_separator() {
        let parser = chain_left(digits(), literal("+"), |l, _, r| format!("{l}{r}"));
        let (result, position) = run(&parser, "1+2+");
        assert_eq!(result, Ok("12".to_string()));
        assert_eq!(position, 3);
    }

    #[test]
    fn test_combine3_restores_on_last_failure() {
        let parser = combine3(literal("a"), literal("b"), literal("c"));
        assert!(run(&parser, "abc").0.is_ok());
        let (result, position) = run(&parser, "abx");
        assert!(result.is_err());
        assert_eq!(position, 0);
    }

    #[test]
    fn test_dispatch_routes_by_first_char() {
        let parser = dispatch_on_first_char(
            literal("?") >> |_| 0,
            [
                ("0123456789", digits() >> |d: String| d.len()),
                ("ab", literal("ab") >> |_| 100),
            ],
        );
        assert_eq!(run(&parser, "123").0, Ok(3));
        assert_eq!(run(&parser, "ab").0, Ok(100));
        assert_eq!(run(&parser, "?").0, Ok(0));
        assert!(run(&parser, "b").0.is_err());
        assert!(run(&parser, "").0.is_err());
    }

    #[test]
    fn test_forward_sees_later_definition() {
        // nested := "(" nested ")" | "x"
        let nested = Forward::<usize>::new();
        let inner =
            between(literal("("), nested.parser(), literal(")")) >> |depth: usize| depth + 1;
        let root = nested.define(inner | (literal("x") >> |_| 0));

        assert!(nested.is_defined());
        assert_eq!(run(&root, "((x))").0, Ok(2));
        assert!(run(&root, "((x)").0.is_err());
    }

    #[test]
    fn test_undefined_forward_fails() {
        let forward = Forward::<char>::new();
        let (result, position) = run(&forward.parser(), "abc");
        assert!(result.is_err());
        assert_eq!(position, 0);
        assert!(!forward.is_defined());
    }

    #[test]
    fn test_forward_fails_once_definition_dropped() {
        let forward = Forward::<char>::new();
        let placeholder = forward.parser();
        drop(forward.define(any_char()));
        assert!(!forward.is_defined());
        assert!(run(&placeholder, "a").0.is_err());
    }
}
