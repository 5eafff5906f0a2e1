//! Character-level parsers: the leaves every grammar is built from.
//!
//! Primitives either match and advance, or fail without touching the cursor.

use super::combinators::{BoxedParser, attempt};
use super::state::{ParseError, ParseState, SPACES_PER_INDENT};

/// Tab, line feed, carriage return and space.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' ')
}

/// Any single character.
pub fn any_char() -> BoxedParser<char> {
    BoxedParser::new(|state: &mut ParseState| state.advance().ok_or(ParseError))
}

/// One character from `set`, yielding its index within `set`.
pub fn char_in(set: &'static str) -> BoxedParser<usize> {
    BoxedParser::new(move |state: &mut ParseState| {
        let index = state
            .peek()
            .and_then(|c| set.chars().position(|member| member == c))
            .ok_or(ParseError)?;
        state.advance();
        Ok(index)
    })
}

/// One character from `set`, translated through `table` by its index.
///
/// Fails without consuming when the index has no entry in `table`.
pub fn char_in_map<V: Clone + 'static>(
    set: &'static str,
    table: Vec<Option<V>>,
) -> BoxedParser<V> {
    BoxedParser::new(move |state: &mut ParseState| {
        let value = state
            .peek()
            .and_then(|c| set.chars().position(|member| member == c))
            .and_then(|index| table.get(index).cloned().flatten())
            .ok_or(ParseError)?;
        state.advance();
        Ok(value)
    })
}

/// Zero or more characters from `set`. Never fails.
pub fn run_of(set: &'static str) -> BoxedParser<String> {
    satisfy_many(move |c, _| set.contains(c))
}

/// One character accepted by `predicate`, called with a local index of 0.
pub fn satisfy<F>(predicate: F) -> BoxedParser<char>
where
    F: Fn(char, usize) -> bool + 'static,
{
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(c) if predicate(c, 0) => state.advance().ok_or(ParseError),
        _ => Err(ParseError),
    })
}

/// The maximal run accepted by `predicate`, possibly empty.
pub fn satisfy_many<F>(predicate: F) -> BoxedParser<String>
where
    F: Fn(char, usize) -> bool + 'static,
{
    BoxedParser::new(move |state: &mut ParseState| Ok(state.advance_while(&predicate)))
}

/// Like [`satisfy_many`] but only counts the characters.
pub fn skip_satisfy_many<F>(predicate: F) -> BoxedParser<usize>
where
    F: Fn(char, usize) -> bool + 'static,
{
    BoxedParser::new(move |state: &mut ParseState| Ok(state.skip_while(&predicate)))
}

/// Exactly `expected`, or nothing at all.
pub fn literal(expected: impl Into<String>) -> BoxedParser<String> {
    let expected = expected.into();
    BoxedParser::new(move |state: &mut ParseState| {
        if state.eat(&expected) {
            state.succeed(expected.clone())
        } else {
            state.fail()
        }
    })
}

pub fn end_of_stream() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParseState| {
        if state.is_at_end() {
            state.succeed(())
        } else {
            state.fail()
        }
    })
}

/// `\n`, `\r`, `\r\n`, or the end of input (which consumes nothing).
pub fn end_of_line() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParseState| {
        if state.is_at_end() || state.eat("\n") {
            return Ok(());
        }
        if state.eat("\r") {
            state.eat("\n");
            return Ok(());
        }
        Err(ParseError)
    })
}

/// Skip any whitespace, returning how many characters were skipped.
pub fn whitespace() -> BoxedParser<usize> {
    skip_satisfy_many(|c, _| is_whitespace(c))
}

/// One or more ASCII digits.
pub fn digits() -> BoxedParser<String> {
    satisfy_many(|c, _| c.is_ascii_digit()).filter(|run| !run.is_empty())
}

/// One or more ASCII letters.
pub fn letters() -> BoxedParser<String> {
    satisfy_many(|c, _| c.is_ascii_alphabetic()).filter(|run| !run.is_empty())
}

// === Indentation ===

/// Raise the indent level. Consumes nothing.
pub fn indent() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParseState| {
        state.indent();
        Ok(())
    })
}

/// Lower the indent level. Consumes nothing; fails at level zero.
pub fn dedent() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParseState| {
        if state.dedent() {
            state.succeed(())
        } else {
            state.fail()
        }
    })
}

/// Exactly as many indentation units as the current indent level.
pub fn indention() -> BoxedParser<()> {
    let unit = " ".repeat(SPACES_PER_INDENT);
    BoxedParser::new(move |state: &mut ParseState| {
        attempt(state, |state| {
            for _ in 0..state.indent_level() {
                if !(state.eat("\t") || state.eat(&unit)) {
                    return Err(ParseError);
                }
            }
            Ok(())
        })
    })
}

/// Any run of spaces and tabs, measured in whole indentation units. Never
/// fails.
pub fn any_indention() -> BoxedParser<usize> {
    BoxedParser::new(|state: &mut ParseState| {
        let run = state.advance_while(|c, _| c == ' ' || c == '\t');
        let mut units = 0;
        let mut spaces = 0;
        for c in run.chars() {
            if c == '\t' {
                units += 1;
                spaces = 0;
            } else {
                spaces += 1;
                if spaces == SPACES_PER_INDENT {
                    units += 1;
                    spaces = 0;
                }
            }
        }
        Ok(units)
    })
}
