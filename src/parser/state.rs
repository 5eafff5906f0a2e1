use thiserror::Error;

/// The single failure kind of the engine: nothing matched at the cursor.
///
/// Failures are ordinary control flow for `or`, `optional` and friends, so the
/// error carries no position or expectation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no match at this position")]
pub struct ParseError;

pub type ParseResult<T> = Result<T, ParseError>;

/// Number of spaces that make up one indentation unit. A tab is always one unit.
pub const SPACES_PER_INDENT: usize = 4;

/// Saved cursor state, used to undo speculative progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    position: usize,
    indent_level: usize,
}

impl Snapshot {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }
}

/// Cursor over the input text of one parse call.
///
/// `position` is a byte offset and always sits on a `char` boundary.
#[derive(Debug, Clone)]
pub struct ParseState {
    text: String,
    position: usize,
    indent_level: usize,
    nesting_depth: usize,
}

impl ParseState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: 0,
            indent_level: 0,
            nesting_depth: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The unconsumed suffix of the input.
    pub fn rest(&self) -> &str {
        &self.text[self.position..]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.position,
            indent_level: self.indent_level,
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.position = snapshot.position;
        self.indent_level = snapshot.indent_level;
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Consume the maximal run of characters accepted by `predicate` and
    /// return it. The predicate also receives the index of the character
    /// within the run.
    pub fn advance_while<F>(&mut self, predicate: F) -> String
    where
        F: Fn(char, usize) -> bool,
    {
        let start = self.position;
        self.skip_while(predicate);
        self.text[start..self.position].to_string()
    }

    /// Like [`ParseState::advance_while`], but only reports how many
    /// characters were consumed.
    pub fn skip_while<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(char, usize) -> bool,
    {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if !predicate(c, count) {
                break;
            }
            self.position += c.len_utf8();
            count += 1;
        }
        count
    }

    /// Consume `expected` if the input continues with it. Nothing is consumed
    /// on a mismatch.
    pub fn eat(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.position += expected.len();
            true
        } else {
            false
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Lower the indent level, refusing to go below zero.
    pub fn dedent(&mut self) -> bool {
        match self.indent_level.checked_sub(1) {
            Some(level) => {
                self.indent_level = level;
                true
            }
            None => false,
        }
    }

    pub fn nesting_depth(&self) -> usize {
        self.nesting_depth
    }

    /// Go one level deeper unless that would exceed `limit`.
    pub fn enter_nesting(&mut self, limit: usize) -> bool {
        if self.nesting_depth >= limit {
            return false;
        }
        self.nesting_depth += 1;
        true
    }

    pub fn leave_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    pub fn succeed<T>(&self, value: T) -> ParseResult<T> {
        Ok(value)
    }

    pub fn fail<T>(&self) -> ParseResult<T> {
        Err(ParseError)
    }
}

/// Anything that can be run against a [`ParseState`].
pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

// Allow closures to be parsers
impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
