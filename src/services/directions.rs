use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::models::Directions;

/// Reasons a directions cell is not a list literal of strings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListLiteralError {
    #[error("expected '{expected}' at offset {offset}")]
    Expected { expected: char, offset: usize },
    #[error("list element at offset {offset} is not a string")]
    NotAString { offset: usize },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

/// Parses a stored directions cell, falling back to the raw text when it is not a
/// list literal such as `['Preheat oven.', "Bake 20 minutes."]`
pub fn parse_directions(raw: &str) -> Directions {
    match parse_string_list(raw) {
        Ok(steps) => Directions::Steps(steps),
        Err(e) => {
            tracing::debug!(error = %e, "Directions kept as plain text");
            Directions::Unparsed(raw.to_string())
        }
    }
}

/// Parses a bracketed, comma-separated list of single- or double-quoted strings.
///
/// Escapes decode as in Python string literals, and adjacent literals within one
/// element are concatenated (`'a' "b"` is `"ab"`).
pub fn parse_string_list(input: &str) -> Result<Vec<String>, ListLiteralError> {
    let mut cursor = Cursor::new(input);
    let mut items = Vec::new();

    cursor.skip_whitespace();
    cursor.expect('[')?;
    cursor.skip_whitespace();

    if cursor.eat(']') {
        return cursor.finish(items);
    }

    loop {
        let mut item = cursor.string_literal()?;
        cursor.skip_whitespace();
        while cursor.at_string_start() {
            item.push_str(&cursor.string_literal()?);
            cursor.skip_whitespace();
        }
        items.push(item);

        if cursor.eat(']') {
            break;
        }
        cursor.expect(',')?;
        cursor.skip_whitespace();
        // trailing comma
        if cursor.eat(']') {
            break;
        }
    }

    cursor.finish(items)
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            offset: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn eat(&mut self, wanted: char) -> bool {
        if self.chars.peek() == Some(&wanted) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn at_string_start(&self) -> bool {
        let mut ahead = self.chars.clone();
        match ahead.next() {
            Some('\'' | '"') => true,
            Some('u' | 'U') => matches!(ahead.next(), Some('\'' | '"')),
            _ => false,
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), ListLiteralError> {
        if self.eat(wanted) {
            Ok(())
        } else {
            Err(ListLiteralError::Expected {
                expected: wanted,
                offset: self.offset,
            })
        }
    }

    fn string_literal(&mut self) -> Result<String, ListLiteralError> {
        let start = self.offset;
        // u'' prefixes are harmless
        if matches!(self.chars.peek(), Some('u') | Some('U')) {
            self.bump();
        }

        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(ListLiteralError::NotAString { offset: start }),
        };

        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(ListLiteralError::UnterminatedString),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => self.escape(&mut value)?,
                Some(c) => value.push(c),
            }
        }
    }

    /// Decodes one escape sequence, the backslash already consumed
    fn escape(&mut self, value: &mut String) -> Result<(), ListLiteralError> {
        let offset = self.offset - 1;
        match self.bump() {
            None => return Err(ListLiteralError::UnterminatedString),
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('a') => value.push('\u{07}'),
            Some('b') => value.push('\u{08}'),
            Some('f') => value.push('\u{0c}'),
            Some('v') => value.push('\u{0b}'),
            // line continuation
            Some('\n') => {}
            Some(c @ ('\\' | '\'' | '"')) => value.push(c),
            Some('x') => value.push(self.hex_char(2, offset)?),
            Some('u') => value.push(self.hex_char(4, offset)?),
            Some('U') => value.push(self.hex_char(8, offset)?),
            Some(first @ '0'..='7') => {
                let mut code = first.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            self.bump();
                            code = code * 8 + digit;
                        }
                        None => break,
                    }
                }
                let c = char::from_u32(code).ok_or(ListLiteralError::InvalidEscape { offset })?;
                value.push(c);
            }
            // unknown escapes keep their backslash
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize, offset: usize) -> Result<char, ListLiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or(ListLiteralError::InvalidEscape { offset })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(ListLiteralError::InvalidEscape { offset })
    }

    fn finish(mut self, items: Vec<String>) -> Result<Vec<String>, ListLiteralError> {
        self.skip_whitespace();
        if self.chars.peek().is_some() {
            return Err(ListLiteralError::TrailingInput {
                offset: self.offset,
            });
        }
        Ok(items)
    }
}
