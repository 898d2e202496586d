//! Lexer (tokenizer) for SPICE model cards.

use crate::error::{ClipperError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in a model library.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A model name, model type or parameter name
    Identifier,
    /// A number, possibly with scale and unit suffix
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Open parenthesis '('
    OpenParen,
    /// Close parenthesis ')'
    CloseParen,
    /// Equals sign '='
    Equals,
    /// End of a logical line
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing model card input.
///
/// Continuation lines (`+` as the first non-blank character) are folded into
/// the preceding line, so the parser only ever sees logical lines.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(self.token(TokenKind::Eof, String::new(), self.line, self.column)),
        };

        let start_line = self.line;
        let start_column = self.column;
        self.at_line_start = false;

        let token = match ch {
            '\n' => {
                self.advance();
                self.at_line_start = true;
                if self.continuation_follows() {
                    return self.next_token();
                }
                self.token(TokenKind::Newline, "\n".to_string(), start_line, start_column)
            }
            '.' if !self.next_is_digit() => {
                self.advance();
                let text = self.read_identifier();
                if text.is_empty() {
                    return Err(ClipperError::lexer(start_line, start_column, "empty directive"));
                }
                self.token(TokenKind::Directive, format!(".{}", text), start_line, start_column)
            }
            '(' => {
                self.advance();
                self.token(TokenKind::OpenParen, "(".to_string(), start_line, start_column)
            }
            ')' => {
                self.advance();
                self.token(TokenKind::CloseParen, ")".to_string(), start_line, start_column)
            }
            '=' => {
                self.advance();
                self.token(TokenKind::Equals, "=".to_string(), start_line, start_column)
            }
            '-' | '+' | '.' | '0'..='9' => {
                let mut text = self.read_number();
                if text == "-" || text == "+" || text == "." {
                    return Err(ClipperError::lexer(
                        start_line,
                        start_column,
                        format!("malformed number '{}'", text),
                    ));
                }
                text.push_str(&self.read_suffix());
                // Part names such as 1N4148 start like a number
                if matches!(self.chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
                    text.push_str(&self.read_identifier());
                    self.token(TokenKind::Identifier, text, start_line, start_column)
                } else {
                    self.token(TokenKind::Number, text, start_line, start_column)
                }
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                self.token(TokenKind::Identifier, text, start_line, start_column)
            }
            _ => {
                return Err(ClipperError::lexer(
                    start_line,
                    start_column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    fn token(&self, kind: TokenKind, text: String, line: usize, column: usize) -> Token {
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn next_is_digit(&self) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        matches!(ahead.next(), Some(c) if c.is_ascii_digit())
    }

    /// Consume the leading blanks and `+` of a continuation line, if the
    /// line that just started is one.
    fn continuation_follows(&mut self) -> bool {
        let mut ahead = self.chars.clone();
        let mut blanks = 0;
        while let Some(c) = ahead.next() {
            match c {
                ' ' | '\t' | '\r' => blanks += 1,
                '+' => {
                    for _ in 0..=blanks {
                        self.advance();
                    }
                    self.at_line_start = false;
                    return true;
                }
                _ => return false,
            }
        }
        false
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' || (ch == '*' && self.at_line_start) {
                // Skip comment until end of line
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        // Optional sign
        if let Some(&ch) = self.chars.peek() {
            if ch == '-' || ch == '+' {
                text.push(ch);
                self.advance();
            }
        }

        self.read_digits(&mut text);

        if let Some(&'.') = self.chars.peek() {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent, only when digits follow; otherwise the 'e' is not ours
        if let Some(&ch) = self.chars.peek() {
            if ch == 'e' || ch == 'E' {
                let mut ahead = self.chars.clone();
                ahead.next();
                let after = match ahead.next() {
                    Some(s @ ('-' | '+')) => ahead.next().map(|d| (Some(s), d)),
                    Some(d) => Some((None, d)),
                    None => None,
                };
                if let Some((sign, digit)) = after {
                    if digit.is_ascii_digit() {
                        text.push(ch);
                        self.advance();
                        if let Some(s) = sign {
                            text.push(s);
                            self.advance();
                        }
                        self.read_digits(&mut text);
                    }
                }
            }
        }

        text
    }

    /// Scale and unit letters directly after a number, e.g. `meg` or `nF`.
    fn read_suffix(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphabetic() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

/// Parse a number with an optional SPICE scale suffix and trailing unit.
///
/// Suffixes are case-insensitive: `m` is milli and `meg` is mega. Letters
/// after the scale (`4.7uF`, `10kOhm`) are ignored.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = numeric_prefix_len(text);
    if split == 0 {
        return None;
    }
    let (num_str, suffix) = text.split_at(split);
    let value = num_str.parse::<f64>().ok()?;

    if !suffix.chars().all(char::is_alphabetic) {
        return None;
    }

    let suffix = suffix.to_lowercase();
    let multiplier = if suffix.starts_with("meg") {
        1e6
    } else if suffix.starts_with("mil") {
        25.4e-6
    } else {
        match suffix.chars().next() {
            Some('f') => 1e-15,
            Some('p') => 1e-12,
            Some('n') => 1e-9,
            Some('u') | Some('µ') => 1e-6,
            Some('m') => 1e-3,
            Some('k') => 1e3,
            Some('g') => 1e9,
            Some('t') => 1e12,
            _ => 1.0,
        }
    };

    Some(value * multiplier)
}

/// Length in bytes of the leading floating-point literal of `text`.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        i += 1;
    }
    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}
