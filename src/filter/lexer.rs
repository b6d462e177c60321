use super::error::{ParseError, ParseErrorKind};

/// Lexical category of a filter token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input.
    End,
    /// `||`
    Or,
    /// `&&`
    And,
    /// `!`
    Not,
    /// `(`
    Left,
    /// `)`
    Right,
    /// `==`, `!=`, `<`, `<=`, `>`, `>=` or the reserved `!in`.
    Operator,
    /// Attribute name or literal: a maximal run of `[A-Za-z0-9_.-]`.
    Operand,
}

/// A token borrowed from the filter string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character.
    pub position: usize,
}

/// Single-pass lexer with one token of lookahead.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Token<'a>>,
}

fn is_operand_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-')
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// Byte offset just past the last consumed token.
    pub fn position(&self) -> usize {
        self.peeked.map_or(self.pos, |token| token.position)
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    pub fn peek_token(&mut self) -> Result<Token<'a>, ParseError> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.scan()?;
        self.peeked = Some(token);
        Ok(token)
    }

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.input.as_bytes().get(pos).copied()
    }

    fn token(&mut self, kind: TokenKind, start: usize, len: usize) -> Token<'a> {
        self.pos = start + len;
        Token {
            kind,
            text: &self.input[start..start + len],
            position: start,
        }
    }

    fn scan(&mut self) -> Result<Token<'a>, ParseError> {
        while self.byte_at(self.pos).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let start = self.pos;
        let Some(b) = self.byte_at(start) else {
            return Ok(self.token(TokenKind::End, start, 0));
        };
        let next = self.byte_at(start + 1);

        let token = match b {
            b'|' => {
                if next != Some(b'|') {
                    return Err(ParseError::new(
                        ParseErrorKind::Lexical,
                        start,
                        "invalid token starting with |; did you mean ||?",
                    ));
                }
                self.token(TokenKind::Or, start, 2)
            }
            b'&' => {
                if next != Some(b'&') {
                    return Err(ParseError::new(
                        ParseErrorKind::Lexical,
                        start,
                        "invalid token starting with &; did you mean &&?",
                    ));
                }
                self.token(TokenKind::And, start, 2)
            }
            b'!' => {
                let rest = &self.input.as_bytes()[start + 1..];
                if next == Some(b'=') {
                    self.token(TokenKind::Operator, start, 2)
                } else if rest.starts_with(b"in")
                    && !self.byte_at(start + 3).is_some_and(is_operand_byte)
                {
                    self.token(TokenKind::Operator, start, 3)
                } else {
                    self.token(TokenKind::Not, start, 1)
                }
            }
            b'(' => self.token(TokenKind::Left, start, 1),
            b')' => self.token(TokenKind::Right, start, 1),
            b'=' => {
                if next != Some(b'=') {
                    return Err(ParseError::new(
                        ParseErrorKind::Lexical,
                        start,
                        "invalid token starting with =; did you mean ==?",
                    ));
                }
                self.token(TokenKind::Operator, start, 2)
            }
            b'<' | b'>' => {
                let len = if next == Some(b'=') { 2 } else { 1 };
                self.token(TokenKind::Operator, start, len)
            }
            b if is_operand_byte(b) => {
                let len = self.input.as_bytes()[start..]
                    .iter()
                    .take_while(|b| is_operand_byte(**b))
                    .count();
                self.token(TokenKind::Operand, start, len)
            }
            _ => {
                let c = self.input[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(
                    ParseErrorKind::Lexical,
                    start,
                    format!("unexpected character '{c}'; operands must match [A-Za-z0-9_.-]+"),
                ));
            }
        };
        Ok(token)
    }
}
