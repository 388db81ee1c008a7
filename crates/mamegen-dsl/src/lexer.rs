use mamegen_core::{DslError, Result};

use crate::token::{Token, TokenKind};

/// Tokenise DSL source into a flat stream ending in `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(ch) = self.peek() {
            let (line, column) = (self.line, self.column);
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, line, column);
                }
                '{' => {
                    self.bump();
                    self.push(TokenKind::LBrace, line, column);
                }
                '}' => {
                    self.bump();
                    self.push(TokenKind::RBrace, line, column);
                }
                '[' => {
                    self.bump();
                    self.push(TokenKind::LBracket, line, column);
                }
                ']' => {
                    self.bump();
                    self.push(TokenKind::RBracket, line, column);
                }
                ',' => {
                    self.bump();
                    self.push(TokenKind::Comma, line, column);
                }
                '"' | '\'' => self.string(ch)?,
                '.' => {
                    if self.peek_at(1) == Some('.') {
                        self.bump();
                        self.bump();
                        self.push(TokenKind::DotDot, line, column);
                    } else {
                        self.bump();
                        self.push(TokenKind::Symbol('.'), line, column);
                    }
                }
                '-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.number()?;
                }
                c if c.is_ascii_digit() => self.number()?,
                c if c.is_ascii_alphabetic() || c == '_' => self.ident(),
                other => {
                    self.bump();
                    self.push(TokenKind::Symbol(other), line, column);
                }
            }
        }
        self.push(TokenKind::Eof, self.line, self.column);
        Ok(self.tokens)
    }

    fn string(&mut self, quote: char) -> Result<()> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\n') | None => {
                    return Err(DslError::syntax(line, column, "unterminated string literal"));
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        self.push(TokenKind::Str(value), line, column);
        Ok(())
    }

    fn number(&mut self) -> Result<()> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        // A '.' only extends the literal when a digit follows; '..' stays
        // a range token.
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
        }
        let kind = if is_float {
            let value = text
                .parse::<f64>()
                .map_err(|_| DslError::syntax(line, column, format!("invalid number: {text}")))?;
            TokenKind::Float(value)
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| DslError::syntax(line, column, format!("invalid integer: {text}")))?;
            TokenKind::Int(value)
        };
        self.push(kind, line, column);
        Ok(())
    }

    fn ident(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Ident(name), line, column);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, line, column));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn range_dots_do_not_extend_integers() {
        assert_eq!(
            kinds("1..10"),
            vec![
                TokenKind::Int(1),
                TokenKind::DotDot,
                TokenKind::Int(10),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn floats_and_negatives() {
        assert_eq!(
            kinds("-1.5 2.0 -3"),
            vec![
                TokenKind::Float(-1.5),
                TokenKind::Float(2.0),
                TokenKind::Int(-3),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn strings_accept_both_quote_styles() {
        assert_eq!(
            kinds("\"a b\" 'c'"),
            vec![
                TokenKind::Str("a b".to_string()),
                TokenKind::Str("c".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let err = tokenize("\"oops").unwrap_err();
        assert!(matches!(err, DslError::Syntax { line: 1, .. }));
    }

    #[test]
    fn newlines_are_significant_and_positions_track_lines() {
        let tokens = tokenize("a\nb").expect("tokenize");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].column, 1);
    }

    #[test]
    fn colon_and_equals_lex_as_symbols() {
        assert_eq!(
            kinds(": ="),
            vec![
                TokenKind::Symbol(':'),
                TokenKind::Symbol('='),
                TokenKind::Eof
            ]
        );
    }
}
