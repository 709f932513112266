//! Turns program text into [Token]s.
//!
//! The [Lexer] is a lazy, finite cursor over the text: it yields tokens on
//! demand, ends with exactly one [Token::EndOfInput], and never fails.
//! Characters that don't start a comment, number or identifier become
//! single character [Token::Symbol]s, leaving it to the parser to judge them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{location::Location, token::Token};

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[^\n]*").expect("bad comment regex"));
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?").expect("bad number regex"));
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*").expect("bad identifier regex"));

const KW_DEF: &str = "def";
const KW_EXTERN: &str = "extern";

pub struct Lexer<'a> {
    text: &'a str,
    // Byte offset of the cursor in `text`.
    pos: usize,
    line: usize,
    col: usize,
    done: bool,
}

/// Lex `text` from its start.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer::new(text)
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            col: 1,
            done: false,
        }
    }

    /// Location of the cursor.
    pub fn location(&self) -> Location {
        Location::new(self.line, self.col)
    }

    /// Get the next token and where it starts,
    /// or [None] once [Token::EndOfInput] has been returned.
    pub fn next_token(&mut self) -> Option<(Token, Location)> {
        if self.done {
            return None;
        }
        loop {
            self.skip_whitespace();
            let loc = self.location();
            let rest = &self.text[self.pos..];
            let Some(c) = rest.chars().next() else {
                self.done = true;
                return Some((Token::EndOfInput, loc));
            };

            if let Some(m) = COMMENT.find(rest) {
                self.bump(m.len());
                continue;
            }

            if let Some(m) = NUMBER.find(rest) {
                let value: f64 = m
                    .as_str()
                    .parse()
                    .expect("number pattern only admits float literals");
                // Literals too large for an f64 saturate instead of becoming inf.
                let value = if value.is_finite() { value } else { f64::MAX };
                self.bump(m.len());
                return Some((Token::Number(value), loc));
            }

            if let Some(m) = IDENTIFIER.find(rest) {
                let token = match m.as_str() {
                    KW_DEF => Token::Def,
                    KW_EXTERN => Token::Extern,
                    ident => Token::Identifier(ident.to_string()),
                };
                self.bump(m.len());
                return Some((token, loc));
            }

            self.bump(c.len_utf8());
            return Some((Token::Symbol(c), loc));
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        let ws = rest.len() - rest.trim_start().len();
        self.bump(ws);
    }

    // Move the cursor `len` bytes ahead, keeping line and column up to date.
    fn bump(&mut self, len: usize) {
        for c in self.text[self.pos..self.pos + len].chars() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos += len;
    }
}

impl Iterator for Lexer<'_> {
    type Item = (Token, Location);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        tokenize(text).map(|(tok, _)| tok).collect()
    }

    #[test]
    fn definition() {
        assert_eq!(
            tokens("def foo(x y) x+y*2.5"),
            vec![
                Token::Def,
                Token::Identifier("foo".into()),
                Token::Symbol('('),
                Token::Identifier("x".into()),
                Token::Identifier("y".into()),
                Token::Symbol(')'),
                Token::Identifier("x".into()),
                Token::Symbol('+'),
                Token::Identifier("y".into()),
                Token::Symbol('*'),
                Token::Number(2.5),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn long_identifiers_and_keywords() {
        assert_eq!(
            tokens("extern definitely extern2 def x123abc"),
            vec![
                Token::Extern,
                Token::Identifier("definitely".into()),
                Token::Identifier("extern2".into()),
                Token::Def,
                Token::Identifier("x123abc".into()),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("# a comment ( , def\n  42 # trailing"),
            vec![Token::Number(42.0), Token::EndOfInput]
        );
    }

    #[test]
    fn unknown_characters_are_symbols() {
        assert_eq!(
            tokens("$ 1.5.2 é"),
            vec![
                Token::Symbol('$'),
                Token::Number(1.5),
                Token::Symbol('.'),
                Token::Number(2.0),
                Token::Symbol('é'),
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn huge_numbers_saturate() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(
            tokens(&format!("{huge} {huge}.5")),
            vec![
                Token::Number(f64::MAX),
                Token::Number(f64::MAX),
                Token::EndOfInput
            ]
        );
    }

    #[test]
    fn exactly_one_end_of_input() {
        let mut lexer = tokenize("   \n\t ");
        assert_eq!(lexer.next().map(|(tok, _)| tok), Some(Token::EndOfInput));
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next(), None);
        assert_eq!(tokens(""), vec![Token::EndOfInput]);
    }

    #[test]
    fn locations() {
        let locs: Vec<_> = tokenize("a +\n  12 # c\nb").map(|(_, loc)| loc).collect();
        assert_eq!(
            locs,
            vec![
                Location::new(1, 1),
                Location::new(1, 3),
                Location::new(2, 3),
                Location::new(3, 1),
                Location::new(3, 2),
            ]
        );
    }

    #[test]
    fn fresh_lexer_restarts() {
        let text = "foo(1, 2)";
        assert_eq!(tokens(text), tokens(text));
    }
}
