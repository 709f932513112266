//! A recursive descent parser, using precedence climbing for binary
//! operators. Which characters are binary operators, and how tightly they
//! bind, is decided by a caller supplied [PrecedenceTable].

use std::fmt::{self, Display};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    ast::{Expr, FunctionDef, Prototype},
    lexer::Lexer,
    location::Location,
    result::Result,
    syntax_err,
    token::Token,
};

/// Maps operator characters to their binding strength. Higher binds tighter.
#[derive(Clone, Debug, Default)]
pub struct PrecedenceTable(FxHashMap<char, i32>);

impl PrecedenceTable {
    /// An empty table: nothing is a binary operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// `<` binds loosest, then `+` and `-`, then `*`.
    pub fn standard() -> Self {
        [('<', 10), ('+', 20), ('-', 20), ('*', 40)]
            .into_iter()
            .collect()
    }

    /// Make `op` a binary operator with precedence `prec`,
    /// replacing any previous precedence it had.
    pub fn insert(&mut self, op: char, prec: i32) -> &mut Self {
        self.0.insert(op, prec);
        self
    }

    /// Precedence of `op`, or -1 if it isn't a binary operator.
    pub fn get(&self, op: char) -> i32 {
        self.0.get(&op).copied().unwrap_or(-1)
    }
}

impl FromIterator<(char, i32)> for PrecedenceTable {
    fn from_iter<T: IntoIterator<Item = (char, i32)>>(iter: T) -> Self {
        PrecedenceTable(iter.into_iter().collect())
    }
}

#[derive(Debug, Error)]
pub enum ParseErr {
    #[error("unknown token `{0}` when expecting an expression")]
    UnexpectedToken(Token),
    #[error("expected `)`, found `{0}`")]
    ExpectedClosingParen(Token),
    #[error("expected `)` or `,` in argument list, found `{0}`")]
    ExpectedCommaOrParen(Token),
    #[error("expected function name in prototype, found `{0}`")]
    ExpectedFunctionName(Token),
    #[error("expected `(` in prototype, found `{0}`")]
    ExpectedOpenParen(Token),
    #[error("expected `)` in prototype, found `{0}`")]
    ExpectedCloseParen(Token),
}

/// One unit of input: what the user submits at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum TopLevel {
    Definition(FunctionDef),
    Extern(Prototype),
    /// A bare expression, wrapped in an anonymous nullary function.
    Expression(FunctionDef),
}

impl Display for TopLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopLevel::Definition(def) | TopLevel::Expression(def) => write!(f, "{def}"),
            TopLevel::Extern(proto) => write!(f, "extern {proto}"),
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    current_loc: Location,
    precedence: &'a PrecedenceTable,
}

impl<'a> Parser<'a> {
    /// Create a parser, reading the first token from `lexer`.
    pub fn new(lexer: Lexer<'a>, precedence: &'a PrecedenceTable) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::EndOfInput,
            current_loc: Location::Unknown,
            precedence,
        };
        parser.advance();
        parser
    }

    /// The token being looked at.
    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn current_loc(&self) -> Location {
        self.current_loc
    }

    /// Move on to the next token. Once the input is exhausted,
    /// the current token stays [Token::EndOfInput].
    pub fn advance(&mut self) {
        if let Some((token, loc)) = self.lexer.next_token() {
            log::debug!("{loc}: token `{token}`");
            self.current = token;
            self.current_loc = loc;
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current == Token::EndOfInput
    }

    fn is_symbol(&self, c: char) -> bool {
        self.current == Token::Symbol(c)
    }

    // The current token as a binary operator, with its precedence.
    // Symbols missing from the table get -1.
    fn current_bin_op(&self) -> Option<(char, i32)> {
        match self.current {
            Token::Symbol(c) => Some((c, self.precedence.get(c))),
            _ => None,
        }
    }

    /// Parse one top level unit, chosen by the current token.
    pub fn parse_top_level(&mut self) -> Result<TopLevel> {
        match self.current {
            Token::Def => self.parse_definition().map(TopLevel::Definition),
            Token::Extern => self.parse_extern().map(TopLevel::Extern),
            _ => self.parse_top_level_expr().map(TopLevel::Expression),
        }
    }

    /// definition ::= 'def' prototype expression
    pub fn parse_definition(&mut self) -> Result<FunctionDef> {
        // Eat `def`.
        self.advance();
        let prototype = self.parse_prototype()?;
        let body = self.parse_expression()?;
        Ok(FunctionDef { prototype, body })
    }

    /// external ::= 'extern' prototype
    pub fn parse_extern(&mut self) -> Result<Prototype> {
        // Eat `extern`.
        self.advance();
        self.parse_prototype()
    }

    /// toplevelexpr ::= expression
    pub fn parse_top_level_expr(&mut self) -> Result<FunctionDef> {
        let body = self.parse_expression()?;
        Ok(FunctionDef {
            prototype: Prototype::anonymous(),
            body,
        })
    }

    /// prototype ::= identifier '(' identifier* ')'
    pub fn parse_prototype(&mut self) -> Result<Prototype> {
        let Token::Identifier(name) = &self.current else {
            return syntax_err!(
                self.current_loc,
                ParseErr::ExpectedFunctionName(self.current.clone())
            );
        };
        let name = name.clone();
        self.advance();

        if !self.is_symbol('(') {
            return syntax_err!(
                self.current_loc,
                ParseErr::ExpectedOpenParen(self.current.clone())
            );
        }
        self.advance();

        let mut params = vec![];
        while let Token::Identifier(param) = &self.current {
            params.push(param.clone());
            self.advance();
        }

        if !self.is_symbol(')') {
            return syntax_err!(
                self.current_loc,
                ParseErr::ExpectedCloseParen(self.current.clone())
            );
        }
        self.advance();

        Ok(Prototype { name, params })
    }

    /// expression ::= primary binoprhs
    pub fn parse_expression(&mut self) -> Result<Expr> {
        let lhs = self.parse_primary()?;
        self.parse_bin_op_rhs(lhs, 0)
    }

    /// primary ::= identifierexpr | numberexpr | parenexpr
    fn parse_primary(&mut self) -> Result<Expr> {
        match &self.current {
            Token::Identifier(_) => self.parse_identifier_expr(),
            Token::Number(n) => {
                let n = *n;
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Symbol('(') => self.parse_paren_expr(),
            token => syntax_err!(self.current_loc, ParseErr::UnexpectedToken(token.clone())),
        }
    }

    /// identifierexpr ::= identifier | identifier '(' (expression (',' expression)*)? ')'
    fn parse_identifier_expr(&mut self) -> Result<Expr> {
        let name = match &self.current {
            Token::Identifier(name) => name.clone(),
            token => {
                return syntax_err!(self.current_loc, ParseErr::UnexpectedToken(token.clone()))
            }
        };
        self.advance();

        if !self.is_symbol('(') {
            return Ok(Expr::Variable(name));
        }
        // Eat `(`.
        self.advance();

        let mut args = vec![];
        if !self.is_symbol(')') {
            loop {
                args.push(self.parse_expression()?);
                if self.is_symbol(')') {
                    break;
                }
                if !self.is_symbol(',') {
                    return syntax_err!(
                        self.current_loc,
                        ParseErr::ExpectedCommaOrParen(self.current.clone())
                    );
                }
                self.advance();
            }
        }
        // Eat `)`.
        self.advance();

        Ok(Expr::Call { callee: name, args })
    }

    /// parenexpr ::= '(' expression ')'
    fn parse_paren_expr(&mut self) -> Result<Expr> {
        // Eat `(`.
        self.advance();
        let inner = self.parse_expression()?;
        if !self.is_symbol(')') {
            return syntax_err!(
                self.current_loc,
                ParseErr::ExpectedClosingParen(self.current.clone())
            );
        }
        self.advance();
        Ok(inner)
    }

    /// binoprhs ::= (binop primary)*
    ///
    /// Keeps folding operators into `lhs` as long as they bind at least as
    /// tightly as `min_prec`. When the operator after the right operand binds
    /// tighter than the current one, that operand is first extended by a
    /// recursive call, so equal precedences associate to the left.
    fn parse_bin_op_rhs(&mut self, mut lhs: Expr, min_prec: i32) -> Result<Expr> {
        loop {
            let Some((op, prec)) = self
                .current_bin_op()
                .filter(|&(_, prec)| prec >= min_prec)
            else {
                return Ok(lhs);
            };
            self.advance();

            let mut rhs = self.parse_primary()?;
            let next_prec = self.current_bin_op().map_or(-1, |(_, prec)| prec);
            if prec < next_prec {
                rhs = self.parse_bin_op_rhs(rhs, prec + 1)?;
            }

            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::tokenize, result::ErrorKind};

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.into()))
    }

    fn bin(op: char, lhs: Box<Expr>, rhs: Box<Expr>) -> Box<Expr> {
        Box::new(Expr::Binary { op, lhs, rhs })
    }

    fn parse_expr(text: &str, table: &PrecedenceTable) -> Result<Expr> {
        Parser::new(tokenize(text), table).parse_expression()
    }

    fn parse_err(text: &str) -> ParseErr {
        let table = PrecedenceTable::standard();
        let err = Parser::new(tokenize(text), &table)
            .parse_top_level()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        *err.err.downcast::<ParseErr>().unwrap()
    }

    #[test]
    fn precedence_table() {
        let mut table = PrecedenceTable::new();
        assert_eq!(table.get('+'), -1);
        table.insert('+', 5).insert('/', 50);
        assert_eq!(table.get('+'), 5);
        assert_eq!(table.get('/'), 50);
        assert_eq!(PrecedenceTable::standard().get('<'), 10);
        assert_eq!(PrecedenceTable::standard().get('('), -1);
    }

    #[test]
    fn mul_binds_tighter() {
        let table = PrecedenceTable::standard();
        assert_eq!(
            parse_expr("1+2*3", &table).unwrap(),
            *bin('+', num(1.0), bin('*', num(2.0), num(3.0)))
        );
        assert_eq!(
            parse_expr("1*2+3", &table).unwrap(),
            *bin('+', bin('*', num(1.0), num(2.0)), num(3.0))
        );
    }

    #[test]
    fn parens_group() {
        let table = PrecedenceTable::standard();
        assert_eq!(
            parse_expr("(1+2)*3", &table).unwrap(),
            *bin('*', bin('+', num(1.0), num(2.0)), num(3.0))
        );
    }

    #[test]
    fn left_associative() {
        let table = PrecedenceTable::standard();
        assert_eq!(
            parse_expr("1-2-3", &table).unwrap(),
            *bin('-', bin('-', num(1.0), num(2.0)), num(3.0))
        );
        assert_eq!(
            parse_expr("a-b+c", &table).unwrap(),
            *bin('+', bin('-', var("a"), var("b")), var("c"))
        );
    }

    #[test]
    fn three_levels() {
        let table = PrecedenceTable::standard();
        assert_eq!(
            parse_expr("a < b * c + d", &table).unwrap(),
            *bin(
                '<',
                var("a"),
                bin('+', bin('*', var("b"), var("c")), var("d"))
            )
        );
        assert_eq!(
            parse_expr("a + b * c < d", &table).unwrap(),
            *bin(
                '<',
                bin('+', var("a"), bin('*', var("b"), var("c"))),
                var("d")
            )
        );
    }

    #[test]
    fn caller_supplied_table() {
        // With `+` tighter than `*`, the grouping flips.
        let table: PrecedenceTable = [('+', 40), ('*', 20)].into_iter().collect();
        assert_eq!(
            parse_expr("1+2*3", &table).unwrap(),
            *bin('*', bin('+', num(1.0), num(2.0)), num(3.0))
        );

        // Operators missing from the table end the expression.
        let table = PrecedenceTable::new();
        let mut parser = Parser::new(tokenize("1+2"), &table);
        assert_eq!(parser.parse_expression().unwrap(), Expr::Number(1.0));
        assert_eq!(parser.current(), &Token::Symbol('+'));
    }

    #[test]
    fn expression_ends_at_non_operator() {
        let table = PrecedenceTable::standard();
        let mut parser = Parser::new(tokenize("1*2 $ 3"), &table);
        assert_eq!(
            parser.parse_expression().unwrap(),
            *bin('*', num(1.0), num(2.0))
        );
        assert_eq!(parser.current(), &Token::Symbol('$'));

        let mut parser = Parser::new(tokenize("a+b*c d"), &table);
        assert_eq!(
            parser.parse_expression().unwrap(),
            *bin('+', var("a"), bin('*', var("b"), var("c")))
        );
        assert_eq!(parser.current(), &Token::Identifier("d".into()));
        assert_eq!(parser.current_loc(), Location::new(1, 7));
    }

    #[test]
    fn calls() {
        let table = PrecedenceTable::standard();
        assert_eq!(
            parse_expr("foo(1, x+2, bar())", &table).unwrap(),
            Expr::Call {
                callee: "foo".into(),
                args: vec![
                    Expr::Number(1.0),
                    *bin('+', var("x"), num(2.0)),
                    Expr::Call {
                        callee: "bar".into(),
                        args: vec![],
                    },
                ],
            }
        );
    }

    #[test]
    fn top_level_units() {
        let table = PrecedenceTable::standard();
        let mut parser = Parser::new(tokenize("def foo(a b) a*b extern sin(x) foo(1, 2)"), &table);
        assert_eq!(
            parser.parse_top_level().unwrap(),
            TopLevel::Definition(FunctionDef {
                prototype: Prototype {
                    name: "foo".into(),
                    params: vec!["a".into(), "b".into()],
                },
                body: *bin('*', var("a"), var("b")),
            })
        );
        assert_eq!(
            parser.parse_top_level().unwrap(),
            TopLevel::Extern(Prototype {
                name: "sin".into(),
                params: vec!["x".into()],
            })
        );
        let TopLevel::Expression(def) = parser.parse_top_level().unwrap() else {
            panic!("expected a top-level expression");
        };
        assert_eq!(def.prototype, Prototype::anonymous());
        assert!(parser.is_at_end());
    }

    #[test]
    fn errors() {
        assert!(matches!(parse_err(")"), ParseErr::UnexpectedToken(Token::Symbol(')'))));
        assert!(matches!(parse_err("(1+2"), ParseErr::ExpectedClosingParen(Token::EndOfInput)));
        assert!(matches!(
            parse_err("foo(1 2)"),
            ParseErr::ExpectedCommaOrParen(Token::Number(_))
        ));
        assert!(matches!(
            parse_err("def 1(x) x"),
            ParseErr::ExpectedFunctionName(Token::Number(_))
        ));
        assert!(matches!(
            parse_err("extern foo x"),
            ParseErr::ExpectedOpenParen(Token::Identifier(_))
        ));
        assert!(matches!(
            parse_err("def foo(a, b) a"),
            ParseErr::ExpectedCloseParen(Token::Symbol(','))
        ));
        assert!(matches!(parse_err(""), ParseErr::UnexpectedToken(Token::EndOfInput)));
    }

    #[test]
    fn error_locations() {
        let table = PrecedenceTable::standard();
        let err = Parser::new(tokenize("1 +\n  )"), &table)
            .parse_expression()
            .unwrap_err();
        assert_eq!(err.loc, Location::new(2, 3));
        assert_eq!(
            err.to_string(),
            "syntax error: unknown token `)` when expecting an expression"
        );
    }

    #[test]
    fn advance_past_end_is_harmless() {
        let table = PrecedenceTable::standard();
        let mut parser = Parser::new(tokenize("x"), &table);
        parser.advance();
        assert!(parser.is_at_end());
        parser.advance();
        assert!(parser.is_at_end());
    }
}
