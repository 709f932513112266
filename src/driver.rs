//! The top level loop: parse and generate one unit at a time,
//! recovering from errors so that one bad unit doesn't end the session.

use crate::{
    ast::{FunctionDef, Prototype},
    codegen::CodeGen,
    context::Ptr,
    function::Function,
    lexer::tokenize,
    location::{Located, Location},
    parser::{Parser, PrecedenceTable},
    result::Error,
    token::Token,
};

/// What became of one top-level unit.
#[derive(Debug)]
pub enum Outcome {
    Definition {
        ast: FunctionDef,
        func: Ptr<Function>,
    },
    Extern {
        ast: Prototype,
        func: Ptr<Function>,
    },
    Expression {
        ast: FunctionDef,
        func: Ptr<Function>,
    },
    /// The unit failed to parse or to generate. The module is unchanged.
    Failed(Error),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// The generated (or found) function, unless this is a failure.
    pub fn function(&self) -> Option<Ptr<Function>> {
        match self {
            Outcome::Definition { func, .. }
            | Outcome::Extern { func, .. }
            | Outcome::Expression { func, .. } => Some(*func),
            Outcome::Failed(_) => None,
        }
    }
}

/// A compilation session. Code generated by every call to [Driver::run]
/// accumulates in the same module.
pub struct Driver {
    precedence: PrecedenceTable,
    codegen: CodeGen,
}

impl Driver {
    pub fn new(precedence: PrecedenceTable, module_name: &str) -> Self {
        Self {
            precedence,
            codegen: CodeGen::new(module_name),
        }
    }

    pub fn codegen(&self) -> &CodeGen {
        &self.codegen
    }

    pub fn precedence(&self) -> &PrecedenceTable {
        &self.precedence
    }

    /// Handle every top-level unit in `text`, in order.
    pub fn run(&mut self, text: &str) -> Vec<Outcome> {
        let Driver {
            precedence,
            codegen,
        } = self;
        let mut parser = Parser::new(tokenize(text), precedence);
        let mut outcomes = vec![];

        loop {
            let outcome = match parser.current() {
                Token::EndOfInput => break,
                Token::Symbol(';') => {
                    // Ignore top-level semicolons.
                    parser.advance();
                    continue;
                }
                Token::Def => handle_definition(&mut parser, codegen),
                Token::Extern => handle_extern(&mut parser, codegen),
                _ => handle_top_level_expression(&mut parser, codegen),
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

// Skip the token a parse error was reported at, so that the next attempt
// starts somewhere new.
fn recover(parser: &mut Parser<'_>, err: Error) -> Outcome {
    log::warn!("Skipping token `{}` after parse error", parser.current());
    parser.advance();
    Outcome::Failed(err)
}

// Codegen doesn't know where a unit came from. Point its errors at the
// start of the unit.
fn codegen_failed(mut err: Error, unit_loc: Location) -> Outcome {
    if !err.loc().is_known() {
        err.set_loc(unit_loc);
    }
    Outcome::Failed(err)
}

/// Parse and generate a `def`.
pub fn handle_definition(parser: &mut Parser<'_>, codegen: &mut CodeGen) -> Outcome {
    let loc = parser.current_loc();
    let ast = match parser.parse_definition() {
        Ok(ast) => ast,
        Err(err) => return recover(parser, err),
    };
    log::info!("Read function definition: {ast}");
    match codegen.gen_function(&ast) {
        Ok(func) => Outcome::Definition { ast, func },
        Err(err) => codegen_failed(err, loc),
    }
}

/// Parse and generate an `extern`.
pub fn handle_extern(parser: &mut Parser<'_>, codegen: &mut CodeGen) -> Outcome {
    let loc = parser.current_loc();
    let ast = match parser.parse_extern() {
        Ok(ast) => ast,
        Err(err) => return recover(parser, err),
    };
    log::info!("Read extern: {ast}");
    match codegen.gen_prototype(&ast) {
        Ok(func) => Outcome::Extern { ast, func },
        Err(err) => codegen_failed(err, loc),
    }
}

/// Parse and generate a bare expression, as an anonymous function.
pub fn handle_top_level_expression(parser: &mut Parser<'_>, codegen: &mut CodeGen) -> Outcome {
    let loc = parser.current_loc();
    let ast = match parser.parse_top_level_expr() {
        Ok(ast) => ast,
        Err(err) => return recover(parser, err),
    };
    log::info!("Read top-level expression: {ast}");
    match codegen.gen_function(&ast) {
        Ok(func) => Outcome::Expression { ast, func },
        Err(err) => codegen_failed(err, loc),
    }
}
