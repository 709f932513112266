#![forbid(unsafe_code)]
//! A front end for a small, Kaleidoscope-like expression language.
//!
//! Program text is [lexed](lexer) into [tokens](token), [parsed](parser)
//! into an [AST](ast) with a caller supplied operator precedence table, and
//! [generated](codegen) into an SSA [module](module) of [functions](function).
//! The [driver] runs this pipeline one top-level unit at a time.

pub mod ast;
pub mod basic_block;
pub mod codegen;
pub mod common_traits;
pub mod context;
pub mod driver;
pub mod function;
pub mod irbuild;
pub mod lexer;
pub mod location;
pub mod module;
pub mod operation;
pub mod parser;
pub mod printable;
pub mod result;
pub mod r#type;
pub mod token;
pub mod value;
