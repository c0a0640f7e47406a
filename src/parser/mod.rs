//! microc source code parser
//!
//! This module transforms microc source text into an Abstract Syntax Tree (AST):
//! - [`token`]: Token kinds, their fixed numeric codes and semantic values
//! - [`lexer`]: Tokenization (source text → tokens), pulled one token at a time
//! - [`parse`]: The [`Parser`](parse::Parser) struct, errors and entry points
//! - [`ast`]: AST node definitions
//!
//! Grammar rules are split across `declarations`, `statements` and
//! `expressions`, each extending the parser with its own `impl Parser` block.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
pub mod lexer;
pub mod parse;
pub mod token;

mod declarations;
mod expressions;
mod statements;
