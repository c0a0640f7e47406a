//! # Introduction
//!
//! microc is the front end of a small C-like scripting language. It scans
//! source text into typed tokens and parses them into an AST; running,
//! type-checking and compiling that AST is left to the caller.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST
//! ```
//!
//! 1. [`parser::lexer`] — produces [`parser::token::Token`]s on demand, each a
//!    [`parser::token::TokenKind`] plus a [`parser::token::SemanticValue`].
//! 2. [`parser::parse`] — pulls tokens with one token of lookahead and builds a
//!    [`parser::ast::Program`], or fails with a [`parser::parse::ParseError`].
//! 3. [`logger`] — optional debug trace of tokens and grammar reductions.
//!
//! ## Language
//!
//! Types: `int`, `float`, `bool`, `void`, `string`.
//! Control flow: `if/else`, `while`, `for`, `return`, blocks.
//! Operators: arithmetic, relational, logical, `++`/`--`, compound assignment.
//! Built-in: `print expr;`.
//!
//! ```
//! use microc::parser::parse::parse_program;
//!
//! let program = parse_program("int x = 1 + 2 * 3; print x;").unwrap();
//! assert_eq!(program.nodes.len(), 2);
//! ```

pub mod logger;
pub mod parser;
