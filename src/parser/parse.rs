//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: top-level items, functions, parameters, variable declarations
//! - `statements`: Parsing statements (if, while, for, print, etc.)
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! # Token flow
//!
//! The parser pulls tokens from its [`Lexer`] one at a time and keeps exactly
//! one token of lookahead in `current`. The lookahead is filled in the
//! constructor, so it is always written before it is read. Consumed tokens
//! are handed out by value and their text payloads move into the AST.

use crate::parser::ast::*;
use crate::parser::lexer::{ErrorRecovery, LexError, Lexer, LexerConfig};
use crate::parser::token::{Token, TokenKind};
use std::fmt;

/// Grammar error: the lookahead token cannot continue the current rule
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub found: TokenKind,
    /// Text of the offending token
    pub lexeme: String,
    pub location: SourceLocation,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

/// Parser error type
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// One error in halt mode; every recorded error in skip-and-continue mode
    Lexical(Vec<LexError>),
    Syntax(SyntaxError),
}

impl ParseError {
    /// Location of the first error
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Lexical(errors) => errors
                .first()
                .map(|err| err.location)
                .unwrap_or_default(),
            ParseError::Syntax(err) => err.location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lexical(errors) => {
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ParseError::Syntax(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lexical(vec![err])
    }
}

impl From<SyntaxError> for ParseError {
    fn from(err: SyntaxError) -> Self {
        ParseError::Syntax(err)
    }
}

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub recovery: ErrorRecovery,
}

/// Deepest statement and expression nesting the parser accepts. Each level
/// costs several stack frames, so this keeps a hostile input from exhausting
/// the stack of a default 2 MiB thread in an unoptimised build.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Recursive descent parser for microc
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) current: Token,
    pub(crate) previous_location: SourceLocation,
    /// Return type of the function whose body is being parsed
    pub(crate) enclosing_return: Option<BaseType>,
    /// Statements and parenthesised or prefixed expressions currently open
    pub(crate) depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: &str, options: ParseOptions) -> Result<Self, ParseError> {
        let mut lexer = Lexer::with_config(
            source,
            LexerConfig {
                recovery: options.recovery,
            },
        );
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous_location: SourceLocation::new(1, 1),
            enclosing_return: None,
            depth: 0,
        })
    }

    /// Parse the entire program (functions, prototypes and statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        match self.parse_items() {
            Ok(program) => {
                let diagnostics = self.lexer.take_diagnostics();
                if diagnostics.is_empty() {
                    Ok(program)
                } else {
                    Err(ParseError::Lexical(diagnostics))
                }
            }
            // Lexical errors seen so far are the likelier cause of a
            // syntax error in skip-and-continue mode.
            Err(err) => {
                let diagnostics = self.lexer.take_diagnostics();
                if diagnostics.is_empty() {
                    Err(err)
                } else {
                    Err(ParseError::Lexical(diagnostics))
                }
            }
        }
    }

    fn parse_items(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let item = self.parse_top_level_item()?;
            program.nodes.push(item);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn is_type_keyword(&self) -> bool {
        self.current.kind().is_type_name()
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind() == kind
    }

    /// Consume the lookahead and pull the next token from the lexer
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        let next = if self.is_at_end() {
            Token::simple(TokenKind::Eof, self.current.location())
        } else {
            self.lexer.next_token()?
        };
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous_location = consumed.location();
        Ok(consumed)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.kind() == TokenKind::Eof
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.current
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous_location
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current.location()
    }

    /// Run one recursive grammar rule a level deeper, failing at the lookahead
    /// once [`MAX_NESTING_DEPTH`] levels are open.
    pub(crate) fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_at_current(format!(
                "nesting too deep (limit {})",
                MAX_NESTING_DEPTH
            )));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Syntax error pointing at the lookahead token
    pub(crate) fn error_at_current(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax(SyntaxError {
            message: message.into(),
            found: self.current.kind(),
            lexeme: self.current.lexeme().to_string(),
            location: self.current_location(),
        })
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        message: &str,
    ) -> Result<Token, ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.error_at_current(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect_token(TokenKind::LParen, &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect_token(TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect_token(TokenKind::RBrace, &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<Token, ParseError> {
        self.expect_token(TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check(TokenKind::Id) {
            let token = self.advance()?;
            Ok(token.into_text().unwrap_or_default())
        } else {
            Err(self.error_at_current(format!("Expected identifier, found {}", self.peek())))
        }
    }
}

/// Parse a complete source text with default options.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_function() {
        let source = "int main() { return 0; }";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.nodes.len(), 1);
        match &program.nodes[0] {
            AstNode::FunctionDef {
                name,
                params,
                return_type,
                body,
                ..
            } => {
                assert_eq!(name, "main");
                assert_eq!(params.len(), 0);
                assert_eq!(*return_type, BaseType::Int);
                assert_eq!(body.len(), 1);
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_parse_top_level_statements() {
        let program = parse_program("int x = 1; x += 2; print x;").unwrap();
        assert_eq!(program.nodes.len(), 3);
        assert!(matches!(program.nodes[2], AstNode::Print { .. }));
    }

    #[test]
    fn test_empty_source() {
        let program = parse_program("  // nothing\n").unwrap();
        assert!(program.nodes.is_empty());
    }

    #[test]
    fn test_syntax_error_reports_token() {
        let err = parse_program("int x = ;").unwrap_err();
        match err {
            ParseError::Syntax(err) => {
                assert_eq!(err.found, TokenKind::Semicolon);
                assert_eq!(err.location, SourceLocation::new(1, 9));
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_lexeme_is_source_text() {
        let cases = [
            ("print print;", TokenKind::Print, "print"),
            ("x = 1 ++ 2 = ;", TokenKind::IncOp, "++"),
            ("x = ;", TokenKind::Semicolon, ";"),
            ("print 1e3 2;", TokenKind::IConst, "2"),
            ("x = 1e3 y;", TokenKind::Id, "y"),
            ("print 1 1e3;", TokenKind::FConst, "1e3"),
            ("print 1 \"a\\tb\";", TokenKind::SConst, "\"a\\tb\""),
            ("{ print 1;", TokenKind::Eof, ""),
        ];

        for (source, kind, lexeme) in cases {
            match parse_program(source) {
                Err(ParseError::Syntax(err)) => {
                    assert_eq!(err.found, kind, "{}", source);
                    assert_eq!(err.lexeme, lexeme, "{}", source);
                }
                other => panic!("Expected syntax error for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_nesting_limit() {
        let depth = 10_000;
        let sources = [
            format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth)),
            format!("{}{}", "{".repeat(depth), "}".repeat(depth)),
            format!("x = {}1;", "-".repeat(depth)),
            format!("x = {}1;", "!".repeat(depth)),
            format!("{}1;", "a = ".repeat(depth)),
            format!("{}print 1;", "if (x) ".repeat(depth)),
            format!("{}print 1;", "while (x) ".repeat(depth)),
        ];

        for source in &sources {
            match parse_program(source) {
                Err(ParseError::Syntax(err)) => {
                    assert!(err.message.starts_with("nesting too deep"), "{}", err);
                }
                other => panic!("Expected nesting error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let depth = 50;
        let sources = [
            format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth)),
            format!("{}{}", "{".repeat(depth), "}".repeat(depth)),
            format!("x = {}1;", "-".repeat(depth)),
            format!("{}1;", "a = ".repeat(depth)),
        ];

        for source in &sources {
            assert!(parse_program(source).is_ok(), "{}", source);
        }
    }

    #[test]
    fn test_lexical_error_in_first_token() {
        let err = Parser::new("@").err().unwrap();
        assert!(matches!(err, ParseError::Lexical(ref errors) if errors.len() == 1));
        assert_eq!(err.location(), SourceLocation::new(1, 1));
    }

    #[test]
    fn test_skip_mode_reports_every_lexical_error() {
        let options = ParseOptions {
            recovery: ErrorRecovery::SkipAndContinue,
        };
        let mut parser = Parser::with_options("int a = 1 @ ;\nint b = 2; #\n", options).unwrap();
        match parser.parse_program() {
            Err(ParseError::Lexical(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].lexeme, "@");
                assert_eq!(errors[1].location, SourceLocation::new(2, 12));
            }
            other => panic!("Expected lexical errors, got {:?}", other),
        }
    }
}
