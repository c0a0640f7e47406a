//! Statement parsing implementation
//!
//! This module handles parsing of all microc statement types:
//!
//! - Variable declarations: `int x = 42;`
//! - Control flow: `if`/`else`, `while`, `for`
//! - `print expr;` and `return [expr];`
//! - Compound statements: `{ ... }`
//! - Expression statements and the empty statement `;`
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | print_stmt | if_stmt | while_stmt | for_stmt
//!             | return_stmt | block | expr_stmt | ";"
//! ```
//!
//! `else` always attaches to the nearest `if` that has none: the `if` parser
//! takes an `else` as soon as it sees one, so an inner `if` claims it before
//! control returns to an outer one.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser, SyntaxError};
use crate::parser::token::TokenKind;
use crate::trace_log;

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement one nesting level deeper
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_single_statement)
    }

    fn parse_single_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek().kind() {
            TokenKind::Print => {
                self.advance()?;
                return self.parse_print_statement();
            }
            TokenKind::Return => {
                self.advance()?;
                return self.parse_return_statement();
            }
            TokenKind::If => {
                self.advance()?;
                return self.parse_if_statement();
            }
            TokenKind::While => {
                self.advance()?;
                return self.parse_while_statement();
            }
            TokenKind::For => {
                self.advance()?;
                return self.parse_for_statement();
            }
            TokenKind::LBrace => {
                self.advance()?;
                let statements = self.parse_block_statements()?;
                self.expect_rbrace("after block")?;
                trace_log!("reduce block at {}", loc);
                return Ok(AstNode::Block {
                    statements,
                    location: loc,
                });
            }
            TokenKind::Semicolon => {
                self.advance()?;
                return Ok(AstNode::Empty { location: loc });
            }
            TokenKind::Else => {
                return Err(self.error_at_current("'else' without a matching 'if'"));
            }
            _ => {}
        }

        // Check for variable declaration (type followed by identifier)
        if self.is_type_keyword() {
            return self.parse_variable_declaration();
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        trace_log!("reduce expression-statement at {}", loc);
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// Parse print statement: print expr;
    fn parse_print_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = Box::new(self.parse_expression()?);
        self.expect_semicolon("after print")?;

        trace_log!("reduce print at {}", loc);
        Ok(AstNode::Print {
            expr,
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let Some(return_type) = self.enclosing_return else {
            return Err(ParseError::Syntax(SyntaxError {
                message: "'return' outside of a function".to_string(),
                found: TokenKind::Return,
                lexeme: "return".to_string(),
                location: loc,
            }));
        };

        let expr = if self.check(TokenKind::Semicolon) {
            None
        } else {
            if return_type == BaseType::Void {
                return Err(self.error_at_current(
                    "Cannot return a value from a function declared 'void'",
                ));
            }
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_semicolon("after return")?;

        trace_log!("reduce return at {}", loc);
        Ok(AstNode::Return {
            expr,
            location: loc,
        })
    }

    /// Parse if statement; a following `else` binds here
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_token(TokenKind::Else)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        trace_log!("reduce if at {}", loc);
        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after while condition")?;

        let body = Box::new(self.parse_statement()?);

        trace_log!("reduce while at {}", loc);
        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse for statement; every clause is optional
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        // Init (optional)
        let init = if self.match_token(TokenKind::Semicolon)? {
            None
        } else if self.is_type_keyword() {
            // Declaration includes semicolon, so don't expect another
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let init_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_semicolon("after for init")?;
            Some(Box::new(AstNode::ExpressionStatement {
                expr: Box::new(expr),
                location: init_loc,
            }))
        };

        // Condition (optional)
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_semicolon("after for condition")?;

        // Step (optional)
        let step = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_rparen("after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        trace_log!("reduce for at {}", loc);
        Ok(AstNode::For {
            init,
            condition,
            step,
            body,
            location: loc,
        })
    }
}
