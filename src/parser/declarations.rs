//! Declaration parsing implementation
//!
//! This module handles parsing of top-level items and declarations:
//!
//! - Function definitions: `type name(params) { ... }`
//! - Function prototypes: `type name(params);`
//! - Variable declarations: `type name [= init];`
//! - Type names and function parameters
//!
//! # Grammar
//!
//! ```text
//! item         ::= function_def | function_decl | statement
//! function_def ::= type identifier "(" params ")" "{" statements "}"
//! function_decl ::= type identifier "(" params ")" ";"
//! var_decl     ::= type identifier ("=" expr)? ";"
//! params       ::= ε | "void" | type identifier ("," type identifier)*
//! type         ::= "int" | "float" | "bool" | "void" | "string"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::token::TokenKind;
use crate::trace_log;

impl Parser {
    /// Parse a top-level item: function, prototype or statement
    pub(crate) fn parse_top_level_item(&mut self) -> Result<AstNode, ParseError> {
        if !self.is_type_keyword() {
            return self.parse_statement();
        }

        let decl_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        if self.check(TokenKind::LParen) {
            self.parse_function(decl_type, name, loc)
        } else {
            self.parse_variable_rest(decl_type, name, loc)
        }
    }

    /// Parse the rest of a function after its name: (params) { body } or (params);
    fn parse_function(
        &mut self,
        return_type: BaseType,
        name: String,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        if self.match_token(TokenKind::Semicolon)? {
            trace_log!("reduce function-decl '{}' at {}", name, loc);
            return Ok(AstNode::FunctionDecl {
                name,
                params,
                return_type,
                location: loc,
            });
        }

        if !self.check(TokenKind::LBrace) {
            return Err(self.error_at_current(format!(
                "Expected '{{' or ';' after parameters, found {}",
                self.peek()
            )));
        }
        self.advance()?;

        let saved_return = self.enclosing_return.replace(return_type);
        let body = self.parse_block_statements();
        self.enclosing_return = saved_return;
        let body = body?;

        self.expect_rbrace("after function body")?;

        trace_log!("reduce function-def '{}' at {}", name, loc);
        Ok(AstNode::FunctionDef {
            name,
            params,
            return_type,
            body,
            location: loc,
        })
    }

    /// Parse parameter list: type name, type name, ...
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let param_type = self.parse_type()?;

            // (void) means no parameters
            if params.is_empty() && param_type == BaseType::Void && self.check(TokenKind::RParen) {
                return Ok(params);
            }

            let param_name = self.expect_identifier()?;
            params.push(Param {
                name: param_name,
                param_type,
            });

            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        Ok(params)
    }

    /// Parse variable declaration: type name [= init];
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<AstNode, ParseError> {
        let var_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        let loc = self.previous_location();

        if self.check(TokenKind::LParen) {
            return Err(self.error_at_current(format!(
                "Function '{}' can only be defined at top level",
                name
            )));
        }

        self.parse_variable_rest(var_type, name, loc)
    }

    /// Parse the optional initializer and the terminating semicolon
    fn parse_variable_rest(
        &mut self,
        var_type: BaseType,
        name: String,
        loc: SourceLocation,
    ) -> Result<AstNode, ParseError> {
        let init = if self.match_token(TokenKind::Assign)? {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        trace_log!("reduce var-decl '{}' at {}", name, loc);
        Ok(AstNode::VarDecl {
            name,
            var_type,
            init,
            location: loc,
        })
    }

    /// Parse type: int | float | bool | void | string
    pub(crate) fn parse_type(&mut self) -> Result<BaseType, ParseError> {
        let base = match self.peek().kind() {
            TokenKind::Int => BaseType::Int,
            TokenKind::Float => BaseType::Float,
            TokenKind::Bool => BaseType::Bool,
            TokenKind::Void => BaseType::Void,
            TokenKind::String => BaseType::String,
            _ => {
                return Err(
                    self.error_at_current(format!("Expected type, found {}", self.peek()))
                );
            }
        };
        self.advance()?;
        Ok(base)
    }
}
