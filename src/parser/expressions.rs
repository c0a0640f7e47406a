//! Expression parsing implementation
//!
//! This module handles parsing of microc expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, strings
//! - Identifiers and function calls
//! - Binary operators: arithmetic, comparison, logical
//! - Prefix operators: `-`, `!`, `++`, `--`
//! - Postfix operators: `++`, `--`
//! - Assignment: `=`, `+=`, `-=`, `*=`, `/=`, `%=`
//!
//! # Precedence
//!
//! From loosest to tightest binding:
//!
//! | level | operators | associativity |
//! |---|---|---|
//! | assignment | `= += -= *= /= %=` | right |
//! | 1 | `\|\|` | left |
//! | 2 | `&&` | left |
//! | 3 | `== !=` | left |
//! | 4 | `< > <= >=` | left |
//! | 5 | `+ -` | left |
//! | 6 | `* / %` | left |
//! | prefix | `++ -- - !` | right |
//! | postfix | `++ --`, calls | left |
//!
//! Assignment targets and `++`/`--` operands must be plain identifiers.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser, SyntaxError};
use crate::parser::token::{SemanticValue, TokenKind};

/// Binding strength of the loosest binary operator
const LOWEST_BINARY: u8 = 1;

/// Binary operator and its precedence level for a token kind
fn binary_operator(kind: TokenKind) -> Option<(BinOp, u8)> {
    let entry = match kind {
        TokenKind::OrOp => (BinOp::Or, 1),
        TokenKind::AndOp => (BinOp::And, 2),
        TokenKind::EqOp => (BinOp::Eq, 3),
        TokenKind::NeOp => (BinOp::Ne, 3),
        TokenKind::Lt => (BinOp::Lt, 4),
        TokenKind::Gt => (BinOp::Gt, 4),
        TokenKind::LeOp => (BinOp::Le, 4),
        TokenKind::GeOp => (BinOp::Ge, 4),
        TokenKind::Plus => (BinOp::Add, 5),
        TokenKind::Minus => (BinOp::Sub, 5),
        TokenKind::Star => (BinOp::Mul, 6),
        TokenKind::Slash => (BinOp::Div, 6),
        TokenKind::Percent => (BinOp::Mod, 6),
        _ => return None,
    };
    Some(entry)
}

fn assignment_operator(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assign => Some(AssignOp::Assign),
        TokenKind::AddAssign => Some(AssignOp::AddAssign),
        TokenKind::DecAssign => Some(AssignOp::SubAssign),
        TokenKind::MulAssign => Some(AssignOp::MulAssign),
        TokenKind::DivAssign => Some(AssignOp::DivAssign),
        TokenKind::ModAssign => Some(AssignOp::ModAssign),
        _ => None,
    }
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_binary(LOWEST_BINARY)?;

        let Some(op) = assignment_operator(self.peek().kind()) else {
            return Ok(expr);
        };

        let target = match expr {
            Expr::Variable(name, _) => name,
            _ => {
                return Err(self.error_at_current(format!(
                    "Left side of {} must be a variable",
                    self.peek().kind()
                )));
            }
        };

        let loc = self.current_location();
        self.advance()?;
        let value = Box::new(self.nested(Self::parse_assignment)?);

        Ok(Expr::Assign {
            op,
            target,
            value,
            location: loc,
        })
    }

    /// Precedence climbing over the binary operator levels
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, precedence)) = binary_operator(self.peek().kind()) {
            if precedence < min_precedence {
                break;
            }

            let loc = self.current_location();
            self.advance()?;
            // Left-associative: the right operand only takes tighter operators
            let right = self.parse_binary(precedence + 1)?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse prefix operators (- ! ++ --)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        let kind = self.peek().kind();

        let op = match kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Bang => UnOp::Not,
            TokenKind::IncOp => UnOp::PreInc,
            TokenKind::DecOp => UnOp::PreDec,
            _ => return self.parse_postfix(),
        };

        self.advance()?;
        let operand = self.nested(Self::parse_unary)?;

        if matches!(op, UnOp::PreInc | UnOp::PreDec) && !matches!(operand, Expr::Variable(..)) {
            return Err(ParseError::Syntax(SyntaxError {
                message: format!("Operand of {} must be a variable", kind),
                found: kind,
                lexeme: kind.spelling().to_string(),
                location: loc,
            }));
        }

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            location: loc,
        })
    }

    /// Parse postfix (++ --)
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let op = match self.peek().kind() {
                TokenKind::IncOp => UnOp::PostInc,
                TokenKind::DecOp => UnOp::PostDec,
                _ => break,
            };

            if !matches!(expr, Expr::Variable(..)) {
                return Err(self.error_at_current(format!(
                    "Operand of {} must be a variable",
                    self.peek().kind()
                )));
            }

            let loc = self.current_location();
            self.advance()?;
            expr = Expr::Unary {
                op,
                operand: Box::new(expr),
                location: loc,
            };
        }

        Ok(expr)
    }

    /// Parse argument list: expr, expr, ...
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if self.check(TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);

            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, variables, calls, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind() {
            TokenKind::Id | TokenKind::IConst | TokenKind::FConst | TokenKind::SConst => {}
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.nested(Self::parse_expression)?;
                self.expect_rparen("after expression")?;
                return Ok(expr);
            }
            _ => {
                return Err(self.error_at_current(format!("Unexpected token: {}", self.peek())));
            }
        }

        let token = self.advance()?;
        let loc = token.location();
        let kind = token.kind();

        match token.into_value() {
            SemanticValue::Int(n) => Ok(Expr::IntLiteral(n, loc)),
            SemanticValue::Float(x) => Ok(Expr::FloatLiteral(x, loc)),
            SemanticValue::Text(s) if kind == TokenKind::SConst => Ok(Expr::StringLiteral(s, loc)),
            SemanticValue::Text(name) => {
                if !self.match_token(TokenKind::LParen)? {
                    return Ok(Expr::Variable(name, loc));
                }

                let args = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;
                Ok(Expr::Call {
                    name,
                    args,
                    location: loc,
                })
            }
            SemanticValue::None => Err(ParseError::Syntax(SyntaxError {
                message: format!("{} carries no value", kind),
                found: kind,
                lexeme: kind.spelling().to_string(),
                location: loc,
            })),
        }
    }
}
