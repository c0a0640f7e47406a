//! Token kinds, semantic values and tokens
//!
//! A [`Token`] pairs a [`TokenKind`] with the [`SemanticValue`] the scanner
//! attached to it. The payload variant is fixed by the kind:
//!
//! | kind | payload |
//! |---|---|
//! | `Id`, `SConst` | [`SemanticValue::Text`] |
//! | `IConst` | [`SemanticValue::Int`] |
//! | `FConst` | [`SemanticValue::Float`] |
//! | everything else | [`SemanticValue::None`] |
//!
//! Tokens can only be built through the per-kind constructors, so a token whose
//! payload disagrees with its kind cannot exist.
//!
//! # Token codes
//!
//! Named tokens use the fixed codes `258..=285` that external grammar tooling
//! expects. Single-character tokens use their ASCII code and end of input is `0`.
//! These numbers never change.

use super::ast::SourceLocation;
use std::fmt;

/// Every token category the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TokenKind {
    // Keywords
    Print = 258,
    If = 259,
    Else = 260,
    For = 261,
    While = 262,

    // Multi-character operators
    IncOp = 263,     // ++
    DecOp = 264,     // --
    LeOp = 265,      // <=
    GeOp = 266,      // >=
    EqOp = 267,      // ==
    NeOp = 268,      // !=
    AndOp = 269,     // &&
    OrOp = 270,      // ||
    MulAssign = 271, // *=
    DivAssign = 272, // /=
    ModAssign = 273, // %=
    AddAssign = 274, // +=
    DecAssign = 275, // -=

    Return = 276,

    // Identifiers and literals
    Id = 277,
    IConst = 278,
    FConst = 279,
    SConst = 280,

    // Type names
    Int = 281,
    Float = 282,
    Bool = 283,
    Void = 284,
    String = 285,

    // Single-character tokens
    Plus = b'+' as u16,
    Minus = b'-' as u16,
    Star = b'*' as u16,
    Slash = b'/' as u16,
    Percent = b'%' as u16,
    Lt = b'<' as u16,
    Gt = b'>' as u16,
    Assign = b'=' as u16,
    Bang = b'!' as u16,
    LParen = b'(' as u16,
    RParen = b')' as u16,
    LBrace = b'{' as u16,
    RBrace = b'}' as u16,
    Semicolon = b';' as u16,
    Comma = b',' as u16,

    Eof = 0,
}

impl TokenKind {
    /// All kinds, in code order for the named ones.
    pub const ALL: [TokenKind; 44] = [
        TokenKind::Print,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::For,
        TokenKind::While,
        TokenKind::IncOp,
        TokenKind::DecOp,
        TokenKind::LeOp,
        TokenKind::GeOp,
        TokenKind::EqOp,
        TokenKind::NeOp,
        TokenKind::AndOp,
        TokenKind::OrOp,
        TokenKind::MulAssign,
        TokenKind::DivAssign,
        TokenKind::ModAssign,
        TokenKind::AddAssign,
        TokenKind::DecAssign,
        TokenKind::Return,
        TokenKind::Id,
        TokenKind::IConst,
        TokenKind::FConst,
        TokenKind::SConst,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Bool,
        TokenKind::Void,
        TokenKind::String,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Percent,
        TokenKind::Lt,
        TokenKind::Gt,
        TokenKind::Assign,
        TokenKind::Bang,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::Semicolon,
        TokenKind::Comma,
        TokenKind::Eof,
    ];

    /// Numeric token code.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Look up a kind by its numeric code.
    pub fn from_code(code: u16) -> Option<TokenKind> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }

    /// Grammar-level name: `ADD_ASSIGN`, `'+'`, `$end`.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Print => "PRINT",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::IncOp => "INC_OP",
            TokenKind::DecOp => "DEC_OP",
            TokenKind::LeOp => "LE_OP",
            TokenKind::GeOp => "GE_OP",
            TokenKind::EqOp => "EQ_OP",
            TokenKind::NeOp => "NE_OP",
            TokenKind::AndOp => "AND_OP",
            TokenKind::OrOp => "OR_OP",
            TokenKind::MulAssign => "MUL_ASSIGN",
            TokenKind::DivAssign => "DIV_ASSIGN",
            TokenKind::ModAssign => "MOD_ASSIGN",
            TokenKind::AddAssign => "ADD_ASSIGN",
            TokenKind::DecAssign => "DEC_ASSIGN",
            TokenKind::Return => "RETURN",
            TokenKind::Id => "ID",
            TokenKind::IConst => "I_CONST",
            TokenKind::FConst => "F_CONST",
            TokenKind::SConst => "S_CONST",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::Bool => "BOOL",
            TokenKind::Void => "VOID",
            TokenKind::String => "STRING",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Assign => "'='",
            TokenKind::Bang => "'!'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "$end",
        }
    }

    /// Source spelling of a fixed token: `print`, `++`, `;`. Empty for
    /// identifiers, literals and end of input.
    pub fn spelling(self) -> &'static str {
        match self {
            TokenKind::Print => "print",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Int => "int",
            TokenKind::Float => "float",
            TokenKind::Bool => "bool",
            TokenKind::Void => "void",
            TokenKind::String => "string",
            TokenKind::IncOp => "++",
            TokenKind::DecOp => "--",
            TokenKind::LeOp => "<=",
            TokenKind::GeOp => ">=",
            TokenKind::EqOp => "==",
            TokenKind::NeOp => "!=",
            TokenKind::AndOp => "&&",
            TokenKind::OrOp => "||",
            TokenKind::MulAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::ModAssign => "%=",
            TokenKind::AddAssign => "+=",
            TokenKind::DecAssign => "-=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Assign => "=",
            TokenKind::Bang => "!",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Id
            | TokenKind::IConst
            | TokenKind::FConst
            | TokenKind::SConst
            | TokenKind::Eof => "",
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Print
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::While
                | TokenKind::Return
        ) || self.is_type_name()
    }

    pub fn is_type_name(self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Bool
                | TokenKind::Void
                | TokenKind::String
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Print => write!(f, "'print'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Float => write!(f, "'float'"),
            TokenKind::Bool => write!(f, "'bool'"),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::String => write!(f, "'string'"),
            TokenKind::IncOp => write!(f, "'++'"),
            TokenKind::DecOp => write!(f, "'--'"),
            TokenKind::LeOp => write!(f, "'<='"),
            TokenKind::GeOp => write!(f, "'>='"),
            TokenKind::EqOp => write!(f, "'=='"),
            TokenKind::NeOp => write!(f, "'!='"),
            TokenKind::AndOp => write!(f, "'&&'"),
            TokenKind::OrOp => write!(f, "'||'"),
            TokenKind::MulAssign => write!(f, "'*='"),
            TokenKind::DivAssign => write!(f, "'/='"),
            TokenKind::ModAssign => write!(f, "'%='"),
            TokenKind::AddAssign => write!(f, "'+='"),
            TokenKind::DecAssign => write!(f, "'-='"),
            TokenKind::Id => write!(f, "identifier"),
            TokenKind::IConst => write!(f, "integer literal"),
            TokenKind::FConst => write!(f, "float literal"),
            TokenKind::SConst => write!(f, "string literal"),
            TokenKind::Eof => write!(f, "end of file"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Payload attached to a token or carried into an AST node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SemanticValue {
    #[default]
    None,
    Int(i32),
    Float(f64),
    Text(String),
}

impl SemanticValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            SemanticValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SemanticValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SemanticValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Moves the text buffer out, if this is a text value.
    pub fn into_text(self) -> Option<String> {
        match self {
            SemanticValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A classified token with its payload and starting position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    value: SemanticValue,
    /// Source text the token was scanned from
    lexeme: String,
    location: SourceLocation,
}

impl Token {
    pub fn ident(name: String, location: SourceLocation) -> Self {
        Self {
            kind: TokenKind::Id,
            lexeme: name.clone(),
            value: SemanticValue::Text(name),
            location,
        }
    }

    pub fn int(value: i32, location: SourceLocation) -> Self {
        Self {
            kind: TokenKind::IConst,
            value: SemanticValue::Int(value),
            lexeme: value.to_string(),
            location,
        }
    }

    pub fn float(value: f64, location: SourceLocation) -> Self {
        Self {
            kind: TokenKind::FConst,
            value: SemanticValue::Float(value),
            lexeme: value.to_string(),
            location,
        }
    }

    pub fn string(contents: String, location: SourceLocation) -> Self {
        Self {
            kind: TokenKind::SConst,
            lexeme: format!("{:?}", contents),
            value: SemanticValue::Text(contents),
            location,
        }
    }

    /// Token without a payload (keywords, operators, punctuation, EOF).
    pub fn simple(kind: TokenKind, location: SourceLocation) -> Self {
        debug_assert!(
            !matches!(
                kind,
                TokenKind::Id | TokenKind::IConst | TokenKind::FConst | TokenKind::SConst
            ),
            "{} tokens carry a payload",
            kind.name()
        );
        Self {
            kind,
            value: SemanticValue::None,
            lexeme: kind.spelling().to_string(),
            location,
        }
    }

    /// Replace the lexeme with the exact source text of a literal
    pub fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = lexeme.into();
        self
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> &SemanticValue {
        &self.value
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Consumes the token, handing its text buffer to the caller.
    pub fn into_text(self) -> Option<String> {
        self.value.into_text()
    }

    pub fn into_value(self) -> SemanticValue {
        self.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            SemanticValue::Int(_) => write!(f, "integer literal {}", self.lexeme),
            SemanticValue::Float(_) => write!(f, "float literal {}", self.lexeme),
            SemanticValue::Text(s) if self.kind == TokenKind::SConst => {
                write!(f, "string literal \"{}\"", s)
            }
            SemanticValue::Text(s) => write!(f, "identifier '{}'", s),
            SemanticValue::None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_token_codes() {
        let expected = [
            (TokenKind::Print, 258),
            (TokenKind::If, 259),
            (TokenKind::Else, 260),
            (TokenKind::For, 261),
            (TokenKind::While, 262),
            (TokenKind::IncOp, 263),
            (TokenKind::DecOp, 264),
            (TokenKind::LeOp, 265),
            (TokenKind::GeOp, 266),
            (TokenKind::EqOp, 267),
            (TokenKind::NeOp, 268),
            (TokenKind::AndOp, 269),
            (TokenKind::OrOp, 270),
            (TokenKind::MulAssign, 271),
            (TokenKind::DivAssign, 272),
            (TokenKind::ModAssign, 273),
            (TokenKind::AddAssign, 274),
            (TokenKind::DecAssign, 275),
            (TokenKind::Return, 276),
            (TokenKind::Id, 277),
            (TokenKind::IConst, 278),
            (TokenKind::FConst, 279),
            (TokenKind::SConst, 280),
            (TokenKind::Int, 281),
            (TokenKind::Float, 282),
            (TokenKind::Bool, 283),
            (TokenKind::Void, 284),
            (TokenKind::String, 285),
        ];

        for (kind, code) in expected {
            assert_eq!(kind.code(), code, "{}", kind.name());
            assert_eq!(TokenKind::from_code(code), Some(kind));
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<u16> = TokenKind::ALL.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), TokenKind::ALL.len());
    }

    #[test]
    fn test_single_char_codes() {
        assert_eq!(TokenKind::Plus.code(), 43);
        assert_eq!(TokenKind::Semicolon.code(), 59);
        assert_eq!(TokenKind::Eof.code(), 0);
        assert_eq!(TokenKind::from_code(1000), None);
    }

    #[test]
    fn test_payload_follows_kind() {
        let loc = SourceLocation::new(1, 1);

        let tok = Token::int(42, loc);
        assert_eq!(tok.kind(), TokenKind::IConst);
        assert_eq!(tok.value().as_int(), Some(42));
        assert_eq!(tok.value().as_float(), None);
        assert_eq!(tok.value().as_text(), None);

        let tok = Token::float(2.5, loc);
        assert_eq!(tok.value().as_float(), Some(2.5));
        assert_eq!(tok.value().as_int(), None);

        let tok = Token::ident("count".to_string(), loc);
        assert_eq!(tok.kind(), TokenKind::Id);
        assert_eq!(tok.into_text().as_deref(), Some("count"));

        let tok = Token::simple(TokenKind::Semicolon, loc);
        assert_eq!(tok.value(), &SemanticValue::None);
        assert_eq!(tok.into_text(), None);
    }

    #[test]
    fn test_spelling_and_lexeme() {
        let loc = SourceLocation::new(1, 1);
        assert_eq!(Token::simple(TokenKind::Print, loc).lexeme(), "print");
        assert_eq!(Token::simple(TokenKind::DecAssign, loc).lexeme(), "-=");
        assert_eq!(Token::simple(TokenKind::Eof, loc).lexeme(), "");
        assert_eq!(Token::float(1000.0, loc).with_lexeme("1e3").lexeme(), "1e3");
        assert!(TokenKind::ALL
            .iter()
            .filter(|kind| !matches!(
                kind,
                TokenKind::Id
                    | TokenKind::IConst
                    | TokenKind::FConst
                    | TokenKind::SConst
                    | TokenKind::Eof
            ))
            .all(|kind| !kind.spelling().is_empty()));
    }

    #[test]
    fn test_keyword_classes() {
        assert!(TokenKind::Print.is_keyword());
        assert!(TokenKind::String.is_keyword());
        assert!(TokenKind::Bool.is_type_name());
        assert!(!TokenKind::Return.is_type_name());
        assert!(!TokenKind::Id.is_keyword());
    }
}
