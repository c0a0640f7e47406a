//! Lexer (tokenizer) for microc source code
//!
//! Produces one [`Token`] per [`Lexer::next_token`] call so the parser can pull
//! tokens lazily. Multi-character operators are matched longest-first, keywords
//! are only recognised as whole words, and whitespace and comments never
//! produce tokens.
//!
//! With [`ErrorRecovery::SkipAndContinue`] a lexical error does not stop the
//! scan: it is recorded in [`Lexer::diagnostics`], the offending input is
//! skipped and the next token is returned instead.
//!
//! Integer literals are unsigned in the source: `-` is always its own token, so
//! an `I_CONST` covers `0..=i32::MAX`. `-2147483648` is rejected with
//! [`LexErrorKind::MalformedLiteral`]; write `-2147483647 - 1` instead.

use super::ast::SourceLocation;
use super::token::{Token, TokenKind};
use crate::trace_log;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::OnceLock;

/// What went wrong while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    MalformedLiteral,
    UnterminatedString,
    UnterminatedComment,
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
    /// Offending source text
    pub lexeme: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// How the lexer reacts to a lexical error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorRecovery {
    /// Return the first error to the caller
    #[default]
    Halt,
    /// Record the error, skip the offending input and keep scanning
    SkipAndContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexerConfig {
    pub recovery: ErrorRecovery,
}

/// Reserved words, shared read-only by every lexer.
fn keywords() -> &'static FxHashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        [
            ("print", TokenKind::Print),
            ("if", TokenKind::If),
            ("else", TokenKind::Else),
            ("for", TokenKind::For),
            ("while", TokenKind::While),
            ("return", TokenKind::Return),
            ("int", TokenKind::Int),
            ("float", TokenKind::Float),
            ("bool", TokenKind::Bool),
            ("void", TokenKind::Void),
            ("string", TokenKind::String),
        ]
        .into_iter()
        .collect()
    })
}

/// Keyword kind for a complete word, if it is reserved.
pub fn keyword(word: &str) -> Option<TokenKind> {
    keywords().get(word).copied()
}

/// Lexer for microc source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    config: LexerConfig,
    diagnostics: Vec<LexError>,
    finished: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self::with_config(input, LexerConfig::default())
    }

    pub fn with_config(input: &str, config: LexerConfig) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            config,
            diagnostics: Vec::new(),
            finished: false,
        }
    }

    /// Errors recorded in skip-and-continue mode
    pub fn diagnostics(&self) -> &[LexError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Tokenize the entire input. The last token is always EOF.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let at_end = token.kind() == TokenKind::Eof;
            tokens.push(token);
            if at_end {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token. Once the input is exhausted every call returns EOF.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            match self.scan_token() {
                Ok(token) => {
                    trace_log!("token {} {} at {}", token.kind().name(), token, token.location());
                    return Ok(token);
                }
                Err(err) => match self.config.recovery {
                    ErrorRecovery::Halt => return Err(err),
                    ErrorRecovery::SkipAndContinue => {
                        trace_log!("skipping: {}", err);
                        self.diagnostics.push(err);
                    }
                },
            }
        }
    }

    /// Get next token. Every error path has already consumed the bad input.
    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::simple(TokenKind::Eof, loc)),
        };

        match ch {
            // String literals
            '"' => self.string_literal(loc),

            // Numeric literals
            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)
            }

            // Identifiers and keywords
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            // Operators and punctuation
            '+' => Ok(self.operator(
                loc,
                &[('+', TokenKind::IncOp), ('=', TokenKind::AddAssign)],
                TokenKind::Plus,
            )),
            '-' => Ok(self.operator(
                loc,
                &[('-', TokenKind::DecOp), ('=', TokenKind::DecAssign)],
                TokenKind::Minus,
            )),
            '*' => Ok(self.operator(loc, &[('=', TokenKind::MulAssign)], TokenKind::Star)),
            '/' => Ok(self.operator(loc, &[('=', TokenKind::DivAssign)], TokenKind::Slash)),
            '%' => Ok(self.operator(
                loc,
                &[('=', TokenKind::ModAssign)],
                TokenKind::Percent,
            )),
            '<' => Ok(self.operator(loc, &[('=', TokenKind::LeOp)], TokenKind::Lt)),
            '>' => Ok(self.operator(loc, &[('=', TokenKind::GeOp)], TokenKind::Gt)),
            '=' => Ok(self.operator(loc, &[('=', TokenKind::EqOp)], TokenKind::Assign)),
            '!' => Ok(self.operator(loc, &[('=', TokenKind::NeOp)], TokenKind::Bang)),
            '&' if self.peek() == Some('&') => {
                self.advance();
                Ok(Token::simple(TokenKind::AndOp, loc))
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                Ok(Token::simple(TokenKind::OrOp, loc))
            }
            '(' => Ok(Token::simple(TokenKind::LParen, loc)),
            ')' => Ok(Token::simple(TokenKind::RParen, loc)),
            '{' => Ok(Token::simple(TokenKind::LBrace, loc)),
            '}' => Ok(Token::simple(TokenKind::RBrace, loc)),
            ';' => Ok(Token::simple(TokenKind::Semicolon, loc)),
            ',' => Ok(Token::simple(TokenKind::Comma, loc)),

            _ => Err(LexError {
                kind: LexErrorKind::UnexpectedCharacter,
                message: format!("Unexpected character: '{}'", ch),
                lexeme: ch.to_string(),
                location: loc,
            }),
        }
    }

    /// Longest match: take the two-character form if the next character
    /// completes one, otherwise the single-character token.
    fn operator(
        &mut self,
        loc: SourceLocation,
        longer: &[(char, TokenKind)],
        single: TokenKind,
    ) -> Token {
        let next = self.peek();
        for &(second, kind) in longer {
            if next == Some(second) {
                self.advance();
                return Token::simple(kind, loc);
            }
        }
        Token::simple(single, loc)
    }

    /// Parse string literal; the opening quote is already consumed
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();
        let mut lexeme = String::from('"');
        let mut bad_escape = None;

        while let Some(ch) = self.advance() {
            lexeme.push(ch);

            match ch {
                '"' => {
                    return match bad_escape {
                        Some(err) => Err(err),
                        None => Ok(Token::string(string, loc).with_lexeme(lexeme)),
                    };
                }
                '\\' => {
                    let escape_loc = self.current_location();
                    let Some(escaped) = self.advance() else {
                        break;
                    };
                    lexeme.push(escaped);

                    let unescaped = match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '0' => '\0',
                        _ => {
                            // Keep scanning to the closing quote so recovery
                            // resumes after the whole literal.
                            bad_escape.get_or_insert(LexError {
                                kind: LexErrorKind::MalformedLiteral,
                                message: format!("Unknown escape sequence: \\{}", escaped),
                                lexeme: format!("\\{}", escaped),
                                location: escape_loc,
                            });
                            continue;
                        }
                    };
                    string.push(unescaped);
                }
                _ => string.push(ch),
            }
        }

        Err(LexError {
            kind: LexErrorKind::UnterminatedString,
            message: "Unterminated string literal".to_string(),
            lexeme,
            location: loc,
        })
    }

    /// Parse numeric literal: integer, or float with a fraction and/or exponent
    fn number_literal(
        &mut self,
        first: char,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first);

        let mut is_float = first == '.';
        self.take_digits(&mut text);

        if !is_float && self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        if let Some(marker @ ('e' | 'E')) = self.peek() {
            is_float = true;
            text.push(marker);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.advance();
            }
            if !self.take_digits(&mut text) {
                return Err(LexError {
                    kind: LexErrorKind::MalformedLiteral,
                    message: format!("Missing exponent digits in '{}'", text),
                    lexeme: text,
                    location: loc,
                });
            }
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Token::float(value, loc).with_lexeme(text)),
                _ => Err(LexError {
                    kind: LexErrorKind::MalformedLiteral,
                    message: format!("Invalid float literal: {}", text),
                    lexeme: text,
                    location: loc,
                }),
            }
        } else {
            match text.parse::<i32>() {
                Ok(value) => Ok(Token::int(value, loc).with_lexeme(text)),
                Err(_) => Err(LexError {
                    kind: LexErrorKind::MalformedLiteral,
                    message: format!("Integer literal out of range: {}", text),
                    lexeme: text,
                    location: loc,
                }),
            }
        }
    }

    /// Append a run of decimal digits; true if at least one was taken
    fn take_digits(&mut self, text: &mut String) -> bool {
        let start = text.len();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text.len() > start
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match keyword(&ident) {
            Some(kind) => Token::simple(kind, loc),
            None => Token::ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            kind: LexErrorKind::UnterminatedComment,
            message: "Unterminated block comment".to_string(),
            lexeme: "/*".to_string(),
            location: start_loc,
        })
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Yields tokens up to and including EOF, then stops. In halt mode the
/// iterator also stops after the first error.
impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = self.next_token();
        match &item {
            Ok(token) if token.kind() == TokenKind::Eof => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .iter()
            .map(Token::kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("int main() { return 0; }");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].kind(), TokenKind::Int);
        assert_eq!(tokens[1].value().as_text(), Some("main"));
        assert_eq!(tokens[2].kind(), TokenKind::LParen);
        assert_eq!(tokens[3].kind(), TokenKind::RParen);
        assert_eq!(tokens[4].kind(), TokenKind::LBrace);
        assert_eq!(tokens[5].kind(), TokenKind::Return);
        assert_eq!(tokens[6].value().as_int(), Some(0));
        assert_eq!(tokens[7].kind(), TokenKind::Semicolon);
        assert_eq!(tokens[8].kind(), TokenKind::RBrace);
        assert_eq!(tokens[9].kind(), TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("++ -- += -= *= /= %= <= >= == != && ||"),
            vec![
                TokenKind::IncOp,
                TokenKind::DecOp,
                TokenKind::AddAssign,
                TokenKind::DecAssign,
                TokenKind::MulAssign,
                TokenKind::DivAssign,
                TokenKind::ModAssign,
                TokenKind::LeOp,
                TokenKind::GeOp,
                TokenKind::EqOp,
                TokenKind::NeOp,
                TokenKind::AndOp,
                TokenKind::OrOp,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_char_operators() {
        assert_eq!(
            kinds("+ - * / % < > = ! ( ) { } ; ,"),
            vec![
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
            ]
        );
    }

    #[test]
    fn test_maximal_munch() {
        let tokens = Lexer::new("a+++b").tokenize().unwrap();
        let munched: Vec<_> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            munched,
            vec![
                TokenKind::Id,
                TokenKind::IncOp,
                TokenKind::Plus,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[0].value().as_text(), Some("a"));
        assert_eq!(tokens[3].value().as_text(), Some("b"));

        assert_eq!(
            kinds("x-=-1"),
            vec![
                TokenKind::Id,
                TokenKind::DecAssign,
                TokenKind::Minus,
                TokenKind::IConst,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("a<==b"),
            vec![
                TokenKind::Id,
                TokenKind::LeOp,
                TokenKind::Assign,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords_are_whole_words() {
        let tokens = Lexer::new("if iffy print_x int2 _while").tokenize().unwrap();
        assert_eq!(tokens[0].kind(), TokenKind::If);
        for (token, text) in tokens[1..5].iter().zip(["iffy", "print_x", "int2", "_while"]) {
            assert_eq!(token.kind(), TokenKind::Id);
            assert_eq!(token.value().as_text(), Some(text));
        }
    }

    #[test]
    fn test_comments() {
        let tokens = Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;")
            .tokenize()
            .unwrap();

        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[6].kind(), TokenKind::Int);
        assert_eq!(tokens[7].value().as_text(), Some("z"));
        assert_eq!(tokens[7].location(), SourceLocation::new(3, 16));
    }

    #[test]
    fn test_numeric_literals() {
        let tokens = Lexer::new("42 3.25 1. .5 1e3 2.5E-2").tokenize().unwrap();

        assert_eq!(tokens[0].value().as_int(), Some(42));
        assert_eq!(tokens[1].value().as_float(), Some(3.25));
        assert_eq!(tokens[2].value().as_float(), Some(1.0));
        assert_eq!(tokens[3].value().as_float(), Some(0.5));
        assert_eq!(tokens[4].value().as_float(), Some(1000.0));
        assert_eq!(tokens[5].value().as_float(), Some(0.025));
        assert!(tokens[1..6].iter().all(|t| t.kind() == TokenKind::FConst));

        let lexemes: Vec<_> = tokens.iter().map(Token::lexeme).collect();
        assert_eq!(lexemes, vec!["42", "3.25", "1.", ".5", "1e3", "2.5E-2", ""]);
    }

    #[test]
    fn test_integer_literal_range() {
        let tokens = Lexer::new("2147483647").tokenize().unwrap();
        assert_eq!(tokens[0].value().as_int(), Some(i32::MAX));

        let err = Lexer::new("-2147483648").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedLiteral);
        assert_eq!(err.lexeme, "2147483648");
        assert_eq!(err.location, SourceLocation::new(1, 2));

        assert_eq!(
            kinds("-2147483647 - 1"),
            vec![
                TokenKind::Minus,
                TokenKind::IConst,
                TokenKind::Minus,
                TokenKind::IConst,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        let err = Lexer::new("1e+").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedLiteral);
        assert_eq!(err.lexeme, "1e+");

        let err = Lexer::new("99999999999").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedLiteral);
    }

    #[test]
    fn test_string_literal() {
        let tokens = Lexer::new(r#""hello\n\"world\"""#).tokenize().unwrap();

        assert_eq!(tokens[0].kind(), TokenKind::SConst);
        assert_eq!(tokens[0].value().as_text(), Some("hello\n\"world\""));
        assert_eq!(tokens[0].lexeme(), r#""hello\n\"world\"""#);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("print \"abc").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.location, SourceLocation::new(1, 7));
        assert_eq!(err.lexeme, "\"abc");
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::new("x /* never closed").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_unexpected_character_halts() {
        let err = Lexer::new("a @ b").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter);
        assert_eq!(err.lexeme, "@");
        assert_eq!(err.location, SourceLocation::new(1, 3));

        let err = Lexer::new("a & b").tokenize().unwrap_err();
        assert_eq!(err.lexeme, "&");
    }

    #[test]
    fn test_skip_and_continue_collects_errors() {
        let config = LexerConfig {
            recovery: ErrorRecovery::SkipAndContinue,
        };
        let mut lexer = Lexer::with_config("a @ b # c \"bad\\q\" d", config);
        let tokens = lexer.tokenize().unwrap();

        let names: Vec<_> = tokens.iter().filter_map(|t| t.value().as_text()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);

        let diagnostics = lexer.take_diagnostics();
        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].lexeme, "@");
        assert_eq!(diagnostics[1].lexeme, "#");
        assert_eq!(diagnostics[2].kind, LexErrorKind::MalformedLiteral);
        assert!(lexer.diagnostics().is_empty());
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("  ");
        assert_eq!(lexer.next_token().unwrap().kind(), TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind(), TokenKind::Eof);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let items: Vec<_> = Lexer::new("x;").collect();
        assert_eq!(items.len(), 3);

        let items: Vec<_> = Lexer::new("x $ y").collect();
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }
}
