//! Token model for MathScript.
//!
//! A token is `{kind, lexeme, line, column, unicode_name?}`. The kind set is
//! closed and partitioned into literals, mathematical constants and
//! operators, keywords, ASCII operators, punctuation, and the `Eof` /
//! `Newline` markers. Superscript and subscript digits carry the numeric
//! value in `lexeme` and the glyph in `unicode_name`, so the parser can
//! treat `x²` as exponentiation and `x₂` as a name suffix without touching
//! Unicode itself.

use std::sync::OnceLock;

use mscc_util::Span;
use rustc_hash::FxHashMap;

/// The closed set of token kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    TemplateString,
    TemplateStart,
    TemplateMiddle,
    TemplateEnd,
    TemplateExpr,

    // Mathematical constants
    MathPi,
    MathE,
    MathPhi,
    MathInfinity,

    // Mathematical operators (Unicode)
    Times,
    Div,
    UMinus,
    PlusMinus,
    Sqrt,
    ArrowR,
    ArrowL,
    ArrowDouble,
    ArrowBoth,
    Le,
    Ge,
    Ne,
    Approx,
    Proportional,
    ElementOf,
    NotElementOf,
    Subset,
    Superset,
    Union,
    Intersection,
    Composition,
    OdotComposition,
    Lambda,
    EmptySet,
    Summation,
    Product,
    Integral,
    Partial,
    Nabla,
    Delta,
    SuperscriptDigit,
    SubscriptDigit,

    // Keywords
    Let,
    Const,
    Var,
    Function,
    Class,
    Struct,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    This,
    Extends,
    Static,
    True,
    False,
    Null,
    Undefined,
    Of,
    In,
    Instanceof,
    Typeof,
    Void,
    Delete,
    Async,
    Await,
    Yield,
    Import,
    Export,
    From,
    Default,
    As,
    Fast,
    Match,
    When,
    Neural,
    Tensor,
    Simd,
    Parallel,
    CpuFriendly,

    // Numeric type keywords (consumed only by type-annotation parsing)
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Real,
    Complex,

    // Identifiers
    Identifier,

    // ASCII operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    EqEq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    AndAnd,
    OrOr,
    And,
    Or,
    Not,
    Increment,
    Decrement,
    Arrow,
    Pipeline,
    ReversePipeline,
    DotDot,
    DotDotDot,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    Question,

    // Special
    Newline,
    Eof,
}

/// A single lexical unit with its source position.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The token text. For superscript/subscript digits this is the numeric
    /// value (`"2"`), not the glyph.
    pub lexeme: String,
    /// Line the token starts on (1-based).
    pub line: u32,
    /// Column the token starts on (1-based).
    pub column: u32,
    /// Symbolic name of a mathematical Unicode token, or the original glyph
    /// for superscript/subscript digits.
    pub unicode_name: Option<&'static str>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
            unicode_name: None,
        }
    }

    pub fn eof(line: u32, column: u32) -> Self {
        Self::new(TokenKind::Eof, "", line, column)
    }

    /// Position of this token as a span.
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }
}

static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();

/// Looks up a reserved word, returning its keyword kind or `None` for a
/// plain identifier.
pub fn keyword_from_ident(text: &str) -> Option<TokenKind> {
    let table = KEYWORDS.get_or_init(|| {
        let mut m = FxHashMap::default();
        // JavaScript core
        m.insert("let", TokenKind::Let);
        m.insert("const", TokenKind::Const);
        m.insert("var", TokenKind::Var);
        m.insert("function", TokenKind::Function);
        m.insert("class", TokenKind::Class);
        m.insert("struct", TokenKind::Struct);
        m.insert("if", TokenKind::If);
        m.insert("else", TokenKind::Else);
        m.insert("for", TokenKind::For);
        m.insert("while", TokenKind::While);
        m.insert("do", TokenKind::Do);
        m.insert("break", TokenKind::Break);
        m.insert("continue", TokenKind::Continue);
        m.insert("return", TokenKind::Return);
        m.insert("try", TokenKind::Try);
        m.insert("catch", TokenKind::Catch);
        m.insert("finally", TokenKind::Finally);
        m.insert("throw", TokenKind::Throw);
        m.insert("new", TokenKind::New);
        m.insert("this", TokenKind::This);
        m.insert("extends", TokenKind::Extends);
        m.insert("static", TokenKind::Static);
        m.insert("true", TokenKind::True);
        m.insert("false", TokenKind::False);
        m.insert("null", TokenKind::Null);
        m.insert("undefined", TokenKind::Undefined);
        m.insert("of", TokenKind::Of);
        m.insert("in", TokenKind::In);
        m.insert("instanceof", TokenKind::Instanceof);
        m.insert("typeof", TokenKind::Typeof);
        m.insert("void", TokenKind::Void);
        m.insert("delete", TokenKind::Delete);
        m.insert("async", TokenKind::Async);
        m.insert("await", TokenKind::Await);
        m.insert("yield", TokenKind::Yield);
        m.insert("import", TokenKind::Import);
        m.insert("export", TokenKind::Export);
        m.insert("from", TokenKind::From);
        m.insert("default", TokenKind::Default);
        m.insert("as", TokenKind::As);
        // Mathematical extensions
        m.insert("fast", TokenKind::Fast);
        m.insert("match", TokenKind::Match);
        m.insert("when", TokenKind::When);
        m.insert("neural", TokenKind::Neural);
        m.insert("tensor", TokenKind::Tensor);
        m.insert("simd", TokenKind::Simd);
        m.insert("parallel", TokenKind::Parallel);
        m.insert("cpu_friendly", TokenKind::CpuFriendly);
        // Numeric types
        m.insert("int8", TokenKind::Int8);
        m.insert("int16", TokenKind::Int16);
        m.insert("int32", TokenKind::Int32);
        m.insert("int64", TokenKind::Int64);
        m.insert("uint8", TokenKind::Uint8);
        m.insert("uint16", TokenKind::Uint16);
        m.insert("uint32", TokenKind::Uint32);
        m.insert("uint64", TokenKind::Uint64);
        m.insert("float32", TokenKind::Float32);
        m.insert("float64", TokenKind::Float64);
        m.insert("real", TokenKind::Real);
        m.insert("complex", TokenKind::Complex);
        m
    });
    table.get(text).copied()
}

impl TokenKind {
    /// True for the numeric type keywords accepted in type annotations.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Int8
                | TokenKind::Int16
                | TokenKind::Int32
                | TokenKind::Int64
                | TokenKind::Uint8
                | TokenKind::Uint16
                | TokenKind::Uint32
                | TokenKind::Uint64
                | TokenKind::Float32
                | TokenKind::Float64
                | TokenKind::Real
                | TokenKind::Complex
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_resolve() {
        assert_eq!(keyword_from_ident("let"), Some(TokenKind::Let));
        assert_eq!(keyword_from_ident("function"), Some(TokenKind::Function));
        assert_eq!(keyword_from_ident("fast"), Some(TokenKind::Fast));
        assert_eq!(keyword_from_ident("undefined"), Some(TokenKind::Undefined));
        assert_eq!(keyword_from_ident("float64"), Some(TokenKind::Float64));
    }

    #[test]
    fn non_keywords_do_not_resolve() {
        assert_eq!(keyword_from_ident("radius"), None);
        assert_eq!(keyword_from_ident("Let"), None);
        assert_eq!(keyword_from_ident(""), None);
    }

    #[test]
    fn type_keyword_predicate() {
        assert!(TokenKind::Int32.is_type_keyword());
        assert!(TokenKind::Complex.is_type_keyword());
        assert!(!TokenKind::Identifier.is_type_keyword());
        assert!(!TokenKind::Let.is_type_keyword());
    }

    #[test]
    fn token_span_matches_position() {
        let tok = Token::new(TokenKind::Identifier, "x", 4, 9);
        assert_eq!(tok.span(), Span::new(4, 9));
    }
}
