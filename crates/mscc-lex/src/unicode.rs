//! Mathematical Unicode classification.
//!
//! Two fixed tables drive the lexer's Unicode support: *constants*
//! (π, ℯ, φ, ∞) and *operators* (×, ÷, −, ±, √, arrows, comparisons, set
//! theory, calculus symbols, and the superscript/subscript digits 0-9).
//! Both are checked before digit classification so superscripts and
//! subscripts are caught as their own token kinds.
//!
//! Identifiers remain ASCII-only: Greek letters other than the constants
//! above do not lex, which is a declared limitation of the language.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::token::TokenKind;

/// A mathematical Unicode symbol known to the lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MathSymbol {
    /// Token kind the symbol lexes to.
    pub kind: TokenKind,
    /// Symbolic name. For superscript/subscript digits this is the numeric
    /// value (`"2"`), which becomes the token lexeme.
    pub name: &'static str,
    /// The source glyph.
    pub glyph: &'static str,
}

const fn sym(kind: TokenKind, name: &'static str, glyph: &'static str) -> MathSymbol {
    MathSymbol { kind, name, glyph }
}

static MATH_CONSTANTS: OnceLock<IndexMap<char, MathSymbol>> = OnceLock::new();
static MATH_OPERATORS: OnceLock<IndexMap<char, MathSymbol>> = OnceLock::new();

fn constants() -> &'static IndexMap<char, MathSymbol> {
    MATH_CONSTANTS.get_or_init(|| {
        IndexMap::from([
            ('π', sym(TokenKind::MathPi, "pi", "π")),
            ('ℯ', sym(TokenKind::MathE, "e", "ℯ")),
            ('φ', sym(TokenKind::MathPhi, "phi", "φ")),
            ('∞', sym(TokenKind::MathInfinity, "infinity", "∞")),
        ])
    })
}

fn operators() -> &'static IndexMap<char, MathSymbol> {
    MATH_OPERATORS.get_or_init(|| {
        IndexMap::from([
            ('×', sym(TokenKind::Times, "times", "×")),
            ('÷', sym(TokenKind::Div, "divide", "÷")),
            ('−', sym(TokenKind::UMinus, "minus", "−")),
            ('±', sym(TokenKind::PlusMinus, "plus_minus", "±")),
            ('√', sym(TokenKind::Sqrt, "square_root", "√")),
            ('→', sym(TokenKind::ArrowR, "arrow_right", "→")),
            ('←', sym(TokenKind::ArrowL, "arrow_left", "←")),
            ('⇒', sym(TokenKind::ArrowDouble, "arrow_double", "⇒")),
            ('↔', sym(TokenKind::ArrowBoth, "arrow_bidirectional", "↔")),
            ('≤', sym(TokenKind::Le, "less_equal", "≤")),
            ('≥', sym(TokenKind::Ge, "greater_equal", "≥")),
            ('≠', sym(TokenKind::Ne, "not_equal", "≠")),
            ('≈', sym(TokenKind::Approx, "approximately", "≈")),
            ('∝', sym(TokenKind::Proportional, "proportional", "∝")),
            ('∈', sym(TokenKind::ElementOf, "element_of", "∈")),
            ('∉', sym(TokenKind::NotElementOf, "not_element_of", "∉")),
            ('⊂', sym(TokenKind::Subset, "subset", "⊂")),
            ('⊃', sym(TokenKind::Superset, "superset", "⊃")),
            ('∪', sym(TokenKind::Union, "union", "∪")),
            ('∩', sym(TokenKind::Intersection, "intersection", "∩")),
            ('∘', sym(TokenKind::Composition, "composition", "∘")),
            ('⊙', sym(TokenKind::OdotComposition, "binary_composition", "⊙")),
            ('λ', sym(TokenKind::Lambda, "lambda", "λ")),
            ('∅', sym(TokenKind::EmptySet, "empty_set", "∅")),
            ('∑', sym(TokenKind::Summation, "summation", "∑")),
            ('∏', sym(TokenKind::Product, "product", "∏")),
            ('∫', sym(TokenKind::Integral, "integral", "∫")),
            ('∂', sym(TokenKind::Partial, "partial", "∂")),
            ('∇', sym(TokenKind::Nabla, "nabla", "∇")),
            ('Δ', sym(TokenKind::Delta, "delta", "Δ")),
            // Superscript digits carry the digit value as their name.
            ('⁰', sym(TokenKind::SuperscriptDigit, "0", "⁰")),
            ('¹', sym(TokenKind::SuperscriptDigit, "1", "¹")),
            ('²', sym(TokenKind::SuperscriptDigit, "2", "²")),
            ('³', sym(TokenKind::SuperscriptDigit, "3", "³")),
            ('⁴', sym(TokenKind::SuperscriptDigit, "4", "⁴")),
            ('⁵', sym(TokenKind::SuperscriptDigit, "5", "⁵")),
            ('⁶', sym(TokenKind::SuperscriptDigit, "6", "⁶")),
            ('⁷', sym(TokenKind::SuperscriptDigit, "7", "⁷")),
            ('⁸', sym(TokenKind::SuperscriptDigit, "8", "⁸")),
            ('⁹', sym(TokenKind::SuperscriptDigit, "9", "⁹")),
            // Subscript digits likewise.
            ('₀', sym(TokenKind::SubscriptDigit, "0", "₀")),
            ('₁', sym(TokenKind::SubscriptDigit, "1", "₁")),
            ('₂', sym(TokenKind::SubscriptDigit, "2", "₂")),
            ('₃', sym(TokenKind::SubscriptDigit, "3", "₃")),
            ('₄', sym(TokenKind::SubscriptDigit, "4", "₄")),
            ('₅', sym(TokenKind::SubscriptDigit, "5", "₅")),
            ('₆', sym(TokenKind::SubscriptDigit, "6", "₆")),
            ('₇', sym(TokenKind::SubscriptDigit, "7", "₇")),
            ('₈', sym(TokenKind::SubscriptDigit, "8", "₈")),
            ('₉', sym(TokenKind::SubscriptDigit, "9", "₉")),
        ])
    })
}

/// Looks up a mathematical constant glyph.
pub fn math_constant(c: char) -> Option<MathSymbol> {
    constants().get(&c).copied()
}

/// Looks up a mathematical operator glyph (including superscript and
/// subscript digits).
pub fn math_operator(c: char) -> Option<MathSymbol> {
    operators().get(&c).copied()
}

/// True if the character is any mathematical Unicode symbol the lexer
/// recognizes.
pub fn is_mathematical(c: char) -> bool {
    constants().contains_key(&c) || operators().contains_key(&c)
}

/// Valid first character of an identifier: ASCII letter, `_`, or `$`.
///
/// ```
/// use mscc_lex::unicode::is_ident_start;
///
/// assert!(is_ident_start('a'));
/// assert!(is_ident_start('_'));
/// assert!(is_ident_start('$'));
/// assert!(!is_ident_start('1'));
/// assert!(!is_ident_start('α'));
/// ```
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

/// Valid continuation character of an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
