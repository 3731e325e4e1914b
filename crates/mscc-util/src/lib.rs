//! mscc-util - Shared infrastructure for the MathScript compiler.
//!
//! This crate holds the pieces every compilation phase needs: source
//! positions ([`Span`]), the typed error hierarchy ([`LexError`],
//! [`ParseError`], [`GenError`], [`CompileError`]), and the context-excerpt
//! rendering used by lexer diagnostics.
//!
//! Nothing here is phase-specific. The lexer, parser, and generator crates
//! all depend on this crate and on nothing else of each other except the
//! phase directly upstream.

pub mod diagnostic;
pub mod error;
pub mod span;

pub use diagnostic::excerpt;
pub use error::{CompileError, GenError, LexError, ParseError};
pub use span::Span;
