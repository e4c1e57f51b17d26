use std::fmt;

use crate::{codegen, parser, token::Spanned};

/// The alternate form (`{:#}`) prefixes the message with the span.
impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Spanned { span, inner } = self;

        if f.alternate() {
            write!(f, "{span}: ")?;
        }
        write!(f, "{inner}")
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for Spanned<T> {}

impl fmt::Display for parser::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use parser::Error::*;
        match self {
            Unexpected { expected, actual } => {
                write!(f, "expected {expected}, but got {actual}")
            }
            UnexpectedInFactor { actual } => {
                write!(f, "expected NUMBER, IDENTIFIER or LPAREN, but got {actual}")
            }
            TrailingInput { actual } => write!(f, "unexpected trailing token {actual}"),
            NestingTooDeep { limit } => {
                write!(f, "parentheses nested deeper than {limit} levels")
            }
        }
    }
}

impl fmt::Display for parser::Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            parser::Warning::SkippedToken(kind) => {
                write!(f, "skipped token {kind} at statement position")
            }
        }
    }
}

impl fmt::Display for codegen::Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use codegen::Error::*;
        match self {
            UndefinedVariable(name) => write!(f, "undefined variable {name}"),
            FrameExhausted { name, capacity } => write!(
                f,
                "no stack slot left for variable {name} (frame holds {capacity} variables)"
            ),
        }
    }
}
