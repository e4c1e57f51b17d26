/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The code generator takes an AST, mapping it into assembly text.
pub mod codegen;

pub mod ast;
pub mod token;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

use crate::{codegen::Target, token::Spanned};

/// Runs the whole pipeline over `src`, returning the assembly text.
///
/// The first error stops the pipeline. Parser warnings are logged and
/// otherwise dropped; use [`parser::parse_program`] directly to inspect them.
pub fn compile(src: &str, target: Target) -> Result<String, Error> {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let parsed = parser::parse_program(src, &mut tokens)?;
    let asm = codegen::generate(target, &parsed.tree)?;
    Ok(asm)
}

/// Any error that aborts [`compile`].
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Parse(Spanned<parser::Error>),
    Codegen(Spanned<codegen::Error>),
}

impl From<Spanned<parser::Error>> for Error {
    fn from(error: Spanned<parser::Error>) -> Self {
        Error::Parse(error)
    }
}

impl From<Spanned<codegen::Error>> for Error {
    fn from(error: Spanned<codegen::Error>) -> Self {
        Error::Codegen(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(error) => write!(f, "parse error at {error:#}"),
            Error::Codegen(error) => write!(f, "codegen error at {error:#}"),
        }
    }
}

impl std::error::Error for Error {}
