use crate::{
    ast::Program,
    codegen::x86_64::Generator,
    token::Spanned,
};

pub mod symbol_table;
pub mod x86_64;
pub mod x86_64_env;

/// Translates the program into a complete assembly translation unit.
///
/// The unit is built in memory, so nothing is returned when generation fails
/// halfway through.
pub fn generate(target: Target, program: &Program) -> Result<String, Spanned<Error>> {
    type DarwinGenerator = Generator<x86_64_env::Darwin>;
    type LinuxGenerator = Generator<x86_64_env::Linux>;

    match target {
        Target::x86_64_darwin => DarwinGenerator::new().generate(program),
        Target::x86_64_linux => LinuxGenerator::new().generate(program),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// An identifier was read before any declaration of it.
    UndefinedVariable(Box<str>),
    /// More variables were declared than the stack frame can hold.
    FrameExhausted { name: Box<str>, capacity: u32 },
}

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    x86_64_darwin,
    x86_64_linux,
}

impl Target {
    pub const ALL: &[Target] = &[Target::x86_64_darwin, Target::x86_64_linux];

    pub const fn triple(&self) -> &'static str {
        match self {
            Target::x86_64_darwin => "x86_64-apple-darwin",
            Target::x86_64_linux => "x86_64-unknown-linux-gnu",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::x86_64_darwin => f.write_str("x86_64_darwin"),
            Target::x86_64_linux => f.write_str("x86_64_linux"),
        }
    }
}
