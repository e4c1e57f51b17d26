#[allow(non_camel_case_types)]
#[derive(Copy, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum Target {
    #[value(name = "x86_64_darwin")]
    x86_64_darwin,
    #[value(name = "x86_64_linux")]
    x86_64_linux,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&tally::codegen::Target::from(*self), f)
    }
}

impl From<Target> for tally::codegen::Target {
    fn from(value: Target) -> Self {
        match value {
            Target::x86_64_darwin => tally::codegen::Target::x86_64_darwin,
            Target::x86_64_linux => tally::codegen::Target::x86_64_linux,
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "macos")] {
        pub const DEFAULT_TARGET: Target = Target::x86_64_darwin;
    } else {
        pub const DEFAULT_TARGET: Target = Target::x86_64_linux;
    }
}
