use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, ValueEnum};
use tally::{codegen, lexer::SUGGESTED_TOKENS_CAPACITY, parser, util::fmt::print_program_string};

use crate::target::Target;

mod link;
mod target;

/// Compiles a tally program into assembly, an object file or an executable.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Where to write the result. Defaults to the input's file stem.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce.
    #[arg(long, value_enum, default_value_t = Emit::Exe)]
    emit: Emit,

    #[arg(long, value_enum, default_value_t = target::DEFAULT_TARGET)]
    target: Target,

    /// Dumps the tokens and the syntax tree, and keeps intermediate files.
    #[arg(short, long)]
    debug: bool,

    /// Raises the log level. May be repeated.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Emit {
    Asm,
    Obj,
    Exe,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("tallyc: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let input = &cli.input;
    let src = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    let parsed = parser::parse_program(&src, &mut tokens)
        .map_err(tally::Error::from)
        .with_context(|| format!("compiling {}", input.display()))?;

    if cli.debug {
        for token in &tokens {
            log::debug!("token {} {}", token.span(), token.kind);
        }
        log::debug!("syntax tree:\n{}", print_program_string(&parsed.tree));
    }

    let target = codegen::Target::from(cli.target);
    let asm = codegen::generate(target, &parsed.tree)
        .map_err(tally::Error::from)
        .with_context(|| format!("compiling {}", input.display()))?;

    let output = cli.output.clone().unwrap_or_else(|| default_output(input, cli.emit));
    let asm_path = match cli.emit {
        Emit::Asm => output.clone(),
        Emit::Obj | Emit::Exe => output.with_extension("s"),
    };
    let obj_path = match cli.emit {
        Emit::Obj => output.clone(),
        Emit::Asm | Emit::Exe => output.with_extension("o"),
    };
    ensure_not_input(input, &asm_path)?;
    if cli.emit != Emit::Asm {
        ensure_not_input(input, &obj_path)?;
        ensure_not_input(input, &output)?;
    }

    fs::write(&asm_path, asm).with_context(|| format!("writing {}", asm_path.display()))?;
    log::info!("wrote {} for {}", asm_path.display(), target.triple());
    if cli.emit == Emit::Asm {
        return Ok(());
    }

    link::assemble(cli.target, &asm_path, &obj_path)?;
    if cli.emit == Emit::Exe {
        link::link(cli.target, &obj_path, &output)?;
    }

    if !cli.debug {
        remove_intermediate(&asm_path);
        if cli.emit == Emit::Exe {
            remove_intermediate(&obj_path);
        }
    }
    Ok(())
}

/// Derives the output from the input's file stem, in the working directory.
/// Falls back to `a.s`, `a.o` or `a.out` when that would name the input itself.
fn default_output(input: &Path, emit: Emit) -> PathBuf {
    let stem = input.file_stem().map_or_else(|| "a".into(), PathBuf::from);
    let (output, fallback) = match emit {
        Emit::Asm => (stem.with_extension("s"), "a.s"),
        Emit::Obj => (stem.with_extension("o"), "a.o"),
        Emit::Exe => (stem, "a.out"),
    };
    if output == input {
        PathBuf::from(fallback)
    } else {
        output
    }
}

/// Fails if writing `path` would clobber the source being compiled.
fn ensure_not_input(input: &Path, path: &Path) -> anyhow::Result<()> {
    let same = path == input
        || matches!(
            (fs::canonicalize(input), fs::canonicalize(path)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        bail!("refusing to overwrite the input file {}", input.display());
    }
    Ok(())
}

fn remove_intermediate(path: &Path) {
    if let Err(error) = fs::remove_file(path) {
        log::warn!("failed to remove {}: {error}", path.display());
    }
}

fn initialize_logging(cli: &Cli) {
    let level = match (cli.verbose, cli.debug) {
        (0, false) => log::LevelFilter::Warn,
        (0 | 1, true) | (2, _) => log::LevelFilter::Debug,
        (1, false) => log::LevelFilter::Info,
        _ => log::LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .ok();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_output() {
        let cases = [
            ("prog.tl", Emit::Exe, "prog"),
            ("prog.tl", Emit::Asm, "prog.s"),
            ("prog.tl", Emit::Obj, "prog.o"),
            ("src/prog.tl", Emit::Exe, "prog"),
            ("prog", Emit::Exe, "a.out"),
            ("prog.s", Emit::Asm, "a.s"),
            ("prog.o", Emit::Obj, "a.o"),
        ];
        for (input, emit, expected) in cases {
            assert_eq!(default_output(Path::new(input), emit), Path::new(expected), "{input}");
        }
    }

    #[test]
    fn test_input_is_never_an_output() {
        let dir = std::env::temp_dir().join(format!("tallyc-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("prog");
        fs::write(&input, "print(1);").unwrap();

        assert!(ensure_not_input(&input, &input).is_err());
        // Same file through a different spelling.
        let error = ensure_not_input(&input, &dir.join(".").join("prog")).unwrap_err();
        assert!(error.to_string().starts_with("refusing to overwrite the input file"));
        assert!(ensure_not_input(&input, &dir.join("prog.s")).is_ok());

        fs::remove_dir_all(&dir).ok();
    }
}
