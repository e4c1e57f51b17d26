use std::{path::Path, process::Command};

use anyhow::{bail, Context, Result};

use crate::target::Target;

/// Lowest macOS release the linked executables claim to support.
const DARWIN_PLATFORM_VERSION: &str = "11.0";

/// Runs the system assembler over the emitted assembly text.
pub fn assemble(target: Target, asm: &Path, obj: &Path) -> Result<()> {
    let assembler = which::which("as").context("assembler `as` not found in PATH")?;
    let mut cmd = Command::new(assembler);
    if target == Target::x86_64_darwin {
        cmd.args(["-arch", "x86_64"]);
    }
    cmd.arg("-o").arg(obj).arg(asm);
    run(cmd, "as")
}

/// Links the object into a standalone executable. No C runtime is pulled in
/// on Linux; macOS requires libSystem regardless.
pub fn link(target: Target, obj: &Path, exe: &Path) -> Result<()> {
    let linker = which::which("ld").context("linker `ld` not found in PATH")?;
    let mut cmd = Command::new(linker);
    match target {
        Target::x86_64_linux => {
            cmd.arg("-o").arg(exe).arg(obj);
        }
        Target::x86_64_darwin => {
            let sdk = Command::new("xcrun")
                .args(["--sdk", "macosx", "--show-sdk-path"])
                .output()
                .context("failed to locate the macOS SDK with xcrun")?
                .stdout;
            let sdk = String::from_utf8(sdk)?;
            cmd.arg("-o")
                .arg(exe)
                .args(["-arch", "x86_64", "-platform_version", "macos"])
                .args([DARWIN_PLATFORM_VERSION, DARWIN_PLATFORM_VERSION])
                .args(["-syslibroot", sdk.trim(), "-e", "_main"])
                .arg(obj)
                .arg("-lSystem");
        }
    }
    run(cmd, "ld")
}

fn run(mut cmd: Command, tool: &str) -> Result<()> {
    log::debug!("running {cmd:?}");
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {tool}"))?;
    log::info!("{tool} exited with {status}");
    if !status.success() {
        bail!("{tool} failed ({status})");
    }
    Ok(())
}
