/// Per-platform details of the emitted translation unit.
///
/// Programs don't link against a C runtime: they talk to the kernel through
/// raw system calls, so the call numbers are part of the environment.
pub trait Env {
    const ENTRY_POINT: &str;

    const GLOBAL_PROLOGUE: &str;

    /// Labels with this prefix are never written to the object's symbol table.
    const LOCAL_LABEL_PREFIX: &str;

    const SECTION_TEXT: &str;
    const SECTION_DATA: &str;

    const SYS_WRITE: u64;
    const SYS_EXIT: u64;
}

impl Env for Darwin {
    const ENTRY_POINT: &str = "_main";

    const GLOBAL_PROLOGUE: &str = ".intel_syntax noprefix\n";

    const LOCAL_LABEL_PREFIX: &str = "L";

    const SECTION_TEXT: &str = "__TEXT,__text,regular,pure_instructions";
    const SECTION_DATA: &str = "__DATA,__data";

    // BSD system calls live in class 2.
    const SYS_WRITE: u64 = 0x200_0004;
    const SYS_EXIT: u64 = 0x200_0001;
}

impl Env for Linux {
    const ENTRY_POINT: &str = "_start";

    // The only section beyond data and text. It is empty and marks the stack
    // non-executable; without it `ld` warns and maps an executable stack.
    const GLOBAL_PROLOGUE: &str = concat!(
        ".intel_syntax noprefix\n",
        ".section .note.GNU-stack,\"\",@progbits\n",
    );

    const LOCAL_LABEL_PREFIX: &str = ".L";

    const SECTION_TEXT: &str = ".text";
    const SECTION_DATA: &str = ".data";

    const SYS_WRITE: u64 = 1;
    const SYS_EXIT: u64 = 60;
}

pub struct Darwin;

pub struct Linux;
