use std::{fmt::Write, format_args as f, marker::PhantomData};

use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Program, Stmt, StmtKind},
    codegen::{
        symbol_table::{SymbolTable, FRAME_SIZE},
        x86_64_env, Error,
    },
    token::Spanned,
};

type Result<T = (), E = Spanned<Error>> = std::result::Result<T, E>;

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

/// Room for the 20 characters of `i64::MIN` plus one spare byte.
const OUTPUT_BUFFER_LEN: usize = 21;

const PRINT_ROUTINE: &str = "print_float";

/// Emits GNU assembler, Intel syntax.
///
/// Expression results are left in `xmm0` (the accumulator); `xmm1` holds the
/// left operand while a binary operator is applied.
pub struct Generator<E> {
    code: String,
    symbols: SymbolTable,
    /// Bumped once per number literal. Literals are emitted inline, so no label
    /// is actually written out.
    label_counter: usize,
    indent: bool,
    _env: PhantomData<E>,
}

impl<E> Generator<E>
where
    E: x86_64_env::Env,
{
    pub fn new() -> Generator<E> {
        Generator {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            symbols: SymbolTable::new(),
            label_counter: 0,
            indent: false,
            _env: PhantomData,
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<String> {
        self.g_program(program)?;
        Ok(self.code)
    }

    fn g_program(&mut self, program: &Program) -> Result {
        self.g_program_prologue();
        self.g_data();
        self.g_print_routine();
        self.g_entry_point(program)
    }
}

/// Target-specific functions.
impl<E> Generator<E>
where
    E: x86_64_env::Env,
{
    fn g_program_prologue(&mut self) {
        self.out(E::GLOBAL_PROLOGUE);
    }

    fn g_data(&mut self) {
        self.out(f!(".section {}", E::SECTION_DATA));
        self.out("newline:");
        self.indented(|this| this.out(".byte 10"));
        self.out("output_buffer:");
        self.indented(|this| this.out(f!(".space {OUTPUT_BUFFER_LEN}, 32")));
    }

    /// Prints the integer part of `xmm0` followed by a newline.
    ///
    /// Digits are produced ones first, filling `output_buffer` from its end
    /// backwards.
    fn g_print_routine(&mut self) {
        let write = E::SYS_WRITE;
        let end = f!("[rip + output_buffer + {OUTPUT_BUFFER_LEN}]").to_string();
        let print_loop = Self::local_label("loop");
        let print_write = Self::local_label("write");

        self.out(f!(".section {}", E::SECTION_TEXT));
        self.out(f!("{PRINT_ROUTINE}:"));
        self.indented_block(|this| {
            this.out("cvttsd2si rax, xmm0");
            this.out("mov r8, rax");
            this.out("mov rcx, 10");
            this.out(f!("lea rsi, {end}"));
            this.out("test rax, rax");
            this.out(f!("jns {print_loop}"));
            this.out("neg rax");
        });
        self.out(f!("{print_loop}:"));
        self.indented_block(|this| {
            this.out("xor edx, edx");
            this.out("div rcx");
            this.out("add dl, 48");
            this.out("dec rsi");
            this.out("mov byte ptr [rsi], dl");
            this.out("test rax, rax");
            this.out(f!("jnz {print_loop}"));
            this.out("test r8, r8");
            this.out(f!("jns {print_write}"));
            this.out("dec rsi");
            this.out("mov byte ptr [rsi], 45");
        });
        self.out(f!("{print_write}:"));
        self.indented(|this| {
            this.out(f!("lea rdx, {end}"));
            this.out("sub rdx, rsi");
            this.out(f!("mov rax, {write}"));
            this.out("mov edi, 1");
            this.out("syscall");
            this.out(f!("mov rax, {write}"));
            this.out("mov edi, 1");
            this.out("lea rsi, [rip + newline]");
            this.out("mov edx, 1");
            this.out("syscall");
            this.out("ret");
        });
    }

    /// Label inside the print routine that stays out of the symbol table.
    fn local_label(name: &str) -> String {
        format!("{}{PRINT_ROUTINE}_{name}", E::LOCAL_LABEL_PREFIX)
    }

    fn g_entry_point(&mut self, program: &Program) -> Result {
        self.out(f!(".globl {}", E::ENTRY_POINT));
        self.out(f!("{}:", E::ENTRY_POINT));
        self.indent = true;
        self.out("push rbp");
        self.out("mov rbp, rsp");
        self.out(f!("sub rsp, {FRAME_SIZE}"));
        for stmt in &program.statements {
            self.g_stmt(stmt)?;
        }
        self.out(f!("mov rax, {}", E::SYS_EXIT));
        self.out("xor edi, edi");
        self.out("syscall");
        self.indent = false;
        Ok(())
    }

    fn g_stmt(&mut self, stmt: &Stmt) -> Result {
        match &stmt.kind {
            StmtKind::VariableDeclaration { name, value } => {
                let name = name.as_str();
                self.out(f!("# let {name}"));
                self.g_expr(value)?;
                let offset = self.symbols.allocate(name).map_err(|_| {
                    stmt.span.wrap(Error::FrameExhausted {
                        name: name.into(),
                        capacity: SymbolTable::capacity(),
                    })
                })?;
                self.out(f!("movsd qword ptr [rbp - {offset}], xmm0"));
            }
            StmtKind::Print { expr } => {
                self.out("# print");
                self.g_expr(expr)?;
                self.out(f!("call {PRINT_ROUTINE}"));
            }
        }
        Ok(())
    }

    fn g_expr(&mut self, e: &Expr) -> Result {
        match &e.kind {
            ExprKind::Number(value) => {
                self.reserve_label();
                let bits = value.to_bits();
                // There are no floating-point immediates, so the bit pattern
                // goes through a general register.
                self.out(f!("movabs rax, {bits:#018x}"));
                self.out("movq xmm0, rax");
            }
            ExprKind::Identifier(ident) => {
                let name = ident.as_str();
                let Some(symbol) = self.symbols.lookup(name) else {
                    return Err(ident.span.wrap(Error::UndefinedVariable(name.into())));
                };
                let offset = symbol.offset;
                self.out(f!("movsd xmm0, qword ptr [rbp - {offset}]"));
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.g_expr(lhs)?;
                self.out("sub rsp, 8");
                self.out("movsd qword ptr [rsp], xmm0");
                self.g_expr(rhs)?;
                self.out("movsd xmm1, qword ptr [rsp]");
                self.out("add rsp, 8");
                let instr = match op {
                    BinaryOperator::Add => "addsd",
                    BinaryOperator::Sub => "subsd",
                    BinaryOperator::Mul => "mulsd",
                    BinaryOperator::Div => "divsd",
                };
                self.out(f!("{instr} xmm1, xmm0"));
                self.out("movsd xmm0, xmm1");
            }
        }
        Ok(())
    }
}

/// Utility functions.
impl<E> Generator<E> {
    /// Emits a line.
    fn out(&mut self, f: impl std::fmt::Display) {
        let indent = if self.indent { "    " } else { "" };
        writeln!(self.code, "{indent}{f}").expect("code emit should be infallible");
    }

    /// Emits an empty line.
    fn out_line(&mut self) {
        self.code.push('\n');
    }

    fn reserve_label(&mut self) {
        self.label_counter += 1;
    }

    /// Writes in an indented block that is finished with an empty line.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let res = self.indented_block(f);
        self.out_line();
        res
    }

    /// Writes in an indented block, without the trailing empty line.
    fn indented_block<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent = true;
        let res = f(self);
        self.indent = false;
        res
    }
}

impl<E> Default for Generator<E>
where
    E: x86_64_env::Env,
{
    fn default() -> Self {
        Self::new()
    }
}
