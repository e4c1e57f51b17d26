use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tally::{
    codegen::{self, Target},
    lexer, parser,
};

// Stays below the 32 slots of the frame.
fn input() -> String {
    let mut src: String = (0..32)
        .map(|i| format!("let v{i} = ({i} + 1) * 3 / 2 - 1;\n"))
        .collect();
    for i in 0..2_000 {
        src += &format!("print(v{} * (v{} - 4) / 2);\n", i % 32, (i + 7) % 32);
    }
    src
}

fn criterion_benchmark(c: &mut Criterion) {
    let input = input();
    c.bench_function("parse_program", |b| {
        let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
        b.iter(|| {
            tokens.clear();
            let parsed = parser::parse_program(black_box(&input), &mut tokens).unwrap();
            black_box(parsed.tree.statements.len())
        });
    });

    let mut tokens = Vec::new();
    let program = parser::parse_program(&input, &mut tokens).unwrap().tree;
    c.bench_function("generate", |b| {
        b.iter(|| black_box(codegen::generate(Target::x86_64_linux, black_box(&program)).unwrap()));
    });

    c.bench_function("compile", |b| {
        b.iter(|| black_box(tally::compile(black_box(&input), Target::x86_64_linux).unwrap()));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
