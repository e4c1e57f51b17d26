use crate::{
    parser::{self, Parsed},
    token::Spanned,
    util::fmt::tree,
};

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    ParserExpr(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedError(&'static str),
    ExpectedWarnings(&'static [&'static str]),
}

/// What a pipeline run produced, already formatted.
pub struct Outcome {
    pub tree: String,
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

pub fn format_all<T: std::fmt::Display>(items: &[Spanned<T>]) -> Vec<String> {
    items.iter().map(|item| format!("{item:#}")).collect()
}

#[track_caller]
pub fn run_pipeline(test: Test) -> Outcome {
    let tokens_buf = &mut Vec::with_capacity(256);

    match test {
        Test::ParserProgram(input) => match parser::parse_program(input, tokens_buf) {
            Ok(Parsed { tree, warnings }) => Outcome {
                tree: tree::print_program_string(&tree),
                error: None,
                warnings: format_all(&warnings),
            },
            Err(error) => Outcome::failed(&error),
        },
        Test::ParserExpr(input) => match parser::parse_expr(input, tokens_buf) {
            Ok(Parsed { tree, warnings }) => Outcome {
                tree: tree::print_expr_string(&tree),
                error: None,
                warnings: format_all(&warnings),
            },
            Err(error) => Outcome::failed(&error),
        },
    }
}

impl Outcome {
    fn failed(error: &Spanned<parser::Error>) -> Outcome {
        Outcome {
            tree: String::new(),
            error: Some(format!("{error:#}")),
            warnings: Vec::new(),
        }
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, outcome: &Outcome) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            ::pretty_assertions::assert_eq!(outcome.error, None);
            ::pretty_assertions::assert_eq!(outcome.tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedError(expected_error) => {
            ::pretty_assertions::assert_eq!(outcome.error.as_deref(), Some(expected_error));
        }
        Assertion::ExpectedWarnings(expected_warnings) => {
            ::pretty_assertions::assert_eq!(outcome.warnings, expected_warnings);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let outcome = crate::util::test_utils::run_pipeline(test);
                tree_tests!(@@expand_assertions, &outcome, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $outcome:expr, []) => {};
    (@@expand_assertions, $outcome:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $outcome,
        );
        tree_tests!(@@expand_assertions, $outcome, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_error, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedError($expected)
    };
    (@@assertion, expected_warnings, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedWarnings($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(parser, expr), $source:expr) => {
        crate::util::test_utils::Test::ParserExpr($source)
    };
}
pub(crate) use tree_tests;
