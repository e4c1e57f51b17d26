use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Ident, Program, Stmt, StmtKind},
    lexer,
    token::{Spanned, Token, TokenKind},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parsing is fail-fast: the first error aborts the whole parse, and no
/// partial tree is returned.
pub type ParseResult<T> = Result<Parsed<T>>;

/// How deep parenthesized expressions may nest before parsing gives up.
pub const MAX_NESTING_DEPTH: u32 = 256;

/// A successfully parsed tree, along with the non-fatal diagnostics collected
/// while building it.
#[derive(Debug, PartialEq)]
pub struct Parsed<T> {
    pub tree: T,
    pub warnings: Vec<Spanned<Warning>>,
}

pub fn parse_program(src: &str, tokens: &mut Vec<Token>) -> ParseResult<Program> {
    parse(src, tokens, Parser::parse_program)
}

/// Parses a single expression, which must span the entire input.
pub fn parse_expr(src: &str, tokens: &mut Vec<Token>) -> ParseResult<Expr> {
    parse(src, tokens, |p| {
        let expr = p.parse_expr()?;
        p.expect_eof()?;
        Ok(expr)
    })
}

fn parse<'tok, T>(
    src: &str,
    tokens: &'tok mut Vec<Token>,
    f: impl for<'a> FnOnce(&'a mut Parser<'tok>) -> Result<T>,
) -> ParseResult<T> {
    assert!(tokens.is_empty());

    lexer::lex(src, tokens);
    let mut p = Parser::new(src, tokens);
    let tree = f(&mut p)?;

    Ok(Parsed {
        tree,
        warnings: p.warnings,
    })
}

struct Parser<'tok> {
    tokens: &'tok [Token],
    /// Returned by [`Parser::peek`] once `tokens` is exhausted.
    eof: Token,
    cursor: usize,
    /// Currently open parentheses.
    depth: u32,
    warnings: Vec<Spanned<Warning>>,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::with_capacity(16);
        while !self.peek().is_eof() {
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }
        Ok(Program { statements })
    }

    /// Parses a statement. Tokens that can't start one are skipped (and
    /// reported as a warning), in which case `None` is returned.
    fn parse_statement(&mut self) -> Result<Option<Stmt>> {
        match self.peek().kind {
            TokenKind::Let => self.parse_variable_declaration().map(Some),
            TokenKind::Print => self.parse_print().map(Some),
            _ => {
                let skipped = self.advance();
                log::warn!(
                    "{}: skipping token {} at statement position",
                    skipped.span(),
                    skipped.kind
                );
                let span = skipped.span();
                let warning = Warning::SkippedToken(skipped.kind);
                self.warnings.push(span.wrap(warning));
                Ok(None)
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<Stmt> {
        let start = self.consume(&TokenKind::Let)?;
        let name = self.parse_ident()?;
        self.consume(&TokenKind::Equals)?;
        let value = self.parse_expr()?;
        let end = self.consume(&TokenKind::Semicolon)?;

        Ok(Stmt {
            kind: StmtKind::VariableDeclaration { name, value },
            span: start.span().to(end.span()),
        })
    }

    fn parse_print(&mut self) -> Result<Stmt> {
        let start = self.consume(&TokenKind::Print)?;
        self.consume(&TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.consume(&TokenKind::RParen)?;
        let end = self.consume(&TokenKind::Semicolon)?;

        Ok(Stmt {
            kind: StmtKind::Print { expr },
            span: start.span().to(end.span()),
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(&TokenKind::Identifier(Box::default()))?;
        let span = token.span();
        let TokenKind::Identifier(name) = token.kind else {
            unreachable!("consumed an identifier");
        };
        Ok(Ident { name, span })
    }

    /// expr ::= term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance(); // Operator
            let rhs = self.parse_term()?;
            lhs = Self::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// term ::= factor (('*' | '/') factor)*
    fn parse_term(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                _ => break,
            };
            self.advance(); // Operator
            let rhs = self.parse_factor()?;
            lhs = Self::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// factor ::= NUMBER | ID | '(' expr ')'
    ///
    /// Parentheses only group; they don't produce a node of their own.
    fn parse_factor(&mut self) -> Result<Expr> {
        let token = self.advance();
        let span = token.span();
        let kind = match token.kind {
            TokenKind::Number(value) => ExprKind::Number(value),
            TokenKind::Identifier(name) => ExprKind::Identifier(Ident { name, span }),
            TokenKind::LParen => {
                if self.depth == MAX_NESTING_DEPTH {
                    return Err(span.wrap(Error::NestingTooDeep {
                        limit: MAX_NESTING_DEPTH,
                    }));
                }
                self.depth += 1;
                let expr = self.parse_expr()?;
                self.consume(&TokenKind::RParen)?;
                self.depth -= 1;
                return Ok(expr);
            }
            actual => {
                return Err(span.wrap(Error::UnexpectedInFactor { actual }));
            }
        };
        Ok(Expr { kind, span })
    }

    fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span.to(rhs.span);
        Expr {
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        }
    }
}

impl<'tok> Parser<'tok> {
    fn new(src: &str, tokens: &'tok [Token]) -> Parser<'tok> {
        Parser {
            tokens,
            eof: Token::eof_for(src),
            cursor: 0,
            depth: 0,
            warnings: Vec::new(),
        }
    }

    /// Returns the current token, or the end-of-input token once the sequence
    /// is exhausted.
    #[inline]
    fn peek(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token {
        let c = self.peek().clone();
        if !c.is_eof() {
            self.cursor += 1;
        }
        c
    }

    /// Checks whether the current token is of the same kind as the given one.
    /// Payloads are ignored.
    fn is(&self, expect: &TokenKind) -> bool {
        self.peek().kind.same_kind(expect)
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, fails with the expected and actual token kinds.
    fn consume(&mut self, expect: &TokenKind) -> Result<Token> {
        if self.is(expect) {
            Ok(self.advance())
        } else {
            let c = self.peek();
            Err(c.span().wrap(Error::Unexpected {
                expected: expect.name(),
                actual: c.kind.clone(),
            }))
        }
    }

    fn expect_eof(&self) -> Result<()> {
        let c = self.peek();
        if c.is_eof() {
            Ok(())
        } else {
            Err(c.span().wrap(Error::TrailingInput {
                actual: c.kind.clone(),
            }))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    Unexpected {
        expected: &'static str,
        actual: TokenKind,
    },
    /// No factor rule matches the current token.
    UnexpectedInFactor {
        actual: TokenKind,
    },
    TrailingInput {
        actual: TokenKind,
    },
    NestingTooDeep {
        limit: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A token which can't start a statement was found at statement position.
    SkippedToken(TokenKind),
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{token::Span, util::test_utils::tree_tests};

    fn nested(depth: usize) -> String {
        format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn test_nesting_up_to_the_limit() {
        let src = nested(MAX_NESTING_DEPTH as usize);
        let parsed = parse_expr(&src, &mut Vec::new()).expect("failed to parse");
        assert_eq!(parsed.tree.kind, ExprKind::Number(1.0));
    }

    #[test]
    fn test_nesting_too_deep() {
        let limit = MAX_NESTING_DEPTH as usize;
        let src = format!("print({});", nested(200_000));
        let error = parse_program(&src, &mut Vec::new()).unwrap_err();
        assert_eq!(error.inner, Error::NestingTooDeep { limit: MAX_NESTING_DEPTH });
        // The offending parenthesis is the first one past the limit.
        let lo = "print(".len() + limit;
        assert_eq!(error.span, Span::new_of_bounds(lo..lo + 1));
        assert_eq!(
            format!("{error:#}"),
            format!("{lo}..{}: parentheses nested deeper than 256 levels", lo + 1)
        );
    }

    tree_tests!(
        use parser;

        fn test_simple_expression() {
            let expr = "(1 * 2 + 3) - (1 + 2 * 3)";
            let tree_ok = "
                binary Sub (1..24)
                  binary Add (1..10)
                    binary Mul (1..6)
                      number 1 (1..2)
                      number 2 (5..6)
                    number 3 (9..10)
                  binary Add (15..24)
                    number 1 (15..16)
                    binary Mul (19..24)
                      number 2 (19..20)
                      number 3 (23..24)
            ";
        }

        fn test_identifier_expr() {
            let expr = "myVar";
            let tree_ok = "ident myVar (0..5)";
        }

        fn test_number_literal_expr() {
            let expr = "12345";
            let tree_ok = "number 12345 (0..5)";
        }

        fn test_redundant_parens_are_transparent() {
            let expr = "(((1)))";
            let tree_ok = "number 1 (3..4)";
        }

        fn test_binary_addition_expr() {
            let expr = "a + b";
            let tree_ok = "
                binary Add (0..5)
                  ident a (0..1)
                  ident b (4..5)
            ";
        }

        fn test_binary_subtraction_expr() {
            let expr = "a - b";
            let tree_ok = "
                binary Sub (0..5)
                  ident a (0..1)
                  ident b (4..5)
            ";
        }

        fn test_binary_multiplication_expr() {
            let expr = "a * b";
            let tree_ok = "
                binary Mul (0..5)
                  ident a (0..1)
                  ident b (4..5)
            ";
        }

        fn test_binary_division_expr() {
            let expr = "a / b";
            let tree_ok = "
                binary Div (0..5)
                  ident a (0..1)
                  ident b (4..5)
            ";
        }

        fn test_precedence_plus_mul() {
            let expr = "2 + 3 * 4";
            let tree_ok = "
                binary Add (0..9)
                  number 2 (0..1)
                  binary Mul (4..9)
                    number 3 (4..5)
                    number 4 (8..9)
            ";
        }

        fn test_precedence_mul_plus() {
            let expr = "2 * 3 + 4";
            let tree_ok = "
                binary Add (0..9)
                  binary Mul (0..5)
                    number 2 (0..1)
                    number 3 (4..5)
                  number 4 (8..9)
            ";
        }

        fn test_parens_override_precedence() {
            let expr = "(2 + 3) * 4";
            let tree_ok = "
                binary Mul (1..11)
                  binary Add (1..6)
                    number 2 (1..2)
                    number 3 (5..6)
                  number 4 (10..11)
            ";
        }

        fn test_subtraction_is_left_associative() {
            let expr = "10 - 3 - 2";
            let tree_ok = "
                binary Sub (0..10)
                  binary Sub (0..6)
                    number 10 (0..2)
                    number 3 (5..6)
                  number 2 (9..10)
            ";
        }

        fn test_division_is_left_associative() {
            let expr = "8 / 4 / 2";
            let tree_ok = "
                binary Div (0..9)
                  binary Div (0..5)
                    number 8 (0..1)
                    number 4 (4..5)
                  number 2 (8..9)
            ";
        }

        fn test_error_missing_factor() {
            let expr = "1 +";
            let expected_error = "3..3: expected NUMBER, IDENTIFIER or LPAREN, but got EOF";
        }

        fn test_error_unknown_in_factor() {
            let expr = "1 + $";
            let expected_error = "4..5: expected NUMBER, IDENTIFIER or LPAREN, but got UNKNOWN('$')";
        }

        fn test_error_unclosed_paren() {
            let expr = "(1 + 2";
            let expected_error = "6..6: expected RPAREN, but got EOF";
        }

        fn test_error_trailing_input() {
            let expr = "1 2";
            let expected_error = "2..3: unexpected trailing token NUMBER(2)";
        }
    );

    tree_tests!(
        use parser;

        fn test_empty_program() {
            let program = "";
            let tree_ok = "";
        }

        fn test_variable_declaration() {
            let program = "let x = 2 + 3 * 4;";
            let tree_ok = "
                let x (0..18)
                  binary Add (8..17)
                    number 2 (8..9)
                    binary Mul (12..17)
                      number 3 (12..13)
                      number 4 (16..17)
            ";
        }

        fn test_print_statement() {
            let program = "print(x);";
            let tree_ok = "
                print (0..9)
                  ident x (6..7)
            ";
        }

        fn test_statements_keep_source_order() {
            let program = "let a = 5; let b = 2; print(a * b + 1);";
            let tree_ok = "
                let a (0..10)
                  number 5 (8..9)
                let b (11..21)
                  number 2 (19..20)
                print (22..39)
                  binary Add (28..37)
                    binary Mul (28..33)
                      ident a (28..29)
                      ident b (32..33)
                    number 1 (36..37)
            ";
        }

        fn test_identifiers_are_not_resolved_while_parsing() {
            let program = "print(undeclared);";
            let tree_ok = "
                print (0..18)
                  ident undeclared (6..16)
            ";
        }

        fn test_skipped_tokens_between_statements() {
            let program = "; $ let a = 1; x print(a);";
            let tree_ok = "
                let a (4..14)
                  number 1 (12..13)
                print (17..26)
                  ident a (23..24)
            ";
            let expected_warnings = &[
                "0..1: skipped token SEMICOLON at statement position",
                "2..3: skipped token UNKNOWN('$') at statement position",
                "15..16: skipped token IDENTIFIER(x) at statement position",
            ];
        }

        fn test_error_missing_semicolon() {
            let program = "let x = 1 print(x);";
            let expected_error = "10..15: expected SEMICOLON, but got PRINT";
        }

        fn test_error_missing_name() {
            let program = "let = 1;";
            let expected_error = "4..5: expected IDENTIFIER, but got EQUALS";
        }

        fn test_error_keyword_as_name() {
            let program = "let print = 1;";
            let expected_error = "4..9: expected IDENTIFIER, but got PRINT";
        }

        fn test_error_print_without_parens() {
            let program = "print x;";
            let expected_error = "6..7: expected LPAREN, but got IDENTIFIER(x)";
        }

        fn test_error_first_error_wins() {
            let program = "let = 1; print(;";
            let expected_error = "4..5: expected IDENTIFIER, but got EQUALS";
        }

        fn test_error_truncated_declaration() {
            let program = "let x =";
            let expected_error = "7..7: expected NUMBER, IDENTIFIER or LPAREN, but got EOF";
        }
    );
}
