// program ::= statement*
// statement ::= 'let' ID '=' expr ';'
//             | 'print' '(' expr ')' ';'
// expr ::= term (('+' | '-') term)*
// term ::= factor (('*' | '/') factor)*
// factor ::= NUMBER
//          | ID
//          | '(' expr ')'

// Precedence
//
// * /
// + -

use crate::token::Span;

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    /// Statements in source order.
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    VariableDeclaration { name: Ident, value: Expr },
    Print { expr: Expr },
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Identifier(Ident),
    Number(f64),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, PartialEq)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.name
    }
}
