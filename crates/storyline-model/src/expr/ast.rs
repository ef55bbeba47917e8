//! Syntax tree of guard/effect expressions

use crate::value::Value;

/// Top-level statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `new NAME`
    Declare(String),
    /// `del NAME`
    Undeclare(String),
    /// `base.attr = value`, `+=`, `-=`
    Assign {
        /// Expression yielding the owning term
        base: Expr,
        /// Attribute written
        attribute: String,
        /// Assignment flavour
        op: AssignOp,
        /// Right-hand side
        value: Expr,
    },
    /// Plain expression evaluated for its value
    Expr(Expr),
}

/// Assignment operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `-=`
    Remove,
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal value
    Literal(Value),
    /// Bare name: a term, alias or the scenario namespace
    Name(String),
    /// Step argument substitution
    Placeholder {
        /// `@{..}` rather than `${..}`
        variadic: bool,
        /// Formal argument name
        name: String,
    },
    /// `base.name`
    Attribute(Box<Expr>, String),
    /// `[a, b, ...]`
    List(Vec<Expr>),
    /// Prefix operator
    Unary(UnaryOp, Box<Expr>),
    /// Infix operator
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Built-in function call
    Call(String, Vec<Expr>),
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `not`
    Not,
    /// `-`
    Neg,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `or`
    Or,
    /// `and`
    And,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `in`
    In,
    /// `not in`
    NotIn,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    /// Operator as written in source
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }
}
