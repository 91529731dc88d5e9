//! Operator typing

use crate::Type;
use derive_more::Display;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOp {
    /// `+`
    #[display("+")]
    Add,
    /// `-`
    #[display("-")]
    Sub,
    /// `*`
    #[display("*")]
    Mul,
    /// `/`
    #[display("/")]
    Div,
    /// `%`
    #[display("%")]
    Mod,
    /// `==`
    #[display("==")]
    Eq,
    /// `!=`
    #[display("!=")]
    Ne,
    /// `<`
    #[display("<")]
    Lt,
    /// `<=`
    #[display("<=")]
    Le,
    /// `>`
    #[display(">")]
    Gt,
    /// `>=`
    #[display(">=")]
    Ge,
    /// `and`
    #[display("and")]
    And,
    /// `or`
    #[display("or")]
    Or,
}

impl BinaryOp {
    /// Parse an operator token
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "and" => Self::And,
            "or" => Self::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Result type of `lhs op rhs`, or `None` if the operands don't support it
    #[must_use]
    pub fn result_type(self, lhs: &Type, rhs: &Type) -> Option<Type> {
        match self {
            Self::Eq | Self::Ne => Some(Type::Boolean),
            Self::And | Self::Or => {
                let is_bool = |ty: &Type| matches!(ty, Type::Boolean | Type::Any);
                (is_bool(lhs) && is_bool(rhs)).then_some(Type::Boolean)
            }
            Self::Lt | Self::Le | Self::Gt | Self::Ge => {
                let comparable = lhs.is_any()
                    || rhs.is_any()
                    || (lhs.is_numeric() && rhs.is_numeric())
                    || (*lhs == Type::String && *rhs == Type::String);
                comparable.then_some(Type::Boolean)
            }
            Self::Add => match (lhs, rhs) {
                (Type::Any, _) | (_, Type::Any) => Some(Type::Any),
                (Type::String, Type::String) => Some(Type::String),
                (Type::List(_), Type::List(_)) if lhs.can_accept(rhs) => Some(lhs.clone()),
                (Type::List(_), Type::List(_)) if rhs.can_accept(lhs) => Some(rhs.clone()),
                _ => arithmetic(lhs, rhs),
            },
            Self::Sub | Self::Mul | Self::Mod => arithmetic(lhs, rhs),
            Self::Div => arithmetic(lhs, rhs).map(|ty| if ty.is_any() { ty } else { Type::Float }),
        }
    }
}

fn arithmetic(lhs: &Type, rhs: &Type) -> Option<Type> {
    match (lhs, rhs) {
        (Type::Any, other) | (other, Type::Any) if other.is_numeric() || other.is_any() => {
            Some(Type::Any)
        }
        (Type::Int, Type::Int) => Some(Type::Int),
        _ if lhs.is_numeric() && rhs.is_numeric() => Some(Type::Float),
        _ => None,
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum UnaryOp {
    /// `not`
    #[display("not")]
    Not,
    /// `-`
    #[display("-")]
    Neg,
}

impl UnaryOp {
    /// Parse an operator token
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "not" | "!" => Some(Self::Not),
            "-" => Some(Self::Neg),
            _ => None,
        }
    }

    /// Result type of `op operand`
    #[must_use]
    pub fn result_type(self, operand: &Type) -> Option<Type> {
        match (self, operand) {
            (Self::Not, Type::Boolean | Type::Any) => Some(Type::Boolean),
            (Self::Neg, Type::Int | Type::Float | Type::Any) => Some(operand.clone()),
            _ => None,
        }
    }
}
