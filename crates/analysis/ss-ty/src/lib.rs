//! Static types of Story values
//!
//! This crate handles:
//! - Type representation, including the `any` top type and the `none`
//!   placeholder used before a variable is first bound
//! - The assignability lattice ([`Type::can_accept`])
//! - Result types of operators and literal collections

mod ops;

pub use ops::{BinaryOp, UnaryOp};

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A static type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Type {
    /// Top type; accepts and is accepted by everything
    #[display("any")]
    Any,
    /// Not typed yet (an unbound name)
    #[display("none")]
    None,
    /// `true` / `false`
    #[display("boolean")]
    Boolean,
    /// Integer
    #[display("int")]
    Int,
    /// Floating point number
    #[display("float")]
    Float,
    /// String
    #[display("string")]
    String,
    /// Duration
    #[display("time")]
    Time,
    /// Regular expression
    #[display("regexp")]
    Regexp,
    /// Opaque object returned by services
    #[display("object")]
    Object,
    /// Homogeneous list
    #[display("List[{_0}]")]
    List(Box<Type>),
    /// Map from keys to values
    #[display("Map[{_0},{_1}]")]
    Map(Box<Type>, Box<Type>),
}

impl Type {
    /// `List[element]`
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// `Map[key,value]`
    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Whether this is the `none` placeholder
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether this is `any`
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Whether this is `int` or `float`
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Whether a value of type `source` may be stored in a slot of type `self`
    #[must_use]
    pub fn can_accept(&self, source: &Self) -> bool {
        if self == source {
            return true;
        }
        match (self, source) {
            (Self::Any, _) | (_, Self::Any) | (Self::Float, Self::Int) => true,
            (Self::List(target), Self::List(source)) => target.can_accept(source),
            (Self::Map(target_key, target_value), Self::Map(source_key, source_value)) => {
                target_key.can_accept(source_key) && target_value.can_accept(source_value)
            }
            (Self::Object, Self::Map(..)) => true,
            _ => false,
        }
    }

    /// Smallest common type of two values stored side by side in a collection
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            (Self::List(left), Self::List(right)) => Self::list(left.join(right)),
            (Self::Map(left_key, left_value), Self::Map(right_key, right_value)) => {
                Self::map(left_key.join(right_key), left_value.join(right_value))
            }
            _ => Self::Any,
        }
    }

    /// Common type of a collection's items; `any` for an empty collection
    #[must_use]
    pub fn join_all<'a>(types: impl IntoIterator<Item = &'a Self>) -> Self {
        types
            .into_iter()
            .fold(None, |acc: Option<Self>, ty| {
                Some(acc.map_or_else(|| ty.clone(), |acc| acc.join(ty)))
            })
            .unwrap_or(Self::Any)
    }

    /// Type named by an annotation, given its already resolved arguments
    #[must_use]
    pub fn from_annotation(name: &str, mut args: Vec<Self>) -> Option<Self> {
        let ty = match (name, args.len()) {
            ("any", 0) => Self::Any,
            ("boolean", 0) => Self::Boolean,
            ("int", 0) => Self::Int,
            ("float", 0) => Self::Float,
            ("string", 0) => Self::String,
            ("time", 0) => Self::Time,
            ("regexp", 0) => Self::Regexp,
            ("object", 0) => Self::Object,
            ("List", 1) => Self::list(args.pop()?),
            ("Map", 2) => {
                let value = args.pop()?;
                let key = args.pop()?;
                Self::map(key, value)
            }
            _ => return None,
        };
        Some(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_accepted_both_ways() {
        for ty in [Type::Int, Type::String, Type::list(Type::Boolean)] {
            assert!(Type::Any.can_accept(&ty));
            assert!(ty.can_accept(&Type::Any));
        }
    }

    #[test]
    fn numeric_widening_is_one_way() {
        assert!(Type::Float.can_accept(&Type::Int));
        assert!(!Type::Int.can_accept(&Type::Float));
    }

    #[test]
    fn int_and_string_are_incompatible() {
        assert!(!Type::Int.can_accept(&Type::String));
        assert!(!Type::String.can_accept(&Type::Int));
    }

    #[test]
    fn collections_compare_element_types() {
        assert!(Type::list(Type::Float).can_accept(&Type::list(Type::Int)));
        assert!(!Type::list(Type::Int).can_accept(&Type::list(Type::String)));
        assert!(
            Type::map(Type::String, Type::Any).can_accept(&Type::map(Type::String, Type::Int))
        );
        assert!(!Type::map(Type::Int, Type::Int).can_accept(&Type::map(Type::String, Type::Int)));
        assert!(Type::Object.can_accept(&Type::map(Type::String, Type::Int)));
        assert!(!Type::Object.can_accept(&Type::list(Type::Int)));
    }

    #[test]
    fn none_only_accepts_none_or_any() {
        assert!(Type::None.can_accept(&Type::None));
        assert!(Type::None.can_accept(&Type::Any));
        assert!(!Type::None.can_accept(&Type::Int));
    }

    #[test]
    fn join_of_collection_items() {
        assert_eq!(Type::join_all(&[Type::Int, Type::Int]), Type::Int);
        assert_eq!(Type::join_all(&[Type::Int, Type::Float]), Type::Float);
        assert_eq!(Type::join_all(&[Type::Int, Type::String]), Type::Any);
        assert_eq!(Type::join_all(&Vec::<Type>::new()), Type::Any);
        assert_eq!(
            Type::list(Type::Int).join(&Type::list(Type::Float)),
            Type::list(Type::Float)
        );
    }

    #[test]
    fn annotations() {
        assert_eq!(Type::from_annotation("int", Vec::new()), Some(Type::Int));
        assert_eq!(
            Type::from_annotation("Map", vec![Type::String, Type::Int]),
            Some(Type::map(Type::String, Type::Int))
        );
        assert_eq!(Type::from_annotation("List", Vec::new()), None);
        assert_eq!(Type::from_annotation("integer", Vec::new()), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(
            Type::map(Type::String, Type::list(Type::Float)).to_string(),
            "Map[string,List[float]]"
        );
    }
}
