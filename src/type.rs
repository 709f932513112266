//! The types an IR [Value](crate::value::Value) can have.
//!
//! The language has a single numeric scalar, so the IR only needs
//! a 64-bit float and the 1-bit result of comparisons.

use std::fmt::{self, Display};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// IEEE-754 double precision float.
    F64,
    /// Boolean produced by comparisons.
    I1,
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::F64 => write!(f, "f64"),
            Type::I1 => write!(f, "i1"),
        }
    }
}

crate::impl_printable_for_display!(Type);
