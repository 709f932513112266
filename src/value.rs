//! SSA values: function arguments and operation results.

use crate::{
    context::{Context, Ptr},
    function::Function,
    operation::Operation,
    printable::{self, Printable},
    r#type::Type,
};

/// A value that can be used as an operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// The `arg_idx`'th argument of a [Function].
    Argument {
        func: Ptr<Function>,
        arg_idx: usize,
    },
    /// The result of an [Operation].
    OpResult { op: Ptr<Operation>, ty: Type },
}

impl Value {
    pub fn get_type(&self) -> Type {
        match self {
            Value::Argument { .. } => Type::F64,
            Value::OpResult { ty, .. } => *ty,
        }
    }
}

impl Printable for Value {
    fn fmt(
        &self,
        ctx: &Context,
        _state: &printable::State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Value::Argument { func, arg_idx } => {
                let func = func.deref(ctx);
                if *arg_idx < func.arity() {
                    write!(f, "%{}", func.arg_display_name(*arg_idx))
                } else {
                    write!(f, "%arg{arg_idx}")
                }
            }
            Value::OpResult { op, .. } => match op.deref(ctx).result_id() {
                Some(id) => write!(f, "%{id}"),
                None => write!(f, "%<no result>"),
            },
        }
    }
}

/// Print a value along with its type, as in `f64 %a`.
pub(crate) struct Typed(pub Value);

impl Printable for Typed {
    fn fmt(
        &self,
        ctx: &Context,
        state: &printable::State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{} ", self.0.get_type())?;
        self.0.fmt(ctx, state, f)
    }
}
