//! [Operation]s are the instructions of the IR.

use thiserror::Error;

use crate::{
    basic_block::BasicBlock,
    common_traits::Verify,
    context::{private::ArenaObj, ArenaCell, Context, Ptr},
    function::Function,
    location::Location,
    printable::{self, fmt_iter, ListSeparator, Printable},
    r#type::Type,
    result::Result,
    value::{Typed, Value},
    verify_err,
};

/// What an [Operation] computes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Opcode {
    /// A floating point constant.
    FConst(f64),
    FAdd,
    FSub,
    FMul,
    /// Unordered-or-less-than float comparison, producing an `i1`.
    FCmpUlt,
    /// Unsigned integer (`i1`) to float conversion.
    UIToFP,
    /// Call a function. The operands are the arguments.
    Call(Ptr<Function>),
    /// Return the single operand from the enclosing function.
    Ret,
}

impl Opcode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::FConst(_) => "fconst",
            Opcode::FAdd => "fadd",
            Opcode::FSub => "fsub",
            Opcode::FMul => "fmul",
            Opcode::FCmpUlt => "fcmp",
            Opcode::UIToFP => "uitofp",
            Opcode::Call(_) => "call",
            Opcode::Ret => "ret",
        }
    }

    /// Type of the value this opcode produces, if any.
    pub fn result_type(&self) -> Option<Type> {
        match self {
            Opcode::FCmpUlt => Some(Type::I1),
            Opcode::Ret => None,
            _ => Some(Type::F64),
        }
    }
}

#[derive(Debug, Error)]
pub enum OpVerifyErr {
    #[error("{opcode} expects {expected} operand(s), but has {got}")]
    NumOperands {
        opcode: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("operand {idx} of {opcode} must be of type {expected}, but is {got}")]
    OperandType {
        opcode: &'static str,
        idx: usize,
        expected: Type,
        got: Type,
    },
    #[error("{opcode} must define a result of type {expected:?}, but defines {got:?}")]
    ResultType {
        opcode: &'static str,
        expected: Option<Type>,
        got: Option<Type>,
    },
    #[error("call refers to a function that no longer exists")]
    DanglingCallee,
}

/// An instruction in a [BasicBlock].
#[derive(Debug)]
pub struct Operation {
    pub self_ptr: Ptr<Operation>,
    pub opcode: Opcode,
    pub operands: Vec<Value>,
    /// Function-local SSA number and type of the result, if any.
    result: Option<(u32, Type)>,
    pub parent_block: Ptr<BasicBlock>,
}

impl Operation {
    /// Create a new operation, appended at the end of `block`.
    /// The result (if `opcode` produces one) is numbered by the parent function.
    pub fn new(
        ctx: &mut Context,
        block: Ptr<BasicBlock>,
        opcode: Opcode,
        operands: Vec<Value>,
    ) -> Ptr<Operation> {
        let result = opcode.result_type().map(|ty| {
            let func = block.deref(ctx).parent_func;
            (func.deref_mut(ctx).next_value_id(), ty)
        });
        let f = |self_ptr: Ptr<Operation>| Operation {
            self_ptr,
            opcode,
            operands,
            result,
            parent_block: block,
        };
        let op = Self::alloc(ctx, f);
        block.deref_mut(ctx).ops.push(op);
        op
    }

    /// The SSA number of the result, if this operation has one.
    pub fn result_id(&self) -> Option<u32> {
        self.result.map(|(id, _)| id)
    }

    /// The [Value] defined by this operation, if it has one.
    pub fn get_result(&self) -> Option<Value> {
        self.result.map(|(_, ty)| Value::OpResult {
            op: self.self_ptr,
            ty,
        })
    }

    /// Does this operation end its block?
    pub fn is_terminator(&self) -> bool {
        matches!(self.opcode, Opcode::Ret)
    }

    fn verify_operands(&self, expected: &[Type]) -> Result<()> {
        let opcode = self.opcode.mnemonic();
        if self.operands.len() != expected.len() {
            return verify_err!(
                Location::Unknown,
                OpVerifyErr::NumOperands {
                    opcode,
                    expected: expected.len(),
                    got: self.operands.len(),
                }
            );
        }
        for (idx, (opd, expected)) in self.operands.iter().zip(expected).enumerate() {
            if opd.get_type() != *expected {
                return verify_err!(
                    Location::Unknown,
                    OpVerifyErr::OperandType {
                        opcode,
                        idx,
                        expected: *expected,
                        got: opd.get_type(),
                    }
                );
            }
        }
        Ok(())
    }
}

impl Verify for Operation {
    fn verify(&self, ctx: &Context) -> Result<()> {
        let expected = self.opcode.result_type();
        let got = self.result.map(|(_, ty)| ty);
        if expected != got {
            return verify_err!(
                Location::Unknown,
                OpVerifyErr::ResultType {
                    opcode: self.opcode.mnemonic(),
                    expected,
                    got,
                }
            );
        }
        match self.opcode {
            Opcode::FConst(_) => self.verify_operands(&[]),
            Opcode::FAdd | Opcode::FSub | Opcode::FMul | Opcode::FCmpUlt => {
                self.verify_operands(&[Type::F64, Type::F64])
            }
            Opcode::UIToFP => self.verify_operands(&[Type::I1]),
            Opcode::Ret => self.verify_operands(&[Type::F64]),
            Opcode::Call(callee) => {
                if !callee.is_live(ctx) {
                    return verify_err!(Location::Unknown, OpVerifyErr::DanglingCallee);
                }
                let arity = callee.deref(ctx).arity();
                self.verify_operands(&vec![Type::F64; arity])
            }
        }
    }
}

impl Printable for Operation {
    fn fmt(
        &self,
        ctx: &Context,
        state: &printable::State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if let Some(res) = self.get_result() {
            write!(f, "{} = ", res.disp(ctx))?;
        }
        let typed_operands = || self.operands.iter().map(|opd| Typed(*opd));
        match self.opcode {
            Opcode::FConst(v) => write!(f, "fconst f64 {v:?}"),
            Opcode::FAdd | Opcode::FSub | Opcode::FMul => {
                write!(f, "{} f64 ", self.opcode.mnemonic())?;
                fmt_iter(self.operands.iter(), ctx, state, ListSeparator::CharSpace(','), f)
            }
            Opcode::FCmpUlt => {
                write!(f, "fcmp ult f64 ")?;
                fmt_iter(self.operands.iter(), ctx, state, ListSeparator::CharSpace(','), f)
            }
            Opcode::UIToFP => {
                write!(f, "uitofp ")?;
                fmt_iter(typed_operands(), ctx, state, ListSeparator::CharSpace(','), f)?;
                write!(f, " to f64")
            }
            Opcode::Call(callee) => {
                if callee.is_live(ctx) {
                    write!(f, "call f64 {}(", callee.deref(ctx).name())?;
                } else {
                    write!(f, "call f64 <dangling>(")?;
                }
                fmt_iter(typed_operands(), ctx, state, ListSeparator::CharSpace(','), f)?;
                write!(f, ")")
            }
            Opcode::Ret => {
                write!(f, "ret ")?;
                fmt_iter(typed_operands(), ctx, state, ListSeparator::CharSpace(','), f)
            }
        }
    }
}

impl ArenaObj for Operation {
    fn get_arena(ctx: &Context) -> &ArenaCell<Self> {
        &ctx.operations
    }
    fn get_arena_mut(ctx: &mut Context) -> &mut ArenaCell<Self> {
        &mut ctx.operations
    }
    fn dealloc_sub_objects(_ptr: Ptr<Self>, _ctx: &mut Context) {}
}
