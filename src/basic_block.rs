use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    common_traits::Verify,
    context::{private::ArenaObj, ArenaCell, Context, Ptr},
    function::Function,
    location::Location,
    operation::Operation,
    printable::{self, fmt_indented_newline, fmt_iter, ListSeparator, Printable},
    result::Result,
    value::Value,
    verify_err,
};

#[derive(Debug, Error)]
pub enum BlockVerifyErr {
    #[error("block {0} is empty")]
    Empty(String),
    #[error("block {0} does not end with a terminator")]
    MissingTerminator(String),
    #[error("block {0} has a terminator before its last operation")]
    EarlyTerminator(String),
    #[error("operand {opd_idx} of operation {op_idx} in block {block} is not defined before its use")]
    UseBeforeDef {
        block: String,
        op_idx: usize,
        opd_idx: usize,
    },
    #[error("operand {opd_idx} of operation {op_idx} in block {block} is an argument of another function")]
    ForeignArgument {
        block: String,
        op_idx: usize,
        opd_idx: usize,
    },
}

/// A basic block contains a list of [Operation]s, the last of which
/// must be a terminator.
#[derive(Debug)]
pub struct BasicBlock {
    pub self_ptr: Ptr<BasicBlock>,
    pub label: String,
    pub ops: Vec<Ptr<Operation>>,
    pub parent_func: Ptr<Function>,
}

impl BasicBlock {
    pub fn new(ctx: &mut Context, label: &str, parent_func: Ptr<Function>) -> Ptr<BasicBlock> {
        let f = |self_ptr: Ptr<BasicBlock>| BasicBlock {
            self_ptr,
            label: label.to_string(),
            ops: vec![],
            parent_func,
        };
        Self::alloc(ctx, f)
    }

    /// Get the terminator of this block, if it has one.
    pub fn get_terminator(&self, ctx: &Context) -> Option<Ptr<Operation>> {
        self.ops
            .last()
            .filter(|op| op.deref(ctx).is_terminator())
            .copied()
    }
}

impl Verify for BasicBlock {
    fn verify(&self, ctx: &Context) -> Result<()> {
        if self.ops.is_empty() {
            return verify_err!(Location::Unknown, BlockVerifyErr::Empty(self.label.clone()));
        }
        if self.get_terminator(ctx).is_none() {
            return verify_err!(
                Location::Unknown,
                BlockVerifyErr::MissingTerminator(self.label.clone())
            );
        }

        // Straight-line code: an operand is defined iff it's produced by an
        // earlier operation of this block or is an argument of our function.
        let mut defined = FxHashSet::<Ptr<Operation>>::default();
        let last_idx = self.ops.len() - 1;
        for (op_idx, op_ptr) in self.ops.iter().enumerate() {
            let op = op_ptr.deref(ctx);
            if op.is_terminator() && op_idx != last_idx {
                return verify_err!(
                    Location::Unknown,
                    BlockVerifyErr::EarlyTerminator(self.label.clone())
                );
            }
            for (opd_idx, opd) in op.operands.iter().enumerate() {
                match opd {
                    Value::Argument { func, .. } if *func != self.parent_func => {
                        return verify_err!(
                            Location::Unknown,
                            BlockVerifyErr::ForeignArgument {
                                block: self.label.clone(),
                                op_idx,
                                opd_idx,
                            }
                        );
                    }
                    Value::OpResult { op: def, .. } if !defined.contains(def) => {
                        return verify_err!(
                            Location::Unknown,
                            BlockVerifyErr::UseBeforeDef {
                                block: self.label.clone(),
                                op_idx,
                                opd_idx,
                            }
                        );
                    }
                    _ => (),
                }
            }
            op.verify(ctx)?;
            defined.insert(*op_ptr);
        }
        Ok(())
    }
}

impl Printable for BasicBlock {
    fn fmt(
        &self,
        ctx: &Context,
        state: &printable::State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}:", self.label)?;
        crate::indented_block!(state, {
            fmt_indented_newline(state, f)?;
            fmt_iter(self.ops.iter(), ctx, state, ListSeparator::Newline, f)?;
        });
        Ok(())
    }
}

impl ArenaObj for BasicBlock {
    fn get_arena(ctx: &Context) -> &ArenaCell<Self> {
        &ctx.basic_blocks
    }
    fn get_arena_mut(ctx: &mut Context) -> &mut ArenaCell<Self> {
        &mut ctx.basic_blocks
    }
    fn dealloc_sub_objects(ptr: Ptr<Self>, ctx: &mut Context) {
        let ops = std::mem::take(&mut ptr.deref_mut(ctx).ops);
        for op in ops {
            ArenaObj::dealloc(op, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        irbuild::builder::IRBuilder, module::Module, operation::OpVerifyErr,
        result::ErrorKind,
    };

    // A module with `f(a)` and `g(b)`, both given empty entry blocks.
    fn two_functions(ctx: &mut Context) -> (Ptr<Function>, IRBuilder, Ptr<Function>, IRBuilder) {
        let mut module = Module::new("test");
        let f = module.declare_function(ctx, "f", vec!["a".into()]).unwrap();
        let g = module.declare_function(ctx, "g", vec!["b".into()]).unwrap();
        let f_builder = IRBuilder::new_at_block_end(Function::create_entry_block(f, ctx));
        let g_builder = IRBuilder::new_at_block_end(Function::create_entry_block(g, ctx));
        (f, f_builder, g, g_builder)
    }

    fn block_err(func: Ptr<Function>, ctx: &Context) -> BlockVerifyErr {
        let err = func.verify(ctx).unwrap_err();
        assert_eq!(err.kind, ErrorKind::VerificationFailed);
        *err.err.downcast::<BlockVerifyErr>().unwrap()
    }

    #[test]
    fn empty_and_unterminated() {
        let ctx = &mut Context::new();
        let (f, f_builder, ..) = two_functions(ctx);
        assert!(matches!(block_err(f, ctx), BlockVerifyErr::Empty(_)));

        f_builder.fconst(ctx, 1.0).unwrap();
        assert!(matches!(
            block_err(f, ctx),
            BlockVerifyErr::MissingTerminator(_)
        ));
    }

    #[test]
    fn early_terminator() {
        let ctx = &mut Context::new();
        let (f, f_builder, ..) = two_functions(ctx);
        let a = f.deref(ctx).get_argument(0);
        f_builder.ret(ctx, a).unwrap();
        f_builder.ret(ctx, a).unwrap();
        assert!(matches!(
            block_err(f, ctx),
            BlockVerifyErr::EarlyTerminator(_)
        ));
    }

    #[test]
    fn values_from_other_functions() {
        let ctx = &mut Context::new();
        let (f, f_builder, g, g_builder) = two_functions(ctx);
        let b = g.deref(ctx).get_argument(0);
        f_builder.ret(ctx, b).unwrap();
        assert!(matches!(
            block_err(f, ctx),
            BlockVerifyErr::ForeignArgument { op_idx: 0, .. }
        ));

        let c = g_builder.fconst(ctx, 2.0).unwrap();
        g_builder.ret(ctx, c).unwrap();
        g.verify(ctx).unwrap();

        let f_entry = f.deref(ctx).get_entry_block().unwrap();
        f_entry.deref_mut(ctx).ops.clear();
        f_builder.ret(ctx, c).unwrap();
        assert!(matches!(
            block_err(f, ctx),
            BlockVerifyErr::UseBeforeDef { op_idx: 0, opd_idx: 0, .. }
        ));
    }

    #[test]
    fn operand_types() {
        let ctx = &mut Context::new();
        let (f, f_builder, ..) = two_functions(ctx);
        let a = f.deref(ctx).get_argument(0);
        let bad = f_builder.uitofp(ctx, a).unwrap();
        f_builder.ret(ctx, bad).unwrap();

        let err = f.verify(ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OpVerifyErr>(),
            Some(OpVerifyErr::OperandType { opcode: "uitofp", .. })
        ));
    }
}
