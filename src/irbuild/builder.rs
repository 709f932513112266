//! A builder for appending [Operation]s to a [BasicBlock].
//! Similar in spirit to LLVM's IRBuilder.

use thiserror::Error;

use crate::{
    arg_err,
    basic_block::BasicBlock,
    context::{Context, Ptr},
    function::Function,
    location::Location,
    operation::{Opcode, Operation},
    printable::Printable,
    result::Result,
    value::Value,
};

#[derive(Debug, Error)]
pub enum BuilderErr {
    #[error("IRBuilder insertion point is not set")]
    InsertionPointUnset,
    #[error("Operation {0} does not define a result")]
    NoResult(String),
}

/// Appends [Operation]s at the end of a [BasicBlock].
/// The builder does not check its operands; that's the verifier's job.
#[derive(Default, Clone, Copy)]
pub struct IRBuilder {
    insertion_block: Option<Ptr<BasicBlock>>,
}

impl IRBuilder {
    /// Creates a new [IRBuilder] that appends to the end of `block`.
    pub fn new_at_block_end(block: Ptr<BasicBlock>) -> Self {
        Self {
            insertion_block: Some(block),
        }
    }

    /// Sets the insertion point to the end of the given block.
    pub fn set_insertion_point_to_block_end(&mut self, block: Ptr<BasicBlock>) {
        self.insertion_block = Some(block);
    }

    /// Get the current insertion block.
    pub fn get_insertion_block(&self) -> Option<Ptr<BasicBlock>> {
        self.insertion_block
    }

    fn append(
        &self,
        ctx: &mut Context,
        opcode: Opcode,
        operands: Vec<Value>,
    ) -> Result<Ptr<Operation>> {
        let Some(block) = self.insertion_block else {
            return arg_err!(Location::Unknown, BuilderErr::InsertionPointUnset);
        };
        Ok(Operation::new(ctx, block, opcode, operands))
    }

    fn append_with_result(
        &self,
        ctx: &mut Context,
        opcode: Opcode,
        operands: Vec<Value>,
    ) -> Result<Value> {
        let op = self.append(ctx, opcode, operands)?;
        let res = op.deref(ctx).get_result();
        match res {
            Some(res) => Ok(res),
            None => arg_err!(
                Location::Unknown,
                BuilderErr::NoResult(op.disp(ctx).to_string())
            ),
        }
    }

    /// `fconst f64 value`
    pub fn fconst(&self, ctx: &mut Context, value: f64) -> Result<Value> {
        self.append_with_result(ctx, Opcode::FConst(value), vec![])
    }

    /// `fadd f64 lhs, rhs`
    pub fn fadd(&self, ctx: &mut Context, lhs: Value, rhs: Value) -> Result<Value> {
        self.append_with_result(ctx, Opcode::FAdd, vec![lhs, rhs])
    }

    /// `fsub f64 lhs, rhs`
    pub fn fsub(&self, ctx: &mut Context, lhs: Value, rhs: Value) -> Result<Value> {
        self.append_with_result(ctx, Opcode::FSub, vec![lhs, rhs])
    }

    /// `fmul f64 lhs, rhs`
    pub fn fmul(&self, ctx: &mut Context, lhs: Value, rhs: Value) -> Result<Value> {
        self.append_with_result(ctx, Opcode::FMul, vec![lhs, rhs])
    }

    /// `fcmp ult f64 lhs, rhs`, an `i1`.
    pub fn fcmp_ult(&self, ctx: &mut Context, lhs: Value, rhs: Value) -> Result<Value> {
        self.append_with_result(ctx, Opcode::FCmpUlt, vec![lhs, rhs])
    }

    /// `uitofp i1 value to f64`
    pub fn uitofp(&self, ctx: &mut Context, value: Value) -> Result<Value> {
        self.append_with_result(ctx, Opcode::UIToFP, vec![value])
    }

    /// `call f64 @callee(args)`
    pub fn call(
        &self,
        ctx: &mut Context,
        callee: Ptr<Function>,
        args: Vec<Value>,
    ) -> Result<Value> {
        self.append_with_result(ctx, Opcode::Call(callee), args)
    }

    /// `ret f64 value`
    pub fn ret(&self, ctx: &mut Context, value: Value) -> Result<Ptr<Operation>> {
        self.append(ctx, Opcode::Ret, vec![value])
    }
}
