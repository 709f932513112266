//! [Function]s: named (or anonymous) units of code with `f64` parameters
//! and an `f64` result. A function without an entry block is a declaration.

use std::fmt::{self, Display};

use crate::{
    basic_block::BasicBlock,
    common_traits::{Named, Verify},
    context::{private::ArenaObj, ArenaCell, Context, Ptr},
    printable::{self, fmt_indented_newline, fmt_iter, ListSeparator, Printable},
    result::Result,
    value::{Typed, Value},
};

/// The symbol of a [Function].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FuncName {
    Named(String),
    /// Anonymous functions are numbered by their module.
    Anonymous(u32),
}

impl Display for FuncName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuncName::Named(name) => write!(f, "@{name}"),
            FuncName::Anonymous(id) => write!(f, "@{id}"),
        }
    }
}

#[derive(Debug)]
pub struct Function {
    pub self_ptr: Ptr<Function>,
    name: FuncName,
    arg_names: Vec<String>,
    entry: Option<Ptr<BasicBlock>>,
    next_value: u32,
}

impl Function {
    pub(crate) fn new(ctx: &mut Context, name: FuncName, arg_names: Vec<String>) -> Ptr<Function> {
        let f = |self_ptr: Ptr<Function>| Function {
            self_ptr,
            name,
            arg_names,
            entry: None,
            next_value: 0,
        };
        Self::alloc(ctx, f)
    }

    pub fn name(&self) -> &FuncName {
        &self.name
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.arg_names.len()
    }

    pub fn arg_names(&self) -> &[String] {
        &self.arg_names
    }

    /// Rename the parameters. The number of parameters cannot change.
    pub fn set_arg_names(&mut self, arg_names: Vec<String>) {
        assert_eq!(
            arg_names.len(),
            self.arg_names.len(),
            "Renaming parameters must not change the arity"
        );
        self.arg_names = arg_names;
    }

    /// Name under which the `arg_idx`'th argument is printed.
    /// A repeated parameter name gets its index appended.
    pub fn arg_display_name(&self, arg_idx: usize) -> String {
        let name = &self.arg_names[arg_idx];
        if self.arg_names[..arg_idx].contains(name) {
            format!("{name}.{arg_idx}")
        } else {
            name.clone()
        }
    }

    pub fn get_argument(&self, arg_idx: usize) -> Value {
        assert!(arg_idx < self.arity(), "Argument index out of range");
        Value::Argument {
            func: self.self_ptr,
            arg_idx,
        }
    }

    pub fn get_arguments(&self) -> Vec<Value> {
        (0..self.arity()).map(|idx| self.get_argument(idx)).collect()
    }

    /// A function without a body is a declaration.
    pub fn is_declaration(&self) -> bool {
        self.entry.is_none()
    }

    pub fn get_entry_block(&self) -> Option<Ptr<BasicBlock>> {
        self.entry
    }

    /// Give a declaration a body, by creating its (empty) entry block.
    pub fn create_entry_block(ptr: Ptr<Function>, ctx: &mut Context) -> Ptr<BasicBlock> {
        assert!(
            ptr.deref(ctx).is_declaration(),
            "Function already has an entry block"
        );
        let entry = BasicBlock::new(ctx, "entry", ptr);
        ptr.deref_mut(ctx).entry = Some(entry);
        entry
    }

    /// Delete the body, turning this function back into a declaration.
    pub fn discard_body(ptr: Ptr<Function>, ctx: &mut Context) {
        let entry = {
            let mut func = ptr.deref_mut(ctx);
            func.next_value = 0;
            func.entry.take()
        };
        if let Some(entry) = entry {
            ArenaObj::dealloc(entry, ctx);
        }
    }

    /// Get a fresh SSA number for an operation result.
    pub(crate) fn next_value_id(&mut self) -> u32 {
        let id = self.next_value;
        self.next_value += 1;
        id
    }
}

impl Named for Function {
    fn get_name(&self, _ctx: &Context) -> String {
        self.name.to_string()
    }
}

impl Verify for Function {
    fn verify(&self, ctx: &Context) -> Result<()> {
        match self.entry {
            Some(entry) => entry.verify(ctx),
            None => Ok(()),
        }
    }
}

impl Printable for Function {
    fn fmt(
        &self,
        ctx: &Context,
        state: &printable::State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let keyword = if self.is_declaration() {
            "declare"
        } else {
            "define"
        };
        write!(f, "{keyword} f64 {}(", self.name)?;
        let args = self.get_arguments().into_iter().map(Typed);
        fmt_iter(args, ctx, state, ListSeparator::CharSpace(','), f)?;
        write!(f, ")")?;

        if let Some(entry) = self.entry {
            write!(f, " {{")?;
            fmt_indented_newline(state, f)?;
            entry.fmt(ctx, state, f)?;
            fmt_indented_newline(state, f)?;
            write!(f, "}}")?;
        }
        Ok(())
    }
}

impl ArenaObj for Function {
    fn get_arena(ctx: &Context) -> &ArenaCell<Self> {
        &ctx.functions
    }
    fn get_arena_mut(ctx: &mut Context) -> &mut ArenaCell<Self> {
        &mut ctx.functions
    }
    fn dealloc_sub_objects(ptr: Ptr<Self>, ctx: &mut Context) {
        Function::discard_body(ptr, ctx);
    }
}
