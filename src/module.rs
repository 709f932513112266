//! A [Module] is the top level container of [Function]s.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    arg_err,
    common_traits::Verify,
    context::{private::ArenaObj, Context, Ptr},
    function::{FuncName, Function},
    location::Location,
    printable::{self, fmt_indented_newline, Printable},
    result::Result,
    verify_err,
};

#[derive(Debug, Error)]
pub enum ModuleErr {
    #[error("symbol {0} is already defined in the module")]
    SymbolRedefined(String),
    #[error("function {0} is not in the module")]
    FunctionNotInModule(String),
    #[error("symbol table entry {0} is out of sync with the function list")]
    SymbolTableOutOfSync(String),
}

/// Owns the [Function]s of one compilation session, in creation order,
/// along with a symbol table mapping names to (named) functions.
pub struct Module {
    name: String,
    functions: Vec<Ptr<Function>>,
    symbols: FxHashMap<String, Ptr<Function>>,
    next_anon: u32,
}

impl Module {
    pub fn new(name: &str) -> Module {
        Module {
            name: name.to_string(),
            functions: vec![],
            symbols: FxHashMap::default(),
            next_anon: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All functions, in the order they were added.
    pub fn functions(&self) -> &[Ptr<Function>] {
        &self.functions
    }

    /// Find a named function.
    pub fn lookup(&self, name: &str) -> Option<Ptr<Function>> {
        self.symbols.get(name).copied()
    }

    /// Add a declaration of a new function `name` with parameters `arg_names`.
    pub fn declare_function(
        &mut self,
        ctx: &mut Context,
        name: &str,
        arg_names: Vec<String>,
    ) -> Result<Ptr<Function>> {
        if self.symbols.contains_key(name) {
            return arg_err!(
                Location::Unknown,
                ModuleErr::SymbolRedefined(name.to_string())
            );
        }
        let func = Function::new(ctx, FuncName::Named(name.to_string()), arg_names);
        self.symbols.insert(name.to_string(), func);
        self.functions.push(func);
        Ok(func)
    }

    /// Add a new nullary function that has no name, and hence cannot be called.
    pub fn add_anonymous_function(&mut self, ctx: &mut Context) -> Ptr<Function> {
        let id = self.next_anon;
        self.next_anon += 1;
        let func = Function::new(ctx, FuncName::Anonymous(id), vec![]);
        self.functions.push(func);
        func
    }

    /// Remove `func` from this module and deallocate it (and its body).
    pub fn erase_function(&mut self, ctx: &mut Context, func: Ptr<Function>) -> Result<()> {
        let Some(pos) = self.functions.iter().position(|f| *f == func) else {
            let name = func.deref(ctx).name().to_string();
            return arg_err!(Location::Unknown, ModuleErr::FunctionNotInModule(name));
        };
        self.functions.remove(pos);
        if let FuncName::Named(name) = func.deref(ctx).name() {
            self.symbols.remove(name);
        }
        ArenaObj::dealloc(func, ctx);
        Ok(())
    }
}

impl Verify for Module {
    fn verify(&self, ctx: &Context) -> Result<()> {
        for (name, func) in &self.symbols {
            let in_sync = self.functions.contains(func)
                && matches!(func.deref(ctx).name(), FuncName::Named(n) if n == name);
            if !in_sync {
                return verify_err!(
                    Location::Unknown,
                    ModuleErr::SymbolTableOutOfSync(name.clone())
                );
            }
        }
        for func in &self.functions {
            func.verify(ctx)?;
        }
        Ok(())
    }
}

impl Printable for Module {
    fn fmt(
        &self,
        ctx: &Context,
        state: &printable::State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "; ModuleID = '{}'", self.name)?;
        for func in &self.functions {
            fmt_indented_newline(state, f)?;
            fmt_indented_newline(state, f)?;
            func.fmt(ctx, state, f)?;
        }
        Ok(())
    }
}
