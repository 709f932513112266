//! Lower the [AST](crate::ast) to IR.
//!
//! A [CodeGen] owns everything that persists across top-level units: the
//! [Context], the [Module] and its function table. The local scope only
//! lives while one function is being generated. A unit that fails to generate
//! is rolled back, so the module never holds a half built function.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    ast::{Expr, FunctionDef, Prototype},
    common_traits::{Named, Verify},
    context::{Context, Ptr},
    function::Function,
    irbuild::builder::IRBuilder,
    location::Location,
    module::Module,
    parser::TopLevel,
    result::Result,
    semantic_err,
    value::Value,
};

#[derive(Debug, Error)]
pub enum CodegenErr {
    #[error("unknown variable name `{0}`")]
    UnknownSymbol(String),
    #[error("call to undefined function `{0}`")]
    UndefinedFunction(String),
    #[error("`{callee}` expects {expected} argument(s), but {got} were passed")]
    ArityMismatch {
        callee: String,
        expected: usize,
        got: usize,
    },
    #[error("`{name}` was declared with {expected} parameter(s), redeclared with {got}")]
    ArityConflict {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("redefinition of function `{0}`")]
    DuplicateDefinition(String),
    #[error("invalid binary operator `{0}`")]
    UnsupportedOperator(char),
}

pub struct CodeGen {
    ctx: Context,
    module: Module,
    // Function parameters visible in the body being generated.
    named_values: FxHashMap<String, Value>,
}

impl CodeGen {
    /// Create a code generator emitting into a fresh, empty module.
    pub fn new(module_name: &str) -> Self {
        Self {
            ctx: Context::new(),
            module: Module::new(module_name),
            named_values: FxHashMap::default(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Generate one parsed top-level unit.
    pub fn gen_top_level(&mut self, unit: &TopLevel) -> Result<Ptr<Function>> {
        match unit {
            TopLevel::Definition(def) | TopLevel::Expression(def) => self.gen_function(def),
            TopLevel::Extern(proto) => self.gen_prototype(proto),
        }
    }

    /// Find or declare the function described by `proto`.
    ///
    /// An existing function is reused if its arity matches, so a function may
    /// be declared any number of times, and defined after being declared.
    /// Anonymous prototypes always get a new function.
    pub fn gen_prototype(&mut self, proto: &Prototype) -> Result<Ptr<Function>> {
        if proto.is_anonymous() {
            return Ok(self.module.add_anonymous_function(&mut self.ctx));
        }

        if let Some(func) = self.module.lookup(&proto.name) {
            let expected = func.deref(&self.ctx).arity();
            if expected != proto.params.len() {
                return semantic_err!(
                    Location::Unknown,
                    CodegenErr::ArityConflict {
                        name: proto.name.clone(),
                        expected,
                        got: proto.params.len(),
                    }
                );
            }
            return Ok(func);
        }

        self.module
            .declare_function(&mut self.ctx, &proto.name, proto.params.clone())
    }

    /// Generate a function definition: its prototype, then its body.
    /// On failure, the module is left as it was before the call.
    pub fn gen_function(&mut self, def: &FunctionDef) -> Result<Ptr<Function>> {
        let proto = &def.prototype;
        self.named_values.clear();

        let previous = if proto.is_anonymous() {
            None
        } else {
            self.module.lookup(&proto.name)
        };
        let func = self.gen_prototype(proto)?;

        if !func.deref(&self.ctx).is_declaration() {
            return semantic_err!(
                Location::Unknown,
                CodegenErr::DuplicateDefinition(proto.name.clone())
            );
        }

        let old_arg_names = func.deref(&self.ctx).arg_names().to_vec();
        func.deref_mut(&self.ctx).set_arg_names(proto.params.clone());
        for (arg_idx, param) in proto.params.iter().enumerate() {
            let arg = func.deref(&self.ctx).get_argument(arg_idx);
            // A repeated parameter name refers to the last one.
            self.named_values.insert(param.clone(), arg);
        }

        let emitted = self.emit_body(func, &def.body);
        // Parameters are only in scope inside their own body.
        self.named_values.clear();
        match emitted {
            Ok(()) => {
                log::debug!(
                    "Generated function {}",
                    func.deref(&self.ctx).get_name(&self.ctx)
                );
                Ok(func)
            }
            Err(err) => {
                log::warn!(
                    "Discarding function {} that failed to generate",
                    func.deref(&self.ctx).get_name(&self.ctx)
                );
                if previous.is_some() {
                    Function::discard_body(func, &mut self.ctx);
                    func.deref_mut(&self.ctx).set_arg_names(old_arg_names);
                } else {
                    self.module.erase_function(&mut self.ctx, func)?;
                }
                Err(err)
            }
        }
    }

    // Give the declaration `func` a body that returns the value of `body`,
    // and verify it.
    fn emit_body(&mut self, func: Ptr<Function>, body: &Expr) -> Result<()> {
        let entry = Function::create_entry_block(func, &mut self.ctx);
        let builder = IRBuilder::new_at_block_end(entry);
        let ret_val = self.gen_expr(&builder, body)?;
        builder.ret(&mut self.ctx, ret_val)?;
        func.verify(&self.ctx)
    }

    /// Emit the operations computing `expr` at `builder`'s insertion point.
    pub fn gen_expr(&mut self, builder: &IRBuilder, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Number(n) => builder.fconst(&mut self.ctx, *n),
            Expr::Variable(name) => match self.named_values.get(name) {
                Some(val) => Ok(*val),
                None => semantic_err!(
                    Location::Unknown,
                    CodegenErr::UnknownSymbol(name.clone())
                ),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.gen_expr(builder, lhs)?;
                let rhs = self.gen_expr(builder, rhs)?;
                let ctx = &mut self.ctx;
                match op {
                    '+' => builder.fadd(ctx, lhs, rhs),
                    '-' => builder.fsub(ctx, lhs, rhs),
                    '*' => builder.fmul(ctx, lhs, rhs),
                    '<' => {
                        // Booleans are the numbers 0.0 and 1.0.
                        let cmp = builder.fcmp_ult(ctx, lhs, rhs)?;
                        builder.uitofp(ctx, cmp)
                    }
                    _ => semantic_err!(Location::Unknown, CodegenErr::UnsupportedOperator(*op)),
                }
            }
            Expr::Call { callee, args } => {
                let Some(func) = self.module.lookup(callee) else {
                    return semantic_err!(
                        Location::Unknown,
                        CodegenErr::UndefinedFunction(callee.clone())
                    );
                };
                let expected = func.deref(&self.ctx).arity();
                if expected != args.len() {
                    return semantic_err!(
                        Location::Unknown,
                        CodegenErr::ArityMismatch {
                            callee: callee.clone(),
                            expected,
                            got: args.len(),
                        }
                    );
                }
                let args = args
                    .iter()
                    .map(|arg| self.gen_expr(builder, arg))
                    .collect::<Result<Vec<_>>>()?;
                builder.call(&mut self.ctx, func, args)
            }
        }
    }
}
