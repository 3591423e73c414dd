//! Experimental LLVM lowering (spec.md §4.5), feature-gated behind
//! `llvm-backend`. Consumes the same checked AST as [`crate::codegen_c`]
//! but only the reduced subset spec.md §4.5 names: integer/bool arithmetic
//! and comparisons, string literals/interpolation, plain (non-generic,
//! non-async, non-method) function definitions, `if`/`while`/C-style `for`,
//! method calls mangled to `string_<method>`, and `spawn`. Anything outside
//! that subset (structs, enums, generics, closures, `async`/`await`,
//! `match`, for-each loops) is the C backend's job — spec.md §2 gives this
//! backend a ~10% share for a reason, and §4.5 says its semantics only need
//! to match the C backend "for the subset covered".
//!
//! Grounded on the LLVM codegen shape in `other_examples` (entry-block
//! allocas, `IntPredicate`-driven comparisons, explicit terminator checks
//! before emitting into a block) rather than the teacher workspace, which
//! has no LLVM backend of its own.

use std::collections::HashMap;
use std::path::Path;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum};
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue, PointerValue};
use inkwell::{AddressSpace, IntPredicate, OptimizationLevel};

use wync_base::{Interner, Symbol};
use wync_lang::ast::{Expr, ExprKind, ForHead, InterpSegment, Param, Program, Stmt, StmtKind, TypeExpr};
use wync_lang::token::Token;

#[derive(Debug)]
pub enum LlvmError {
    UnsupportedConstruct(&'static str),
    Target(String),
    Io(std::io::Error),
}

impl std::fmt::Display for LlvmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlvmError::UnsupportedConstruct(what) => {
                write!(f, "construct not supported by the LLVM backend: {}", what)
            }
            LlvmError::Target(msg) => write!(f, "LLVM target error: {}", msg),
            LlvmError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for LlvmError {}

impl From<std::io::Error> for LlvmError {
    fn from(e: std::io::Error) -> Self {
        LlvmError::Io(e)
    }
}

pub struct LlvmBackend<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    interner: &'ctx Interner,
    source: &'ctx str,
    functions: HashMap<Symbol, FunctionValue<'ctx>>,
    vars: HashMap<Symbol, PointerValue<'ctx>>,
    str_counter: u32,
}

impl<'ctx> LlvmBackend<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str, interner: &'ctx Interner, source: &'ctx str) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        LlvmBackend {
            context,
            module,
            builder,
            interner,
            source,
            functions: HashMap::new(),
            vars: HashMap::new(),
            str_counter: 0,
        }
    }

    fn declare_runtime(&mut self) {
        let i32_t = self.context.i32_type();
        let i8ptr = self.context.ptr_type(AddressSpace::default());

        let printf_ty = i32_t.fn_type(&[i8ptr.into()], true);
        self.module.add_function("printf", printf_ty, None);

        let snprintf_ty = i32_t.fn_type(&[i8ptr.into(), self.context.i64_type().into(), i8ptr.into()], true);
        self.module.add_function("snprintf", snprintf_ty, None);

        let strdup_ty = i8ptr.fn_type(&[i8ptr.into()], false);
        self.module.add_function("wyn_strdup", strdup_ty, None);

        let spawn_ty = i8ptr.fn_type(&[i8ptr.into(), i8ptr.into()], false);
        self.module.add_function("wyn_spawn_fast", spawn_ty, None);
    }

    /// Declares a `string_<method>(i8*, ...) -> i8*` runtime entry point the
    /// first time the program calls that method (spec.md §4.5, "method
    /// calls by name-mangling to `string_<method>`").
    fn declare_string_method(&mut self, method: &str, arity: usize) -> FunctionValue<'ctx> {
        let c_name = format!("string_{}", method);
        if let Some(f) = self.module.get_function(&c_name) {
            return f;
        }
        let i8ptr = self.context.ptr_type(AddressSpace::default());
        let mut params: Vec<BasicMetadataTypeEnum> = vec![i8ptr.into()];
        for _ in 0..arity {
            params.push(i8ptr.into());
        }
        let fn_ty = i8ptr.fn_type(&params, false);
        self.module.add_function(&c_name, fn_ty, None)
    }

    /// Lowers every plain top-level function definition in declaration
    /// order (spec.md §4.5, "function definitions with entry-block allocas
    /// for parameters and locals").
    pub fn compile_program(&mut self, program: &Program) -> Result<(), LlvmError> {
        self.declare_runtime();
        self.predeclare_functions(program)?;
        for stmt in program {
            if let StmtKind::FunctionDef {
                name,
                params,
                body,
                type_params,
                is_async,
                extension_receiver: None,
                ..
            } = &stmt.kind
            {
                if !type_params.is_empty() || *is_async {
                    continue;
                }
                self.compile_function(*name, params, body)?;
            }
        }
        Ok(())
    }

    fn basic_type_for(&self, ty: &TypeExpr) -> Result<BasicTypeEnum<'ctx>, LlvmError> {
        match ty {
            TypeExpr::Named { name, args } if args.is_empty() => match self.interner.resolve(*name) {
                "int" => Ok(self.context.i64_type().into()),
                "bool" => Ok(self.context.bool_type().into()),
                "string" => Ok(self.context.ptr_type(AddressSpace::default()).into()),
                _ => Err(LlvmError::UnsupportedConstruct("parameter type outside int/bool/string")),
            },
            _ => Err(LlvmError::UnsupportedConstruct("parameter type outside int/bool/string")),
        }
    }

    fn predeclare_functions(&mut self, program: &Program) -> Result<(), LlvmError> {
        for stmt in program {
            if let StmtKind::FunctionDef {
                name,
                params,
                type_params,
                is_async,
                extension_receiver: None,
                ..
            } = &stmt.kind
            {
                if !type_params.is_empty() || *is_async {
                    continue;
                }
                let mut param_tys: Vec<BasicMetadataTypeEnum> = Vec::with_capacity(params.len());
                for p in params {
                    param_tys.push(self.basic_type_for(&p.ty)?.into());
                }
                let ret_ty = self.context.i64_type();
                let fn_ty = ret_ty.fn_type(&param_tys, false);
                let c_name = self.ident(*name);
                let func = self.module.add_function(&c_name, fn_ty, None);
                self.functions.insert(*name, func);
            }
        }
        Ok(())
    }

    fn compile_function(&mut self, name: Symbol, params: &[Param], body: &[Stmt]) -> Result<(), LlvmError> {
        let func = *self.functions.get(&name).expect("predeclared");
        let entry = self.context.append_basic_block(func, "entry");
        self.builder.position_at_end(entry);
        self.vars.clear();

        for (i, param) in params.iter().enumerate() {
            let sym = self.symbol_of_token(param.name);
            let arg = func.get_nth_param(i as u32).unwrap();
            let alloca = self.builder.build_alloca(arg.get_type(), &self.ident(sym)).unwrap();
            self.builder.build_store(alloca, arg).unwrap();
            self.vars.insert(sym, alloca);
        }

        self.compile_block(body, func)?;

        // A function whose every path already returned has a terminator;
        // otherwise fall through with a zero return so the module stays
        // verifiable (spec.md §4.5, "terminator check to avoid emitting
        // into sealed blocks").
        if self.builder.get_insert_block().unwrap().get_terminator().is_none() {
            self.builder.build_return(Some(&self.context.i64_type().const_int(0, false))).unwrap();
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &[Stmt], func: FunctionValue<'ctx>) -> Result<(), LlvmError> {
        for stmt in block {
            self.compile_stmt(stmt, func)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt, func: FunctionValue<'ctx>) -> Result<(), LlvmError> {
        if self.current_block_has_terminator() {
            // Dead code after a `return`/`break`/`continue` in this block;
            // skip it rather than emit past a terminator.
            return Ok(());
        }
        match &stmt.kind {
            StmtKind::Let { pattern, init, .. } => {
                let names = pattern.bound_names();
                let sym = match names.as_slice() {
                    [single] => *single,
                    _ => return Err(LlvmError::UnsupportedConstruct("destructuring let (use the C backend)")),
                };
                let value = match init {
                    Some(e) => self.compile_expr(e)?,
                    None => self.context.i64_type().const_int(0, false).into(),
                };
                let alloca = self.builder.build_alloca(value.get_type(), &self.ident(sym)).unwrap();
                self.builder.build_store(alloca, value).unwrap();
                self.vars.insert(sym, alloca);
                Ok(())
            }
            StmtKind::Return(Some(e)) => {
                let value = self.compile_expr(e)?;
                self.builder.build_return(Some(&value)).unwrap();
                Ok(())
            }
            StmtKind::Return(None) => {
                self.builder.build_return(Some(&self.context.i64_type().const_int(0, false))).unwrap();
                Ok(())
            }
            StmtKind::Expr(e) => {
                self.compile_expr(e)?;
                Ok(())
            }
            StmtKind::Block(inner) => self.compile_block(inner, func),
            StmtKind::If { cond, then_branch, else_branch } => {
                self.compile_if(cond, then_branch, else_branch.as_deref(), func)
            }
            StmtKind::While { cond, body } => self.compile_while(cond, body, func),
            StmtKind::For { head, body } => self.compile_for(head, body, func),
            StmtKind::Break | StmtKind::Continue => {
                Err(LlvmError::UnsupportedConstruct("break/continue (use the C backend)"))
            }
            StmtKind::Spawn(call_expr) => self.compile_spawn(call_expr),
            _ => Err(LlvmError::UnsupportedConstruct("statement kind outside the LLVM backend's subset")),
        }
    }

    fn current_block_has_terminator(&self) -> bool {
        self.builder
            .get_insert_block()
            .map(|b| b.get_terminator().is_some())
            .unwrap_or(false)
    }

    fn compile_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        func: FunctionValue<'ctx>,
    ) -> Result<(), LlvmError> {
        let cond_val = self.compile_bool(cond)?;
        let then_bb = self.context.append_basic_block(func, "if.then");
        let else_bb = self.context.append_basic_block(func, "if.else");
        let end_bb = self.context.append_basic_block(func, "if.end");

        self.builder.build_conditional_branch(cond_val, then_bb, else_bb).unwrap();

        self.builder.position_at_end(then_bb);
        self.compile_stmt(then_branch, func)?;
        self.branch_to_if_open(end_bb);

        self.builder.position_at_end(else_bb);
        if let Some(else_stmt) = else_branch {
            self.compile_stmt(else_stmt, func)?;
        }
        self.branch_to_if_open(end_bb);

        self.builder.position_at_end(end_bb);
        Ok(())
    }

    fn branch_to_if_open(&mut self, target: BasicBlock<'ctx>) {
        if !self.current_block_has_terminator() {
            self.builder.build_unconditional_branch(target).unwrap();
        }
    }

    fn compile_while(&mut self, cond: &Expr, body: &Stmt, func: FunctionValue<'ctx>) -> Result<(), LlvmError> {
        let cond_bb = self.context.append_basic_block(func, "while.cond");
        let body_bb = self.context.append_basic_block(func, "while.body");
        let end_bb = self.context.append_basic_block(func, "while.end");

        self.builder.build_unconditional_branch(cond_bb).unwrap();
        self.builder.position_at_end(cond_bb);
        let cond_val = self.compile_bool(cond)?;
        self.builder.build_conditional_branch(cond_val, body_bb, end_bb).unwrap();

        self.builder.position_at_end(body_bb);
        self.compile_stmt(body, func)?;
        self.branch_to_if_open(cond_bb);

        self.builder.position_at_end(end_bb);
        Ok(())
    }

    /// Only the C-style `for (init; cond; inc) body` form is in this
    /// backend's subset (spec.md §4.5 "if/for with standard CFG patterns
    /// (cond/body/inc/end blocks)"); for-each lowers through the C backend.
    fn compile_for(&mut self, head: &ForHead, body: &Stmt, func: FunctionValue<'ctx>) -> Result<(), LlvmError> {
        let ForHead::CStyle { init, cond, inc } = head else {
            return Err(LlvmError::UnsupportedConstruct("for-each loop (use the C backend)"));
        };

        if let Some(init_stmt) = init {
            self.compile_stmt(init_stmt, func)?;
        }

        let cond_bb = self.context.append_basic_block(func, "for.cond");
        let body_bb = self.context.append_basic_block(func, "for.body");
        let inc_bb = self.context.append_basic_block(func, "for.inc");
        let end_bb = self.context.append_basic_block(func, "for.end");

        self.builder.build_unconditional_branch(cond_bb).unwrap();
        self.builder.position_at_end(cond_bb);
        let cond_val = match cond {
            Some(c) => self.compile_bool(c)?,
            None => self.context.bool_type().const_int(1, false),
        };
        self.builder.build_conditional_branch(cond_val, body_bb, end_bb).unwrap();

        self.builder.position_at_end(body_bb);
        self.compile_stmt(body, func)?;
        self.branch_to_if_open(inc_bb);

        self.builder.position_at_end(inc_bb);
        if let Some(inc_expr) = inc {
            self.compile_expr(inc_expr)?;
        }
        self.builder.build_unconditional_branch(cond_bb).unwrap();

        self.builder.position_at_end(end_bb);
        Ok(())
    }

    /// `spawn callee(args)`: a wrapper that unpacks a `void*` argument into
    /// the callee's single argument then calls the target, followed by a
    /// call to the runtime spawn primitive with that wrapper (spec.md
    /// §4.5, "spawn by generating a wrapper ... then invoking the runtime
    /// spawn").
    fn compile_spawn(&mut self, call_expr: &Expr) -> Result<(), LlvmError> {
        let ExprKind::Call { callee, args, .. } = &call_expr.kind else {
            return Err(LlvmError::UnsupportedConstruct("spawn target must be a direct call"));
        };
        let ExprKind::Ident(target_name) = &callee.kind else {
            return Err(LlvmError::UnsupportedConstruct("spawn target must be a named function"));
        };
        let target = *self
            .functions
            .get(target_name)
            .ok_or(LlvmError::UnsupportedConstruct("spawn target not a known top-level function"))?;

        let wrapper_name = format!("{}__spawn_wrapper", self.ident(*target_name));
        let i8ptr = self.context.ptr_type(AddressSpace::default());
        let wrapper_ty = i8ptr.fn_type(&[i8ptr.into()], false);
        let wrapper = self.module.add_function(&wrapper_name, wrapper_ty, None);
        let saved_block = self.builder.get_insert_block();

        let entry = self.context.append_basic_block(wrapper, "entry");
        self.builder.position_at_end(entry);
        let raw_arg = wrapper.get_nth_param(0).unwrap().into_pointer_value();
        let int_ty = self.context.i64_type();
        let call_args: Vec<BasicMetadataValueEnum> = if args.is_empty() {
            Vec::new()
        } else {
            let loaded = self.builder.build_load(int_ty, raw_arg, "unpacked").unwrap();
            vec![loaded.into()]
        };
        let result = self.builder.build_call(target, &call_args, "spawn_call").unwrap();
        let result_ptr = match result.try_as_basic_value().left() {
            Some(v) => {
                let boxed = self.builder.build_alloca(v.get_type(), "spawn_result").unwrap();
                self.builder.build_store(boxed, v).unwrap();
                boxed
            }
            None => self.context.ptr_type(AddressSpace::default()).const_null(),
        };
        self.builder.build_return(Some(&result_ptr)).unwrap();

        if let Some(block) = saved_block {
            self.builder.position_at_end(block);
        }

        let spawn_fn = self.module.get_function("wyn_spawn_fast").unwrap();
        let packed_arg: BasicMetadataValueEnum = if let Some(first) = args.first() {
            let v = self.compile_expr(first)?;
            let boxed = self.builder.build_alloca(v.get_type(), "spawn_arg").unwrap();
            self.builder.build_store(boxed, v).unwrap();
            boxed.into()
        } else {
            self.context.ptr_type(AddressSpace::default()).const_null().into()
        };
        let wrapper_ptr = wrapper.as_global_value().as_pointer_value();
        self.builder
            .build_call(spawn_fn, &[wrapper_ptr.into(), packed_arg], "spawn_site")
            .unwrap();
        Ok(())
    }

    fn compile_bool(&mut self, expr: &Expr) -> Result<inkwell::values::IntValue<'ctx>, LlvmError> {
        let v = self.compile_expr(expr)?;
        Ok(v.into_int_value())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(self.context.i64_type().const_int(*n as u64, true).into()),
            ExprKind::BoolLit(b) => Ok(self.context.bool_type().const_int(*b as u64, false).into()),
            ExprKind::Ident(sym) => {
                let ptr = *self
                    .vars
                    .get(sym)
                    .ok_or(LlvmError::UnsupportedConstruct("reference to an unbound identifier"))?;
                Ok(self.builder.build_load(self.context.i64_type(), ptr, &self.ident(*sym)).unwrap())
            }
            ExprKind::StrLit(sym) => Ok(self.compile_string_literal(*sym).into()),
            ExprKind::Interpolation(segments) => self.compile_interpolation(segments),
            ExprKind::Assign { name, value } => {
                let v = self.compile_expr(value)?;
                let ptr = *self
                    .vars
                    .get(name)
                    .ok_or(LlvmError::UnsupportedConstruct("assignment to an unbound identifier"))?;
                self.builder.build_store(ptr, v).unwrap();
                Ok(v)
            }
            ExprKind::Binary { op, left, right } => self.compile_binary(op, left, right),
            ExprKind::Unary { op, operand } => self.compile_unary(op, operand),
            ExprKind::Call { callee, args, .. } => self.compile_call(callee, args),
            ExprKind::MethodCall { receiver, method, args } => self.compile_method_call(receiver, *method, args),
            _ => Err(LlvmError::UnsupportedConstruct("expression kind outside the LLVM backend's subset")),
        }
    }

    fn compile_binary(&mut self, op: &Token, left: &Expr, right: &Expr) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        let lhs = self.compile_expr(left)?.into_int_value();
        let rhs = self.compile_expr(right)?.into_int_value();
        let text = op.lexeme(self.source);
        let result = match text {
            "+" => self.builder.build_int_add(lhs, rhs, "addtmp").unwrap(),
            "-" => self.builder.build_int_sub(lhs, rhs, "subtmp").unwrap(),
            "*" => self.builder.build_int_mul(lhs, rhs, "multmp").unwrap(),
            "/" => self.builder.build_int_signed_div(lhs, rhs, "divtmp").unwrap(),
            "%" => self.builder.build_int_signed_rem(lhs, rhs, "remtmp").unwrap(),
            "==" => self.builder.build_int_compare(IntPredicate::EQ, lhs, rhs, "eqtmp").unwrap(),
            "!=" => self.builder.build_int_compare(IntPredicate::NE, lhs, rhs, "netmp").unwrap(),
            "<" => self.builder.build_int_compare(IntPredicate::SLT, lhs, rhs, "lttmp").unwrap(),
            "<=" => self.builder.build_int_compare(IntPredicate::SLE, lhs, rhs, "letmp").unwrap(),
            ">" => self.builder.build_int_compare(IntPredicate::SGT, lhs, rhs, "gttmp").unwrap(),
            ">=" => self.builder.build_int_compare(IntPredicate::SGE, lhs, rhs, "getmp").unwrap(),
            "and" | "&&" => self.builder.build_and(lhs, rhs, "andtmp").unwrap(),
            "or" | "||" => self.builder.build_or(lhs, rhs, "ortmp").unwrap(),
            _ => return Err(LlvmError::UnsupportedConstruct("binary operator outside the LLVM backend's subset")),
        };
        Ok(result.into())
    }

    fn compile_unary(&mut self, op: &Token, operand: &Expr) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        let v = self.compile_expr(operand)?.into_int_value();
        let text = op.lexeme(self.source);
        let result = match text {
            "-" => self.builder.build_int_neg(v, "negtmp").unwrap(),
            "not" | "!" => self.builder.build_not(v, "nottmp").unwrap(),
            _ => return Err(LlvmError::UnsupportedConstruct("unary operator outside the LLVM backend's subset")),
        };
        Ok(result.into())
    }

    fn compile_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        let ExprKind::Ident(name) = &callee.kind else {
            return Err(LlvmError::UnsupportedConstruct("indirect calls outside the LLVM backend's subset"));
        };
        if self.interner.resolve(*name) == "print" {
            return self.compile_print(args);
        }
        let func = *self
            .functions
            .get(name)
            .ok_or(LlvmError::UnsupportedConstruct("call to an unknown top-level function"))?;
        let mut arg_vals = Vec::with_capacity(args.len());
        for a in args {
            arg_vals.push(BasicMetadataValueEnum::from(self.compile_expr(a)?));
        }
        let call = self.builder.build_call(func, &arg_vals, "calltmp").unwrap();
        Ok(call
            .try_as_basic_value()
            .left()
            .unwrap_or_else(|| self.context.i64_type().const_int(0, false).into()))
    }

    fn compile_print(&mut self, args: &[Expr]) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        let printf = self.module.get_function("printf").unwrap();
        if let Some(first) = args.first() {
            let v = self.compile_expr(first)?;
            if v.is_pointer_value() {
                let fmt = self.compile_string_literal_raw("%s\n");
                self.builder.build_call(printf, &[fmt.into(), v.into()], "printf_call").unwrap();
            } else {
                let fmt = self.compile_string_literal_raw("%lld\n");
                self.builder.build_call(printf, &[fmt.into(), v.into()], "printf_call").unwrap();
            }
        }
        Ok(self.context.i64_type().const_int(0, false).into())
    }

    fn compile_method_call(&mut self, receiver: &Expr, method: Symbol, args: &[Expr]) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        let recv_val = self.compile_expr(receiver)?;
        let method_name = self.interner.resolve(method).to_string();
        let func = self.declare_string_method(&method_name, args.len());
        let mut call_args: Vec<BasicMetadataValueEnum> = vec![recv_val.into()];
        for a in args {
            call_args.push(self.compile_expr(a)?.into());
        }
        let call = self.builder.build_call(func, &call_args, "method_call").unwrap();
        Ok(call
            .try_as_basic_value()
            .left()
            .unwrap_or_else(|| self.context.ptr_type(AddressSpace::default()).const_null().into()))
    }

    /// A string literal becomes a global constant pointer (spec.md §4.5,
    /// "string literal as a global constant pointer").
    fn compile_string_literal(&mut self, sym: Symbol) -> PointerValue<'ctx> {
        let text = self.interner.resolve(sym).to_string();
        self.compile_string_literal_raw(&text)
    }

    fn compile_string_literal_raw(&mut self, text: &str) -> PointerValue<'ctx> {
        self.str_counter += 1;
        let name = format!("__str_{}", self.str_counter);
        let global = self.builder.build_global_string_ptr(text, &name).unwrap();
        global.as_pointer_value()
    }

    /// Interpolated string via a stack buffer + `snprintf` + `wyn_strdup`
    /// (spec.md §4.5, "string interpolation via a stack buffer + snprintf
    /// + strdup").
    fn compile_interpolation(&mut self, segments: &[InterpSegment]) -> Result<BasicValueEnum<'ctx>, LlvmError> {
        let mut fmt = String::new();
        let mut values: Vec<BasicMetadataValueEnum> = Vec::new();
        for seg in segments {
            match seg {
                InterpSegment::Literal(sym) => fmt.push_str(self.interner.resolve(*sym)),
                InterpSegment::Expr(e) => {
                    let v = self.compile_expr(e)?;
                    fmt.push_str(if v.is_pointer_value() { "%s" } else { "%lld" });
                    values.push(v.into());
                }
            }
        }
        let fmt_ptr = self.compile_string_literal_raw(&fmt);
        let buf = self
            .builder
            .build_array_alloca(self.context.i8_type(), self.context.i64_type().const_int(256, false), "interp_buf")
            .unwrap();

        let snprintf = self.module.get_function("snprintf").unwrap();
        let mut call_args: Vec<BasicMetadataValueEnum> =
            vec![buf.into(), self.context.i64_type().const_int(256, false).into(), fmt_ptr.into()];
        call_args.extend(values);
        self.builder.build_call(snprintf, &call_args, "snprintf_call").unwrap();

        let strdup = self.module.get_function("wyn_strdup").unwrap();
        let call = self.builder.build_call(strdup, &[BasicMetadataValueEnum::from(buf)], "strdup_call").unwrap();
        Ok(call.try_as_basic_value().left().unwrap())
    }

    fn symbol_of_token(&self, token: Token) -> Symbol {
        self.interner.lookup(token.lexeme(self.source)).unwrap_or(Symbol::EMPTY)
    }

    fn ident(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    /// Runs LLVM's aggressive optimization pipeline, then emits a native
    /// object file for the host target triple (spec.md §4.5, "runs a
    /// built-in optimization pipeline at an aggressive level, emits an
    /// object file for the host triple").
    pub fn emit_object(&self, output_path: &Path) -> Result<(), LlvmError> {
        Target::initialize_native(&InitializationConfig::default()).map_err(LlvmError::Target)?;
        let triple = TargetMachine::get_default_triple();
        let target = Target::from_triple(&triple).map_err(|e| LlvmError::Target(e.to_string()))?;
        let machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::Aggressive,
                RelocMode::Default,
                CodeModel::Default,
            )
            .ok_or_else(|| LlvmError::Target("failed to create target machine".to_string()))?;

        machine
            .write_to_file(&self.module, FileType::Object, output_path)
            .map_err(|e| LlvmError::Target(e.to_string()))?;
        Ok(())
    }
}

/// Compiles `program` to a native object at `object_path`, then invokes the
/// host linker against the runtime library (spec.md §4.5, "invokes the host
/// linker with the runtime library").
pub fn compile_and_link(
    program: &Program,
    interner: &Interner,
    source: &str,
    object_path: &Path,
    executable_path: &Path,
    runtime_lib_dir: &Path,
) -> Result<(), LlvmError> {
    let context = Context::create();
    let mut backend = LlvmBackend::new(&context, "wyn_module", interner, source);
    backend.compile_program(program)?;
    backend.emit_object(object_path)?;

    let status = std::process::Command::new("cc")
        .arg("-o")
        .arg(executable_path)
        .arg(object_path)
        .arg("-L")
        .arg(runtime_lib_dir)
        .arg("-lwynrt")
        .arg("-lm")
        .status()?;
    if !status.success() {
        return Err(LlvmError::Target("host linker invocation failed".to_string()));
    }
    Ok(())
}
