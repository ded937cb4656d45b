//! Lowering rules, one per AST variant.

use inkwell::basic_block::BasicBlock;
use inkwell::module::Linkage;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicMetadataValueEnum, FloatValue, FunctionValue};
use inkwell::FloatPredicate;

use kali_par::{Binding, Expr, ExprKind, Function, Prototype};

use crate::context::CodegenContext;
use crate::error::{CodegenError, Result};

impl<'ctx> CodegenContext<'ctx> {
    /// Lower an expression into the current basic block and return
    /// the double it evaluates to.
    pub fn lower_expr(&mut self, expr: &Expr) -> Result<FloatValue<'ctx>> {
        self.debug
            .emit_location(self.context, &self.builder, Some(expr.span));

        match &expr.kind {
            ExprKind::Number(value) => Ok(self.context.f64_type().const_float(*value)),
            ExprKind::Variable(name) => self.lower_variable(name),
            ExprKind::Unary { op, .. } => Err(CodegenError::InvalidUnaryOperator(*op)),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs),
            ExprKind::Call { callee, args } => self.lower_call(callee, args),
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => self.lower_if(cond, then, otherwise),
            ExprKind::For {
                var,
                start,
                end,
                step,
                body,
            } => self.lower_for(var, start, end, step.as_deref(), body),
            ExprKind::VarIn { bindings, body } => self.lower_var_in(bindings, body),
        }
    }

    /// Load a variable from its stack slot.
    fn lower_variable(&mut self, name: &str) -> Result<FloatValue<'ctx>> {
        let slot = self
            .lookup(name)
            .ok_or_else(|| CodegenError::UnknownVariable(name.to_string()))?;
        let value = self.builder.build_load(self.context.f64_type(), slot, name)?;
        Ok(value.into_float_value())
    }

    fn lower_binary(&mut self, op: char, lhs: &Expr, rhs: &Expr) -> Result<FloatValue<'ctx>> {
        // Assignment is special: the left side is a store target, not
        // a value to evaluate.
        if op == '=' {
            return self.lower_assignment(lhs, rhs);
        }

        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;
        let f64_type = self.context.f64_type();

        match op {
            '+' => Ok(self.builder.build_float_add(l, r, "addtmp")?),
            '-' => Ok(self.builder.build_float_sub(l, r, "subtmp")?),
            '*' => Ok(self.builder.build_float_mul(l, r, "multmp")?),
            '/' => Ok(self.builder.build_float_div(l, r, "divtmp")?),
            '<' | '>' => {
                let predicate = if op == '<' {
                    FloatPredicate::ULT
                } else {
                    FloatPredicate::UGT
                };
                let cmp = self.builder.build_float_compare(predicate, l, r, "cmptmp")?;
                // Unsigned conversion: the i1 becomes 0.0 or 1.0, not
                // -1.0 as a signed conversion would produce.
                Ok(self
                    .builder
                    .build_unsigned_int_to_float(cmp, f64_type, "booltmp")?)
            }
            // Sequencing: evaluate both, keep the right value.
            ':' => Ok(r),
            op => Err(CodegenError::InvalidBinaryOperator(op)),
        }
    }

    fn lower_assignment(&mut self, lhs: &Expr, rhs: &Expr) -> Result<FloatValue<'ctx>> {
        let name = match &lhs.kind {
            ExprKind::Variable(name) => name,
            _ => return Err(CodegenError::InvalidAssignment),
        };

        let value = self.lower_expr(rhs)?;
        let slot = self
            .lookup(name)
            .ok_or_else(|| CodegenError::UnknownVariable(name.clone()))?;
        self.builder.build_store(slot, value)?;
        Ok(value)
    }

    fn lower_call(&mut self, callee: &str, args: &[Expr]) -> Result<FloatValue<'ctx>> {
        let function = self
            .module
            .get_function(callee)
            .ok_or_else(|| CodegenError::UnknownFunction(callee.to_string()))?;

        if function.count_params() as usize != args.len() {
            return Err(CodegenError::ArityMismatch {
                name: callee.to_string(),
                expected: function.count_params(),
                found: args.len(),
            });
        }

        let mut lowered: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for arg in args {
            lowered.push(self.lower_expr(arg)?.into());
        }

        let call = self.builder.build_call(function, &lowered, "calltmp")?;
        call.try_as_basic_value()
            .left()
            .map(|value| value.into_float_value())
            .ok_or_else(|| CodegenError::Internal("call produced no value".to_string()))
    }

    /// `if` lowers to a diamond: the condition selects `then` or
    /// `else`, both fall through to `ifcont`, and a phi merges the
    /// branch values.
    fn lower_if(&mut self, cond: &Expr, then: &Expr, otherwise: &Expr) -> Result<FloatValue<'ctx>> {
        let f64_type = self.context.f64_type();

        let cond_value = self.lower_expr(cond)?;
        let predicate = self.builder.build_float_compare(
            FloatPredicate::ONE,
            cond_value,
            f64_type.const_float(0.0),
            "ifcond",
        )?;

        let function = self.current_function()?;
        let then_block = self.context.append_basic_block(function, "then");
        let else_block = self.context.append_basic_block(function, "else");
        let merge_block = self.context.append_basic_block(function, "ifcont");

        self.builder
            .build_conditional_branch(predicate, then_block, else_block)?;

        // Lowering a branch can move the insertion point (nested
        // control flow ends in its own block), so the phi records the
        // block each branch actually finished in.
        self.builder.position_at_end(then_block);
        let then_value = self.lower_expr(then)?;
        self.builder.build_unconditional_branch(merge_block)?;
        let then_end = self.insert_block()?;

        self.builder.position_at_end(else_block);
        let else_value = self.lower_expr(otherwise)?;
        self.builder.build_unconditional_branch(merge_block)?;
        let else_end = self.insert_block()?;

        self.builder.position_at_end(merge_block);
        let phi = self.builder.build_phi(f64_type, "iftmp")?;
        phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);
        Ok(phi.as_basic_value().into_float_value())
    }

    /// `for` runs its body, bumps the induction slot by the step, and
    /// loops while the end condition is nonzero. The body executes
    /// before the first test; the expression is always 0.0.
    fn lower_for(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
    ) -> Result<FloatValue<'ctx>> {
        let f64_type = self.context.f64_type();
        let function = self.current_function()?;

        let slot = self.create_entry_block_alloca(function, var)?;
        let start_value = self.lower_expr(start)?;
        self.builder.build_store(slot, start_value)?;

        let loop_block = self.context.append_basic_block(function, "loop");
        self.builder.build_unconditional_branch(loop_block)?;
        self.builder.position_at_end(loop_block);

        // The induction variable shadows any same-named outer binding
        // for the duration of the loop.
        let shadowed = self.bind(var, slot);

        // Body value is discarded.
        self.lower_expr(body)?;

        let step_value = match step {
            Some(step) => self.lower_expr(step)?,
            None => f64_type.const_float(1.0),
        };
        let current = self
            .builder
            .build_load(f64_type, slot, var)?
            .into_float_value();
        let next = self.builder.build_float_add(current, step_value, "nextvar")?;
        self.builder.build_store(slot, next)?;

        let end_value = self.lower_expr(end)?;
        let keep_going = self.builder.build_float_compare(
            FloatPredicate::ONE,
            end_value,
            f64_type.const_float(0.0),
            "loopcond",
        )?;

        let after_block = self.context.append_basic_block(function, "afterloop");
        self.builder
            .build_conditional_branch(keep_going, loop_block, after_block)?;
        self.builder.position_at_end(after_block);

        self.restore(var, shadowed);

        Ok(f64_type.const_float(0.0))
    }

    /// `var ... in` allocates one slot per binding, runs the body
    /// under the new bindings, and puts the old ones back.
    fn lower_var_in(&mut self, bindings: &[Binding], body: &Expr) -> Result<FloatValue<'ctx>> {
        let function = self.current_function()?;

        let mut shadowed = Vec::with_capacity(bindings.len());
        for binding in bindings {
            // Initializers run before their own binding is installed,
            // so `var a = a in ...` reads the outer `a`.
            let value = match &binding.init {
                Some(init) => self.lower_expr(init)?,
                None => self.context.f64_type().const_float(0.0),
            };

            let slot = self.create_entry_block_alloca(function, &binding.name)?;
            self.builder.build_store(slot, value)?;
            shadowed.push((binding.name.clone(), self.bind(&binding.name, slot)));
        }

        let body_value = self.lower_expr(body)?;

        for (name, old) in shadowed {
            self.restore(&name, old);
        }

        Ok(body_value)
    }

    /// Create the declaration for a prototype: externally linked
    /// `double(double, ...)` with named formals.
    pub fn lower_prototype(&mut self, prototype: &Prototype) -> Result<FunctionValue<'ctx>> {
        let f64_type = self.context.f64_type();
        let parameter_types: Vec<BasicMetadataTypeEnum> =
            vec![f64_type.into(); prototype.arity()];
        let fn_type = f64_type.fn_type(&parameter_types, false);

        let function =
            self.module
                .add_function(&prototype.name, fn_type, Some(Linkage::External));
        for (param, name) in function.get_param_iter().zip(&prototype.params) {
            param.set_name(name);
        }
        Ok(function)
    }

    /// Lower a full definition: reuse or create the declaration,
    /// build the body in a fresh entry block, return the body value,
    /// and verify. A failed body erases the function so a later
    /// attempt at the same name can succeed.
    pub fn lower_function(&mut self, def: &Function) -> Result<FunctionValue<'ctx>> {
        let prototype = &def.prototype;

        // A previous `extern` may have declared this function.
        let function = match self.module.get_function(&prototype.name) {
            Some(existing) => existing,
            None => self.lower_prototype(prototype)?,
        };

        if function.count_basic_blocks() > 0 {
            return Err(CodegenError::Redefinition(prototype.name.clone()));
        }

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.debug
            .push_subprogram(function, &prototype.name, prototype.arity(), def.span);

        let result = self.lower_function_body(function, def);
        self.debug.pop_subprogram();

        match result {
            Ok(()) => {
                if function.verify(true) {
                    Ok(function)
                } else {
                    // SAFETY: the function was created above and
                    // nothing outside the module refers to it yet.
                    unsafe { function.delete() };
                    Err(CodegenError::Verify(prototype.name.clone()))
                }
            }
            Err(err) => {
                // SAFETY: as above; dropping the half-built function
                // lets a later definition reuse the name.
                unsafe { function.delete() };
                Err(err)
            }
        }
    }

    fn lower_function_body(&mut self, function: FunctionValue<'ctx>, def: &Function) -> Result<()> {
        // No location on the prologue; locations resume with the body.
        self.debug.emit_location(self.context, &self.builder, None);

        // Fresh symbol table: one entry-block slot per formal, so
        // parameters are as mutable as any other binding.
        self.clear_bindings();
        for (param, name) in function.get_param_iter().zip(&def.prototype.params) {
            param.set_name(name);
            let slot = self.create_entry_block_alloca(function, name)?;
            self.builder.build_store(slot, param)?;
            self.bind(name, slot);
        }

        let body_value = self.lower_expr(&def.body)?;
        self.builder.build_return(Some(&body_value))?;
        Ok(())
    }

    fn insert_block(&self) -> Result<BasicBlock<'ctx>> {
        self.builder
            .get_insert_block()
            .ok_or_else(|| CodegenError::Internal("builder has no insertion point".to_string()))
    }

    fn current_function(&self) -> Result<FunctionValue<'ctx>> {
        self.insert_block()?
            .get_parent()
            .ok_or_else(|| CodegenError::Internal("block has no parent function".to_string()))
    }
}
