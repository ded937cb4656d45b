//! The lowering context.
//!
//! One object owns everything lowering touches: module, builder,
//! symbol table, debug info. It is passed by mutable reference
//! through every lowering call, which keeps the borrow story trivial
//! for a single-threaded front end.

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::{FunctionValue, PointerValue};
use rustc_hash::FxHashMap;

use crate::debug::DebugInfo;
use crate::error::{CodegenError, Result};

pub struct CodegenContext<'ctx> {
    pub(crate) context: &'ctx Context,
    pub(crate) module: Module<'ctx>,
    pub(crate) builder: Builder<'ctx>,

    /// Per-function symbol table: identifier to entry-block stack
    /// slot. Cleared when a new function body starts; scoped forms
    /// shadow and restore entries around their bodies.
    pub(crate) named_values: FxHashMap<String, PointerValue<'ctx>>,

    pub(crate) debug: DebugInfo<'ctx>,
}

impl<'ctx> CodegenContext<'ctx> {
    /// Create a context building into a fresh module.
    pub fn new(context: &'ctx Context, module_name: &str) -> Result<Self> {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        let debug = DebugInfo::new(&module, module_name)?;
        Ok(Self {
            context,
            module,
            builder,
            named_values: FxHashMap::default(),
            debug,
        })
    }

    /// The module lowering emits into.
    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    /// Flush pending debug-info metadata. Call once after the last
    /// item, before printing or handing the module on.
    pub fn finalize(&self) {
        self.debug.finalize();
    }

    /// Allocate a double-sized stack slot at the head of `function`'s
    /// entry block, regardless of where the builder currently sits.
    pub(crate) fn create_entry_block_alloca(
        &self,
        function: FunctionValue<'ctx>,
        name: &str,
    ) -> Result<PointerValue<'ctx>> {
        let entry = function.get_first_basic_block().ok_or_else(|| {
            CodegenError::Internal(format!(
                "function '{}' has no entry block",
                function.get_name().to_string_lossy()
            ))
        })?;

        let tmp = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => tmp.position_before(&first),
            None => tmp.position_at_end(entry),
        }
        Ok(tmp.build_alloca(self.context.f64_type(), name)?)
    }

    /// Resolve a name to its stack slot.
    pub(crate) fn lookup(&self, name: &str) -> Option<PointerValue<'ctx>> {
        self.named_values.get(name).copied()
    }

    /// Install a binding, returning the slot it shadowed, if any.
    pub(crate) fn bind(
        &mut self,
        name: &str,
        slot: PointerValue<'ctx>,
    ) -> Option<PointerValue<'ctx>> {
        self.named_values.insert(name.to_string(), slot)
    }

    /// Undo a `bind`: reinstate the shadowed slot, or remove the
    /// entry when there was none.
    pub(crate) fn restore(&mut self, name: &str, shadowed: Option<PointerValue<'ctx>>) {
        match shadowed {
            Some(slot) => {
                self.named_values.insert(name.to_string(), slot);
            }
            None => {
                self.named_values.remove(name);
            }
        }
    }

    /// Drop every binding; each function body starts from scratch.
    pub(crate) fn clear_bindings(&mut self) {
        self.named_values.clear();
    }

    /// The names currently bound, sorted. Test hook for the scope
    /// discipline invariants.
    #[cfg(test)]
    pub(crate) fn binding_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.named_values.keys().cloned().collect();
        names.sort();
        names
    }
}
