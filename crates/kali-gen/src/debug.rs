//! Debug-info plumbing.
//!
//! Lowering tells this module the current source location before each
//! expression and brackets every function body in a subprogram scope.
//! Everything else (compile unit, the `double` basic type, subroutine
//! types) is owned here so the rest of the pass never touches the
//! debug-info builder directly.

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::debug_info::{
    AsDIScope, DIBasicType, DICompileUnit, DIFlags, DIFlagsConstants, DIScope, DISubroutineType,
    DWARFEmissionKind, DWARFSourceLanguage, DebugInfoBuilder,
};
use inkwell::module::Module;
use inkwell::values::FunctionValue;

use kali_util::Span;

use crate::error::{CodegenError, Result};

/// DWARF base-type encoding for binary floating point.
const DW_ATE_FLOAT: u32 = 0x04;

pub(crate) struct DebugInfo<'ctx> {
    builder: DebugInfoBuilder<'ctx>,
    compile_unit: DICompileUnit<'ctx>,
    double_type: DIBasicType<'ctx>,

    /// Stack of scopes; the innermost one receives new locations.
    lexical_blocks: Vec<DIScope<'ctx>>,
}

impl<'ctx> DebugInfo<'ctx> {
    pub(crate) fn new(module: &Module<'ctx>, name: &str) -> Result<Self> {
        let (builder, compile_unit) = module.create_debug_info_builder(
            true,
            DWARFSourceLanguage::C,
            name,
            ".",
            "kali",
            false,
            "",
            0,
            "",
            DWARFEmissionKind::Full,
            0,
            false,
            false,
            "",
            "",
        );
        let double_type = builder
            .create_basic_type("double", 64, DW_ATE_FLOAT, DIFlags::PUBLIC)
            .map_err(|message| CodegenError::DebugInfo(message.to_string()))?;

        Ok(Self {
            builder,
            compile_unit,
            double_type,
            lexical_blocks: Vec::new(),
        })
    }

    /// Point the IR builder's debug location at `span`; `None` clears
    /// it (used around function prologues).
    pub(crate) fn emit_location(
        &self,
        context: &'ctx Context,
        builder: &Builder<'ctx>,
        span: Option<Span>,
    ) {
        let span = match span {
            Some(span) => span,
            None => return builder.unset_current_debug_location(),
        };

        let scope = self
            .lexical_blocks
            .last()
            .copied()
            .unwrap_or_else(|| self.compile_unit.as_debug_info_scope());
        let location = context.create_debug_location(span.line, span.column, scope, None);
        builder.set_current_debug_location(location);
    }

    /// Attach a subprogram to `function` and make it the innermost
    /// scope. Paired with [`DebugInfo::pop_subprogram`].
    pub(crate) fn push_subprogram(
        &mut self,
        function: FunctionValue<'ctx>,
        name: &str,
        arity: usize,
        span: Span,
    ) {
        let file = self.compile_unit.get_file();
        let subroutine_type = self.subroutine_type(arity);
        let subprogram = self.builder.create_function(
            file.as_debug_info_scope(),
            name,
            None,
            file,
            span.line,
            subroutine_type,
            false,
            true,
            span.line,
            DIFlags::PROTOTYPED,
            false,
        );
        function.set_subprogram(subprogram);
        self.lexical_blocks.push(subprogram.as_debug_info_scope());
    }

    pub(crate) fn pop_subprogram(&mut self) {
        self.lexical_blocks.pop();
    }

    /// `double(double, ..., double)` with `arity` parameters.
    fn subroutine_type(&self, arity: usize) -> DISubroutineType<'ctx> {
        let double = self.double_type.as_type();
        let parameter_types = vec![double; arity];
        self.builder.create_subroutine_type(
            self.compile_unit.get_file(),
            Some(double),
            &parameter_types,
            DIFlags::PUBLIC,
        )
    }

    pub(crate) fn finalize(&self) {
        self.builder.finalize();
    }
}
