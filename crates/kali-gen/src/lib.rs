//! kali-gen - AST to LLVM IR lowering.
//!
//! The whole pass lives in one [`CodegenContext`]: the LLVM context
//! handle, the module being built, the instruction builder, the
//! per-function symbol table of stack slots, and the debug-info
//! state. Lowering walks the AST with the context passed by mutable
//! reference; each expression leaves its value as a double in the
//! current basic block.
//!
//! Mutable bindings never live in registers at this stage. Every
//! binding gets an alloca in the function's entry block and every
//! read is a load, so the downstream mem2reg pass can promote them
//! wholesale.

mod context;
mod debug;
mod error;
mod lower;


pub use context::CodegenContext;
pub use error::{CodegenError, Result};
