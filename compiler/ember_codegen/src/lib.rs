//! Ember Codegen - WebAssembly text emission
//!
//! Lowers linked modules to WebAssembly text:
//!
//! - [`infer`]: re-derives expression lanes for coercions and comparisons
//! - [`ExprEmitter`]: expressions to instruction lists
//! - [`FunctionEmitter`]: statements and control flow into a function context
//! - [`returns`]: definite-return analysis deciding value-producing `if`s
//! - [`ModuleEmitter`]: assembles types, imports, globals, data and functions
//!
//! Function contexts live on a [`ContextStack`] behind a [`FrameGuard`];
//! loop labels come from a [`LabelGenerator`] owned by the compilation run.

mod config;
mod context;
mod expr;
mod flow;
mod infer;
mod labels;
mod locals;
mod module;
mod stmt;
mod writer;

pub use config::EmitConfig;
pub use context::{
    ContextStack, FrameGuard, FunctionContext, Scope, VarDescriptor, VarScope,
};
pub use expr::{emit_expr, Code, ExprEmitter};
pub use flow::{never_falls_through, returns};
pub use infer::{infer, lane_of, try_infer};
pub use labels::{LabelGenerator, LoopLabels};
pub use locals::declare_locals;
pub use module::{emit_module, ModuleEmitter};
pub use stmt::FunctionEmitter;
pub use writer::WatWriter;
