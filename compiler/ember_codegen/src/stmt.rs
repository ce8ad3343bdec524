//! Statement and control-flow lowering.
//!
//! Loops lower to an outer `block` (the break target) around an inner
//! `loop` (the back-edge target):
//!
//! ```text
//! block $block_N
//!   loop $loop_N
//!     <condition> i32.eqz br_if $block_N
//!     <body>
//!     br $loop_N
//!   end
//! end
//! ```
//!
//! `for` loops wrap the body in `block $continue_N` and run the update
//! after it, so `continue` still reaches the update.

use ember_diagnostic::{CompileError, CompileResult};
use ember_ir::{AstArena, ExprId, ExprKind, LetDecl, StmtId, StmtKind};
use ember_stack::ensure_sufficient_stack;
use ember_symbols::literals::Constant;
use ember_symbols::ModuleMetadata;

use crate::context::{FunctionContext, Scope};
use crate::expr::{constant, store, Code, ExprEmitter};
use crate::flow::{never_falls_through, returns};
use crate::labels::{LabelGenerator, LoopLabels};

/// Lowers the body of one function into its context's writer.
pub struct FunctionEmitter<'a, 'f> {
    meta: &'a ModuleMetadata,
    arena: &'a AstArena,
    frame: &'f mut FunctionContext,
    labels: &'f mut LabelGenerator,
}

impl<'a, 'f> FunctionEmitter<'a, 'f> {
    pub fn new(
        meta: &'a ModuleMetadata,
        arena: &'a AstArena,
        frame: &'f mut FunctionContext,
        labels: &'f mut LabelGenerator,
    ) -> Self {
        FunctionEmitter {
            meta,
            arena,
            frame,
            labels,
        }
    }

    fn exprs(&self) -> ExprEmitter<'_> {
        ExprEmitter::new(Scope::new(self.meta, self.arena, Some(&*self.frame)))
    }

    fn write(&mut self, code: &[String]) {
        self.frame.writer.instructions(code);
    }

    fn line(&mut self, instr: &str) {
        self.frame.writer.instructions(&[instr]);
    }

    /// Lower a function body.
    ///
    /// A function with a result whose body may fall off the end finishes
    /// with `unreachable`; a loop whose body returns can still exit.
    ///
    /// Locals come into scope at their `let`; before it, the name resolves
    /// as though the local did not exist.
    pub fn emit_body(&mut self, body: StmtId) -> CompileResult<()> {
        self.frame.hide_locals();
        self.emit_stmt(body, true)?;
        if !self.frame.result.is_void() && !never_falls_through(body, self.arena) {
            self.line("unreachable");
        }
        Ok(())
    }

    /// Lower one statement. `tail` marks the last statement of the body.
    pub fn emit_stmt(&mut self, id: StmtId, tail: bool) -> CompileResult<()> {
        let arena = self.arena;
        ensure_sufficient_stack(|| match arena.stmt(id) {
            StmtKind::Block(stmts) => {
                let last = stmts.len().saturating_sub(1);
                for (i, &stmt) in stmts.iter().enumerate() {
                    self.emit_stmt(stmt, tail && i == last)?;
                }
                Ok(())
            }
            StmtKind::Let(decl) => self.emit_let(decl),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.emit_if(id, *condition, *then_branch, *else_branch, tail),
            StmtKind::While { condition, body } => {
                let labels = self.labels.while_loop();
                self.emit_loop(labels, *condition, *body, None)
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.emit_stmt(*init, false)?;
                }
                let labels = self.labels.for_loop();
                self.emit_loop(labels, *condition, *body, Some(*update))
            }
            StmtKind::Return(value) => self.emit_return(*value),
            StmtKind::Break => {
                let labels = self.innermost_loop("break")?;
                self.line(&format!("br {}", labels.break_label));
                Ok(())
            }
            StmtKind::Continue => {
                let labels = self.innermost_loop("continue")?;
                self.line(&format!("br {}", labels.continue_label));
                Ok(())
            }
            StmtKind::Expr(expr) => {
                let mut code = Code::new();
                self.exprs().emit_discarded(*expr, &mut code)?;
                self.write(&code);
                Ok(())
            }
            kind @ (StmtKind::Function(_) | StmtKind::Struct(_) | StmtKind::Import(_)) => Err(
                CompileError::not_implemented(format!("nested {} declaration", kind.variant_name())),
            ),
        })
    }

    fn emit_let(&mut self, decl: &LetDecl) -> CompileResult<()> {
        let mut code = Code::new();
        let meta = self.meta;
        let mut revealed = vec![decl.name.clone()];
        let exprs = self.exprs();
        if let ExprKind::Struct { name, fields } = self.arena.expr(decl.init) {
            let layout = meta.struct_layout(name)?;
            for field in fields {
                layout.member(&field.name)?;
            }
            exprs.emit(decl.init, &mut code)?;
            code.push(format!("local.set ${}", decl.name));
            // Each member lands in its local and in the struct's memory.
            for (member, layout_member) in layout.members.iter() {
                let Some(scalar) = layout_member.ty.storage_scalar() else {
                    return Err(CompileError::not_implemented(format!(
                        "member `{member}` of type `void`"
                    )));
                };
                let lane = layout_member.ty.lane();
                code.push(format!("local.get ${}", decl.name));
                match fields.iter().find(|field| field.name == member) {
                    Some(field) => exprs.emit_as(field.value, lane, &mut code)?,
                    None => code.push(constant(Constant::Int(0), lane)),
                }
                code.push(format!("local.tee ${}_{member}", decl.name));
                code.push(store(scalar, layout_member.offset));
                revealed.push(format!("{}_{member}", decl.name));
            }
        } else {
            let lane = self
                .frame
                .locals
                .get(&decl.name)
                .map(|local| local.ty.lane())
                .ok_or_else(|| CompileError::UnknownVariable {
                    name: decl.name.clone(),
                })?;
            exprs.emit_as(decl.init, lane, &mut code)?;
            code.push(format!("local.set ${}", decl.name));
        }
        self.write(&code);
        for name in &revealed {
            self.frame.reveal(name);
        }
        Ok(())
    }

    /// A conditional yields a value when both arms return from a function
    /// that has a result.
    fn emit_if(
        &mut self,
        id: StmtId,
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        tail: bool,
    ) -> CompileResult<()> {
        let result = self.frame.result.lane().wasm_type();
        let yields = match result {
            Some(ty) if returns(id, self.arena) => Some(ty),
            _ => None,
        };

        let mut code = Code::new();
        self.exprs().emit_condition(condition, &mut code)?;
        code.push(match yields {
            Some(ty) => format!("if (result {ty})"),
            None => "if".to_string(),
        });
        self.write(&code);

        self.emit_arm(then_branch, yields.is_some())?;
        if let Some(else_branch) = else_branch {
            self.line("else");
            self.emit_arm(else_branch, yields.is_some())?;
        }
        self.line("end");

        if yields.is_some() && !tail {
            self.line("unreachable");
        }
        Ok(())
    }

    /// An arm of a value-producing `if` that can still fall through, through
    /// a loop, ends in `unreachable`.
    fn emit_arm(&mut self, arm: StmtId, yields: bool) -> CompileResult<()> {
        self.emit_stmt(arm, false)?;
        if yields && !never_falls_through(arm, self.arena) {
            self.line("unreachable");
        }
        Ok(())
    }

    fn emit_loop(
        &mut self,
        labels: LoopLabels,
        condition: ExprId,
        body: StmtId,
        update: Option<Option<ExprId>>,
    ) -> CompileResult<()> {
        let mut code = vec![
            format!("block {}", labels.break_label),
            format!("loop {}", labels.loop_label),
        ];
        self.exprs().emit_condition(condition, &mut code)?;
        code.push("i32.eqz".to_string());
        code.push(format!("br_if {}", labels.break_label));
        self.write(&code);

        let is_for = update.is_some();
        if is_for {
            self.line(&format!("block {}", labels.continue_label));
        }
        self.frame.enter_loop(labels.clone());
        let body_result = self.emit_stmt(body, false);
        self.frame.exit_loop();
        body_result?;
        if is_for {
            self.line("end");
        }

        let mut code = Code::new();
        if let Some(Some(update)) = update {
            self.exprs().emit_discarded(update, &mut code)?;
        }
        code.push(format!("br {}", labels.loop_label));
        code.push("end".to_string());
        code.push("end".to_string());
        self.write(&code);
        Ok(())
    }

    fn emit_return(&mut self, value: Option<ExprId>) -> CompileResult<()> {
        let mut code = Code::new();
        if let Some(value) = value {
            let lane = self.frame.result.lane();
            if lane.wasm_type().is_some() {
                self.exprs().emit_as(value, lane, &mut code)?;
            } else {
                self.exprs().emit_discarded(value, &mut code)?;
            }
        }
        code.push("return".to_string());
        self.write(&code);
        Ok(())
    }

    fn innermost_loop(&self, statement: &'static str) -> CompileResult<LoopLabels> {
        self.frame
            .innermost_loop()
            .cloned()
            .ok_or(CompileError::NoEnclosingLoop { statement })
    }
}
