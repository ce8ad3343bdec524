use super::*;
use ember_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

#[test]
fn guard_pops_on_drop() {
    let mut stack = ContextStack::new();
    {
        let mut guard = stack.push(FunctionContext::new("f", TypeRef::Void));
        guard.writer.line("nop");
        assert_eq!(guard.name, "f");
    }
    assert_eq!(stack.depth(), 0);
    assert!(stack.current().is_none());
}

#[test]
fn guard_pops_when_emission_fails() {
    fn emit(stack: &mut ContextStack, fail: bool) -> CompileResult<FunctionContext> {
        let mut guard = stack.push(FunctionContext::new("broken", TypeRef::I32));
        guard.writer.line("i32.const 1");
        if fail {
            return Err(CompileError::UnknownVariable {
                name: "nope".to_string(),
            });
        }
        Ok(guard.finish())
    }

    let mut stack = ContextStack::new();
    assert!(emit(&mut stack, true).is_err());
    assert_eq!(stack.depth(), 0);
    assert!(emit(&mut stack, false).is_ok());
    assert_eq!(stack.depth(), 0);

    let guard = stack.push(FunctionContext::new("next", TypeRef::Void));
    let frame = guard.finish();
    assert_eq!(frame.name, "next");
    assert_eq!(stack.depth(), 0);
}

#[test]
fn loop_labels_stack() {
    let mut frame = FunctionContext::new("f", TypeRef::Void);
    let mut labels = crate::LabelGenerator::new();
    assert!(frame.innermost_loop().is_none());
    frame.enter_loop(labels.while_loop());
    frame.enter_loop(labels.for_loop());
    assert_eq!(frame.innermost_loop().unwrap().break_label, "$block_1");
    frame.exit_loop();
    assert_eq!(frame.innermost_loop().unwrap().break_label, "$block_0");
    assert_eq!(frame.loop_depth(), 1);
}

#[test]
fn lookup_precedence_and_unknowns() {
    let meta = ModuleMetadata::new("m", 16);
    let arena = AstArena::new();
    let mut frame = FunctionContext::new("f", TypeRef::Void);
    frame
        .params
        .insert("n", VarDescriptor::new("n", VarScope::Param, TypeRef::F32))
        .unwrap();
    frame
        .locals
        .insert("p_x", VarDescriptor::new("p_x", VarScope::Local, TypeRef::I32))
        .unwrap();
    let scope = Scope::new(&meta, &arena, Some(&frame));
    assert_eq!(scope.lookup("n").unwrap().scope, VarScope::Param);
    assert!(scope.flattened("p", "x").is_some());
    assert!(scope.flattened("p", "y").is_none());
    let err = scope.lookup("missing").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
}
