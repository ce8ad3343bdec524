use pretty_assertions::assert_eq;

use super::*;

#[test]
fn messages_name_the_symbol() {
    let err = CompileError::duplicate(SymbolKind::Function, "add1");
    assert_eq!(err.to_string(), "duplicate function definition `add1`");

    let err = CompileError::UnknownStdlibExport {
        module: "memory".into(),
        name: "calloc".into(),
    };
    assert_eq!(
        err.to_string(),
        "standard library module `memory` does not export `calloc`"
    );
}

#[test]
fn categories() {
    assert_eq!(
        CompileError::duplicate(SymbolKind::Import, "x").category(),
        ErrorCategory::DuplicateDefinition
    );
    assert_eq!(
        CompileError::UnknownVariable { name: "y".into() }.category(),
        ErrorCategory::UnresolvedReference
    );
    assert_eq!(
        CompileError::not_implemented("prefix expression type inference").category(),
        ErrorCategory::UnsupportedConstruct
    );
    assert_eq!(
        CompileError::InvalidAlignment { align: 0 }.category(),
        ErrorCategory::Layout
    );
}

#[test]
fn link_context_wraps_and_delegates() {
    let err = CompileError::Link {
        module: "main".into(),
        import: "helper".into(),
        source: Box::new(CompileError::UnknownExport {
            module: "util".into(),
            name: "helper".into(),
        }),
    };
    assert_eq!(
        err.to_string(),
        "in module `main`, import `helper`: module `util` does not export `helper`"
    );
    assert_eq!(err.code(), ErrorCode::E2007);
    assert!(matches!(err.root(), CompileError::UnknownExport { .. }));
}
