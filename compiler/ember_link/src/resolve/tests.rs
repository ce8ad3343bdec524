use super::*;
use ember_diagnostic::{ErrorCategory, ErrorCode};
use ember_ir::{AstBuilder, Module, TypeRef};
use ember_symbols::extract;
use pretty_assertions::assert_eq;

fn importer(module: &str, names: &[&str]) -> Module {
    let mut b = AstBuilder::new("main");
    let import = b.import(module, names);
    b.item(import);
    b.finish()
}

fn library() -> Module {
    let mut b = AstBuilder::new("lib");
    let n = b.ident("n");
    let ret = b.ret(Some(n));
    let body = b.block(vec![ret]);
    let id = b.function("id", &[("n", TypeRef::F32)], TypeRef::F32, body, true);
    b.item(id);
    let hidden_body = b.block(vec![]);
    let hidden = b.function("hidden", &[], TypeRef::Void, hidden_body, false);
    b.item(hidden);
    let seven = b.int(7);
    let count = b.export_let("count", None, seven);
    b.item(count);
    b.finish()
}

#[test]
fn malloc_resolves_to_catalog_export() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let meta = extract(&importer("memory", &["malloc"])).unwrap();
    let linked = link(vec![meta], &catalog).unwrap();
    let main = linked.get("main").unwrap().metadata();
    let malloc = main.imports.get("malloc").unwrap();
    assert!(malloc.is_resolved());
    assert_eq!(
        malloc.descriptor(),
        catalog.get("memory").unwrap().exports.get("malloc")
    );
    assert_eq!(
        malloc.descriptor().unwrap().as_function().unwrap().encoded(),
        "i_i"
    );
}

#[test]
fn unknown_stdlib_name_names_module_and_symbol() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let meta = extract(&importer("memory", &["calloc"])).unwrap();
    let err = link(vec![meta], &catalog).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UnresolvedReference);
    assert_eq!(err.code(), ErrorCode::E2006);
    assert_eq!(
        err.root(),
        &CompileError::UnknownStdlibExport {
            module: "memory".to_string(),
            name: "calloc".to_string(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("memory"), "{message}");
    assert!(message.contains("calloc"), "{message}");
    assert!(message.contains("main"), "{message}");
}

#[test]
fn resolves_against_sibling_exports() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let main = extract(&importer("lib", &["id", "count"])).unwrap();
    let lib = extract(&library()).unwrap();
    let linked = link(vec![main, lib], &catalog).unwrap();
    let main = linked.get("main").unwrap().metadata();
    assert_eq!(
        main.imports
            .get("id")
            .unwrap()
            .descriptor()
            .unwrap()
            .as_function()
            .unwrap()
            .encoded(),
        "f_f"
    );
    assert_eq!(
        main.imports.get("count").unwrap().descriptor(),
        Some(&ExportDescriptor::Global {
            ty: TypeRef::I32,
            memory_backed: false,
        })
    );
    assert_eq!(linked.len(), 2);
}

#[test]
fn missing_module_fails() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let main = extract(&importer("nowhere", &["f"])).unwrap();
    let err = link(vec![main], &catalog).unwrap_err();
    assert_eq!(
        err.root(),
        &CompileError::MissingModule {
            module: "nowhere".to_string(),
        }
    );
}

#[test]
fn unexported_name_fails() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let main = extract(&importer("lib", &["hidden"])).unwrap();
    let lib = extract(&library()).unwrap();
    let err = link(vec![main, lib], &catalog).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2007);
    assert!(matches!(
        &err,
        CompileError::Link { module, import, .. } if module == "main" && import == "hidden"
    ));
}

#[test]
fn relinking_is_a_no_op() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let meta = extract(&importer("math", &["sqrt"])).unwrap();
    let once = link(vec![meta], &catalog).unwrap();
    let metas: Vec<ModuleMetadata> = once
        .clone()
        .into_modules()
        .into_iter()
        .map(LinkedModule::into_metadata)
        .collect();
    // an empty catalog would fail any lookup that actually happened
    let twice = link(metas, &StdlibCatalog::empty()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn duplicate_module_names_fail() {
    let catalog = StdlibCatalog::empty();
    let a = extract(&library()).unwrap();
    let b = extract(&library()).unwrap();
    let err = link(vec![a, b], &catalog).unwrap_err();
    assert_eq!(err, CompileError::duplicate(SymbolKind::Module, "lib"));
}
