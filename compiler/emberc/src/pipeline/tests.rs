use super::*;
use crate::config::ToolPaths;
use crate::error::{LoadError, ToolchainError};
use crate::loader::MapLoader;
use ember_diagnostic::ErrorCode;
use ember_ir::{AstBuilder, BinaryOp, TypeRef};
use pretty_assertions::assert_eq;

/// `import { twice } from "lib"; import { malloc } from "memory";`
/// `let banner = "hi";`
/// `export fn main(): i32 { while (true) { break; } return twice(malloc(4)); }`
fn main_module() -> Module {
    let mut b = AstBuilder::new("main");
    let lib = b.import("lib", &["twice"]);
    b.item(lib);
    let memory = b.import("memory", &["malloc"]);
    b.item(memory);
    let text = b.string("hi");
    let banner = b.let_stmt("banner", None, text);
    b.item(banner);
    let t = b.bool(true);
    let brk = b.brk();
    let loop_body = b.block(vec![brk]);
    let looped = b.while_stmt(t, loop_body);
    let four = b.int(4);
    let alloc = b.call("malloc", vec![four]);
    let call = b.call("twice", vec![alloc]);
    let ret = b.ret(Some(call));
    let body = b.block(vec![looped, ret]);
    let main = b.function("main", &[], TypeRef::I32, body, true);
    b.item(main);
    b.finish()
}

/// `let greeting = "ok";`
/// `export fn twice(n: i32): i32 { while (n > 100) { n = n - 100; } return n * 2; }`
fn lib_module() -> Module {
    let mut b = AstBuilder::new("lib");
    let text = b.string("ok");
    let greeting = b.let_stmt("greeting", None, text);
    b.item(greeting);
    let n = b.ident("n");
    let hundred = b.int(100);
    let cond = b.infix(BinaryOp::Gt, n, hundred);
    let less = b.infix(BinaryOp::Sub, n, hundred);
    let assign = b.assign(n, less);
    let step = b.expr_stmt(assign);
    let loop_body = b.block(vec![step]);
    let looped = b.while_stmt(cond, loop_body);
    let two = b.int(2);
    let doubled = b.infix(BinaryOp::Mul, n, two);
    let ret = b.ret(Some(doubled));
    let body = b.block(vec![looped, ret]);
    let twice = b.function("twice", &[("n", TypeRef::I32)], TypeRef::I32, body, true);
    b.item(twice);
    b.finish()
}

fn compile_with(loader: &MapLoader) -> Result<CompiledProgram, DriverError> {
    let catalog = StdlibCatalog::builtin().unwrap();
    compile("main", loader, &catalog, &CompileConfig::new("main.ast.json"))
}

fn loader() -> MapLoader {
    MapLoader::new().with(main_module()).with(lib_module())
}

#[test]
fn working_set_skips_the_standard_library() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let modules = load_working_set("main", &loader(), &catalog).unwrap();
    let names: Vec<&str> = modules.iter().map(|module| module.name.as_str()).collect();
    assert_eq!(names, vec!["main", "lib"]);
}

#[test]
fn compiles_every_module_in_name_order() {
    let program = compile_with(&loader()).unwrap();
    assert_eq!(program.entry(), "main");
    let names: Vec<&str> = program.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["lib", "main"]);

    let main = program.get("main").unwrap();
    assert!(main.contains("(import \"lib\" \"twice\" (func $twice (type $i_i_type)))"));
    assert!(main.contains("(import \"memory\" \"malloc\" (func $malloc (type $i_i_type)))"));
    assert!(main.contains("call $malloc\n"));
}

#[test]
fn constant_data_is_chained_across_modules() {
    let program = compile_with(&loader()).unwrap();
    // main: "hi" at 16, its header at 20..28; lib continues from 28.
    let main = program.get("main").unwrap();
    assert!(main.contains("(data (offset (i32.const 16)) \"\\68\\69\")"));
    let lib = program.get("lib").unwrap();
    assert!(lib.contains("(data (offset (i32.const 28)) \"\\6f\\6b\")"));
    assert!(lib.contains("(data (offset (i32.const 32)) \"\\02\\00\\00\\00\\1c\\00\\00\\00\")"));
}

#[test]
fn loop_labels_are_unique_across_modules() {
    let program = compile_with(&loader()).unwrap();
    assert!(program.get("lib").unwrap().contains("block $block_0"));
    assert!(program.get("main").unwrap().contains("block $block_1"));
    assert!(!program.get("main").unwrap().contains("$block_0"));
}

#[test]
fn missing_sibling_fails_to_load() {
    let loader = MapLoader::new().with(main_module());
    let err = compile_with(&loader).unwrap_err();
    assert!(matches!(err, DriverError::Load(LoadError::Unknown { ref module }) if module == "lib"));
}

#[test]
fn siblings_are_loaded_one_level_deep() {
    // `lib` provides `twice` but itself imports from `util`, which is
    // never loaded.
    let mut lib = AstBuilder::new("lib");
    let import = lib.import("util", &["helper"]);
    lib.item(import);
    let n = lib.ident("n");
    let ret = lib.ret(Some(n));
    let body = lib.block(vec![ret]);
    let twice = lib.function("twice", &[("n", TypeRef::I32)], TypeRef::I32, body, true);
    lib.item(twice);
    let loader = MapLoader::new().with(main_module()).with(lib.finish());

    let err = compile_with(&loader).unwrap_err();
    let DriverError::Compile(err) = err else {
        panic!("expected a compile error, got {err:?}");
    };
    assert_eq!(err.code(), ErrorCode::E2005);
    assert!(err.to_string().contains("`lib`"));
    assert!(err.to_string().contains("`helper`"));
}

#[test]
fn build_writes_module_text() {
    let dir = tempfile::tempdir().unwrap();
    for module in [main_module(), lib_module()] {
        let path = dir.path().join(format!("{}.ast.json", module.name));
        std::fs::write(path, serde_json::to_string(&module).unwrap()).unwrap();
    }
    let mut config = CompileConfig::new(dir.path().join("main.ast.json"));
    config.emit = EmitKind::Wat;
    config.out_dir = Some(dir.path().join("out"));

    let artifacts = build(&config).unwrap();
    assert_eq!(
        artifacts.wat,
        vec![dir.path().join("out/lib.wat"), dir.path().join("out/main.wat")]
    );
    assert!(artifacts.wasm.is_empty());
    let text = std::fs::read_to_string(dir.path().join("out/main.wat")).unwrap();
    assert!(text.starts_with("(module\n"));
}

#[test]
fn build_surfaces_missing_tools() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("lib.ast.json"),
        serde_json::to_string(&lib_module()).unwrap(),
    )
    .unwrap();
    let mut config = CompileConfig::new(dir.path().join("lib.ast.json"));
    config.tools = ToolPaths {
        wat2wasm: dir.path().join("missing-wat2wasm"),
        wasm_merge: dir.path().join("missing-wasm-merge"),
    };

    let err = build(&config).unwrap_err();
    assert!(matches!(
        err,
        DriverError::Toolchain(ToolchainError::NotFound { .. })
    ));
    assert!(dir.path().join("lib.wat").exists());
}
