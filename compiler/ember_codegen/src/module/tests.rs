use super::*;
use ember_diagnostic::ErrorCode;
use ember_ir::{AstBuilder, BinaryOp, PrefixOp};
use ember_link::{link, StdlibCatalog};
use ember_symbols::extract;
use pretty_assertions::assert_eq;

/// Extract, link and emit `modules`, returning the text of the first.
fn compile(modules: &[Module]) -> CompileResult<String> {
    let metas = modules.iter().map(extract).collect::<CompileResult<Vec<_>>>()?;
    let linked = link(metas, &StdlibCatalog::builtin()?)?;
    let first = &modules[0];
    let mut labels = LabelGenerator::new();
    emit_module(
        first,
        linked.get(&first.name).unwrap(),
        &mut labels,
        &EmitConfig::default(),
    )
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).collect()
}

/// `let x = 5; export fn add1(n: i32): i32 { return n + x; }`
fn add1_module() -> Module {
    let mut b = AstBuilder::new("main");
    let five = b.int(5);
    let x = b.let_stmt("x", None, five);
    b.item(x);
    let n = b.ident("n");
    let x_ref = b.ident("x");
    let sum = b.infix(BinaryOp::Add, n, x_ref);
    let ret = b.ret(Some(sum));
    let body = b.block(vec![ret]);
    let add1 = b.function("add1", &[("n", TypeRef::I32)], TypeRef::I32, body, true);
    b.item(add1);
    b.finish()
}

#[test]
fn add1_module_text() {
    let text = compile(&[add1_module()]).unwrap();
    assert_eq!(
        text,
        "(module
  (import \"env\" \"memory\" (memory 1))
  (type $i_i_type (func (param i32) (result i32)))
  (global $x (mut i32) (i32.const 5))
  (func $add1 (export \"add1\") (type $i_i_type) (param $n i32) (result i32)
    local.get $n
    global.get $x
    i32.add
    return
  )
)
"
    );
}

#[test]
fn stdlib_imports_share_type_declarations() {
    let mut b = AstBuilder::new("main");
    let import = b.import("memory", &["malloc"]);
    b.item(import);
    let n = b.ident("n");
    let call = b.call("malloc", vec![n]);
    let ret = b.ret(Some(call));
    let body = b.block(vec![ret]);
    let alloc = b.function("alloc", &[("n", TypeRef::I32)], TypeRef::I32, body, true);
    b.item(alloc);

    let text = compile(&[b.finish()]).unwrap();
    let lines = lines(&text);
    assert!(lines.contains(&"(import \"memory\" \"malloc\" (func $malloc (type $i_i_type)))"));
    assert!(lines.contains(&"call $malloc"));
    let types = lines.iter().filter(|line| line.starts_with("(type ")).count();
    assert_eq!(types, 1);
}

#[test]
fn sibling_functions_and_globals_are_imported() {
    let mut lib = AstBuilder::new("lib");
    let ten = lib.int(10);
    let limit = lib.export_let("limit", None, ten);
    lib.item(limit);
    let half = lib.float(0.5);
    let scale = lib.export_let("scale", None, half);
    lib.item(scale);
    let text = lib.string("hi");
    let greeting = lib.export_let("greeting", None, text);
    lib.item(greeting);
    let lib = lib.finish();

    let mut b = AstBuilder::new("main");
    let import = b.import("lib", &["limit", "scale", "greeting"]);
    b.item(import);
    let limit = b.ident("limit");
    let ret = b.ret(Some(limit));
    let body = b.block(vec![ret]);
    let get = b.function("get", &[], TypeRef::I32, body, true);
    b.item(get);
    let main = b.finish();

    let text = compile(&[main, lib]).unwrap();
    let lines = lines(&text);
    assert!(lines.contains(&"(import \"lib\" \"limit\" (global $limit (mut i32)))"));
    assert!(lines.contains(&"(import \"lib\" \"scale\" (global $scale (mut f32)))"));
    assert!(lines.contains(&"(import \"lib\" \"greeting\" (global $greeting i32))"));
    assert!(lines.contains(&"global.get $limit"));
    assert!(lines.contains(&"(type $_i_type (func (result i32)))"));
}

#[test]
fn exported_globals_and_data_segments() {
    let mut b = AstBuilder::new("lib");
    let text = b.string("hi");
    let greeting = b.export_let("greeting", None, text);
    b.item(greeting);
    let magnitude = b.float(1.5);
    let neg = b.prefix(PrefixOp::Neg, magnitude);
    let offset = b.export_let("offset", None, neg);
    b.item(offset);
    let hidden_text = b.string("hidden");
    let hidden = b.let_stmt("hidden", None, hidden_text);
    b.item(hidden);

    let text = compile(&[b.finish()]).unwrap();
    let lines = lines(&text);
    assert!(lines.contains(&"(global $greeting (export \"greeting\") i32 (i32.const 20))"));
    assert!(lines.contains(&"(global $offset (export \"offset\") (mut f32) (f32.const -1.5))"));
    assert!(!lines.iter().any(|line| line.starts_with("(global $hidden")));
    assert!(lines.contains(&"(data (offset (i32.const 16)) \"\\68\\69\")"));
    assert!(lines.contains(&"(data (offset (i32.const 20)) \"\\02\\00\\00\\00\\10\\00\\00\\00\")"));
}

#[test]
fn loop_labels_are_unique_across_functions() {
    let mut b = AstBuilder::new("main");
    for name in ["first", "second"] {
        let t = b.bool(true);
        let brk = b.brk();
        let loop_body = b.block(vec![brk]);
        let looped = b.while_stmt(t, loop_body);
        let body = b.block(vec![looped]);
        let function = b.function(name, &[], TypeRef::Void, body, false);
        b.item(function);
    }

    let text = compile(&[b.finish()]).unwrap();
    let lines = lines(&text);
    assert!(lines.contains(&"block $block_0"));
    assert!(lines.contains(&"block $block_1"));
    assert!(lines.contains(&"(func $first (type $_v_type)"));
}

#[test]
fn locals_are_declared_after_the_header() {
    let mut b = AstBuilder::new("main");
    let half = b.float(0.5);
    let f = b.let_stmt("f", None, half);
    let f_ref = b.ident("f");
    let ret = b.ret(Some(f_ref));
    let body = b.block(vec![f, ret]);
    let function = b.function("half", &[], TypeRef::F32, body, true);
    b.item(function);

    let text = compile(&[b.finish()]).unwrap();
    let lines = lines(&text);
    let header = lines
        .iter()
        .position(|line| line.starts_with("(func $half"))
        .unwrap();
    assert_eq!(lines[header + 1], "(local $f f32)");
    assert_eq!(lines[header + 2], "f32.const 0.5");
}

/// `struct P { x: f32 }`
/// `fn scale(): f32 { let p = P { x: 1.5 }; p.x = 3; return p.x * 2 + p->x; }`
#[test]
fn struct_members_keep_their_lane_and_memory_in_step() {
    let mut b = AstBuilder::new("main");
    let decl = b.struct_decl("P", &[("x", TypeRef::F32)], false);
    b.item(decl);
    let init = b.float(1.5);
    let lit = b.struct_lit("P", vec![("x", init)]);
    let p_let = b.let_stmt("p", None, lit);
    let p = b.ident("p");
    let px = b.member(p, "x");
    let three = b.int(3);
    let set = b.assign(px, three);
    let set_stmt = b.expr_stmt(set);
    let two = b.int(2);
    let scaled = b.infix(BinaryOp::Mul, px, two);
    let through_pointer = b.pointer_member(p, "x");
    let sum = b.infix(BinaryOp::Add, scaled, through_pointer);
    let ret = b.ret(Some(sum));
    let body = b.block(vec![p_let, set_stmt, ret]);
    let scale = b.function("scale", &[], TypeRef::F32, body, false);
    b.item(scale);

    let text = compile(&[b.finish()]).unwrap();
    let lines = lines(&text);
    let start = lines
        .iter()
        .position(|line| *line == "local.set $p")
        .unwrap();
    assert_eq!(
        lines[start..start + 17],
        [
            "local.set $p",
            "local.get $p",
            "f32.const 1.5",
            "local.tee $p_x",
            "f32.store",
            "local.get $p",
            "f32.const 3.0",
            "local.tee $p_x",
            "f32.store",
            "local.get $p_x",
            "f32.const 2.0",
            "f32.mul",
            "local.get $p",
            "f32.load",
            "f32.add",
            "return",
            ")",
        ]
    );
    assert!(!lines.contains(&"i32.mul"));
}

#[test]
fn failed_functions_leave_no_frame_behind() {
    let mut b = AstBuilder::new("main");
    let brk = b.brk();
    let body = b.block(vec![brk]);
    let function = b.function("broken", &[], TypeRef::Void, body, false);
    b.item(function);
    let module = b.finish();

    let meta = extract(&module).unwrap();
    let linked = link(vec![meta], &StdlibCatalog::empty()).unwrap();
    let config = EmitConfig::default();
    let mut emitter = ModuleEmitter::new(&module, linked.get("main").unwrap(), &config);
    let err = emitter.emit(&mut LabelGenerator::new()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2009);
    assert_eq!(emitter.stack.depth(), 0);
}

#[test]
fn memory_import_follows_the_config() {
    let config = EmitConfig {
        memory_module: "js".to_string(),
        memory_field: "mem".to_string(),
        memory_pages: 4,
    };
    assert_eq!(config.memory_import(), "(import \"js\" \"mem\" (memory 4))");
}
