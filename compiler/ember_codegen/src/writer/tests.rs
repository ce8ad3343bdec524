use super::*;
use pretty_assertions::assert_eq;

#[test]
fn lines_follow_depth() {
    let mut w = WatWriter::new();
    w.line("(module");
    w.indent();
    w.line("(memory 1)");
    w.dedent();
    w.line(")");
    assert_eq!(w.as_str(), "(module\n  (memory 1)\n)\n");
}

#[test]
fn structured_instructions_nest() {
    let mut w = WatWriter::with_indent(1);
    w.instructions(&[
        "local.get $c",
        "if (result i32)",
        "i32.const 1",
        "else",
        "i32.const 2",
        "end",
    ]);
    assert_eq!(
        w.take_output(),
        "  local.get $c\n  if (result i32)\n    i32.const 1\n  else\n    i32.const 2\n  end\n"
    );
    assert!(w.is_empty());
    assert_eq!(w.depth(), 1);
}
