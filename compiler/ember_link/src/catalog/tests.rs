use super::*;
use pretty_assertions::assert_eq;

#[test]
fn builtin_has_three_modules() {
    let catalog = StdlibCatalog::builtin().unwrap();
    assert_eq!(catalog.module_names(), vec!["math", "memory", "string"]);
    for name in STDLIB_MODULES {
        assert!(catalog.contains(name));
    }
    assert!(!catalog.contains("main"));
}

#[test]
fn malloc_is_i_i() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let memory = catalog.get("memory").unwrap();
    let malloc = memory.exports.get("malloc").unwrap();
    assert_eq!(malloc.as_function().unwrap().encoded(), "i_i");
    assert_eq!(
        memory.exports.get("memset").unwrap().as_function().unwrap().encoded(),
        "iii_v"
    );
}

#[test]
fn math_functions_use_float_lanes() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let math = catalog.get("math").unwrap();
    assert_eq!(math.exports.get("pow").unwrap().as_function().unwrap().encoded(), "ff_f");
    assert_eq!(math.exports.get("abs").unwrap().as_function().unwrap().encoded(), "i_i");
}

#[test]
fn string_struct_matches_literal_header() {
    let catalog = StdlibCatalog::builtin().unwrap();
    let string = catalog.get("string").unwrap();
    let Some(ExportDescriptor::Struct(layout)) = string.exports.get("string") else {
        panic!("string struct missing");
    };
    assert_eq!(layout.size, ember_symbols::STRING_HEADER_SIZE);
    assert_eq!(layout.member("data").unwrap().offset, 4);
}
