use super::*;
use pretty_assertions::assert_eq;

#[test]
fn labels_are_unique_per_generator() {
    let mut labels = LabelGenerator::new();
    let first = labels.while_loop();
    let second = labels.for_loop();
    assert_eq!(first.break_label, "$block_0");
    assert_eq!(first.loop_label, "$loop_0");
    assert_eq!(first.continue_label, "$loop_0");
    assert_eq!(second.break_label, "$block_1");
    assert_eq!(second.continue_label, "$continue_1");
    assert_eq!(labels.issued(), 2);
}

#[test]
fn generators_do_not_share_state() {
    let mut a = LabelGenerator::new();
    a.while_loop();
    a.while_loop();
    let mut b = LabelGenerator::new();
    assert_eq!(b.while_loop().break_label, "$block_0");
}
