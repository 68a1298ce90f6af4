use std::collections::HashMap;

use evmscribe::preprocess;

// ============================================================================
// Labels and pointers
// ============================================================================

#[test]
pub fn test_forward_label_01() {
    // A $ptr reference resolves regardless of definition order.
    check(
        "jump($ptr(\"main\")); push(0x01); push(0x01); main = push(0x02)",
        "0x61000856600160015B6002",
    );
}

#[test]
pub fn test_backward_pointer_01() {
    // A pointer authored earlier is pushed, never inlined.
    check("mainloop = push(1); jump(mainloop)", "0x5B600161000056");
}

#[test]
pub fn test_compose_01() {
    // A nested inline call is adopted and inlined.
    check("jump(push(1))", "0x600156");
}

#[test]
pub fn test_underscore_01() {
    // Leading underscores opt out of jump-destination promotion; the
    // label still resolves.
    check("_x = push(1); jump($ptr(\"_x\"))", "0x600161000056");
}

#[test]
pub fn test_unknown_label_01() {
    check_err("jump($ptr(\"nope\"))", "label \"nope\"");
}

#[test]
pub fn test_jump_raw_data_01() {
    check_err("jump(5)", "expected a pointer or label");
}

// ============================================================================
// Jump maps
// ============================================================================

#[test]
pub fn test_jumpmap_01() {
    // Three labels pack into one right-padded 32-byte word.
    let input = "a = push(1); b = push(2); c = push(3); push($jumpmap(\"a\", \"b\", \"c\"))";
    let map = format!("000000030006{}", "0".repeat(52));
    check(input, &format!("0x5B60015B60025B60037F{}", map));
}

#[test]
pub fn test_jumpmap_02() {
    // Seventeen labels need two words; the map's first word is
    // pushed last so it ends on top of the stack.
    let mut input = String::new();
    for i in 0..17 {
        input.push_str(&format!("l{} = stop(); ", i));
    }
    input.push_str("push($jumpmap(");
    for i in 0..17 {
        if i > 0 {
            input.push_str(", ");
        }
        input.push_str(&format!("\"l{}\"", i));
    }
    input.push_str("))");
    //
    let mut expected = "0x".to_string();
    expected.push_str(&"5B00".repeat(17));
    // Second word: label 17's offset, right-padded.
    expected.push_str(&format!("7F0020{}", "0".repeat(60)));
    // First word: labels 0..16 at two bytes each.
    expected.push_str("7F");
    for i in 0..16 {
        expected.push_str(&format!("{:04X}", 2 * i));
    }
    check(&input, &expected);
}

// ============================================================================
// Helpers
// ============================================================================

fn check(input: &str, hex: &str) {
    let out = preprocess(input, HashMap::new(), "bytecode").unwrap();
    assert_eq!(out, hex);
}

fn check_err(input: &str, needle: &str) {
    let err = preprocess(input, HashMap::new(), "bytecode").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(needle), "unexpected error: {}", msg);
}
