use std::collections::HashMap;

use evmscribe::preprocess;

// ============================================================================
// Literals
// ============================================================================

#[test]
pub fn test_push_01() {
    check("push(\"0xff\")", "0x60FF");
}

#[test]
pub fn test_push_02() {
    check("push(0)", "0x6000");
}

#[test]
pub fn test_push_03() {
    // An odd hex digit reads as a whole byte.
    check("push(\"0x0\")", "0x6000");
}

#[test]
pub fn test_push_04() {
    check("push(0x1234)", "0x611234");
}

#[test]
pub fn test_push_05() {
    // Hex strings keep their exact width, leading zeros included.
    check("push(\"0x0001\")", "0x610001");
}

#[test]
pub fn test_push_06() {
    // A full 32-byte literal selects PUSH32.
    let input = format!("push(\"0x{}\")", "ff".repeat(32));
    check(&input, &format!("0x7F{}", "FF".repeat(32)));
}

#[test]
pub fn test_push_07() {
    check("const TIMES = 5\npush(TIMES)", "0x6005");
}

#[test]
pub fn test_push_fail_01() {
    let input = format!("push(\"0x{}\")", "11".repeat(33));
    check_err(&input, "cannot accept values larger than 32 bytes");
}

#[test]
pub fn test_push_fail_02() {
    check_err("push(\"hello\")", "string passed where only hex literal is allowed");
}

// ============================================================================
// Exact-width pushes
// ============================================================================

#[test]
pub fn test_push_n_01() {
    check("push3(\"0x001234\")", "0x62001234");
}

#[test]
pub fn test_push_n_02() {
    check("push1(0xff)", "0x60FF");
}

#[test]
pub fn test_push_n_fail_01() {
    check_err(
        "push3(\"0x1234\")",
        "Function push3() expected 3 bytes but received 2",
    );
}

// ============================================================================
// Value expressions
// ============================================================================

#[test]
pub fn test_pad_01() {
    check("push4($pad(1, 4))", "0x6300000001");
}

#[test]
pub fn test_pad_02() {
    check("push4($pad(1, 4, \"right\"))", "0x6301000000");
}

#[test]
pub fn test_concat_01() {
    check("push($concat(\"0x01\", \"0x0203\"))", "0x62010203");
}

#[test]
pub fn test_hex_01() {
    check("push($hex(\"abc\"))", "0x62616263");
}

#[test]
pub fn test_bytelen_01() {
    check("push($bytelen(\"0x112233\"))", "0x6003");
}

// ============================================================================
// Programs
// ============================================================================

#[test]
pub fn test_empty_01() {
    check("", "0x");
}

#[test]
pub fn test_empty_02() {
    check("// nothing here\n/* or here */", "0x");
}

#[test]
pub fn test_sequence_01() {
    check("push(1); push(2); add()", "0x6001600201");
}

#[test]
pub fn test_generic_args_01() {
    // Scalar arguments push in reverse order: last argument lowest.
    check("add(1, 2)", "0x6002600101");
}

// ============================================================================
// Helpers
// ============================================================================

/// Check that compiling a given script produces a given hex string.
fn check(input: &str, hex: &str) {
    let out = preprocess(input, HashMap::new(), "bytecode").unwrap();
    assert_eq!(out, hex);
}

/// Check that compiling a given script fails with a message
/// containing the given fragment.
fn check_err(input: &str, needle: &str) {
    let err = preprocess(input, HashMap::new(), "bytecode").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(needle), "unexpected error: {}", msg);
}
