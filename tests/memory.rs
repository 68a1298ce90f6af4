use std::collections::HashMap;

use evmscribe::preprocess;

// ============================================================================
// alloc
// ============================================================================

#[test]
pub fn test_alloc_01() {
    // Four bytes: length and start offset, then one left-aligned
    // partial-word store.
    check("alloc(\"0x11223344\")", "0x600459631122334460E01B5952");
}

#[test]
pub fn test_alloc_02() {
    // Exactly one word: no shift needed.
    let input = format!("alloc(\"0x{}\")", "ab".repeat(32));
    let expected = format!("0x6020597F{}5952", "AB".repeat(32));
    check(&input, &expected);
}

#[test]
pub fn test_alloc_03() {
    // Without offsets, only the stores remain.
    check("alloc(\"0x1122\", false)", "0x61112260F01B5952");
}

#[test]
pub fn test_alloc_04() {
    // A word and a half: one full store, one shifted store.
    let input = format!("alloc(\"0x{}1122\")", "cd".repeat(32));
    let expected = format!("0x6022597F{}595261112260F01B5952", "CD".repeat(32));
    check(&input, &expected);
}

#[test]
pub fn test_alloc_fail_01() {
    check_err("alloc(push(1))", "cannot accept the result of another action");
}

// ============================================================================
// allocUnsafe
// ============================================================================

#[test]
pub fn test_alloc_unsafe_01() {
    // The blob is deferred past the main stream and CODECOPYed from
    // its bytecode offset.
    check("allocUnsafe(\"0xaabb\")", "0x600259816100098239AABB");
}

#[test]
pub fn test_alloc_unsafe_02() {
    // Tail data lands after all normal code.
    check("allocUnsafe(\"0xaabb\"); stop()", "0x6002598161000A823900AABB");
}

// ============================================================================
// allocStack
// ============================================================================

#[test]
pub fn test_alloc_stack_01() {
    // Two items stored word by word, offsets recovered afterwards.
    check("push(1); push(2); allocStack(2)", "0x60016002595259526040805903");
}

#[test]
pub fn test_alloc_stack_02() {
    // Reference mode copies the slot into memory.
    check("[a] = push(5); allocStack(a, false)", "0x6005805952");
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
