use std::collections::HashMap;

use evmscribe::preprocess;

// ============================================================================
// DUP lowering
// ============================================================================

#[test]
pub fn test_dup_ref_01() {
    // `a` sits one below the top when add() consumes it: DUP2.
    check("[a] = push(5); push(6); add(a)", "0x600560068101");
}

#[test]
pub fn test_dup_ref_02() {
    // Slot 1 of an action reaches below what the action itself
    // pushed.
    check("push(9); [a, b] = push(8); add(b)", "0x600960088101");
}

#[test]
pub fn test_dup_ref_03() {
    // A DUP keeps the duplicated slot's identity, so the reference
    // resolves to the nearest copy.
    check("[a] = push(5); dup(a); add(a)", "0x6005808001");
}

#[test]
pub fn test_dup_int_01() {
    check("push(1); dup(2)", "0x600181");
}

#[test]
pub fn test_dup_depth_fail_01() {
    // Sixteen more pushes bury the slot beyond DUP16.
    let mut input = "[a] = push(0); ".to_string();
    for i in 1..=16 {
        input.push_str(&format!("push({}); ", i));
    }
    input.push_str("add(a)");
    check_err(&input, "max DUP16");
}

#[test]
pub fn test_missing_slot_01() {
    check_err(
        "[a] = push(1); pop(); add(a)",
        "stack slot referenced in call to `add()` won't exist on the stack during runtime",
    );
}

// ============================================================================
// SWAP lowering
// ============================================================================

#[test]
pub fn test_swap_ref_01() {
    check("[a] = push(5); push(6); swap(a)", "0x6005600690");
}

#[test]
pub fn test_swap_underflow_01() {
    check_err("push(1); swap1()", "swap index out of range");
}

#[test]
pub fn test_swap_int_01() {
    check("push(1); push(2); push(3); swap(2)", "0x60016002600391");
}

// ============================================================================
// set()
// ============================================================================

#[test]
pub fn test_set_01() {
    // Push the new value, hot-swap it into the slot, pop the old one.
    check("[a] = push(5); push(6); set(a, 7)", "0x6005600660079150");
}

#[test]
pub fn test_set_02() {
    // The hot swap leaves the slot's identity in place: a later
    // reference still finds it at the same depth.
    check(
        "[a] = push(5); push(6); set(a, 7); dup(a)",
        "0x600560066007915081",
    );
}

#[test]
pub fn test_set_fail_01() {
    check_err("set(5, 6)", "expected a stack reference");
}

// ============================================================================
// Destructuring
// ============================================================================

#[test]
pub fn test_destructure_fail_01() {
    check_err("[a] = $ptr(\"x\")", "destructuring requires an action pointer");
}

#[test]
pub fn test_destructure_fail_02() {
    let names: Vec<String> = (0..17).map(|i| format!("v{}", i)).collect();
    let input = format!("[{}] = push(1)", names.join(", "));
    check_err(&input, "at most 16 stack slots");
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
