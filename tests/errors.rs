use std::collections::HashMap;

use evmscribe::{preprocess, CompileError};

// ============================================================================
// Script-surface errors
// ============================================================================

#[test]
pub fn test_redeclare_01() {
    check_err("push = 5", "cannot redeclare built-in helper \"push\"");
}

#[test]
pub fn test_redeclare_02() {
    check_err("const jumpi = 1", "cannot redeclare built-in helper \"jumpi\"");
}

#[test]
pub fn test_const_01() {
    check_err("const A = 1; A = 2", "assignment to constant \"A\"");
}

#[test]
pub fn test_undefined_01() {
    check_err("jump(foo)", "foo is not defined");
}

#[test]
pub fn test_undefined_02() {
    check_err("frobnicate()", "frobnicate is not defined");
}

#[test]
pub fn test_syntax_01() {
    check_err("push(", "syntax error");
}

#[test]
pub fn test_syntax_02() {
    check_err("push(1) }", "syntax error");
}

// ============================================================================
// Positions
// ============================================================================

#[test]
pub fn test_position_01() {
    // Errors carry the user's own line and column.
    let err = preprocess("push(1)\npush(\"oops\")", HashMap::new(), "bytecode").unwrap_err();
    match err {
        CompileError::InputValidation { loc, helper, .. } => {
            assert_eq!(helper, "push");
            assert_eq!(loc.line, 2);
            assert_eq!(loc.col, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

// ============================================================================
// Composition errors
// ============================================================================

#[test]
pub fn test_reparent_01() {
    // assert() adopts its condition; a second adoption must fail.
    check_err("p = push(1); assert(p); assert(p)", "is already owned");
}

#[test]
pub fn test_pointer_as_data_01() {
    check_err("push(add())", "cannot push the result of another action");
}

// ============================================================================
// Config errors
// ============================================================================

#[test]
pub fn test_config_01() {
    check_err("$(\"unknown\", true)", "unknown config key \"unknown\"");
}

#[test]
pub fn test_config_02() {
    check_err("$(\"deployable\", 1)", "expected deployable to be a boolean");
}

// ============================================================================
// Helpers
// ============================================================================

fn check_err(input: &str, needle: &str) {
    let err = preprocess(input, HashMap::new(), "bytecode").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(needle), "unexpected error: {}", msg);
}
