use std::collections::HashMap;

use evmscribe::preprocess;

// ============================================================================
// Guards
// ============================================================================

#[test]
pub fn test_assert_non_payable_01() {
    check("assertNonPayable()", "0x341561000A57600080FD5B");
}

#[test]
pub fn test_bail_01() {
    check("bail()", "0x600080FD");
}

#[test]
pub fn test_assert_01() {
    // The condition arrives through a stack reference.
    check("[a] = push(1); assert(a)", "0x60018061000B57600080FD5B");
}

#[test]
pub fn test_assert_02() {
    // A condition action is adopted and emitted inline once.
    check("assert(iszero(0))", "0x60001561000B57600080FD5B");
}

// ============================================================================
// Revert reasons
// ============================================================================

#[test]
pub fn test_revert_01() {
    check("revert()", "0xFD");
}

#[test]
pub fn test_revert_02() {
    // The standard Error(string) payload: selector, string-offset
    // word, length word, then the padded reason.
    let reason_hex = "5072696365206973206E6F742076616C6964"; // "Price is not valid"
    let mut expected = String::from("0x");
    // length (0x64) and start offset
    expected.push_str("606459");
    // word 0: selector then zeros
    expected.push_str(&format!("7F08C379A0{}5952", "00".repeat(28)));
    // word 1: the 0x20 string offset straddles bytes 32..36
    expected.push_str(&format!("7F00000020{}5952", "00".repeat(28)));
    // word 2: the length (0x12) then the reason itself
    expected.push_str(&format!("7F00000012{}{}5952", reason_hex, "00".repeat(10)));
    // final partial word: four zero bytes, shifted into place
    expected.push_str("630000000060E01B5952");
    // the revert
    expected.push_str("FD");
    check("revert($hex(\"Price is not valid\"))", &expected);
}

// ============================================================================
// Deployable wrapping
// ============================================================================

#[test]
pub fn test_deployable_01() {
    // The loop sample: compiled runtime wrapped by the deployer.
    let input = "\
$(\"deployable\", true);
const TIMES = 5;
push(0);
mainloop = push(1);
add();
dup1();
push(TIMES);
gt();
jumpi(mainloop);
stop();
";
    check(
        input,
        "0x341561000A57600080FD5B600F59816100158239F360005B600101806005116100025700",
    );
}

#[test]
pub fn test_loop_runtime_01() {
    // The same loop without the deployable flag.
    let input = "\
push(0);
mainloop = push(1);
add();
dup1();
push(5);
gt();
jumpi(mainloop);
stop();
";
    check(input, "0x60005B600101806005116100025700");
}

// ============================================================================
// Helpers
// ============================================================================

fn check(input: &str, hex: &str) {
    let out = preprocess(input, HashMap::new(), "bytecode").unwrap();
    assert_eq!(out, hex);
}
