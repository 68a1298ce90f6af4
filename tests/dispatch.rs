use std::collections::HashMap;

use evmscribe::preprocess;

// ============================================================================
// calldataload
// ============================================================================

#[test]
pub fn test_calldataload_01() {
    // Four bytes from offset zero: load, then shift the rest away.
    check("calldataload(0, 4)", "0x60003560E01C");
}

#[test]
pub fn test_calldataload_02() {
    check("calldataload(4)", "0x600435");
}

#[test]
pub fn test_calldataload_03() {
    // No offset: the caller already arranged one on the stack.
    check("calldataload()", "0x35");
}

// ============================================================================
// Calldata prologues
// ============================================================================

#[test]
pub fn test_calldata_offsets_reverse_01() {
    // Two words walked upward from the selector; last argument ends
    // on top.
    check(
        "pushCallDataOffsetsReverse(\"uint\", \"uint\")",
        "0x600480359060200180359050",
    );
}

#[test]
pub fn test_calldata_offsets_forward_01() {
    // Walked downward from the last argument position; first
    // argument ends on top.
    check(
        "pushCallDataOffsets(\"uint\", \"uint\")",
        "0x60248035906020900380359050",
    );
}

#[test]
pub fn test_calldata_offsets_bytes_01() {
    // A dynamic argument resolves pointer, then length, then data
    // start.
    check(
        "pushCallDataOffsetsReverse(\"bytes\")",
        "0x600480356004018035906020019150",
    );
}

// ============================================================================
// dispatch
// ============================================================================

#[test]
pub fn test_dispatch_01() {
    // Selector comparison routes to the tagged action.
    let input =
        "dispatch({\"function transfer(address to, uint256 amount)\": $ptr(\"tag\")}); tag = stop()";
    check(input, "0x60003560E01C63A9059CBB14610010575B00");
}

#[test]
pub fn test_dispatch_02() {
    // Entries chain; nothing matching falls through.
    let input = "dispatch({\
        \"transfer(address,uint256)\": $ptr(\"t1\"),\
        \"balanceOf(address)\": $ptr(\"t2\"),\
    }); t1 = stop(); t2 = stop()";
    let expected = format!(
        "0x{}{}{}{}",
        "60003560E01C63A9059CBB1461002057",
        "60003560E01C6370A082311461002257",
        "5B00",
        "5B00"
    );
    check(input, &expected);
}

#[test]
pub fn test_dispatch_fail_01() {
    check_err("dispatch({\"f()\": 5})", "expected a pointer or label");
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
