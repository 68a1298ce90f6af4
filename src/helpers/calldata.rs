// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use sha3::{Digest, Keccak256};

use crate::errors::CompileError;
use crate::evm::opcode;
use crate::ir::Hexable;
use super::{Call, Value};

/// `calldataload(offset?, len = 32)`: load a word of calldata.  When
/// `len` is shorter than a word, the loaded value is shifted right so
/// the requested bytes sit in the low end.
pub fn calldataload(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.len() > 2 {
        return Err(f.invalid("expected at most an offset and a length"));
    }
    let len = match args.get(1) {
        None => 32,
        Some(v) => {
            let len = f.uint(v, "the length")?;
            if len == 0 || len > 32 {
                return Err(f.invalid("expected a length between 1 and 32"));
            }
            len
        }
    };
    let action = f.begin();
    if let Some(offset) = args.first() {
        f.append_input(action, offset)?;
    }
    f.emit_op(action, opcode::CALLDATALOAD);
    if len < 32 {
        f.push_const(action, (32 - len) * 8)?;
        f.emit_op(action, opcode::SHR);
    }
    Ok(Value::Pointer(action))
}

/// `pushCallDataOffsets(t1, …, tN)` and its reverse: the stack
/// preparation prologue for an ABI-encoded call.  A running calldata
/// offset walks the argument positions; each word type leaves its
/// value under the offset, and each dynamic type (`bytes`/`string`)
/// resolves pointer → length → data start, leaving `[length,
/// dataStart]`.  The forward variant arranges the first argument on
/// top (walking positions from the last down); the reverse variant
/// the last.  The spent offset is popped at the end.
pub fn push_call_data_offsets(
    f: &mut Call,
    args: &[Value],
    reverse: bool,
) -> Result<Value, CompileError> {
    if args.is_empty() {
        return Err(f.invalid("expected at least one argument type"));
    }
    let mut types = Vec::with_capacity(args.len());
    for v in args {
        match v {
            Value::Str(s) => types.push(s.clone()),
            other => {
                return Err(f.invalid(format!(
                    "expected argument type names, not {}",
                    other.type_name()
                )))
            }
        }
    }
    if !reverse {
        types.reverse();
    }
    let action = f.begin();
    // Seed the running offset: past the 4-byte selector, and for the
    // forward variant starting at the last argument position.
    let seed = if reverse { 4 } else { 4 + 32 * (types.len() - 1) };
    f.push_const(action, seed)?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            // Advance (or retreat) the offset by one word.
            f.push_const(action, 32)?;
            if reverse {
                f.emit_op(action, opcode::ADD);
            } else {
                f.emit_op(action, opcode::SWAP1);
                f.emit_op(action, opcode::SUB);
            }
        }
        if ty == "bytes" || ty == "string" {
            f.emit_op(action, opcode::DUP1);
            f.emit_op(action, opcode::CALLDATALOAD);
            f.push_const(action, 4)?;
            f.emit_op(action, opcode::ADD);
            f.emit_op(action, opcode::DUP1);
            f.emit_op(action, opcode::CALLDATALOAD);
            f.emit_op(action, opcode::SWAP1);
            f.push_const(action, 32)?;
            f.emit_op(action, opcode::ADD);
            f.emit_op(action, opcode::swap(2));
        } else {
            f.emit_op(action, opcode::DUP1);
            f.emit_op(action, opcode::CALLDATALOAD);
            f.emit_op(action, opcode::SWAP1);
        }
    }
    f.emit_op(action, opcode::POP);
    Ok(Value::Pointer(action))
}

/// `dispatch(map)`: for every `(signature, target)` pair, compare the
/// call's 4-byte selector against the signature's and jump to the
/// target on a match.  No default branch is emitted; execution falls
/// through when nothing matches.
pub fn dispatch(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let entries = match args {
        [Value::Map(entries)] => entries,
        _ => return Err(f.invalid("expected a map of signatures to pointers")),
    };
    if entries.is_empty() {
        return Err(f.invalid("expected at least one signature"));
    }
    let action = f.begin();
    for (signature, target) in entries {
        let target = match target {
            Value::Pointer(id) => Hexable::Pointer(*id),
            Value::Hex(Hexable::Label(name)) => Hexable::Label(name.clone()),
            other => {
                return Err(f.invalid(format!(
                    "expected a pointer or label for \"{}\", not {}",
                    signature,
                    other.type_name()
                )))
            }
        };
        let canonical = canonical_signature(signature).map_err(|m| f.invalid(m))?;
        let selector = selector(&canonical);
        // Selector of the incoming call...
        f.push_const(action, 0)?;
        f.emit_op(action, opcode::CALLDATALOAD);
        f.push_const(action, 224)?;
        f.emit_op(action, opcode::SHR);
        // ...compared against this entry's.
        f.emit_op(action, opcode::PUSH4);
        f.emit(action, Hexable::Bytes(selector.to_vec()));
        f.emit_op(action, opcode::EQ);
        f.emit_op(action, opcode::PUSH2);
        f.emit(action, target);
        f.emit_op(action, opcode::JUMPI);
    }
    Ok(Value::Pointer(action))
}

// ============================================================================
// Signatures
// ============================================================================

/// First four bytes of the keccak-256 hash of a canonical signature.
pub fn selector(canonical: &str) -> [u8; 4] {
    let digest = Keccak256::digest(canonical.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Reduce a Solidity function declaration to its canonical signature:
/// `"function foo(uint a) returns (uint)"` becomes `foo(uint256)`.
pub fn canonical_signature(declaration: &str) -> Result<String, String> {
    let s = declaration.trim();
    let s = match s.strip_prefix("function") {
        Some(rest) => rest.trim_start(),
        None => s,
    };
    let open = s
        .find('(')
        .ok_or_else(|| format!("\"{}\" has no parameter list", declaration))?;
    let name = s[..open].trim();
    if name.is_empty() {
        return Err(format!("\"{}\" has no function name", declaration));
    }
    // Find the parenthesis closing the parameter list.
    let mut depth = 0;
    let mut close = None;
    for (i, c) in s.char_indices().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| format!("\"{}\" has an unbalanced parameter list", declaration))?;
    let params = &s[open + 1..close];
    let mut types = Vec::new();
    if !params.trim().is_empty() {
        let mut depth = 0;
        let mut start = 0;
        for (i, c) in params.char_indices() {
            match c {
                '(' | '[' => depth += 1,
                ')' | ']' => depth -= 1,
                ',' if depth == 0 => {
                    types.push(canonical_type(&params[start..i])?);
                    start = i + 1;
                }
                _ => {}
            }
        }
        types.push(canonical_type(&params[start..])?);
    }
    Ok(format!("{}({})", name, types.join(",")))
}

/// Take the type token of one parameter (dropping its name and any
/// data-location modifier) and expand the `uint`/`int` aliases.
fn canonical_type(param: &str) -> Result<String, String> {
    let token = param
        .split_whitespace()
        .next()
        .ok_or_else(|| format!("empty parameter in \"{}\"", param))?;
    let expanded = if token == "uint" {
        "uint256".to_string()
    } else if token == "int" {
        "int256".to_string()
    } else if let Some(rest) = token.strip_prefix("uint[") {
        format!("uint256[{}", rest)
    } else if let Some(rest) = token.strip_prefix("int[") {
        format!("int256[{}", rest)
    } else {
        token.to_string()
    };
    Ok(expanded)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ToHexString;

    #[test]
    fn test_canonical_01() {
        let c = canonical_signature("function foo(address _addr) returns (address)").unwrap();
        assert_eq!(c, "foo(address)");
    }

    #[test]
    fn test_canonical_02() {
        let c = canonical_signature("transfer(address to, uint256 amount)").unwrap();
        assert_eq!(c, "transfer(address,uint256)");
    }

    #[test]
    fn test_canonical_03() {
        let c = canonical_signature("f(uint a, int b, uint[2] c)").unwrap();
        assert_eq!(c, "f(uint256,int256,uint256[2])");
    }

    #[test]
    fn test_canonical_04() {
        let c = canonical_signature("function nop()").unwrap();
        assert_eq!(c, "nop()");
    }

    #[test]
    fn test_selector_01() {
        let sel = selector("transfer(address,uint256)");
        assert_eq!(sel.to_hex_string(), "0xA9059CBB");
    }

    #[test]
    fn test_selector_02() {
        let sel = selector("balanceOf(address)");
        assert_eq!(sel.to_hex_string(), "0x70A08231");
    }
}
