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
use ruint::aliases::U256;

use crate::errors::CompileError;
use crate::evm::opcode;
use crate::evm::opcode::Opcode;
use crate::ir::{Hexable, RefKind, StackRef};
use super::{Call, Value};

/// `push(v)`: choose `PUSH1`..`PUSH32` from the value's byte length.
/// A jump map wider than one word is emitted as a sequence of
/// `PUSH32` word slices, last word first, so the map's first word
/// ends on top of the stack.
pub fn push(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let v = one(f, args)?;
    let h = pushable(f, v)?;
    let action = f.begin();
    let wide_map = matches!(h, Hexable::JumpMap(_)) && h.byte_length() > 32;
    if wide_map {
        let words = h.byte_length() / 32;
        for w in (0..words).rev() {
            f.emit_op(action, opcode::PUSH32);
            f.emit(action, Hexable::WordRange(Box::new(h.clone()), w, 1));
        }
    } else {
        f.push_value(action, h)?;
    }
    Ok(Value::Pointer(action))
}

/// `pushN(v)`: as `push`, but the value must be exactly `n` bytes.
pub fn push_n(f: &mut Call, n: usize, args: &[Value]) -> Result<Value, CompileError> {
    let v = one(f, args)?;
    let h = pushable(f, v)?;
    let m = h.byte_length();
    if m != n {
        return Err(f.invalid(format!(
            "Function {}() expected {} bytes but received {}",
            f.name, n, m
        )));
    }
    let action = f.begin();
    f.emit_op(action, opcode::push(n));
    f.emit(action, h);
    Ok(Value::Pointer(action))
}

/// `dup(n | ref)`: an integer emits `DUPn` directly; a stack
/// reference lowers to a DUP of its slot.
pub fn dup(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let v = one(f, args)?;
    let action = f.begin();
    match v {
        Value::Int(_) => {
            let n = index(f, v)?;
            f.emit_op(action, opcode::dup(n));
        }
        Value::StackRef(slot) => {
            f.emit(action, Hexable::StackRef(StackRef::new(*slot, RefKind::Dup)));
        }
        other => {
            return Err(f.invalid(format!(
                "expected an integer or a stack reference, not {}",
                other.type_name()
            )))
        }
    }
    Ok(Value::Pointer(action))
}

/// `swap(n | ref)`: the exchange mirror of `dup`.
pub fn swap(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let v = one(f, args)?;
    let action = f.begin();
    match v {
        Value::Int(_) => {
            let n = index(f, v)?;
            f.emit_op(action, opcode::swap(n));
        }
        Value::StackRef(slot) => {
            f.emit(action, Hexable::StackRef(StackRef::new(*slot, RefKind::Swap)));
        }
        other => {
            return Err(f.invalid(format!(
                "expected an integer or a stack reference, not {}",
                other.type_name()
            )))
        }
    }
    Ok(Value::Pointer(action))
}

/// `set(ref, v?)`: write a value into the slot `ref` refers to.  The
/// new value is pushed (unless already on top), hot-swapped into the
/// slot's position, and the displaced value popped.  The hot swap
/// leaves the slot's identity in place, so later references still
/// find it.
pub fn set(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.is_empty() || args.len() > 2 {
        return Err(f.invalid("expected a stack reference and an optional value"));
    }
    let slot = match &args[0] {
        Value::StackRef(slot) => *slot,
        other => {
            return Err(f.invalid(format!(
                "expected a stack reference, not {}",
                other.type_name()
            )))
        }
    };
    let action = f.begin();
    if let Some(v) = args.get(1) {
        f.append_input(action, v)?;
    }
    f.emit(action, Hexable::StackRef(StackRef::new(slot, RefKind::HotSwap)));
    f.emit_op(action, opcode::POP);
    Ok(Value::Pointer(action))
}

/// The default helper backing every opcode without a hand-written
/// one: push scalar arguments in reverse order (last argument lowest
/// on the stack), lower stack references as DUPs, then emit the
/// instruction.
pub fn generic(f: &mut Call, op: &'static Opcode, args: &[Value]) -> Result<Value, CompileError> {
    let action = f.begin();
    for v in args.iter().rev() {
        f.append_input(action, v)?;
    }
    f.emit_op(action, op.byte);
    Ok(Value::Pointer(action))
}

// ============================================================================
// Helpers
// ============================================================================

fn one<'v>(f: &Call, args: &'v [Value]) -> Result<&'v Value, CompileError> {
    match args {
        [v] => Ok(v),
        _ => Err(f.invalid("expected exactly one argument")),
    }
}

/// Reject arguments `push` cannot take, and interpret the rest as
/// raw data.
fn pushable(f: &Call, v: &Value) -> Result<Hexable, CompileError> {
    match v {
        Value::Pointer(_) => Err(f.invalid("cannot push the result of another action")),
        Value::StackRef(_) => Err(f.invalid("cannot push a stack reference; use dup() instead")),
        other => f.hexable(other),
    }
}

/// A DUP/SWAP index between 1 and 16.
fn index(f: &Call, v: &Value) -> Result<usize, CompileError> {
    match v {
        Value::Int(u) if *u >= U256::from(1u64) && *u <= U256::from(16u64) => {
            Ok(u.as_limbs()[0] as usize)
        }
        _ => Err(f.invalid("expected an index between 1 and 16")),
    }
}
