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
use crate::errors::CompileError;
use crate::evm::opcode;
use crate::ir::{ActionId, Hexable, RefKind, StackRef};
use super::{Call, Value};

/// `alloc(v, pushOffsets = true)`: materialise `v` into memory one
/// 32-byte word at a time, storing each word at the current memory
/// size.  The final partial word is left-aligned with `SHL` so no
/// stray bytes land in memory.  With `pushOffsets`, the sequence
/// leaves `[memOffset, byteLen]` on the stack (offset on top).
pub fn alloc(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let (v, push_offsets) = data_and_flag(f, args)?;
    let h = blob(f, v)?;
    if h.byte_length() == 0 {
        return Err(f.invalid("cannot allocate an empty value"));
    }
    let action = f.begin();
    emit_alloc(f, action, &h, push_offsets)?;
    Ok(Value::Pointer(action))
}

/// `allocUnsafe(v)`: cheaper than `alloc` at the cost of embedding
/// the data as bytecode: the blob is deferred to a tail action and
/// copied into memory with `CODECOPY`.  Leaves `[memOffset, byteLen]`
/// like `alloc`.
pub fn alloc_unsafe(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let v = match args {
        [v] => v,
        _ => return Err(f.invalid("expected exactly one argument")),
    };
    let h = blob(f, v)?;
    let len = h.byte_length();
    if len == 0 {
        return Err(f.invalid("cannot allocate an empty value"));
    }
    let tail = f.ctx.new_tail_action("data", f.loc);
    f.emit(tail, h);
    let action = f.begin();
    f.push_const(action, len)?;
    f.emit_op(action, opcode::MSIZE);
    f.emit_op(action, opcode::DUP2);
    f.emit_op(action, opcode::PUSH2);
    f.emit(action, Hexable::Pointer(tail));
    f.emit_op(action, opcode::DUP3);
    f.emit_op(action, opcode::CODECOPY);
    Ok(Value::Pointer(action))
}

/// `allocStack(n | ref, pushOffsets = true)`: with an integer,
/// consume `n` stack items into consecutive memory words; with a
/// stack reference, copy that slot into memory.  The offsets are
/// recovered arithmetically afterwards (`PUSH total; DUP1; MSIZE;
/// SUB`), leaving the same `[memOffset, byteLen]` contract as
/// `alloc`.
pub fn alloc_stack(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    let (v, push_offsets) = data_and_flag(f, args)?;
    let action = f.begin();
    let total = match v {
        Value::Int(_) => {
            let n = f.uint(v, "the item count")?;
            if n == 0 || n > 1024 {
                return Err(f.invalid("expected between 1 and 1024 stack items"));
            }
            for _ in 0..n {
                f.emit_op(action, opcode::MSIZE);
                f.emit_op(action, opcode::MSTORE);
            }
            32 * n
        }
        Value::StackRef(slot) => {
            f.emit(action, Hexable::StackRef(StackRef::new(*slot, RefKind::Dup)));
            f.emit_op(action, opcode::MSIZE);
            f.emit_op(action, opcode::MSTORE);
            32
        }
        other => {
            return Err(f.invalid(format!(
                "expected an integer or a stack reference, not {}",
                other.type_name()
            )))
        }
    };
    if push_offsets {
        f.push_const(action, total)?;
        f.emit_op(action, opcode::DUP1);
        f.emit_op(action, opcode::MSIZE);
        f.emit_op(action, opcode::SUB);
    }
    Ok(Value::Pointer(action))
}

/// Append the word-by-word store sequence for `h` to `action`.  Also
/// used by `revert` to materialise its reason payload.
pub(super) fn emit_alloc(
    f: &mut Call,
    action: ActionId,
    h: &Hexable,
    push_offsets: bool,
) -> Result<(), CompileError> {
    let len = h.byte_length();
    if push_offsets {
        f.push_const(action, len)?;
        f.emit_op(action, opcode::MSIZE);
    }
    let words = len / 32;
    let rem = len % 32;
    for w in 0..words {
        f.emit_op(action, opcode::PUSH32);
        f.emit(action, Hexable::WordRange(Box::new(h.clone()), w, 1));
        f.emit_op(action, opcode::MSIZE);
        f.emit_op(action, opcode::MSTORE);
    }
    if rem > 0 {
        f.emit_op(action, opcode::push(rem));
        f.emit(action, Hexable::ByteRange(Box::new(h.clone()), 32 * words, rem));
        f.push_const(action, (32 - rem) * 8)?;
        f.emit_op(action, opcode::SHL);
        f.emit_op(action, opcode::MSIZE);
        f.emit_op(action, opcode::MSTORE);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Split a `(value, pushOffsets?)` argument list.
fn data_and_flag<'v>(f: &Call, args: &'v [Value]) -> Result<(&'v Value, bool), CompileError> {
    match args {
        [v] => Ok((v, true)),
        [v, Value::Bool(flag)] => Ok((v, *flag)),
        [_, other] => Err(f.invalid(format!(
            "expected pushOffsets to be a boolean, not {}",
            other.type_name()
        ))),
        _ => Err(f.invalid("expected a value and an optional pushOffsets flag")),
    }
}

/// Interpret an argument as raw data to be materialised.
fn blob(f: &Call, v: &Value) -> Result<Hexable, CompileError> {
    match v {
        Value::Pointer(_) => Err(f.invalid("cannot accept the result of another action")),
        Value::StackRef(_) => Err(f.invalid("cannot accept a stack reference; use allocStack()")),
        other => f.hexable(other),
    }
}
