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
use crate::ir::{ActionId, Hexable, RefKind, Side, StackRef};
use super::{memory, Call, Value};

/// The 4-byte selector of `Error(string)`, the standard revert reason
/// envelope.
const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// `jump(x?)` / `jumpi(x?)`: optionally push the target, then emit
/// the branch.  Targets must be pointers, labels or stack references;
/// raw data is rejected.
pub fn jump(f: &mut Call, args: &[Value], op: u8) -> Result<Value, CompileError> {
    if args.len() > 1 {
        return Err(f.invalid("expected at most one argument"));
    }
    let action = f.begin();
    if let Some(v) = args.first() {
        match v {
            Value::Pointer(_) | Value::StackRef(_) | Value::Hex(Hexable::Label(_)) => {
                f.append_input(action, v)?;
            }
            other => {
                return Err(f.invalid(format!(
                    "expected a pointer or label, not {}",
                    other.type_name()
                )))
            }
        }
    }
    f.emit_op(action, op);
    Ok(Value::Pointer(action))
}

/// `revert(x?)`: without an argument, a bare `REVERT` (offset and
/// length are expected on the stack).  With a reason, the standard
/// `Error(string)` payload is allocated first and reverted with.
pub fn revert(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.len() > 1 {
        return Err(f.invalid("expected at most one argument"));
    }
    let action = f.begin();
    match args.first() {
        None => f.emit_op(action, opcode::REVERT),
        Some(v) => {
            let reason = reason_arg(f, v)?;
            emit_revert(f, action, &reason)?;
        }
    }
    Ok(Value::Pointer(action))
}

/// `bail()`: revert with empty return data.
pub fn bail(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if !args.is_empty() {
        return Err(f.invalid("expected no arguments"));
    }
    let action = f.begin();
    emit_bail(f, action)?;
    Ok(Value::Pointer(action))
}

/// `assertNonPayable(x?)`: refuse value transfers.  Checks CALLVALUE,
/// skips over the failure branch when it is zero, and otherwise
/// reverts (with the given reason, or empty).
pub fn assert_non_payable(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.len() > 1 {
        return Err(f.invalid("expected at most one argument"));
    }
    let reason = match args.first() {
        None => None,
        Some(v) => Some(reason_arg(f, v)?),
    };
    let action = f.begin();
    let skip = begin_skip(f, action);
    f.emit_op(action, opcode::CALLVALUE);
    f.emit_op(action, opcode::ISZERO);
    f.emit_op(action, opcode::PUSH2);
    f.emit(action, Hexable::Pointer(skip));
    f.emit_op(action, opcode::JUMPI);
    emit_failure(f, action, reason.as_ref())?;
    f.emit_child(action, skip);
    Ok(Value::Pointer(action))
}

/// `assert(cond, x?)`: the inverse of `assertNonPayable`.  The
/// condition arrives on the stack — through a stack reference, or by
/// adopting the condition action inline — and execution jumps over
/// the failure branch when it is truthy.
pub fn assert_true(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.is_empty() || args.len() > 2 {
        return Err(f.invalid("expected a condition and an optional reason"));
    }
    let reason = match args.get(1) {
        None => None,
        Some(v) => Some(reason_arg(f, v)?),
    };
    let action = f.begin();
    let skip = begin_skip(f, action);
    match &args[0] {
        // The condition action is emitted inline exactly once, ahead
        // of the branch that consumes its result.
        Value::Pointer(p) => f.adopt(action, *p)?,
        Value::StackRef(slot) => {
            f.emit(action, Hexable::StackRef(StackRef::new(*slot, RefKind::Dup)));
        }
        other => {
            return Err(f.invalid(format!(
                "expected a pointer or stack reference, not {}",
                other.type_name()
            )))
        }
    }
    f.emit_op(action, opcode::PUSH2);
    f.emit(action, Hexable::Pointer(skip));
    f.emit_op(action, opcode::JUMPI);
    emit_failure(f, action, reason.as_ref())?;
    f.emit_child(action, skip);
    Ok(Value::Pointer(action))
}

// ============================================================================
// Helpers
// ============================================================================

/// Allocate the empty jump-destination action branches skip to.  The
/// child is parented immediately but appended to the instruction list
/// only after the failure branch.
fn begin_skip(f: &mut Call, parent: ActionId) -> ActionId {
    let skip = f.ctx.new_action(f.name, f.loc);
    f.ctx.action_mut(skip).is_jump_destination = true;
    f.ctx.adopt(parent, skip);
    skip
}

fn emit_failure(
    f: &mut Call,
    action: ActionId,
    reason: Option<&Hexable>,
) -> Result<(), CompileError> {
    match reason {
        None => emit_bail(f, action),
        Some(reason) => emit_revert(f, action, reason),
    }
}

fn emit_bail(f: &mut Call, action: ActionId) -> Result<(), CompileError> {
    f.push_const(action, 0)?;
    f.emit_op(action, opcode::DUP1);
    f.emit_op(action, opcode::REVERT);
    Ok(())
}

fn emit_revert(f: &mut Call, action: ActionId, reason: &Hexable) -> Result<(), CompileError> {
    let payload = Hexable::Concat(vec![
        Hexable::Bytes(ERROR_SELECTOR.to_vec()),
        Hexable::Padded(Box::new(Hexable::Literal(U256::from(0x20u64))), 32, Side::Left),
        Hexable::SolidityString(Box::new(reason.clone())),
    ]);
    memory::emit_alloc(f, action, &payload, true)?;
    f.emit_op(action, opcode::REVERT);
    Ok(())
}

fn reason_arg(f: &Call, v: &Value) -> Result<Hexable, CompileError> {
    match v {
        Value::Pointer(_) | Value::StackRef(_) => Err(f.invalid(format!(
            "expected a reason value, not {}",
            v.type_name()
        ))),
        other => f.hexable(other),
    }
}
