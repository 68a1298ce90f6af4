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

//! The helper catalogue.  Action helpers construct IR actions as a
//! side effect and return an action pointer; expression helpers
//! (`$`-prefixed) construct values without emitting anything.  Every
//! opcode without a hand-written helper is exposed through a default
//! helper named after its lowercased mnemonic.

mod calldata;
mod expr;
mod flow;
mod memory;
mod stack;
mod value;

pub use value::{parse_hex_literal, Value};

use ruint::aliases::U256;

use crate::errors::{CompileError, SourceLoc};
use crate::evm::opcode;
use crate::ir::{ActionId, Hexable, Item, RefKind, RuntimeContext, StackRef};

/// One helper invocation: the context being appended to, the public
/// helper name, and the captured call-site location.  Everything a
/// helper reports or constructs is stamped with these.
pub struct Call<'a> {
    pub ctx: &'a mut RuntimeContext,
    pub name: &'a str,
    pub loc: SourceLoc,
}

impl<'a> Call<'a> {
    pub fn invalid(&self, message: impl Into<String>) -> CompileError {
        CompileError::InputValidation {
            loc: self.loc,
            helper: self.name.to_string(),
            message: message.into(),
        }
    }

    pub fn composition(&self, message: impl Into<String>) -> CompileError {
        CompileError::Composition {
            loc: self.loc,
            helper: self.name.to_string(),
            message: message.into(),
        }
    }

    /// Open the action this invocation builds.
    pub fn begin(&mut self) -> ActionId {
        self.ctx.new_action(self.name, self.loc)
    }

    pub fn emit(&mut self, action: ActionId, h: Hexable) {
        self.ctx.action_mut(action).items.push(Item::Hex(h));
    }

    pub fn emit_op(&mut self, action: ActionId, byte: u8) {
        self.emit(action, Hexable::Op(byte));
    }

    pub fn emit_child(&mut self, action: ActionId, child: ActionId) {
        self.ctx.action_mut(action).items.push(Item::Child(child));
    }

    pub fn hexable(&self, v: &Value) -> Result<Hexable, CompileError> {
        v.to_hexable().map_err(|m| self.invalid(m))
    }

    /// An argument that must be a small non-negative integer.
    pub fn uint(&self, v: &Value, what: &str) -> Result<usize, CompileError> {
        match v {
            Value::Int(u) if u.bit_len() <= 32 => Ok(u.as_limbs()[0] as usize),
            Value::Int(_) => Err(self.invalid(format!("{} is too large", what))),
            other => Err(self.invalid(format!(
                "expected {} to be an integer, not {}",
                what,
                other.type_name()
            ))),
        }
    }

    /// Append a `PUSHn` of a raw value, selecting the width from the
    /// value's byte length.
    pub fn push_value(&mut self, action: ActionId, h: Hexable) -> Result<(), CompileError> {
        let n = h.byte_length();
        if n == 0 {
            return Err(self.invalid("cannot push an empty value"));
        }
        if n > 32 {
            return Err(self.invalid("cannot accept values larger than 32 bytes"));
        }
        self.emit_op(action, opcode::push(n));
        self.emit(action, h);
        Ok(())
    }

    /// Append a `PUSHn` of a small integer constant.
    pub fn push_const(&mut self, action: ActionId, v: usize) -> Result<(), CompileError> {
        self.push_value(action, Hexable::Literal(U256::from(v)))
    }

    /// Append the stack preparation for one helper argument.
    ///
    /// An action pointer is either adopted as a child and inlined (the
    /// argument was authored at-or-after this call, i.e. it is a
    /// nested inline invocation) or pushed as a 2-byte pointer (it
    /// refers to an action authored earlier, i.e. an existing label).
    /// A stack reference lowers to a DUP of its slot.  Anything else
    /// is pushed as raw data.
    pub fn append_input(&mut self, action: ActionId, v: &Value) -> Result<(), CompileError> {
        match v {
            Value::Pointer(p) => {
                if self.ctx.action(*p).loc >= self.loc {
                    self.adopt(action, *p)
                } else {
                    self.emit_op(action, opcode::PUSH2);
                    self.emit(action, Hexable::Pointer(*p));
                    Ok(())
                }
            }
            Value::StackRef(slot) => {
                self.emit(action, Hexable::StackRef(StackRef::new(*slot, RefKind::Dup)));
                Ok(())
            }
            other => {
                let h = self.hexable(other)?;
                self.push_value(action, h)
            }
        }
    }

    /// Adopt `child` and inline its instructions at the current
    /// position.  Linkage is recorded once; a second adoption is a
    /// composition error.
    pub fn adopt(&mut self, action: ActionId, child: ActionId) -> Result<(), CompileError> {
        if !self.ctx.adopt(action, child) {
            let name = self.ctx.action(child).name.clone();
            return Err(self.composition(format!(
                "action {}() is already owned by another action",
                name
            )));
        }
        self.emit_child(action, child);
        Ok(())
    }
}

// ============================================================================
// Catalogue dispatch
// ============================================================================

/// Invoke a helper by its public name.  Unknown names report an
/// evaluation error at the call site.
pub fn call(
    ctx: &mut RuntimeContext,
    name: &str,
    args: &[Value],
    loc: SourceLoc,
) -> Result<Value, CompileError> {
    let mut call = Call { ctx, name, loc };
    match name {
        "push" => stack::push(&mut call, args),
        "dup" => stack::dup(&mut call, args),
        "swap" => stack::swap(&mut call, args),
        "set" => stack::set(&mut call, args),
        "alloc" => memory::alloc(&mut call, args),
        "allocUnsafe" => memory::alloc_unsafe(&mut call, args),
        "allocStack" => memory::alloc_stack(&mut call, args),
        "calldataload" => calldata::calldataload(&mut call, args),
        "pushCallDataOffsets" => calldata::push_call_data_offsets(&mut call, args, false),
        "pushCallDataOffsetsReverse" => calldata::push_call_data_offsets(&mut call, args, true),
        "dispatch" => calldata::dispatch(&mut call, args),
        "jump" => flow::jump(&mut call, args, opcode::JUMP),
        "jumpi" => flow::jump(&mut call, args, opcode::JUMPI),
        "revert" => flow::revert(&mut call, args),
        "bail" => flow::bail(&mut call, args),
        "assert" => flow::assert_true(&mut call, args),
        "assertNonPayable" => flow::assert_non_payable(&mut call, args),
        "$" => expr::config(&mut call, args),
        "$ptr" => expr::ptr(&mut call, args),
        "$concat" => expr::concat(&mut call, args),
        "$jumpmap" => expr::jumpmap(&mut call, args),
        "$bytelen" => expr::bytelen(&mut call, args),
        "$hex" => expr::hex(&mut call, args),
        "$pad" => expr::pad(&mut call, args),
        _ => {
            if let Some(n) = push_width(name) {
                stack::push_n(&mut call, n, args)
            } else if let Some(op) = opcode::from_helper_name(name) {
                stack::generic(&mut call, op, args)
            } else {
                Err(CompileError::Eval {
                    loc,
                    message: format!("{} is not defined", name),
                })
            }
        }
    }
}

/// Is `name` bound in the helper catalogue?  Scripts may not shadow
/// these.
pub fn is_helper(name: &str) -> bool {
    matches!(
        name,
        "push"
            | "dup"
            | "swap"
            | "set"
            | "alloc"
            | "allocUnsafe"
            | "allocStack"
            | "calldataload"
            | "pushCallDataOffsets"
            | "pushCallDataOffsetsReverse"
            | "dispatch"
            | "jump"
            | "jumpi"
            | "revert"
            | "bail"
            | "assert"
            | "assertNonPayable"
            | "$"
            | "$ptr"
            | "$concat"
            | "$jumpmap"
            | "$bytelen"
            | "$hex"
            | "$pad"
    ) || push_width(name).is_some()
        || opcode::from_helper_name(name).is_some()
}

/// Parse a `pushN` helper name into its exact width.
fn push_width(name: &str) -> Option<usize> {
    let n: usize = name.strip_prefix("push")?.parse().ok()?;
    if (1..=32).contains(&n) {
        Some(n)
    } else {
        None
    }
}
