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
use std::collections::HashMap;

use log::debug;

use crate::errors::CompileError;
use crate::evm::opcode;
use super::{ActionId, Hexable, Item, RefKind, Resolver, RuntimeContext};

/// Post-evaluation pipeline over the collected actions.  Four passes,
/// each producing inputs required by the next:
///
/// 1. flatten the action tree into one instruction stream, inlining
///    children and prepending `JUMPDEST` to jump destinations;
/// 2. simulate the runtime stack over the stream, lowering symbolic
///    stack references to concrete `DUPn`/`SWAPn`;
/// 3. compute byte offsets for every action;
/// 4. render the stream as one hex string.
pub fn process(
    ctx: &RuntimeContext,
    labels: &HashMap<String, ActionId>,
) -> Result<String, CompileError> {
    // Pass 1: flatten.
    let (mut items, spans) = flatten(ctx)?;
    if items.is_empty() {
        return Ok("0x".to_string());
    }
    debug!("flattened {} actions into {} items", spans.len(), items.len());
    // Pass 2: simulate the stack, lower stack references.
    simulate(&mut items, &spans, ctx)?;
    // Pass 3: byte offsets.
    let offsets = byte_offsets(&items, &spans);
    // Pass 4: emit.
    emit(&items, labels, &offsets)
}

// ============================================================================
// Pass 1: flatten
// ============================================================================

/// Records where an action's instructions sit in the flattened
/// stream.  `start` is the index of its first item (its `JUMPDEST`
/// when it is a jump destination); `end` is the index of its last.
/// Spans are recorded in depth-first pre-order, so an enclosing
/// action always precedes its children.
struct Span {
    action: ActionId,
    start: usize,
    end: usize,
}

fn flatten(ctx: &RuntimeContext) -> Result<(Vec<Hexable>, Vec<Span>), CompileError> {
    let mut items = Vec::new();
    let mut spans = Vec::new();
    let roots: Vec<ActionId> =
        ctx.main_actions().chain(ctx.tail_actions()).collect();
    for id in roots {
        flatten_action(ctx, id, &mut items, &mut spans)?;
    }
    // The first flattened instruction must belong to an action.
    if !items.is_empty() && (spans.is_empty() || spans[0].start != 0) {
        return Err(CompileError::internal(
            "first flattened instruction is not owned by an action",
        ));
    }
    Ok((items, spans))
}

fn flatten_action(
    ctx: &RuntimeContext,
    id: ActionId,
    items: &mut Vec<Hexable>,
    spans: &mut Vec<Span>,
) -> Result<(), CompileError> {
    let action = ctx.action(id);
    if action.items.is_empty() && !action.is_jump_destination {
        return Err(CompileError::internal(format!(
            "action {}() at {} contains no instructions",
            action.name, action.loc
        )));
    }
    let start = items.len();
    let span = spans.len();
    spans.push(Span { action: id, start, end: 0 });
    if action.is_jump_destination {
        items.push(Hexable::Op(opcode::JUMPDEST));
    }
    for item in &action.items {
        match item {
            Item::Hex(h) => items.push(h.clone()),
            Item::Child(child) => flatten_action(ctx, *child, items, spans)?,
        }
    }
    spans[span].end = items.len() - 1;
    Ok(())
}

// ============================================================================
// Pass 2: stack simulation
// ============================================================================

/// A stack identity.  Two stack positions hold the same reference iff
/// they are the same logical slot carried forward by opcodes.
type StackId = u64;

fn simulate(
    items: &mut [Hexable],
    spans: &[Span],
    ctx: &RuntimeContext,
) -> Result<(), CompileError> {
    // Simulated stack, index 0 on top.  These are identities, never
    // values.
    let mut stack: Vec<StackId> = Vec::new();
    let mut next_id: StackId = 0;
    let mut fresh = move || {
        let id = next_id;
        next_id += 1;
        id
    };
    // Snapshot of the stack at the end of each action.
    let mut history: HashMap<ActionId, Vec<StackId>> = HashMap::new();
    // Currently-open actions, innermost last, as indices into `spans`.
    let mut open: Vec<usize> = Vec::new();
    let mut cursor = 0;
    //
    for i in 0..items.len() {
        // Enter any action starting here, outermost first.
        while cursor < spans.len() && spans[cursor].start == i {
            open.push(cursor);
            cursor += 1;
        }
        // Lower a symbolic stack reference into a concrete opcode.
        let mut hot = false;
        if let Hexable::StackRef(r) = &items[i] {
            let r = *r;
            let consumer = open
                .last()
                .map(|s| ctx.action(spans[*s].action).name.clone())
                .unwrap_or_default();
            let snapshot = history
                .get(&r.owner)
                .ok_or_else(|| missing_slot(&consumer))?;
            if r.slot >= snapshot.len() {
                return Err(missing_slot(&consumer));
            }
            let real = snapshot[r.slot];
            let depth = stack
                .iter()
                .position(|s| *s == real)
                .ok_or_else(|| missing_slot(&consumer))?;
            let byte = match r.kind {
                RefKind::Dup => {
                    if depth + 1 > 16 {
                        return Err(CompileError::StackReference {
                            message: format!(
                                "stack slot referenced in call to `{}()` is too deep to reach (max DUP16)",
                                consumer
                            ),
                        });
                    }
                    opcode::dup(depth + 1)
                }
                RefKind::Swap | RefKind::HotSwap => {
                    if depth == 0 || depth > 16 {
                        return Err(CompileError::StackReference {
                            message: format!(
                                "stack slot referenced in call to `{}()` cannot be swapped into place (max SWAP16)",
                                consumer
                            ),
                        });
                    }
                    opcode::swap(depth)
                }
            };
            hot = r.kind == RefKind::HotSwap;
            items[i] = Hexable::Op(byte);
        }
        // Apply the instruction's stack effect.
        if let Hexable::Op(byte) = items[i] {
            step(byte, hot, &mut stack, &mut fresh)?;
        }
        // Leave any action ending here, innermost first, snapshotting
        // the stack it produced.
        while let Some(&s) = open.last() {
            if spans[s].end != i {
                break;
            }
            history.insert(spans[s].action, stack.clone());
            open.pop();
        }
    }
    Ok(())
}

fn missing_slot(consumer: &str) -> CompileError {
    CompileError::StackReference {
        message: format!(
            "stack slot referenced in call to `{}()` won't exist on the stack during runtime",
            consumer
        ),
    }
}

/// Apply one instruction to the simulated stack.  `DUPn` duplicates
/// the reference at depth `n-1` so identity survives chains of DUPs;
/// `SWAPn` exchanges the top with depth `n` unless it was lowered
/// from a hot swap, which leaves the reference array alone.
fn step(
    byte: u8,
    hot: bool,
    stack: &mut Vec<StackId>,
    fresh: &mut impl FnMut() -> StackId,
) -> Result<(), CompileError> {
    let op = opcode::from_byte(byte).ok_or_else(|| {
        CompileError::internal(format!("unknown opcode {:#04x} in stream", byte))
    })?;
    if let Some(n) = op.dup_index() {
        // Reaching below the simulated stack produces a fresh
        // reference rather than an error.
        let dup = if n <= stack.len() { stack[n - 1] } else { fresh() };
        stack.insert(0, dup);
    } else if let Some(n) = op.swap_index() {
        if !hot {
            if n >= stack.len() {
                return Err(CompileError::StackReference {
                    message: "swap index out of range".to_string(),
                });
            }
            stack.swap(0, n);
        }
    } else {
        let (removed, added) = op.stack_delta();
        for _ in 0..removed {
            if !stack.is_empty() {
                stack.remove(0);
            }
        }
        for _ in 0..added {
            stack.insert(0, fresh());
        }
    }
    Ok(())
}

// ============================================================================
// Pass 3: byte offsets
// ============================================================================

fn byte_offsets(items: &[Hexable], spans: &[Span]) -> HashMap<ActionId, usize> {
    // Byte position of every item in the stream.
    let mut positions = Vec::with_capacity(items.len());
    let mut position = 0;
    for item in items {
        positions.push(position);
        position += item.byte_length();
    }
    debug!("emitting {} bytes", position);
    // An action's jump offset is the position of its first byte,
    // including its JUMPDEST if any.
    let mut offsets = HashMap::new();
    for span in spans {
        offsets.insert(span.action, positions[span.start]);
    }
    offsets
}

// ============================================================================
// Pass 4: emit
// ============================================================================

fn emit(
    items: &[Hexable],
    labels: &HashMap<String, ActionId>,
    offsets: &HashMap<ActionId, usize>,
) -> Result<String, CompileError> {
    let resolver = Resolver { labels, offsets };
    let mut digits = String::new();
    for item in items {
        digits.push_str(&item.to_hex(&resolver)?);
    }
    if digits.len() % 2 != 0 {
        return Err(CompileError::internal("emitted an odd number of hex digits"));
    }
    Ok(format!("0x{}", digits))
}
