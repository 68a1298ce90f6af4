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
use crate::errors::SourceLoc;
use super::Hexable;

/// Actions are arena-allocated inside the runtime context and referred
/// to everywhere by id; parent/child links and stack references carry
/// ids rather than ownership.
pub type ActionId = u32;

/// Number of relative stack-reference slots every action publishes.
/// Slot 0 denotes the top of the stack as left by the action.
pub const VIRTUAL_STACK_SIZE: usize = 16;

/// Identifies one slot of an action's virtual output stack.  This is
/// what script bindings hold after destructuring an action pointer;
/// it names a stack *identity*, never a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackSlot {
    pub owner: ActionId,
    pub slot: usize,
}

/// How a consumed stack slot is lowered to a concrete instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    /// Copy the slot to the top via `DUPn`.
    Dup,
    /// Exchange the top with the slot via `SWAPn`.
    Swap,
    /// Emit `SWAPn` but leave the simulator's reference array alone,
    /// so the slot keeps its identity while receiving a new value.
    HotSwap,
}

/// A stack slot tagged with its lowering, as it appears in an
/// action's instruction list before the processor replaces it with a
/// concrete `DUPn`/`SWAPn`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackRef {
    pub owner: ActionId,
    pub slot: usize,
    pub kind: RefKind,
}

impl StackRef {
    pub fn new(slot: StackSlot, kind: RefKind) -> Self {
        StackRef { owner: slot.owner, slot: slot.slot, kind }
    }
}

// ============================================================================
// Action
// ============================================================================

/// One entry of an action's instruction list: either an emittable
/// value or a nested child action, inlined at this position when the
/// stream is flattened.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Hex(Hexable),
    Child(ActionId),
}

/// A named unit of intermediate representation produced by exactly
/// one helper call.  Actions never mutate once the script has
/// finished evaluating; the processor works over flattened copies.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub is_jump_destination: bool,
    pub parent: Option<ActionId>,
    pub items: Vec<Item>,
    pub loc: SourceLoc,
}

impl Action {
    pub fn new(id: ActionId, name: &str, loc: SourceLoc) -> Self {
        Action {
            id,
            name: name.to_string(),
            is_jump_destination: false,
            parent: None,
            items: Vec::new(),
            loc,
        }
    }

    /// The action's virtual output stack, slots 0..16 with slot 0 on
    /// top.  Array destructuring in scripts binds these in order.
    pub fn slots(&self) -> impl Iterator<Item = StackSlot> {
        let owner = self.id;
        (0..VIRTUAL_STACK_SIZE).map(move |slot| StackSlot { owner, slot })
    }
}
