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
use super::{Action, ActionId};

/// The append-only collector helpers write actions into while the
/// script executes.  All actions live in the arena here and are
/// identified by their index; the two buckets record emission order
/// (tail actions hold deferred data blobs emitted after all normal
/// code).  Helpers never mutate previously appended actions.
pub struct RuntimeContext {
    arena: Vec<Action>,
    main: Vec<ActionId>,
    tail: Vec<ActionId>,
    deployable: bool,
}

impl RuntimeContext {
    pub fn new() -> Self {
        RuntimeContext {
            arena: Vec::new(),
            main: Vec::new(),
            tail: Vec::new(),
            deployable: false,
        }
    }

    /// Allocate a fresh action in the main bucket, returning its id.
    pub fn new_action(&mut self, name: &str, loc: SourceLoc) -> ActionId {
        self.alloc(name, loc, false)
    }

    /// Allocate a fresh action in the tail bucket (deferred data).
    pub fn new_tail_action(&mut self, name: &str, loc: SourceLoc) -> ActionId {
        self.alloc(name, loc, true)
    }

    fn alloc(&mut self, name: &str, loc: SourceLoc, tail: bool) -> ActionId {
        let id = self.arena.len() as ActionId;
        self.arena.push(Action::new(id, name, loc));
        if tail {
            self.tail.push(id);
        } else {
            self.main.push(id);
        }
        id
    }

    pub fn action(&self, id: ActionId) -> &Action {
        &self.arena[id as usize]
    }

    pub fn action_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.arena[id as usize]
    }

    /// Record a parent/child adoption.  Returns `false` when the
    /// child already has a parent; linkage is recorded once and is
    /// immutable.
    pub fn adopt(&mut self, parent: ActionId, child: ActionId) -> bool {
        let action = self.action_mut(child);
        if action.parent.is_some() {
            return false;
        }
        action.parent = Some(parent);
        true
    }

    /// Top-level actions of the main bucket, in creation order.
    /// Adopted children are reached through their parents.
    pub fn main_actions(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.main.iter().copied().filter(move |id| self.action(*id).parent.is_none())
    }

    /// Top-level actions of the tail bucket, in creation order.
    pub fn tail_actions(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.tail.iter().copied().filter(move |id| self.action(*id).parent.is_none())
    }

    pub fn set_deployable(&mut self, flag: bool) {
        self.deployable = flag;
    }

    pub fn deployable(&self) -> bool {
        self.deployable
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}
