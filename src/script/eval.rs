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
use std::collections::{HashMap, HashSet};

use log::debug;

use crate::errors::{CompileError, SourceLoc};
use crate::helpers::{self, Value};
use crate::ir::{ActionId, RuntimeContext, StackSlot, VIRTUAL_STACK_SIZE};
use super::parser::{Expr, Stmt};

/// Walks the statement list, calling helpers and maintaining the
/// script namespace.  After evaluation the namespace doubles as the
/// label map: surviving action-pointer bindings become jump
/// destinations and resolve `$ptr` references.
pub struct Evaluator {
    pub ctx: RuntimeContext,
    namespace: HashMap<String, Value>,
    constants: HashSet<String>,
}

impl Evaluator {
    /// Start with the given extra bindings in scope.
    pub fn new(bindings: HashMap<String, Value>) -> Self {
        Evaluator {
            ctx: RuntimeContext::new(),
            namespace: bindings,
            constants: HashSet::new(),
        }
    }

    pub fn run(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            self.run_stmt(stmt)?;
        }
        Ok(())
    }

    fn run_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            Stmt::Assign { constant, name, expr, loc } => {
                let value = self.eval(expr)?;
                self.bind(name, value, *constant, *loc)
            }
            Stmt::Destructure { names, expr, loc } => {
                let value = self.eval(expr)?;
                let owner = match value {
                    Value::Pointer(id) => id,
                    other => {
                        return Err(CompileError::Eval {
                            loc: *loc,
                            message: format!(
                                "destructuring requires an action pointer, not {}",
                                other.type_name()
                            ),
                        })
                    }
                };
                if names.len() > VIRTUAL_STACK_SIZE {
                    return Err(CompileError::Eval {
                        loc: *loc,
                        message: format!(
                            "an action publishes at most {} stack slots",
                            VIRTUAL_STACK_SIZE
                        ),
                    });
                }
                let slots: Vec<StackSlot> = self.ctx.action(owner).slots().collect();
                for (name, slot) in names.iter().zip(slots) {
                    self.bind(name, Value::StackRef(slot), false, *loc)?;
                }
                Ok(())
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, CompileError> {
        match expr {
            Expr::Num(v, _) => Ok(Value::Int(*v)),
            Expr::Str(s, _) => Ok(Value::Str(s.clone())),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Ident(name, loc) => match self.namespace.get(name) {
                Some(value) => Ok(value.clone()),
                None => Err(CompileError::Eval {
                    loc: *loc,
                    message: format!("{} is not defined", name),
                }),
            },
            Expr::Call(name, args, loc) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                helpers::call(&mut self.ctx, name, &values, *loc)
            }
            Expr::Map(entries, _) => {
                let mut values = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    values.push((key.clone(), self.eval(value)?));
                }
                Ok(Value::Map(values))
            }
        }
    }

    fn bind(
        &mut self,
        name: &str,
        value: Value,
        constant: bool,
        loc: SourceLoc,
    ) -> Result<(), CompileError> {
        if helpers::is_helper(name) {
            return Err(CompileError::Eval {
                loc,
                message: format!("cannot redeclare built-in helper \"{}\"", name),
            });
        }
        if self.constants.contains(name) {
            return Err(CompileError::Eval {
                loc,
                message: format!("assignment to constant \"{}\"", name),
            });
        }
        if constant {
            self.constants.insert(name.to_string());
        }
        self.namespace.insert(name.to_string(), value);
        Ok(())
    }

    /// Mark every surviving action-pointer binding as a jump
    /// destination, unless its name opts out with a leading
    /// underscore.
    pub fn promote_labels(&mut self) {
        for (name, value) in &self.namespace {
            if name.starts_with('_') {
                continue;
            }
            if let Value::Pointer(id) = value {
                debug!("promoting {} to a jump destination", name);
                self.ctx.action_mut(*id).is_jump_destination = true;
            }
        }
    }

    /// The label map used to resolve `$ptr` references and jump maps.
    pub fn labels(&self) -> HashMap<String, ActionId> {
        self.namespace
            .iter()
            .filter_map(|(name, value)| match value {
                Value::Pointer(id) => Some((name.clone(), *id)),
                _ => None,
            })
            .collect()
    }
}
