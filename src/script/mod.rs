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
mod eval;
mod lexer;
mod parser;

pub use parser::{parse, Expr, Stmt};

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;

use crate::errors::CompileError;
use crate::helpers::Value;
use crate::ir::processor;

/// The bundled deployer: wraps another program's bytecode with
/// constructor-style copy-to-return logic.  Compiled with `CODE`
/// bound to the inner hex when a script sets `$("deployable", true)`.
pub const DEPLOYER_SOURCE: &str = include_str!("../deployer.evms");

/// Compile a script into a `"0x"`-prefixed uppercase hex string.
///
/// `bindings` are placed in the script namespace before evaluation;
/// `filename` only labels diagnostics (use `"bytecode"` when there is
/// no natural name).  The empty program compiles to `"0x"`.
pub fn preprocess(
    source: &str,
    bindings: HashMap<String, Value>,
    filename: &str,
) -> Result<String, CompileError> {
    debug!("compiling {}", filename);
    let stmts = parser::parse(source)?;
    let mut evaluator = eval::Evaluator::new(bindings);
    evaluator.run(&stmts)?;
    evaluator.promote_labels();
    let labels = evaluator.labels();
    let deployable = evaluator.ctx.deployable();
    let hex = processor::process(&evaluator.ctx, &labels)?;
    if deployable {
        debug!("wrapping {} with the deployer", filename);
        let mut wrapped = HashMap::new();
        wrapped.insert("CODE".to_string(), Value::Str(hex));
        preprocess(DEPLOYER_SOURCE, wrapped, "deployer")
    } else {
        Ok(hex)
    }
}

/// Read a UTF-8 script file and compile it.
pub fn preprocess_file(
    path: impl AsRef<Path>,
    bindings: HashMap<String, Value>,
) -> Result<String, CompileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("bytecode");
    preprocess(&source, bindings, filename)
}
