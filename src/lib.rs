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

//! A scripting front-end for emitting raw EVM bytecode.  Scripts call
//! helper primitives (`push`, `jump`, `alloc`, `dispatch`, ...) which
//! build an intermediate representation rather than executing
//! anything; once the script finishes, the representation is
//! flattened, stack effects are simulated, jump targets are resolved
//! to byte offsets, and the whole program is serialised as a hex
//! string.
//!
//! ```
//! use std::collections::HashMap;
//! use evmscribe::preprocess;
//!
//! let hex = preprocess("push(\"0xff\")", HashMap::new(), "bytecode").unwrap();
//! assert_eq!(hex, "0x60FF");
//! ```

/// Error kinds and source positions.
pub mod errors;
/// The instruction set of the 256-bit stack machine: opcode bytes,
/// stack arities, mnemonics.
pub mod evm;
/// The helper catalogue scripts call, and the argument model shared
/// by every helper.
pub mod helpers;
/// The intermediate representation (actions of hexable values) and
/// the processor that lowers it to a hex string.
pub mod ir;
/// The scripting surface: lexer, parser and evaluator, plus the
/// public compile entry points.
pub mod script;
pub mod util;

pub use errors::CompileError;
pub use helpers::Value;
pub use script::{preprocess, preprocess_file};
