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
use std::fmt;
use std::io;

/// A position within the script source, captured at helper-call time
/// and carried on every Action and error.  Ordering is textual:
/// line first, then column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLoc {
    pub line: u32,
    pub col: u32,
}

impl SourceLoc {
    pub fn new(line: u32, col: u32) -> Self {
        SourceLoc { line, col }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ============================================================================
// Compile Error
// ============================================================================

/// Everything that can go wrong between reading a script and emitting
/// its hex string.  All errors surface to the `preprocess` caller; no
/// retries, no partial output.
#[derive(Debug)]
pub enum CompileError {
    /// The script could not be lexed or parsed.
    Syntax { loc: SourceLoc, message: String },
    /// The script failed during evaluation (unknown binding, unknown
    /// function, bad destructuring, ...).
    Eval { loc: SourceLoc, message: String },
    /// A helper rejected one of its arguments.
    InputValidation {
        loc: SourceLoc,
        helper: String,
        message: String,
    },
    /// An Action was composed illegally (e.g. adopted twice).
    Composition {
        loc: SourceLoc,
        helper: String,
        message: String,
    },
    /// A stack reference could not be lowered to a DUP/SWAP.
    StackReference { message: String },
    /// A `$ptr` name did not resolve to an action pointer after the
    /// script finished evaluating.
    LabelResolution { name: String },
    /// A pointer target sits beyond the 2-byte offset range.
    OffsetTooLarge { offset: usize },
    /// An invariant of the compiler itself was violated.
    Internal { message: String },
    /// The input file could not be read.
    Io(io::Error),
}

impl CompileError {
    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal { message: message.into() }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Syntax { loc, message } => {
                write!(f, "{}: syntax error: {}", loc, message)
            }
            CompileError::Eval { loc, message } => {
                write!(f, "{}: {}", loc, message)
            }
            CompileError::InputValidation { loc, helper, message } => {
                write!(f, "{}: {}(): {}", loc, helper, message)
            }
            CompileError::Composition { loc, helper, message } => {
                write!(f, "{}: {}(): {}", loc, helper, message)
            }
            CompileError::StackReference { message } => {
                write!(f, "{}", message)
            }
            CompileError::LabelResolution { name } => {
                write!(f, "label \"{}\" is not bound to an action pointer", name)
            }
            CompileError::OffsetTooLarge { offset } => {
                write!(f, "jump offset {:#x} exceeds the 2-byte pointer range", offset)
            }
            CompileError::Internal { message } => {
                write!(f, "internal error: {}", message)
            }
            CompileError::Io(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<io::Error> for CompileError {
    fn from(e: io::Error) -> Self {
        CompileError::Io(e)
    }
}
