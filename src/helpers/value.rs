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

use crate::ir::{ActionId, Hexable, StackSlot};
use crate::util::FromHexString;

/// Everything a script expression can evaluate to, and hence
/// everything a helper can receive as an argument: raw integers, hex
/// and plain strings, booleans, composed IR values, action pointers,
/// stack references, and the maps `dispatch` consumes.  Dispatch on
/// this type at the helper boundary decides between composition,
/// pointer pushing, reference lowering, and plain data.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(U256),
    Str(String),
    Hex(Hexable),
    Pointer(ActionId),
    StackRef(StackSlot),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// How this value is described in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Int(_) => "an integer",
            Value::Str(_) => "a string",
            Value::Hex(_) => "a value expression",
            Value::Pointer(_) => "an action pointer",
            Value::StackRef(_) => "a stack reference",
            Value::Map(_) => "a map",
        }
    }

    /// Interpret this value as raw data.  Integers encode minimally;
    /// strings are accepted only when they are hex literals, in which
    /// case their exact byte width is preserved.
    pub fn to_hexable(&self) -> Result<Hexable, String> {
        match self {
            Value::Int(v) => Ok(Hexable::Literal(*v)),
            Value::Str(s) => match parse_hex_literal(s) {
                Some(bytes) => Ok(Hexable::Bytes(bytes)),
                None => Err("string passed where only hex literal is allowed".to_string()),
            },
            Value::Hex(h) => Ok(h.clone()),
            Value::Pointer(id) => Ok(Hexable::Pointer(*id)),
            other => Err(format!("cannot accept {} here", other.type_name())),
        }
    }
}

/// Parse a `0x`-prefixed hex string into bytes, or `None` when the
/// string is not a hex literal.  An odd digit count reads the leading
/// digit as a whole byte, so `"0x0"` is a single zero byte.
pub fn parse_hex_literal(s: &str) -> Option<Vec<u8>> {
    let digits = s.strip_prefix("0x")?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    digits.from_hex_string().ok()
}
