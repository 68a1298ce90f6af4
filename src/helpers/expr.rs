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

//! Expression helpers.  None of these emit instructions; they build
//! values for action helpers to consume, except for `$`, which writes
//! config flags onto the runtime context.

use ruint::aliases::U256;

use crate::errors::CompileError;
use crate::ir::{Hexable, Side};
use super::{Call, Value};

/// `$ptr(name)`: a deferred reference to a named binding, resolved
/// against the surviving namespace once the script has finished.
pub fn ptr(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    match args {
        [Value::Str(name)] => Ok(Value::Hex(Hexable::Label(name.clone()))),
        _ => Err(f.invalid("expected a label name string")),
    }
}

/// `$concat(…)`: concatenate any number of values.
pub fn concat(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.is_empty() {
        return Err(f.invalid("expected at least one value"));
    }
    let mut items = Vec::with_capacity(args.len());
    for v in args {
        items.push(f.hexable(v)?);
    }
    Ok(Value::Hex(Hexable::Concat(items)))
}

/// `$jumpmap(…)`: a table of 2-byte label offsets, padded to a
/// 32-byte boundary.
pub fn jumpmap(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.is_empty() {
        return Err(f.invalid("expected at least one label name"));
    }
    let mut labels = Vec::with_capacity(args.len());
    for v in args {
        match v {
            Value::Str(name) => labels.push(name.clone()),
            other => {
                return Err(f.invalid(format!(
                    "expected label name strings, not {}",
                    other.type_name()
                )))
            }
        }
    }
    Ok(Value::Hex(Hexable::JumpMap(labels)))
}

/// `$bytelen(v)`: the encoded byte length of a value.
pub fn bytelen(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    match args {
        [v] => {
            let h = f.hexable(v)?;
            Ok(Value::Int(U256::from(h.byte_length())))
        }
        _ => Err(f.invalid("expected exactly one value")),
    }
}

/// `$hex(s)`: the UTF-8 bytes of a string literal as a value.
pub fn hex(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    match args {
        [Value::Str(s)] => Ok(Value::Hex(Hexable::Bytes(s.as_bytes().to_vec()))),
        _ => Err(f.invalid("expected a string literal")),
    }
}

/// `$pad(v, n, side = "left")`: pad a value to the next multiple of
/// `n` bytes.
pub fn pad(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(f.invalid("expected a value, a width and an optional side"));
    }
    let h = f.hexable(&args[0])?;
    let n = f.uint(&args[1], "the width")?;
    if n == 0 {
        return Err(f.invalid("expected a non-zero width"));
    }
    let side = match args.get(2) {
        None => Side::Left,
        Some(Value::Str(s)) if s == "left" => Side::Left,
        Some(Value::Str(s)) if s == "right" => Side::Right,
        Some(_) => return Err(f.invalid("expected side to be \"left\" or \"right\"")),
    };
    Ok(Value::Hex(Hexable::Padded(Box::new(h), n, side)))
}

/// `$(key, value)`: store a config flag on the runtime context.  The
/// only recognised key is `deployable`.
pub fn config(f: &mut Call, args: &[Value]) -> Result<Value, CompileError> {
    match args {
        [Value::Str(key), value] => match (key.as_str(), value) {
            ("deployable", Value::Bool(flag)) => {
                f.ctx.set_deployable(*flag);
                Ok(Value::Null)
            }
            ("deployable", other) => Err(f.invalid(format!(
                "expected deployable to be a boolean, not {}",
                other.type_name()
            ))),
            (key, _) => Err(f.invalid(format!("unknown config key \"{}\"", key))),
        },
        _ => Err(f.invalid("expected a config key and a value")),
    }
}
