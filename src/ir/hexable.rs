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
use std::fmt::Write;

use ruint::aliases::U256;

use crate::errors::CompileError;
use crate::util;
use super::{ActionId, StackRef};

/// Which end of a value padding zeros are attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The IR value tree.  Everything the compiler can emit is one of
/// these; each variant knows its byte length (pure, called repeatedly
/// during offset calculation) and how to render itself as hex digits
/// once pointers are resolvable.
///
/// `Literal` and `Bytes` both denote raw data.  The distinction
/// matters for width: a literal integer encodes minimally (zero is a
/// single `00` byte), whereas a hex-string input keeps its exact byte
/// length including leading zero bytes, so `push2("0x0001")` is two
/// bytes wide.
#[derive(Clone, Debug, PartialEq)]
pub enum Hexable {
    /// An unsigned integer, encoded big-endian with no leading zeros.
    Literal(U256),
    /// An exact byte sequence.
    Bytes(Vec<u8>),
    /// A single opcode byte.
    Op(u8),
    /// Concatenation; lengths sum.
    Concat(Vec<Hexable>),
    /// `(inner, start, len)`: a byte sub-slice of `inner`'s encoding,
    /// right-padded with zero bytes when the slice runs past the end.
    ByteRange(Box<Hexable>, usize, usize),
    /// `(inner, word_start, word_len)`: a 32-byte-word sub-slice.
    WordRange(Box<Hexable>, usize, usize),
    /// Pads `inner` up to the next multiple of `len` bytes.
    Padded(Box<Hexable>, usize, Side),
    /// A 32-byte big-endian length prefix followed by `inner`
    /// right-padded to a 32-byte boundary.
    SolidityString(Box<Hexable>),
    /// A table of 2-byte label offsets, right-padded to a 32-byte
    /// boundary.
    JumpMap(Vec<String>),
    /// Deferred reference to a named binding; resolved against the
    /// surviving script namespace at emission.
    Label(String),
    /// Reference to an action; resolved to its 2-byte byte offset.
    Pointer(ActionId),
    /// A symbolic stack slot.  Must have been lowered to a concrete
    /// `DUPn`/`SWAPn` before emission; reaching `to_hex` is a fatal
    /// internal error.
    StackRef(StackRef),
}

/// Everything `to_hex` needs to turn symbolic references into digits:
/// the label namespace surviving script evaluation and the byte
/// offset of every action.
pub struct Resolver<'a> {
    pub labels: &'a HashMap<String, ActionId>,
    pub offsets: &'a HashMap<ActionId, usize>,
}

impl<'a> Resolver<'a> {
    /// Render the 2-byte offset of an action, failing when the target
    /// sits beyond the pointer range.
    fn pointer_hex(&self, id: ActionId) -> Result<String, CompileError> {
        let offset = *self.offsets.get(&id).ok_or_else(|| {
            CompileError::internal(format!("no byte offset recorded for action #{}", id))
        })?;
        if offset > 0xffff {
            return Err(CompileError::OffsetTooLarge { offset });
        }
        Ok(format!("{:04X}", offset))
    }

    fn label_hex(&self, name: &str) -> Result<String, CompileError> {
        match self.labels.get(name) {
            Some(&id) => self.pointer_hex(id),
            None => Err(CompileError::LabelResolution { name: name.to_string() }),
        }
    }
}

impl Hexable {
    /// Number of bytes this value occupies in the emitted stream.
    /// Pure and side-effect free.
    pub fn byte_length(&self) -> usize {
        match self {
            Hexable::Literal(v) => std::cmp::max(1, v.byte_len()),
            Hexable::Bytes(bytes) => bytes.len(),
            Hexable::Op(_) => 1,
            Hexable::Concat(items) => items.iter().map(|h| h.byte_length()).sum(),
            Hexable::ByteRange(_, _, len) => *len,
            Hexable::WordRange(_, _, words) => 32 * words,
            Hexable::Padded(inner, len, _) => util::round_up(inner.byte_length(), *len),
            Hexable::SolidityString(inner) => 32 + util::round_up(inner.byte_length(), 32),
            Hexable::JumpMap(labels) => util::round_up(2 * labels.len(), 32),
            Hexable::Label(_) => 2,
            Hexable::Pointer(_) => 2,
            // A stack reference always lowers to a single DUP/SWAP
            // byte.
            Hexable::StackRef(_) => 1,
        }
    }

    /// Render this value as `2 * byte_length()` uppercase hex digits.
    pub fn to_hex(&self, r: &Resolver) -> Result<String, CompileError> {
        match self {
            Hexable::Literal(v) => {
                let bytes = v.to_be_bytes_trimmed_vec();
                if bytes.is_empty() {
                    Ok("00".to_string())
                } else {
                    Ok(hex_digits(&bytes))
                }
            }
            Hexable::Bytes(bytes) => Ok(hex_digits(bytes)),
            Hexable::Op(byte) => Ok(format!("{:02X}", byte)),
            Hexable::Concat(items) => {
                let mut out = String::new();
                for item in items {
                    out.push_str(&item.to_hex(r)?);
                }
                Ok(out)
            }
            Hexable::ByteRange(inner, start, len) => {
                Ok(slice_hex(&inner.to_hex(r)?, *start, *len))
            }
            Hexable::WordRange(inner, start, words) => {
                Ok(slice_hex(&inner.to_hex(r)?, 32 * start, 32 * words))
            }
            Hexable::Padded(inner, len, side) => {
                let digits = inner.to_hex(r)?;
                let target = 2 * util::round_up(inner.byte_length(), *len);
                let zeros = "0".repeat(target - digits.len());
                match side {
                    Side::Left => Ok(zeros + &digits),
                    Side::Right => Ok(digits + &zeros),
                }
            }
            Hexable::SolidityString(inner) => {
                let digits = inner.to_hex(r)?;
                let target = 2 * util::round_up(inner.byte_length(), 32);
                let mut out = format!("{:064X}", inner.byte_length());
                out.push_str(&digits);
                out.push_str(&"0".repeat(target - digits.len()));
                Ok(out)
            }
            Hexable::JumpMap(labels) => {
                let mut out = String::new();
                for label in labels {
                    out.push_str(&r.label_hex(label)?);
                }
                out.push_str(&"0".repeat(2 * self.byte_length() - out.len()));
                Ok(out)
            }
            Hexable::Label(name) => r.label_hex(name),
            Hexable::Pointer(id) => r.pointer_hex(*id),
            Hexable::StackRef(_) => Err(CompileError::internal(
                "stack reference survived to hex emission",
            )),
        }
    }
}

/// Uppercase hex digits for a byte slice, without any prefix.
fn hex_digits(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 * bytes.len());
    for b in bytes {
        write!(out, "{:02X}", b).unwrap();
    }
    out
}

/// Take `len` bytes of `digits` starting at byte `start`, padding
/// with zero bytes past the end.
fn slice_hex(digits: &str, start: usize, len: usize) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(2 * len);
    for i in (2 * start)..(2 * (start + len)) {
        out.push(bytes.get(i).map(|b| *b as char).unwrap_or('0'));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(h: &Hexable) -> String {
        let labels = HashMap::new();
        let offsets = HashMap::new();
        h.to_hex(&Resolver { labels: &labels, offsets: &offsets }).unwrap()
    }

    #[test]
    fn test_literal_zero() {
        let h = Hexable::Literal(U256::ZERO);
        assert_eq!(h.byte_length(), 1);
        assert_eq!(resolve(&h), "00");
    }

    #[test]
    fn test_literal_minimal() {
        let h = Hexable::Literal(U256::from(0x1234u64));
        assert_eq!(h.byte_length(), 2);
        assert_eq!(resolve(&h), "1234");
    }

    #[test]
    fn test_byte_range_pads() {
        let inner = Hexable::Bytes(vec![0xab, 0xcd]);
        let h = Hexable::ByteRange(Box::new(inner), 1, 3);
        assert_eq!(h.byte_length(), 3);
        assert_eq!(resolve(&h), "CD0000");
    }

    #[test]
    fn test_padded_left_and_right() {
        let one = Hexable::Literal(U256::from(1u64));
        let left = Hexable::Padded(Box::new(one.clone()), 4, Side::Left);
        let right = Hexable::Padded(Box::new(one), 4, Side::Right);
        assert_eq!(left.byte_length(), 4);
        assert_eq!(resolve(&left), "00000001");
        assert_eq!(resolve(&right), "01000000");
    }

    #[test]
    fn test_solidity_string() {
        let h = Hexable::SolidityString(Box::new(Hexable::Bytes(b"abc".to_vec())));
        assert_eq!(h.byte_length(), 64);
        let digits = resolve(&h);
        assert_eq!(&digits[..64], &format!("{:064X}", 3));
        assert!(digits[64..].starts_with("616263"));
        assert_eq!(digits.len(), 128);
    }

    #[test]
    fn test_jumpmap_lengths() {
        let three = Hexable::JumpMap(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(three.byte_length(), 32);
        let eighteen = Hexable::JumpMap((0..18).map(|i| format!("l{}", i)).collect());
        assert_eq!(eighteen.byte_length(), 64);
    }

    #[test]
    fn test_pointer_range_check() {
        let labels = HashMap::new();
        let mut offsets = HashMap::new();
        offsets.insert(0u32, 0x10000usize);
        let r = Resolver { labels: &labels, offsets: &offsets };
        match Hexable::Pointer(0).to_hex(&r) {
            Err(CompileError::OffsetTooLarge { offset }) => assert_eq!(offset, 0x10000),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
