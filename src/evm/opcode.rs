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

// 0s: Stop and Arithmetic Operations
pub const STOP: u8 = 0x0;
pub const ADD: u8 = 0x01;
pub const MUL: u8 = 0x02;
pub const SUB: u8 = 0x03;
pub const DIV: u8 = 0x04;
pub const SDIV: u8 = 0x05;
pub const MOD: u8 = 0x06;
pub const SMOD: u8 = 0x07;
pub const ADDMOD: u8 = 0x08;
pub const MULMOD: u8 = 0x09;
pub const EXP: u8 = 0x0a;
pub const SIGNEXTEND: u8 = 0x0b;
// 10s: Comparison & Bitwise Logic Operations
pub const LT: u8 = 0x10;
pub const GT: u8 = 0x11;
pub const SLT: u8 = 0x12;
pub const SGT: u8 = 0x13;
pub const EQ: u8 = 0x14;
pub const ISZERO: u8 = 0x15;
pub const AND: u8 = 0x16;
pub const OR: u8 = 0x17;
pub const XOR: u8 = 0x18;
pub const NOT: u8 = 0x19;
pub const BYTE: u8 = 0x1a;
pub const SHL: u8 = 0x1b;
pub const SHR: u8 = 0x1c;
pub const SAR: u8 = 0x1d;
// 20s: Keccak256
pub const KECCAK256: u8 = 0x20;
// 30s: Environment Information
pub const ADDRESS: u8 = 0x30;
pub const BALANCE: u8 = 0x31;
pub const ORIGIN: u8 = 0x32;
pub const CALLER: u8 = 0x33;
pub const CALLVALUE: u8 = 0x34;
pub const CALLDATALOAD: u8 = 0x35;
pub const CALLDATASIZE: u8 = 0x36;
pub const CALLDATACOPY: u8 = 0x37;
pub const CODESIZE: u8 = 0x38;
pub const CODECOPY: u8 = 0x39;
pub const GASPRICE: u8 = 0x3a;
pub const EXTCODESIZE: u8 = 0x3b;
pub const EXTCODECOPY: u8 = 0x3c;
pub const RETURNDATASIZE: u8 = 0x3d;
pub const RETURNDATACOPY: u8 = 0x3e;
pub const EXTCODEHASH: u8 = 0x3f;
// 40s: Block Information
pub const BLOCKHASH: u8 = 0x40;
pub const COINBASE: u8 = 0x41;
pub const TIMESTAMP: u8 = 0x42;
pub const NUMBER: u8 = 0x43;
pub const DIFFICULTY: u8 = 0x44;
pub const GASLIMIT: u8 = 0x45;
pub const CHAINID: u8 = 0x46;
pub const SELFBALANCE: u8 = 0x47;
// 50s: Stack, Memory Storage and Flow Operations
pub const POP: u8 = 0x50;
pub const MLOAD: u8 = 0x51;
pub const MSTORE: u8 = 0x52;
pub const MSTORE8: u8 = 0x53;
pub const SLOAD: u8 = 0x54;
pub const SSTORE: u8 = 0x55;
pub const JUMP: u8 = 0x56;
pub const JUMPI: u8 = 0x57;
pub const PC: u8 = 0x58;
pub const MSIZE: u8 = 0x59;
pub const GAS: u8 = 0x5a;
pub const JUMPDEST: u8 = 0x5b;
// 60s & 70s: Push Operations
pub const PUSH1: u8 = 0x60;
pub const PUSH2: u8 = 0x61;
pub const PUSH4: u8 = 0x63;
pub const PUSH32: u8 = 0x7f;
// 80s: Duplication Operations
pub const DUP1: u8 = 0x80;
pub const DUP2: u8 = 0x81;
pub const DUP3: u8 = 0x82;
pub const DUP16: u8 = 0x8f;
// 90s: Exchange Operations
pub const SWAP1: u8 = 0x90;
pub const SWAP16: u8 = 0x9f;
// a0s: Logging Operations
pub const LOG0: u8 = 0xa0;
pub const LOG4: u8 = 0xa4;
// f0s: System Operations
pub const CREATE: u8 = 0xf0;
pub const CALL: u8 = 0xf1;
pub const CALLCODE: u8 = 0xf2;
pub const RETURN: u8 = 0xf3;
pub const DELEGATECALL: u8 = 0xf4;
pub const CREATE2: u8 = 0xf5;
pub const STATICCALL: u8 = 0xfa;
pub const REVERT: u8 = 0xfd;
pub const INVALID: u8 = 0xfe;
pub const SELFDESTRUCT: u8 = 0xff;

/// Construct the opcode byte for a `PUSHn` instruction pushing `n`
/// bytes of inline data, where `1 <= n <= 32`.
pub const fn push(n: usize) -> u8 {
    0x5f + (n as u8)
}

/// Construct the opcode byte for a `DUPn` instruction, `1 <= n <= 16`.
pub const fn dup(n: usize) -> u8 {
    0x7f + (n as u8)
}

/// Construct the opcode byte for a `SWAPn` instruction, `1 <= n <= 16`.
pub const fn swap(n: usize) -> u8 {
    0x8f + (n as u8)
}

// ============================================================================
// Opcode records
// ============================================================================

/// A single instruction of the EVM instruction set, tagged with its
/// opcode byte, the number of stack items it removes, the number it
/// adds, and its mnemonic.
///
/// `DUPn` and `SWAPn` deliberately report `(0,1)` and `(0,0)`: their
/// true effect on stack *identities* is modelled by the processor,
/// which tracks which logical slot each operation duplicates or
/// exchanges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Opcode {
    pub byte: u8,
    pub removed: u8,
    pub added: u8,
    pub mnemonic: &'static str,
}

impl Opcode {
    /// Returns the stack effect of this instruction as a
    /// `(removed, added)` pair.
    pub fn stack_delta(&self) -> (u8, u8) {
        (self.removed, self.added)
    }

    /// Is this one of `PUSH1` .. `PUSH32`?
    pub fn is_push(&self) -> bool {
        (0x60..=0x7f).contains(&self.byte)
    }

    /// Is this one of `DUP1` .. `DUP16`?
    pub fn is_dup(&self) -> bool {
        (0x80..=0x8f).contains(&self.byte)
    }

    /// Is this one of `SWAP1` .. `SWAP16`?
    pub fn is_swap(&self) -> bool {
        (0x90..=0x9f).contains(&self.byte)
    }

    /// Number of inline data bytes following a `PUSHn` instruction.
    pub fn push_bytes(&self) -> Option<usize> {
        if self.is_push() {
            Some((self.byte - 0x5f) as usize)
        } else {
            None
        }
    }

    /// The `n` of a `DUPn` instruction.
    pub fn dup_index(&self) -> Option<usize> {
        if self.is_dup() {
            Some((self.byte - 0x7f) as usize)
        } else {
            None
        }
    }

    /// The `n` of a `SWAPn` instruction.
    pub fn swap_index(&self) -> Option<usize> {
        if self.is_swap() {
            Some((self.byte - 0x8f) as usize)
        } else {
            None
        }
    }

    /// The name under which a default helper for this instruction is
    /// exposed to scripts: the lowercased mnemonic, with reserved
    /// scripting keywords substituted (`return` becomes `ret`).
    pub fn helper_name(&self) -> String {
        match self.mnemonic {
            "RETURN" => "ret".to_string(),
            m => m.to_lowercase(),
        }
    }
}

/// Look up an instruction by its opcode byte.
pub fn from_byte(byte: u8) -> Option<&'static Opcode> {
    OPCODES.iter().find(|op| op.byte == byte)
}

/// Look up an instruction by its (uppercase) mnemonic.
pub fn from_mnemonic(mnemonic: &str) -> Option<&'static Opcode> {
    OPCODES.iter().find(|op| op.mnemonic == mnemonic)
}

/// Look up an instruction by the name of its default script helper
/// (see [`Opcode::helper_name`]).
pub fn from_helper_name(name: &str) -> Option<&'static Opcode> {
    OPCODES.iter().find(|op| op.helper_name() == name)
}

const fn op(byte: u8, removed: u8, added: u8, mnemonic: &'static str) -> Opcode {
    Opcode { byte, removed, added, mnemonic }
}

/// The full instruction set: 142 instructions of the 256-bit stack
/// machine.
pub static OPCODES: [Opcode; 142] = [
    // 0s: Stop and Arithmetic Operations
    op(STOP, 0, 0, "STOP"),
    op(ADD, 2, 1, "ADD"),
    op(MUL, 2, 1, "MUL"),
    op(SUB, 2, 1, "SUB"),
    op(DIV, 2, 1, "DIV"),
    op(SDIV, 2, 1, "SDIV"),
    op(MOD, 2, 1, "MOD"),
    op(SMOD, 2, 1, "SMOD"),
    op(ADDMOD, 3, 1, "ADDMOD"),
    op(MULMOD, 3, 1, "MULMOD"),
    op(EXP, 2, 1, "EXP"),
    op(SIGNEXTEND, 2, 1, "SIGNEXTEND"),
    // 10s: Comparison & Bitwise Logic Operations
    op(LT, 2, 1, "LT"),
    op(GT, 2, 1, "GT"),
    op(SLT, 2, 1, "SLT"),
    op(SGT, 2, 1, "SGT"),
    op(EQ, 2, 1, "EQ"),
    op(ISZERO, 1, 1, "ISZERO"),
    op(AND, 2, 1, "AND"),
    op(OR, 2, 1, "OR"),
    op(XOR, 2, 1, "XOR"),
    op(NOT, 1, 1, "NOT"),
    op(BYTE, 2, 1, "BYTE"),
    op(SHL, 2, 1, "SHL"),
    op(SHR, 2, 1, "SHR"),
    op(SAR, 2, 1, "SAR"),
    // 20s: Keccak256
    op(KECCAK256, 2, 1, "KECCAK256"),
    // 30s: Environment Information
    op(ADDRESS, 0, 1, "ADDRESS"),
    op(BALANCE, 1, 1, "BALANCE"),
    op(ORIGIN, 0, 1, "ORIGIN"),
    op(CALLER, 0, 1, "CALLER"),
    op(CALLVALUE, 0, 1, "CALLVALUE"),
    op(CALLDATALOAD, 1, 1, "CALLDATALOAD"),
    op(CALLDATASIZE, 0, 1, "CALLDATASIZE"),
    op(CALLDATACOPY, 3, 0, "CALLDATACOPY"),
    op(CODESIZE, 0, 1, "CODESIZE"),
    op(CODECOPY, 3, 0, "CODECOPY"),
    op(GASPRICE, 0, 1, "GASPRICE"),
    op(EXTCODESIZE, 1, 1, "EXTCODESIZE"),
    op(EXTCODECOPY, 4, 0, "EXTCODECOPY"),
    op(RETURNDATASIZE, 0, 1, "RETURNDATASIZE"),
    op(RETURNDATACOPY, 3, 0, "RETURNDATACOPY"),
    op(EXTCODEHASH, 1, 1, "EXTCODEHASH"),
    // 40s: Block Information
    op(BLOCKHASH, 1, 1, "BLOCKHASH"),
    op(COINBASE, 0, 1, "COINBASE"),
    op(TIMESTAMP, 0, 1, "TIMESTAMP"),
    op(NUMBER, 0, 1, "NUMBER"),
    op(DIFFICULTY, 0, 1, "DIFFICULTY"),
    op(GASLIMIT, 0, 1, "GASLIMIT"),
    op(CHAINID, 0, 1, "CHAINID"),
    op(SELFBALANCE, 0, 1, "SELFBALANCE"),
    // 50s: Stack, Memory Storage and Flow Operations
    op(POP, 1, 0, "POP"),
    op(MLOAD, 1, 1, "MLOAD"),
    op(MSTORE, 2, 0, "MSTORE"),
    op(MSTORE8, 2, 0, "MSTORE8"),
    op(SLOAD, 1, 1, "SLOAD"),
    op(SSTORE, 2, 0, "SSTORE"),
    op(JUMP, 1, 0, "JUMP"),
    op(JUMPI, 2, 0, "JUMPI"),
    op(PC, 0, 1, "PC"),
    op(MSIZE, 0, 1, "MSIZE"),
    op(GAS, 0, 1, "GAS"),
    op(JUMPDEST, 0, 0, "JUMPDEST"),
    // 60s & 70s: Push Operations
    op(push(1), 0, 1, "PUSH1"),
    op(push(2), 0, 1, "PUSH2"),
    op(push(3), 0, 1, "PUSH3"),
    op(push(4), 0, 1, "PUSH4"),
    op(push(5), 0, 1, "PUSH5"),
    op(push(6), 0, 1, "PUSH6"),
    op(push(7), 0, 1, "PUSH7"),
    op(push(8), 0, 1, "PUSH8"),
    op(push(9), 0, 1, "PUSH9"),
    op(push(10), 0, 1, "PUSH10"),
    op(push(11), 0, 1, "PUSH11"),
    op(push(12), 0, 1, "PUSH12"),
    op(push(13), 0, 1, "PUSH13"),
    op(push(14), 0, 1, "PUSH14"),
    op(push(15), 0, 1, "PUSH15"),
    op(push(16), 0, 1, "PUSH16"),
    op(push(17), 0, 1, "PUSH17"),
    op(push(18), 0, 1, "PUSH18"),
    op(push(19), 0, 1, "PUSH19"),
    op(push(20), 0, 1, "PUSH20"),
    op(push(21), 0, 1, "PUSH21"),
    op(push(22), 0, 1, "PUSH22"),
    op(push(23), 0, 1, "PUSH23"),
    op(push(24), 0, 1, "PUSH24"),
    op(push(25), 0, 1, "PUSH25"),
    op(push(26), 0, 1, "PUSH26"),
    op(push(27), 0, 1, "PUSH27"),
    op(push(28), 0, 1, "PUSH28"),
    op(push(29), 0, 1, "PUSH29"),
    op(push(30), 0, 1, "PUSH30"),
    op(push(31), 0, 1, "PUSH31"),
    op(push(32), 0, 1, "PUSH32"),
    // 80s: Duplication Operations
    op(dup(1), 0, 1, "DUP1"),
    op(dup(2), 0, 1, "DUP2"),
    op(dup(3), 0, 1, "DUP3"),
    op(dup(4), 0, 1, "DUP4"),
    op(dup(5), 0, 1, "DUP5"),
    op(dup(6), 0, 1, "DUP6"),
    op(dup(7), 0, 1, "DUP7"),
    op(dup(8), 0, 1, "DUP8"),
    op(dup(9), 0, 1, "DUP9"),
    op(dup(10), 0, 1, "DUP10"),
    op(dup(11), 0, 1, "DUP11"),
    op(dup(12), 0, 1, "DUP12"),
    op(dup(13), 0, 1, "DUP13"),
    op(dup(14), 0, 1, "DUP14"),
    op(dup(15), 0, 1, "DUP15"),
    op(dup(16), 0, 1, "DUP16"),
    // 90s: Exchange Operations
    op(swap(1), 0, 0, "SWAP1"),
    op(swap(2), 0, 0, "SWAP2"),
    op(swap(3), 0, 0, "SWAP3"),
    op(swap(4), 0, 0, "SWAP4"),
    op(swap(5), 0, 0, "SWAP5"),
    op(swap(6), 0, 0, "SWAP6"),
    op(swap(7), 0, 0, "SWAP7"),
    op(swap(8), 0, 0, "SWAP8"),
    op(swap(9), 0, 0, "SWAP9"),
    op(swap(10), 0, 0, "SWAP10"),
    op(swap(11), 0, 0, "SWAP11"),
    op(swap(12), 0, 0, "SWAP12"),
    op(swap(13), 0, 0, "SWAP13"),
    op(swap(14), 0, 0, "SWAP14"),
    op(swap(15), 0, 0, "SWAP15"),
    op(swap(16), 0, 0, "SWAP16"),
    // a0s: Logging Operations
    op(LOG0, 2, 0, "LOG0"),
    op(0xa1, 3, 0, "LOG1"),
    op(0xa2, 4, 0, "LOG2"),
    op(0xa3, 5, 0, "LOG3"),
    op(LOG4, 6, 0, "LOG4"),
    // f0s: System Operations
    op(CREATE, 3, 1, "CREATE"),
    op(CALL, 7, 1, "CALL"),
    op(CALLCODE, 7, 1, "CALLCODE"),
    op(RETURN, 2, 0, "RETURN"),
    op(DELEGATECALL, 6, 1, "DELEGATECALL"),
    op(CREATE2, 4, 1, "CREATE2"),
    op(STATICCALL, 6, 1, "STATICCALL"),
    op(REVERT, 2, 0, "REVERT"),
    op(INVALID, 0, 0, "INVALID"),
    op(SELFDESTRUCT, 1, 0, "SELFDESTRUCT"),
];

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_bytes_unique() {
        for (i, a) in OPCODES.iter().enumerate() {
            for b in &OPCODES[i + 1..] {
                assert_ne!(a.byte, b.byte, "{} / {}", a.mnemonic, b.mnemonic);
            }
        }
    }

    #[test]
    fn test_push_range() {
        assert_eq!(push(1), PUSH1);
        assert_eq!(push(32), PUSH32);
        let p2 = from_byte(PUSH2).unwrap();
        assert!(p2.is_push());
        assert_eq!(p2.push_bytes(), Some(2));
    }

    #[test]
    fn test_dup_swap_indices() {
        assert_eq!(from_byte(DUP3).unwrap().dup_index(), Some(3));
        assert_eq!(from_byte(SWAP1).unwrap().swap_index(), Some(1));
        assert_eq!(from_byte(SWAP1).unwrap().stack_delta(), (0, 0));
        assert_eq!(from_byte(DUP1).unwrap().stack_delta(), (0, 1));
    }

    #[test]
    fn test_helper_names() {
        assert_eq!(from_byte(RETURN).unwrap().helper_name(), "ret");
        assert_eq!(from_helper_name("ret").unwrap().byte, RETURN);
        assert_eq!(from_helper_name("mstore").unwrap().byte, MSTORE);
        assert_eq!(from_mnemonic("JUMPDEST").unwrap().byte, 0x5b);
    }
}
