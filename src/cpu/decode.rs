/*!
decode.rs - Instruction word layout, bit-field extraction and per-class decoding.

Word Layout
===========
Bits are numbered 0 (LSB) to 15 (MSB). The top nibble is always the opcode;
the remaining 12 bits are interpreted per instruction class only.

```text
    15  12 11 10        3 2   0
    +-----+--+-----------+-----+
    | op  |m |   imm8    | dst |   ALU / mov      (m=1: bits 3-5 = src register)
    | op  |m |      imm11       |   push / store   (m=1: bits 3-5 = src register)
    | op  |          ...   | dst |   pop / load
    | op  |      target12        |   jmp jnz jz jn call
    | op  |          unused      |   nop ret
    +-----+--+-----------+-----+
```

Extraction
==========
Each helper below documents its exact mask and shift and is only called by
the classes it applies to. No generic "field N" accessor exists.

Reserved Registers
==================
Any register field decoding to 6 (pc) or 7 (ir) is rejected with
`InvalidOperand::ReservedRegister`; software can never name the internal
registers through an operand.
*/

use std::fmt;

use crate::cpu::fault::Fault;
use crate::cpu::regs::Register;

/// Mode flag value selecting a register source operand (bit 11).
pub const MODE_REGISTER: u16 = 0x0800;

pub const OPCODE_MASK: u16 = 0xF000;
pub const IMM8_MASK: u16 = 0x07F8;
pub const IMM11_MASK: u16 = 0x07FF;
pub const SRC_REG_MASK: u16 = 0x0038;
pub const DST_MASK: u16 = 0x0007;
pub const TARGET_MASK: u16 = 0x0FFF;

/// Largest ALU / mov immediate.
pub const IMM8_MAX: u16 = 0xFF;
/// Largest push / store immediate.
pub const IMM11_MAX: u16 = 0x07FF;
/// Largest branch / call target.
pub const TARGET_MAX: u16 = 0x0FFF;

// ---------------------------------------------------------------------------
// Bit-field extraction
// ---------------------------------------------------------------------------

/// Opcode: `(word & 0xF000) >> 12`, 0..=15.
#[inline]
pub fn opcode_of(word: u16) -> u8 {
    ((word & OPCODE_MASK) >> 12) as u8
}

/// Operand mode flag: `word & 0x0800`. True selects a register source.
#[inline]
pub fn mode_flag_of(word: u16) -> bool {
    word & MODE_REGISTER != 0
}

/// ALU / mov immediate: `(word & 0x07F8) >> 3`, 0..=255.
#[inline]
pub fn immediate8_of(word: u16) -> u16 {
    (word & IMM8_MASK) >> 3
}

/// push / store immediate: `word & 0x07FF`, 0..=2047.
#[inline]
pub fn immediate11_of(word: u16) -> u16 {
    word & IMM11_MASK
}

/// Source register field: `(word & 0x0038) >> 3`, 0..=7 (6 and 7 reserved).
#[inline]
pub fn register_of(word: u16) -> u8 {
    ((word & SRC_REG_MASK) >> 3) as u8
}

/// Destination register field: `word & 0x0007`, 0..=7 (6 and 7 reserved).
#[inline]
pub fn dst_of(word: u16) -> u8 {
    (word & DST_MASK) as u8
}

/// Branch / call target: `word & 0x0FFF`, 0..=4095.
#[inline]
pub fn target12_of(word: u16) -> u16 {
    word & TARGET_MASK
}

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    Add = 1,
    Sub = 2,
    Mult = 3,
    Div = 4,
    Push = 5,
    Pop = 6,
    Mov = 7,
    Load = 8,
    Store = 9,
    Jmp = 10,
    Jnz = 11,
    Jz = 12,
    Jn = 13,
    Call = 14,
    Ret = 15,
}

/// Operand layout family of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// nop, ret
    Bare,
    /// add, sub, mult, div, mov
    Alu,
    /// push, store
    Source,
    /// pop, load
    Dest,
    /// jmp, jnz, jz, jn, call
    Branch,
}

impl Opcode {
    pub const ALL: [Opcode; 16] = [
        Opcode::Nop,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mult,
        Opcode::Div,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Mov,
        Opcode::Load,
        Opcode::Store,
        Opcode::Jmp,
        Opcode::Jnz,
        Opcode::Jz,
        Opcode::Jn,
        Opcode::Call,
        Opcode::Ret,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mult => "mult",
            Opcode::Div => "div",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Mov => "mov",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Jmp => "jmp",
            Opcode::Jnz => "jnz",
            Opcode::Jz => "jz",
            Opcode::Jn => "jn",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
        }
    }

    /// Look up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    pub fn class(self) -> OpClass {
        match self {
            Opcode::Nop | Opcode::Ret => OpClass::Bare,
            Opcode::Add | Opcode::Sub | Opcode::Mult | Opcode::Div | Opcode::Mov => OpClass::Alu,
            Opcode::Push | Opcode::Store => OpClass::Source,
            Opcode::Pop | Opcode::Load => OpClass::Dest,
            Opcode::Jmp | Opcode::Jnz | Opcode::Jz | Opcode::Jn | Opcode::Call => OpClass::Branch,
        }
    }

    /// Opcode bits positioned in an instruction word.
    #[inline]
    pub fn bits(self) -> u16 {
        (self as u16) << 12
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Fault;

    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(opcode as usize)
            .copied()
            .ok_or(Fault::IllegalOpcode { opcode })
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// ---------------------------------------------------------------------------
// Per-class operand decoding
// ---------------------------------------------------------------------------

/// A resolved-at-decode source operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Register),
    Imm(u16),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{r}"),
            Operand::Imm(v) => write!(f, "{v}"),
        }
    }
}

/// Register source from bits 3-5.
#[inline]
fn source_register(word: u16) -> Result<Register, Fault> {
    Ok(Register::try_from(register_of(word))?)
}

/// ALU / mov: `(src, dst)` with an 8-bit immediate or a register source.
pub fn decode_alu(word: u16) -> Result<(Operand, Register), Fault> {
    let src = if mode_flag_of(word) {
        Operand::Reg(source_register(word)?)
    } else {
        Operand::Imm(immediate8_of(word))
    };
    Ok((src, decode_dst(word)?))
}

/// push / store: source with an 11-bit immediate or a register in bits 3-5.
pub fn decode_source11(word: u16) -> Result<Operand, Fault> {
    if mode_flag_of(word) {
        Ok(Operand::Reg(source_register(word)?))
    } else {
        Ok(Operand::Imm(immediate11_of(word)))
    }
}

/// pop / load (and the destination of ALU / mov): bits 0-2.
#[inline]
pub fn decode_dst(word: u16) -> Result<Register, Fault> {
    Ok(Register::try_from(dst_of(word))?)
}

/// jmp / jnz / jz / jn / call: 12-bit target address.
#[inline]
pub fn decode_target(word: u16) -> u16 {
    target12_of(word)
}

// ---------------------------------------------------------------------------
// Whole-instruction view (assembler / disassembler side)
// ---------------------------------------------------------------------------

/// A fully decoded instruction.
///
/// The executor decodes operands lazily per class straight from IR; this type
/// is the structured view used to encode assembled text and to render
/// disassembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Ret,
    Alu {
        opcode: Opcode,
        src: Operand,
        dst: Register,
    },
    Source {
        opcode: Opcode,
        src: Operand,
    },
    Dest {
        opcode: Opcode,
        dst: Register,
    },
    Branch {
        opcode: Opcode,
        target: u16,
    },
}

impl Instruction {
    pub fn decode(word: u16) -> Result<Self, Fault> {
        let opcode = Opcode::try_from(opcode_of(word))?;
        Ok(match opcode.class() {
            OpClass::Bare if opcode == Opcode::Nop => Instruction::Nop,
            OpClass::Bare => Instruction::Ret,
            OpClass::Alu => {
                let (src, dst) = decode_alu(word)?;
                Instruction::Alu { opcode, src, dst }
            }
            OpClass::Source => Instruction::Source {
                opcode,
                src: decode_source11(word)?,
            },
            OpClass::Dest => Instruction::Dest {
                opcode,
                dst: decode_dst(word)?,
            },
            OpClass::Branch => Instruction::Branch {
                opcode,
                target: decode_target(word),
            },
        })
    }

    pub fn opcode(&self) -> Opcode {
        match *self {
            Instruction::Nop => Opcode::Nop,
            Instruction::Ret => Opcode::Ret,
            Instruction::Alu { opcode, .. }
            | Instruction::Source { opcode, .. }
            | Instruction::Dest { opcode, .. }
            | Instruction::Branch { opcode, .. } => opcode,
        }
    }

    /// Encode into a word. Immediates and targets are masked to their field
    /// width; range checking is the assembler's job.
    pub fn encode(&self) -> u16 {
        let op = self.opcode().bits();
        match *self {
            Instruction::Nop | Instruction::Ret => op,
            Instruction::Alu { src, dst, .. } => {
                let src_bits = match src {
                    Operand::Reg(r) => MODE_REGISTER | (u16::from(r.index()) << 3),
                    Operand::Imm(v) => (v & IMM8_MAX) << 3,
                };
                op | src_bits | u16::from(dst.index())
            }
            Instruction::Source { src, .. } => match src {
                Operand::Reg(r) => op | MODE_REGISTER | (u16::from(r.index()) << 3),
                Operand::Imm(v) => op | (v & IMM11_MAX),
            },
            Instruction::Dest { dst, .. } => op | u16::from(dst.index()),
            Instruction::Branch { target, .. } => op | (target & TARGET_MAX),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode();
        match self {
            Instruction::Nop | Instruction::Ret => write!(f, "{op}"),
            Instruction::Alu { src, dst, .. } => write!(f, "{op} {src} {dst}"),
            Instruction::Source { src, .. } => write!(f, "{op} {src}"),
            Instruction::Dest { dst, .. } => write!(f, "{op} {dst}"),
            Instruction::Branch { target, .. } => write!(f, "{op} {target}"),
        }
    }
}

/// Render a word as assembler text, or `??? 0xNNNN` if it does not decode.
pub fn disassemble(word: u16) -> String {
    match Instruction::decode(word) {
        Ok(inst) => inst.to_string(),
        Err(_) => format!("??? {word:#06x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::fault::InvalidOperand;

    #[test]
    fn field_extraction_masks() {
        // mov 5 ax  => 0111 0 00000101 000
        let w = 0x7028;
        assert_eq!(opcode_of(w), 7);
        assert!(!mode_flag_of(w));
        assert_eq!(immediate8_of(w), 5);
        assert_eq!(dst_of(w), 0);

        assert_eq!(immediate8_of(0x07F8), 255);
        assert_eq!(immediate11_of(0x57FF), 2047);
        assert_eq!(register_of(0x0838), 7);
        assert_eq!(target12_of(0xAFFF), 4095);
        assert_eq!(opcode_of(0xF000), 15);
    }

    #[test]
    fn opcode_table_order() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i);
            assert_eq!(Opcode::try_from(i as u8), Ok(*op));
        }
        assert_eq!(Opcode::try_from(16), Err(Fault::IllegalOpcode { opcode: 16 }));
        assert_eq!(Opcode::from_mnemonic("MULT"), Some(Opcode::Mult));
        assert_eq!(Opcode::from_mnemonic("halt"), None);
    }

    #[test]
    fn alu_register_and_immediate_sources() {
        // add bx ax: reg mode, src=1, dst=0
        let w = Opcode::Add.bits() | MODE_REGISTER | (1 << 3);
        assert_eq!(decode_alu(w), Ok((Operand::Reg(Register::Bx), Register::Ax)));

        // sub 200 cx
        let w = Opcode::Sub.bits() | (200 << 3) | 2;
        assert_eq!(decode_alu(w), Ok((Operand::Imm(200), Register::Cx)));
    }

    #[test]
    fn alu_register_mode_ignores_upper_source_bits() {
        // bits 6-10 set, register field (3-5) = 2 (cx)
        let w = Opcode::Mov.bits() | MODE_REGISTER | 0x07C0 | (2 << 3) | 1;
        assert_eq!(decode_alu(w), Ok((Operand::Reg(Register::Cx), Register::Bx)));
    }

    #[test]
    fn reserved_registers_rejected_in_every_field() {
        for idx in [6u16, 7] {
            let reserved = Fault::InvalidOperand(InvalidOperand::ReservedRegister { index: idx as u8 });
            // ALU source
            let w = Opcode::Add.bits() | MODE_REGISTER | (idx << 3);
            assert_eq!(decode_alu(w), Err(reserved));
            // ALU destination
            let w = Opcode::Add.bits() | (3 << 3) | idx;
            assert_eq!(decode_alu(w), Err(reserved));
            // push / store source
            let w = Opcode::Push.bits() | MODE_REGISTER | (idx << 3);
            assert_eq!(decode_source11(w), Err(reserved));
            // pop / load destination
            let w = Opcode::Pop.bits() | idx;
            assert_eq!(decode_dst(w), Err(reserved));
        }
    }

    #[test]
    fn push_immediate_is_eleven_bits() {
        let w = Opcode::Push.bits() | 2000;
        assert_eq!(decode_source11(w), Ok(Operand::Imm(2000)));
    }

    #[test]
    fn display_matches_assembler_syntax() {
        let cases = [
            (Opcode::Mov.bits() | (5 << 3), "mov 5 ax"),
            (Opcode::Add.bits() | MODE_REGISTER | (1 << 3) | 2, "add bx cx"),
            (Opcode::Push.bits() | 2047, "push 2047"),
            (Opcode::Store.bits() | MODE_REGISTER | (5 << 3), "store ma"),
            (Opcode::Pop.bits() | 4, "pop bp"),
            (Opcode::Jz.bits() | 10, "jz 10"),
            (Opcode::Ret.bits(), "ret"),
            (0, "nop"),
        ];
        for (word, text) in cases {
            assert_eq!(disassemble(word), text);
            assert_eq!(Instruction::decode(word).map(|i| i.encode()), Ok(word));
        }
        assert_eq!(disassemble(Opcode::Pop.bits() | 7), "??? 0x6007");
    }
}
