/*!
regs.rs - Register index table and the `CpuRegs` trait used by the
decoder, executor and dispatch code.

Register File
=============
Eight 16-bit slots. Six are software visible and may be named by an
instruction operand field:

```text
    index  0   1   2   3   4   5
    name   ax  bx  cx  sp  bp  ma
```

Indices 6 (pc) and 7 (ir) are internal. They are only touched by the
fetch-execute cycle and any operand field naming them is rejected with
`InvalidOperand::ReservedRegister`. The `Register` enum therefore has six
variants; pc and ir are reached through dedicated trait methods.

The trait does NOT include memory access. Stack and load/store helpers take
`&mut Memory` explicitly at call sites, so handlers stay generic over the
register file without over-borrowing the whole machine.
*/

use std::fmt;

use crate::cpu::fault::InvalidOperand;

/// Operand-field index of the (internal) program counter.
pub const PC_INDEX: u8 = 6;
/// Operand-field index of the (internal) instruction register.
pub const IR_INDEX: u8 = 7;

/// A software-addressable register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    Ax = 0,
    Bx = 1,
    Cx = 2,
    Sp = 3,
    Bp = 4,
    Ma = 5,
}

impl Register {
    /// All software registers in index order.
    pub const ALL: [Register; 6] = [
        Register::Ax,
        Register::Bx,
        Register::Cx,
        Register::Sp,
        Register::Bp,
        Register::Ma,
    ];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::Ax => "ax",
            Register::Bx => "bx",
            Register::Cx => "cx",
            Register::Sp => "sp",
            Register::Bp => "bp",
            Register::Ma => "ma",
        }
    }

    /// Look up a register by its assembler name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<u8> for Register {
    type Error = InvalidOperand;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(InvalidOperand::ReservedRegister { index })
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Minimal register-file API needed by instruction semantics and dispatch.
///
/// Static dispatch via generics (`fn op<C: CpuRegs>(cpu: &mut C)`), except in
/// the function-pointer table which instantiates handlers for `CpuState`.
pub trait CpuRegs {
    // ---------------------------------------------------------------------
    // Software registers
    // ---------------------------------------------------------------------
    fn reg(&self, r: Register) -> i16;
    fn set_reg(&mut self, r: Register, v: i16);

    // ---------------------------------------------------------------------
    // Internal registers (fetch-execute cycle only)
    // ---------------------------------------------------------------------
    fn pc(&self) -> u16;
    fn set_pc(&mut self, v: u16);
    fn ir(&self) -> u16;
    fn set_ir(&mut self, v: u16);

    // ---------------------------------------------------------------------
    // Composites
    // ---------------------------------------------------------------------

    #[inline]
    fn sp(&self) -> i16 {
        self.reg(Register::Sp)
    }

    #[inline]
    fn set_sp(&mut self, v: i16) {
        self.set_reg(Register::Sp, v);
    }

    /// Counter register, the condition source of every conditional branch.
    #[inline]
    fn cx(&self) -> i16 {
        self.reg(Register::Cx)
    }

    /// Advance PC by `delta` (wrapping at 16 bits).
    #[inline]
    fn advance_pc(&mut self, delta: u16) {
        let pc = self.pc();
        self.set_pc(pc.wrapping_add(delta));
    }

    #[inline]
    fn advance_pc_one(&mut self) {
        self.advance_pc(1);
    }

    /// Point PC one before `target` so the cycle's post-increment lands on it.
    #[inline]
    fn branch_to(&mut self, target: u16) {
        self.set_pc(target.wrapping_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for r in Register::ALL {
            assert_eq!(Register::try_from(r.index()), Ok(r));
        }
    }

    #[test]
    fn reserved_indices_rejected() {
        assert_eq!(
            Register::try_from(PC_INDEX),
            Err(InvalidOperand::ReservedRegister { index: 6 })
        );
        assert_eq!(
            Register::try_from(IR_INDEX),
            Err(InvalidOperand::ReservedRegister { index: 7 })
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Register::from_name("MA"), Some(Register::Ma));
        assert_eq!(Register::from_name("cx"), Some(Register::Cx));
        assert_eq!(Register::from_name("pc"), None);
        assert_eq!(Register::Bp.to_string(), "bp");
    }
}
