/*!
execute.rs - Instruction semantic helpers shared by the dispatch families.

Purpose
=======
Centralize side-effect logic (operand resolution, stack discipline, memory
addressing through `ma`, wrapping ALU arithmetic) so both dispatch strategies
(exhaustive match, `table_dispatch` function table) share one implementation.

Stack Window
============
The stack occupies `[STACK_BASE, STACK_LIMIT)` and grows upward; `sp` is the
address of the next free slot and is compared as a signed 16-bit value.

```text
    push / call : STACK_BASE <= sp <  STACK_LIMIT   else Overflow (sp too high)
                                                    or Underflow (sp below base)
    pop  / ret  : STACK_BASE <  sp <= STACK_LIMIT   else Underflow (empty)
                                                    or Overflow (sp past limit)
```

Checks run before any state is touched, so a faulting stack operation leaves
registers and memory unchanged.
*/

use crate::cpu::decode::Operand;
use crate::cpu::fault::{Fault, InvalidOperand};
use crate::cpu::regs::{CpuRegs, Register};
use crate::memory::{Memory, STACK_BASE, STACK_LIMIT};

const BASE: i16 = STACK_BASE as i16;
const LIMIT: i16 = STACK_LIMIT as i16;

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Load the word at PC into IR and return it. PC is not advanced; the cycle
/// increments it after the instruction executes.
#[inline]
pub(crate) fn fetch<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &Memory) -> Result<u16, Fault> {
    let pc = cpu.pc();
    let word = mem.get(pc).ok_or(Fault::SegmentationFault { addr: pc })? as u16;
    cpu.set_ir(word);
    Ok(word)
}

// ---------------------------------------------------------------------------
// Operands
// ---------------------------------------------------------------------------

/// Value of a decoded source operand. Immediates are unsigned and always fit.
#[inline]
pub(crate) fn resolve<C: CpuRegs + ?Sized>(cpu: &C, src: Operand) -> i16 {
    match src {
        Operand::Reg(r) => cpu.reg(r),
        Operand::Imm(v) => v as i16,
    }
}

// ---------------------------------------------------------------------------
// ALU (16-bit two's complement, wrapping)
// ---------------------------------------------------------------------------

/// Truncating quotient and remainder. `i16::MIN / -1` wraps.
#[inline]
pub(crate) fn div_rem(dividend: i16, divisor: i16) -> Result<(i16, i16), Fault> {
    if divisor == 0 {
        return Err(InvalidOperand::DivideByZero.into());
    }
    Ok((
        dividend.wrapping_div(divisor),
        dividend.wrapping_rem(divisor),
    ))
}

// ---------------------------------------------------------------------------
// Stack helpers
// ---------------------------------------------------------------------------

#[inline]
fn check_push_window(sp: i16) -> Result<u16, Fault> {
    if sp >= LIMIT {
        Err(Fault::StackOverflow { sp })
    } else if sp < BASE {
        Err(Fault::StackUnderflow { sp })
    } else {
        Ok(sp as u16)
    }
}

#[inline]
fn check_pop_window(sp: i16) -> Result<u16, Fault> {
    if sp <= BASE {
        Err(Fault::StackUnderflow { sp })
    } else if sp > LIMIT {
        Err(Fault::StackOverflow { sp })
    } else {
        Ok(sp as u16 - 1)
    }
}

/// Write `v` at `sp` and increment `sp`.
#[inline]
pub(crate) fn push_word<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory, v: i16) -> Result<(), Fault> {
    let slot = check_push_window(cpu.sp())?;
    mem.write(slot, v);
    cpu.set_sp(slot as i16 + 1);
    Ok(())
}

/// Decrement `sp` and return the word it now points at.
#[inline]
pub(crate) fn pop_word<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &Memory) -> Result<i16, Fault> {
    let slot = check_pop_window(cpu.sp())?;
    let v = mem.read(slot);
    cpu.set_sp(slot as i16);
    Ok(v)
}

/// Word just below `sp` whenever `sp` is above the stack base, including an
/// `sp` moved past the limit by ALU instructions. A pop from there would fault;
/// the status line still shows the word.
#[inline]
pub(crate) fn peek_top<C: CpuRegs + ?Sized>(cpu: &C, mem: &Memory) -> Option<i16> {
    let sp = cpu.sp();
    if sp > BASE {
        mem.get(sp as u16 - 1)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Memory addressing
// ---------------------------------------------------------------------------

/// Address held in `ma`, taken as unsigned.
#[inline]
pub(crate) fn effective_address<C: CpuRegs + ?Sized>(cpu: &C) -> Result<u16, Fault> {
    let addr = cpu.reg(Register::Ma) as u16;
    if Memory::contains(addr) {
        Ok(addr)
    } else {
        Err(Fault::SegmentationFault { addr })
    }
}
