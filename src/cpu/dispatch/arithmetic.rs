/*!
arithmetic.rs - add / sub / mult / div handlers

Overview
========
ALU class instructions: `op src dst` with `src` an 8-bit unsigned immediate
or a software register, and `dst` a software register. All arithmetic is
16-bit two's complement and wraps silently.

  add  : dst += src
  sub  : dst -= src
  mult : dst *= src
  div  : dst = dst / src, cx = dst % src   (truncating toward zero)

`div` writes the quotient first and the remainder into `cx` second, so with
`dst == cx` only the remainder survives. A zero divisor raises
`InvalidOperand::DivideByZero` and leaves every register untouched.
*/

use crate::cpu::decode::decode_alu;
use crate::cpu::execute::{div_rem, resolve};
use crate::cpu::fault::Fault;
use crate::cpu::regs::{CpuRegs, Register};
use crate::memory::Memory;

/// Decode ALU operands from IR and apply `op(dst, src)` into `dst`.
#[inline]
fn alu<C: CpuRegs + ?Sized>(cpu: &mut C, op: fn(i16, i16) -> i16) -> Result<(), Fault> {
    let (src, dst) = decode_alu(cpu.ir())?;
    let v = resolve(cpu, src);
    let result = op(cpu.reg(dst), v);
    cpu.set_reg(dst, result);
    Ok(())
}

pub(crate) fn add<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    alu(cpu, i16::wrapping_add)
}

pub(crate) fn sub<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    alu(cpu, i16::wrapping_sub)
}

pub(crate) fn mult<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    alu(cpu, i16::wrapping_mul)
}

pub(crate) fn div<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    let (src, dst) = decode_alu(cpu.ir())?;
    let divisor = resolve(cpu, src);
    let (quotient, remainder) = div_rem(cpu.reg(dst), divisor)?;
    cpu.set_reg(dst, quotient);
    cpu.set_reg(Register::Cx, remainder);
    Ok(())
}
