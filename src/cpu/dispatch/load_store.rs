/*!
load_store.rs - push / pop / load / store handlers

Overview
========
  push src  : memory[sp] = src; sp += 1          (src: reg or 11-bit immediate)
  pop  dst  : sp -= 1; dst = memory[sp]
  load dst  : dst = memory[ma]                   (ma taken as unsigned)
  store src : memory[ma] = src                   (src: reg or 11-bit immediate)

Faults
======
- push: StackOverflow when `sp >= STACK_LIMIT` (window rules in `execute`).
- pop : StackPointerCorruption when `dst` is `sp`, checked before the stack
        is examined; StackUnderflow when the stack is empty.
- load / store: SegmentationFault when `ma` addresses unbacked memory.
*/

use crate::cpu::decode::{decode_dst, decode_source11};
use crate::cpu::execute::{effective_address, pop_word, push_word, resolve};
use crate::cpu::fault::Fault;
use crate::cpu::regs::{CpuRegs, Register};
use crate::memory::Memory;

pub(crate) fn push<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    let src = decode_source11(cpu.ir())?;
    let v = resolve(cpu, src);
    push_word(cpu, mem, v)
}

pub(crate) fn pop<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    let dst = decode_dst(cpu.ir())?;
    if dst == Register::Sp {
        return Err(Fault::StackPointerCorruption);
    }
    let v = pop_word(cpu, mem)?;
    cpu.set_reg(dst, v);
    Ok(())
}

pub(crate) fn load<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    let dst = decode_dst(cpu.ir())?;
    let addr = effective_address(cpu)?;
    cpu.set_reg(dst, mem.read(addr));
    Ok(())
}

pub(crate) fn store<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    let src = decode_source11(cpu.ir())?;
    let v = resolve(cpu, src);
    let addr = effective_address(cpu)?;
    mem.write(addr, v);
    Ok(())
}
