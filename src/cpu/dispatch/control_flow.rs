/*!
control_flow.rs - call / ret handlers

  call target : push pc (the call's own address); pc = target - 1
  ret         : pc = pop()

`ret` restores the call's own address without compensation; the cycle's
post-increment then resumes at the instruction right after the `call`.

Faults
======
- call: StackOverflow when the stack is full.
- ret : StackUnderflow when the stack is empty.
*/

use crate::cpu::decode::decode_target;
use crate::cpu::execute::{pop_word, push_word};
use crate::cpu::fault::Fault;
use crate::cpu::regs::CpuRegs;
use crate::memory::Memory;

pub(crate) fn call<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    let target = decode_target(cpu.ir());
    let return_addr = cpu.pc() as i16;
    push_word(cpu, mem, return_addr)?;
    cpu.branch_to(target);
    Ok(())
}

pub(crate) fn ret<C: CpuRegs + ?Sized>(cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    let return_addr = pop_word(cpu, mem)?;
    cpu.set_pc(return_addr as u16);
    Ok(())
}
