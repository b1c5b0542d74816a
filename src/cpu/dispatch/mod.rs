/*!
dispatch - Orchestrator for a single fetch-decode-execute step.

Overview
========
Coordinates one instruction:
1. Fetch `memory[pc]` into IR (`execute::fetch`).
2. Decode the opcode from IR's top nibble.
3. Dispatch to the family handler, either through the exhaustive match
   below or, with feature `table_dispatch`, through the function-pointer
   table in `cpu::table`.
4. On success, unconditionally advance PC by one.

Families
========
- misc         : nop, mov
- arithmetic   : add, sub, mult, div
- load_store   : push, pop, load, store
- branches     : jmp, jnz, jz, jn
- control_flow : call, ret

Handler Contract
================
Every handler has the shape
    fn(&mut C, &mut Memory) -> Result<(), Fault>   where C: CpuRegs + ?Sized
and reads its operands from IR with the decoder helper for its class.
Handlers never touch PC except for control transfer, and never advance it;
branch targets are written as `target - 1` (`CpuRegs::branch_to`) so the
post-increment here lands on the target.

A handler returning `Err` leaves PC on the faulting instruction: the
post-increment is skipped.
*/

use tracing::trace;

use crate::cpu::decode::{Opcode, opcode_of};
use crate::cpu::execute::fetch;
use crate::cpu::fault::Fault;
use crate::cpu::regs::CpuRegs;
use crate::memory::Memory;

pub(crate) mod arithmetic;
pub(crate) mod branches;
pub(crate) mod control_flow;
pub(crate) mod load_store;
pub(crate) mod misc;

/// Every instruction completes in a single machine cycle.
pub const CYCLES_PER_INSTRUCTION: u32 = 1;

/// Execute one instruction at PC and return the cycles consumed.
pub(crate) fn step<C: CpuRegs>(cpu: &mut C, mem: &mut Memory) -> Result<u32, Fault> {
    let pc = cpu.pc();
    let word = fetch(cpu, mem)?;
    let opcode = Opcode::try_from(opcode_of(word))?;
    trace!(pc, word, %opcode, "execute");

    #[cfg(feature = "table_dispatch")]
    crate::cpu::table::dispatch(opcode, cpu, mem)?;
    #[cfg(not(feature = "table_dispatch"))]
    execute(opcode, cpu, mem)?;

    cpu.advance_pc_one();
    Ok(CYCLES_PER_INSTRUCTION)
}

/// Exhaustive opcode match.
pub(crate) fn execute<C: CpuRegs + ?Sized>(
    opcode: Opcode,
    cpu: &mut C,
    mem: &mut Memory,
) -> Result<(), Fault> {
    match opcode {
        Opcode::Nop => misc::nop(cpu, mem),
        Opcode::Add => arithmetic::add(cpu, mem),
        Opcode::Sub => arithmetic::sub(cpu, mem),
        Opcode::Mult => arithmetic::mult(cpu, mem),
        Opcode::Div => arithmetic::div(cpu, mem),
        Opcode::Push => load_store::push(cpu, mem),
        Opcode::Pop => load_store::pop(cpu, mem),
        Opcode::Mov => misc::mov(cpu, mem),
        Opcode::Load => load_store::load(cpu, mem),
        Opcode::Store => load_store::store(cpu, mem),
        Opcode::Jmp => branches::jmp(cpu, mem),
        Opcode::Jnz => branches::jnz(cpu, mem),
        Opcode::Jz => branches::jz(cpu, mem),
        Opcode::Jn => branches::jn(cpu, mem),
        Opcode::Call => control_flow::call(cpu, mem),
        Opcode::Ret => control_flow::ret(cpu, mem),
    }
}
