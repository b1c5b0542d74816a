/*!
table.rs - Feature-gated table-driven dispatcher using a function-pointer table.

Purpose
=======
Maps each of the 16 opcodes to its handler through a fixed array indexed by
the opcode value, as an alternative to the exhaustive match in
`dispatch::execute`. Both paths call the same family handlers, so semantics
are identical; only the dispatch mechanism differs.

Design
------
- Table: `[OpHandler<C>; 16]`, one per register-file type, built as an
  associated const so it is materialized at compile time.
- `OpHandler<C> = fn(&mut C, &mut Memory) -> Result<(), Fault>`.
- Entrypoint: `dispatch(opcode, cpu, mem)`. `Opcode` is a closed enum with
  exactly 16 values, so indexing can never miss.
*/

use std::marker::PhantomData;

use crate::cpu::decode::Opcode;
use crate::cpu::dispatch::{arithmetic, branches, control_flow, load_store, misc};
use crate::cpu::fault::Fault;
use crate::cpu::regs::CpuRegs;
use crate::memory::Memory;

pub(crate) type OpHandler<C> = fn(&mut C, &mut Memory) -> Result<(), Fault>;

#[allow(dead_code)]
struct ExecTable<C: ?Sized>(PhantomData<C>);

impl<C: CpuRegs> ExecTable<C> {
    // Order must match the opcode numbering.
    const HANDLERS: [OpHandler<C>; 16] = [
        misc::nop::<C>,
        arithmetic::add::<C>,
        arithmetic::sub::<C>,
        arithmetic::mult::<C>,
        arithmetic::div::<C>,
        load_store::push::<C>,
        load_store::pop::<C>,
        misc::mov::<C>,
        load_store::load::<C>,
        load_store::store::<C>,
        branches::jmp::<C>,
        branches::jnz::<C>,
        branches::jz::<C>,
        branches::jn::<C>,
        control_flow::call::<C>,
        control_flow::ret::<C>,
    ];
}

/// Execute `opcode` through the function table.
#[inline]
pub(crate) fn dispatch<C: CpuRegs>(opcode: Opcode, cpu: &mut C, mem: &mut Memory) -> Result<(), Fault> {
    ExecTable::<C>::HANDLERS[opcode as usize](cpu, mem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::dispatch::execute;
    use crate::cpu::regs::Register;
    use crate::cpu::state::CpuState;

    /// Every table slot behaves like the match arm for the same opcode.
    #[test]
    fn table_matches_exhaustive_match() {
        // low 12 bits: imm/reg mixes, a reserved register, a branch target
        let operands: [u16; 6] = [0x018, 0x808, 0x04D, 0x837, 0x009, 0x028];
        for op in Opcode::ALL {
            for operand in operands {
                let mut a = CpuState::new();
                a.set_ir(op.bits() | operand);
                a.set_reg(Register::Bx, 5);
                a.set_reg(Register::Cx, -2);
                let mut b = a;
                let mut mem_a = Memory::new();
                let mut mem_b = Memory::new();

                let ra = dispatch(op, &mut a, &mut mem_a);
                let rb = execute(op, &mut b, &mut mem_b);
                assert_eq!(ra, rb, "opcode {op}");
                assert_eq!(a, b, "opcode {op}");
                assert_eq!(mem_a.as_slice(), mem_b.as_slice(), "opcode {op}");
            }
        }
    }
}
