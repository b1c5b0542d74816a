/*!
branches.rs - jmp / jnz / jz / jn handlers

All four take a 12-bit absolute target in the code segment. The condition
source for the conditional forms is always `cx`:

  jmp : always
  jnz : cx != 0
  jz  : cx == 0
  jn  : cx <  0

A taken branch leaves PC at `target - 1`; the cycle's post-increment then
lands exactly on `target`. A branch not taken changes nothing.
*/

use crate::cpu::decode::decode_target;
use crate::cpu::fault::Fault;
use crate::cpu::regs::CpuRegs;
use crate::memory::Memory;

#[inline]
fn branch_if<C: CpuRegs + ?Sized>(cpu: &mut C, taken: bool) -> Result<(), Fault> {
    let target = decode_target(cpu.ir());
    if taken {
        cpu.branch_to(target);
    }
    Ok(())
}

pub(crate) fn jmp<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    branch_if(cpu, true)
}

pub(crate) fn jnz<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    let taken = cpu.cx() != 0;
    branch_if(cpu, taken)
}

pub(crate) fn jz<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    let taken = cpu.cx() == 0;
    branch_if(cpu, taken)
}

pub(crate) fn jn<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    let taken = cpu.cx() < 0;
    branch_if(cpu, taken)
}

#[cfg(test)]
mod tests {
    use crate::cpu::regs::Register;
    use crate::test_utils::{machine_from_source, run_source};

    #[test]
    fn jz_taken_lands_on_target() {
        // nops at 1..=3, mov at 4, jz at 5
        let mut m = machine_from_source("nop\nnop\nnop\nmov 0 cx\njz 10\n");
        m.run(1, 5).unwrap();
        assert_eq!(m.pc(), 5);
        m.step().unwrap();
        assert_eq!(m.pc(), 10);
    }

    #[test]
    fn jnz_not_taken_falls_through() {
        let mut m = machine_from_source("mov 0 cx\njnz 100\n");
        m.run(1, 3).unwrap();
        assert_eq!(m.pc(), 3);
    }

    #[test]
    fn jn_only_on_negative() {
        let mut m = machine_from_source("mov 0 cx\nsub 1 cx\njn 50\n");
        m.run(1, 3).unwrap();
        m.step().unwrap();
        assert_eq!(m.pc(), 50);

        let mut m = machine_from_source("mov 0 cx\njn 50\n");
        m.run(1, 2).unwrap();
        m.step().unwrap();
        assert_eq!(m.pc(), 3);
    }

    #[test]
    fn countdown_loop() {
        // 1: mov 5 cx
        // 2: add 2 ax
        // 3: sub 1 cx
        // 4: jnz 2
        let m = run_source("mov 5 cx\nadd 2 ax\nsub 1 cx\njnz 2\n");
        assert_eq!(m.reg(Register::Ax), 10);
        assert_eq!(m.reg(Register::Cx), 0);
    }
}
