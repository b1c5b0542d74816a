/*!
misc.rs - nop / mov handlers

nop : no state change.
mov : `dst = src`, src an 8-bit immediate or a software register.
*/

use crate::cpu::decode::decode_alu;
use crate::cpu::execute::resolve;
use crate::cpu::fault::Fault;
use crate::cpu::regs::CpuRegs;
use crate::memory::Memory;

pub(crate) fn nop<C: CpuRegs + ?Sized>(_cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    Ok(())
}

pub(crate) fn mov<C: CpuRegs + ?Sized>(cpu: &mut C, _mem: &mut Memory) -> Result<(), Fault> {
    let (src, dst) = decode_alu(cpu.ir())?;
    let v = resolve(cpu, src);
    cpu.set_reg(dst, v);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cpu::fault::{Fault, InvalidOperand};
    use crate::cpu::regs::Register;
    use crate::test_utils::{run_source, run_words_to_fault};

    #[test]
    fn nop_changes_nothing_but_pc() {
        let m = run_source("nop\nnop\n");
        assert_eq!(m.pc(), 3);
        assert_eq!(m.reg(Register::Ax), 0);
        assert_eq!(m.reg(Register::Sp), 4096);
    }

    #[test]
    fn mov_immediate_and_register() {
        let m = run_source("mov 255 bx\nmov bx ma\n");
        assert_eq!(m.reg(Register::Bx), 255);
        assert_eq!(m.reg(Register::Ma), 255);
    }

    #[test]
    fn mov_from_reserved_register_faults() {
        // mov <reg 6> ax
        let (m, err) = run_words_to_fault(&[0x7800 | (6 << 3)]);
        assert_eq!(
            err.fault,
            Fault::InvalidOperand(InvalidOperand::ReservedRegister { index: 6 })
        );
        assert_eq!(m.reg(Register::Ax), 0);
    }
}
