/*!
state.rs - Canonical register file of the machine plus execution control state.

Overview
========
`CpuState` is the single owner of every register:
  - six software registers (`ax bx cx sp bp ma`), signed 16-bit,
  - the internal program counter and instruction register,
  - the informational `idle` flag,
  - the two-state run state (`Running` / `Halted`).

It intentionally excludes memory, decoding and dispatch; those live in
`memory`, `decode` and `dispatch`. `Machine` (in `core`) pairs a `CpuState`
with a `Memory`.

Power-up Defaults
=================
```text
    sp   = 4096 (STACK_BASE, empty stack)
    pc   = 1    (programs are loaded and started at address 1)
    idle = true
    everything else zero, run state Running.
```

All register arithmetic wraps with 16-bit two's-complement semantics; the
setters here never mask or trap.
*/

use crate::cpu::regs::{CpuRegs, Register};
use crate::memory::STACK_BASE;

/// Address at which programs are loaded and started by default.
pub const PROGRAM_START: u16 = 1;

/// The fetch-execute cycle's two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecState {
    #[default]
    Running,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub regs: [i16; 6],
    pub pc: u16,
    pub ir: u16,
    /// Informational only; no instruction clears it.
    pub idle: bool,
    pub exec: ExecState,
}

impl Default for CpuState {
    fn default() -> Self {
        let mut regs = [0; 6];
        regs[Register::Sp as usize] = STACK_BASE as i16;
        Self {
            regs,
            pc: PROGRAM_START,
            ir: 0,
            idle: true,
            exec: ExecState::Running,
        }
    }
}

impl CpuState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore power-up defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.exec == ExecState::Halted
    }

    #[inline]
    pub fn halt(&mut self) {
        self.exec = ExecState::Halted;
    }

    #[inline]
    pub fn resume(&mut self) {
        self.exec = ExecState::Running;
    }
}

impl CpuRegs for CpuState {
    #[inline]
    fn reg(&self, r: Register) -> i16 {
        self.regs[r as usize]
    }
    #[inline]
    fn set_reg(&mut self, r: Register, v: i16) {
        self.regs[r as usize] = v;
    }
    #[inline]
    fn pc(&self) -> u16 {
        self.pc
    }
    #[inline]
    fn set_pc(&mut self, v: u16) {
        self.pc = v;
    }
    #[inline]
    fn ir(&self) -> u16 {
        self.ir
    }
    #[inline]
    fn set_ir(&mut self, v: u16) {
        self.ir = v;
    }
}
