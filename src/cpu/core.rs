/*!
core::Machine - The single owned aggregate: register file + memory.

Design
======
- `Machine` owns one `CpuState` and one `Memory`; there is no ambient or
  static state. Every operation takes `&mut self`.
- `step` runs one fetch-decode-execute cycle through `cpu::dispatch`.
- `run` / `run_with` drive the cycle from a start address until PC reaches a
  limit address (exclusive), a fault is raised, or the optional host-side
  step budget runs out.
- `load_instruction` is the loader primitive: it writes a word at PC and
  advances PC, exactly like the historical load loop, refusing to write past
  the code segment.

Run State
=========
`run_with` sets PC to the start address and the state to Running. On reaching
the limit, or on a fault, the machine becomes Halted. A faulting instruction
leaves PC on itself, and the fault is returned together with the status at
that moment (`RunError`).

An unconditional loop that never reaches the limit runs forever unless a
step budget is configured; that is valid program behavior.
*/

use tracing::{debug, warn};

use crate::cpu::dispatch;
use crate::cpu::fault::{Fault, RunError};
use crate::cpu::regs::{CpuRegs, Register};
use crate::cpu::state::{CpuState, PROGRAM_START};
use crate::loader::LoadError;
use crate::memory::{Memory, Segment};
use crate::trace::{NoTrace, Status, TraceSink};

/// Where and how long to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Initial PC.
    pub start: u16,
    /// The run stops when PC reaches this address (exclusive bound).
    pub limit: u16,
    /// Stop after this many instructions even if `limit` was not reached.
    pub max_steps: Option<u64>,
}

impl RunConfig {
    pub fn new(start: u16, limit: u16) -> Self {
        Self {
            start,
            limit,
            max_steps: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// Why a run ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    LimitReached,
    StepBudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub stop: StopReason,
    pub status: Status,
}

#[derive(Debug, Clone, Default)]
pub struct Machine {
    cpu: CpuState,
    memory: Memory,
    cycles: u64,
}

impl Machine {
    /// Power-up state: `sp = 4096`, `pc = 1`, all else zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore power-up state and clear memory.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.memory.reset();
        self.cycles = 0;
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn cpu(&self) -> &CpuState {
        &self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn reg(&self, r: Register) -> i16 {
        self.cpu.reg(r)
    }

    pub fn set_reg(&mut self, r: Register, v: i16) {
        self.cpu.set_reg(r, v);
    }

    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    pub fn ir(&self) -> u16 {
        self.cpu.ir()
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Total cycles executed since power-up or the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Registers, PC and top of stack as of now.
    pub fn status(&self) -> Status {
        Status::capture(&self.cpu, &self.memory)
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Write `word` at PC and advance PC. Only code-segment addresses accept
    /// program words.
    pub fn load_instruction(&mut self, word: u16) -> Result<(), LoadError> {
        let addr = self.cpu.pc();
        if Segment::of(addr) != Segment::Code {
            return Err(LoadError::CodeSegmentFull { addr });
        }
        self.memory.write(addr, word as i16);
        self.cpu.advance_pc_one();
        Ok(())
    }

    /// Load `words` from `PROGRAM_START` upward and return the end address
    /// (one past the last word), which is the natural run limit.
    pub fn load_program(&mut self, words: &[u16]) -> Result<u16, LoadError> {
        self.cpu.set_pc(PROGRAM_START);
        for &word in words {
            self.load_instruction(word)?;
        }
        let end = self.cpu.pc();
        debug!(start = PROGRAM_START, end, "program loaded");
        Ok(end)
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Execute one instruction at PC. A fault halts the machine.
    pub fn step(&mut self) -> Result<u32, Fault> {
        match dispatch::step(&mut self.cpu, &mut self.memory) {
            Ok(cycles) => {
                self.cycles += u64::from(cycles);
                Ok(cycles)
            }
            Err(fault) => {
                self.cpu.halt();
                Err(fault)
            }
        }
    }

    /// Run from `start` until PC reaches `limit`, without tracing.
    pub fn run(&mut self, start: u16, limit: u16) -> Result<RunSummary, RunError> {
        self.run_with(RunConfig::new(start, limit), &mut NoTrace)
    }

    /// Run per `config`, reporting every executed instruction to `sink`.
    pub fn run_with<T: TraceSink + ?Sized>(
        &mut self,
        config: RunConfig,
        sink: &mut T,
    ) -> Result<RunSummary, RunError> {
        self.cpu.set_pc(config.start);
        self.cpu.resume();
        debug!(start = config.start, limit = config.limit, "run start");

        let mut steps: u64 = 0;
        while self.cpu.pc() < config.limit {
            if config.max_steps.is_some_and(|max| steps >= max) {
                debug!(steps, pc = self.cpu.pc(), "step budget exhausted");
                return Ok(RunSummary {
                    steps,
                    stop: StopReason::StepBudgetExhausted,
                    status: self.status(),
                });
            }
            if let Err(fault) = self.step() {
                let status = self.status();
                warn!(%fault, pc = status.pc, steps, "run terminated by fault");
                return Err(RunError { fault, status });
            }
            steps += 1;
            sink.on_step(self.cpu.ir(), &self.status());
        }

        self.cpu.halt();
        debug!(steps, pc = self.cpu.pc(), "run reached limit");
        Ok(RunSummary {
            steps,
            stop: StopReason::LimitReached,
            status: self.status(),
        })
    }
}
