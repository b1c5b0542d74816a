/*!
Trace module: per-step machine status and the sinks that consume it.

After every successfully executed instruction the run loop captures a
`Status` (six software registers, `pc`, and the top-of-stack word whenever
`sp` is above the stack base) and hands it to a `TraceSink` together with the word that
was executed. Rendering is the sink's business; `WriterTrace` reproduces the
classic trace line:

```text
    mov 5 ax:	ax=5, bx=0, cx=0, sp=4096, bp=0, ma=0, pc=2
    push ax:	ax=5, bx=0, cx=0, sp=4097, bp=0, ma=0, pc=3, tos=5
```

`sp`, `bp`, `ma` and `pc` print as unsigned addresses; `ax`, `bx`, `cx` and
`tos` print signed.
*/

use std::fmt;
use std::io::{self, Write};

use crate::cpu::decode::disassemble;
use crate::cpu::execute::peek_top;
use crate::cpu::regs::{CpuRegs, Register};
use crate::memory::Memory;

/// Snapshot of everything a trace line needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub regs: [i16; 6],
    pub pc: u16,
    pub tos: Option<i16>,
}

impl Status {
    pub fn capture<C: CpuRegs + ?Sized>(cpu: &C, mem: &Memory) -> Self {
        Self {
            regs: Register::ALL.map(|r| cpu.reg(r)),
            pc: cpu.pc(),
            tos: peek_top(cpu, mem),
        }
    }

    #[inline]
    pub fn reg(&self, r: Register) -> i16 {
        self.regs[r as usize]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ax={}, bx={}, cx={}, sp={}, bp={}, ma={}, pc={}",
            self.reg(Register::Ax),
            self.reg(Register::Bx),
            self.reg(Register::Cx),
            self.reg(Register::Sp) as u16,
            self.reg(Register::Bp) as u16,
            self.reg(Register::Ma) as u16,
            self.pc,
        )?;
        if let Some(tos) = self.tos {
            write!(f, ", tos={tos}")?;
        }
        Ok(())
    }
}

/// Receives one callback per executed instruction.
pub trait TraceSink {
    fn on_step(&mut self, word: u16, status: &Status);
}

/// Discards every step.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    #[inline]
    fn on_step(&mut self, _word: u16, _status: &Status) {}
}

/// Writes `<disassembly>:\t<status>` lines to any `io::Write`.
///
/// The first write error is kept and further output is suppressed; check it
/// with `take_error` once the run is over.
#[derive(Debug)]
pub struct WriterTrace<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for WriterTrace<W> {
    fn on_step(&mut self, word: u16, status: &Status) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}:\t{}", disassemble(word), status) {
            self.error = Some(e);
        }
    }
}

/// Collects `(word, status)` pairs in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingTrace {
    pub steps: Vec<(u16, Status)>,
}

impl TraceSink for RecordingTrace {
    fn on_step(&mut self, word: u16, status: &Status) {
        self.steps.push((word, *status));
    }
}
