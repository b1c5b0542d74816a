/*!
cpu::mod - Public façade for the 16-bit machine core.

Layout
======

```text
    state.rs        - Register file (`CpuState`), power-up defaults, run state.
    regs.rs         - `Register` names and the `CpuRegs` access trait.
    decode.rs       - Per-class bit-field extraction, `Opcode`, `Instruction`.
    execute.rs      - Shared semantic helpers (fetch, stack window, div, ma).
    dispatch/       - One step of the fetch-decode-execute cycle + handlers.
    table.rs        - Feature-gated function-pointer dispatch table.
    fault.rs        - Fault taxonomy and the run-level error.
    core.rs         - `Machine`: the owned aggregate with load / step / run.
```

The public surface is `Machine` plus the value types it hands out. Handlers
and helpers are crate-internal; they are generic over `CpuRegs` so they can be
exercised against a bare `CpuState` in unit tests.

Feature flags:
    table_dispatch  - Route opcodes through `table::ExecTable` instead of the
                      exhaustive match in `dispatch::execute`.

Usage:
```rust
use vm16::cpu::{Machine, Register};
use vm16::loader::load_source;

let mut m = Machine::new();
let end = load_source(&mut m, "mov 5 ax\nadd 3 ax\n").unwrap();
m.run(1, end).unwrap();
assert_eq!(m.reg(Register::Ax), 8);
```
*/

pub mod core;
pub mod decode;
pub mod dispatch;
pub mod execute;
pub mod fault;
pub mod regs;
pub mod state;
#[cfg(feature = "table_dispatch")]
pub mod table;


pub use crate::cpu::core::{Machine, RunConfig, RunSummary, StopReason};
pub use crate::cpu::decode::{Instruction, OpClass, Opcode, Operand, disassemble};
pub use crate::cpu::fault::{Fault, InvalidOperand, RunError};
pub use crate::cpu::regs::{CpuRegs, Register};
pub use crate::cpu::state::{CpuState, ExecState, PROGRAM_START};
