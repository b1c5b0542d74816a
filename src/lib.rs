#![doc = r#"
vm16 library crate.

An emulator for a small 16-bit abstract machine: six software registers, a
32K-word memory split into code, stack and heap segments, and sixteen
single-word instructions.

Modules:
- asm: one-line assembler (mnemonic text to instruction word)
- cpu: register file, decoder, opcode handlers and the `Machine` run loop
- loader: line protocol for loading assembler source or raw words
- memory: word-addressed memory and segment boundaries
- trace: per-step `Status` snapshots and trace sinks

In tests, shared machine builders are available under `crate::test_utils`.
"#]

pub mod asm;
pub mod cpu;
pub mod loader;
pub mod memory;
pub mod trace;

// Re-export commonly used types at the crate root for convenience.
pub use cpu::{Fault, Machine, Register, RunConfig, RunError};
pub use loader::LoadError;
pub use memory::Memory;
pub use trace::{Status, TraceSink};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
