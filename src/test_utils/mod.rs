//! Shared test utilities for building machines from assembler text or raw
//! instruction words.
//!
//! Every builder loads at address 1 (the normal program start). The `run_*`
//! helpers then execute from 1 up to the end of the loaded program and
//! panic on any outcome the caller did not ask for, so tests can stay focused
//! on the registers and memory they inspect.

#![allow(dead_code)]

use crate::cpu::{Machine, RunError};
use crate::loader::load_source;

/// A fresh machine with `source` assembled and loaded, not yet run.
pub fn machine_from_source(source: &str) -> Machine {
    let mut m = Machine::new();
    load_source(&mut m, source).expect("test program must assemble");
    m
}

/// A fresh machine with `words` loaded, not yet run.
pub fn machine_from_words(words: &[u16]) -> Machine {
    let mut m = Machine::new();
    m.load_program(words).expect("test program must fit the code segment");
    m
}

/// Assemble, load and run `source` to its end. Panics on a fault.
pub fn run_source(source: &str) -> Machine {
    let mut m = Machine::new();
    let end = load_source(&mut m, source).expect("test program must assemble");
    if let Err(e) = m.run(1, end) {
        panic!("unexpected fault: {e}");
    }
    m
}

/// Load and run `words` to their end, expecting a fault.
pub fn run_words_to_fault(words: &[u16]) -> (Machine, RunError) {
    let mut m = Machine::new();
    let end = m.load_program(words).expect("test program must fit the code segment");
    match m.run(1, end) {
        Ok(summary) => panic!("expected a fault, run ended with {}", summary.status),
        Err(e) => (m, e),
    }
}
