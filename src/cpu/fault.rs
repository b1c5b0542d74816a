/*!
fault.rs - Synchronous fault taxonomy raised by the decoder and executor.

Every handler returns `Result<(), Fault>`. A fault is never recovered locally:
the fetch-execute cycle stops on the first one and hands it to the caller
together with a status snapshot (`RunError`).

Numeric codes follow the machine's historical error table:

  1 Stack Overflow
  2 Stack Underflow
  3 Stack Pointer Corruption
  4 Illegal Opcode
  5 Invalid Operand
  6 Segmentation Fault
*/

use thiserror::Error;

use crate::trace::Status;

/// Why an operand was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidOperand {
    /// Operand field selected register 6 (pc) or 7 (ir).
    #[error("register index {index} is reserved")]
    ReservedRegister { index: u8 },
    /// `div` with a zero source operand.
    #[error("division by zero")]
    DivideByZero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("Stack Overflow (sp={sp})")]
    StackOverflow { sp: i16 },
    #[error("Stack Underflow (sp={sp})")]
    StackUnderflow { sp: i16 },
    #[error("Stack Pointer Corruption")]
    StackPointerCorruption,
    #[error("Illegal Opcode {opcode}")]
    IllegalOpcode { opcode: u8 },
    #[error("Invalid Operand: {0}")]
    InvalidOperand(#[from] InvalidOperand),
    #[error("Segmentation Fault at address {addr}")]
    SegmentationFault { addr: u16 },
}

impl Fault {
    /// Historical numeric error code (1..=6).
    pub fn code(&self) -> u8 {
        match self {
            Fault::StackOverflow { .. } => 1,
            Fault::StackUnderflow { .. } => 2,
            Fault::StackPointerCorruption => 3,
            Fault::IllegalOpcode { .. } => 4,
            Fault::InvalidOperand(_) => 5,
            Fault::SegmentationFault { .. } => 6,
        }
    }
}

/// A run terminated by a fault, with the machine status at the moment it was raised.
///
/// `status.pc` is the address of the faulting instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fault} at pc={}", .status.pc)]
pub struct RunError {
    #[source]
    pub fault: Fault,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_error_table() {
        assert_eq!(Fault::StackOverflow { sp: 12288 }.code(), 1);
        assert_eq!(Fault::StackUnderflow { sp: 4096 }.code(), 2);
        assert_eq!(Fault::StackPointerCorruption.code(), 3);
        assert_eq!(Fault::IllegalOpcode { opcode: 16 }.code(), 4);
        assert_eq!(Fault::from(InvalidOperand::DivideByZero).code(), 5);
        assert_eq!(Fault::SegmentationFault { addr: 40000 }.code(), 6);
    }

    #[test]
    fn display_text() {
        assert_eq!(Fault::StackPointerCorruption.to_string(), "Stack Pointer Corruption");
        assert_eq!(
            Fault::from(InvalidOperand::ReservedRegister { index: 6 }).to_string(),
            "Invalid Operand: register index 6 is reserved"
        );
    }
}
