/*!
Line assembler: one line of mnemonic text to one 16-bit instruction word.

Syntax
======
```text
    nop | ret                       no operands
    add|sub|mult|div|mov SRC DST    SRC: register or 0..=255, DST: register
    push|store SRC                  SRC: register or 0..=2047
    pop|load DST                    DST: register
    jmp|jnz|jz|jn|call TARGET       TARGET: 0..=4095
```

Registers are `ax bx cx sp bp ma`. Numbers are decimal or `0x` hex and never
signed; negative values must be produced at run time (`mov 0 ax; sub 1 ax`).
Mnemonics and register names are case-insensitive, operands may be separated
by whitespace or commas, and anything after `#` is a comment.

`Instruction`'s `Display` renders the same syntax, so disassembled text
assembles back to the original word for every canonical encoding.
*/

use thiserror::Error;

use crate::cpu::decode::{IMM8_MAX, IMM11_MAX, Instruction, OpClass, Opcode, Operand, TARGET_MAX};
use crate::cpu::regs::Register;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("empty instruction")]
    Empty,
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("`{mnemonic}` expects {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is not a register")]
    ExpectedRegister(String),
    #[error("`{0}` is neither a register nor a number")]
    BadOperand(String),
    #[error("immediate {value} out of range 0..={max}")]
    ImmediateOutOfRange { value: i64, max: u16 },
    #[error("branch target {0} outside the code segment 0..=4095")]
    TargetOutOfRange(i64),
}

/// Assemble one line into an instruction word.
pub fn assemble(line: &str) -> Result<u16, AsmError> {
    parse(line).map(|inst| inst.encode())
}

/// Parse one line into a structured instruction.
pub fn parse(line: &str) -> Result<Instruction, AsmError> {
    let code = line.split('#').next().unwrap_or_default();
    let mut tokens = code
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    let mnemonic = tokens.next().ok_or(AsmError::Empty)?;
    let opcode =
        Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownMnemonic(mnemonic.to_string()))?;
    let operands: Vec<&str> = tokens.collect();

    let expected = match opcode.class() {
        OpClass::Bare => 0,
        OpClass::Alu => 2,
        OpClass::Source | OpClass::Dest | OpClass::Branch => 1,
    };
    if operands.len() != expected {
        return Err(AsmError::OperandCount {
            mnemonic: opcode.mnemonic(),
            expected,
            found: operands.len(),
        });
    }

    Ok(match opcode.class() {
        OpClass::Bare if opcode == Opcode::Nop => Instruction::Nop,
        OpClass::Bare => Instruction::Ret,
        OpClass::Alu => Instruction::Alu {
            opcode,
            src: source(operands[0], IMM8_MAX)?,
            dst: register(operands[1])?,
        },
        OpClass::Source => Instruction::Source {
            opcode,
            src: source(operands[0], IMM11_MAX)?,
        },
        OpClass::Dest => Instruction::Dest {
            opcode,
            dst: register(operands[0])?,
        },
        OpClass::Branch => {
            let value = number(operands[0]).ok_or_else(|| AsmError::BadOperand(operands[0].to_string()))?;
            if !(0..=i64::from(TARGET_MAX)).contains(&value) {
                return Err(AsmError::TargetOutOfRange(value));
            }
            Instruction::Branch {
                opcode,
                target: value as u16,
            }
        }
    })
}

fn register(token: &str) -> Result<Register, AsmError> {
    Register::from_name(token).ok_or_else(|| AsmError::ExpectedRegister(token.to_string()))
}

fn source(token: &str, max: u16) -> Result<Operand, AsmError> {
    if let Some(r) = Register::from_name(token) {
        return Ok(Operand::Reg(r));
    }
    let value = number(token).ok_or_else(|| AsmError::BadOperand(token.to_string()))?;
    if !(0..=i64::from(max)).contains(&value) {
        return Err(AsmError::ImmediateOutOfRange { value, max });
    }
    Ok(Operand::Imm(value as u16))
}

/// Decimal or `0x` hex with at most one leading `-` (rejected later by range
/// checks). A second sign or an unrepresentable magnitude is not a number.
fn number(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let (body, radix) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    // from_str_radix accepts its own leading sign
    if !body.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = i64::from_str_radix(body, radix).ok()?;
    if negative { magnitude.checked_neg() } else { Some(magnitude) }
}
