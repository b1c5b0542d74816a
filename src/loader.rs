/*!
Program loader: text in, words into the code segment.

Overview
========
Two input shapes are accepted:

- Assembler source (`load_source`): one instruction per line in `asm`
  syntax.
- Pre-encoded words (`load_words_text`): one 16-bit word per line, decimal or
  `0x` hex.

Both follow the same line protocol:

```text
    .            end of program; the rest of the input is ignored
    # ...        comment line, skipped
    (blank)      skipped
    1 char       skipped (stray single characters)
    anything else is one word, appended at the load cursor
```

The cursor starts at address 1 and the returned address is one past the last
word written, which is the natural `limit` for a subsequent run. Errors carry
the 1-based line number of the offending input line.
*/

use thiserror::Error;

use crate::asm::{self, AsmError};
use crate::cpu::Machine;

/// Lines with fewer visible characters are skipped. Anything longer must
/// assemble, so two-character junk is reported rather than dropped.
const MIN_LINE_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("line {line}: {source}")]
    Asm {
        line: usize,
        #[source]
        source: AsmError,
    },
    #[error("line {line}: `{text}` is not a 16-bit word")]
    BadWord { line: usize, text: String },
    #[error("code segment full: cannot load at address {addr}")]
    CodeSegmentFull { addr: u16 },
}

/// Lines that carry a word, paired with their 1-based line number.
fn program_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
        .take_while(|(_, line)| !line.starts_with('.'))
        .filter(|(_, line)| {
            let body = line.trim_start();
            !body.is_empty() && !body.starts_with('#') && line.len() >= MIN_LINE_LEN
        })
}

/// Assemble every program line of `source`.
pub fn assemble_source(source: &str) -> Result<Vec<u16>, LoadError> {
    program_lines(source)
        .map(|(line, text)| asm::assemble(text).map_err(|source| LoadError::Asm { line, source }))
        .collect()
}

/// Parse every program line of `text` as a raw word.
pub fn parse_words(text: &str) -> Result<Vec<u16>, LoadError> {
    program_lines(text)
        .map(|(line, raw)| {
            let raw = raw.trim();
            parse_word(raw).ok_or_else(|| LoadError::BadWord {
                line,
                text: raw.to_string(),
            })
        })
        .collect()
}

fn parse_word(raw: &str) -> Option<u16> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Assemble `source` into `machine` starting at address 1; returns the end
/// address.
pub fn load_source(machine: &mut Machine, source: &str) -> Result<u16, LoadError> {
    let words = assemble_source(source)?;
    machine.load_program(&words)
}

/// Load pre-encoded words into `machine` starting at address 1; returns the
/// end address.
pub fn load_words_text(machine: &mut Machine, text: &str) -> Result<u16, LoadError> {
    let words = parse_words(text)?;
    machine.load_program(&words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{Fault, Register, RunConfig, StopReason};
    use crate::memory::STACK_BASE;
    use crate::test_utils::{machine_from_source, run_source};
    use crate::trace::WriterTrace;

    #[test]
    fn line_protocol() {
        let src = "\
# header comment
mov 5 ax

   # indented comment
x
add 3 ax
.
this is never read
";
        assert_eq!(assemble_source(src), Ok(vec![0x7028, 0x1018]));
    }

    #[test]
    fn two_character_lines_are_assembled_not_skipped() {
        assert_eq!(
            assemble_source("mov 5 ax\nok\n"),
            Err(LoadError::Asm {
                line: 2,
                source: AsmError::UnknownMnemonic("ok".into()),
            })
        );
    }

    #[test]
    fn asm_errors_carry_line_numbers() {
        let err = assemble_source("nop\nnop\nmov 300 ax\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::Asm {
                line: 3,
                source: AsmError::ImmediateOutOfRange { value: 300, max: 255 },
            }
        );
        assert_eq!(err.to_string(), "line 3: immediate 300 out of range 0..=255");
    }

    #[test]
    fn word_mode() {
        assert_eq!(parse_words("0x7028\n4120\n.\n"), Ok(vec![0x7028, 0x1018]));
        assert_eq!(
            parse_words("0x7028\nzzz\n"),
            Err(LoadError::BadWord { line: 2, text: "zzz".into() })
        );
        assert_eq!(
            parse_words("70000\n"),
            Err(LoadError::BadWord { line: 1, text: "70000".into() })
        );
    }

    #[test]
    fn source_loads_from_address_one() {
        let mut m = Machine::new();
        let end = load_source(&mut m, "mov 5 ax\nadd 3 ax\n").unwrap();
        assert_eq!(end, 3);
        assert_eq!(m.memory().read(1) as u16, 0x7028);
        assert_eq!(m.memory().read(2) as u16, 0x1018);
    }

    #[test]
    fn oversized_program_is_rejected() {
        let src = "nop\n".repeat(4096);
        let mut m = Machine::new();
        assert_eq!(
            load_source(&mut m, &src),
            Err(LoadError::CodeSegmentFull { addr: 4096 })
        );
    }

    // End to end: source text through loader, run loop and trace.

    #[test]
    fn loop_subroutine_and_heap() {
        let src = "\
mov 10 cx     # 1
add cx ax     # 2
sub 1 cx      # 3
jnz 2         # 4: ax = 55
call 9        # 5
mov 100 ma    # 6
mult 200 ma   # 7: ma = 20000
jmp 11        # 8
add ax ax     # 9: subroutine
ret           # 10
store ax      # 11
load bx       # 12
";
        let m = run_source(src);
        assert_eq!(m.reg(Register::Ax), 110);
        assert_eq!(m.reg(Register::Bx), 110);
        assert_eq!(m.reg(Register::Cx), 0);
        assert_eq!(m.reg(Register::Sp), STACK_BASE as i16);
        assert_eq!(m.memory().read(20000), 110);
        assert_eq!(m.pc(), 13);
    }

    #[test]
    fn fault_halts_before_the_rest_of_the_program() {
        let mut m = machine_from_source("mov 1 ax\npop sp\nmov 2 ax\n");
        let err = m.run(1, 4).unwrap_err();
        assert_eq!(err.fault, Fault::StackPointerCorruption);
        assert_eq!(err.status.pc, 2);
        assert_eq!(m.reg(Register::Ax), 1);
    }

    #[test]
    fn writer_trace_end_to_end() {
        let mut m = machine_from_source("mov 9 ax\npush ax\npop bx\n");
        let mut sink = WriterTrace::new(Vec::new());
        let summary = m.run_with(RunConfig::new(1, 4), &mut sink).unwrap();
        assert_eq!(summary.stop, StopReason::LimitReached);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "\
mov 9 ax:\tax=9, bx=0, cx=0, sp=4096, bp=0, ma=0, pc=2
push ax:\tax=9, bx=0, cx=0, sp=4097, bp=0, ma=0, pc=3, tos=9
pop bx:\tax=9, bx=9, cx=0, sp=4096, bp=0, ma=0, pc=4
"
        );
    }
}
