use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vm16::cpu::{Machine, PROGRAM_START, RunConfig, StopReason};
use vm16::loader::{load_source, load_words_text};
use vm16::trace::{NoTrace, TraceSink, WriterTrace};

/// Exit status when the program faulted (load and I/O errors exit with 1).
const EXIT_FAULT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "vm16", about = "Assemble and run a program on the 16-bit abstract machine.")]
struct Args {
    /// Program file; standard input when absent.
    #[arg(value_name = "PROGRAM")]
    program: Option<PathBuf>,

    /// Address execution starts at.
    #[arg(long, value_name = "ADDR", default_value_t = PROGRAM_START)]
    start: u16,

    /// Stop when PC reaches this address (default: end of the loaded program).
    #[arg(long, value_name = "ADDR")]
    limit: Option<u16>,

    /// Do not print a status line after every instruction.
    #[arg(long, default_value_t = false)]
    no_trace: bool,

    /// Stop after this many instructions even if the limit was not reached.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Program is pre-encoded words (decimal or 0x hex), one per line.
    #[arg(long, default_value_t = false)]
    words: bool,
}

fn read_program(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading standard input")?;
            Ok(text)
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let text = read_program(args.program.as_ref())?;

    let mut machine = Machine::new();
    let end = if args.words {
        load_words_text(&mut machine, &text)?
    } else {
        load_source(&mut machine, &text)?
    };
    if end == PROGRAM_START && args.limit.is_none() {
        bail!("no instructions loaded");
    }

    let mut config = RunConfig::new(args.start, args.limit.unwrap_or(end));
    config.max_steps = args.max_steps;
    info!(start = config.start, limit = config.limit, max_steps = ?config.max_steps, "running");

    let stdout = io::stdout().lock();
    let mut writer = WriterTrace::new(stdout);
    let mut quiet = NoTrace;
    let sink: &mut dyn TraceSink = if args.no_trace { &mut quiet } else { &mut writer };
    let outcome = machine.run_with(config, sink);
    if let Some(err) = writer.take_error() {
        return Err(err).context("writing trace");
    }
    let mut stdout = writer.into_inner();

    match outcome {
        Ok(summary) => {
            if args.no_trace {
                writeln!(stdout, "{}", summary.status)?;
            }
            if summary.stop == StopReason::StepBudgetExhausted {
                eprintln!("vm16: stopped after {} steps without reaching {}", summary.steps, config.limit);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            stdout.flush()?;
            eprintln!("vm16: {err} (fault code {})", err.fault.code());
            eprintln!("vm16: {}", err.status);
            Ok(ExitCode::from(EXIT_FAULT))
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("vm16: {err:#}");
            ExitCode::FAILURE
        }
    }
}
