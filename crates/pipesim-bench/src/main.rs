//! Benchmark and reporting harness for the pipesim core.
//!
//! Drives the built-in demo program through one persistent machine for a
//! bounded number of instructions, then reports simulated throughput, the
//! register file and the head of memory, and stage utilization.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::io::Write as _;
use std::time::Instant;

use pipesim_core::{
    BinaryOp, Instruction, Machine, Source, TraceEvent, TraceSink, MEMORY_CELLS, REGISTER_COUNT,
};

const USAGE_TEXT: &str = "\
Usage: pipesim-bench [options]

Options:
  -n, --count <instructions>     Instructions to execute (default: 1000000)
  -r, --report-every <n>         Print running throughput every n instructions
                                 (default: 0, disabled)
  -t, --trace                    Print every pipeline event to stderr
  -h, --help                     Show this help message

Examples:
  pipesim-bench
  pipesim-bench --count 12800000 --report-every 1000000
  pipesim-bench --count 16 --trace
";

const DEFAULT_COUNT: u64 = 1_000_000;

#[derive(Debug, PartialEq, Eq)]
struct BenchArgs {
    count: u64,
    report_every: u64,
    trace: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(BenchArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut count = DEFAULT_COUNT;
    let mut report_every = 0;
    let mut trace = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--trace" || arg == "-t" {
            trace = true;
            continue;
        }

        if arg == "-n" || arg == "--count" {
            count = parse_count_value(args.next(), "--count")?;
            continue;
        }

        if arg == "-r" || arg == "--report-every" {
            report_every = parse_count_value(args.next(), "--report-every")?;
            continue;
        }

        return Err(format!("unknown option: {}", arg.to_string_lossy()));
    }

    Ok(ParseResult::Run(BenchArgs {
        count,
        report_every,
        trace,
    }))
}

fn parse_count_value(value: Option<OsString>, option: &str) -> Result<u64, String> {
    let value = value.ok_or_else(|| format!("missing value for {option}"))?;
    value
        .to_string_lossy()
        .parse()
        .map_err(|_| format!("invalid value for {option}: {}", value.to_string_lossy()))
}

/// The demo instruction mix: moves, memory traffic, a fully indirect add,
/// and a jump, cycling so every pipeline stage stays busy.
fn demo_program() -> [Instruction; 8] {
    [
        Instruction::Unary {
            op1: Source::immediate(1),
            res: direct(1),
        },
        Instruction::Unary {
            op1: Source::immediate(2),
            res: direct(2),
        },
        Instruction::Unary {
            op1: direct(1),
            res: indirect(1),
        },
        Instruction::Unary {
            op1: direct(2),
            res: indirect(2),
        },
        Instruction::Binary {
            op1: indirect(1),
            op2: indirect(2),
            res: indirect(3),
            op: BinaryOp::Add,
        },
        Instruction::Unary {
            op1: indirect(3),
            res: direct(3),
        },
        Instruction::Binary {
            op1: direct(1),
            op2: direct(3),
            res: direct(1),
            op: BinaryOp::Add,
        },
        Instruction::Jump { offset: direct(1) },
    ]
}

fn direct(reg: u8) -> Source {
    Source::direct(reg).expect("demo register index in range")
}

fn indirect(addr: u16) -> Source {
    Source::indirect(addr).expect("demo cell address in range")
}

/// Trace sink printing each pipeline event to stderr.
struct StderrTrace;

impl TraceSink for StderrTrace {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::InstructionIssued { cycle, kind } => {
                eprintln!("clk {cycle:>6}  issue {kind}");
            }
            TraceEvent::StageEntered { cycle, stage } => {
                eprintln!("clk {cycle:>6}  stage {stage:?}");
            }
            TraceEvent::FaultRaised { cycle, fault } => {
                eprintln!("clk {cycle:>6}  fault {fault}");
            }
            TraceEvent::InstructionRetired {
                cycle,
                cycles_taken,
            } => {
                eprintln!("clk {cycle:>6}  retire ({cycles_taken} cycles)");
            }
        }
    }
}

/// Formats bytes in the dump layout: two-byte groups, sixteen per line.
fn hexdump(data: &[u8]) -> String {
    let mut out = String::new();
    for (index, byte) in data.iter().enumerate() {
        if index > 0 && index % 16 == 0 {
            out.push('\n');
        } else if index > 0 && index % 2 == 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn simulated_khz(cycles: u64, elapsed_ms: u128) -> u64 {
    let divisor = u128::max(elapsed_ms, 1);
    u64::try_from(u128::from(cycles) / divisor).unwrap_or(u64::MAX)
}

fn run(args: &BenchArgs) {
    let mut machine = Machine::new();
    let program = demo_program();
    let start = Instant::now();

    for step in 0..args.count {
        let instr = program[usize::try_from(step % program.len() as u64)
            .expect("program index fits in usize")];
        if args.trace {
            machine.execute_traced(instr, &mut StderrTrace);
        } else {
            machine.execute(instr);
        }

        if args.report_every > 0 && (step + 1) % args.report_every == 0 {
            let elapsed = start.elapsed().as_millis();
            eprint!(
                "approx. {} khz\r",
                simulated_khz(machine.cycles(), elapsed)
            );
            let _ = std::io::stderr().flush();
        }
    }

    let elapsed = start.elapsed().as_millis();
    report(&machine, args.count, elapsed);
}

fn report(machine: &Machine, count: u64, elapsed_ms: u128) {
    let counters = machine.stage_counters();

    eprintln!("CYCLE {}", machine.cycles());
    eprintln!("REGS {}", hexdump(&machine.registers()[..REGISTER_COUNT]));
    eprintln!("RAM  {}", hexdump(&machine.memory()[..16.min(MEMORY_CELLS)]));
    eprintln!("approx. {} khz", simulated_khz(machine.cycles(), elapsed_ms));
    eprintln!("instructions executed: {count}");
    eprintln!("instructions retired:  {}", machine.instructions_retired());
    eprintln!("delta: {elapsed_ms} ms");
    eprintln!("clk: {}", machine.cycles());
    eprintln!("fetch1: {}", counters.fetch1);
    eprintln!("fetch2: {}", counters.fetch2);
    eprintln!("writeback: {}", counters.writeback);
    eprintln!("exceptions: {}", counters.exceptions);
    if let Some(fault) = machine.last_fault() {
        eprintln!("last fault: {fault}");
    }
}

fn main() {
    let exit_code = match parse_args(std::env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => {
            run(&args);
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
