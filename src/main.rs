use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use mipsette::asm::encoding::{BinaryFormat, ObjFileFormat, TextFormat};
use mipsette::asm::{assemble_lines, ObjectFile};
use mipsette::err::report;
use mipsette::sim::mem::MachineInitStrategy;
use mipsette::sim::{SimFlags, Simulator};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ObjFormat {
    Binary,
    Text,
}

#[derive(Parser, Debug)]
#[command(
    name = "mipsette",
    version,
    about = "Assembles a MIPS source file, runs it, and prints the final machine state."
)]
struct Args {
    /// Source file to assemble, one instruction per line.
    file: PathBuf,

    /// Stop after executing this many instructions.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Fail on words that do not decode to any instruction.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Discard writes to `$zero`.
    #[arg(long, default_value_t = false)]
    hardwire_zero: bool,

    /// Fill registers from a seeded RNG instead of zeroing them.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Write the assembled object file to this path.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Format of the object file written by `--output`.
    #[arg(long, value_enum, default_value_t = ObjFormat::Binary)]
    format: ObjFormat,

    /// Log verbosity (-v for info, -vv for every executed instruction).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn write_obj(obj: &ObjectFile, args: &Args) -> std::io::Result<()> {
    let Some(path) = &args.output else { return Ok(()) };

    match args.format {
        ObjFormat::Binary => std::fs::write(path, BinaryFormat::serialize(obj)),
        ObjFormat::Text   => std::fs::write(path, TextFormat::serialize(obj)),
    }
}

/// Renders the register file and the program counter, one entry per line.
fn render_state(sim: &Simulator) -> String {
    let mut out = String::new();
    for (reg, value) in sim.reg_file.iter() {
        out += &format!("{:>2} {:<5}: {value:#010x} ({})\n", reg.reg_no(), reg.name(), value as i32);
    }
    out += &format!("Program Counter: {:#010x}\n", sim.pc);
    out
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialize logger: {e}");
    }

    let src = match std::fs::read_to_string(&args.file) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", args.file.display());
            return ExitCode::FAILURE;
        }
    };
    let lines: Vec<_> = src.lines().collect();

    let obj = match assemble_lines(&lines, args.output.is_some()) {
        Ok(obj) => obj,
        Err(e) => {
            eprint!("{}", report(&e, Some(&src)));
            return ExitCode::FAILURE;
        }
    };
    // at info level, the assembler already logs each word
    if !log::log_enabled!(log::Level::Info) {
        print!("{}", obj.listing());
    }

    if let Err(e) = write_obj(&obj, &args) {
        eprintln!("error: could not write object file: {e}");
        return ExitCode::FAILURE;
    }

    let machine_init = match args.seed {
        Some(seed) => MachineInitStrategy::Seeded { seed },
        None => MachineInitStrategy::Zeroed,
    };
    let mut sim = Simulator::new(SimFlags {
        strict: args.strict,
        hardwire_zero: args.hardwire_zero,
        machine_init,
    });
    sim.load_obj_file(&obj);

    let result = match args.max_steps {
        Some(n) => sim.run_with_limit(n),
        None => sim.run(),
    };

    println!();
    print!("{}", render_state(&sim));

    match result {
        Ok(()) if !sim.hit_halt() => {
            log::warn!("stopped after {} instructions without halting", sim.instructions_run);
            ExitCode::SUCCESS
        },
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", report(&e, None));
            ExitCode::FAILURE
        }
    }
}
