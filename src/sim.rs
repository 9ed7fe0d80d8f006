//! Simulating and execution for assembled MIPS instructions.
//!
//! This module is focused on executing fully assembled code (i.e., [`ObjectFile`]).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates assembled code.
//! - [`mem`]: The module handling the register file and its initialization.
//! - [`debug`]: The module handling types of breakpoints for the simulator.
//!
//! # Usage
//!
//! To simulate some code, you need to instantiate a Simulator and load an object file to it:
//!
//! ```
//! use mipsette::asm::assemble;
//! use mipsette::ast::reg_consts::T0;
//! use mipsette::sim::Simulator;
//!
//! let obj_file = assemble("addi $t0 $zero 5\naddi $t0 $t0 5").unwrap();
//!
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load_obj_file(&obj_file);
//! simulator.run().unwrap();
//!
//! assert_eq!(simulator.reg_file[T0], 10);
//! ```
//!
//! ## Flags
//!
//! Here, we define `simulator` to have the default flags.
//! We could also configure the simulator by editing the flags. For example,
//! if we wish to fail on words that do not decode to any instruction, we can edit the flags like so:
//!
//! ```
//! # use mipsette::sim::{Simulator, SimFlags};
//! let mut simulator = Simulator::new(SimFlags { strict: true, ..Default::default() });
//! ```
//!
//! All of the available flags can be found in [`SimFlags`].
//!
//! # Execution
//!
//! Beyond the basic [`Simulator::run`] (which runs until the program halts),
//! the simulator also provides:
//! - [`Simulator::step_in`]: Executes exactly one instruction.
//! - [`Simulator::run_with_limit`]: Runs until the program halts or a number of instructions have executed.
//! - [`Simulator::run_while`]: Runs until the program halts or a user-provided condition fails.
//!
//! A program halts when it executes the all-zero word (`nop`)
//! or when execution leaves the instruction stream.
//! Execution also pauses when any of the simulator's [breakpoints](debug::Breakpoint) match.
//!
//! # Branching
//!
//! A taken branch moves the program counter by `4 * offset` bytes,
//! and the instruction cursor by `offset + 1` instructions.
//! As a consequence, the program counter stays one instruction behind the
//! cursor after a taken branch, and the next instruction fetched is the one at the cursor.
//! [`Simulator::cursor`] can be used to see which instruction executes next.

pub mod mem;
pub mod debug;

use std::collections::HashSet;

use crate::asm::ObjectFile;
use crate::ast::reg_consts::ZERO;
use crate::ast::sim::SimInstr;
use crate::ast::Reg;

use self::debug::Breakpoint;
use self::mem::{MachineInitStrategy, RegFile};

/// Errors that can occur during simulation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SimErr {
    /// A word did not decode into any instruction.
    ///
    /// This can only be raised in strict mode.
    /// Otherwise, these words are executed as no-ops.
    IllegalInstruction {
        /// The word that failed to decode.
        word: u32,
        /// The address of the word.
        pc: u32
    },
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErr::IllegalInstruction { word, pc } => write!(f, "simulator executed illegal instruction {word:#010x} at {pc:#010x}"),
        }
    }
}
impl std::error::Error for SimErr {}
impl crate::err::Error for SimErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            SimErr::IllegalInstruction { .. } => Some("only nop, add, addi, andi, beq, bne, srl, and sll can be executed; disable strict mode to skip over unknown words".into()),
        }
    }
}

/// Anything that can cause a step to abruptly fail to finish.
enum StepBreak {
    /// The halting word was executed.
    Halt,
    /// The cursor does not point to any instruction in the stream.
    EndOfStream,
    /// A simulation error occurred.
    Err(SimErr),
}
impl From<SimErr> for StepBreak {
    fn from(value: SimErr) -> Self {
        Self::Err(value)
    }
}

/// Reason for why execution paused if it wasn't due to an error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
enum PauseCondition {
    /// Program reached a halt.
    Halt,
    /// Program ran off the instruction stream.
    EndOfStream,
    /// Program hit a breakpoint.
    Breakpoint,
    /// Program hit a tripwire condition.
    Tripwire,
    /// Program hit an error and did not pause successfully.
    #[default]
    Unsuccessful
}

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply.
///
/// Read the field descriptions for more details.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SimFlags {
    /// Whether strict mode is enabled.
    ///
    /// In strict mode, a word which does not decode to any instruction
    /// raises [`SimErr::IllegalInstruction`]. Outside of strict mode,
    /// the word is skipped over as though it were a no-op.
    ///
    /// By default, this flag is `false`.
    pub strict: bool,

    /// Whether register `$zero` is hardwired to zero.
    ///
    /// If `true`, any write to `$zero` is discarded.
    /// If `false`, `$zero` is a plain register that only conventionally holds zero.
    ///
    /// By default, this flag is `false`.
    pub hardwire_zero: bool,

    /// The creation strategy for the initial register values.
    ///
    /// This is used to initialize the `reg_file` field
    /// and only goes into effect after a `Simulator::new` or `Simulator::reset` call.
    ///
    /// By default, this flag is [`MachineInitStrategy::default`].
    pub machine_init: MachineInitStrategy,
}

#[allow(clippy::derivable_impls)]
impl Default for SimFlags {
    fn default() -> Self {
        Self {
            strict: false,
            hardwire_zero: false,
            machine_init: Default::default(),
        }
    }
}

/// Executes assembled code.
pub struct Simulator {
    /// The register file.
    pub reg_file: RegFile,

    /// The program counter.
    pub pc: u32,

    /// Index of the next instruction to execute.
    ///
    /// This can leave the bounds of the stream (including going negative) after a branch,
    /// which ends execution.
    cursor: i64,

    /// The instruction stream being executed.
    stream: Vec<u32>,

    /// The address of the first word of the stream.
    base: u32,

    /// The number of instructions successfully run since this `Simulator` was initialized.
    ///
    /// This can be set to 0 to reset the counter.
    pub instructions_run: u64,

    /// Indicates the reason why the last execution (via [`Simulator::run_while`] and adjacent)
    /// had paused.
    pause_condition: PauseCondition,

    /// Configuration settings for the simulator.
    ///
    /// These are preserved between resets.
    ///
    /// See [`SimFlags`] for more details on what configuration
    /// settings are available.
    pub flags: SimFlags,

    /// Breakpoints for the simulator.
    pub breakpoints: HashSet<Breakpoint>,
}
impl Simulator where Simulator: Send + Sync {}

impl Simulator {
    /// Creates a new simulator with the provided initializers
    /// and with no program loaded.
    pub fn new(flags: SimFlags) -> Self {
        let base = crate::asm::TEXT_START;

        Self {
            reg_file: RegFile::new(&mut flags.machine_init.generator()),
            pc: base,
            cursor: 0,
            stream: vec![],
            base,
            instructions_run: 0,
            pause_condition: Default::default(),
            flags,
            breakpoints: Default::default(),
        }
    }

    /// Resets the simulator.
    ///
    /// This resets the register file and the position of execution,
    /// but keeps the loaded program, flags, and breakpoints.
    pub fn reset(&mut self) {
        self.reg_file = RegFile::new(&mut self.flags.machine_init.generator());
        self.pc = self.base;
        self.cursor = 0;
        self.instructions_run = 0;
        self.pause_condition = Default::default();
    }

    /// Loads an object file into this simulator.
    ///
    /// Execution restarts at the first word of the object file.
    /// The register file is left untouched.
    pub fn load_obj_file(&mut self, obj: &ObjectFile) {
        self.stream = obj.words().to_vec();
        self.base = obj.base();
        self.pc = self.base;
        self.cursor = 0;
        self.pause_condition = Default::default();
    }

    /// Index of the next instruction to execute in the loaded stream.
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// The address of the next instruction to execute.
    ///
    /// This differs from [`Simulator::pc`] after a taken branch.
    pub fn next_addr(&self) -> u32 {
        self.base.wrapping_add((self.cursor as u32).wrapping_mul(4))
    }

    /// Gets the word the cursor points to, if it points into the stream.
    pub fn current_word(&self) -> Option<u32> {
        usize::try_from(self.cursor).ok()
            .and_then(|i| self.stream.get(i))
            .copied()
    }

    /// Indicates whether the last execution of the simulator hit a breakpoint.
    pub fn hit_breakpoint(&self) -> bool {
        matches!(self.pause_condition, PauseCondition::Breakpoint)
    }

    /// Indicates whether the last execution of the simulator resulted in a halt.
    ///
    /// This occurs either by executing the halting word
    /// or by leaving the instruction stream.
    pub fn hit_halt(&self) -> bool {
        matches!(self.pause_condition, PauseCondition::Halt | PauseCondition::EndOfStream)
    }

    /// Writes a register, respecting the `hardwire_zero` flag.
    fn set_reg(&mut self, reg: Reg, value: u32) {
        if !(self.flags.hardwire_zero && reg == ZERO) {
            self.reg_file[reg] = value;
        }
    }

    /// Runs until the tripwire condition returns false (or any of the typical breaks occur).
    ///
    /// The typical break conditions are:
    /// - the halting word is executed
    /// - the cursor leaves the instruction stream
    /// - A breakpoint matches
    pub fn run_while(&mut self, mut tripwire: impl FnMut(&mut Simulator) -> bool) -> Result<(), SimErr> {
        std::mem::take(&mut self.pause_condition);

        // event loop
        // run until:
        // 1. the program halts
        // 2. the tripwire condition returns false
        // 3. any of the breakpoints are hit
        let result = loop {
            // Tripwire turned off:
            if !tripwire(self) {
                break Ok(PauseCondition::Tripwire);
            }

            // Run a step:
            match self.step() {
                Ok(_) => {},
                Err(StepBreak::Halt) => break Ok(PauseCondition::Halt),
                Err(StepBreak::EndOfStream) => break Ok(PauseCondition::EndOfStream),
                Err(StepBreak::Err(e)) => break Err(e)
            }

            // After executing, check that any breakpoints were hit.
            if self.breakpoints.iter().any(|bp| bp.check(self)) {
                break Ok(PauseCondition::Breakpoint);
            }
        };

        self.pause_condition = result?;
        Ok(())
    }

    /// Execute the program.
    ///
    /// This blocks until the program ends.
    /// If you would like to limit the maximum number of steps to execute, consider [`Simulator::run_with_limit`].
    pub fn run(&mut self) -> Result<(), SimErr> {
        self.run_while(|_| true)
    }

    /// Execute the program with a limit on how many steps to execute.
    ///
    /// This blocks until the program ends or until the number of steps to execute has been hit.
    pub fn run_with_limit(&mut self, max_steps: u64) -> Result<(), SimErr> {
        let i = self.instructions_run;
        self.run_while(|sim| sim.instructions_run.wrapping_sub(i) < max_steps)
    }

    /// Simulate one step, executing one instruction.
    ///
    /// This function can return [`StepBreak::Halt`] or [`StepBreak::EndOfStream`] as an error,
    /// which indicates the program is done.
    /// In either case, the cursor and PC are not advanced.
    fn step(&mut self) -> Result<(), StepBreak> {
        let word = self.current_word().ok_or(StepBreak::EndOfStream)?;

        let Some(instr) = SimInstr::decode(word) else {
            if self.flags.strict {
                return Err(StepBreak::Err(SimErr::IllegalInstruction { word, pc: self.pc }));
            }

            log::debug!("{:#010x}: skipping unknown word {word:#010x}", self.pc);
            self.advance();
            self.instructions_run = self.instructions_run.wrapping_add(1);
            return Ok(());
        };
        log::debug!("{:#010x}: {instr}", self.pc);

        match instr {
            SimInstr::NOP => return Err(StepBreak::Halt),
            SimInstr::ADD(rd, rs, rt) => {
                let result = self.reg_file[rs].wrapping_add(self.reg_file[rt]);
                self.set_reg(rd, result);
                self.advance();
            },
            SimInstr::ADDI(rt, rs, imm) => {
                let result = self.reg_file[rs].wrapping_add(i32::from(imm.get()) as u32);
                self.set_reg(rt, result);
                self.advance();
            },
            SimInstr::ANDI(rt, rs, imm) => {
                let result = self.reg_file[rs] & u32::from(imm.get() as u16);
                self.set_reg(rt, result);
                self.advance();
            },
            SimInstr::BEQ(rs, rt, off) => {
                match self.reg_file[rs] == self.reg_file[rt] {
                    true  => self.branch(off.get()),
                    false => self.advance(),
                }
            },
            SimInstr::BNE(rs, rt, off) => {
                match self.reg_file[rs] != self.reg_file[rt] {
                    true  => self.branch(off.get()),
                    false => self.advance(),
                }
            },
            SimInstr::SRL(rd, rt, shamt) => {
                let result = self.reg_file[rt] >> u32::from(shamt.get());
                self.set_reg(rd, result);
                self.advance();
            },
            SimInstr::SLL(rd, rt, shamt) => {
                let result = self.reg_file[rt] << u32::from(shamt.get());
                self.set_reg(rd, result);
                self.advance();
            },
        }

        self.instructions_run = self.instructions_run.wrapping_add(1);
        Ok(())
    }

    /// Moves to the next instruction in sequence.
    fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(4);
        self.cursor += 1;
    }

    /// Takes a branch with the given offset.
    fn branch(&mut self, off: i16) {
        self.pc = self.pc.wrapping_add_signed(i32::from(off) * 4);
        self.cursor += i64::from(off) + 1;
    }

    /// Simulate one step, executing one instruction.
    ///
    /// If the program is already done, this does nothing.
    pub fn step_in(&mut self) -> Result<(), SimErr> {
        match self.step() {
            Ok(()) => Ok(()),
            Err(StepBreak::Halt | StepBreak::EndOfStream) => Ok(()),
            Err(StepBreak::Err(e)) => Err(e)
        }
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{assemble, ObjectFile, TEXT_START};
    use crate::ast::reg_consts::{T0, T1, T2, ZERO};

    use super::debug::{Breakpoint, Comparator};
    use super::mem::MachineInitStrategy;
    use super::{SimErr, SimFlags, Simulator};

    fn run_src(src: &str, flags: SimFlags) -> Simulator {
        let obj = assemble(src).unwrap();
        let mut sim = Simulator::new(flags);
        sim.load_obj_file(&obj);
        sim.run().unwrap();
        sim
    }

    #[test]
    fn test_addi_accumulates() {
        let sim = run_src("addi $t0 $zero 5\naddi $t0 $t0 5", Default::default());
        assert_eq!(sim.reg_file[T0], 10);
        assert_eq!(sim.pc, TEXT_START + 8);
        assert_eq!(sim.instructions_run, 2);
        assert!(sim.hit_halt());
    }

    #[test]
    fn test_addi_sign_extends() {
        let sim = run_src("addi $t0 $zero -1\naddi $t1 $zero -32768", Default::default());
        assert_eq!(sim.reg_file[T0], 0xFFFF_FFFF);
        assert_eq!(sim.reg_file[T1], 0xFFFF_8000);

        // out of signed range, even when written as hex
        assert!(assemble("addi $t1 $zero 0x8000").is_err());

        let sim = run_src("addi $t0 $zero -1\naddi $t0 $t0 1", Default::default());
        assert_eq!(sim.reg_file[T0], 0);
    }

    #[test]
    fn test_andi_zero_extends() {
        let sim = run_src("andi $t1 $zero 0xFFFF", Default::default());
        assert_eq!(sim.reg_file[T1], 0);

        let sim = run_src("addi $t1 $zero -1\nandi $t2 $t1 0xFFFF", Default::default());
        assert_eq!(sim.reg_file[T2], 0xFFFF);
    }

    #[test]
    fn test_add_wraps() {
        let sim = run_src(
            "addi $t0 $zero -1\naddi $t1 $zero 2\nadd $t2 $t0 $t1",
            Default::default()
        );
        assert_eq!(sim.reg_file[T2], 1);
    }

    #[test]
    fn test_shifts() {
        let sim = run_src("addi $t1 $zero 1\nsll $t2 $t1 4", Default::default());
        assert_eq!(sim.reg_file[T2], 16);

        let sim = run_src("addi $t1 $zero 16\nsrl $t2 $t1 1", Default::default());
        assert_eq!(sim.reg_file[T2], 8);

        // srl is logical
        let sim = run_src("addi $t1 $zero -1\nsrl $t2 $t1 28", Default::default());
        assert_eq!(sim.reg_file[T2], 0xF);
    }

    #[test]
    fn test_branch_not_taken() {
        let src = "
addi $t0 $zero 1
beq $t0 $zero skip
addi $t1 $zero 7
skip: addi $t2 $zero 9
        ".trim();
        let sim = run_src(src, Default::default());
        assert_eq!(sim.reg_file[T1], 7);
        assert_eq!(sim.reg_file[T2], 9);
        assert_eq!(sim.pc, TEXT_START + 16);
    }

    #[test]
    fn test_branch_taken() {
        let src = "
addi $t0 $zero 1
bne $t0 $zero skip
addi $t1 $zero 7
skip: addi $t2 $zero 9
        ".trim();
        let sim = run_src(src, Default::default());
        assert_eq!(sim.reg_file[T1], 0);
        assert_eq!(sim.reg_file[T2], 9);
        assert_eq!(sim.instructions_run, 3);
        assert_eq!(sim.pc, TEXT_START + 12);
        assert_eq!(sim.cursor(), 4);
    }

    #[test]
    fn test_backward_branch_loop() {
        let src = "
addi $t0 $zero 3
loop: addi $t0 $t0 -1
addi $t1 $t1 1
bne $t0 $zero loop
        ".trim();
        let sim = run_src(src, Default::default());
        assert_eq!(sim.reg_file[T0], 0);
        assert_eq!(sim.reg_file[T1], 3);
        assert_eq!(sim.instructions_run, 10);
    }

    #[test]
    fn test_branch_before_stream_ends() {
        // beq $zero $zero -5
        let obj = ObjectFile::from_words(TEXT_START, vec![0x1000_FFFB]);
        let mut sim = Simulator::new(Default::default());
        sim.load_obj_file(&obj);
        sim.run().unwrap();
        assert_eq!(sim.cursor(), -4);
        assert!(sim.hit_halt());
        assert_eq!(sim.instructions_run, 1);
    }

    #[test]
    fn test_nop_halts() {
        let sim = run_src("nop", Default::default());
        assert_eq!(sim.pc, TEXT_START);
        assert_eq!(sim.instructions_run, 0);
        assert!(sim.reg_file.as_slice().iter().all(|&v| v == 0));
        assert!(sim.hit_halt());

        // nothing past the nop runs
        let sim = run_src("addi $t0 $zero 1\nnop\naddi $t0 $zero 2", Default::default());
        assert_eq!(sim.reg_file[T0], 1);
        assert_eq!(sim.pc, TEXT_START + 4);
        assert_eq!(sim.cursor(), 1);
    }

    #[test]
    fn test_sll_zero_is_halt() {
        let sim = run_src("sll $zero $zero 0\naddi $t0 $zero 1", Default::default());
        assert_eq!(sim.reg_file[T0], 0);
        assert_eq!(sim.pc, TEXT_START);
    }

    #[test]
    fn test_duplicate_labels_resolve_first() {
        let src = "
beq $zero $zero dup
addi $t0 $zero 1
dup: addi $t1 $t1 1
dup: addi $t2 $zero 2
        ".trim();
        let sim = run_src(src, Default::default());
        assert_eq!(sim.reg_file[T0], 0);
        assert_eq!(sim.reg_file[T1], 1);
        assert_eq!(sim.reg_file[T2], 2);
    }

    #[test]
    fn test_zero_not_hardwired() {
        let sim = run_src("addi $zero $zero 5", Default::default());
        assert_eq!(sim.reg_file[ZERO], 5);

        let sim = run_src("addi $zero $zero 5", SimFlags { hardwire_zero: true, ..Default::default() });
        assert_eq!(sim.reg_file[ZERO], 0);
    }

    #[test]
    fn test_unknown_word() {
        let obj = ObjectFile::from_words(TEXT_START, vec![0xFC00_0000, 0x2008_0005]);

        let mut sim = Simulator::new(Default::default());
        sim.load_obj_file(&obj);
        sim.run().unwrap();
        assert_eq!(sim.reg_file[T0], 5);
        assert_eq!(sim.instructions_run, 2);
        assert_eq!(sim.pc, TEXT_START + 8);

        let mut sim = Simulator::new(SimFlags { strict: true, ..Default::default() });
        sim.load_obj_file(&obj);
        assert_eq!(sim.run(), Err(SimErr::IllegalInstruction { word: 0xFC00_0000, pc: TEXT_START }));
        assert_eq!(sim.reg_file[T0], 0);
        assert!(!sim.hit_halt());
    }

    #[test]
    fn test_run_with_limit() {
        let obj = assemble("loop: beq $zero $zero loop").unwrap();
        let mut sim = Simulator::new(Default::default());
        sim.load_obj_file(&obj);

        sim.run_with_limit(100).unwrap();
        assert_eq!(sim.instructions_run, 100);
        assert_eq!(sim.cursor(), 0);
        assert!(!sim.hit_halt());

        sim.run_with_limit(50).unwrap();
        assert_eq!(sim.instructions_run, 150);
    }

    #[test]
    fn test_step_in() {
        let obj = assemble("addi $t0 $zero 5\naddi $t0 $t0 5").unwrap();
        let mut sim = Simulator::new(Default::default());
        sim.load_obj_file(&obj);

        sim.step_in().unwrap();
        assert_eq!(sim.reg_file[T0], 5);
        assert_eq!(sim.pc, TEXT_START + 4);

        sim.step_in().unwrap();
        sim.step_in().unwrap();
        assert_eq!(sim.reg_file[T0], 10);
        assert_eq!(sim.pc, TEXT_START + 8);
        assert_eq!(sim.instructions_run, 2);
    }

    #[test]
    fn test_breakpoints() {
        let obj = assemble("addi $t0 $zero 5\naddi $t0 $t0 5\naddi $t1 $zero 1").unwrap();
        let mut sim = Simulator::new(Default::default());
        sim.load_obj_file(&obj);
        sim.breakpoints.insert(Breakpoint::Reg { reg: T0, value: Comparator::Eq(5) });

        sim.run().unwrap();
        assert!(sim.hit_breakpoint());
        assert_eq!(sim.instructions_run, 1);

        sim.run().unwrap();
        assert!(sim.hit_halt());
        assert_eq!(sim.reg_file[T0], 10);

        sim.reset();
        sim.breakpoints.clear();
        sim.breakpoints.insert(Breakpoint::PC(TEXT_START + 8));
        sim.run().unwrap();
        assert!(sim.hit_breakpoint());
        assert_eq!(sim.reg_file[T0], 10);
        assert_eq!(sim.reg_file[T1], 0);
    }

    #[test]
    fn test_pc_breakpoint_after_taken_branch() {
        let src = "
beq $zero $zero target
nop
target: addi $t0 $zero 1
nop
        ".trim();
        let obj = assemble(src).unwrap();
        let mut sim = Simulator::new(Default::default());
        sim.load_obj_file(&obj);
        sim.breakpoints.insert(Breakpoint::PC(TEXT_START + 8));

        sim.run().unwrap();
        assert!(sim.hit_breakpoint());
        assert_eq!(sim.instructions_run, 1);
        assert_eq!(sim.cursor(), 2);
        assert_eq!(sim.pc, TEXT_START + 4);
        assert_eq!(sim.next_addr(), TEXT_START + 8);
        assert_eq!(sim.reg_file[T0], 0);

        sim.run().unwrap();
        assert!(sim.hit_halt());
        assert_eq!(sim.reg_file[T0], 1);
    }

    #[test]
    fn test_reset() {
        let obj = assemble("addi $t0 $t0 5").unwrap();
        let flags = SimFlags { machine_init: MachineInitStrategy::Known { value: 1 }, ..Default::default() };
        let mut sim = Simulator::new(flags);
        sim.load_obj_file(&obj);

        sim.run().unwrap();
        assert_eq!(sim.reg_file[T0], 6);

        sim.reset();
        assert_eq!(sim.reg_file[T0], 1);
        assert_eq!(sim.pc, TEXT_START);
        assert_eq!(sim.instructions_run, 0);

        sim.run().unwrap();
        assert_eq!(sim.reg_file[T0], 6);
    }
}
