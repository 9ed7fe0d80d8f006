//! An assembler and emulator for a small subset of the MIPS instruction set.
//!
//! The supported instructions are `nop`, `add`, `addi`, `andi`, `beq`, `bne`, `srl`, and `sll`.
//! Each source line assembles into exactly one 32-bit instruction word.
//!
//! # Usage
//!
//! To convert source code to an object file, it must be assembled:
//! ```
//! use mipsette::asm::{assemble, assemble_debug, ObjectFile};
//!
//! let code = "
//! addi $t0 $zero 3
//! loop: addi $t0 $t0 -1
//! bne $t0 $zero loop
//! ".trim();
//!
//! let obj_file: ObjectFile = assemble(code).unwrap();
//! // OR, keeping the symbol table:
//! let obj_file: ObjectFile = assemble_debug(code).unwrap();
//!
//! assert_eq!(obj_file.listing().lines().next(), Some("0x00400000 0x20080003"));
//! ```
//!
//! Once an object file has been created, it can be executed with the simulator:
//! ```
//! # use mipsette::asm::assemble;
//! # let obj_file = assemble("addi $t0 $zero 3").unwrap();
//! use mipsette::sim::Simulator;
//!
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load_obj_file(&obj_file);
//! simulator.run().unwrap(); // <-- Result can be handled accordingly
//! ```
//!
//! If more granularity is needed for simulation, there are also step and breakpoint functions.
//! See the [`sim`] module for more details.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod err;
