//! This module holds the nodes of an assembly source program.
//!
//! Each source line holds exactly one statement ([`Stmt`]),
//! which is an optional label followed by one instruction ([`AsmInstr`]).
//!
//! The set of instructions is closed: [`Opcode`] lists every mnemonic
//! the assembler recognizes.

use std::fmt::Write as _;
use std::ops::Range;

use super::{Imm16, Label, Reg, Shamt};

macro_rules! opcodes {
    ($($(#[$m:meta])* $Variant:ident = $mnemonic:literal, $argc:literal);+ $(;)?) => {
        /// The mnemonic of an instruction.
        ///
        /// This is the complete opcode table of the assembler.
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        pub enum Opcode {
            $($(#[$m])* $Variant),+
        }

        impl Opcode {
            /// Every opcode, in table order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$Variant),+];

            /// The assembly mnemonic for this opcode.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$Variant => $mnemonic),+
                }
            }

            /// The number of operands this opcode takes.
            pub fn operand_count(self) -> usize {
                match self {
                    $(Opcode::$Variant => $argc),+
                }
            }

            /// Looks up the opcode with the given mnemonic.
            ///
            /// Mnemonics are case-sensitive.
            ///
            /// ```
            /// use mipsette::ast::asm::Opcode;
            ///
            /// assert_eq!(Opcode::from_mnemonic("addi"), Some(Opcode::Addi));
            /// assert_eq!(Opcode::from_mnemonic("ADDI"), None);
            /// assert_eq!(Opcode::from_mnemonic("lw"), None);
            /// ```
            pub fn from_mnemonic(s: &str) -> Option<Self> {
                match s {
                    $($mnemonic => Some(Opcode::$Variant)),+,
                    _ => None
                }
            }
        }
    };
}
opcodes! {
    /// `nop`
    Nop  = "nop",  0;
    /// `add rd rs rt`
    Add  = "add",  3;
    /// `addi rt rs imm`
    Addi = "addi", 3;
    /// `andi rt rs imm`
    Andi = "andi", 3;
    /// `beq rs rt label`
    Beq  = "beq",  3;
    /// `bne rs rt label`
    Bne  = "bne",  3;
    /// `srl rd rt shamt`
    Srl  = "srl",  3;
    /// `sll rd rt shamt`
    Sll  = "sll",  3;
}
impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// An assembly source code instruction.
///
/// Operands are listed in source order.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum AsmInstr {
    /// A no-operation, which is also the halting sentinel.
    NOP,
    /// `rd ← rs + rt`
    ADD(Reg, Reg, Reg),
    /// `rt ← rs + sext(imm)`
    ADDI(Reg, Reg, Imm16),
    /// `rt ← rs & zext(imm)`
    ANDI(Reg, Reg, Imm16),
    /// Branch to target if `rs == rt`.
    BEQ(Reg, Reg, Label),
    /// Branch to target if `rs != rt`.
    BNE(Reg, Reg, Label),
    /// `rd ← rt >> shamt` (logical)
    SRL(Reg, Reg, Shamt),
    /// `rd ← rt << shamt`
    SLL(Reg, Reg, Shamt),
}
impl AsmInstr {
    /// The opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        match self {
            AsmInstr::NOP          => Opcode::Nop,
            AsmInstr::ADD(_, _, _)  => Opcode::Add,
            AsmInstr::ADDI(_, _, _) => Opcode::Addi,
            AsmInstr::ANDI(_, _, _) => Opcode::Andi,
            AsmInstr::BEQ(_, _, _)  => Opcode::Beq,
            AsmInstr::BNE(_, _, _)  => Opcode::Bne,
            AsmInstr::SRL(_, _, _)  => Opcode::Srl,
            AsmInstr::SLL(_, _, _)  => Opcode::Sll,
        }
    }
}
impl std::fmt::Display for AsmInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.opcode().mnemonic())?;
        match self {
            AsmInstr::NOP => Ok(()),
            AsmInstr::ADD(a, b, c)  => write!(f, " {a}, {b}, {c}"),
            AsmInstr::ADDI(a, b, c) => write!(f, " {a}, {b}, {c}"),
            AsmInstr::ANDI(a, b, c) => write!(f, " {a}, {b}, {c}"),
            AsmInstr::BEQ(a, b, c)  => write!(f, " {a}, {b}, {c}"),
            AsmInstr::BNE(a, b, c)  => write!(f, " {a}, {b}, {c}"),
            AsmInstr::SRL(a, b, c)  => write!(f, " {a}, {b}, {c}"),
            AsmInstr::SLL(a, b, c)  => write!(f, " {a}, {b}, {c}"),
        }
    }
}

/// A statement: one source line of an assembly program.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Stmt {
    /// The label prefixing this line, if one exists.
    pub label: Option<Label>,
    /// The instruction on this line.
    pub instr: AsmInstr,
    /// The span of the instruction (mnemonic and operands) within its line.
    pub span: Range<usize>
}
impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label}:")?;
            f.write_char(' ')?;
        }
        self.instr.fmt(f)
    }
}
