//! This module holds the bytecode form of instructions.
//!
//! A [`SimInstr`] is an instruction with every operand resolved
//! (branch labels are replaced by offsets). It can be encoded into
//! and decoded from the 32-bit instruction word executed by the simulator.
//!
//! Instruction words use the following layouts:
//!
//! ```text
//! R-type:  | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
//! I-type:  | op (6) | rs (5) | rt (5) |          imm (16)              |
//!            31-26    25-21    20-16    15-11      10-6        5-0
//! ```

use super::{IOffset, Imm16, Reg, Shamt};

const OP_SPECIAL: u32 = 0x00;
const OP_BEQ:     u32 = 0x04;
const OP_BNE:     u32 = 0x05;
const OP_ADDI:    u32 = 0x08;
const OP_ANDI:    u32 = 0x0C;

const FUNCT_SLL: u32 = 0x00;
const FUNCT_SRL: u32 = 0x02;
const FUNCT_ADD: u32 = 0x20;

/// A bytecode instruction.
///
/// Unlike [`AsmInstr`], operands are not listed in source order,
/// but named by the field they occupy in the instruction word.
///
/// [`AsmInstr`]: super::asm::AsmInstr
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SimInstr {
    /// The all-zero word. Halts execution.
    NOP,
    /// `ADD(rd, rs, rt)`
    ADD(Reg, Reg, Reg),
    /// `ADDI(rt, rs, imm)`
    ADDI(Reg, Reg, Imm16),
    /// `ANDI(rt, rs, imm)`
    ANDI(Reg, Reg, Imm16),
    /// `BEQ(rs, rt, offset)`
    BEQ(Reg, Reg, IOffset<16>),
    /// `BNE(rs, rt, offset)`
    BNE(Reg, Reg, IOffset<16>),
    /// `SRL(rd, rt, shamt)`
    SRL(Reg, Reg, Shamt),
    /// `SLL(rd, rt, shamt)`
    SLL(Reg, Reg, Shamt),
}

/// The raw fields of an instruction word.
///
/// Every field is extracted regardless of the instruction's format;
/// which fields are meaningful depends on `op` and `funct`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
struct Fields {
    op: u32,
    rs: Reg,
    rt: Reg,
    rd: Reg,
    shamt: Shamt,
    funct: u32,
    imm: u16,
}
impl Fields {
    fn extract(word: u32) -> Self {
        let reg = |shift: u32| Reg(((word >> shift) & 0x1F) as u8);

        Fields {
            op:    word >> 26,
            rs:    reg(21),
            rt:    reg(16),
            rd:    reg(11),
            shamt: Shamt::new_trunc(((word >> 6) & 0x1F) as u16),
            funct: word & 0x3F,
            imm:   (word & 0xFFFF) as u16,
        }
    }
}

fn r_type(funct: u32, rd: Reg, rs: Reg, rt: Reg, shamt: Shamt) -> u32 {
    (OP_SPECIAL << 26)
        | (u32::from(rs) << 21)
        | (u32::from(rt) << 16)
        | (u32::from(rd) << 11)
        | (u32::from(shamt.get()) << 6)
        | funct
}
fn i_type(op: u32, rs: Reg, rt: Reg, imm: i16) -> u32 {
    (op << 26)
        | (u32::from(rs) << 21)
        | (u32::from(rt) << 16)
        | u32::from(imm as u16)
}

impl SimInstr {
    /// Encodes this instruction as a 32-bit instruction word.
    ///
    /// ```
    /// use mipsette::ast::sim::SimInstr;
    /// use mipsette::ast::reg_consts::{T0, ZERO};
    /// use mipsette::ast::Imm16;
    ///
    /// let instr = SimInstr::ADDI(T0, ZERO, Imm16::new_wide(5).unwrap());
    /// assert_eq!(instr.encode(), 0x2008_0005);
    /// assert_eq!(SimInstr::NOP.encode(), 0);
    /// ```
    pub fn encode(self) -> u32 {
        let zero = Reg(0);
        let no_shamt = Shamt::new_trunc(0);

        match self {
            SimInstr::NOP => 0,
            SimInstr::ADD(rd, rs, rt)     => r_type(FUNCT_ADD, rd, rs, rt, no_shamt),
            SimInstr::ADDI(rt, rs, imm)   => i_type(OP_ADDI, rs, rt, imm.get()),
            SimInstr::ANDI(rt, rs, imm)   => i_type(OP_ANDI, rs, rt, imm.get()),
            SimInstr::BEQ(rs, rt, off)    => i_type(OP_BEQ, rs, rt, off.get()),
            SimInstr::BNE(rs, rt, off)    => i_type(OP_BNE, rs, rt, off.get()),
            SimInstr::SRL(rd, rt, shamt)  => r_type(FUNCT_SRL, rd, zero, rt, shamt),
            SimInstr::SLL(rd, rt, shamt)  => r_type(FUNCT_SLL, rd, zero, rt, shamt),
        }
    }

    /// Decodes a 32-bit instruction word.
    ///
    /// Decoding only inspects the opcode field (and the function field for R-type words).
    /// Bits that are not part of the decoded format are ignored.
    ///
    /// The all-zero word always decodes to [`SimInstr::NOP`]
    /// (note that `sll $zero, $zero, 0` also encodes to the all-zero word).
    ///
    /// This returns `None` if the word matches none of the supported instructions.
    ///
    /// ```
    /// use mipsette::ast::sim::SimInstr;
    /// use mipsette::ast::reg_consts::{T0, ZERO};
    /// use mipsette::ast::Imm16;
    ///
    /// assert_eq!(SimInstr::decode(0x2008_0005), Some(SimInstr::ADDI(T0, ZERO, Imm16::new_wide(5).unwrap())));
    /// assert_eq!(SimInstr::decode(0), Some(SimInstr::NOP));
    /// assert_eq!(SimInstr::decode(0x8C08_0000), None); // lw
    /// ```
    pub fn decode(word: u32) -> Option<Self> {
        if word == 0 {
            return Some(SimInstr::NOP);
        }

        let Fields { op, rs, rt, rd, shamt, funct, imm } = Fields::extract(word);
        let imm = Imm16::new_trunc(imm as i16);

        match (op, funct) {
            (OP_ADDI, _)            => Some(SimInstr::ADDI(rt, rs, imm)),
            (OP_ANDI, _)            => Some(SimInstr::ANDI(rt, rs, imm)),
            (OP_SPECIAL, FUNCT_ADD) => Some(SimInstr::ADD(rd, rs, rt)),
            (OP_SPECIAL, FUNCT_SRL) => Some(SimInstr::SRL(rd, rt, shamt)),
            (OP_SPECIAL, FUNCT_SLL) => Some(SimInstr::SLL(rd, rt, shamt)),
            (OP_BNE, _)             => Some(SimInstr::BNE(rs, rt, imm)),
            (OP_BEQ, _)             => Some(SimInstr::BEQ(rs, rt, imm)),
            _ => None
        }
    }
}
impl std::fmt::Display for SimInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimInstr::NOP => f.write_str("nop"),
            SimInstr::ADD(rd, rs, rt)    => write!(f, "add {rd}, {rs}, {rt}"),
            SimInstr::ADDI(rt, rs, imm)  => write!(f, "addi {rt}, {rs}, {imm}"),
            SimInstr::ANDI(rt, rs, imm)  => write!(f, "andi {rt}, {rs}, {:#06x}", imm.get() as u16),
            SimInstr::BEQ(rs, rt, off)   => write!(f, "beq {rs}, {rt}, {off}"),
            SimInstr::BNE(rs, rt, off)   => write!(f, "bne {rs}, {rt}, {off}"),
            SimInstr::SRL(rd, rt, shamt) => write!(f, "srl {rd}, {rt}, {shamt}"),
            SimInstr::SLL(rd, rt, shamt) => write!(f, "sll {rd}, {rt}, {shamt}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::*;
    use crate::ast::{IOffset, Imm16, Shamt};

    use super::SimInstr;

    fn imm(n: i64) -> Imm16 {
        Imm16::new_wide(n).unwrap()
    }
    fn shamt(n: i64) -> Shamt {
        Shamt::new_wide(n).unwrap()
    }
    fn off(n: i64) -> IOffset<16> {
        IOffset::new_wide(n).unwrap()
    }

    #[test]
    fn test_encode_layouts() {
        // addi $t0, $zero, 5
        assert_eq!(SimInstr::ADDI(T0, ZERO, imm(5)).encode(), 0x2008_0005);
        // addi $t0, $t0, -1
        assert_eq!(SimInstr::ADDI(T0, T0, imm(-1)).encode(), 0x2108_FFFF);
        // andi $t1, $t0, 0xFF
        assert_eq!(SimInstr::ANDI(T1, T0, imm(0xFF)).encode(), 0x3109_00FF);
        // add $t2, $t0, $t1
        assert_eq!(SimInstr::ADD(T2, T0, T1).encode(), 0x0109_5020);
        // sll $t2, $t1, 4
        assert_eq!(SimInstr::SLL(T2, T1, shamt(4)).encode(), 0x0009_5100);
        // srl $t2, $t1, 1
        assert_eq!(SimInstr::SRL(T2, T1, shamt(1)).encode(), 0x0009_5042);
        // beq $t0, $t1, +2
        assert_eq!(SimInstr::BEQ(T0, T1, off(2)).encode(), 0x1109_0002);
        // bne $t0, $zero, -3
        assert_eq!(SimInstr::BNE(T0, ZERO, off(-3)).encode(), 0x1500_FFFD);
    }

    #[test]
    fn test_decode_recovers_fields() {
        let instrs = [
            SimInstr::ADD(RA, SP, GP),
            SimInstr::ADDI(S7, A3, imm(-32768)),
            SimInstr::ANDI(K1, T9, imm(32767)),
            SimInstr::BEQ(V0, V1, off(-1)),
            SimInstr::BNE(FP, AT, off(100)),
            SimInstr::SRL(T8, S0, shamt(31)),
            SimInstr::SLL(T3, T4, shamt(17)),
            SimInstr::NOP,
        ];

        for instr in instrs {
            assert_eq!(SimInstr::decode(instr.encode()), Some(instr), "{instr} did not survive encoding");
        }
    }

    #[test]
    fn test_decode_zero_is_sentinel() {
        // sll $zero, $zero, 0 is indistinguishable from nop
        assert_eq!(SimInstr::SLL(ZERO, ZERO, shamt(0)).encode(), 0);
        assert_eq!(SimInstr::decode(0), Some(SimInstr::NOP));

        // ...but sll with any nonzero field is a real shift
        assert_eq!(SimInstr::decode(0x0000_0040), Some(SimInstr::SLL(ZERO, ZERO, shamt(1))));
    }

    #[test]
    fn test_decode_unmatched() {
        // lw $t0, 0($zero)
        assert_eq!(SimInstr::decode(0x8C08_0000), None);
        // j 0
        assert_eq!(SimInstr::decode(0x0800_0000), None);
        // sub $t2, $t0, $t1 (R-type with unsupported funct)
        assert_eq!(SimInstr::decode(0x0109_5022), None);
    }

    #[test]
    fn test_decode_ignores_unused_bits() {
        // add with a nonzero shamt field
        assert_eq!(SimInstr::decode(0x0109_50E0), Some(SimInstr::ADD(T2, T0, T1)));
        // srl with a nonzero rs field
        assert_eq!(SimInstr::decode(0x03E9_5042), Some(SimInstr::SRL(T2, T1, shamt(1))));
    }

    #[test]
    fn test_display() {
        assert_eq!(SimInstr::ANDI(T1, ZERO, imm(-1)).to_string(), "andi $t1, $zero, 0xffff");
        assert_eq!(SimInstr::BEQ(T0, T1, off(-2)).to_string(), "beq $t0, $t1, -2");
    }
}
