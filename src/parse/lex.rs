//! Tokenizing assembly source lines.
//!
//! This module holds the tokens that make up a line of assembly ([`Token`]).
//! The parser pulls tokens from this module lazily, one operand at a time,
//! so anything past the last operand an instruction needs is never tokenized.

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

use crate::ast::Reg;

/// A unit of information in an assembly source line.
#[derive(Debug, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+", error = LexErr)]
pub enum Token {
    // These also match malformed literals (e.g., 12ab, 0xZZ),
    // which the callbacks reject as a single token.

    /// A decimal integer literal (e.g., `5`, `-7`).
    #[regex(r"\d\w*", lex_dec)]
    #[regex(r"-\w*", lex_dec)]
    Dec(i64),

    /// A hexadecimal integer literal (e.g., `0x1F`, `-0x10`).
    #[regex(r"0[Xx]\w*", lex_hex)]
    #[regex(r"-0[Xx]\w*", lex_hex)]
    Hex(i64),

    /// A register (e.g., `$zero`, `$t0`, `$ra`).
    #[regex(r"\$\w*", lex_reg)]
    Reg(Reg),

    /// An identifier.
    ///
    /// This can refer to either a mnemonic (e.g., `addi`, `beq`) or a label (e.g., `loop`, `done`).
    /// Identifiers are case-sensitive.
    #[regex(r"[A-Za-z_.][\w.]*", |lx| lx.slice().to_string())]
    Ident(String),

    /// A colon, which terminates a label.
    #[token(":")]
    Colon,

    /// A comma, which can optionally delineate operands of an instruction.
    #[token(",")]
    Comma,
}

/// Any errors raised in attempting to tokenize an input line.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum LexErr {
    /// Numeric literal cannot fit within the range of a i64
    DoesNotFitI64,
    /// Hex literal (starting with 0x) has invalid hex digits
    InvalidHex,
    /// Numeric literal could not be parsed as a decimal literal because it has invalid digits (i.e., not 0-9)
    InvalidNumeric,
    /// Hex literal (starting with 0x) doesn't have digits after it
    InvalidHexEmpty,
    /// Numeric literal could not be parsed as a decimal literal because there are no digits in it (it's just -)
    InvalidDecEmpty,
    /// Int parsing failed but the reason why is unknown
    UnknownIntErr,
    /// Token started with `$`, but isn't the name of any register
    InvalidReg,
    /// A symbol was used which is not allowed in assembly source
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::DoesNotFitI64   => f.write_str("numeric literal is too large"),
            LexErr::InvalidHex      => f.write_str("invalid hex literal"),
            LexErr::InvalidNumeric  => f.write_str("invalid decimal literal"),
            LexErr::InvalidHexEmpty => f.write_str("invalid hex literal"),
            LexErr::InvalidDecEmpty => f.write_str("invalid decimal literal"),
            LexErr::UnknownIntErr   => f.write_str("could not parse integer"),
            LexErr::InvalidReg      => f.write_str("unknown register"),
            LexErr::InvalidSymbol   => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::DoesNotFitI64    => Some("immediates are at most 16 bits wide".into()),
            LexErr::InvalidHex       => Some("a hex literal starts with '0x' and consists of 0-9, A-F".into()),
            LexErr::InvalidNumeric   => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::InvalidHexEmpty  => Some("there should be hex digits (0-9, A-F) here".into()),
            LexErr::InvalidDecEmpty  => Some("there should be digits (0-9) here".into()),
            LexErr::UnknownIntErr    => None,
            LexErr::InvalidReg       => Some(reg_help().into()),
            LexErr::InvalidSymbol    => Some("this char does not occur in any token in assembly source".into()),
        }
    }
}

pub(crate) fn reg_help() -> String {
    format!("registers are {}", crate::ast::REG_NAMES.join(", "))
}

/// Helper that converts an int error kind to its corresponding LexErr, based on the provided inputs.
fn convert_int_error(
    e: &std::num::IntErrorKind,
    invalid_digits_err: LexErr,
    empty_err: LexErr,
    src: &str
) -> LexErr {
    match e {
        IntErrorKind::Empty        => empty_err,
        IntErrorKind::InvalidDigit if src == "-" => empty_err,
        IntErrorKind::InvalidDigit => invalid_digits_err,
        IntErrorKind::PosOverflow  => LexErr::DoesNotFitI64,
        IntErrorKind::NegOverflow  => LexErr::DoesNotFitI64,
        _ => LexErr::UnknownIntErr,
    }
}
fn lex_dec(lx: &Lexer<'_, Token>) -> Result<i64, LexErr> {
    let string = lx.slice();

    string.parse::<i64>()
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidNumeric, LexErr::InvalidDecEmpty, string))
}
fn lex_hex(lx: &Lexer<'_, Token>) -> Result<i64, LexErr> {
    let (negative, lit) = match lx.slice().strip_prefix('-') {
        Some(lit) => (true, lit),
        None => (false, lx.slice()),
    };
    let Some(hex) = lit.strip_prefix("0x").or_else(|| lit.strip_prefix("0X")) else {
        unreachable!("Lexer slice should have started with 0x or 0X");
    };

    // from_str_radix would accept a second sign here
    if hex.starts_with(['+', '-']) {
        return Err(LexErr::InvalidHex);
    }

    i64::from_str_radix(hex, 16)
        .map(|n| if negative { -n } else { n })
        .map_err(|e| convert_int_error(e.kind(), LexErr::InvalidHex, LexErr::InvalidHexEmpty, hex))
}
fn lex_reg(lx: &Lexer<'_, Token>) -> Result<Reg, LexErr> {
    Reg::from_name(lx.slice())
        .ok_or(LexErr::InvalidReg)
}
