//! Parsing assembly source lines into statements.
//!
//! Each source line holds exactly one statement, with the grammar
//! `[label:] mnemonic [arg1 [arg2 [arg3]]]`. Operands are separated by whitespace
//! and optionally by commas.
//!
//! The key function of this module is [`parse_line`], which parses a line into a [`Stmt`].
//!
//! ```
//! use mipsette::parse::parse_line;
//! use mipsette::ast::asm::AsmInstr;
//! use mipsette::ast::reg_consts::{T0, ZERO};
//! use mipsette::ast::Imm16;
//!
//! let stmt = parse_line("start: addi $t0 $zero 5").unwrap();
//! assert_eq!(stmt.label.map(|l| l.name), Some("start".to_string()));
//! assert_eq!(stmt.instr, AsmInstr::ADDI(T0, ZERO, Imm16::new_wide(5).unwrap()));
//! ```

pub mod lex;

use std::borrow::Cow;
use std::ops::Range;

use logos::{Lexer, Logos};

use crate::ast::asm::{AsmInstr, Opcode, Stmt};
use crate::ast::{Imm16, Label, OffsetNewErr, Reg, Shamt};
use lex::{LexErr, Token};

/// The maximum number of characters in a source line.
pub const MAX_LINE_LEN: usize = 100;

/// Any error that occurs while parsing a source line.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErr {
    /// The kind of error.
    pub kind: ParseErrKind,
    /// The character range within the line where the error occurred.
    pub span: Range<usize>
}
impl ParseErr {
    fn new(kind: ParseErrKind, span: Range<usize>) -> Self {
        ParseErr { kind, span }
    }
}

/// The kinds of errors that can occur while parsing a source line.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseErrKind {
    /// A token could not be read.
    Lex(LexErr),
    /// The line is longer than [`MAX_LINE_LEN`].
    LineTooLong,
    /// The line has no mnemonic.
    ExpectedMnemonic,
    /// The text before `:` is empty or contains whitespace.
    InvalidLabel,
    /// The mnemonic is not in the opcode table.
    UnknownOpcode(String),
    /// A register operand does not name any register.
    UnknownRegister,
    /// The line ended before the instruction received all of its operands.
    MissingOperand(Opcode),
    /// Expected a register operand here.
    ExpectedRegister,
    /// Expected an integer operand here.
    ExpectedImmediate,
    /// An integer operand is out of range.
    OffsetNewErr(OffsetNewErr),
}
impl From<LexErr> for ParseErrKind {
    fn from(value: LexErr) -> Self {
        match value {
            LexErr::InvalidReg => ParseErrKind::UnknownRegister,
            e => ParseErrKind::Lex(e),
        }
    }
}
impl From<OffsetNewErr> for ParseErrKind {
    fn from(value: OffsetNewErr) -> Self {
        ParseErrKind::OffsetNewErr(value)
    }
}

impl std::fmt::Display for ParseErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrKind::Lex(e)              => e.fmt(f),
            ParseErrKind::LineTooLong         => write!(f, "line is longer than {MAX_LINE_LEN} characters"),
            ParseErrKind::ExpectedMnemonic    => f.write_str("expected instruction mnemonic"),
            ParseErrKind::InvalidLabel        => f.write_str("invalid label"),
            ParseErrKind::UnknownOpcode(s)    => write!(f, "unknown opcode '{s}'"),
            ParseErrKind::UnknownRegister     => f.write_str("unknown register"),
            ParseErrKind::MissingOperand(op)  => write!(f, "missing operand for '{op}'"),
            ParseErrKind::ExpectedRegister    => f.write_str("expected register"),
            ParseErrKind::ExpectedImmediate   => f.write_str("expected integer"),
            ParseErrKind::OffsetNewErr(e)     => e.fmt(f),
        }
    }
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for ParseErr {}
impl crate::err::Error for ParseErr {
    fn span(&self) -> Option<Range<usize>> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<Cow<str>> {
        self.kind.help()
    }
}
impl ParseErrKind {
    /// A help message describing how to fix the error, if one exists.
    pub fn help(&self) -> Option<Cow<str>> {
        use crate::err::Error;

        let mnemonics = || {
            let list: Vec<_> = Opcode::ALL.iter().map(|op| op.mnemonic()).collect();
            Cow::from(format!("valid mnemonics are {}", list.join(", ")))
        };

        match self {
            ParseErrKind::Lex(e)             => e.help(),
            ParseErrKind::LineTooLong        => Some(format!("lines are limited to {MAX_LINE_LEN} characters").into()),
            ParseErrKind::ExpectedMnemonic   => Some(mnemonics()),
            ParseErrKind::InvalidLabel       => Some("a label is a single word with no spaces, followed by a colon (e.g., `loop:`)".into()),
            ParseErrKind::UnknownOpcode(_)   => Some(mnemonics()),
            ParseErrKind::UnknownRegister    => Some(lex::reg_help().into()),
            ParseErrKind::MissingOperand(op) => Some(format!("'{op}' takes {} operands", op.operand_count()).into()),
            ParseErrKind::ExpectedRegister   => Some("registers start with '$' (e.g., `$t0`)".into()),
            ParseErrKind::ExpectedImmediate  => Some("this must be a decimal or hex (0x) integer".into()),
            ParseErrKind::OffsetNewErr(e)    => e.help(),
        }
    }
}

/// Parses the label prefix of a source line, if the line has one.
///
/// A label is the text before the first `:` on the line (ignoring surrounding whitespace).
/// It can hold any characters except whitespace.
///
/// ```
/// use mipsette::parse::parse_label;
///
/// let label = parse_label("  loop: addi $t0 $t0 -1").unwrap().unwrap();
/// assert_eq!(label.name, "loop");
/// assert_eq!(label.span(), 2..6);
///
/// assert_eq!(parse_label("x-1: nop").unwrap().unwrap().name, "x-1");
/// assert_eq!(parse_label("addi $t0 $t0 -1"), Ok(None));
/// assert!(parse_label("not a label: nop").is_err());
/// ```
pub fn parse_label(line: &str) -> Result<Option<Label>, ParseErr> {
    let Some((prefix, _)) = line.split_once(':') else {
        return Ok(None);
    };

    let name = prefix.trim();
    let start = prefix.len() - prefix.trim_start().len();
    let span = start..(start + name.len());

    if name.is_empty() {
        // point at the colon
        return Err(ParseErr::new(ParseErrKind::InvalidLabel, prefix.len()..(prefix.len() + 1)));
    }
    if name.contains(char::is_whitespace) {
        return Err(ParseErr::new(ParseErrKind::InvalidLabel, span));
    }

    Ok(Some(Label::new(name.to_string(), span)))
}

/// Parses one source line into a statement.
///
/// Tokens past the last operand of the instruction are ignored.
///
/// ```
/// use mipsette::parse::{parse_line, ParseErrKind};
/// use mipsette::ast::asm::Opcode;
///
/// assert!(parse_line("add $t2, $t0, $t1").is_ok());
/// assert_eq!(parse_line("").unwrap_err().kind, ParseErrKind::ExpectedMnemonic);
/// assert_eq!(parse_line("mul $t0 $t1 $t2").unwrap_err().kind, ParseErrKind::UnknownOpcode("mul".to_string()));
/// assert_eq!(parse_line("add $t0 $t1").unwrap_err().kind, ParseErrKind::MissingOperand(Opcode::Add));
/// ```
pub fn parse_line(line: &str) -> Result<Stmt, ParseErr> {
    if line.chars().count() > MAX_LINE_LEN {
        return Err(ParseErr::new(ParseErrKind::LineTooLong, MAX_LINE_LEN..line.len()));
    }

    let label = parse_label(line)?;
    let body_start = match label {
        Some(_) => line.find(':').map_or(0, |i| i + 1),
        None => 0,
    };

    let mut parser = LineParser::new(line, body_start);
    let (opcode, mnemonic_span) = parser.mnemonic()?;

    let instr = match opcode {
        Opcode::Nop  => AsmInstr::NOP,
        Opcode::Add  => AsmInstr::ADD(parser.reg(opcode)?, parser.reg(opcode)?, parser.reg(opcode)?),
        Opcode::Addi => AsmInstr::ADDI(parser.reg(opcode)?, parser.reg(opcode)?, parser.imm16(opcode)?),
        Opcode::Andi => AsmInstr::ANDI(parser.reg(opcode)?, parser.reg(opcode)?, parser.zimm16(opcode)?),
        Opcode::Beq  => AsmInstr::BEQ(parser.reg(opcode)?, parser.reg(opcode)?, parser.target(opcode)?),
        Opcode::Bne  => AsmInstr::BNE(parser.reg(opcode)?, parser.reg(opcode)?, parser.target(opcode)?),
        Opcode::Srl  => AsmInstr::SRL(parser.reg(opcode)?, parser.reg(opcode)?, parser.shamt(opcode)?),
        Opcode::Sll  => AsmInstr::SLL(parser.reg(opcode)?, parser.reg(opcode)?, parser.shamt(opcode)?),
    };

    Ok(Stmt {
        label,
        instr,
        span: mnemonic_span.start..parser.last_end
    })
}

/// Pulls tokens from one line, offsetting spans to be relative to the start of the line.
struct LineParser<'s> {
    lexer: Lexer<'s, Token>,
    line: &'s str,
    offset: usize,
    last_end: usize,
}
impl<'s> LineParser<'s> {
    fn new(line: &'s str, offset: usize) -> Self {
        LineParser {
            lexer: Token::lexer(&line[offset..]),
            line,
            offset,
            last_end: offset,
        }
    }

    fn span(&self) -> Range<usize> {
        let Range { start, end } = self.lexer.span();
        (start + self.offset)..(end + self.offset)
    }

    /// Span pointing right past the end of the line's content.
    fn eol_span(&self) -> Range<usize> {
        let end = self.line.trim_end().len();
        end..(end + 1)
    }

    /// Gets the next non-comma token.
    fn next_token(&mut self) -> Result<Option<(Token, Range<usize>)>, ParseErr> {
        loop {
            match self.lexer.next() {
                None => return Ok(None),
                Some(Ok(Token::Comma)) => continue,
                Some(Ok(token)) => {
                    let span = self.span();
                    self.last_end = span.end;
                    return Ok(Some((token, span)));
                },
                Some(Err(e)) => return Err(ParseErr::new(e.into(), self.span())),
            }
        }
    }

    /// Gets the next operand token, failing if the line has run out.
    fn operand(&mut self, opcode: Opcode) -> Result<(Token, Range<usize>), ParseErr> {
        self.next_token()?
            .ok_or_else(|| ParseErr::new(ParseErrKind::MissingOperand(opcode), self.eol_span()))
    }

    fn mnemonic(&mut self) -> Result<(Opcode, Range<usize>), ParseErr> {
        match self.next_token()? {
            Some((Token::Ident(name), span)) => match Opcode::from_mnemonic(&name) {
                Some(opcode) => Ok((opcode, span)),
                None => Err(ParseErr::new(ParseErrKind::UnknownOpcode(name), span)),
            },
            Some((_, span)) => Err(ParseErr::new(ParseErrKind::ExpectedMnemonic, span)),
            None => {
                let span = match self.line.trim().is_empty() {
                    true  => 0..self.line.len().max(1),
                    false => self.eol_span(),
                };
                Err(ParseErr::new(ParseErrKind::ExpectedMnemonic, span))
            }
        }
    }

    fn reg(&mut self, opcode: Opcode) -> Result<Reg, ParseErr> {
        match self.operand(opcode)? {
            (Token::Reg(reg), _) => Ok(reg),
            (_, span) => Err(ParseErr::new(ParseErrKind::ExpectedRegister, span)),
        }
    }

    fn int(&mut self, opcode: Opcode) -> Result<(Token, Range<usize>), ParseErr> {
        match self.operand(opcode)? {
            tok @ (Token::Dec(_) | Token::Hex(_), _) => Ok(tok),
            (_, span) => Err(ParseErr::new(ParseErrKind::ExpectedImmediate, span)),
        }
    }

    /// A sign-extended immediate.
    fn imm16(&mut self, opcode: Opcode) -> Result<Imm16, ParseErr> {
        match self.int(opcode)? {
            (Token::Hex(n) | Token::Dec(n), span) => Imm16::new_wide(n)
                .map_err(|e| ParseErr::new(e.into(), span)),
            _ => unreachable!("int should only return numeric tokens"),
        }
    }

    /// A zero-extended immediate.
    ///
    /// Besides the signed 16-bit range, a hex literal may spell out the raw 16 bits (e.g., `0xFFFF`).
    fn zimm16(&mut self, opcode: Opcode) -> Result<Imm16, ParseErr> {
        let (token, span) = self.int(opcode)?;
        let result = match token {
            Token::Hex(n @ 0x8000..=0xFFFF) => Ok(Imm16::new_trunc(n as u16 as i16)),
            Token::Hex(n) | Token::Dec(n) => Imm16::new_wide(n),
            _ => unreachable!("int should only return numeric tokens"),
        };
        result.map_err(|e| ParseErr::new(e.into(), span))
    }

    fn shamt(&mut self, opcode: Opcode) -> Result<Shamt, ParseErr> {
        match self.int(opcode)? {
            (Token::Hex(n) | Token::Dec(n), span) => Shamt::new_wide(n)
                .map_err(|e| ParseErr::new(e.into(), span)),
            _ => unreachable!("int should only return numeric tokens"),
        }
    }

    /// A branch target: the raw text of the next operand, taken as a label.
    ///
    /// This bypasses the lexer, since a label can contain any non-whitespace characters.
    fn target(&mut self, opcode: Opcode) -> Result<Label, ParseErr> {
        let is_sep = |c: char| c.is_whitespace() || c == ',';

        let rest = self.lexer.remainder();
        let word = rest.trim_start_matches(is_sep);
        let skipped = rest.len() - word.len();
        let len = word.find(is_sep).unwrap_or(word.len());
        if len == 0 {
            return Err(ParseErr::new(ParseErrKind::MissingOperand(opcode), self.eol_span()));
        }

        let start = self.offset + self.lexer.span().end + skipped;
        self.lexer.bump(skipped + len);
        self.last_end = start + len;

        Ok(Label::new(word[..len].to_string(), start..(start + len)))
    }
}
