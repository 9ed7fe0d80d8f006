//! Assembling assembly source lines into object files.
//!
//! This module is used to convert source lines into object files
//! that can be executed by the simulator.
//!
//! Assembly produces exactly one instruction word per source line,
//! so a line's index in the source is also its index in the instruction stream.
//!
//! The assembler module notably consists of:
//! - [`assemble`] and [`assemble_debug`]: The main functions which assemble source code into an object file.
//! - [`SymbolTable`]: a struct holding the symbol table, which maps labels to the lines they're defined on
//! - [`ObjectFile`]: a struct holding the object file, which can be loaded into the simulator and executed

pub mod encoding;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ops::Range;

use crate::ast::asm::AsmInstr;
use crate::ast::sim::SimInstr;
use crate::ast::{IOffset, Label, OffsetNewErr};
use crate::parse::{parse_label, parse_line, ParseErr, ParseErrKind};

/// The address of the first instruction of an object file (the start of the `.text` segment).
pub const TEXT_START: u32 = 0x0040_0000;

/// Assembles assembly source code into an object file.
///
/// This function assembles the source *without* including the symbol table
/// in the object file.
///
/// # Example
/// ```
/// use mipsette::asm::assemble;
///
/// let src = "
///     addi $t0 $zero 5
///     loop: addi $t0 $t0 -1
///     bne $t0 $zero loop
/// ";
/// let obj_file = assemble(src.trim());
/// assert!(obj_file.is_ok());
///
/// let obj_file = obj_file.unwrap();
/// assert_eq!(obj_file.len(), 3);
/// assert!(obj_file.symbol_table().is_none());
/// ```
pub fn assemble(src: &str) -> Result<ObjectFile, AsmErr> {
    let lines: Vec<_> = src.lines().collect();
    assemble_lines(&lines, false)
}
/// Assembles assembly source code into an object file.
///
/// This function assembles the source *and* includes the symbol table
/// in the object file.
///
/// # Example
/// ```
/// use mipsette::asm::assemble_debug;
///
/// let src = "nop\nend: nop";
/// let obj_file = assemble_debug(src).unwrap();
///
/// let sym = obj_file.symbol_table().unwrap();
/// assert_eq!(sym.lookup_label("end"), Some(1));
/// ```
pub fn assemble_debug(src: &str) -> Result<ObjectFile, AsmErr> {
    let lines: Vec<_> = src.lines().collect();
    assemble_lines(&lines, true)
}
/// Assembles an ordered buffer of source lines into an object file.
///
/// Lines are assembled strictly in order, and the first error aborts assembly.
/// If `debug` is set, the symbol table is kept in the object file.
///
/// Each assembled line is logged (at the `info` level) as a trace record:
/// the instruction's address followed by its instruction word.
pub fn assemble_lines<S: AsRef<str>>(lines: &[S], debug: bool) -> Result<ObjectFile, AsmErr> {
    let sym = SymbolTable::new(lines);
    ObjectFile::new(lines, sym, debug)
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with line and span information included.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AsmErrKind {
    /// The line could not be parsed.
    Parse(ParseErrKind),
    /// Creating the offset to replace a label caused overflow.
    OffsetNewErr(OffsetNewErr),
    /// No line defines the label.
    CouldNotFindLabel,
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e)          => e.fmt(f),
            Self::OffsetNewErr(e)   => write!(f, "branch offset {e}"),
            Self::CouldNotFindLabel => f.write_str("label could not be found"),
        }
    }
}

/// Error from assembling given assembly code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// The (0-indexed) line the error occurred on.
    pub line: usize,
    /// The span within the line associated with this error.
    pub span: Range<usize>
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(kind: AsmErrKind, line: usize, span: Range<usize>) -> Self {
        AsmErr { kind, line, span }
    }

    fn from_parse(err: ParseErr, line: usize) -> Self {
        AsmErr::new(AsmErrKind::Parse(err.kind), line, err.span)
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for AsmErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AsmErrKind::OffsetNewErr(e) => Some(e),
            AsmErrKind::Parse(ParseErrKind::OffsetNewErr(e)) => Some(e),
            AsmErrKind::Parse(ParseErrKind::Lex(e)) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for AsmErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn span(&self) -> Option<Range<usize>> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::Parse(e)          => e.help(),
            AsmErrKind::OffsetNewErr(e)   => crate::err::Error::help(e),
            AsmErrKind::CouldNotFindLabel => Some("try adding this label before an instruction".into()),
        }
    }
}

/// The symbol table created in the first assembler pass,
/// mapping each label to the line it is defined on.
///
/// A label is defined by the text preceding the `:` of a line. If several lines
/// define the same label, the first of them (in line order) is used, and the
/// later definitions are logged as warnings.
///
/// If the symbol table is kept after assembly (see [`assemble_debug`]),
/// it is accessible through [`ObjectFile::symbol_table`].
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SymbolTable {
    /// A mapping from label to the line it is defined on and the start of the label in that line.
    label_map: HashMap<String, (usize, usize)>,
}

impl SymbolTable {
    /// Creates a new symbol table.
    ///
    /// This performs the first assembler pass, scanning every line for a label.
    /// Lines whose label prefix is malformed are skipped here;
    /// they are reported when the line itself is assembled.
    ///
    /// ## Example
    /// ```
    /// use mipsette::asm::SymbolTable;
    ///
    /// let src = [
    ///     "start: addi $t0 $zero 1",
    ///     "loop: add $t1 $t1 $t0",
    ///     "loop: nop",
    /// ];
    ///
    /// let sym = SymbolTable::new(&src);
    /// assert_eq!(sym.lookup_label("start"), Some(0));
    /// assert_eq!(sym.lookup_label("loop"), Some(1));
    /// assert_eq!(sym.lookup_label("LOOP"), None);
    /// ```
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut label_map = HashMap::new();

        for (lno, line) in lines.iter().enumerate() {
            let Ok(Some(label)) = parse_label(line.as_ref()) else { continue };
            let start = label.span().start;

            match label_map.entry(label.name) {
                Entry::Vacant(e) => {
                    e.insert((lno, start));
                },
                Entry::Occupied(e) => {
                    let &(first, _) = e.get();
                    log::warn!("label '{}' on line {lno} was already defined on line {first}; branches will use line {first}", e.key());
                }
            }
        }

        SymbolTable { label_map }
    }

    /// Gets the line index (which is also the instruction index) of a given label (if it exists).
    pub fn lookup_label(&self, label: &str) -> Option<usize> {
        self.label_map.get(label).map(|&(line, _)| line)
    }

    /// Gets the label defined on a given line (if it exists).
    ///
    /// ## Example
    /// ```
    /// use mipsette::asm::SymbolTable;
    ///
    /// let sym = SymbolTable::new(&["nop", "done: nop"]);
    /// assert_eq!(sym.rev_lookup_label(1), Some("done"));
    /// assert_eq!(sym.rev_lookup_label(0), None);
    /// ```
    pub fn rev_lookup_label(&self, line: usize) -> Option<&str> {
        let (label, _) = self.label_map.iter()
            .find(|&(_, &(lno, _))| lno == line)?;

        Some(label)
    }

    /// Gets the source span of a given label within its line (if it exists).
    pub fn get_label_source(&self, label: &str) -> Option<Range<usize>> {
        self.label_map.get(label)
            .map(|&(_, start)| start..(start + label.len()))
    }

    /// Gets an iterable of the mapping from labels to lines, in line order.
    pub fn label_iter(&self) -> impl Iterator<Item=(&str, usize)> + '_ {
        let mut labels: Vec<_> = self.label_map.iter()
            .map(|(label, &(line, _))| (&**label, line))
            .collect();
        labels.sort_by_key(|&(_, line)| line);

        labels.into_iter()
    }

    /// Creates a symbol table from raw entries of (label, line, label start).
    pub(crate) fn from_entries(entries: impl IntoIterator<Item=(String, usize, usize)>) -> Self {
        let label_map = entries.into_iter()
            .map(|(label, line, start)| (label, (line, start)))
            .collect();

        SymbolTable { label_map }
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item=(&str, usize, usize)> + '_ {
        self.label_map.iter()
            .map(|(label, &(line, start))| (&**label, line, start))
    }
}

/// Computes the instruction offset from a branch on the given line to a label's line.
///
/// The offset is relative to the instruction after the branch.
fn resolve_label(label: Label, line: usize, sym: &SymbolTable) -> Result<IOffset<16>, AsmErr> {
    let Some(target) = sym.lookup_label(&label.name) else {
        return Err(AsmErr::new(AsmErrKind::CouldNotFindLabel, line, label.span()));
    };

    IOffset::new_wide(target as i64 - line as i64 - 1)
        .map_err(|e| AsmErr::new(AsmErrKind::OffsetNewErr(e), line, label.span()))
}

impl AsmInstr {
    /// Converts an ASM instruction into a simulator instruction ([`SimInstr`])
    /// by resolving branch labels into offsets.
    ///
    /// Parameters:
    /// - `line`: The line (and instruction index) this instruction is on
    /// - `sym`: The symbol table
    pub fn into_sim_instr(self, line: usize, sym: &SymbolTable) -> Result<SimInstr, AsmErr> {
        match self {
            AsmInstr::NOP                => Ok(SimInstr::NOP),
            AsmInstr::ADD(rd, rs, rt)    => Ok(SimInstr::ADD(rd, rs, rt)),
            AsmInstr::ADDI(rt, rs, imm)  => Ok(SimInstr::ADDI(rt, rs, imm)),
            AsmInstr::ANDI(rt, rs, imm)  => Ok(SimInstr::ANDI(rt, rs, imm)),
            AsmInstr::BEQ(rs, rt, label) => Ok(SimInstr::BEQ(rs, rt, resolve_label(label, line, sym)?)),
            AsmInstr::BNE(rs, rt, label) => Ok(SimInstr::BNE(rs, rt, resolve_label(label, line, sym)?)),
            AsmInstr::SRL(rd, rt, shamt) => Ok(SimInstr::SRL(rd, rt, shamt)),
            AsmInstr::SLL(rd, rt, shamt) => Ok(SimInstr::SLL(rd, rt, shamt)),
        }
    }
}

/// An object file.
///
/// This is the final product after assembly source code is fully assembled:
/// the instruction stream, along with the address the stream is loaded at.
/// This can be loaded in the simulator to run the assembled code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObjectFile {
    /// The address of the first instruction word.
    base: u32,

    /// The instruction stream, one word per source line.
    words: Vec<u32>,

    /// Symbol table, if it was kept.
    sym: Option<SymbolTable>
}
impl ObjectFile {
    /// Creates an empty object file.
    pub fn empty() -> Self {
        ObjectFile { base: TEXT_START, words: vec![], sym: None }
    }

    /// Creates an object file from an already assembled instruction stream.
    ///
    /// ```
    /// use mipsette::asm::{ObjectFile, TEXT_START};
    ///
    /// let obj = ObjectFile::from_words(TEXT_START, vec![0x2008_0005, 0]);
    /// assert_eq!(obj.len(), 2);
    /// ```
    pub fn from_words(base: u32, words: Vec<u32>) -> Self {
        ObjectFile { base, words, sym: None }
    }

    /// Creates a new object file from source lines and a symbol table (second assembler pass).
    fn new<S: AsRef<str>>(lines: &[S], sym: SymbolTable, debug: bool) -> Result<Self, AsmErr> {
        let mut words = Vec::with_capacity(lines.len());

        for (lno, line) in lines.iter().enumerate() {
            let stmt = parse_line(line.as_ref())
                .map_err(|e| AsmErr::from_parse(e, lno))?;
            let word = stmt.instr
                .into_sim_instr(lno, &sym)?
                .encode();

            log::info!("{:#010x} {:#010x}", line_addr(TEXT_START, lno), word);
            words.push(word);
        }

        Ok(ObjectFile {
            base: TEXT_START,
            words,
            sym: debug.then_some(sym)
        })
    }

    pub(crate) fn with_symbol_table(mut self, sym: Option<SymbolTable>) -> Self {
        self.sym = sym;
        self
    }

    /// The address of the first instruction word.
    pub fn base(&self) -> u32 {
        self.base
    }
    /// The instruction stream.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
    /// The number of instruction words.
    pub fn len(&self) -> usize {
        self.words.len()
    }
    /// Whether the instruction stream is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
    /// Gets an iterator over the address and value of each instruction word.
    pub fn addr_iter(&self) -> impl Iterator<Item=(u32, u32)> + '_ {
        self.words.iter()
            .enumerate()
            .map(|(i, &word)| (line_addr(self.base, i), word))
    }
    /// Renders the assembly trace: one `0xADDRESS 0xWORD` line per instruction.
    ///
    /// ```
    /// use mipsette::asm::assemble;
    ///
    /// let obj = assemble("addi $t0 $zero 5\nnop").unwrap();
    /// assert_eq!(obj.listing(), "0x00400000 0x20080005\n0x00400004 0x00000000\n");
    /// ```
    pub fn listing(&self) -> String {
        self.addr_iter()
            .map(|(addr, word)| format!("{addr:#010x} {word:#010x}\n"))
            .collect()
    }
    /// Gets the symbol table if it is present in the object file.
    pub fn symbol_table(&self) -> Option<&SymbolTable> {
        self.sym.as_ref()
    }
}
impl Default for ObjectFile {
    fn default() -> Self {
        Self::empty()
    }
}

/// The address of the instruction at a given index.
fn line_addr(base: u32, index: usize) -> u32 {
    base.wrapping_add((index as u32).wrapping_mul(4))
}

#[cfg(test)]
mod tests {
    use crate::ast::OffsetNewErr;
    use crate::parse::ParseErrKind;

    use super::{assemble, assemble_debug, assemble_lines, AsmErr, AsmErrKind, TEXT_START};

    fn assert_asm_fail<T: std::fmt::Debug>(r: Result<T, AsmErr>, kind: AsmErrKind, line: usize) {
        let err = r.unwrap_err();
        assert_eq!(err.kind, kind);
        assert_eq!(err.line, line);
    }

    #[test]
    fn test_encode_each_mnemonic() {
        let src = "
            nop
            add $t2 $t0 $t1
            addi $t0 $zero 5
            back: andi $t1 $t0 0xFF
            beq $t0 $t1 fwd
            bne $t0 $zero back
            srl $t2 $t1 1
            fwd: sll $t2 $t1 4
        ";
        let lines: Vec<_> = src.trim().lines().map(str::trim).collect();
        let obj = assemble_lines(&lines, false).unwrap();

        assert_eq!(obj.words(), [
            0x0000_0000,
            0x0109_5020,
            0x2008_0005,
            0x3109_00FF,
            0x1109_0002,
            0x1500_FFFD,
            0x0009_5042,
            0x0009_5100,
        ]);
    }

    #[test]
    fn test_one_word_per_line() {
        let obj = assemble("nop\nnop\nnop").unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj.base(), TEXT_START);

        let addrs: Vec<_> = obj.addr_iter().map(|(addr, _)| addr).collect();
        assert_eq!(addrs, [0x0040_0000, 0x0040_0004, 0x0040_0008]);

        let obj = assemble("").unwrap();
        assert!(obj.is_empty());
    }

    #[test]
    fn test_branch_offsets() {
        // offset = target - current - 1
        let src = "
            beq $t0 $t1 done
            nop
            done: bne $t0 $t1 top
            top: beq $zero $zero top
        ";
        let lines: Vec<_> = src.trim().lines().map(str::trim).collect();
        let obj = assemble_lines(&lines, false).unwrap();
        let offsets: Vec<_> = obj.words().iter().map(|&w| w as u16 as i16).collect();

        assert_eq!(offsets, [1, 0, 0, -1]);
    }

    #[test]
    fn test_backward_branch() {
        let src = "loop: addi $t0 $t0 -1\nnop\nbne $t0 $zero loop";
        let obj = assemble(src).unwrap();
        assert_eq!(obj.words()[2], 0x1500_FFFD);
    }

    #[test]
    fn test_duplicate_labels_first_wins() {
        let src = "
            beq $zero $zero dup
            dup: nop
            dup: nop
        ";
        let lines: Vec<_> = src.trim().lines().map(str::trim).collect();
        let obj = assemble_lines(&lines, true).unwrap();

        assert_eq!(obj.words()[0] & 0xFFFF, 0);
        assert_eq!(obj.symbol_table().unwrap().lookup_label("dup"), Some(1));
    }

    #[test]
    fn test_symbol_table() {
        let obj = assemble_debug("a: nop\nnop\n  b: nop").unwrap();
        let sym = obj.symbol_table().unwrap();

        assert_eq!(sym.lookup_label("a"), Some(0));
        assert_eq!(sym.lookup_label("b"), Some(2));
        assert_eq!(sym.lookup_label("c"), None);
        assert_eq!(sym.get_label_source("b"), Some(2..3));
        assert_eq!(sym.label_iter().collect::<Vec<_>>(), [("a", 0), ("b", 2)]);

        assert!(assemble("a: nop").unwrap().symbol_table().is_none());
    }

    #[test]
    fn test_asm_errors() {
        assert_asm_fail(
            assemble("addi $t0 $zero 5\naddi $t0 $zero 40000"),
            AsmErrKind::Parse(ParseErrKind::OffsetNewErr(OffsetNewErr::CannotFitSigned(16))),
            1
        );
        assert_asm_fail(
            assemble("srl $t0 $t1 40"),
            AsmErrKind::Parse(ParseErrKind::OffsetNewErr(OffsetNewErr::CannotFitUnsigned(5))),
            0
        );
        assert_asm_fail(
            assemble("nop\nnop\nmul $t0 $t1 $t2"),
            AsmErrKind::Parse(ParseErrKind::UnknownOpcode("mul".to_string())),
            2
        );
        assert_asm_fail(
            assemble("add $t0 $t1 $x1"),
            AsmErrKind::Parse(ParseErrKind::UnknownRegister),
            0
        );
        assert_asm_fail(
            assemble("nop\n\nnop"),
            AsmErrKind::Parse(ParseErrKind::ExpectedMnemonic),
            1
        );
        assert_asm_fail(
            assemble("nop\nbeq $t0 $t1 nowhere"),
            AsmErrKind::CouldNotFindLabel,
            1
        );
    }

    #[test]
    fn test_numeric_target_is_a_label() {
        // branch targets are only ever label text, never literal offsets
        assert_asm_fail(
            assemble("beq $t0 $t1 5"),
            AsmErrKind::CouldNotFindLabel,
            0
        );

        let obj = assemble("nop
1: nop
beq $zero $zero 1").unwrap();
        assert_eq!(obj.words()[2], 0x1000_FFFE);
    }

    #[test]
    fn test_non_identifier_labels() {
        let obj = assemble_debug("x-1: nop
beq $zero $zero x-1
  $t0:nop
bne $t0 $t1 $t0").unwrap();
        assert_eq!(obj.words()[1], 0x1000_FFFE);
        assert_eq!(obj.words()[3], 0x1509_FFFE);

        let sym = obj.symbol_table().unwrap();
        assert_eq!(sym.lookup_label("x-1"), Some(0));
        assert_eq!(sym.lookup_label("$t0"), Some(2));
        assert_eq!(sym.get_label_source("$t0"), Some(2..5));
    }

    #[test]
    fn test_first_error_aborts_in_line_order() {
        // the unresolved label on line 0 is reported before the bad opcode on line 1
        assert_asm_fail(
            assemble("beq $t0 $t1 nowhere\nmul $t0 $t1 $t2"),
            AsmErrKind::CouldNotFindLabel,
            0
        );
    }

    #[test]
    fn test_branch_out_of_range() {
        let mut lines = vec!["beq $zero $zero far".to_string()];
        lines.extend(std::iter::repeat("nop".to_string()).take(40000));
        lines.push("far: nop".to_string());

        assert_asm_fail(
            assemble_lines(&lines, false),
            AsmErrKind::OffsetNewErr(OffsetNewErr::CannotFitSigned(16)),
            0
        );

        let err = assemble_lines(&lines, false).unwrap_err();
        assert_eq!(
            crate::err::Error::help(&err).as_deref(),
            Some("the range for a signed 16-bit integer is [-32768, 32767]")
        );
    }

    #[test]
    fn test_err_span() {
        let err = assemble("nop\nbeq $t0 $t1 nowhere").unwrap_err();
        assert_eq!(err.span, 12..19);

        let err = assemble("add $t0 $t1 $x1").unwrap_err();
        assert_eq!(err.span, 12..15);
    }
}
