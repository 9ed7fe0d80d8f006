//! Formatters which can read and write object files into disk.
//!
//! The [`ObjFileFormat`] trait describes an implementation of reading/writing object files into disk.
//! This module provides an implementation of the trait:
//! - [`BinaryFormat`]: A binary representation of object file data
//! - [`TextFormat`]: A text representation of object file data

use super::{ObjectFile, SymbolTable};

/// A trait defining object file formats.
pub trait ObjFileFormat {
    /// Representation of the serialized format.
    ///
    /// For binary formats, `[u8]` should be used.
    /// For text-based formats,`str` should be used.
    type Stream: ToOwned + ?Sized;
    /// Serializes into the stream format.
    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned;
    /// Deserializes from the stream format, returning `None`
    /// if an error occurred during deserialization.
    fn deserialize(i: &Self::Stream) -> Option<ObjectFile>;
}

// BINARY!
/// A binary format of object file data.
pub struct BinaryFormat;

const BFMT_MAGIC: &[u8] = b"mips\x21";
const BFMT_VER: &[u8] = b"\x00\x01";
impl ObjFileFormat for BinaryFormat {
    type Stream = [u8];

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        // Object file specification:
        //
        // Object file consists of a header and an arbitrary number of data blocks.
        //
        // The header consists of:
        // - The magic number (b"mips\x21", which reads as "mips!")
        // - The version (2 bytes)
        //
        // Data is divided into discrete chunks, which start with one of:
        // - 0x00: instruction stream
        // - 0x01: label symbol table entry
        // - 0x02: symbol table marker
        //
        // Block 0x00 consists of:
        // - the identifier byte 0x00 (1 byte)
        // - address of the first word (4 bytes)
        // - number of words (4 bytes)
        // - the array of words (4n bytes)
        //
        // Block 0x01 consists of:
        // - the identifier byte 0x01 (1 byte)
        // - line of the label (8 bytes)
        // - the start of the label in its line (8 bytes)
        // - the length of the label's name (8 bytes)
        // - the label (n bytes)
        //
        // Block 0x02 is only the identifier byte 0x02.
        // It is written whenever the object file has a symbol table,
        // so that an empty table is kept apart from no table at all.
        //
        // All integers are little-endian.

        let mut bytes = BFMT_MAGIC.to_vec();
        bytes.extend_from_slice(BFMT_VER);

        bytes.push(0x00);
        bytes.extend(u32::to_le_bytes(o.base()));
        bytes.extend(u32::to_le_bytes(o.len() as u32));
        for &word in o.words() {
            bytes.extend(u32::to_le_bytes(word));
        }

        if let Some(sym) = o.symbol_table() {
            bytes.push(0x02);
            for (label, line, start) in sym.entries() {
                bytes.push(0x01);
                bytes.extend(u64::to_le_bytes(line as u64));
                bytes.extend(u64::to_le_bytes(start as u64));
                bytes.extend(u64::to_le_bytes(label.len() as u64));
                bytes.extend_from_slice(label.as_bytes());
            }
        }

        bytes
    }

    fn deserialize(mut vec: &Self::Stream) -> Option<ObjectFile> {
        let mut text = None;
        let mut labels = vec![];
        let mut sym_present = false;

        vec = vec.strip_prefix(BFMT_MAGIC)?
            .strip_prefix(BFMT_VER)?;

        while let Some((ident_byte, rest)) = vec.split_first() {
            vec = rest;
            match ident_byte {
                0x00 => {
                    let base     = u32::from_le_bytes(take::<4>(&mut vec)?);
                    let data_len = u32::from_le_bytes(take::<4>(&mut vec)?) as usize;
                    let words    = map_chunks::<_, 4>(take_slice(&mut vec, data_len.checked_mul(4)?)?, u32::from_le_bytes);

                    // only one instruction stream per file
                    if text.replace((base, words)).is_some() {
                        return None;
                    }
                },
                0x01 => {
                    let line    = u64::from_le_bytes(take::<8>(&mut vec)?) as usize;
                    let start   = u64::from_le_bytes(take::<8>(&mut vec)?) as usize;
                    let str_len = u64::from_le_bytes(take::<8>(&mut vec)?) as usize;
                    let string  = String::from_utf8(take_slice(&mut vec, str_len)?.to_vec()).ok()?;

                    labels.push((string, line, start));
                },
                0x02 => sym_present = true,
                _ => return None
            }
        }

        let (base, words) = text?;
        let sym = match sym_present || !labels.is_empty() {
            true  => Some(SymbolTable::from_entries(labels)),
            false => None,
        };
        Some(ObjectFile::from_words(base, words).with_symbol_table(sym))
    }
}

fn take<const N: usize>(data: &mut &[u8]) -> Option<[u8; N]> {
    take_slice(data, N)
        .and_then(|slice| <[_; N]>::try_from(slice).ok())
}
fn take_slice<'a>(data: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
    if n > data.len() { return None; }

    let (left, right) = data.split_at(n);
    *data = right;
    Some(left)
}
fn map_chunks<T, const N: usize>(data: &[u8], f: impl FnMut([u8; N]) -> T) -> Vec<T> {
    debug_assert_eq!(data.len() % N, 0);

    data.chunks_exact(N)
        .filter_map(|c| <[_; N]>::try_from(c).ok())
        .map(f)
        .collect()
}

// TEXT!
/// A text-based format of object file data.
pub struct TextFormat;

const TFMT_MAGIC: &str = "MIPS OBJ FILE";
const TABLE_DIV: &str = " | ";

impl ObjFileFormat for TextFormat {
    type Stream = str;

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        // Text format specification.
        //
        // ```text
        // MIPS OBJ FILE
        //
        // .TEXT
        // <start address in hex>
        // <number of words in dec>
        // <word in hex>
        // <...>
        //
        // .SYMBOL
        // LINE | INDEX | LABEL
        // 0    | 0     | start
        // 4    | 2     | loop
        // ...
        // // Support for comments, as well.
        // ```
        fn _ser(o: &ObjectFile) -> Result<String, std::fmt::Error> {
            use std::fmt::Write;
            let mut buf = String::new();

            writeln!(buf, "{TFMT_MAGIC}")?;
            writeln!(buf)?;

            writeln!(buf, ".TEXT")?;
            writeln!(buf, "{:08X}", o.base())?;
            writeln!(buf, "{}", o.len())?;
            for &word in o.words() {
                writeln!(buf, "{word:08X}")?;
            }

            if let Some(sym) = o.symbol_table() {
                writeln!(buf)?;
                writeln!(buf, ".SYMBOL")?;

                const LINE: &str = "LINE";
                const INDEX: &str = "INDEX";

                let mut entries: Vec<_> = sym.entries().collect();
                entries.sort_by_key(|&(_, line, _)| line);

                let (line_col, index_col) = entries.iter()
                    .map(|&(_, line, start)| (count_digits(line), count_digits(start)))
                    .fold(
                        (LINE.len(), INDEX.len()),
                        |(lc, ic), (lx, ix)| (lc.max(lx), ic.max(ix))
                    );

                writeln!(buf, "{LINE:1$}{0}{INDEX:2$}{0}LABEL", TABLE_DIV, line_col, index_col)?;
                for (label, line, start) in entries {
                    writeln!(buf, "{line:1$}{0}{start:2$}{0}{label}", TABLE_DIV, line_col, index_col)?;
                }
            }

            Ok(buf)
        }

        // Writing into a String cannot fail.
        _ser(o).unwrap_or_default()
    }

    fn deserialize(string: &Self::Stream) -> Option<ObjectFile> {
        // Read all of the non-empty lines:
        let mut lines = string.trim().lines()
            .map(|l| {
                l.split_once("//").map_or(l, |(left, _)| left) // remove comments
            })
            .filter(|&l| !l.trim().is_empty());
        if lines.next() != Some(TFMT_MAGIC) { return None };

        let mut line_groups: Vec<Vec<&str>> = vec![];
        for line in lines {
            if line.starts_with('.') {
                line_groups.push(vec![line]);
            } else {
                line_groups.last_mut()?.push(line);
            }
        }

        let mut text = None;
        let mut sym = None;
        for group in line_groups {
            let [header, rest @ ..] = &*group else { return None };
            match header.trim() {
                ".TEXT" => {
                    let [base_hex, len_str, words @ ..] = rest else { return None };
                    let base = hex2u32(base_hex.trim())?;
                    let len = len_str.trim().parse::<usize>().ok()?;
                    if words.len() != len { return None; }

                    let words = words.iter()
                        .map(|w| hex2u32(w.trim()))
                        .collect::<Option<Vec<_>>>()?;

                    if text.replace((base, words)).is_some() {
                        return None;
                    }
                },
                ".SYMBOL" => {
                    let [table_header, rows @ ..] = rest else { return None };
                    let columns: Vec<_> = table_header.split(TABLE_DIV).map(str::trim).collect();
                    if columns != ["LINE", "INDEX", "LABEL"] { return None; }

                    let entries = rows.iter()
                        .map(|row| {
                            let mut cols = row.splitn(3, TABLE_DIV).map(str::trim);
                            let line: usize = cols.next()?.parse().ok()?;
                            let start: usize = cols.next()?.parse().ok()?;
                            let label = cols.next().filter(|l| !l.is_empty())?;
                            Some((label.to_string(), line, start))
                        })
                        .collect::<Option<Vec<_>>>()?;

                    sym = Some(SymbolTable::from_entries(entries));
                },
                _ => return None
            }
        }

        let (base, words) = text?;
        Some(ObjectFile::from_words(base, words).with_symbol_table(sym))
    }
}

fn count_digits(n: usize) -> usize {
    (n.checked_ilog10().unwrap_or(0) + 1) as usize
}
fn hex2u32(s: &str) -> Option<u32> {
    match s.len() == 8 {
        true => u32::from_str_radix(s, 16).ok(),
        false => None
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{assemble, assemble_debug, ObjectFile};

    use super::{BinaryFormat, ObjFileFormat, TextFormat};

    const SRC: &str = "start: addi $t0 $zero 3\nloop: addi $t0 $t0 -1\nbne $t0 $zero loop\nnop";

    #[test]
    fn test_binary_preserves_object() {
        for obj in [assemble(SRC).unwrap(), assemble_debug(SRC).unwrap(), ObjectFile::empty()] {
            let bytes = BinaryFormat::serialize(&obj);
            assert_eq!(BinaryFormat::deserialize(&bytes), Some(obj));
        }
    }

    #[test]
    fn test_empty_symbol_table_survives() {
        // no labels, but debug info was requested
        let obj = assemble_debug("addi $t0 $zero 1\nnop").unwrap();
        assert!(obj.symbol_table().is_some());

        let decoded = BinaryFormat::deserialize(&BinaryFormat::serialize(&obj)).unwrap();
        assert!(decoded.symbol_table().is_some());
        assert_eq!(decoded, obj);

        let decoded = TextFormat::deserialize(&TextFormat::serialize(&obj)).unwrap();
        assert!(decoded.symbol_table().is_some());
        assert_eq!(decoded, obj);

        let decoded = BinaryFormat::deserialize(&BinaryFormat::serialize(&assemble("nop").unwrap())).unwrap();
        assert!(decoded.symbol_table().is_none());
    }

    #[test]
    fn test_binary_layout() {
        let obj = ObjectFile::from_words(0x0040_0000, vec![0x2008_0005]);
        let bytes = BinaryFormat::serialize(&obj);
        assert_eq!(bytes, b"mips\x21\x00\x01\x00\x00\x00\x40\x00\x01\x00\x00\x00\x05\x00\x08\x20");
    }

    #[test]
    fn test_binary_rejects_malformed() {
        let bytes = BinaryFormat::serialize(&assemble(SRC).unwrap());

        // bad magic
        assert_eq!(BinaryFormat::deserialize(b"obj!\x00\x01"), None);
        // truncated
        assert_eq!(BinaryFormat::deserialize(&bytes[..bytes.len() - 1]), None);
        // unknown block
        let mut extended = bytes.clone();
        extended.push(0x7F);
        assert_eq!(BinaryFormat::deserialize(&extended), None);
        // two instruction streams
        let mut doubled = bytes.clone();
        doubled.extend_from_slice(&bytes[7..]);
        assert_eq!(BinaryFormat::deserialize(&doubled), None);
    }

    #[test]
    fn test_text_preserves_object() {
        for obj in [assemble(SRC).unwrap(), assemble_debug(SRC).unwrap(), ObjectFile::empty()] {
            let text = TextFormat::serialize(&obj);
            assert_eq!(TextFormat::deserialize(&text), Some(obj));
        }
    }

    #[test]
    fn test_text_layout() {
        let obj = assemble_debug(SRC).unwrap();
        let text = TextFormat::serialize(&obj);

        let expected = "\
MIPS OBJ FILE

.TEXT
00400000
4
20080003
2108FFFF
1500FFFE
00000000

.SYMBOL
LINE | INDEX | LABEL
   0 |     0 | start
   1 |     0 | loop
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_comments() {
        let text = "\
MIPS OBJ FILE
// hand-written
.TEXT
00400000
1
00000000 // halt
";
        let obj = TextFormat::deserialize(text).unwrap();
        assert_eq!(obj.words(), [0]);
        assert!(obj.symbol_table().is_none());
    }
}
