//! Components relating to the abstract syntax trees (ASTs)
//! used in representing assembly instructions.
//!
//! These components together are used to construct...
//! - [`asm::AsmInstr`] (a data structure holding an assembly source code instruction),
//! - and [`sim::SimInstr`] (a data structure holding a bytecode instruction).

pub mod asm;
pub mod sim;

use std::num::TryFromIntError;
use offset_base::OffsetBacking;

/// A register. Must be between 0 and 31.
///
/// Registers are referred to in assembly source by their canonical name
/// (e.g., `$zero`, `$t0`, `$sp`). A `Reg` can be constructed by selecting
/// a register from [`reg_consts`], by name with [`Reg::from_name`],
/// or by index with [`Reg::try_from`].
///
/// ## Examples
///
/// ```text
/// addi $t0 $zero 5
///      ~~~ ~~~~~
/// add $t2 $t0 $t1
///     ~~~ ~~~ ~~~
/// beq $t0 $t1 done
///     ~~~ ~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Reg(pub(crate) u8);

macro_rules! define_regs {
    ($($no:literal: $konst:ident = $name:literal),+ $(,)?) => {
        /// The canonical names of each register, indexed by register number.
        pub const REG_NAMES: [&str; 32] = [$($name),+];

        /// Register constants!
        pub mod reg_consts {
            use super::Reg;

            $(
                #[doc = concat!("The `", $name, "` register (register ", stringify!($no), ").")]
                pub const $konst: Reg = Reg($no);
            )+
        }
    };
}
define_regs! {
     0: ZERO = "$zero",
     1: AT = "$at",
     2: V0 = "$v0",  3: V1 = "$v1",
     4: A0 = "$a0",  5: A1 = "$a1",  6: A2 = "$a2",  7: A3 = "$a3",
     8: T0 = "$t0",  9: T1 = "$t1", 10: T2 = "$t2", 11: T3 = "$t3",
    12: T4 = "$t4", 13: T5 = "$t5", 14: T6 = "$t6", 15: T7 = "$t7",
    16: S0 = "$s0", 17: S1 = "$s1", 18: S2 = "$s2", 19: S3 = "$s3",
    20: S4 = "$s4", 21: S5 = "$s5", 22: S6 = "$s6", 23: S7 = "$s7",
    24: T8 = "$t8", 25: T9 = "$t9",
    26: K0 = "$k0", 27: K1 = "$k1",
    28: GP = "$gp",
    29: SP = "$sp",
    30: FP = "$fp",
    31: RA = "$ra",
}

impl Reg {
    /// Gets the register number of this [`Reg`]. This is always between 0 and 31.
    pub fn reg_no(self) -> u8 {
        self.0
    }

    /// Gets the canonical name of this register (e.g., `$t0`).
    pub fn name(self) -> &'static str {
        REG_NAMES[usize::from(self.0)]
    }

    /// Looks up a register by its canonical name.
    ///
    /// Names are case-sensitive and must include the `$` sigil.
    ///
    /// ```
    /// use mipsette::ast::Reg;
    /// use mipsette::ast::reg_consts::{ZERO, T0, RA};
    ///
    /// assert_eq!(Reg::from_name("$zero"), Some(ZERO));
    /// assert_eq!(Reg::from_name("$t0"), Some(T0));
    /// assert_eq!(Reg::from_name("$ra"), Some(RA));
    /// assert_eq!(Reg::from_name("$t10"), None);
    /// assert_eq!(Reg::from_name("t0"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        REG_NAMES.iter()
            .position(|&n| n == name)
            .map(|i| Reg(i as u8))
    }

    /// Iterates over all 32 registers in register number order.
    pub fn all() -> impl Iterator<Item=Reg> {
        (0..32).map(Reg)
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
impl From<Reg> for usize {
    // Used for indexing the reg file in [`sim::mem::RegFile`].
    fn from(value: Reg) -> Self {
        usize::from(value.0)
    }
}
impl From<Reg> for u32 {
    fn from(value: Reg) -> Self {
        u32::from(value.0)
    }
}
impl TryFrom<u8> for Reg {
    type Error = TryFromIntError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=31 => Ok(Reg(value)),
            // HACKy, but there's no other way to create this error
            _      => u8::try_from(256).map(|_| unreachable!("should've been TryFromIntError")),
        }
    }
}

/// A value representing a signed offset or a signed immediate value.
///
/// `N` indicates the maximum bit size of this offset/immediate value.
///
/// ## Examples
///
/// `IOffset<16>` is used to represent `addi`/`andi`'s immediate operand
/// and the resolved offset of `beq`/`bne`:
///
/// ```text
/// addi $t0 $t0 -1
///              ~~
/// andi $t1 $t0 0x00FF
///              ~~~~~~
/// ```
pub type IOffset<const N: u32> = Offset<i16, N>;
/// The 16-bit signed immediate of I-type instructions.
pub type Imm16 = IOffset<16>;
/// The unsigned 5-bit shift amount of `sll`/`srl`.
///
/// ## Examples
///
/// ```text
/// sll $t2 $t1 4
///             ~
/// ```
pub type Shamt = Offset<u16, 5>;

/// A value representing an offset or an immediate value.
///
/// The `OFF` type represents the backing type of this offset.
/// The signedness of this offset type is dependent on the signedness of the `OFF` type:
/// - `Offset<i16, _>`: signed offset (also aliased as [`IOffset`])
/// - `Offset<u16, _>`: unsigned offset
///
/// `N` indicates the maximum bit size of this offset/immediate value.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Offset<OFF, const N: u32>(OFF);

impl<OFF: std::fmt::Display, const N: u32> std::fmt::Display for Offset<OFF, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The errors that can result from calling [`Offset::new`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OffsetNewErr {
    /// The provided offset cannot fit an unsigned integer of the given bitsize.
    CannotFitUnsigned(u32),
    /// The provided offset cannot fit a signed integer of the given bitsize.
    CannotFitSigned(u32)
}

impl std::fmt::Display for OffsetNewErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OffsetNewErr::CannotFitUnsigned(n) => write!(f, "value is too big for unsigned {n}-bit integer"),
            OffsetNewErr::CannotFitSigned(n) => write!(f, "value is too big for signed {n}-bit integer"),
        }
    }
}
impl std::error::Error for OffsetNewErr {}
impl crate::err::Error for OffsetNewErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        use std::borrow::Cow;

        let error = match self {
            OffsetNewErr::CannotFitUnsigned(n) => Cow::from(format!("the range for an unsigned {n}-bit integer is [0, {}]", (1i64 << n) - 1)),
            OffsetNewErr::CannotFitSigned(n) => Cow::from(format!("the range for a signed {n}-bit integer is [{}, {}]", (-1i64) << (n - 1), (1i64 << (n - 1)) - 1)),
        };

        Some(error)
    }
}

mod offset_base {
    use super::OffsetNewErr;

    /// Any type that could store a value for [`Offset`].
    ///
    /// [`Offset`]: super::Offset
    pub trait OffsetBacking: Copy + Eq + TryFrom<i64> {
        /// How many bits are contained within this backing.
        ///
        /// For example, `u16` has 16 bits and thus BITS == 16.
        const BITS: u32;

        /// Truncates the given value to the provided `bit_size`.
        ///
        /// This bit size is always known to be less than or equal to BITS.
        fn truncate(self, bit_size: u32) -> Self;

        /// The error to raise if a given value doesn't match
        /// its provided value when truncated to a given `bit_size`.
        fn does_not_fit_error(bit_size: u32) -> OffsetNewErr;
    }

    macro_rules! impl_offset_backing_for_ints {
        ($($Int:ty: $Err:ident),*) => {
            $(
                impl OffsetBacking for $Int {
                    const BITS: u32 = Self::BITS;

                    fn truncate(self, bit_size: u32) -> Self {
                        (self << (Self::BITS - bit_size)) >> (Self::BITS - bit_size)
                    }

                    fn does_not_fit_error(bit_size: u32) -> OffsetNewErr {
                        OffsetNewErr::$Err(bit_size)
                    }
                }
            )*
        }
    }
    impl_offset_backing_for_ints! {
        u16: CannotFitUnsigned,
        i16: CannotFitSigned
    }
}

impl<OFF: OffsetBacking, const N: u32> Offset<OFF, N> {
    /// Creates a new offset value.
    /// This must fit within `N` bits of the representation, otherwise an error is raised.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mipsette::ast::Offset;
    /// #
    /// // Signed:
    /// let neg5 = Offset::<i16, 5>::new(-5);
    /// let pos15 = Offset::<i16, 5>::new(15);
    /// let pos16 = Offset::<i16, 5>::new(16);
    /// assert!(neg5.is_ok());
    /// assert!(pos15.is_ok());
    /// assert!(pos16.is_err());
    ///
    /// // Unsigned:
    /// let pos31 = Offset::<u16, 5>::new(31);
    /// let pos32 = Offset::<u16, 5>::new(32);
    /// assert!(pos31.is_ok());
    /// assert!(pos32.is_err());
    /// ```
    ///
    /// # Panics
    ///
    /// This will panic if `N` is larger than the offset backing (e.g., for backing `u16`, larger than 16).
    ///
    /// ```should_panic
    /// # use mipsette::ast::Offset;
    /// #
    /// let oh_no = Offset::<i16, 17>::new(18);
    /// ```
    pub fn new(n: OFF) -> Result<Self, OffsetNewErr> {
        assert!(N <= OFF::BITS, "bit size {N} exceeds size of backing ({})", OFF::BITS);
        match n == n.truncate(N) {
            true  => Ok(Offset(n)),
            false => Err(OFF::does_not_fit_error(N)),
        }
    }

    /// Creates a new offset value from a wide integer (such as a parsed literal).
    ///
    /// This fails if the value does not fit within `N` bits of the representation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mipsette::ast::{Imm16, Shamt};
    /// #
    /// assert!(Imm16::new_wide(-32768).is_ok());
    /// assert!(Imm16::new_wide(32767).is_ok());
    /// assert!(Imm16::new_wide(40000).is_err());
    ///
    /// assert!(Shamt::new_wide(31).is_ok());
    /// assert!(Shamt::new_wide(40).is_err());
    /// assert!(Shamt::new_wide(-1).is_err());
    /// ```
    pub fn new_wide(n: i64) -> Result<Self, OffsetNewErr> {
        OFF::try_from(n)
            .map_err(|_| OFF::does_not_fit_error(N))
            .and_then(Self::new)
    }

    /// Creates a new offset by extending the first N bits of the integer,
    /// and discarding the rest.
    ///
    /// The extension is considered sign-extended if the offset's backing is signed,
    /// and zero-extended if the offset's backing is unsigned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mipsette::ast::Offset;
    /// #
    /// // Signed:
    /// let neg5 = Offset::<i16, 5>::new_trunc(-5);  // 0b11111111111_11011
    /// let pos16 = Offset::<i16, 5>::new_trunc(16); // 0b00000000000_10000
    /// assert_eq!(neg5.get(),   -5); // 0b11011
    /// assert_eq!(pos16.get(), -16); // 0b10000
    ///
    /// // Unsigned:
    /// let pos32 = Offset::<u16, 5>::new_trunc(32); // 0b00000000001_00000
    /// assert_eq!(pos32.get(),  0); // 00000
    /// ```
    pub fn new_trunc(n: OFF) -> Self {
        assert!(N <= OFF::BITS, "bit size {N} exceeds size of backing ({})", OFF::BITS);
        Self(n.truncate(N))
    }

    /// Gets the value of the offset.
    pub fn get(&self) -> OFF {
        self.0
    }
}

/// A label.
///
/// This struct stores the name of the label (accessible by the `name` field)
/// and where the label is located within its source line.
///
/// A label's name is the text before the `:` of its defining line, which can be
/// any run of non-whitespace characters (e.g., `loop`, `x-1`, `1`).
/// Branch targets are labels too, and match a definition by exact text.
///
/// # Examples
/// ```text
/// loop: addi $t0 $t0 -1
/// ~~~~
///       bne $t0 $zero loop
///                     ~~~~
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Label {
    /// The label's text
    pub name: String,

    /// The start of the label in its source line.
    start: usize
}
impl Label {
    /// Creates a new label.
    pub fn new(name: String, span: std::ops::Range<usize>) -> Self {
        debug_assert_eq!(span.start + name.len(), span.end, "span should have the same length as name");
        Label { name, start: span.start }
    }
    /// Returns the span of the label in its source line.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start .. (self.start + self.name.len())
    }
}
impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::reg_consts::*;
    use super::{Imm16, OffsetNewErr, Reg, Shamt, REG_NAMES};

    #[test]
    fn test_reg_names() {
        assert_eq!(REG_NAMES.len(), 32);
        for reg in Reg::all() {
            assert_eq!(Reg::from_name(reg.name()), Some(reg));
        }

        assert_eq!(ZERO.reg_no(), 0);
        assert_eq!(AT.reg_no(), 1);
        assert_eq!(V0.reg_no(), 2);
        assert_eq!(A0.reg_no(), 4);
        assert_eq!(T0.reg_no(), 8);
        assert_eq!(S0.reg_no(), 16);
        assert_eq!(T8.reg_no(), 24);
        assert_eq!(K0.reg_no(), 26);
        assert_eq!(GP.reg_no(), 28);
        assert_eq!(SP.reg_no(), 29);
        assert_eq!(FP.reg_no(), 30);
        assert_eq!(RA.reg_no(), 31);
    }

    #[test]
    fn test_reg_case_sensitive() {
        assert_eq!(Reg::from_name("$T0"), None);
        assert_eq!(Reg::from_name("$ZERO"), None);
        assert_eq!(Reg::from_name("$"), None);
        assert_eq!(Reg::from_name(""), None);
    }

    #[test]
    fn test_reg_try_from() {
        assert_eq!(Reg::try_from(0), Ok(ZERO));
        assert_eq!(Reg::try_from(31), Ok(RA));
        assert!(Reg::try_from(32).is_err());
        assert!(Reg::try_from(255).is_err());
    }

    #[test]
    fn test_imm_ranges() {
        assert_eq!(Imm16::new_wide(-32768).map(|o| o.get()), Ok(-32768));
        assert_eq!(Imm16::new_wide(32767).map(|o| o.get()), Ok(32767));
        assert_eq!(Imm16::new_wide(32768), Err(OffsetNewErr::CannotFitSigned(16)));
        assert_eq!(Imm16::new_wide(-32769), Err(OffsetNewErr::CannotFitSigned(16)));

        assert_eq!(Shamt::new_wide(0).map(|o| o.get()), Ok(0));
        assert_eq!(Shamt::new_wide(31).map(|o| o.get()), Ok(31));
        assert_eq!(Shamt::new_wide(32), Err(OffsetNewErr::CannotFitUnsigned(5)));
        assert_eq!(Shamt::new_wide(-1), Err(OffsetNewErr::CannotFitUnsigned(5)));
    }

    #[test]
    fn test_offset_help() {
        use crate::err::Error;

        let help = OffsetNewErr::CannotFitSigned(16).help().unwrap();
        assert_eq!(help, "the range for a signed 16-bit integer is [-32768, 32767]");
        let help = OffsetNewErr::CannotFitUnsigned(5).help().unwrap();
        assert_eq!(help, "the range for an unsigned 5-bit integer is [0, 31]");
    }
}
