//! Machine state handling for the simulator.
//!
//! This module consists of:
//! - [`RegFile`]: The register file.
//! - [`MachineInitStrategy`]: How the register file is filled before a program runs.

use rand::rngs::StdRng;
use rand::Rng;

use crate::ast::Reg;

/// Trait that describes types that can be used to create the initial data of a register.
pub trait WordFiller {
    /// Generate the data.
    fn generate(&mut self) -> u32;
}
impl WordFiller for () {
    /// This creates unseeded, non-deterministic values.
    fn generate(&mut self) -> u32 {
        rand::random()
    }
}
impl WordFiller for u32 {
    /// Sets each word to the given value.
    fn generate(&mut self) -> u32 {
        *self
    }
}
impl WordFiller for StdRng {
    /// This creates values from the standard random number generator.
    ///
    /// This can be used to create deterministic, seeded values.
    fn generate(&mut self) -> u32 {
        self.gen()
    }
}

/// Strategy used to initialize the `reg_file` of the [`Simulator`].
///
/// Programs conventionally assume every register starts at zero,
/// which is the default. The other strategies fill the registers with garbage,
/// which is useful for checking whether a program really initializes
/// the registers it reads.
///
/// [`Simulator`]: super::Simulator
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum MachineInitStrategy {
    /// Initializes each register to zero.
    #[default]
    Zeroed,

    /// Initializes each register randomly and non-deterministically.
    Unseeded,

    /// Initializes each register randomly and deterministically.
    Seeded {
        /// The seed the RNG was initialized with.
        seed: u64
    },

    /// Initializes each register to a known value.
    Known {
        /// The value to initialize each register to.
        value: u32
    }
}

impl MachineInitStrategy {
    pub(super) fn generator(&self) -> impl WordFiller {
        use rand::SeedableRng;

        match self {
            MachineInitStrategy::Zeroed => MIGenerator::Known(0),
            MachineInitStrategy::Unseeded => MIGenerator::Unseeded,
            MachineInitStrategy::Seeded { seed } => MIGenerator::Seeded(Box::new(StdRng::seed_from_u64(*seed))),
            MachineInitStrategy::Known { value } => MIGenerator::Known(*value),
        }
    }
}

enum MIGenerator {
    Unseeded,
    Seeded(Box<StdRng>),
    Known(u32)
}
impl WordFiller for MIGenerator {
    fn generate(&mut self) -> u32 {
        match self {
            MIGenerator::Unseeded  => ().generate(),
            MIGenerator::Seeded(r) => r.generate(),
            MIGenerator::Known(k)  => k.generate(),
        }
    }
}

/// The register file.
///
/// This struct can be indexed with a [`Reg`]
/// (which can be constructed using the [`crate::ast::reg_consts`] module or via [`Reg::try_from`]).
///
/// # Example
///
/// ```
/// use mipsette::sim::mem::RegFile;
/// use mipsette::ast::reg_consts::T0;
///
/// let mut reg = RegFile::new(&mut 0u32);
/// reg[T0] = 11;
/// assert_eq!(reg[T0], 11);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RegFile([u32; 32]);
impl RegFile {
    /// Creates a register file, filling each register with the provided filler.
    pub fn new(filler: &mut impl WordFiller) -> Self {
        Self(std::array::from_fn(|_| filler.generate()))
    }

    /// Iterates over every register and its value, in register number order.
    pub fn iter(&self) -> impl Iterator<Item=(Reg, u32)> + '_ {
        Reg::all().zip(self.0.iter().copied())
    }

    /// Gets the register values as a slice, indexed by register number.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}
impl std::ops::Index<Reg> for RegFile {
    type Output = u32;

    fn index(&self, index: Reg) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}
