//! The closed numerical option set: [`Opt`] and the [`Opts`] bitset.

use std::fmt;

/// A single numerical toggle.
///
/// The set is closed: solvers match on every variant, and nothing outside
/// this crate can add one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Opt {
    /// Infinite-gauge flux form is permitted for this solver.
    Iga = 0,
    /// Non-unit-gauge metric: a `G` array is allocated and divides the flux sum.
    Nug = 1,
    /// Kahan-compensated summation in the donor-cell update.
    Khn = 2,
    /// Divergence-check suppression for the initial Courant field.
    Dfl = 3,
}

impl Opt {
    /// All options in ascending bit order.
    pub const ALL: [Opt; 4] = [Opt::Iga, Opt::Nug, Opt::Khn, Opt::Dfl];

    /// Short lowercase mnemonic used in logs.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Iga => "iga",
            Self::Nug => "nug",
            Self::Khn => "khn",
            Self::Dfl => "dfl",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A set of [`Opt`] flags implemented as a fixed-width bitset.
///
/// Consulted at allocation time (which optional arrays exist) and at
/// update time (which formula variant runs). Immutable for a solver's
/// lifetime once handed to it.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Opts {
    bits: u8,
}

impl Opts {
    /// Infinite-gauge flux form permitted.
    pub const IGA: Opts = Opts::single(Opt::Iga);
    /// Non-unit-gauge metric.
    pub const NUG: Opts = Opts::single(Opt::Nug);
    /// Kahan summation.
    pub const KHN: Opts = Opts::single(Opt::Khn);
    /// Divergence check disabled.
    pub const DFL: Opts = Opts::single(Opt::Dfl);

    const MASK: u8 = 0b1111;

    /// Create an empty option set.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Option set holding exactly one flag.
    pub const fn single(opt: Opt) -> Self {
        Self { bits: opt.bit() }
    }

    /// Rebuild a set from raw bits, rejecting unknown bits.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::MASK != 0 {
            return None;
        }
        Some(Self { bits })
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Insert a flag into the set.
    pub fn insert(&mut self, opt: Opt) {
        self.bits |= opt.bit();
    }

    /// Check whether the set contains a flag.
    pub const fn isset(self, opt: Opt) -> bool {
        self.bits & opt.bit() != 0
    }

    /// Return the union of two sets (`self | other`).
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Return the intersection of two sets (`self & other`).
    pub const fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Return the set difference (`self - other`).
    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Check whether `self` is a subset of `other`.
    pub const fn is_subset(self, other: Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns the number of flags in the set.
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate over the flags in the set, in ascending bit order.
    pub fn iter(self) -> impl Iterator<Item = Opt> {
        Opt::ALL.into_iter().filter(move |&o| self.isset(o))
    }
}

impl std::ops::BitOr for Opts {
    type Output = Opts;

    fn bitor(self, rhs: Opts) -> Opts {
        self.union(rhs)
    }
}

impl FromIterator<Opt> for Opts {
    fn from_iter<I: IntoIterator<Item = Opt>>(iter: I) -> Self {
        let mut set = Self::empty();
        for opt in iter {
            set.insert(opt);
        }
        set
    }
}

impl fmt::Debug for Opts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for Opts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for opt in self.iter() {
            if !first {
                f.write_str("|")?;
            }
            first = false;
            write!(f, "{opt}")?;
        }
        Ok(())
    }
}
