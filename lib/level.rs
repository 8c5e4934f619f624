//! Fine-structure level labels.

use std::{ fmt, str::FromStr };
use serde::Deserialize;
use crate::{
    error::RateError,
    spin::SpinTotal,
};

const ORBITALS: [char; 7] = ['S', 'P', 'D', 'F', 'G', 'H', 'I'];

/// A fine-structure manifold `n L_J` of a single-valence-electron ion.
///
/// Levels are ordered by `(n, L, J)` and display in spectroscopic notation,
/// e.g. `4S1/2` or `3D5/2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Level {
    n: u32,
    l: u32,
    j: SpinTotal,
}

impl Level {
    /// Create a new level; `j_halves` is twice the total electronic angular
    /// momentum.
    pub const fn new(n: u32, l: u32, j_halves: u32) -> Self {
        Self { n, l, j: SpinTotal::new(j_halves) }
    }

    /// Principal quantum number.
    pub fn n(&self) -> u32 { self.n }

    /// Orbital angular momentum quantum number.
    pub fn l(&self) -> u32 { self.l }

    /// Total electronic angular momentum.
    pub fn j(&self) -> SpinTotal { self.j }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orbital = ORBITALS.get(self.l as usize).copied().unwrap_or('?');
        write!(f, "{}{}{}", self.n, orbital, self.j)
    }
}

impl FromStr for Level {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RateError::Species(format!("malformed level label '{s}'"));
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(bad)?;
        let (n, rest) = s.split_at(split);
        let n: u32 = n.parse().map_err(|_| bad())?;
        let mut chars = rest.chars();
        let orbital = chars.next().ok_or_else(bad)?.to_ascii_uppercase();
        let l = ORBITALS.iter().position(|o| *o == orbital).ok_or_else(bad)? as u32;
        let j = chars.as_str();
        let j_halves: u32
            = match j.split_once('/') {
                Some((num, "2")) => num.parse().map_err(|_| bad())?,
                Some(_) => return Err(bad()),
                None => 2 * j.parse::<u32>().map_err(|_| bad())?,
            };
        if j_halves.abs_diff(2 * l) != 1 {
            return Err(bad());
        }
        Ok(Self::new(n, l, j_halves))
    }
}

impl TryFrom<String> for Level {
    type Error = RateError;

    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}
