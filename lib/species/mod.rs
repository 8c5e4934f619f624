//! Declarative tables describing the level structure of an ion species.
//!
//! A [`Species`] is pure data: levels with their zero-field offsets, Landé and
//! hyperfine constants, and named transitions with Einstein A coefficients.
//! Built-in tables live in the submodules; other species can be loaded from
//! TOML with [`Species::from_toml_str`]:
//!
//! ```toml
//! name = "40Ca+"
//! nuclear_spin = 0.0
//! g_i = 0.0
//!
//! [[levels]]
//! level = "4S1/2"
//! frequency_hz = 0.0
//! g_j = 2.00225664
//!
//! [[levels]]
//! level = "4P1/2"
//! frequency_hz = 755.222766e12
//! g_j = 0.66666667
//!
//! [[transitions]]
//! name = "397"
//! lower = "4S1/2"
//! upper = "4P1/2"
//! einstein_a = 1.32e8
//! multipole = "E1"
//! ```
//!
//! Hyperfine constants `a_hfs_hz` and `b_hfs_hz` default to zero.

use indexmap::IndexMap;
use serde::Deserialize;
use crate::{
    constants::angular,
    error::{ RateError, Result },
    level::Level,
    spin::SpinTotal,
    transition::{ Multipole, Transition, TransitionCatalogue },
};

pub mod calcium;
pub mod ca40;
pub mod ca43;

/// Per-level constants, all frequencies in angular units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LevelData {
    /// Zero-field offset from the ground level.
    pub frequency: f64,
    /// Landé g-factor of the electronic angular momentum.
    pub g_j: f64,
    /// Magnetic dipole hyperfine constant.
    pub a_hfs: f64,
    /// Electric quadrupole hyperfine constant.
    pub b_hfs: f64,
}

/// Level structure and transitions of a single ion species.
#[derive(Clone, Debug, PartialEq)]
pub struct Species {
    name: String,
    nuclear_spin: SpinTotal,
    g_i: f64,
    levels: IndexMap<Level, LevelData>,
    transitions: TransitionCatalogue,
}

/// A transition entry before its frequency is derived from the level table.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSpec {
    pub name: String,
    pub lower: Level,
    pub upper: Level,
    pub einstein_a: f64,
    pub multipole: Multipole,
}

impl Species {
    /// Assemble and validate a species table.
    ///
    /// Fails if a level is listed twice, a constant is non-finite, a transition
    /// references an unlisted level, goes downhill in energy, has a negative
    /// A coefficient, or violates the angular momentum triangle rule for its
    /// multipole order.
    pub fn new<S, L, T>(
        name: S,
        nuclear_spin: SpinTotal,
        g_i: f64,
        levels: L,
        transitions: T,
    ) -> Result<Self>
    where
        S: Into<String>,
        L: IntoIterator<Item = (Level, LevelData)>,
        T: IntoIterator<Item = TransitionSpec>,
    {
        let name = name.into();
        if !g_i.is_finite() {
            return Err(RateError::Species(format!("{name}: non-finite g_I")));
        }
        let mut level_map: IndexMap<Level, LevelData> = IndexMap::new();
        for (level, data) in levels.into_iter() {
            let finite
                = [data.frequency, data.g_j, data.a_hfs, data.b_hfs]
                .iter()
                .all(|x| x.is_finite());
            if !finite {
                return Err(RateError::Species(
                    format!("{name}: non-finite constant for level {level}")));
            }
            if level_map.insert(level, data).is_some() {
                return Err(RateError::Species(
                    format!("{name}: level {level} listed twice")));
            }
        }
        let mut catalogue = TransitionCatalogue::new();
        for spec in transitions.into_iter() {
            let TransitionSpec { name: tname, lower, upper, einstein_a, multipole }
                = spec;
            let lo = level_map.get(&lower)
                .ok_or_else(|| RateError::Species(
                    format!("{name}: transition {tname} has unknown level {lower}")))?;
            let up = level_map.get(&upper)
                .ok_or_else(|| RateError::Species(
                    format!("{name}: transition {tname} has unknown level {upper}")))?;
            let frequency = up.frequency - lo.frequency;
            if frequency <= 0.0 {
                return Err(RateError::Species(
                    format!("{name}: transition {tname} must go upward in energy")));
            }
            if !einstein_a.is_finite() || einstein_a < 0.0 {
                return Err(RateError::Species(
                    format!("{name}: transition {tname} has invalid A = {einstein_a}")));
            }
            let k = 2 * multipole.rank();
            let (jl, ju) = (lower.j().halves(), upper.j().halves());
            if jl.abs_diff(ju) > k || jl + ju < k {
                return Err(RateError::Species(
                    format!("{name}: transition {tname} is not an allowed {multipole}")));
            }
            let transition
                = Transition { lower, upper, einstein_a, frequency, multipole };
            if catalogue.insert(tname.clone(), transition).is_some() {
                return Err(RateError::Species(
                    format!("{name}: transition {tname} listed twice")));
            }
        }
        Ok(Self {
            name,
            nuclear_spin,
            g_i,
            levels: level_map,
            transitions: catalogue,
        })
    }

    /// Parse and validate a species table in TOML form.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: SpeciesFile = toml::from_str(s)?;
        let nuclear_spin = SpinTotal::try_from_f64(file.nuclear_spin)
            .ok_or_else(|| RateError::Species(
                format!("{}: nuclear spin {} is not a half-integer",
                    file.name, file.nuclear_spin)))?;
        let levels
            = file.levels.into_iter()
            .map(|rec| {
                let data = LevelData {
                    frequency: angular(rec.frequency_hz),
                    g_j: rec.g_j,
                    a_hfs: angular(rec.a_hfs_hz),
                    b_hfs: angular(rec.b_hfs_hz),
                };
                (rec.level, data)
            });
        let transitions
            = file.transitions.into_iter()
            .map(|rec| TransitionSpec {
                name: rec.name,
                lower: rec.lower,
                upper: rec.upper,
                einstein_a: rec.einstein_a,
                multipole: rec.multipole,
            });
        Self::new(file.name, nuclear_spin, file.g_i, levels, transitions)
    }

    pub fn name(&self) -> &str { &self.name }

    /// Nuclear spin `I`.
    pub fn nuclear_spin(&self) -> SpinTotal { self.nuclear_spin }

    /// Nuclear g-factor in units of the Bohr magneton.
    pub fn g_i(&self) -> f64 { self.g_i }

    /// Iterate over levels in table order.
    pub fn levels(&self) -> impl Iterator<Item = (&Level, &LevelData)> {
        self.levels.iter()
    }

    pub fn level(&self, level: &Level) -> Option<&LevelData> {
        self.levels.get(level)
    }

    pub fn transitions(&self) -> &TransitionCatalogue { &self.transitions }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpeciesFile {
    name: String,
    nuclear_spin: f64,
    #[serde(default)]
    g_i: f64,
    levels: Vec<LevelRecord>,
    #[serde(default)]
    transitions: Vec<TransitionRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelRecord {
    level: Level,
    frequency_hz: f64,
    g_j: f64,
    #[serde(default)]
    a_hfs_hz: f64,
    #[serde(default)]
    b_hfs_hz: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransitionRecord {
    name: String,
    lower: Level,
    upper: Level,
    einstein_a: f64,
    multipole: Multipole,
}
