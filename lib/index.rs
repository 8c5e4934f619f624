//! Dense indexing of the active states of an ion.

use std::{ fmt, ops::{ Deref, Range } };
use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;
use crate::{
    error::{ RateError, Result },
    level::Level,
    spin::{ SpinProj, SpinTotal },
};

/// A single field-dressed sublevel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct State {
    pub level: Level,
    /// Adiabatic hyperfine label.
    pub f: SpinTotal,
    /// Total angular momentum projection, an exact quantum number.
    pub m: SpinProj,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} F={} M={}", self.level, self.f, self.m)
    }
}

/// Bijection between [`State`]s and contiguous indices `0..n`, with the energy
/// (angular frequency) of each state.
///
/// The collection is backed by a single [`IndexMap`], accessible through
/// [`Deref`]. States of a level always occupy a contiguous index range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateIndex {
    energies: IndexMap<State, f64>,
    levels: IndexMap<Level, Range<usize>>,
    by_m: HashMap<(Level, SpinProj), Vec<usize>>,
}

impl Deref for StateIndex {
    type Target = IndexMap<State, f64>;

    fn deref(&self) -> &Self::Target { &self.energies }
}

impl StateIndex {
    /// Create a new, empty index.
    pub fn new() -> Self { Self::default() }

    /// Append all states of a level.
    ///
    /// *Panics* if the level was already added.
    pub fn push_level<I>(&mut self, level: Level, states: I)
    where I: IntoIterator<Item = (SpinTotal, SpinProj, f64)>
    {
        if self.levels.contains_key(&level) {
            panic!("StateIndex::push_level: level {level} added twice");
        }
        let start = self.energies.len();
        for (f, m, energy) in states.into_iter() {
            let k = self.energies.len();
            self.energies.insert(State { level, f, m }, energy);
            self.by_m.entry((level, m)).or_default().push(k);
        }
        self.levels.insert(level, start..self.energies.len());
    }

    /// Number of indexed states.
    pub fn num_states(&self) -> usize { self.energies.len() }

    /// Look up the unique state of `level` with projection `m`.
    ///
    /// Fails if `m` is not a half-integer, if there is no such state, or if
    /// several `F` manifolds share that `m`.
    pub fn index(&self, level: Level, m: f64) -> Result<usize> {
        let lookup = || RateError::Lookup { level, m };
        let proj = SpinProj::try_from_f64(m).ok_or_else(lookup)?;
        match self.by_m.get(&(level, proj)).map(|v| v.as_slice()) {
            Some([k]) => Ok(*k),
            Some([_, _, ..]) => Err(RateError::Ambiguous { level, m }),
            _ => Err(lookup()),
        }
    }

    /// Look up a state by all of its quantum numbers.
    pub fn index_f(&self, level: Level, f: f64, m: f64) -> Result<usize> {
        let lookup = || RateError::Lookup { level, m };
        let f = SpinTotal::try_from_f64(f).ok_or_else(lookup)?;
        let m_proj = SpinProj::try_from_f64(m).ok_or_else(lookup)?;
        self.energies.get_index_of(&State { level, f, m: m_proj })
            .ok_or_else(lookup)
    }

    /// Get the state at an index.
    pub fn state(&self, index: usize) -> Result<&State> {
        self.energies.get_index(index)
            .map(|(s, _)| s)
            .ok_or(RateError::BadIndex(index))
    }

    /// Get the energy, in angular frequency, of the state at an index.
    pub fn energy(&self, index: usize) -> Result<f64> {
        self.energies.get_index(index)
            .map(|(_, e)| *e)
            .ok_or(RateError::BadIndex(index))
    }

    /// Iterate over states in index order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.energies.keys()
    }

    /// Iterate over indexed levels in index order.
    pub fn levels(&self) -> impl Iterator<Item = &Level> + '_ {
        self.levels.keys()
    }

    /// Index range occupied by a level, or `None` if it is not indexed.
    pub fn level_states(&self, level: Level) -> Option<Range<usize>> {
        self.levels.get(&level).cloned()
    }
}
