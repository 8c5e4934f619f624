//! An ion species dressed by a static magnetic field.

use std::ops::Range;
use log::debug;
use crate::{
    error::{ RateError, Result },
    index::{ State, StateIndex },
    level::Level,
    provider::LevelStructure,
    species::Species,
    spin::{ multipole_amplitude, Spin, SpinProj },
    transition::TransitionCatalogue,
};

pub mod hyperfine;
pub use hyperfine::Eigenstate;

/// Construction parameters for an [`Ion`].
#[derive(Clone, Debug, PartialEq)]
pub struct IonParams {
    /// Magnetic field in Tesla.
    pub b_field: f64,
    /// Levels to materialize; `None` keeps every level of the species.
    pub level_filter: Option<Vec<Level>>,
}

impl IonParams {
    pub fn new(b_field: f64) -> Self {
        Self { b_field, level_filter: None }
    }

    /// Restrict the ion to a subset of its levels.
    pub fn with_level_filter<I>(mut self, levels: I) -> Self
    where I: IntoIterator<Item = Level>
    {
        self.level_filter = Some(levels.into_iter().collect());
        self
    }
}

/// The sublevels of an ion species at a fixed magnetic field.
///
/// States are indexed level by level in species-table order (skipping levels
/// excluded by the filter), within a level by hyperfine manifold in order of
/// zero-field energy, and within a manifold by ascending `M`. Construction is
/// deterministic, so equal parameters give equal indices.
#[derive(Clone, Debug)]
pub struct Ion {
    species: Species,
    b_field: f64,
    index: StateIndex,
    /// Per-state energy shift from the level's zero-field offset.
    shifts: Vec<f64>,
    eigenstates: Vec<Eigenstate>,
}

impl Ion {
    /// Diagonalize every active level of `species` at the field given in
    /// `params`.
    pub fn new(species: Species, params: IonParams) -> Result<Self> {
        let IonParams { b_field, level_filter } = params;
        if !b_field.is_finite() {
            return Err(RateError::Domain(
                format!("magnetic field must be finite, got {b_field}")));
        }
        if let Some(filter) = &level_filter {
            if let Some(missing)
                = filter.iter().find(|l| species.level(l).is_none())
            {
                return Err(RateError::Species(format!(
                    "{}: level filter names unknown level {missing}",
                    species.name(),
                )));
            }
        }
        let mut index = StateIndex::new();
        let mut shifts: Vec<f64> = Vec::new();
        let mut eigenstates: Vec<Eigenstate> = Vec::new();
        let active
            = species.levels()
            .filter(|(level, _)| {
                level_filter.as_ref()
                    .map(|filter| filter.contains(level))
                    .unwrap_or(true)
            });
        for (level, data) in active {
            let states = hyperfine::diagonalize(
                data,
                species.nuclear_spin(),
                level.j(),
                species.g_i(),
                b_field,
            )?;
            index.push_level(
                *level,
                states.iter().map(|s| (s.f, s.m, data.frequency + s.energy)),
            );
            shifts.extend(states.iter().map(|s| s.energy));
            eigenstates.extend(states);
        }
        debug!(
            "built {} at B = {:e} T: {} states in {} levels",
            species.name(),
            b_field,
            index.num_states(),
            index.levels().count(),
        );
        Ok(Self { species, b_field, index, shifts, eigenstates })
    }

    pub fn species(&self) -> &Species { &self.species }

    /// Magnetic field in Tesla.
    pub fn b_field(&self) -> f64 { self.b_field }

    pub fn state_index(&self) -> &StateIndex { &self.index }

    /// Look up a state by level, hyperfine label and projection.
    pub fn index_f(&self, level: Level, f: f64, m: f64) -> Result<usize> {
        self.index.index_f(level, f, m)
    }

    pub fn state(&self, index: usize) -> Result<&State> {
        self.index.state(index)
    }

    /// Absolute energy of a state in angular frequency, relative to the
    /// zero-field ground level.
    pub fn energy(&self, index: usize) -> Result<f64> {
        self.index.energy(index)
    }

    /// Iterate over active states in index order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.index.states()
    }

    /// Iterate over active levels in index order.
    pub fn levels(&self) -> impl Iterator<Item = &Level> + '_ {
        self.index.levels()
    }

    /// Field-dressed eigenstate at an index.
    pub fn eigenstate(&self, index: usize) -> Result<&Eigenstate> {
        self.eigenstates.get(index).ok_or(RateError::BadIndex(index))
    }

    /// Dominant uncoupled `(M_I, M_J)` labels of a state, i.e. its high-field
    /// quantum numbers.
    pub fn high_field_labels(&self, index: usize) -> Result<(f64, f64)> {
        let (mi, mj) = self.eigenstate(index)?.dominant();
        Ok((mi.f(), mj.f()))
    }

    fn shift(&self, index: usize) -> Result<f64> {
        self.shifts.get(index).copied().ok_or(RateError::BadIndex(index))
    }
}

impl LevelStructure for Ion {
    fn num_states(&self) -> usize { self.index.num_states() }

    fn index(&self, level: Level, m: f64) -> Result<usize> {
        self.index.index(level, m)
    }

    fn delta(&self, i: usize, j: usize) -> Result<f64> {
        Ok(self.shift(j)? - self.shift(i)?)
    }

    fn level_states(&self, level: Level) -> Option<Range<usize>> {
        self.index.level_states(level)
    }

    fn m(&self, index: usize) -> Result<SpinProj> {
        self.index.state(index).map(|s| s.m)
    }

    fn line_strength(&self, lower: usize, upper: usize, rank: u32)
        -> Result<f64>
    {
        let lo = self.index.state(lower)?;
        let up = self.index.state(upper)?;
        let lo_vec = self.eigenstate(lower)?;
        let up_vec = self.eigenstate(upper)?;
        let (jl, ju) = (lo.level.j().halves(), up.level.j().halves());
        let mut amp: f64 = 0.0;
        for (mi_l, mj_l, cl) in lo_vec.components.iter() {
            for (mi_u, mj_u, cu) in up_vec.components.iter() {
                if mi_l != mi_u {
                    continue;
                }
                if let (Some(sl), Some(su))
                    = (Spin::new(jl, mj_l.halves()), Spin::new(ju, mj_u.halves()))
                {
                    amp += cl * cu * multipole_amplitude(sl, su, rank);
                }
            }
        }
        Ok(amp * amp)
    }

    fn transitions(&self) -> &TransitionCatalogue {
        self.species.transitions()
    }
}
