//! The interface through which rate matrices query an ion's level structure.

use std::ops::Range;
use crate::{
    error::Result,
    level::Level,
    spin::SpinProj,
    transition::TransitionCatalogue,
};

/// Level structure of an ion: indexed states, their resonance frequencies and
/// coupling strengths, and the named transitions between levels.
///
/// Only an *active* subset of levels needs to be indexed; a level for which
/// [`Self::level_states`] returns `None` is treated as absent.
pub trait LevelStructure {
    /// Number of active states, i.e. the dimension of rate matrices.
    fn num_states(&self) -> usize;

    /// Index of the unique active state of `level` with projection `m`.
    fn index(&self, level: Level, m: f64) -> Result<usize>;

    /// Signed angular frequency of the resonance `i -> j`, measured from the
    /// nominal frequency of the transition between their levels.
    ///
    /// A laser with detuning equal to `delta(s, p)` is resonant with the
    /// `s -> p` sublevel transition.
    fn delta(&self, i: usize, j: usize) -> Result<f64>;

    /// Contiguous index range of an active level.
    fn level_states(&self, level: Level) -> Option<Range<usize>>;

    /// Total angular momentum projection of a state.
    fn m(&self, index: usize) -> Result<SpinProj>;

    /// Relative strength of the rank-`rank` multipole coupling between a lower
    /// and an upper state.
    ///
    /// For each upper state, strengths summed over all states of a complete
    /// lower level equal 1.
    fn line_strength(&self, lower: usize, upper: usize, rank: u32)
        -> Result<f64>;

    /// All named transitions, including those touching inactive levels.
    fn transitions(&self) -> &TransitionCatalogue;

    /// Return `true` if `level` is indexed.
    fn is_active(&self, level: Level) -> bool {
        self.level_states(level).is_some()
    }
}
