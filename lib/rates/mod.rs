//! Rate-equation generators for incoherent population dynamics.
//!
//! A rate matrix `M` is indexed by the ion's active states, with `M[i, j]` the
//! rate of population flow into state `i` from state `j` and
//! `M[j, j] = -sum_{i != j} M[i, j]`, so that populations evolve as
//! `dN/dt = M N` and total population is conserved.

use std::sync::OnceLock;
use log::debug;
use ndarray as nd;
use rayon::iter::{ IntoParallelRefIterator, ParallelIterator };
use crate::{
    error::{ RateError, Result },
    laser::Laser,
    provider::LevelStructure,
};

pub mod spontaneous;
pub mod stimulated;

/// Line strengths below this are treated as forbidden.
pub(crate) const STRENGTH_CUTOFF: f64 = 1e-14;

/// What happens to spontaneous decay into levels excluded from the ion.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LeakPolicy {
    /// Decay branches into inactive levels are dropped, so such upper states
    /// decay more slowly than their true lifetime.
    #[default]
    Drop,
    /// Decay branches into active levels are scaled up so that each upper state
    /// keeps the total decay rate of its level.
    Renormalize,
}

/// Builds rate matrices for a fixed ion.
///
/// The spontaneous part depends only on the ion and is computed once, on first
/// use.
#[derive(Debug)]
pub struct Rates<'a, P>
where P: LevelStructure + ?Sized
{
    ion: &'a P,
    leak: LeakPolicy,
    spont: OnceLock<nd::Array2<f64>>,
}

impl<'a, P> Rates<'a, P>
where P: LevelStructure + ?Sized
{
    /// Create a new `Rates` with the default [`LeakPolicy`].
    pub fn new(ion: &'a P) -> Self {
        Self { ion, leak: LeakPolicy::default(), spont: OnceLock::new() }
    }

    /// Use a different treatment of decay into inactive levels.
    pub fn with_leak_policy(self, leak: LeakPolicy) -> Self {
        Self { ion: self.ion, leak, spont: OnceLock::new() }
    }

    /// Get a reference to the ion.
    pub fn ion(&self) -> &P { self.ion }

    pub fn leak_policy(&self) -> LeakPolicy { self.leak }

    fn spont_ref(&self) -> Result<&nd::Array2<f64>> {
        if let Some(spont) = self.spont.get() {
            return Ok(spont);
        }
        let spont = spontaneous::spontaneous(self.ion, self.leak)?;
        check_finite(&spont)?;
        debug!(
            "computed {n}x{n} spontaneous rate matrix",
            n = spont.nrows(),
        );
        Ok(self.spont.get_or_init(|| spont))
    }

    /// Compute the spontaneous-emission rate matrix.
    pub fn get_spont(&self) -> Result<nd::Array2<f64>> {
        self.spont_ref().cloned()
    }

    /// Compute the stimulated part of the rate matrix for a set of lasers,
    /// without spontaneous emission.
    pub fn get_stimulated(&self, lasers: &[Laser]) -> Result<nd::Array2<f64>> {
        let spont = self.spont_ref()?;
        let linewidths = spont.diag().mapv(|x| -x);
        let stim = stimulated::stimulated(self.ion, linewidths.view(), lasers)?;
        check_finite(&stim)?;
        Ok(stim)
    }

    /// Compute the full rate matrix, spontaneous emission plus the stimulated
    /// contributions of every laser.
    ///
    /// Lasers may address any number of transitions, several per transition;
    /// their contributions add.
    pub fn get_transitions(&self, lasers: &[Laser]) -> Result<nd::Array2<f64>> {
        let stim = self.get_stimulated(lasers)?;
        Ok(stim + self.spont_ref()?)
    }
}

impl<'a, P> Rates<'a, P>
where P: LevelStructure + Sync + ?Sized
{
    /// Evaluate [`Self::get_transitions`] for several laser configurations in
    /// parallel.
    ///
    /// Fails if any single configuration fails.
    pub fn get_transitions_many(&self, configs: &[Vec<Laser>])
        -> Result<Vec<nd::Array2<f64>>>
    {
        self.spont_ref()?;
        configs.par_iter()
            .map(|lasers| self.get_transitions(lasers))
            .collect()
    }
}

fn check_finite(m: &nd::Array2<f64>) -> Result<()> {
    match m.indexed_iter().find(|(_, x)| !x.is_finite()) {
        Some(((i, j), x)) => Err(RateError::Domain(
            format!("rate matrix entry [{i}, {j}] is {x}"))),
        None => Ok(()),
    }
}

/// Sum of each column of a rate matrix, i.e. the net rate of change of total
/// population contributed by each state.
pub fn column_sums(m: &nd::Array2<f64>) -> nd::Array1<f64> {
    m.sum_axis(nd::Axis(0))
}

/// Check that every column of a rate matrix sums to zero within `rel_tol`
/// relative to the column's largest entry.
pub fn check_conservation(m: &nd::Array2<f64>, rel_tol: f64) -> Result<()> {
    for (j, col) in m.columns().into_iter().enumerate() {
        let scale = col.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
        let sum = col.sum();
        if sum.abs() > rel_tol * scale {
            return Err(RateError::Domain(format!(
                "column {j} sums to {sum:e}, relative to scale {scale:e}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ops::Range;
    use super::*;
    use crate::{
        level::Level,
        spin::SpinProj,
        transition::{ Multipole, Transition, TransitionCatalogue },
    };

    const LOWER: Level = Level::new(1, 0, 1);
    const UPPER: Level = Level::new(2, 1, 3);
    const GAMMA: f64 = 2.0e7;

    /// Closed two-state system: |S, m=1/2> and |P, m=3/2>.
    struct TwoState {
        transitions: TransitionCatalogue,
        splitting: f64,
    }

    impl TwoState {
        fn new(splitting: f64, einstein_a: f64) -> Self {
            let mut transitions = TransitionCatalogue::new();
            transitions.insert("cycle", Transition {
                lower: LOWER,
                upper: UPPER,
                einstein_a,
                frequency: 1e15,
                multipole: Multipole::E1,
            });
            Self { transitions, splitting }
        }
    }

    impl LevelStructure for TwoState {
        fn num_states(&self) -> usize { 2 }

        fn index(&self, level: Level, m: f64) -> Result<usize> {
            match (level, m) {
                (LOWER, m) if m == 0.5 => Ok(0),
                (UPPER, m) if m == 1.5 => Ok(1),
                _ => Err(RateError::Lookup { level, m }),
            }
        }

        fn delta(&self, i: usize, j: usize) -> Result<f64> {
            match (i, j) {
                (0, 1) => Ok(self.splitting),
                (1, 0) => Ok(-self.splitting),
                (0, 0) | (1, 1) => Ok(0.0),
                (k, _) if k > 1 => Err(RateError::BadIndex(k)),
                (_, k) => Err(RateError::BadIndex(k)),
            }
        }

        fn level_states(&self, level: Level) -> Option<Range<usize>> {
            match level {
                LOWER => Some(0..1),
                UPPER => Some(1..2),
                _ => None,
            }
        }

        fn m(&self, index: usize) -> Result<SpinProj> {
            match index {
                0 => Ok(SpinProj::new(1)),
                1 => Ok(SpinProj::new(3)),
                k => Err(RateError::BadIndex(k)),
            }
        }

        fn line_strength(&self, _lower: usize, _upper: usize, _rank: u32)
            -> Result<f64>
        {
            Ok(1.0)
        }

        fn transitions(&self) -> &TransitionCatalogue { &self.transitions }
    }

    #[test]
    fn two_state_spont() {
        let ion = TwoState::new(1e6, GAMMA);
        let rates = Rates::new(&ion);
        let spont = rates.get_spont().unwrap();
        assert_eq!(spont, nd::array![[0.0, GAMMA], [0.0, -GAMMA]]);
        assert_eq!(rates.get_spont().unwrap(), spont);
    }

    #[test]
    fn two_state_resonant_rate() {
        let ion = TwoState::new(1e6, GAMMA);
        let rates = Rates::new(&ion);
        let laser = Laser::new("cycle", 1, 0.5, ion.delta(0, 1).unwrap());
        let trans = rates.get_transitions(&[laser]).unwrap();
        assert!((trans[[1, 0]] - 0.5 * GAMMA).abs() < 1e-6);
        assert!((trans[[0, 1]] - 1.5 * GAMMA).abs() < 1e-6);
        check_conservation(&trans, 1e-12).unwrap();
    }

    #[test]
    fn wrong_polarization_does_nothing() {
        let ion = TwoState::new(0.0, GAMMA);
        let rates = Rates::new(&ion);
        let stim = rates.get_stimulated(&[Laser::new("cycle", -1, 1.0, 0.0)])
            .unwrap();
        assert!(stim.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn zero_linewidth_is_a_domain_error() {
        let ion = TwoState::new(0.0, 0.0);
        let rates = Rates::new(&ion);
        let res = rates.get_transitions(&[Laser::new("cycle", 1, 1.0, 0.0)]);
        assert!(matches!(res, Err(RateError::Domain(_))));
        // no laser, no problem
        assert!(rates.get_transitions(&[]).is_ok());
    }

    #[test]
    fn unknown_transition_fails_at_build_time() {
        let ion = TwoState::new(0.0, GAMMA);
        let rates = Rates::new(&ion);
        let lasers = [
            Laser::new("cycle", 1, 1.0, 0.0),
            Laser::new("nope", 1, 1.0, 0.0),
        ];
        assert!(matches!(
            rates.get_transitions(&lasers),
            Err(RateError::UnknownTransition(name)) if name == "nope"
        ));
    }

    #[test]
    fn conservation_check_flags_leaks() {
        let good = nd::array![[-1.0, 2.0], [1.0, -2.0]];
        assert_eq!(column_sums(&good), nd::array![0.0, 0.0]);
        assert!(check_conservation(&good, 1e-12).is_ok());
        let bad = nd::array![[-1.0, 2.0], [0.5, -2.0]];
        assert!(check_conservation(&bad, 1e-12).is_err());
    }
}
