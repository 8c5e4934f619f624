//! Named optical transitions between levels.

use std::fmt;
use indexmap::IndexMap;
use serde::Deserialize;
use crate::{
    error::{ RateError, Result },
    level::Level,
};

/// Multipole order of a transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Multipole {
    /// Electric dipole.
    E1,
    /// Electric quadrupole.
    E2,
}

impl Multipole {
    /// Tensor rank of the transition operator.
    pub fn rank(self) -> u32 {
        match self {
            Self::E1 => 1,
            Self::E2 => 2,
        }
    }
}

impl fmt::Display for Multipole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::E1 => write!(f, "E1"),
            Self::E2 => write!(f, "E2"),
        }
    }
}

/// A transition `lower -> upper` with its spontaneous emission rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transition {
    pub lower: Level,
    pub upper: Level,
    /// Einstein A coefficient in s^-1, the total decay rate of every upper
    /// sublevel into the lower level.
    pub einstein_a: f64,
    /// Nominal transition angular frequency, the difference of the two levels'
    /// zero-field offsets.
    pub frequency: f64,
    pub multipole: Multipole,
}

impl Transition {
    /// Return `true` if `q` is a valid polarization component for this
    /// transition's multipole order.
    pub fn allows_q(&self, q: i32) -> bool {
        q.unsigned_abs() <= self.multipole.rank()
    }

    /// Nominal transition wavelength in meters.
    pub fn wavelength(&self) -> f64 {
        std::f64::consts::TAU * crate::constants::C / self.frequency
    }
}

/// Name-ordered collection of [`Transition`]s.
///
/// Iteration order is the order in which transitions were inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionCatalogue {
    transitions: IndexMap<String, Transition>,
}

impl TransitionCatalogue {
    /// Create a new, empty catalogue.
    pub fn new() -> Self { Self::default() }

    /// Add a transition, replacing any existing transition of the same name.
    pub fn insert<S>(&mut self, name: S, transition: Transition)
        -> Option<Transition>
    where S: Into<String>
    {
        self.transitions.insert(name.into(), transition)
    }

    /// Look up a transition by name.
    pub fn get(&self, name: &str) -> Result<&Transition> {
        self.transitions.get(name)
            .ok_or_else(|| RateError::UnknownTransition(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transitions.contains_key(name)
    }

    pub fn len(&self) -> usize { self.transitions.len() }

    pub fn is_empty(&self) -> bool { self.transitions.is_empty() }

    /// Iterate over `(name, transition)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Transition)> {
        self.transitions.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Iterate over all transitions decaying out of `upper`.
    pub fn from_upper(&self, upper: Level)
        -> impl Iterator<Item = (&str, &Transition)>
    {
        self.iter().filter(move |(_, t)| t.upper == upper)
    }

    /// Total spontaneous decay rate of `upper` summed over every transition in
    /// the catalogue.
    pub fn total_decay_rate(&self, upper: Level) -> f64 {
        self.from_upper(upper).map(|(_, t)| t.einstein_a).sum()
    }
}
