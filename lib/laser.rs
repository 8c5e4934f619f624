//! Laser fields driving named transitions.

use crate::{
    error::{ RateError, Result },
    transition::Transition,
};

/// A laser driving a named transition.
///
/// `q` is the change in `M` on absorption; `intensity` is in units of the
/// saturation intensity; `delta` is the angular frequency detuning from the
/// transition's nominal frequency (see
/// [`LevelStructure::delta`][crate::provider::LevelStructure::delta]).
#[derive(Clone, Debug, PartialEq)]
pub struct Laser {
    transition: String,
    q: i32,
    intensity: f64,
    delta: f64,
}

impl Laser {
    pub fn new<S>(transition: S, q: i32, intensity: f64, delta: f64) -> Self
    where S: Into<String>
    {
        Self { transition: transition.into(), q, intensity, delta }
    }

    /// Name of the driven transition.
    pub fn transition(&self) -> &str { &self.transition }

    /// Polarization component.
    pub fn q(&self) -> i32 { self.q }

    /// Intensity in units of the saturation intensity.
    pub fn intensity(&self) -> f64 { self.intensity }

    /// Detuning in angular frequency.
    pub fn delta(&self) -> f64 { self.delta }

    /// Return a copy of `self` at a different detuning.
    pub fn with_delta(&self, delta: f64) -> Self {
        Self { delta, ..self.clone() }
    }

    /// Return a copy of `self` at a different intensity.
    pub fn with_intensity(&self, intensity: f64) -> Self {
        Self { intensity, ..self.clone() }
    }

    /// Check that `self` can drive `transition`.
    pub fn validate(&self, transition: &Transition) -> Result<()> {
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(RateError::Domain(format!(
                "laser on {}: intensity must be finite and non-negative, got {}",
                self.transition, self.intensity,
            )));
        }
        if !self.delta.is_finite() {
            return Err(RateError::Domain(format!(
                "laser on {}: detuning must be finite, got {}",
                self.transition, self.delta,
            )));
        }
        if !transition.allows_q(self.q) {
            return Err(RateError::Domain(format!(
                "laser on {}: q = {} is not a valid {} polarization",
                self.transition, self.q, transition.multipole,
            )));
        }
        Ok(())
    }
}
