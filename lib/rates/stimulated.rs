//! Laser-driven (absorption and stimulated emission) rates.

use itertools::Itertools;
use log::{ trace, warn };
use ndarray as nd;
use crate::{
    error::{ RateError, Result },
    laser::Laser,
    provider::LevelStructure,
    rates::STRENGTH_CUTOFF,
    transition::Transition,
};

/// Normalized Lorentzian line shape with FWHM `gamma`, equal to 1 on
/// resonance.
pub(crate) fn lorentzian(gamma: f64, detuning: f64) -> f64 {
    let g2 = gamma * gamma;
    g2 / (g2 + 4.0 * detuning * detuning)
}

/// Resolve every laser's transition and check its parameters before any rate
/// is computed.
fn resolve<'a, P>(ion: &'a P, lasers: &'a [Laser])
    -> Result<Vec<(&'a Laser, &'a Transition)>>
where P: LevelStructure + ?Sized
{
    lasers.iter()
        .map(|laser| {
            let t = ion.transitions().get(laser.transition())?;
            laser.validate(t)?;
            Ok((laser, t))
        })
        .collect()
}

/// Build the stimulated part of the generator for a set of lasers.
///
/// `linewidths[p]` is the total spontaneous decay rate out of state `p`. For a
/// lower state `s` and upper state `p` with `M_p - M_s = q` the rate is
/// ```text
/// R = I * A * w_sp * Γ_p^2 / (Γ_p^2 + 4 δ_sp^2),    δ_sp = δ - delta(s, p)
/// ```
/// and is added symmetrically for absorption (`s -> p`) and stimulated
/// emission (`p -> s`). Contributions of all lasers are summed.
pub(crate) fn stimulated<P>(
    ion: &P,
    linewidths: nd::ArrayView1<f64>,
    lasers: &[Laser],
) -> Result<nd::Array2<f64>>
where P: LevelStructure + ?Sized
{
    let resolved = resolve(ion, lasers)?;
    let n = ion.num_states();
    let mut stim: nd::Array2<f64> = nd::Array2::zeros((n, n));
    for (laser, t) in resolved {
        let (Some(lower), Some(upper))
            = (ion.level_states(t.lower), ion.level_states(t.upper))
        else {
            warn!(
                "laser on {} addresses an inactive level and is ignored",
                laser.transition(),
            );
            continue;
        };
        if laser.intensity() == 0.0 {
            continue;
        }
        for (s, p) in lower.cartesian_product(upper) {
            if ion.m(p)?.halves() - ion.m(s)?.halves() != 2 * laser.q() {
                continue;
            }
            let w = ion.line_strength(s, p, t.multipole.rank())?;
            if w <= STRENGTH_CUTOFF {
                continue;
            }
            let gamma = linewidths[p];
            if gamma.is_nan() || gamma <= 0.0 {
                return Err(RateError::Domain(format!(
                    "laser on {} addresses state {p}, which has no \
                    spontaneous decay to set its linewidth",
                    laser.transition(),
                )));
            }
            let detuning = laser.delta() - ion.delta(s, p)?;
            let r
                = laser.intensity() * t.einstein_a * w
                * lorentzian(gamma, detuning);
            if !r.is_finite() {
                return Err(RateError::Domain(format!(
                    "laser on {} gives non-finite rate {r} for {s} -> {p}",
                    laser.transition(),
                )));
            }
            trace!("{}: {s} <-> {p}, R = {r:e}", laser.transition());
            stim[[p, s]] += r;
            stim[[s, p]] += r;
            stim[[s, s]] -= r;
            stim[[p, p]] -= r;
        }
    }
    Ok(stim)
}
