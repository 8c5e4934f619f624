//! Spontaneous emission rate matrix.

use itertools::Itertools;
use log::{ debug, warn };
use ndarray as nd;
use crate::{
    error::Result,
    provider::LevelStructure,
    rates::{ LeakPolicy, STRENGTH_CUTOFF },
};

/// Build the spontaneous-emission generator of an ion.
///
/// Entry `[s, p]` is the decay rate from upper state `p` to lower state `s`,
/// `A * w_sp`. Diagonal entries are set last, as the negated column sums of the
/// off-diagonal part, so every column sums to zero up to rounding.
pub(crate) fn spontaneous<P>(ion: &P, leak: LeakPolicy)
    -> Result<nd::Array2<f64>>
where P: LevelStructure + ?Sized
{
    let n = ion.num_states();
    let mut spont: nd::Array2<f64> = nd::Array2::zeros((n, n));
    for (name, t) in ion.transitions().iter() {
        let (Some(lower), Some(upper))
            = (ion.level_states(t.lower), ion.level_states(t.upper))
        else {
            debug!("spontaneous: skipping {name}, not all levels are active");
            continue;
        };
        let rank = t.multipole.rank() as i32;
        for (s, p) in lower.cartesian_product(upper) {
            let dm = ion.m(p)?.halves() - ion.m(s)?.halves();
            if dm.abs() > 2 * rank {
                continue;
            }
            let w = ion.line_strength(s, p, t.multipole.rank())?;
            if w > STRENGTH_CUTOFF {
                spont[[s, p]] += t.einstein_a * w;
            }
        }
    }
    if leak == LeakPolicy::Renormalize {
        renormalize(ion, &mut spont);
    }
    for p in 0..n {
        let out: f64 = spont.column(p).sum();
        spont[[p, p]] = -out;
    }
    Ok(spont)
}

/// Scale the decay branches out of every upper state so that they add up to
/// the full decay rate of its level, including branches into inactive levels.
fn renormalize<P>(ion: &P, spont: &mut nd::Array2<f64>)
where P: LevelStructure + ?Sized
{
    let transitions = ion.transitions();
    let uppers
        = transitions.iter()
        .map(|(_, t)| t.upper)
        .unique()
        .filter_map(|level| ion.level_states(level).map(|r| (level, r)));
    for (level, states) in uppers {
        let full = transitions.total_decay_rate(level);
        for p in states {
            let kept: f64 = spont.column(p).sum();
            if kept > 0.0 {
                spont.column_mut(p).mapv_inplace(|x| x * full / kept);
            } else if full > 0.0 {
                warn!(
                    "spontaneous: every decay channel of state {p} ({level}) \
                    leaves the active levels"
                );
            }
        }
    }
}
