//! Half-integer angular momentum quantum numbers and the Wigner 3j symbol.
//!
//! Both [`SpinTotal`] and [`SpinProj`] are stored as a number of halves so that
//! all state bookkeeping (hashing, ordering, equality) is exact.

use std::fmt;
use wigner_symbols::Wigner3jm;

/// Projection quantum number `m`, counted in halves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpinProj(i32);

impl SpinProj {
    /// Create a new spin projection from a number of halves.
    pub fn new(halves: i32) -> Self { Self(halves) }

    /// Return `self` as a bare number of halves.
    pub fn halves(self) -> i32 { self.0 }

    /// Value of the projection, half of [`Self::halves`].
    pub fn f(self) -> f64 { f64::from(self.0) / 2.0 }

    /// Create a new spin-projection quantum number from a `f64` value if it is
    /// an exact half-integer.
    pub fn try_from_f64(f: f64) -> Option<Self> {
        let h = 2.0 * f;
        (h.is_finite() && h.fract() == 0.0 && h.abs() <= f64::from(i32::MAX))
            .then(|| Self(h as i32))
    }

    /// Return a reflected copy of `self`, i.e. apply a minus sign.
    pub fn reflected(self) -> Self { Self(-self.0) }
}

impl From<SpinProj> for f64 {
    fn from(m: SpinProj) -> Self { m.f() }
}

impl fmt::Display for SpinProj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

/// Total angular momentum quantum number `j`, counted in halves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpinTotal(u32);

impl SpinTotal {
    /// Create a new total spin from a number of halves.
    pub const fn new(halves: u32) -> Self { Self(halves) }

    pub fn halves(self) -> u32 { self.0 }

    pub fn f(self) -> f64 { f64::from(self.0) / 2.0 }

    /// Create a new total-spin quantum number from a non-negative `f64` value
    /// if it is an exact half-integer.
    pub fn try_from_f64(f: f64) -> Option<Self> {
        let h = 2.0 * f;
        (h.is_finite() && h >= 0.0 && h.fract() == 0.0
            && h <= f64::from(u32::MAX))
            .then(|| Self(h as u32))
    }

    /// Number of projection states, `2j + 1`.
    pub fn multiplicity(self) -> usize { self.0 as usize + 1 }

    /// Eigenvalue of the squared angular momentum operator, `j (j + 1)`.
    pub fn casimir(self) -> f64 {
        let j = self.f();
        j * (j + 1.0)
    }

    /// Return an iterator over available [`Spin`] pairs by ascending projection
    /// number.
    pub fn iter(self) -> SpinProjections {
        SpinProjections { total: self, next: Some(-(self.0 as i32)) }
    }

    /// Return an iterator over the totals available when adding `self` and
    /// `other`, in ascending order.
    pub fn couple(self, other: Self) -> impl Iterator<Item = SpinTotal> {
        let lo = self.0.abs_diff(other.0);
        let hi = self.0 + other.0;
        (lo..=hi).step_by(2).map(SpinTotal)
    }
}

impl IntoIterator for SpinTotal {
    type IntoIter = SpinProjections;
    type Item = Spin;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl From<SpinTotal> for f64 {
    fn from(j: SpinTotal) -> Self { j.f() }
}

impl fmt::Display for SpinTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}/2", self.0)
        }
    }
}

/// A `(total, projection)` spin quantum number pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Spin(SpinTotal, SpinProj);

impl Spin {
    /// Create a new spin if the given spin-projection number (in halves) is
    /// valid for the given total-spin number (in halves).
    pub fn new(j: u32, m: i32) -> Option<Self> {
        let j_i64 = i64::from(j);
        let m_i64 = i64::from(m);
        (
            (-j_i64..=j_i64).contains(&m_i64)
            && (m_i64 - j_i64) % 2 == 0
        )
        .then_some(Self(SpinTotal(j), SpinProj(m)))
    }

    /// Return the [total-spin][SpinTotal] quantum number.
    pub fn total(self) -> SpinTotal { self.0 }

    /// Return the [spin-projection][SpinProj] quantum number.
    pub fn proj(self) -> SpinProj { self.1 }

    /// Return a copy of `self` with the projection reflected.
    pub fn reflected(self) -> Self { Self(self.0, self.1.reflected()) }

    /// Return `true` if the projection number saturates the range of available
    /// spin values.
    pub fn is_stretched(self) -> bool {
        self.1.0.unsigned_abs() == self.0.0
    }

    /// Matrix element `<j, m + 1| J+ |j, m>`, zero for the top state.
    pub fn raising_coeff(self) -> f64 {
        let m = self.1.f();
        (self.0.casimir() - m * (m + 1.0)).max(0.0).sqrt()
    }

    /// Matrix element `<j, m - 1| J- |j, m>`, zero for the bottom state.
    pub fn lowering_coeff(self) -> f64 {
        let m = self.1.f();
        (self.0.casimir() - m * (m - 1.0)).max(0.0).sqrt()
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}, {}>", self.0, self.1)
    }
}

/// Iterator over spin projection states for a fixed total spin magnitude.
///
/// Projection states are visited in ascending order.
#[derive(Copy, Clone, Debug)]
pub struct SpinProjections {
    total: SpinTotal,
    next: Option<i32>,
}

impl Iterator for SpinProjections {
    type Item = Spin;

    fn next(&mut self) -> Option<Self::Item> {
        let m = self.next?;
        let j = self.total.0 as i32;
        self.next = (m + 2 <= j).then_some(m + 2);
        Some(Spin(self.total, SpinProj(m)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.next
            .map(|m| ((self.total.0 as i32 - m) / 2 + 1) as usize)
            .unwrap_or(0);
        (n, Some(n))
    }
}

impl ExactSizeIterator for SpinProjections { }

/// Calculate the Wigner 3j symbol for columns (left to right) `s1..s3`.
pub fn w3j(s1: Spin, s2: Spin, s3: Spin) -> f64 {
    Wigner3jm {
        tj1: s1.total().halves() as i32,
        tm1: s1.proj().halves(),
        tj2: s2.total().halves() as i32,
        tm2: s2.proj().halves(),
        tj3: s3.total().halves() as i32,
        tm3: s3.proj().halves(),
    }
    .value()
    .into()
}

/// Reduced-matrix-element-normalized amplitude for the multipole transition
/// `|j_u, m_u> -> |j_l, m_l>` of tensor rank `k`.
///
/// This is `(-1)^(j_l - m_l) sqrt(2 j_u + 1) (j_l k j_u; -m_l q m_u)` with
/// `q = m_l - m_u`, so that the squares summed over all `m_l` (and hence all
/// `q`) give 1 for any fixed `m_u`. Returns zero when `|q| > k`.
pub fn multipole_amplitude(lower: Spin, upper: Spin, rank: u32) -> f64 {
    let q = lower.proj().halves() - upper.proj().halves();
    let k = 2 * rank as i32;
    if q.abs() > k {
        return 0.0;
    }
    let photon = Spin(SpinTotal(2 * rank), SpinProj(q));
    let phase_halves = lower.total().halves() as i32 - lower.proj().halves();
    let sign = if (phase_halves / 2) % 2 == 0 { 1.0 } else { -1.0 };
    sign
        * f64::from(upper.total().multiplicity() as u32).sqrt()
        * w3j(lower.reflected(), photon, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projections_ascend() {
        let j = SpinTotal::new(3);
        let ms: Vec<i32> = j.iter().map(|s| s.proj().halves()).collect();
        assert_eq!(ms, vec![-3, -1, 1, 3]);
        assert_eq!(j.iter().len(), 4);
    }

    #[test]
    fn half_integer_parsing() {
        assert_eq!(SpinProj::try_from_f64(2.5), Some(SpinProj::new(5)));
        assert_eq!(SpinProj::try_from_f64(0.3), None);
        assert_eq!(SpinTotal::try_from_f64(-0.5), None);
        assert!(Spin::new(3, 2).is_none());
        assert!(Spin::new(3, 5).is_none());
    }

    #[test]
    fn coupled_totals() {
        let totals: Vec<u32>
            = SpinTotal::new(7).couple(SpinTotal::new(3))
            .map(|j| j.halves())
            .collect();
        assert_eq!(totals, vec![4, 6, 8, 10]);
    }

    #[test]
    fn dipole_amplitudes_sum_to_one() {
        let ju = SpinTotal::new(3);
        let jl = SpinTotal::new(1);
        for upper in ju {
            let total: f64
                = jl.iter()
                .map(|lower| multipole_amplitude(lower, upper, 1).powi(2))
                .sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn quadrupole_amplitudes_sum_to_one() {
        let ju = SpinTotal::new(5);
        let jl = SpinTotal::new(1);
        for upper in ju {
            let total: f64
                = jl.iter()
                .map(|lower| multipole_amplitude(lower, upper, 2).powi(2))
                .sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn stretched_dipole_is_closed() {
        let upper = Spin::new(3, 3).unwrap();
        let lower = Spin::new(1, 1).unwrap();
        assert!(upper.is_stretched());
        assert!((multipole_amplitude(lower, upper, 1).powi(2) - 1.0).abs() < 1e-12);
    }
}
