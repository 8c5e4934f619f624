//! Hyperfine + Zeeman eigenstates of a single fine-structure level.
//!
//! Each level is diagonalized in the uncoupled `|m_I, m_J>` basis, where the
//! Hamiltonian
//! ```text
//! H = A I.J + B Q(I.J) + mu_B B (g_J J_z + g_I I_z)
//! Q(I.J) = [3 (I.J)^2 + 3/2 I.J - I(I+1) J(J+1)] / [2I(2I-1) J(2J-1)]
//! ```
//! is block-diagonal in `M = m_I + m_J`. Eigenstates are labelled by the
//! hyperfine `F` they connect to adiabatically at zero field: within a block,
//! the ascending eigenvalues are matched to the allowed `F` values sorted by
//! zero-field energy.

use ndarray as nd;
use itertools::Itertools;
use crate::{
    constants::MU_B,
    error::{ RateError, Result },
    species::LevelData,
    spin::{ Spin, SpinProj, SpinTotal },
};

/// A field-dressed eigenstate of one level.
#[derive(Clone, Debug, PartialEq)]
pub struct Eigenstate {
    pub f: SpinTotal,
    pub m: SpinProj,
    /// Shift from the level's zero-field offset, in angular frequency.
    pub energy: f64,
    /// Expansion in the uncoupled basis as `(m_I, m_J, amplitude)`.
    pub components: Vec<(SpinProj, SpinProj, f64)>,
}

impl Eigenstate {
    /// Uncoupled `(m_I, m_J)` basis state with the largest weight.
    pub fn dominant(&self) -> (SpinProj, SpinProj) {
        self.components.iter()
            .max_by(|a, b| a.2.abs().total_cmp(&b.2.abs()))
            .map(|(mi, mj, _)| (*mi, *mj))
            .unwrap_or((SpinProj::new(0), SpinProj::new(0)))
    }
}

/// Field-independent part of the quadrupole operator's normalization, or
/// `None` when the operator vanishes identically (`I < 1` or `J < 1`).
fn quadrupole_norm(i: SpinTotal, j: SpinTotal) -> Option<f64> {
    (i.halves() >= 2 && j.halves() >= 2).then(|| {
        let (i, j) = (i.f(), j.f());
        2.0 * i * (2.0 * i - 1.0) * j * (2.0 * j - 1.0)
    })
}

/// Zero-field energy of a hyperfine manifold `F`.
pub fn zero_field_energy(
    data: &LevelData,
    i: SpinTotal,
    j: SpinTotal,
    f: SpinTotal,
) -> f64
{
    let k = f.casimir() - i.casimir() - j.casimir();
    let quad
        = quadrupole_norm(i, j)
        .map(|norm| {
            (0.75 * k * (k + 1.0) - i.casimir() * j.casimir()) / norm
        })
        .unwrap_or(0.0);
    data.a_hfs * k / 2.0 + data.b_hfs * quad
}

/// Allowed `F` values ordered by ascending zero-field energy.
///
/// Ties (e.g. no hyperfine interaction) are broken by ascending `F`.
pub fn f_order(data: &LevelData, i: SpinTotal, j: SpinTotal) -> Vec<SpinTotal> {
    let mut fs: Vec<SpinTotal> = i.couple(j).collect();
    fs.sort_by(|a, b| {
        zero_field_energy(data, i, j, *a)
            .total_cmp(&zero_field_energy(data, i, j, *b))
            .then(a.cmp(b))
    });
    fs
}

/// Hamiltonian block of total projection `m` over the uncoupled basis `basis`.
fn block_hamiltonian(
    data: &LevelData,
    i: SpinTotal,
    j: SpinTotal,
    g_i: f64,
    b_field: f64,
    basis: &[(Spin, Spin)],
) -> nd::Array2<f64>
{
    let n = basis.len();
    let mut ij: nd::Array2<f64> = nd::Array2::zeros((n, n));
    for ((a, (ia, ja)), (b, (ib, jb))) in
        basis.iter().enumerate().cartesian_product(basis.iter().enumerate())
    {
        let (dmi, dmj) = (
            ib.proj().halves() - ia.proj().halves(),
            jb.proj().halves() - ja.proj().halves(),
        );
        ij[[a, b]]
            = match (dmi, dmj) {
                (0, 0) => ia.proj().f() * ja.proj().f(),
                // <a| I- J+ |b>
                (2, -2) => 0.5 * ib.lowering_coeff() * jb.raising_coeff(),
                // <a| I+ J- |b>
                (-2, 2) => 0.5 * ib.raising_coeff() * jb.lowering_coeff(),
                _ => 0.0,
            };
    }
    let mut h: nd::Array2<f64> = data.a_hfs * &ij;
    if let Some(norm) = quadrupole_norm(i, j) {
        let ij2 = ij.dot(&ij);
        let mut q: nd::Array2<f64> = 3.0 * &ij2 + 1.5 * &ij;
        q.diag_mut().mapv_inplace(|x| x - i.casimir() * j.casimir());
        h += &(data.b_hfs / norm * &q);
    }
    for (a, (ia, ja)) in basis.iter().enumerate() {
        h[[a, a]]
            += MU_B * b_field * (data.g_j * ja.proj().f() + g_i * ia.proj().f());
    }
    h
}

/// Eigen-decomposition of a real symmetric matrix with ascending eigenvalues.
fn eigh(h: &nd::Array2<f64>) -> Result<(Vec<f64>, nd::Array2<f64>)> {
    let n = h.nrows();
    if n == 1 {
        return Ok((vec![h[[0, 0]]], nd::Array2::ones((1, 1))));
    }
    let mat = faer::Mat::<f64>::from_fn(n, n, |r, c| h[[r, c]]);
    let eigen = mat.as_ref().self_adjoint_eigen(faer::Side::Lower)
        .map_err(|err| RateError::Eigen(format!("{err:?}")))?;
    let values: Vec<f64> = eigen.S().column_vector().iter().copied().collect();
    let u = eigen.U().to_owned();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));
    let vectors
        = nd::Array2::from_shape_fn((n, n), |(r, c)| u[(r, order[c])]);
    let values = order.iter().map(|k| values[*k]).collect();
    Ok((values, vectors))
}

/// Diagonalize a level with electronic angular momentum `j` in field
/// `b_field` (Tesla).
///
/// States are returned grouped by `F` in zero-field energy order, then by
/// ascending `M`.
pub fn diagonalize(
    data: &LevelData,
    i: SpinTotal,
    j: SpinTotal,
    g_i: f64,
    b_field: f64,
) -> Result<Vec<Eigenstate>>
{
    let fs = f_order(data, i, j);
    let m_max = (i.halves() + j.halves()) as i32;
    let mut states: Vec<Eigenstate> = Vec::new();
    for m in (-m_max..=m_max).step_by(2) {
        let basis: Vec<(Spin, Spin)>
            = i.iter()
            .filter_map(|si| {
                Spin::new(j.halves(), m - si.proj().halves())
                    .map(|sj| (si, sj))
            })
            .collect();
        let block_fs: Vec<SpinTotal>
            = fs.iter().copied()
            .filter(|f| f.halves() as i32 >= m.abs())
            .collect();
        if block_fs.len() != basis.len() {
            return Err(RateError::Eigen(format!(
                "block M = {} has {} basis states but {} F labels",
                SpinProj::new(m), basis.len(), block_fs.len(),
            )));
        }
        let h = block_hamiltonian(data, i, j, g_i, b_field, &basis);
        let (values, vectors) = eigh(&h)?;
        for (k, f) in block_fs.into_iter().enumerate() {
            let components
                = basis.iter()
                .zip(vectors.column(k))
                .map(|((si, sj), c)| (si.proj(), sj.proj(), *c))
                .collect();
            states.push(Eigenstate {
                f,
                m: SpinProj::new(m),
                energy: values[k],
                components,
            });
        }
    }
    let rank = |f: SpinTotal| fs.iter().position(|g| *g == f);
    states.sort_by(|a, b| rank(a.f).cmp(&rank(b.f)).then(a.m.cmp(&b.m)));
    Ok(states)
}
