//! Level labels and transition data shared by the calcium isotopes.
//!
//! Offsets, lifetimes and branching ratios are those of the 40Ca+ isotope; the
//! isotope shifts of 43Ca+ are well below anything the rate equations resolve.

use crate::{
    constants::angular,
    level::Level,
    species::TransitionSpec,
    transition::Multipole,
};

pub const S12: Level = Level::new(4, 0, 1);
pub const P12: Level = Level::new(4, 1, 1);
pub const P32: Level = Level::new(4, 1, 3);
pub const D32: Level = Level::new(3, 2, 3);
pub const D52: Level = Level::new(3, 2, 5);

pub const GROUND_LEVEL: Level = S12;

/// Species-table order of the calcium levels.
pub const LEVELS: [Level; 5] = [S12, D32, D52, P12, P32];

// zero-field offsets from the ground level [Hz]
pub(crate) const F_D32: f64 = 409.222_530e12;
pub(crate) const F_D52: f64 = 411.042_129_776e12;
pub(crate) const F_P12: f64 = 755.222_766e12;
pub(crate) const F_P32: f64 = 761.905_012e12;

// Landé g-factors [dimensionless]
pub(crate) const G_S12: f64 = 2.002_256_64;
pub(crate) const G_P12: f64 = 2.0 / 3.0;
pub(crate) const G_P32: f64 = 4.0 / 3.0;
pub(crate) const G_D32: f64 = 4.0 / 5.0;
pub(crate) const G_D52: f64 = 1.200_334_0;

/// Level frequency offset in angular units.
pub(crate) fn level_frequency(level: Level) -> f64 {
    angular(match level {
        D32 => F_D32,
        D52 => F_D52,
        P12 => F_P12,
        P32 => F_P32,
        _ => 0.0,
    })
}

pub(crate) fn level_g_j(level: Level) -> f64 {
    match level {
        S12 => G_S12,
        P12 => G_P12,
        P32 => G_P32,
        D32 => G_D32,
        _ => G_D52,
    }
}

/// Named transitions with Einstein A coefficients [s^-1].
pub fn transitions() -> Vec<TransitionSpec> {
    [
        ("397", S12, P12, 1.32e8, Multipole::E1),
        ("393", S12, P32, 1.35e8, Multipole::E1),
        ("866", D32, P12, 8.4e6, Multipole::E1),
        ("850", D32, P32, 0.955e6, Multipole::E1),
        ("854", D52, P32, 8.48e6, Multipole::E1),
        ("729", S12, D52, 0.856, Multipole::E2),
        ("733", S12, D32, 0.850, Multipole::E2),
    ]
    .into_iter()
    .map(|(name, lower, upper, einstein_a, multipole)| TransitionSpec {
        name: name.to_string(),
        lower,
        upper,
        einstein_a,
        multipole,
    })
    .collect()
}
