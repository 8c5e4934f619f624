//! 43Ca+, nuclear spin 7/2.

use crate::{
    constants::{ angular, nuclear_g },
    error::Result,
    level::Level,
    species::{ calcium, LevelData, Species },
    spin::SpinTotal,
};

pub use calcium::{ GROUND_LEVEL, S12, P12, P32, D32, D52 };

// nuclear magnetic moment [nuclear magnetons]
pub const MU_I: f64 = -1.315_348;

pub const NUCLEAR_SPIN: SpinTotal = SpinTotal::new(7);

// hyperfine constants (A, B) [Hz]
fn hyperfine(level: Level) -> (f64, f64) {
    match level {
        S12 => (-806.402_071_60e6, 0.0),
        P12 => (-145.4e6, 0.0),
        P32 => (-31.4e6, -6.9e6),
        D32 => (-47.319_952e6, -3.716_397e6),
        _ => (-3.893_1e6, -4.241e6),
    }
}

/// Build the 43Ca+ species table.
pub fn species() -> Result<Species> {
    let levels
        = calcium::LEVELS.into_iter()
        .map(|level| {
            let (a, b) = hyperfine(level);
            let data = LevelData {
                frequency: calcium::level_frequency(level),
                g_j: calcium::level_g_j(level),
                a_hfs: angular(a),
                b_hfs: angular(b),
            };
            (level, data)
        });
    Species::new(
        "43Ca+",
        NUCLEAR_SPIN,
        nuclear_g(MU_I, NUCLEAR_SPIN.f()),
        levels,
        calcium::transitions(),
    )
}
