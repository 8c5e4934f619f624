//! 40Ca+, with no nuclear spin.

use crate::{
    error::Result,
    species::{ calcium, LevelData, Species },
    spin::SpinTotal,
};

pub use calcium::{ GROUND_LEVEL, S12, P12, P32, D32, D52 };

/// Build the 40Ca+ species table.
pub fn species() -> Result<Species> {
    let levels
        = calcium::LEVELS.into_iter()
        .map(|level| {
            let data = LevelData {
                frequency: calcium::level_frequency(level),
                g_j: calcium::level_g_j(level),
                a_hfs: 0.0,
                b_hfs: 0.0,
            };
            (level, data)
        });
    Species::new("40Ca+", SpinTotal::new(0), 0.0, levels, calcium::transitions())
}
