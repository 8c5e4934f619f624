//! Physical constants, in SI units with frequencies as angular frequencies.

use std::f64::consts::TAU;

// Bohr magneton over Planck's constant [Hz / T]
pub const MU_B_HZ: f64 = 13.996_244_936e9;

// Bohr magneton over reduced Planck's constant [rad s^-1 / T]
pub const MU_B: f64 = TAU * MU_B_HZ;

// electron-to-proton mass ratio [dimensionless]
pub const ME_OVER_MP: f64 = 5.446_170_214_87e-4;

// speed of light [m / s]
pub const C: f64 = 299_792_458.0;

/// Convert a frequency in Hz to an angular frequency.
pub fn angular(f_hz: f64) -> f64 { TAU * f_hz }

/// Nuclear g-factor in units of the Bohr magneton, for the convention
/// `H = mu_B B (g_J J_z + g_I I_z)`, from the nuclear magnetic moment `mu_I`
/// in nuclear magnetons.
pub fn nuclear_g(mu_i: f64, nuclear_spin: f64) -> f64 {
    if nuclear_spin == 0.0 { 0.0 } else { -mu_i / nuclear_spin * ME_OVER_MP }
}
