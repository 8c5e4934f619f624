//! Incoherent rate-equation models for trapped ions.
//!
//! An [`Ion`] diagonalizes the hyperfine and Zeeman structure of a [`Species`]
//! at a given magnetic field and indexes the resulting sublevels. [`Rates`]
//! then builds matrices `M` for `dN/dt = M N` from spontaneous emission and a
//! set of [`Laser`]s.

pub mod constants;
pub mod error;
pub mod spin;
pub mod level;
pub mod transition;
pub mod species;
pub mod index;
pub mod provider;
pub mod ion;
pub mod laser;
pub mod rates;

pub use error::{ RateError, Result };
pub use ion::{ Ion, IonParams };
pub use laser::Laser;
pub use level::Level;
pub use provider::LevelStructure;
pub use rates::{ LeakPolicy, Rates };
pub use species::Species;
pub use transition::{ Multipole, Transition, TransitionCatalogue };
