//! Error type shared by the whole crate.

use crate::level::Level;

/// Everything that can go wrong while building an ion or a rate matrix.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// No active state has the requested quantum numbers.
    #[error("no active state with level {level} and m = {m}")]
    Lookup { level: Level, m: f64 },

    /// More than one active state has the requested quantum numbers.
    #[error("level {level} has more than one state with m = {m}; specify F")]
    Ambiguous { level: Level, m: f64 },

    /// A state index outside of the active state range.
    #[error("state index {0} is out of range")]
    BadIndex(usize),

    /// A laser or query names a transition the species does not have.
    #[error("unknown transition '{0}'")]
    UnknownTransition(String),

    /// Numeric input that would put NaN or inf into a rate matrix.
    #[error("domain error: {0}")]
    Domain(String),

    /// Inconsistent species table.
    #[error("invalid species table: {0}")]
    Species(String),

    #[error("error parsing species table: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed eigendecomposition of a hyperfine/Zeeman block.
    #[error("diagonalization error: {0}")]
    Eigen(String),
}

pub type Result<T> = std::result::Result<T, RateError>;
