//! Error types for the wave solver.

use thiserror::Error;

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, WaveError>;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug)]
pub enum WaveError {
    /// The grid has no interior, or a physical parameter is not positive.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// The Courant–Friedrichs–Lewy condition is violated.
    #[error("Unstable configuration: Courant number {courant} exceeds 1")]
    UnstableConfiguration { courant: f64 },

    /// A grid index lies outside `[0, nx) × [0, ny)`.
    #[error("Index ({i}, {j}) is outside the grid ({nx}, {ny})")]
    IndexOutOfRange {
        i: usize,
        j: usize,
        nx: usize,
        ny: usize,
    },

    /// A step produced NaN or infinite values.
    #[error("Field became non-finite at step {step}")]
    NonFiniteField { step: usize },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WaveError {
    /// Create an invalid domain error.
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }
}
