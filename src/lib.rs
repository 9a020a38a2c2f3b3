//! Finite difference method for the 2D wave equation with fixed boundary values and
//! scheduled Gaussian disturbances.
//!
//! ```
//! use fdm_pulse::{Disturbance, Domain, Frame, Seed, Solver};
//!
//! let domain = Domain::new((10., 10.), (10, 10), 2.0, 0.05, 4.0)?;
//! let seed = Seed { index: (5, 5), value: 0.3 };
//! let pulse = Disturbance::new(30, (0., 0.), 0.3, 1.0);
//! let mut solver = Solver::new(domain, Some(seed), vec![pulse])?;
//!
//! let mut peak = 0f64;
//! solver.run(|frame: Frame| peak = peak.max(frame.field[(5, 5)].abs()))?;
//! assert_eq!(solver.clock(), 80);
//! # Ok::<(), fdm_pulse::WaveError>(())
//! ```

pub mod config;
pub mod disturbance;
pub mod domain;
pub mod error;
pub mod field;
pub mod solver;
pub mod stencil;

pub use config::SimulationConfig;
pub use disturbance::Disturbance;
pub use domain::Domain;
pub use error::{Result, WaveError};
pub use field::{Field, FieldState, Seed};
pub use solver::{Frame, Observer, Solver};
pub use stencil::{wave_step, wave_step_parallel, Coefficients};
