//! TOML configuration of a simulation.
//!
//! ```toml
//! [domain]
//! lx = 10.0
//! ly = 10.0
//! nx = 10
//! ny = 10
//! t_max = 4.0
//! dt = 0.05
//! wave_speed = 2.0
//! origin = "corner"   # or "center"
//!
//! [seed]
//! i = 5
//! j = 5
//! value = 0.3
//!
//! [[disturbances]]
//! trigger_step = 30   # or trigger_time = 1.5
//! center_x = 0.0
//! center_y = 0.0
//! amplitude = 0.3
//! width = 1.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::disturbance::Disturbance;
use crate::domain::Domain;
use crate::error::{Result, WaveError};
use crate::field::Seed;
use crate::solver::Solver;

/// Where grid index `(0, 0)` sits in physical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// `(0, 0)`
    #[default]
    Corner,
    /// `(-lx / 2, -ly / 2)`
    Center,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub lx: f64,
    pub ly: f64,
    pub nx: usize,
    pub ny: usize,
    pub t_max: f64,
    pub dt: f64,
    pub wave_speed: f64,
    #[serde(default)]
    pub origin: Origin,
}

impl DomainConfig {
    pub fn build(&self) -> Result<Domain> {
        let domain = Domain::new(
            (self.lx, self.ly),
            (self.nx, self.ny),
            self.wave_speed,
            self.dt,
            self.t_max,
        )?;
        Ok(match self.origin {
            Origin::Corner => domain,
            Origin::Center => domain.centered(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub i: usize,
    pub j: usize,
    pub value: f64,
}

impl From<SeedConfig> for Seed {
    fn from(s: SeedConfig) -> Seed {
        Seed {
            index: (s.i, s.j),
            value: s.value,
        }
    }
}

/// A disturbance triggered either at an integer step or at the step nearest to
/// a physical time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_time: Option<f64>,
    pub center_x: f64,
    pub center_y: f64,
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default = "default_width")]
    pub width: f64,
}

fn default_amplitude() -> f64 {
    0.3
}

fn default_width() -> f64 {
    1.0
}

impl DisturbanceConfig {
    pub fn resolve(&self, dt: f64) -> Result<Disturbance> {
        let center = (self.center_x, self.center_y);
        match (self.trigger_step, self.trigger_time) {
            (Some(step), None) => Ok(Disturbance::new(step, center, self.amplitude, self.width)),
            (None, Some(time)) if time >= 0.0 && time.is_finite() => {
                Ok(Disturbance::at_time(time, dt, center, self.amplitude, self.width))
            }
            (None, Some(time)) => Err(WaveError::invalid_domain(format!(
                "disturbance trigger_time must be finite and non-negative, got {}",
                time
            ))),
            _ => Err(WaveError::invalid_domain(
                "disturbance needs exactly one of trigger_step and trigger_time",
            )),
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub domain: DomainConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedConfig>,
    #[serde(default)]
    pub disturbances: Vec<DisturbanceConfig>,
}

impl Default for SimulationConfig {
    /// A 10 × 10 membrane with a raised center point, hit at its corner after 30 steps.
    fn default() -> Self {
        SimulationConfig {
            domain: DomainConfig {
                lx: 10.,
                ly: 10.,
                nx: 10,
                ny: 10,
                t_max: 4.,
                dt: 0.05,
                wave_speed: 2.,
                origin: Origin::Corner,
            },
            seed: Some(SeedConfig {
                i: 5,
                j: 5,
                value: 0.3,
            }),
            disturbances: vec![DisturbanceConfig {
                trigger_step: Some(30),
                trigger_time: None,
                center_x: 0.,
                center_y: 0.,
                amplitude: 0.3,
                width: 1.,
            }],
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks everything that can be checked without allocating the fields.
    pub fn validate(&self) -> Result<()> {
        let domain = self.domain.build()?;
        if let Some(seed) = self.seed {
            if !domain.in_bounds(seed.i, seed.j) {
                let (nx, ny) = domain.dim();
                return Err(WaveError::IndexOutOfRange {
                    i: seed.i,
                    j: seed.j,
                    nx,
                    ny,
                });
            }
            if !seed.value.is_finite() {
                return Err(WaveError::invalid_domain(format!(
                    "seed value must be finite, got {}",
                    seed.value
                )));
            }
        }
        // off-domain centers are reported once, by `Solver::new`
        for disturbance in &self.disturbances {
            disturbance.resolve(domain.dt())?.check()?;
        }
        Ok(())
    }

    /// Creates the solver described by this configuration.
    pub fn build(&self) -> Result<Solver> {
        let domain = self.domain.build()?;
        let schedule = self
            .disturbances
            .iter()
            .map(|d| d.resolve(domain.dt()))
            .collect::<Result<Vec<_>>>()?;
        Solver::new(domain, self.seed.map(Seed::from), schedule)
    }
}
