//! One-shot Gaussian pulses added to the field at a given step.

use tracing::{debug, warn};

use crate::domain::Domain;
use crate::error::{Result, WaveError};
use crate::field::Field;

/// An additive pulse `amplitude * exp(-r² / (2 width²))` centered at
/// `(center_x, center_y)`, applied once when the clock reaches `trigger_step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disturbance {
    pub trigger_step: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub amplitude: f64,
    pub width: f64,
}

impl Disturbance {
    pub fn new(trigger_step: usize, center: (f64, f64), amplitude: f64, width: f64) -> Self {
        Disturbance {
            trigger_step,
            center_x: center.0,
            center_y: center.1,
            amplitude,
            width,
        }
    }

    /// A pulse triggered at the step nearest to physical time `time`.
    pub fn at_time(time: f64, dt: f64, center: (f64, f64), amplitude: f64, width: f64) -> Self {
        let trigger_step = (time / dt).round().max(0.) as usize;
        Disturbance::new(trigger_step, center, amplitude, width)
    }

    /// Rejects a non-positive width and non-finite parameters.
    pub fn check(&self) -> Result<()> {
        if !(self.width > 0.0) {
            return Err(WaveError::invalid_domain(format!(
                "disturbance width must be positive, got {}",
                self.width
            )));
        }
        if !self.amplitude.is_finite() || !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(WaveError::invalid_domain(format!(
                "disturbance parameters must be finite: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// `check`, plus a warning when the center lies outside `domain`.
    pub fn validate(&self, domain: &Domain) -> Result<()> {
        self.check()?;
        if !domain.contains(self.center_x, self.center_y) {
            warn!(
                trigger_step = self.trigger_step,
                x = self.center_x,
                y = self.center_y,
                "disturbance center lies outside the domain"
            );
        }
        Ok(())
    }

    /// Contribution of the pulse at the physical point `(x, y)`.
    #[inline]
    pub fn profile(&self, x: f64, y: f64) -> f64 {
        let rx = x - self.center_x;
        let ry = y - self.center_y;
        self.amplitude * (-(rx * rx + ry * ry) / (2. * self.width * self.width)).exp()
    }

    /// Adds the pulse to every point of `field`, boundary included, if `step` is
    /// the trigger step. Does nothing otherwise.
    pub fn apply<'a>(&self, field: &'a mut Field, domain: &Domain, step: usize) -> &'a mut Field {
        if step != self.trigger_step {
            return field;
        }
        debug!(
            step,
            x = self.center_x,
            y = self.center_y,
            amplitude = self.amplitude,
            "applying disturbance"
        );
        for ((i, j), u) in field.indexed_iter_mut() {
            *u += self.profile(domain.x(i), domain.y(j));
        }
        field
    }
}
