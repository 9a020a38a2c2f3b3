//! Discretized rectangular domain.

use crate::error::{Result, WaveError};

/// Rounding slack of the CFL check, so a step exactly at the limit is accepted.
const COURANT_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// Immutable geometry and time discretization of a simulation.
///
/// Grid point `(i, j)` sits at `(x0 + i * dx, y0 + j * dy)` where `(x0, y0)`
/// is the origin. The default origin is the corner of the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    lx: f64,
    ly: f64,
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    wave_speed: f64,
    dt: f64,
    t_max: f64,
    origin: (f64, f64),
}

impl Domain {
    /// Creates a domain and validates it, including the CFL condition.
    ///
    /// - `extent`: `(Lx, Ly)`
    /// - `points`: `(Nx, Ny)`, each at least 3
    /// - `wave_speed`: `c`
    /// - `dt`: time step
    /// - `t_max`: final time, the number of steps is `floor(t_max / dt)`
    pub fn new(
        extent: (f64, f64),
        points: (usize, usize),
        wave_speed: f64,
        dt: f64,
        t_max: f64,
    ) -> Result<Self> {
        let (lx, ly) = extent;
        let (nx, ny) = points;
        if nx < 3 || ny < 3 {
            return Err(WaveError::invalid_domain(format!(
                "grid must have at least 3 points per axis (nx={}, ny={})",
                nx, ny
            )));
        }
        if !(lx > 0.0 && ly > 0.0) {
            return Err(WaveError::invalid_domain(format!(
                "extents must be positive (lx={}, ly={})",
                lx, ly
            )));
        }
        if !(wave_speed > 0.0) {
            return Err(WaveError::invalid_domain(format!(
                "wave speed must be positive, got {}",
                wave_speed
            )));
        }
        if !(dt > 0.0) {
            return Err(WaveError::invalid_domain(format!(
                "time step must be positive, got {}",
                dt
            )));
        }
        if !(t_max > 0.0) || !t_max.is_finite() {
            return Err(WaveError::invalid_domain(format!(
                "final time must be finite and positive, got {}",
                t_max
            )));
        }

        let domain = Domain {
            lx,
            ly,
            nx,
            ny,
            dx: lx / (nx - 1) as f64,
            dy: ly / (ny - 1) as f64,
            wave_speed,
            dt,
            t_max,
            origin: (0., 0.),
        };

        let courant = domain.courant_number();
        if !(courant <= 1.0 + COURANT_TOLERANCE) {
            return Err(WaveError::UnstableConfiguration { courant });
        }
        Ok(domain)
    }

    /// Returns the same domain with grid coordinates shifted so that index
    /// `(0, 0)` sits at `origin`.
    pub fn with_origin(mut self, origin: (f64, f64)) -> Self {
        self.origin = origin;
        self
    }

    /// Returns the same domain with the origin at its center.
    pub fn centered(self) -> Self {
        let (lx, ly) = (self.lx, self.ly);
        self.with_origin((-0.5 * lx, -0.5 * ly))
    }

    /// `c * dt * sqrt(1/dx² + 1/dy²)`; the scheme is stable iff this is at most 1.
    pub fn courant_number(&self) -> f64 {
        self.wave_speed * self.dt * (1. / (self.dx * self.dx) + 1. / (self.dy * self.dy)).sqrt()
    }

    /// Largest stable time step for this grid and wave speed.
    pub fn max_stable_dt(&self) -> f64 {
        1. / (self.wave_speed * (1. / (self.dx * self.dx) + 1. / (self.dy * self.dy)).sqrt())
    }

    /// Number of steps, `floor(t_max / dt)`.
    pub fn step_count(&self) -> usize {
        (self.t_max / self.dt).floor() as usize
    }

    /// `(Nx, Ny)`, the shape of every field.
    pub fn dim(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn spacing(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    pub fn wave_speed(&self) -> f64 {
        self.wave_speed
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Physical x coordinate of column index `i`.
    pub fn x(&self, i: usize) -> f64 {
        self.origin.0 + i as f64 * self.dx
    }

    /// Physical y coordinate of row index `j`.
    pub fn y(&self, j: usize) -> f64 {
        self.origin.1 + j as f64 * self.dy
    }

    pub fn in_bounds(&self, i: usize, j: usize) -> bool {
        i < self.nx && j < self.ny
    }

    /// Whether the physical point lies inside the (closed) domain rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (x0, y0) = self.origin;
        x >= x0 && x <= x0 + self.lx && y >= y0 && y <= y0 + self.ly
    }

    pub fn is_boundary(&self, i: usize, j: usize) -> bool {
        i == 0 || j == 0 || i == self.nx - 1 || j == self.ny - 1
    }

    /// Physical time at step `t`.
    pub fn time_at(&self, t: usize) -> f64 {
        t as f64 * self.dt
    }
}
