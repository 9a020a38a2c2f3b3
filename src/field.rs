//! The three time levels of the displacement field.

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::domain::Domain;
use crate::error::{Result, WaveError};

/// Displacement at one time level, indexed `[i, j]` with shape `(nx, ny)`.
pub type Field = Array2<f64>;

/// Initial displacement of a single grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub index: (usize, usize),
    pub value: f64,
}

/// Owns the `previous`, `current` and `next` buffers.
///
/// The buffers are allocated once and only ever swapped afterwards. The
/// initial field (zero plus the optional seed) is kept so the boundary ring of
/// every new time level can be reset to it.
#[derive(Debug, Clone)]
pub struct FieldState {
    previous: Field,
    current: Field,
    next: Field,
    rest: Field,
}

impl FieldState {
    /// Allocates three zero fields shaped like `domain` and writes the seed, if any.
    ///
    /// `previous` starts equal to `current`, which gives a zero initial velocity.
    pub fn new(domain: &Domain, seed: Option<Seed>) -> Result<Self> {
        let (nx, ny) = domain.dim();
        let mut rest = Field::zeros((nx, ny));
        if let Some(Seed { index: (i, j), value }) = seed {
            if !domain.in_bounds(i, j) {
                return Err(WaveError::IndexOutOfRange { i, j, nx, ny });
            }
            if !value.is_finite() {
                return Err(WaveError::invalid_domain(format!(
                    "seed value must be finite, got {}",
                    value
                )));
            }
            debug!(i, j, value, "seeding initial displacement");
            rest[(i, j)] = value;
        }
        Ok(FieldState {
            previous: rest.clone(),
            current: rest.clone(),
            next: rest.clone(),
            rest,
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.current.dim()
    }

    /// Read-only view of the current time level. It cannot outlive the next
    /// mutation of the state.
    pub fn snapshot(&self) -> ArrayView2<'_, f64> {
        self.current.view()
    }

    pub fn previous(&self) -> ArrayView2<'_, f64> {
        self.previous.view()
    }

    pub fn current_mut(&mut self) -> &mut Field {
        &mut self.current
    }

    /// Splits the state into `(previous, current, next)` for computing the next level.
    pub fn levels_mut(&mut self) -> (&Field, &Field, &mut Field) {
        (&self.previous, &self.current, &mut self.next)
    }

    /// Writes the initial boundary values into `next`.
    pub fn pin_boundary(&mut self) {
        let (nx, ny) = self.dim();
        for &i in &[0, nx - 1] {
            self.next.row_mut(i).assign(&self.rest.row(i));
        }
        for &j in &[0, ny - 1] {
            self.next.column_mut(j).assign(&self.rest.column(j));
        }
    }

    /// `previous ← current`, `current ← next`. The old `previous` storage becomes
    /// the scratch buffer for the following step.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        std::mem::swap(&mut self.current, &mut self.next);
    }
}
