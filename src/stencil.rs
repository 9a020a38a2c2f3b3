//! Explicit leapfrog stencil for `∂²u/∂t² = c²∇²u`.
//!
//! All kernels share the same memory layout: a field of shape `(nx, ny)` is stored
//! row-major as `[[f64; ny]; nx]`, so row `i` holds the `ny` values `u[i, 0..ny]`.
//! Only interior points `1 <= i <= nx - 2`, `1 <= j <= ny - 2` are written; the
//! boundary of the output is left untouched.
//!
//! The per-cell expression is the same in every kernel and is evaluated in a
//! fixed order, so the sequential, split and `ndarray` kernels produce
//! bit-identical results.

use ndarray::{ArrayView2, ArrayViewMut2};

use crate::domain::Domain;

/// Constants of the update, derived from a `Domain`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// dx²
    pub dx2: f64,
    /// dy²
    pub dy2: f64,
    /// c²·dt²
    pub c2dt2: f64,
}

impl Coefficients {
    pub fn new(domain: &Domain) -> Self {
        let (dx, dy) = domain.spacing();
        let c = domain.wave_speed();
        let dt = domain.dt();
        Coefficients {
            dx2: dx * dx,
            dy2: dy * dy,
            c2dt2: c * c * dt * dt,
        }
    }

    /// The update of a single point.
    ///
    /// - `u`: previous value
    /// - `v`: current value
    /// - `(vw, ve)`: current values at `i - 1` and `i + 1`
    /// - `(vs, vn)`: current values at `j - 1` and `j + 1`
    #[inline(always)]
    pub fn update(&self, u: f64, v: f64, (vw, ve): (f64, f64), (vs, vn): (f64, f64)) -> f64 {
        let laplacian = (ve - 2. * v + vw) / self.dx2 + (vn - 2. * v + vs) / self.dy2;
        2. * v - u + self.c2dt2 * laplacian
    }
}

/// Computes the interior rows `rows.0..rows.1` of the next step.
///
/// `w` holds exactly the rows `rows.0..rows.1` of the output.
fn wave_step_sub(
    u: &[f64],
    v: &[f64],
    w: &mut [f64],
    dim: (usize, usize),
    rows: (usize, usize),
    coef: &Coefficients,
) {
    let (nx, ny) = dim;
    let (rs, re) = rows;
    let n = nx * ny;
    debug_assert!(rs <= re);
    debug_assert!(re <= nx);
    debug_assert_eq!(u.len(), n);
    debug_assert_eq!(v.len(), n);
    debug_assert_eq!(w.len(), (re - rs) * ny);

    let w_offset = rs * ny;

    for i in rs.max(1)..re.min(nx - 1) {
        let s0 = ny * (i - 1);
        let s1 = ny * i;
        let s2 = ny * (i + 1);
        for j in 1..ny - 1 {
            w[s1 + j - w_offset] = coef.update(
                u[s1 + j],
                v[s1 + j],
                (v[s0 + j], v[s2 + j]),
                (v[s1 + j - 1], v[s1 + j + 1]),
            );
        }
    }
}

/// Performs one step of the finite difference scheme for the wave equation. Boundary
/// values of `w` are not modified.
///
/// The discretization is the standard central 2nd order difference in both space and time.
///
/// - `u`: value at step `n - 1`
/// - `v`: value at step `n`
/// - `w`: computed value at step `n + 1`
/// - `dim`: format `(nx, ny)` so that memory layout for `u`, `v` and `w` is `[[f64 ; ny]; nx]`
pub fn wave_step(u: &[f64], v: &[f64], w: &mut [f64], dim: (usize, usize), coef: &Coefficients) {
    let (nx, ny) = dim;
    let n = nx * ny;
    assert!(nx >= 3 && ny >= 3, "grid {:?} has no interior", dim);
    assert_eq!(u.len(), n);
    assert_eq!(v.len(), n);
    assert_eq!(w.len(), n);

    wave_step_sub(u, v, w, dim, (0, nx), coef);
}

/// Number of output elements below which a band of rows is not split further.
const ELEMS_PER_TASK: usize = 200 * 1024;

/// Same as `wave_step`, splitting the rows into bands that run in parallel when
/// the `rayon` feature is enabled.
pub fn wave_step_parallel(
    u: &[f64],
    v: &[f64],
    w: &mut [f64],
    dim: (usize, usize),
    coef: &Coefficients,
) {
    wave_step_split(u, v, w, dim, coef, ELEMS_PER_TASK);
}

fn wave_step_split(
    u: &[f64],
    v: &[f64],
    w: &mut [f64],
    dim: (usize, usize),
    coef: &Coefficients,
    elems_per_task: usize,
) {
    let (nx, ny) = dim;
    let n = nx * ny;
    assert!(nx >= 3 && ny >= 3, "grid {:?} has no interior", dim);
    assert_eq!(u.len(), n);
    assert_eq!(v.len(), n);
    assert_eq!(w.len(), n);

    fn inner(
        u: &[f64],
        v: &[f64],
        w: &mut [f64],
        dim: (usize, usize),
        rows: (usize, usize),
        coef: &Coefficients,
        elems_per_task: usize,
    ) {
        let (row_start, row_end) = rows;
        if row_end - row_start > 1 && w.len() > elems_per_task {
            let (_, ny) = dim;
            let mid = (row_start + row_end) / 2;
            let (left, right) = w.split_at_mut((mid - row_start) * ny);
            join(
                || inner(u, v, left, dim, (row_start, mid), coef, elems_per_task),
                || inner(u, v, right, dim, (mid, row_end), coef, elems_per_task),
            );
        } else {
            wave_step_sub(u, v, w, dim, rows, coef);
        }
    }

    inner(u, v, w, dim, (0, nx), coef, elems_per_task);
}

#[cfg(feature = "rayon")]
fn join<A, B>(a: A, b: B)
where
    A: FnOnce() + Send,
    B: FnOnce() + Send,
{
    rayon::join(a, b);
}

#[cfg(not(feature = "rayon"))]
fn join<A, B>(a: A, b: B)
where
    A: FnOnce(),
    B: FnOnce(),
{
    a();
    b();
}

/// Indexed version of `wave_step` for arrays that are not in standard layout.
pub fn wave_step_ndarray(
    u: ArrayView2<f64>,
    v: ArrayView2<f64>,
    mut w: ArrayViewMut2<f64>,
    coef: &Coefficients,
) {
    let (nx, ny) = v.dim();
    assert_eq!(u.dim(), (nx, ny));
    assert_eq!(w.dim(), (nx, ny));
    assert!(nx >= 3 && ny >= 3, "grid {:?} has no interior", (nx, ny));

    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            w[(i, j)] = coef.update(
                u[(i, j)],
                v[(i, j)],
                (v[(i - 1, j)], v[(i + 1, j)]),
                (v[(i, j - 1)], v[(i, j + 1)]),
            );
        }
    }
}

/// Advances `w` from `(u, v)`, taking the slice kernel when all three arrays are
/// contiguous.
pub fn step_arrays(
    u: ArrayView2<f64>,
    v: ArrayView2<f64>,
    mut w: ArrayViewMut2<f64>,
    coef: &Coefficients,
) {
    let dim = v.dim();
    if let (Some(us), Some(vs), Some(ws)) = (u.as_slice(), v.as_slice(), w.as_slice_mut()) {
        wave_step_parallel(us, vs, ws, dim, coef);
        return;
    }
    wave_step_ndarray(u, v, w, coef);
}
