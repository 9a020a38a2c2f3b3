//! Time stepping driver.

use ndarray::{s, ArrayView2, Zip};
use tracing::{error, info};

use crate::disturbance::Disturbance;
use crate::domain::Domain;
use crate::error::{Result, WaveError};
use crate::field::{FieldState, Seed};
use crate::stencil::{step_arrays, Coefficients};

/// What an observer receives after every step.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Number of steps taken so far.
    pub step: usize,
    /// Physical time of `field`, `step * dt`.
    pub time: f64,
    pub field: ArrayView2<'a, f64>,
}

/// Consumer of the field after each step, e.g. a renderer or an exporter.
pub trait Observer {
    fn observe(&mut self, frame: Frame<'_>);
}

impl<F> Observer for F
where
    F: FnMut(Frame<'_>),
{
    fn observe(&mut self, frame: Frame<'_>) {
        self(frame)
    }
}

/// Caller-owned simulation: domain, field levels, disturbance schedule and clock.
#[derive(Debug, Clone)]
pub struct Solver {
    domain: Domain,
    coef: Coefficients,
    state: FieldState,
    schedule: Vec<Disturbance>,
    clock: usize,
    failed_at: Option<usize>,
}

impl Solver {
    /// Sets up the initial field and the disturbance schedule.
    ///
    /// Disturbances triggered at the same step are applied in the order given.
    pub fn new(domain: Domain, seed: Option<Seed>, schedule: Vec<Disturbance>) -> Result<Self> {
        for disturbance in &schedule {
            disturbance.validate(&domain)?;
        }
        let state = FieldState::new(&domain, seed)?;
        let (nx, ny) = domain.dim();
        info!(
            nx,
            ny,
            courant = domain.courant_number(),
            steps = domain.step_count(),
            disturbances = schedule.len(),
            "wave solver initialized"
        );
        Ok(Solver {
            coef: Coefficients::new(&domain),
            domain,
            state,
            schedule,
            clock: 0,
            failed_at: None,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn schedule(&self) -> &[Disturbance] {
        &self.schedule
    }

    /// Number of steps taken.
    pub fn clock(&self) -> usize {
        self.clock
    }

    pub fn time(&self) -> f64 {
        self.domain.time_at(self.clock)
    }

    /// Whether the clock has reached the configured number of steps.
    pub fn is_finished(&self) -> bool {
        self.clock >= self.domain.step_count()
    }

    /// The current displacement field.
    pub fn snapshot(&self) -> ArrayView2<'_, f64> {
        self.state.snapshot()
    }

    pub fn previous(&self) -> ArrayView2<'_, f64> {
        self.state.previous()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            step: self.clock,
            time: self.time(),
            field: self.state.snapshot(),
        }
    }

    /// Performs one step: applies the disturbances scheduled for the current clock,
    /// computes the next level and rotates the buffers.
    ///
    /// Once a step produces a non-finite value the solver stops, and this and every
    /// later call return `NonFiniteField`.
    pub fn advance(&mut self) -> Result<()> {
        if let Some(step) = self.failed_at {
            return Err(WaveError::NonFiniteField { step });
        }
        let t = self.clock;

        for disturbance in &self.schedule {
            disturbance.apply(self.state.current_mut(), &self.domain, t);
        }

        {
            let (previous, current, next) = self.state.levels_mut();
            step_arrays(previous.view(), current.view(), next.view_mut(), &self.coef);
        }
        self.state.pin_boundary();
        self.state.rotate();
        self.clock += 1;

        if !self.state.snapshot().iter().all(|u| u.is_finite()) {
            error!(step = t, "field became non-finite");
            self.failed_at = Some(t);
            return Err(WaveError::NonFiniteField { step: t });
        }
        Ok(())
    }

    /// Advances until the clock reaches the configured number of steps, handing
    /// every new level to `observer`. Returns the number of steps taken.
    pub fn run<O: Observer>(&mut self, mut observer: O) -> Result<usize> {
        let start = self.clock;
        while !self.is_finished() {
            self.advance()?;
            observer.observe(self.frame());
        }
        let steps = self.clock - start;
        info!(steps, time = self.time(), "simulation finished");
        Ok(steps)
    }

    /// `Σ (current - previous)² / dt²` over the interior points.
    pub fn kinetic_energy(&self) -> f64 {
        let (nx, ny) = self.domain.dim();
        let dt = self.domain.dt();
        let current = self.state.snapshot().slice_move(s![1..nx - 1, 1..ny - 1]);
        let previous = self.state.previous().slice_move(s![1..nx - 1, 1..ny - 1]);
        let mut sum = 0.;
        Zip::from(current)
            .and(previous)
            .for_each(|&v, &u| sum += (v - u) * (v - u));
        sum / (dt * dt)
    }

    /// Largest absolute displacement of the current level.
    pub fn max_abs(&self) -> f64 {
        self.state.snapshot().fold(0., |m: f64, u| m.max(u.abs()))
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn scenario(t_max: f64, schedule: Vec<Disturbance>) -> Solver {
        let domain = Domain::new((10., 10.), (10, 10), 2.0, 0.05, t_max).unwrap();
        let seed = Seed {
            index: (5, 5),
            value: 0.3,
        };
        Solver::new(domain, Some(seed), schedule).unwrap()
    }

    fn boundary_values(domain: &Domain, field: ArrayView2<f64>) -> Vec<f64> {
        field
            .indexed_iter()
            .filter(|&((i, j), _)| domain.is_boundary(i, j))
            .map(|(_, &u)| u)
            .collect()
    }

    #[test]
    fn center_decreases_and_boundary_stays_zero() {
        let mut solver = scenario(0.25, vec![]);
        assert_eq!(solver.domain().step_count(), 5);

        let domain = *solver.domain();
        let mut center = vec![solver.snapshot()[(5, 5)]];
        let mut boundaries = vec![];
        let steps = solver
            .run(|frame: Frame| {
                center.push(frame.field[(5, 5)]);
                boundaries.extend(boundary_values(&domain, frame.field));
            })
            .unwrap();

        assert_eq!(steps, 5);
        assert_eq!(center[0], 0.3);
        for w in center.windows(2) {
            assert!(w[1] < w[0], "center trace not decreasing: {:?}", center);
        }
        assert!(boundaries.iter().all(|&u| u == 0.));
    }

    #[test]
    fn zero_initial_velocity() {
        // first step from rest moves each point by c² dt² ∇²u, i.e. O(dt²)
        let diff = |dt: f64| {
            let domain = Domain::new((10., 10.), (10, 10), 2.0, dt, 1.).unwrap();
            let seed = Seed {
                index: (5, 5),
                value: 0.3,
            };
            let mut solver = Solver::new(domain, Some(seed), vec![]).unwrap();
            assert_eq!(solver.previous(), solver.snapshot());
            assert_eq!(solver.kinetic_energy(), 0.);
            solver.advance().unwrap();
            (&solver.snapshot() - &solver.previous()).fold(0., |m: f64, d| m.max(d.abs()))
        };

        let d1 = diff(0.05);
        let d2 = diff(0.025);
        let d3 = diff(0.0125);
        let dx2 = (10f64 / 9.).powi(2);
        let expected = 4. * 0.05 * 0.05 * 0.3 * 4. / dx2;
        assert!((d1 - expected).abs() < 1e-12, "{} vs {}", d1, expected);
        assert!((d1 / d2 - 4.).abs() < 1e-9);
        assert!((d2 / d3 - 4.).abs() < 1e-9);
    }

    #[test]
    fn boundary_keeps_initial_values() {
        let domain = Domain::new((10., 10.), (10, 10), 2.0, 0.05, 6.).unwrap();
        let seed = Seed {
            index: (0, 3),
            value: 0.2,
        };
        // pulses reaching the boundary
        let schedule = vec![
            Disturbance::new(0, (0., 0.), 0.3, 1.0),
            Disturbance::new(40, (10., 5.), -0.5, 2.0),
            Disturbance::new(70, (5., 5.), 1.0, 3.0),
        ];
        let mut solver = Solver::new(domain, Some(seed), schedule).unwrap();
        let initial = boundary_values(&domain, solver.snapshot());
        assert_eq!(initial.len(), 36);
        let mut frames = 0;
        solver
            .run(|frame: Frame| {
                assert_eq!(boundary_values(&domain, frame.field), initial, "step {}", frame.step);
                frames += 1;
            })
            .unwrap();
        assert_eq!(frames, 120);
    }

    #[test]
    fn disturbance_fires_exactly_once() {
        let k = 7;
        let pulse = Disturbance::new(k, (3., 4.), 0.3, 1.0);
        let mut with = scenario(1., vec![pulse]);
        let mut without = scenario(1., vec![]);

        for _ in 0..k {
            with.advance().unwrap();
            without.advance().unwrap();
            assert_eq!(with.snapshot(), without.snapshot());
            assert_eq!(with.previous(), without.previous());
        }

        with.advance().unwrap();
        without.advance().unwrap();
        // the pulse was added to the level that has now become `previous`
        let domain = *with.domain();
        for ((i, j), &u) in with.previous().indexed_iter() {
            let added = u - without.previous()[(i, j)];
            let expected = pulse.profile(domain.x(i), domain.y(j));
            assert!(
                (added - expected).abs() < 1e-12,
                "({}, {}): {} vs {}",
                i,
                j,
                added,
                expected
            );
        }
    }

    #[test]
    fn energy_stays_bounded() {
        let mut solver = scenario(20., vec![Disturbance::new(150, (0., 0.), 0.3, 1.0)]);
        let mut max_energy = 0f64;
        let mut count = 0;
        while !solver.is_finished() {
            solver.advance().unwrap();
            let e = solver.kinetic_energy();
            assert!(e.is_finite());
            max_energy = max_energy.max(e);
            count += 1;
        }
        assert_eq!(count, 400);
        assert!(max_energy > 0.);
        assert!(max_energy < 10., "energy proxy grew to {}", max_energy);
        assert!(solver.max_abs() < 1.);
    }

    #[test]
    fn runs_are_bit_identical() {
        let mut rng = StdRng::seed_from_u64(17);
        let schedule: Vec<_> = (0..6)
            .map(|_| {
                Disturbance::new(
                    rng.gen_range(0..60),
                    (rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(0.3..2.0),
                )
            })
            .collect();

        let record = |schedule: Vec<Disturbance>| {
            let mut frames = vec![];
            scenario(4., schedule)
                .run(|frame: Frame| frames.push(frame.field.to_owned()))
                .unwrap();
            frames
        };

        let a = record(schedule.clone());
        let b = record(schedule);
        assert_eq!(a.len(), 80);
        assert_eq!(a, b);
    }

    #[test]
    fn frames_report_step_and_time() {
        let mut solver = scenario(0.5, vec![]);
        let mut seen = vec![];
        solver
            .run(|frame: Frame| seen.push((frame.step, frame.time)))
            .unwrap();
        assert_eq!(seen.len(), 10);
        for (n, &(step, time)) in seen.iter().enumerate() {
            assert_eq!(step, n + 1);
            assert_eq!(time, (n + 1) as f64 * 0.05);
        }
        assert!(solver.is_finished());
        // nothing left to do
        assert_eq!(solver.run(|_: Frame| panic!("no more frames")).unwrap(), 0);
    }

    #[test]
    fn non_finite_field_is_terminal() {
        let domain = Domain::new((10., 10.), (10, 10), 2.0, 0.05, 4.).unwrap();
        let seed = Seed {
            index: (4, 4),
            value: 1e308,
        };
        let mut solver = Solver::new(domain, Some(seed), vec![]).unwrap();
        match solver.advance() {
            Err(WaveError::NonFiniteField { step: 0 }) => {}
            other => panic!("expected NonFiniteField, got {:?}", other),
        }
        let clock = solver.clock();
        match solver.run(|_: Frame| {}) {
            Err(WaveError::NonFiniteField { step: 0 }) => {}
            other => panic!("expected NonFiniteField, got {:?}", other),
        }
        assert_eq!(solver.clock(), clock);
    }

    #[test]
    fn rejects_bad_disturbance() {
        let domain = Domain::new((10., 10.), (10, 10), 2.0, 0.05, 4.).unwrap();
        let r = Solver::new(domain, None, vec![Disturbance::new(3, (1., 1.), 0.3, -1.)]);
        match r {
            Err(WaveError::InvalidDomain(_)) => {}
            other => panic!("expected InvalidDomain, got {:?}", other),
        }
    }
}
