//! Adaptive step-size control by step doubling
//!
//! One accepted step per call: the controller advances a trial copy of the
//! system by a full dt and a comparison copy by two half steps, estimates
//! the local truncation error from the position deviation between the two,
//! and halves dt until the error fits the tolerance (bounded retry budget).
//! The accepted state is the more accurate two-half-step one.
//!
//! dt is clamped to `[dt_min, dt_max]` and to the host's requested step.
//! If the retry budget runs out at the floor with the error still above
//! tolerance, the step is accepted anyway and flagged degraded so the
//! simulation never stalls.

use super::forces::AccelSet;
use super::integrator::{leapfrog_step, rk4_step, verlet_position_step, IntegratorKind, VerletHistory};
use super::params::Parameters;
use super::states::System;

/// Result of one accepted step
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub dt_used: f64,  // size of the accepted step
    pub error: f64,    // step-doubling error estimate
    pub degraded: bool, // true when tolerance was not met within budget
    pub retries: u32,  // halvings performed before acceptance
}

/// Adaptive dt controller wrapping the integrator strategies
#[derive(Debug, Clone)]
pub struct StepController {
    dt: f64, // proposal carried between steps
}

impl StepController {
    pub fn new(dt0: f64) -> Self {
        Self { dt: dt0 }
    }

    /// Current step-size proposal
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn reset(&mut self, dt0: f64) {
        self.dt = dt0;
    }

    /// Advance `sys` by one accepted step.
    ///
    /// `hist` is the engine's Verlet previous-position record; trial copies
    /// receive cloned (or Taylor-seeded) histories so a rejected trial never
    /// corrupts it.
    pub fn advance(
        &mut self,
        sys: &mut System,
        forces: &AccelSet,
        kind: IntegratorKind,
        hist: &mut Option<VerletHistory>,
        params: &Parameters,
        dt_request: f64,
    ) -> StepReport {
        // The host's request bounds the step from above; dt_min bounds it
        // from below unless the host asked for less than dt_min itself
        let floor = params.dt_min.min(dt_request);
        let mut dt = self.dt.clamp(params.dt_min, params.dt_max).min(dt_request);

        if !params.adaptive {
            step_once(sys, forces, kind, hist, dt);
            return StepReport {
                dt_used: dt,
                error: 0.0,
                degraded: false,
                retries: 0,
            };
        }

        let mut retries = 0;
        loop {
            // Trial: one full step
            let mut full = sys.clone();
            let mut full_hist = hist.clone();
            step_once(&mut full, forces, kind, &mut full_hist, dt);

            // Comparison: two half steps from the same starting state
            let mut half = sys.clone();
            let mut half_hist = hist.clone();
            step_once(&mut half, forces, kind, &mut half_hist, 0.5 * dt);
            step_once(&mut half, forces, kind, &mut half_hist, 0.5 * dt);

            let error = position_deviation(&full, &half);

            if error <= params.tolerance {
                // Accept; grow the proposal when the error leaves headroom
                if error < 0.25 * params.tolerance {
                    self.dt = (dt * 1.5).min(params.dt_max);
                } else {
                    self.dt = dt;
                }
                *sys = half;
                *hist = half_hist;
                return StepReport {
                    dt_used: dt,
                    error,
                    degraded: false,
                    retries,
                };
            }

            if dt <= floor || retries >= params.max_retries {
                // Tolerance unmet at the floor: accept the best result we
                // have, flagged, rather than stalling simulated time
                log::warn!(
                    "step degraded at t={:.6}: error {:.3e} > tol {:.3e} at dt={:.3e}",
                    sys.t,
                    error,
                    params.tolerance,
                    dt
                );
                self.dt = dt;
                *sys = half;
                *hist = half_hist;
                return StepReport {
                    dt_used: dt,
                    error,
                    degraded: true,
                    retries,
                };
            }

            dt = (0.5 * dt).max(floor);
            retries += 1;
            log::debug!("halving dt to {:.3e} (error {:.3e})", dt, error);
        }
    }
}

/// Dispatch a single integrator step by tag.
/// For position Verlet, makes sure the history matches the step about to be
/// taken, Taylor-seeding it when absent or built for a different dt.
fn step_once(
    sys: &mut System,
    forces: &AccelSet,
    kind: IntegratorKind,
    hist: &mut Option<VerletHistory>,
    dt: f64,
) {
    match kind {
        IntegratorKind::Rk4 => rk4_step(sys, forces, dt),
        IntegratorKind::Leapfrog => leapfrog_step(sys, forces, dt),
        IntegratorKind::Verlet => {
            let stale = !matches!(hist, Some(h) if h.dt == dt && h.prev.len() == sys.bodies.len());
            if stale {
                *hist = Some(VerletHistory::seed(sys, forces, dt));
            }
            if let Some(h) = hist {
                verlet_position_step(sys, forces, dt, h);
            }
        }
    }
}

/// Max relative position deviation between two states, the scalar error
/// estimate driving acceptance
fn position_deviation(a: &System, b: &System) -> f64 {
    a.bodies
        .iter()
        .zip(b.bodies.iter())
        .map(|(ba, bb)| (ba.x - bb.x).norm() / bb.x.norm().max(1.0))
        .fold(0.0, f64::max)
}
