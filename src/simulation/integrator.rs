//! Time integrators for the three-body system
//!
//! Three interchangeable schemes behind one stepping contract
//! (`state, forces, dt` advanced in place):
//! - `rk4_step`        classical 4th-order Runge-Kutta, four force evals
//! - `leapfrog_step`   velocity-Verlet kick-drift-kick, two force evals,
//!                     symplectic (bounded long-term energy oscillation)
//! - `verlet_position_step`  position-form Verlet, one force eval, needs
//!                     a previous-position history ([`VerletHistory`])
//!
//! Selection is a closed tag set ([`IntegratorKind`]), switched on with a
//! plain `match` in the engine.

use super::forces::AccelSet;
use super::states::{NVec2, System};

/// Which stepping scheme the engine uses for subsequent steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorKind {
    Rk4,      // reference / high-accuracy default
    Leapfrog, // velocity Verlet
    Verlet,   // position Verlet, requires bootstrap
}

/// Advance the system by one step using classical RK4.
///
/// Stages k1..k4 evaluate the force at t, t+dt/2 (twice), and t+dt;
/// positions and velocities are combined with the 1-2-2-1 weights.
/// Local error O(dt^5), global O(dt^4). Not symplectic.
pub fn rk4_step(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    let half_dt = 0.5 * dt;

    // Stage buffers; `scratch` is a working copy whose positions are moved
    // to each stage point so the force set can be evaluated there
    let mut scratch = sys.clone();
    let mut a1 = vec![NVec2::zeros(); n];
    let mut a2 = vec![NVec2::zeros(); n];
    let mut a3 = vec![NVec2::zeros(); n];
    let mut a4 = vec![NVec2::zeros(); n];

    // k1 at (x, v), time t
    forces.accumulate_accels(sys.t, sys, &mut a1);
    let v1: Vec<NVec2> = sys.bodies.iter().map(|b| b.v).collect();

    // k2 at midpoint using k1
    let v2: Vec<NVec2> = (0..n).map(|i| v1[i] + half_dt * a1[i]).collect();
    for (i, b) in scratch.bodies.iter_mut().enumerate() {
        b.x = sys.bodies[i].x + half_dt * v1[i];
        b.v = v2[i];
    }
    forces.accumulate_accels(sys.t + half_dt, &scratch, &mut a2);

    // k3 at midpoint using k2
    let v3: Vec<NVec2> = (0..n).map(|i| v1[i] + half_dt * a2[i]).collect();
    for (i, b) in scratch.bodies.iter_mut().enumerate() {
        b.x = sys.bodies[i].x + half_dt * v2[i];
        b.v = v3[i];
    }
    forces.accumulate_accels(sys.t + half_dt, &scratch, &mut a3);

    // k4 at the endpoint using k3
    let v4: Vec<NVec2> = (0..n).map(|i| v1[i] + dt * a3[i]).collect();
    for (i, b) in scratch.bodies.iter_mut().enumerate() {
        b.x = sys.bodies[i].x + dt * v3[i];
        b.v = v4[i];
    }
    forces.accumulate_accels(sys.t + dt, &scratch, &mut a4);

    // Weighted combination:
    // x_n+1 = x_n + dt/6 (v1 + 2 v2 + 2 v3 + v4)
    // v_n+1 = v_n + dt/6 (a1 + 2 a2 + 2 a3 + a4)
    let sixth = dt / 6.0;
    for (i, b) in sys.bodies.iter_mut().enumerate() {
        b.x += sixth * (v1[i] + 2.0 * v2[i] + 2.0 * v3[i] + v4[i]);
        b.v += sixth * (a1[i] + 2.0 * a2[i] + 2.0 * a3[i] + a4[i]);
    }
    sys.t += dt;
}

/// Advance the system by one step using velocity-Verlet (leapfrog).
/// Uses two force evaluations per step and updates positions, velocities,
/// and `sys.t` in place.
pub fn leapfrog_step(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    let half_dt = 0.5 * dt;

    // a_n from x_n at time t_n
    let mut a_old = vec![NVec2::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_old);

    // Kick: v_n+1/2 = v_n + (dt/2) a_n
    for (b, a) in sys.bodies.iter_mut().zip(a_old.iter()) {
        b.v += half_dt * *a;
    }

    // Drift: x_n+1 = x_n + dt v_n+1/2
    for b in sys.bodies.iter_mut() {
        b.x += dt * b.v;
    }

    sys.t += dt;

    // a_n+1 from x_n+1 at time t_n+1
    let mut a_new = vec![NVec2::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_new);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(a_new.iter()) {
        b.v += half_dt * *a;
    }
}

/// Previous-position record required by the position form of Verlet.
///
/// Position Verlet assumes a constant step between the stored and current
/// positions; `dt` records the step the history was built with so the
/// engine can detect staleness and re-bootstrap.
#[derive(Debug, Clone)]
pub struct VerletHistory {
    pub prev: Vec<NVec2>, // x at t - dt
    pub dt: f64,          // step the history is valid for
}

impl VerletHistory {
    /// Seed a history from the current state without advancing it, using
    /// the backward Taylor expansion x(t - dt) = x - v dt + a dt^2 / 2.
    /// Used by trial steps inside the adaptive controller; the engine's
    /// public bootstrap path takes an explicit leapfrog step instead.
    pub fn seed(sys: &System, forces: &AccelSet, dt: f64) -> Self {
        let n = sys.bodies.len();
        let mut a = vec![NVec2::zeros(); n];
        forces.accumulate_accels(sys.t, sys, &mut a);
        let prev = sys
            .bodies
            .iter()
            .zip(a.iter())
            .map(|(b, a)| b.x - dt * b.v + (0.5 * dt * dt) * *a)
            .collect();
        Self { prev, dt }
    }
}

/// Advance the system by one step using position-form Verlet:
/// x_n+1 = 2 x_n - x_n-1 + a_n dt^2, with velocities estimated by the
/// central difference v_n+1 = (x_n+1 - x_n) / dt + a correction term kept
/// implicit in the history. One force evaluation per step.
///
/// `hist.dt` must equal `dt`; the engine re-bootstraps on any mismatch.
pub fn verlet_position_step(sys: &mut System, forces: &AccelSet, dt: f64, hist: &mut VerletHistory) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    debug_assert_eq!(hist.prev.len(), n);

    let mut a = vec![NVec2::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a);

    for (i, b) in sys.bodies.iter_mut().enumerate() {
        let x_prev = hist.prev[i];
        let x_new = 2.0 * b.x - x_prev + (dt * dt) * a[i];

        // Central-difference velocity across the two surrounding positions:
        // v(t + dt) ~ (x_n+1 - x_n) / dt is first order; using the stored
        // x_n-1 gives the second-order estimate (x_n+1 - x_n-1) / (2 dt)
        // evaluated at t, carried forward one step with a dt
        b.v = (x_new - x_prev) / (2.0 * dt) + dt * a[i];

        hist.prev[i] = b.x;
        b.x = x_new;
    }
    hist.dt = dt;
    sys.t += dt;
}
