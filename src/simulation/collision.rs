//! Close-approach detection and soft-sphere response
//!
//! Runs after each accepted integrator step. Any pair closer than the
//! collision threshold gets an event record and an equal-opposite impulse
//! along the separation direction:
//!
//!   j = mu * (1 + e) * max(-v_rel . n, 0)   restitution on approach speed
//!     + mu * (threshold - d) / dt            penalty separating the overlap
//!
//! with mu the reduced mass. The impulse is split `v_i -= (j/m_i) n`,
//! `v_j += (j/m_j) n`, so total momentum is conserved exactly. The response
//! is a corrective perturbation layered outside the force law; it never
//! enters the potential-energy accounting.

use super::states::System;

/// Record of one close approach and the correction applied.
/// Immutable once created; appended to the engine's bounded event log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub i: usize,      // lower body index of the pair
    pub j: usize,      // higher body index of the pair
    pub t: f64,        // simulation time at detection
    pub distance: f64, // separation when detected
    pub impulse: f64,  // magnitude of the applied impulse
}

/// Scan all pairs of `sys`, apply soft-sphere corrections in place, and
/// return the events produced this step (empty in the common case).
pub fn detect_and_respond(
    sys: &mut System,
    threshold: f64,
    restitution: f64,
    dt: f64,
) -> Vec<CollisionEvent> {
    let n = sys.bodies.len();
    let mut events = Vec::new();
    if threshold <= 0.0 || dt <= 0.0 {
        return events;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let r = sys.bodies[j].x - sys.bodies[i].x;
            let d = r.norm();
            if d >= threshold || d == 0.0 {
                // d == 0 has no defined normal; the next step's softened
                // force will push the pair apart instead
                continue;
            }

            let normal = r / d;
            let (mi, mj) = (sys.bodies[i].m, sys.bodies[j].m);
            let mu = mi * mj / (mi + mj);

            // Relative velocity along the normal; negative while approaching
            let v_rel = (sys.bodies[j].v - sys.bodies[i].v).dot(&normal);
            let approach = (-v_rel).max(0.0);
            let overlap = threshold - d;

            let impulse = mu * (1.0 + restitution) * approach + mu * overlap / dt;

            sys.bodies[i].v -= (impulse / mi) * normal;
            sys.bodies[j].v += (impulse / mj) * normal;

            log::debug!(
                "collision ({i},{j}) at t={:.6}: d={:.4e}, impulse={:.4e}",
                sys.t,
                d,
                impulse
            );
            events.push(CollisionEvent {
                i,
                j,
                t: sys.t,
                distance: d,
                impulse,
            });
        }
    }
    events
}
