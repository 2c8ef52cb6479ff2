use std::time::Instant;

use crate::simulation::forces::{AccelSet, NewtonianGravity};
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Body, NVec2, System};

/// Time one direct-sum force evaluation at a few body counts.
/// The core targets small fixed N; the sweep shows where the O(N^2) sum
/// would start to matter if the fixed count were raised.
pub fn bench_gravity() {
    let ns = [3, 8, 32, 128, 512];

    for n in ns {
        // Deterministic positions, no rand needed
        let mut bodies = Vec::with_capacity(n);
        for i in 0..n {
            let i_f = i as f64;
            bodies.push(Body {
                x: NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0),
                v: NVec2::zeros(),
                m: 1.0,
            });
        }
        let sys = System { bodies, t: 0.0 };
        let forces = AccelSet::new().with(NewtonianGravity { g: 1.0, eps2: 1e-4 });
        let mut out = vec![NVec2::zeros(); n];

        // Warm up
        forces.accumulate_accels(0.0, &sys, &mut out);

        let reps = 1000;
        let t0 = Instant::now();
        for _ in 0..reps {
            forces.accumulate_accels(0.0, &sys, &mut out);
        }
        let per_eval = t0.elapsed().as_secs_f64() / reps as f64;

        println!("N = {n:4}, force eval = {per_eval:10.3e} s");
    }
}

/// Compare the three integrators on the figure-8: wall time per step and
/// energy drift over the same fixed-dt horizon.
pub fn bench_integrators() {
    let kinds = [
        IntegratorKind::Rk4,
        IntegratorKind::Leapfrog,
        IntegratorKind::Verlet,
    ];
    let steps = 10_000;

    for kind in kinds {
        let mut scenario = Scenario::figure_eight();
        let sim = &mut scenario.simulation;
        sim.set_integrator(kind);

        let dt = sim.params().dt0;
        let t0 = Instant::now();
        let mut drift = 0.0;
        for _ in 0..steps {
            match sim.advance(dt) {
                Ok(outcome) => drift = outcome.sample.drift,
                Err(e) => {
                    println!("{kind:?}: diverged ({e})");
                    break;
                }
            }
        }
        let per_step = t0.elapsed().as_secs_f64() / steps as f64;

        println!(
            "{kind:?}: {per_step:10.3e} s/step, |drift| = {:9.3e} after {steps} steps",
            drift.abs()
        );
    }
}
