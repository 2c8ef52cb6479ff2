use tribody::simulation::engine::{Phase, Simulation};
use tribody::simulation::error::SimError;
use tribody::simulation::forces::{AccelSet, NewtonianGravity};
use tribody::simulation::integrator::IntegratorKind;
use tribody::simulation::params::Parameters;
use tribody::simulation::scenario::Scenario;
use tribody::simulation::states::{Body, NVec2, System};

/// Build a simple 2-body System separated along the x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    let b1 = Body {
        x: [-dist / 2.0, 0.0].into(),
        v: [0.0, 0.0].into(),
        m: m1,
    };
    let b2 = Body {
        x: [dist / 2.0, 0.0].into(),
        v: [0.0, 0.0].into(),
        m: m2,
    };
    System {
        bodies: vec![b1, b2],
        t: 0.0,
    }
}

/// Default physics parameters for tests (fixed step unless a test opts in)
pub fn test_params() -> Parameters {
    Parameters {
        g: 1.0,
        eps2: 0.0,
        dt0: 1e-3,
        dt_min: 1e-4,
        dt_max: 2e-3,
        tolerance: 1e-8,
        max_retries: 8,
        adaptive: false,
        collision_threshold: 0.0,
        restitution: 0.5,
        history_cap: 1000,
        event_cap: 1000,
    }
}

/// Build a gravity term + AccelSet
pub fn gravity_set(p: &Parameters) -> AccelSet {
    AccelSet::new().with(NewtonianGravity {
        g: p.g,
        eps2: p.eps2,
    })
}

/// Figure-8 choreography bodies (equal mass, zero total momentum)
pub fn figure_eight_bodies() -> Vec<Body> {
    vec![
        Body {
            x: [0.97000436, -0.24308753].into(),
            v: [0.4662036850, 0.4323657300].into(),
            m: 1.0,
        },
        Body {
            x: [-0.97000436, 0.24308753].into(),
            v: [0.4662036850, 0.4323657300].into(),
            m: 1.0,
        },
        Body {
            x: [0.0, 0.0].into(),
            v: [-0.9324073700, -0.8647314600].into(),
            m: 1.0,
        },
    ]
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let mut acc = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    // Pair contributions are antiparallel and scale with the other mass
    let net = acc[0] * sys.bodies[0].m + acc[1] * sys.bodies[1].m;
    assert!(net.norm() < 1e-12, "Net momentum change not zero: {:?}", net);

    let ratio = acc[0].norm() / acc[1].norm();
    let mass_ratio = sys.bodies[1].m / sys.bodies[0].m;
    assert!(
        (ratio - mass_ratio).abs() < 1e-12,
        "|a_i|/|a_j| should equal m_j/m_i: got {ratio}, expected {mass_ratio}"
    );
}

#[test]
fn gravity_points_toward_other_body() {
    let sys = two_body_system(2.0, 1.0, 1.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let mut acc = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    let dx = sys.bodies[1].x - sys.bodies[0].x;
    assert!(dx.norm() > 0.0);
    assert!(
        acc[0].dot(&dx) > 0.0,
        "Acceleration is not toward the second body"
    );
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);
    let p = test_params();
    let forces = gravity_set(&p);

    let mut acc_r = vec![NVec2::zeros(); 2];
    let mut acc_2r = vec![NVec2::zeros(); 2];

    forces.accumulate_accels(sys_r.t, &sys_r, &mut acc_r);
    forces.accumulate_accels(sys_2r.t, &sys_2r, &mut acc_2r);

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert!((ratio - 4.0).abs() < 1e-3, "Expected ~4x, got {}", ratio);
}

#[test]
fn gravity_softening_prevents_blowup() {
    let mut p = test_params();
    p.eps2 = 0.1;

    let sys = two_body_system(1e-9, 1.0, 1.0);
    let forces = gravity_set(&p);

    let mut acc = vec![NVec2::zeros(); 2];
    forces.accumulate_accels(sys.t, &sys, &mut acc);

    assert!(
        acc[0].norm() < 1e9,
        "Softening failed; acceleration too large"
    );
}

#[test]
fn gravity_softening_converges_when_well_separated() {
    // For d >> eps the softened acceleration approaches the Newtonian one
    // within O(eps^2 / d^2)
    let sys = two_body_system(1.0, 1.0, 1.0);

    let mut p_soft = test_params();
    p_soft.eps2 = 1e-6;
    let p_exact = test_params();

    let mut acc_soft = vec![NVec2::zeros(); 2];
    let mut acc_exact = vec![NVec2::zeros(); 2];
    gravity_set(&p_soft).accumulate_accels(0.0, &sys, &mut acc_soft);
    gravity_set(&p_exact).accumulate_accels(0.0, &sys, &mut acc_exact);

    let rel = (acc_soft[0] - acc_exact[0]).norm() / acc_exact[0].norm();
    assert!(
        rel < 10.0 * 1e-6,
        "Softened acceleration off by {rel:e}, more than O(eps^2/d^2)"
    );
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn momentum_conserved_by_all_integrators() {
    for kind in [
        IntegratorKind::Rk4,
        IntegratorKind::Leapfrog,
        IntegratorKind::Verlet,
    ] {
        let mut sim = Simulation::initialize(figure_eight_bodies(), test_params())
            .expect("figure-8 is valid");
        sim.set_integrator(kind);

        let p0 = sim.snapshot().total_momentum();
        for _ in 0..200 {
            sim.advance(1e-3).expect("step should not diverge");
        }
        let p = sim.snapshot().total_momentum();

        assert!(
            (p - p0).norm() < 1e-9,
            "{kind:?}: momentum drifted by {:?}",
            p - p0
        );
    }
}

#[test]
fn rk4_energy_drift_bounded_on_figure_eight() {
    let mut params = test_params();
    params.eps2 = 1e-6;
    let mut sim =
        Simulation::initialize(figure_eight_bodies(), params).expect("figure-8 is valid");
    sim.set_integrator(IntegratorKind::Rk4);

    let mut drift = 0.0;
    for _ in 0..5000 {
        let outcome = sim.advance(1e-3).expect("step should not diverge");
        drift = outcome.sample.drift;
    }
    assert!(
        drift.abs() < 1e-5,
        "RK4 energy drift {:e} exceeds bound",
        drift.abs()
    );
}

#[test]
fn leapfrog_energy_oscillation_stays_bounded() {
    // Symplectic scheme: energy error oscillates instead of growing
    let mut params = test_params();
    params.eps2 = 1e-6;
    let mut sim =
        Simulation::initialize(figure_eight_bodies(), params).expect("figure-8 is valid");
    sim.set_integrator(IntegratorKind::Leapfrog);

    let mut max_drift: f64 = 0.0;
    for _ in 0..20_000 {
        let outcome = sim.advance(1e-3).expect("step should not diverge");
        max_drift = max_drift.max(outcome.sample.drift.abs());
    }
    assert!(
        max_drift < 1e-3,
        "Leapfrog max |drift| {max_drift:e} exceeds bound"
    );
}

#[test]
fn verlet_bootstrap_produces_valid_steps() {
    // Switching to Verlet with no prior history must not fail: the next
    // step runs an implicit leapfrog bootstrap
    let mut sim = Simulation::initialize(figure_eight_bodies(), test_params())
        .expect("figure-8 is valid");
    sim.set_integrator(IntegratorKind::Verlet);

    for _ in 0..100 {
        let outcome = sim.advance(1e-3).expect("bootstrap or step failed");
        assert!(outcome.state.is_finite());
        assert!(!outcome.sample.degraded);
    }
    assert_eq!(sim.phase(), Phase::Ready);
}

#[test]
fn verlet_matches_deferred_switch_within_one_step_error() {
    // sim_a switches to Verlet before any step (bootstrap on step 1);
    // sim_b takes step 1 as leapfrog and switches afterwards. At constant
    // dt the two position sequences are algebraically identical, so any
    // deviation is a single step's numerical error at most
    let mut sim_a = Simulation::initialize(figure_eight_bodies(), test_params())
        .expect("figure-8 is valid");
    sim_a.set_integrator(IntegratorKind::Verlet);

    let mut sim_b = Simulation::initialize(figure_eight_bodies(), test_params())
        .expect("figure-8 is valid");
    sim_b.set_integrator(IntegratorKind::Leapfrog);

    sim_a.advance(1e-3).expect("step");
    sim_b.advance(1e-3).expect("step");
    sim_b.set_integrator(IntegratorKind::Verlet);

    for _ in 0..10 {
        sim_a.advance(1e-3).expect("step");
        sim_b.advance(1e-3).expect("step");
    }

    let (a, b) = (sim_a.snapshot(), sim_b.snapshot());
    for (ba, bb) in a.bodies.iter().zip(b.bodies.iter()) {
        assert!(
            (ba.x - bb.x).norm() < 1e-7,
            "Trajectories deviate by {:e}",
            (ba.x - bb.x).norm()
        );
    }
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn collision_conserves_momentum_and_records_event() {
    // Head-on two-body approach crossing the threshold
    let bodies = vec![
        Body {
            x: [-0.2, 0.0].into(),
            v: [1.0, 0.0].into(),
            m: 1.0,
        },
        Body {
            x: [0.2, 0.0].into(),
            v: [0.0, 0.0].into(),
            m: 2.0,
        },
    ];
    let mut params = test_params();
    params.eps2 = 1e-4;
    params.collision_threshold = 0.05;
    let mut sim = Simulation::initialize(bodies, params).expect("valid pair");
    sim.set_integrator(IntegratorKind::Leapfrog);

    let p0 = sim.snapshot().total_momentum();
    let mut first_event = None;
    for _ in 0..1000 {
        let outcome = sim.advance(1e-3).expect("step should not diverge");
        if first_event.is_none() {
            first_event = outcome.events.first().copied();
        }
    }

    let event = first_event.expect("bodies crossed the threshold, no event recorded");
    assert_eq!((event.i, event.j), (0, 1), "wrong pair indices");
    assert!(event.t > 0.0 && event.distance < 0.05);
    assert!(event.impulse > 0.0);

    let p = sim.snapshot().total_momentum();
    assert!(
        (p - p0).norm() < 1e-9,
        "Collision response changed total momentum by {:?}",
        p - p0
    );
    assert!(!sim.events().is_empty());
}

#[test]
fn event_log_with_zero_cap_keeps_latest_event() {
    // A zero event cap must bound the log without panicking mid-step
    let bodies = vec![
        Body {
            x: [-0.2, 0.0].into(),
            v: [1.0, 0.0].into(),
            m: 1.0,
        },
        Body {
            x: [0.2, 0.0].into(),
            v: [0.0, 0.0].into(),
            m: 2.0,
        },
    ];
    let mut params = test_params();
    params.eps2 = 1e-4;
    params.collision_threshold = 0.05;
    params.event_cap = 0;
    let mut sim = Simulation::initialize(bodies, params).expect("valid pair");
    sim.set_integrator(IntegratorKind::Leapfrog);

    let mut collided = false;
    for _ in 0..1000 {
        let outcome = sim.advance(1e-3).expect("step should not diverge");
        collided |= !outcome.events.is_empty();
    }
    assert!(collided, "bodies never crossed the threshold");
    assert!(sim.events().len() <= 1, "log exceeded its bound");
}

// ==================================================================================
// Adaptive stepping tests
// ==================================================================================

#[test]
fn adaptive_degradation_is_flagged_not_fatal() {
    // Deliberately stiff: close massive pair + unreachable tolerance.
    // The controller must give up at the floor and flag the sample
    let bodies = vec![
        Body {
            x: [-0.0025, 0.0].into(),
            v: [0.0, 0.0].into(),
            m: 100.0,
        },
        Body {
            x: [0.0025, 0.0].into(),
            v: [0.0, 0.0].into(),
            m: 100.0,
        },
    ];
    let mut params = test_params();
    params.adaptive = true;
    params.eps2 = 1e-4;
    params.tolerance = 1e-18;
    params.max_retries = 3;
    let mut sim = Simulation::initialize(bodies, params).expect("valid pair");

    let outcome = sim.advance(1e-3).expect("degraded step is not an error");
    assert!(outcome.sample.degraded, "expected a degraded sample");
    assert_eq!(sim.phase(), Phase::Degraded);
}

#[test]
fn adaptive_step_respects_bounds_and_request() {
    let mut params = test_params();
    params.adaptive = true;
    let mut sim = Simulation::initialize(figure_eight_bodies(), params.clone())
        .expect("figure-8 is valid");

    // A request below dt_max bounds the step from above
    let outcome = sim.advance(5e-4).expect("step");
    assert!(outcome.state.t <= 5e-4 + 1e-12);

    for _ in 0..50 {
        let before = sim.time();
        let outcome = sim.advance(1e-2).expect("step");
        let dt_used = outcome.state.t - before;
        assert!(
            dt_used <= params.dt_max + 1e-12,
            "step {dt_used:e} exceeded dt_max"
        );
    }
}

// ==================================================================================
// Engine / lifecycle tests
// ==================================================================================

#[test]
fn initialize_rejects_degenerate_scenarios() {
    // Fewer than two bodies
    let err = Simulation::initialize(
        vec![Body {
            x: [0.0, 0.0].into(),
            v: [0.0, 0.0].into(),
            m: 1.0,
        }],
        test_params(),
    )
    .err()
    .expect("a single body must be rejected");
    assert!(matches!(err, SimError::InvalidInitialState(_)));

    // Non-positive mass
    let mut bodies = figure_eight_bodies();
    bodies[1].m = -1.0;
    let err = Simulation::initialize(bodies, test_params())
        .err()
        .expect("a negative mass must be rejected");
    assert!(matches!(err, SimError::InvalidInitialState(_)));

    // Coincident positions
    let mut bodies = figure_eight_bodies();
    bodies[1].x = bodies[0].x;
    let err = Simulation::initialize(bodies, test_params())
        .err()
        .expect("coincident positions must be rejected");
    assert!(matches!(err, SimError::InvalidInitialState(_)));
}

#[test]
fn numeric_divergence_is_fatal() {
    // An absurd initial speed overflows kinetic energy on the first sample
    let bodies = vec![
        Body {
            x: [-1.0, 0.0].into(),
            v: [1e200, 0.0].into(),
            m: 1.0,
        },
        Body {
            x: [1.0, 0.0].into(),
            v: [0.0, 0.0].into(),
            m: 1.0,
        },
    ];
    let mut sim = Simulation::initialize(bodies, test_params()).expect("finite inputs pass");
    let err = sim.advance(1e-3).unwrap_err();
    assert!(matches!(err, SimError::NumericDivergence { .. }));
}

#[test]
fn diagnostics_history_is_bounded() {
    let mut params = test_params();
    params.history_cap = 10;
    let mut sim =
        Simulation::initialize(figure_eight_bodies(), params).expect("figure-8 is valid");

    for _ in 0..50 {
        sim.advance(1e-3).expect("step");
    }
    assert_eq!(sim.diagnostics_history().count(), 10);

    // Samples are ordered oldest to newest
    let times: Vec<f64> = sim.diagnostics_history().map(|s| s.t).collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn reset_restores_initial_state() {
    let mut sim = Simulation::initialize(figure_eight_bodies(), test_params())
        .expect("figure-8 is valid");
    let initial = sim.snapshot();

    for _ in 0..20 {
        sim.advance(1e-3).expect("step");
    }
    assert!(sim.time() > 0.0);

    sim.reset();
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.phase(), Phase::Ready);
    assert_eq!(sim.diagnostics_history().count(), 0);
    let restored = sim.snapshot();
    for (a, b) in initial.bodies.iter().zip(restored.bodies.iter()) {
        assert_eq!(a.x, b.x);
        assert_eq!(a.v, b.v);
    }
}

// ==================================================================================
// Scenario tests
// ==================================================================================

#[test]
fn presets_are_valid_and_advance() {
    for name in Scenario::PRESETS {
        let mut scenario = Scenario::by_name(name).expect("preset exists");
        let outcome = scenario
            .simulation
            .advance(1e-4)
            .unwrap_or_else(|e| panic!("preset '{name}' failed to step: {e}"));
        assert!(outcome.state.is_finite(), "preset '{name}' went non-finite");
    }
}

#[test]
fn yaml_scenario_round_trip() {
    let yaml = r#"
name: "two-body circular"
engine:
  integrator: "leapfrog"
  adaptive: false
parameters:
  t_end: 1.0
  dt0: 1.0e-3
  dt_min: 1.0e-4
  dt_max: 2.0e-3
  tolerance: 1.0e-8
  eps2: 0.0
  G: 1.0
  collision_threshold: 0.0
bodies:
  - x: [ -0.5, 0.0 ]
    v: [ 0.0, -0.70710678 ]
    m: 1.0
  - x: [ 0.5, 0.0 ]
    v: [ 0.0, 0.70710678 ]
    m: 1.0
"#;
    let cfg: tribody::ScenarioConfig = serde_yaml::from_str(yaml).expect("valid yaml");
    let mut scenario = Scenario::build_scenario(cfg).expect("valid scenario");
    assert_eq!(scenario.name, "two-body circular");
    assert_eq!(
        scenario.simulation.integrator(),
        IntegratorKind::Leapfrog
    );

    // Equal-mass circular binary: |x| should stay near 0.5 for each body
    for _ in 0..1000 {
        scenario.simulation.advance(1e-3).expect("step");
    }
    for b in &scenario.simulation.snapshot().bodies {
        let r = b.x.norm();
        assert!(
            (r - 0.5).abs() < 0.05,
            "binary orbit radius drifted to {r}"
        );
    }
}
