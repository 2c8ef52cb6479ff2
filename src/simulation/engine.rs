//! Simulation instance: owns the state and drives one step per call
//!
//! `Simulation` is the explicit owner of a `System` plus its force set,
//! integrator selection, adaptive controller, conservation monitor, and
//! collision event log. Hosts construct one with [`Simulation::initialize`]
//! and drive it with [`Simulation::advance`]; they only ever receive
//! snapshots, never mutable references into the physics state. Multiple
//! instances coexist with no shared globals.
//!
//! Phases: Ready <-> (stepping inside `advance`) -> Degraded when the
//! adaptive controller exhausts its retry budget; a later in-tolerance step
//! returns the instance to Ready. There is no terminal phase — the core
//! runs until the host stops calling `advance` or a fatal
//! `NumericDivergence` is reported.

use super::adaptive::StepController;
use super::collision::{detect_and_respond, CollisionEvent};
use super::diagnostics::{measure, ConservationMonitor, ConservationSample};
use super::error::{Result, SimError};
use super::forces::{AccelSet, NewtonianGravity};
use super::integrator::{IntegratorKind, VerletHistory};
use super::params::Parameters;
use super::states::{Body, System};

/// Observable phase of the instance between `advance` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Degraded,
}

/// Everything one accepted step produces for the host
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: System,                // snapshot after the step
    pub sample: ConservationSample,   // conservation accounting, drift filled
    pub events: Vec<CollisionEvent>,  // collisions this step (usually empty)
}

pub struct Simulation {
    params: Parameters,
    system: System,
    initial: System, // pristine copy for reset
    forces: AccelSet,
    integrator: IntegratorKind,
    verlet_hist: Option<VerletHistory>,
    pending_bootstrap: bool, // next step runs leapfrog to seed Verlet history
    controller: StepController,
    monitor: ConservationMonitor,
    events: Vec<CollisionEvent>,
    phase: Phase,
}

impl Simulation {
    /// Validate an initial configuration and build a Ready instance.
    /// Rejects fewer than two bodies, non-positive masses, and coincident
    /// positions; no partial state is produced on rejection.
    pub fn initialize(bodies: Vec<Body>, params: Parameters) -> Result<Self> {
        if !(params.dt_min > 0.0 && params.dt_min <= params.dt_max) || !(params.dt0 > 0.0) {
            return Err(SimError::InvalidInitialState(format!(
                "step bounds are inconsistent: dt0={}, dt_min={}, dt_max={}",
                params.dt0, params.dt_min, params.dt_max
            )));
        }
        if !(params.tolerance > 0.0) {
            return Err(SimError::InvalidInitialState(format!(
                "tolerance must be positive, got {}",
                params.tolerance
            )));
        }
        if bodies.len() < 2 {
            return Err(SimError::InvalidInitialState(format!(
                "need at least 2 bodies, got {}",
                bodies.len()
            )));
        }
        for (i, b) in bodies.iter().enumerate() {
            if !(b.m > 0.0) || !b.m.is_finite() {
                return Err(SimError::InvalidInitialState(format!(
                    "body {i} has non-positive mass {}",
                    b.m
                )));
            }
            if b.x.iter().any(|c| !c.is_finite()) || b.v.iter().any(|c| !c.is_finite()) {
                return Err(SimError::InvalidInitialState(format!(
                    "body {i} has a non-finite position or velocity"
                )));
            }
        }
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                if bodies[i].x == bodies[j].x {
                    return Err(SimError::InvalidInitialState(format!(
                        "bodies {i} and {j} are coincident"
                    )));
                }
            }
        }

        let forces = AccelSet::new().with(NewtonianGravity {
            g: params.g,
            eps2: params.eps2,
        });
        let system = System { bodies, t: 0.0 };

        Ok(Self {
            initial: system.clone(),
            controller: StepController::new(params.dt0),
            monitor: ConservationMonitor::new(params.history_cap),
            system,
            forces,
            integrator: IntegratorKind::Rk4,
            verlet_hist: None,
            pending_bootstrap: false,
            events: Vec::new(),
            phase: Phase::Ready,
            params,
        })
    }

    /// Advance by one accepted step of at most `dt_request`.
    ///
    /// The adaptive controller picks the actual dt; the collision responder
    /// and conservation monitor observe the result before it is returned.
    /// Fatal only on numeric divergence (non-finite energy after the step).
    pub fn advance(&mut self, dt_request: f64) -> Result<StepOutcome> {
        let dt_request = if dt_request.is_finite() && dt_request > 0.0 {
            dt_request
        } else {
            self.params.dt0
        };

        // A Verlet switch without history runs this one step as leapfrog
        // and seeds the previous-position record from the pre-step state
        let bootstrap = self.integrator == IntegratorKind::Verlet && self.pending_bootstrap;
        let effective = if bootstrap {
            IntegratorKind::Leapfrog
        } else {
            self.integrator
        };
        let pre_positions: Vec<_> = self.system.bodies.iter().map(|b| b.x).collect();

        let report = self.controller.advance(
            &mut self.system,
            &self.forces,
            effective,
            &mut self.verlet_hist,
            &self.params,
            dt_request,
        );

        if bootstrap {
            self.verlet_hist = Some(VerletHistory {
                prev: pre_positions,
                dt: report.dt_used,
            });
            self.pending_bootstrap = false;
            log::debug!("verlet history bootstrapped at t={:.6}", self.system.t);
        }

        // Corrective layer: soft-sphere response after the physics step
        let events = detect_and_respond(
            &mut self.system,
            self.params.collision_threshold,
            self.params.restitution,
            report.dt_used,
        );
        // The log keeps at least one entry so a zero cap cannot underflow
        let event_cap = self.params.event_cap.max(1);
        for e in &events {
            while self.events.len() >= event_cap {
                self.events.remove(0);
            }
            self.events.push(*e);
        }
        // Impulses move the bodies off the Verlet trajectory; the stored
        // history is no longer consistent with the new velocities
        if !events.is_empty() {
            self.verlet_hist = None;
        }

        let mut sample = measure(&self.system, self.params.g, self.params.eps2);
        sample.degraded = report.degraded;

        if !sample.total_energy.is_finite() || !self.system.is_finite() {
            return Err(SimError::NumericDivergence { t: self.system.t });
        }

        let sample = self.monitor.record(sample);
        self.phase = if report.degraded {
            Phase::Degraded
        } else {
            Phase::Ready
        };

        Ok(StepOutcome {
            state: self.system.clone(),
            sample,
            events,
        })
    }

    /// Switch the stepping scheme for subsequent `advance` calls.
    /// Switching to Verlet arms an implicit leapfrog bootstrap; any held
    /// history is dropped so a stale record is never reused.
    pub fn set_integrator(&mut self, kind: IntegratorKind) {
        if kind != self.integrator {
            log::debug!("integrator switched to {:?} at t={:.6}", kind, self.system.t);
        }
        self.integrator = kind;
        self.verlet_hist = None;
        self.pending_bootstrap = kind == IntegratorKind::Verlet;
    }

    pub fn integrator(&self) -> IntegratorKind {
        self.integrator
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> System {
        self.system.clone()
    }

    /// Oldest-to-newest conservation samples (bounded ring)
    pub fn diagnostics_history(&self) -> impl Iterator<Item = &ConservationSample> {
        self.monitor.history()
    }

    /// All collision events recorded so far (bounded)
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn time(&self) -> f64 {
        self.system.t
    }

    /// Restore the initial state: t = 0, histories cleared, drift baseline
    /// re-armed, step proposal back to dt0
    pub fn reset(&mut self) {
        self.system = self.initial.clone();
        self.controller.reset(self.params.dt0);
        self.monitor.clear();
        self.events.clear();
        self.verlet_hist = None;
        self.pending_bootstrap = self.integrator == IntegratorKind::Verlet;
        self.phase = Phase::Ready;
    }
}
