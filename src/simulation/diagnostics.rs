//! Conservation accounting for the three-body system
//!
//! `measure` is a pure function of a [`System`]: kinetic and softened
//! potential energy, total momentum, and the scalar (2D) angular momentum.
//! The potential uses the same eps2 as the force evaluator so the two stay
//! consistent. [`ConservationMonitor`] keeps a bounded ring-buffer history
//! and exposes energy drift relative to the first recorded sample; it is
//! telemetry only and never feeds back into the trajectory.

use std::collections::VecDeque;

use super::states::{NVec2, System};

/// One per accepted step: the conserved quantities and the drift at that
/// time. `degraded` marks samples accepted past the adaptive retry budget.
#[derive(Debug, Clone, Copy)]
pub struct ConservationSample {
    pub t: f64,
    pub kinetic: f64,
    pub potential: f64,
    pub total_energy: f64,
    pub momentum: NVec2,
    pub angular_momentum: f64, // scalar z-component of sum m (x cross v)
    pub drift: f64,            // (E - E0) / |E0|
    pub degraded: bool,
}

/// Compute the conserved quantities of `sys` with gravitational constant
/// `g` and softening `eps2`. Drift is filled in by the monitor.
pub fn measure(sys: &System, g: f64, eps2: f64) -> ConservationSample {
    let kinetic: f64 = sys.bodies.iter().map(|b| b.kinetic_energy()).sum();

    // Softened pair potential: -G m_i m_j / sqrt(|r|^2 + eps^2),
    // matching the force law so energy bookkeeping is self-consistent
    let mut potential = 0.0;
    let n = sys.bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let r2 = (sys.bodies[j].x - sys.bodies[i].x).norm_squared();
            potential -= g * sys.bodies[i].m * sys.bodies[j].m / (r2 + eps2).sqrt();
        }
    }

    let momentum = sys.total_momentum();

    // L_z = sum m (x * vy - y * vx)
    let angular_momentum: f64 = sys
        .bodies
        .iter()
        .map(|b| b.m * (b.x.x * b.v.y - b.x.y * b.v.x))
        .sum();

    ConservationSample {
        t: sys.t,
        kinetic,
        potential,
        total_energy: kinetic + potential,
        momentum,
        angular_momentum,
        drift: 0.0,
        degraded: false,
    }
}

/// Bounded history of conservation samples with a drift baseline
#[derive(Debug, Clone)]
pub struct ConservationMonitor {
    history: VecDeque<ConservationSample>,
    capacity: usize,
    e0: Option<f64>, // total energy of the first recorded sample
}

impl ConservationMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            e0: None,
        }
    }

    /// Record a measurement, filling in drift against the baseline.
    /// Returns the completed sample. The oldest entry is dropped once the
    /// ring is full.
    pub fn record(&mut self, mut sample: ConservationSample) -> ConservationSample {
        let e0 = *self.e0.get_or_insert(sample.total_energy);
        sample.drift = if e0 != 0.0 {
            (sample.total_energy - e0) / e0.abs()
        } else {
            sample.total_energy - e0
        };

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        sample
    }

    /// Oldest-to-newest view of the recorded samples
    pub fn history(&self) -> impl Iterator<Item = &ConservationSample> {
        self.history.iter()
    }

    pub fn latest(&self) -> Option<&ConservationSample> {
        self.history.back()
    }

    /// Drop history and re-arm the drift baseline (used by engine reset)
    pub fn clear(&mut self) {
        self.history.clear();
        self.e0 = None;
    }
}
