//! Core state types for the three-body simulation.
//!
//! Defines the body/system structs:
//! - `Body` using `NVec2` (position, velocity, mass)
//! - `System` holding the list of bodies and the current simulation time `t`
//!
//! Derived quantities (kinetic energy, momentum, center of mass) live here
//! as pure queries so diagnostics never recompute them ad hoc.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64,   // mass, > 0
}

impl Body {
    /// Kinetic energy 1/2 m |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }

    /// Linear momentum m v
    pub fn momentum(&self) -> NVec2 {
        self.m * self.v
    }

    pub fn speed(&self) -> f64 {
        self.v.norm()
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // fixed count for the lifetime of a run
    pub t: f64,            // simulation time, monotonically non-decreasing
}

impl System {
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }

    /// Total linear momentum sum of m_i v_i
    pub fn total_momentum(&self) -> NVec2 {
        self.bodies
            .iter()
            .fold(NVec2::zeros(), |p, b| p + b.momentum())
    }

    /// Mass-weighted mean position
    pub fn center_of_mass(&self) -> NVec2 {
        let m_total = self.total_mass();
        self.bodies.iter().fold(NVec2::zeros(), |c, b| c + b.m * b.x) / m_total
    }

    /// Mass-weighted mean velocity
    pub fn center_of_mass_velocity(&self) -> NVec2 {
        self.total_momentum() / self.total_mass()
    }

    /// True if every position and velocity component is finite
    pub fn is_finite(&self) -> bool {
        self.bodies
            .iter()
            .all(|b| b.x.iter().all(|c| c.is_finite()) && b.v.iter().all(|c| c.is_finite()))
    }
}
