//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator selection and adaptive stepping
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! name: "two-body circular"
//!
//! engine:
//!   integrator: "rk4"       # or "leapfrog", "verlet"
//!   adaptive: true
//!
//! parameters:
//!   t_end: 10.0             # total simulation time for the headless runner
//!   dt0: 5.0e-4             # initial / fixed step size
//!   dt_min: 1.0e-4          # lower step clamp
//!   dt_max: 2.0e-3          # upper step clamp
//!   tolerance: 1.0e-8       # relative per-step error tolerance
//!   max_retries: 8          # halvings before a step is flagged degraded
//!   eps2: 1.0e-4            # softening epsilon^2
//!   G: 1.0                  # gravitational constant
//!   collision_threshold: 0.05
//!   restitution: 0.5
//!
//! bodies:
//!   - x: [ -0.5, 0.0 ]
//!     v: [  0.0, 1.0 ]
//!     m: 1.0
//!   - x: [  0.5, 0.0 ]
//!     v: [  0.0, -1.0 ]
//!     m: 1.0
//! ```
//!
//! The engine maps this configuration into its internal runtime structs;
//! the physics never reads these types directly.

use serde::Deserialize;

/// Which integrator method the engine starts with
#[derive(Deserialize, Debug, Clone, Copy)]
pub enum IntegratorConfig {
    #[serde(rename = "rk4")] // Classical 4th-order Runge-Kutta, the high-accuracy default
    Rk4,

    #[serde(rename = "leapfrog")] // Velocity Verlet. Symplectic, two force evals per step
    Leapfrog,

    #[serde(rename = "verlet")] // Position Verlet. Symplectic, one force eval, needs a bootstrap step
    Verlet,
}

/// High-level engine configuration
#[derive(Deserialize, Debug)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // time integrator used for advancing the system state
    #[serde(default = "default_adaptive")]
    pub adaptive: bool, // `false` pins dt to `dt0`
}

fn default_adaptive() -> bool {
    true
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64,      // total simulated time for the headless runner
    pub dt0: f64,        // initial / fixed step size
    pub dt_min: f64,     // lower step clamp
    pub dt_max: f64,     // upper step clamp
    pub tolerance: f64,  // relative per-step error tolerance
    #[serde(default = "default_max_retries")]
    pub max_retries: u32, // step-halving budget before degrading
    pub eps2: f64,       // softening - prevents singular forces at small separations
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    pub collision_threshold: f64, // pair separation triggering soft-sphere response
    #[serde(default)]
    pub restitution: f64, // [0, 1] bounce along the contact normal
}

fn default_max_retries() -> u32 {
    8
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug)]
pub struct BodyConfig {
    pub x: Vec<f64>, // initial position [x, y] in scenario units
    pub v: Vec<f64>, // initial velocity [vx, vy] in scenario units per time unit
    pub m: f64,      // mass of the body
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: String, // display name for logs and summaries
    pub engine: EngineConfig, // integrator selection and adaptivity
    pub parameters: ParametersConfig, // global numerical and physical parameters
    pub bodies: Vec<BodyConfig>, // initial state of the system
}
