//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant and softening (`g`, `eps2`),
//! - adaptive step control (tolerance, dt bounds, retry budget),
//! - collision threshold and restitution,
//! - diagnostics history capacity

#[derive(Debug, Clone)]
pub struct Parameters {
    pub g: f64,                   // gravitational constant
    pub eps2: f64,                // softening epsilon^2
    pub dt0: f64,                 // initial / fixed step size
    pub dt_min: f64,              // lower step clamp
    pub dt_max: f64,              // upper step clamp
    pub tolerance: f64,           // relative per-step error tolerance
    pub max_retries: u32,         // step-halving budget before degrading
    pub adaptive: bool,           // false = fixed dt0
    pub collision_threshold: f64, // pair separation triggering response
    pub restitution: f64,         // [0, 1] bounce along the contact normal
    pub history_cap: usize,       // ring-buffer length for samples
    pub event_cap: usize,         // collision event log bound
}

impl Default for Parameters {
    // Defaults follow the scenario units the presets are tuned in
    fn default() -> Self {
        Self {
            g: 1.0,
            eps2: 1e-4,
            dt0: 5e-4,
            dt_min: 1e-4,
            dt_max: 2e-3,
            tolerance: 1e-8,
            max_retries: 8,
            adaptive: true,
            collision_threshold: 0.05,
            restitution: 0.5,
            history_cap: 1000,
            event_cap: 1000,
        }
    }
}
