//! Force / acceleration contributors for the three-body engine
//!
//! Defines the acceleration trait and the softened direct-sum
//! Newtonian gravity term

use crate::simulation::states::{NVec2, System};

/// Collection of acceleration terms (gravity is the only built-in one).
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per body
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Compute total accelerations at time `t` for all bodies in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, t: f64, sys: &System, out: &mut [NVec2]) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        // Iterate over all acceleration contributors
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for acceleration sources operating on [`System`]
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, t: f64, sys: &System, out: &mut [NVec2]);
}

/// Newtonian gravity with softening
/// `eps2` smooths close encounters and bounds the acceleration as
/// separation approaches zero
pub struct NewtonianGravity {
    pub g: f64,    // gravitational constant
    pub eps2: f64, // softening epsilon^2
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        let n = sys.bodies.len();
        if n == 0 {
            return;
        }

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let bi = &sys.bodies[i];
            let xi = bi.x; // position of body i
            let mi = bi.m; // mass of body i

            for j in (i + 1)..n {
                let bj = &sys.bodies[j];
                let xj = bj.x;
                let mj = bj.m;

                // r is the displacement vector from i to j.
                // i feels a pull along +r, j feels a pull along -r
                let r = xj - xi;

                // Softened squared distance: d2 = |r|^2 + eps^2
                let d2 = r.norm_squared() + self.eps2;

                // 1 / |r_soft|^3, the distance factor of a = r / |r|^3
                let inv_r = d2.sqrt().recip();
                let inv_r3 = inv_r * inv_r * inv_r;

                // coef = G / |r_soft|^3
                let coef = self.g * inv_r3;

                // Newton's third law: equal and opposite, so the pair is
                // evaluated once and applied to both bodies
                // a_i +=  G * m_j * r / |r_soft|^3
                // a_j += -G * m_i * r / |r_soft|^3
                out[i] += coef * mj * r;
                out[j] -= coef * mi * r;
            }
        }
    }
}
