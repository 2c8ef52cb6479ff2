//! Build fully-initialized simulations from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing a validated [`Simulation`] instance plus the
//! run horizon for the headless driver. Also provides the built-in named
//! presets (figure-8, binary capture, sun-earth-moon) so hosts can seed a
//! simulation without a config file.

use crate::configuration::config::{IntegratorConfig, ScenarioConfig};
use crate::simulation::engine::Simulation;
use crate::simulation::error::Result;
use crate::simulation::integrator::IntegratorKind;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2};

/// A fully-initialized simulation plus the settings the runner needs
pub struct Scenario {
    pub name: String,
    pub simulation: Simulation,
    pub t_end: f64, // run horizon for the headless driver
}

impl Scenario {
    /// Map a deserialized config into a validated runtime scenario.
    /// Fails with `InvalidInitialState` exactly as [`Simulation::initialize`]
    /// does; no partial scenario is produced.
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors.
        // Missing components are treated as zero so 1D configs stay terse
        let bodies: Vec<Body> = cfg
            .bodies
            .iter()
            .map(|bc| Body {
                x: NVec2::new(component(&bc.x, 0), component(&bc.x, 1)),
                v: NVec2::new(component(&bc.v, 0), component(&bc.v, 1)),
                m: bc.m,
            })
            .collect();

        let p = &cfg.parameters;
        let params = Parameters {
            g: p.g,
            eps2: p.eps2,
            dt0: p.dt0,
            dt_min: p.dt_min,
            dt_max: p.dt_max,
            tolerance: p.tolerance,
            max_retries: p.max_retries,
            adaptive: cfg.engine.adaptive,
            collision_threshold: p.collision_threshold,
            restitution: p.restitution,
            ..Parameters::default()
        };

        let mut simulation = Simulation::initialize(bodies, params)?;
        simulation.set_integrator(match cfg.engine.integrator {
            IntegratorConfig::Rk4 => IntegratorKind::Rk4,
            IntegratorConfig::Leapfrog => IntegratorKind::Leapfrog,
            IntegratorConfig::Verlet => IntegratorKind::Verlet,
        });

        Ok(Self {
            name: cfg.name,
            simulation,
            t_end: p.t_end,
        })
    }

    /// Equal-mass, zero-momentum figure-8 choreography. The reference
    /// configuration for long-horizon energy-conservation checks.
    pub fn figure_eight() -> Self {
        // Chenciner-Montgomery choreography: bodies 1 and 2 start at
        // point-symmetric positions sharing half the third body's
        // (negated) velocity
        let bodies = vec![
            Body {
                x: NVec2::new(0.97000436, -0.24308753),
                v: NVec2::new(0.4662036850, 0.4323657300),
                m: 1.0,
            },
            Body {
                x: NVec2::new(-0.97000436, 0.24308753),
                v: NVec2::new(0.4662036850, 0.4323657300),
                m: 1.0,
            },
            Body {
                x: NVec2::new(0.0, 0.0),
                v: NVec2::new(-0.9324073700, -0.8647314600),
                m: 1.0,
            },
        ];
        let params = Parameters {
            g: 1.0,
            dt0: 8e-4,
            ..Parameters::default()
        };
        let simulation = Simulation::initialize(bodies, params)
            .expect("figure-8 preset is a valid configuration");
        Self {
            name: "figure-eight".into(),
            simulation,
            t_end: 10.0,
        }
    }

    /// Binary star pair with a captured planet on a wide orbit
    pub fn binary_capture() -> Self {
        let bodies = vec![
            Body {
                x: NVec2::new(-1.5, 0.0),
                v: NVec2::new(0.0, 2.0),
                m: 50.0,
            },
            Body {
                x: NVec2::new(2.5, 0.0),
                v: NVec2::new(0.0, -3.3),
                m: 30.0,
            },
            Body {
                x: NVec2::new(0.0, 4.0),
                v: NVec2::new(1.8, 0.0),
                m: 1.0,
            },
        ];
        let params = Parameters {
            g: 8.0,
            dt0: 5e-4,
            ..Parameters::default()
        };
        let simulation = Simulation::initialize(bodies, params)
            .expect("binary-capture preset is a valid configuration");
        Self {
            name: "binary-capture".into(),
            simulation,
            t_end: 10.0,
        }
    }

    /// Heavy primary with a planet and its moon; the hierarchical-mass case
    pub fn sun_earth_moon() -> Self {
        let bodies = vec![
            Body {
                x: NVec2::new(0.0, 0.0),
                v: NVec2::new(0.0, 0.0),
                m: 333000.0,
            },
            Body {
                x: NVec2::new(4.0, 0.0),
                v: NVec2::new(0.0, 3.2),
                m: 1.0,
            },
            Body {
                x: NVec2::new(4.3, 0.0),
                v: NVec2::new(0.0, 4.1),
                m: 0.012,
            },
        ];
        let mut params = Parameters {
            g: 10.0,
            dt0: 1e-3,
            ..Parameters::default()
        };
        // Deep potential well; loosen the per-step tolerance so the
        // controller is not pinned at dt_min from the first step
        params.tolerance = 1e-6;
        let mut simulation = Simulation::initialize(bodies, params)
            .expect("sun-earth-moon preset is a valid configuration");
        simulation.set_integrator(IntegratorKind::Leapfrog);
        Self {
            name: "sun-earth-moon".into(),
            simulation,
            t_end: 10.0,
        }
    }

    /// Look up a built-in preset by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "figure-eight" => Some(Self::figure_eight()),
            "binary-capture" => Some(Self::binary_capture()),
            "sun-earth-moon" => Some(Self::sun_earth_moon()),
            _ => None,
        }
    }

    pub const PRESETS: &'static [&'static str] =
        &["figure-eight", "binary-capture", "sun-earth-moon"];
}

fn component(v: &[f64], i: usize) -> f64 {
    v.get(i).copied().unwrap_or(0.0)
}
