pub mod benchmark;
pub mod configuration;
pub mod simulation;

pub use simulation::adaptive::{StepController, StepReport};
pub use simulation::collision::CollisionEvent;
pub use simulation::diagnostics::{ConservationMonitor, ConservationSample};
pub use simulation::engine::{Phase, Simulation, StepOutcome};
pub use simulation::error::SimError;
pub use simulation::forces::{AccelSet, Acceleration, NewtonianGravity};
pub use simulation::integrator::IntegratorKind;
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;
pub use simulation::states::{Body, NVec2, System};

pub use configuration::config::{
    BodyConfig, EngineConfig, IntegratorConfig, ParametersConfig, ScenarioConfig,
};

pub use benchmark::benchmark::{bench_gravity, bench_integrators};
