pub mod adaptive;
pub mod collision;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod params;
pub mod scenario;
pub mod states;
