use tribody::{bench_gravity, bench_integrators};
use tribody::{IntegratorKind, Scenario, ScenarioConfig};

use anyhow::{bail, Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless three-body integration runner")]
struct Args {
    /// Built-in preset name (figure-eight, binary-capture, sun-earth-moon)
    #[arg(short, long, default_value = "figure-eight")]
    scenario: String,

    /// YAML scenario file under scenarios/ (overrides --scenario)
    #[arg(short, long)]
    file: Option<String>,

    /// Integrator override: rk4, leapfrog, or verlet
    #[arg(short, long)]
    integrator: Option<String>,

    /// Run horizon override in simulated time units
    #[arg(long)]
    t_end: Option<f64>,

    /// Run the force/integrator benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<Scenario> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("opening scenario file {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;
    Ok(Scenario::build_scenario(cfg)?)
}

fn parse_integrator(name: &str) -> Result<IntegratorKind> {
    match name {
        "rk4" => Ok(IntegratorKind::Rk4),
        "leapfrog" => Ok(IntegratorKind::Leapfrog),
        "verlet" => Ok(IntegratorKind::Verlet),
        other => bail!("unknown integrator '{other}' (expected rk4, leapfrog, or verlet)"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_integrators();
        return Ok(());
    }

    let mut scenario = match &args.file {
        Some(file) => load_scenario_from_yaml(file)?,
        None => Scenario::by_name(&args.scenario).with_context(|| {
            format!(
                "unknown preset '{}' (available: {})",
                args.scenario,
                Scenario::PRESETS.join(", ")
            )
        })?,
    };

    if let Some(name) = &args.integrator {
        scenario.simulation.set_integrator(parse_integrator(name)?);
    }
    let t_end = args.t_end.unwrap_or(scenario.t_end);

    log::info!(
        "running '{}' with {:?} until t = {t_end}",
        scenario.name,
        scenario.simulation.integrator()
    );

    let sim = &mut scenario.simulation;
    let frame_dt = sim.params().dt_max;
    let mut steps: u64 = 0;
    let mut degraded: u64 = 0;
    let mut last_drift = 0.0;

    while sim.time() < t_end {
        let outcome = sim.advance(frame_dt)?;
        steps += 1;
        last_drift = outcome.sample.drift;
        if outcome.sample.degraded {
            degraded += 1;
        }
    }

    println!("scenario:    {}", scenario.name);
    println!("steps:       {steps} ({degraded} degraded)");
    println!("sim time:    {:.6}", sim.time());
    println!("|drift|:     {:.3e}", last_drift.abs());
    println!("collisions:  {}", sim.events().len());

    Ok(())
}
