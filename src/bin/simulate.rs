use std::{fs::File, io::BufReader, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use quadgrav::{
    body_creator::DistrBodyCreator, csv::SnapshotWriter, DynSimulation, SimulationConfig,
    SolverKind,
};

/// Run the simulation headless and optionally dump every tick to CSV.
#[derive(Parser, Debug)]
struct Args {
    /// YAML configuration; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 600)]
    steps: u64,

    /// Write per-tick body snapshots here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the number of seeded bodies
    #[arg(short = 'n', long)]
    bodies: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Use exact pairwise summation instead of Barnes-Hut
    #[arg(long)]
    direct: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config {}", path.display()))?;
            serde_yaml::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(n) = args.bodies {
        config.initial_bodies = n;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.direct {
        config.solver = SolverKind::DirectSummation;
    }

    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut simulation = DynSimulation::from_config(&config)?;
    let mut creator = DistrBodyCreator::from_config(&config);
    simulation.seed(&mut creator, config.initial_bodies)?;
    log::info!(
        "seeded {} bodies in a {}x{} domain using {:?}",
        simulation.len(),
        config.width,
        config.height,
        config.solver
    );

    let mut writer = args
        .output
        .as_ref()
        .map(|path| {
            SnapshotWriter::create(path)
                .with_context(|| format!("failed to create {}", path.display()))
        })
        .transpose()?;
    if let Some(writer) = &mut writer {
        writer.write_tick(0, simulation.bodies())?;
    }

    let start = Instant::now();
    for t in 1..=args.steps {
        simulation.step();

        if let Some(writer) = &mut writer {
            writer.write_tick(t, simulation.bodies())?;
        }
        if t % u64::from(config.fps.max(1)) == 0 {
            log::debug!("{t} out of {} ticks done, {} bodies", args.steps, simulation.len());
        }
    }
    let elapsed = start.elapsed();

    if let Some(writer) = writer {
        writer.finish()?;
    }

    log::info!(
        "{} ticks in {:.3}s ({:.1} ticks/s), {} bodies left, total mass {:.3}",
        args.steps,
        elapsed.as_secs_f64(),
        args.steps as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        simulation.len(),
        simulation.total_mass()
    );

    Ok(())
}
