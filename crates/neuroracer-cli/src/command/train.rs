use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, bail};
use neuroracer_engine::{RaceEnvironment, RaceOutcome, TrackConfig};
use neuroracer_network::CarNetwork;
use neuroracer_session::{SessionConfig, SessionEvent, SimulationSession};
use neuroracer_training::genetic::{EvolutionParams, PopulationSnapshot};

use crate::{model::RacerModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of drivers per generation
    #[arg(long, default_value_t = EvolutionParams::default().population_size)]
    population_size: usize,
    /// Number of generations to evolve
    #[arg(long, default_value_t = 100, conflicts_with = "forever")]
    generations: usize,
    /// Keep evolving until interrupted with Ctrl-C
    #[arg(long)]
    forever: bool,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between generations in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
    /// Write every session event to this file as JSON Lines
    #[arg(long)]
    events: Option<PathBuf>,
    /// Name stored in the exported model
    #[arg(long, default_value = "neuroracer")]
    name: String,
    /// Output file path for the best driver
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population_size,
        generations,
        forever,
        seed,
        delay_ms,
        events,
        name,
        output,
    } = arg;

    let config = SessionConfig {
        generations: (!forever).then_some(*generations),
        generation_delay: Duration::from_millis(*delay_ms),
        seed: *seed,
        ..SessionConfig::with_population_size(*population_size)
    };
    let mut event_log = events.clone().map(Output::create).transpose()?;

    let session = Arc::new(SimulationSession::new());
    let interrupted = Arc::clone(&session);
    ctrlc::set_handler(move || {
        if interrupted.stop() {
            eprintln!("Interrupted, stopping after the current generation...");
        }
    })
    .context("Failed to install the Ctrl-C handler")?;

    let receiver = session.subscribe();
    session
        .start(config)
        .context("Failed to start the training session")?;

    for event in &receiver {
        if let Some(log) = &mut event_log {
            log.write_json_line(&event)?;
        }
        match event {
            SessionEvent::Started { population_size } => {
                eprintln!("Training {population_size} drivers...");
            }
            SessionEvent::GenerationComplete(stats) => {
                eprintln!(
                    "Generation #{}: best {:.1}, avg {:.1}, worst {:.1}",
                    stats.generation, stats.best_fitness, stats.avg_fitness, stats.worst_fitness,
                );
            }
            SessionEvent::Paused { .. } | SessionEvent::Resumed { .. } => {}
            SessionEvent::Stopped { generation } => {
                eprintln!("Stopped at generation #{generation}");
                break;
            }
            SessionEvent::Finished { generations } => {
                eprintln!("Finished after {generations} generations");
                break;
            }
            SessionEvent::Error { error } => bail!("Training failed: {error}"),
        }
    }
    session.wait();

    let population = session
        .population()
        .context("Training session produced no population")?;
    let (model, outcome) = export_best(&population, config.track, name)?;
    eprintln!(
        "Best driver: {} after {} steps, fitness {:.1}",
        outcome.state, outcome.steps, outcome.fitness,
    );
    Output::save_json(&model, output.clone())?;

    Ok(())
}

/// Builds a model from the elite of `population` and scores it once more on `track`.
///
/// The elite sits at index 0 of every evolved population.
fn export_best(
    population: &PopulationSnapshot,
    track: TrackConfig,
    name: &str,
) -> anyhow::Result<(RacerModel, RaceOutcome)> {
    let best = population
        .agents
        .first()
        .context("Training session produced an empty population")?;
    let network = CarNetwork::restore(&best.weights)
        .with_context(|| format!("Failed to restore the weights of {}", best.id))?;

    let mut environment = RaceEnvironment::new(track);
    environment.run(&network);
    let outcome = environment.outcome();

    let model = RacerModel::new(
        name.to_owned(),
        population.generation,
        outcome.fitness,
        &network,
    );
    Ok((model, outcome))
}
