use std::path::PathBuf;

use neuroracer_engine::{CarState, RaceEnvironment, RaceOutcome, TrackConfig};
use serde::Serialize;

use crate::{model::RacerModel, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DriveArg {
    /// Model file exported by `train`
    #[arg(long)]
    model: PathBuf,
    /// Include the car position of every step in the output
    #[arg(long)]
    trace: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Result of one drive, written as JSON.
#[derive(Debug, Serialize)]
struct DriveReport<'a> {
    model: &'a str,
    #[serde(flatten)]
    outcome: RaceOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    trajectory: Option<Vec<CarState>>,
}

pub(crate) fn run(arg: &DriveArg) -> anyhow::Result<()> {
    let DriveArg {
        model,
        trace,
        output,
    } = arg;

    let model = RacerModel::open(model)?;
    eprintln!(
        "Loaded {} (generation #{}, trained {})",
        model.name, model.generation, model.trained_at
    );

    let report = drive(&model, TrackConfig::default(), *trace)?;
    let outcome = &report.outcome;
    eprintln!(
        "{} after {} steps at x={:.1}, y={:.1}, fitness {:.1}",
        outcome.state, outcome.steps, outcome.car.x, outcome.car.y, outcome.fitness,
    );
    Output::save_json(&report, output.clone())?;

    Ok(())
}

fn drive(
    model: &RacerModel,
    track: TrackConfig,
    trace: bool,
) -> anyhow::Result<DriveReport<'_>> {
    let network = model.to_network()?;
    let mut environment = RaceEnvironment::new(track);
    let (outcome, trajectory) = environment.run_traced(&network);
    Ok(DriveReport {
        model: &model.name,
        outcome,
        trajectory: trace.then_some(trajectory),
    })
}
