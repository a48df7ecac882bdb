use clap::{Parser, Subcommand};

use self::{drive::DriveArg, train::TrainArg};

mod drive;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a population of drivers and export the best one
    Train(#[clap(flatten)] TrainArg),
    /// Drive a trained model down the track once
    Drive(#[clap(flatten)] DriveArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Drive(arg) => drive::run(&arg)?,
    }
    Ok(())
}
