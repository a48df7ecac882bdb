//! Deterministic car-on-track simulation used to score racing controllers.
//!
//! A car starts in the middle of a straight track and moves forward every step. A
//! [`Controller`] observes the car and returns a steering/acceleration [`Action`]. The
//! run ends when the car leaves the track, reaches the end of the track, or exhausts the
//! step limit.
//!
//! # Step Rules
//!
//! ```text
//! x     += steering × steering_sensitivity
//! speed  = clamp(speed + acceleration × acceleration_factor, min_speed, max_speed)
//! y     += speed
//! x < 0 or x > track_width   → Crashed
//! else y ≥ track_length      → Finished (fitness += completion_bonus)
//! fitness += survival_reward
//! steps == max_steps          → StepLimitReached (if still running)
//! ```
//!
//! The lateral position is never clamped; a car may sit outside the track for the rest
//! of the step in which it crashed.
//!
//! # Example
//!
//! ```
//! use neuroracer_engine::{Action, Observation, RaceEnvironment, RaceState, TrackConfig};
//!
//! let mut env = RaceEnvironment::new(TrackConfig::default());
//! // A controller that never steers nor accelerates finishes in 200 steps.
//! let fitness = env.run(&|_: &Observation| Action::IDLE);
//! assert_eq!(fitness, 1200.0);
//! assert_eq!(env.state(), RaceState::Finished);
//! ```

pub use self::{controller::*, environment::*, track::*};

mod controller;
mod environment;
mod track;
