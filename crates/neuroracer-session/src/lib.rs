//! Session management for running the evolutionary loop in the background.
//!
//! A [`SimulationSession`] owns at most one running evolution at a time. The loop runs on
//! a dedicated worker thread; callers control it with [`start`](SimulationSession::start),
//! [`pause`](SimulationSession::pause), [`resume`](SimulationSession::resume) and
//! [`stop`](SimulationSession::stop), and observe it through [`SessionEvent`]s and
//! snapshots.
//!
//! # Session States
//!
//! ```text
//!          start            pause
//! Idle ──────────→ Running ───────→ Paused
//!  ↑                │  ↑   resume     │
//!  │                │  └──────────────┘
//!  │           stop │                 │ stop
//!  │                ↓                 │
//!  └──────────── Stopping ←───────────┘
//!   (next generation boundary)
//! ```
//!
//! A run also returns to `Idle` when it reaches its generation limit or fails.
//!
//! Commands never interrupt a generation in progress. They take effect at the next
//! generation boundary, where the worker publishes the new population and statistics.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use neuroracer_session::{SessionConfig, SessionEvent, SimulationSession};
//!
//! let session = SimulationSession::new();
//! let events = session.subscribe();
//! session
//!     .start(SessionConfig {
//!         generations: Some(2),
//!         generation_delay: Duration::ZERO,
//!         seed: Some(1),
//!         ..SessionConfig::with_population_size(10)
//!     })
//!     .unwrap();
//! session.wait();
//!
//! let events = events.try_iter().collect::<Vec<_>>();
//! assert_eq!(events.last(), Some(&SessionEvent::Finished { generations: 2 }));
//! assert_eq!(session.stats().history.len(), 2);
//! ```

use std::io;

use neuroracer_engine::TrackConfigError;
use neuroracer_training::EvolutionError;

pub use self::{config::*, event::*, session::*};

mod config;
mod event;
mod session;

/// Error returned when a run cannot be started.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StartError {
    /// Another run is still active (running, paused or stopping).
    #[display("simulation already running")]
    AlreadyRunning,
    #[display("invalid evolution parameters: {_0}")]
    InvalidParams(EvolutionError),
    #[display("invalid track: {_0}")]
    InvalidTrack(TrackConfigError),
    #[display("failed to spawn evolution worker: {_0}")]
    Spawn(io::Error),
}
