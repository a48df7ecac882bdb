use neuroracer_training::stats::GenerationStats;
use serde::{Deserialize, Serialize};

/// Notification broadcast to every subscriber of a session.
///
/// Serialized with an `"event"` tag, e.g.
/// `{"event":"generation_complete","generation":0,"best_fitness":1200.0,...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Started { population_size: usize },
    GenerationComplete(GenerationStats),
    Paused { generation: usize },
    Resumed { generation: usize },
    /// The run was stopped on request.
    Stopped { generation: usize },
    /// The run reached its generation limit.
    Finished { generations: usize },
    /// The run failed and was abandoned.
    Error { error: String },
}

impl SessionEvent {
    /// Returns `true` for the last event a run emits.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Stopped { .. } | Self::Finished { .. } | Self::Error { .. }
        )
    }
}
