use neuroracer_network::{CAR_INPUT_SIZE, CAR_OUTPUT_SIZE, DecisionNetwork};
use serde::{Deserialize, Serialize};

/// What a controller sees of the car before each step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Distance to the left wall (equal to the lateral position).
    pub left_distance: f32,
    /// Distance to the right wall.
    pub right_distance: f32,
    pub speed: f32,
    /// Longitudinal progress as a fraction of the track length.
    pub progress: f32,
}

impl Observation {
    /// Number of values in an observation.
    pub const LEN: usize = CAR_INPUT_SIZE;

    /// Returns the observation in network input order.
    #[must_use]
    pub const fn to_array(&self) -> [f32; Self::LEN] {
        [
            self.left_distance,
            self.right_distance,
            self.speed,
            self.progress,
        ]
    }
}

/// Signed steering and acceleration, each expected in roughly `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    /// Negative steers toward the left wall, positive toward the right wall.
    pub steering: f32,
    /// Negative brakes, positive speeds up.
    pub acceleration: f32,
}

impl Action {
    /// Neither steer nor accelerate.
    pub const IDLE: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(steering: f32, acceleration: f32) -> Self {
        Self {
            steering,
            acceleration,
        }
    }
}

impl From<[f32; CAR_OUTPUT_SIZE]> for Action {
    fn from([steering, acceleration]: [f32; CAR_OUTPUT_SIZE]) -> Self {
        Self::new(steering, acceleration)
    }
}

/// Decides the next action from an observation.
///
/// Implemented for decision networks with a 4-value input and a 2-value output, and for
/// plain closures, which is convenient for scripted drivers.
pub trait Controller {
    fn act(&self, observation: &Observation) -> Action;
}

impl<F> Controller for F
where
    F: Fn(&Observation) -> Action,
{
    fn act(&self, observation: &Observation) -> Action {
        self(observation)
    }
}

impl<const HIDDEN: usize> Controller
    for DecisionNetwork<CAR_INPUT_SIZE, HIDDEN, CAR_OUTPUT_SIZE>
{
    fn act(&self, observation: &Observation) -> Action {
        self.forward(&observation.to_array()).into()
    }
}
