use serde::{Deserialize, Serialize};

use crate::{Action, Controller, Observation, TrackConfig};

/// Lifecycle of a single run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum RaceState {
    #[display("running")]
    Running,
    /// The car left the track.
    #[display("crashed")]
    Crashed,
    /// The car reached the end of the track.
    #[display("finished")]
    Finished,
    /// The step limit ran out while the car was still on the track.
    #[display("step limit reached")]
    StepLimitReached,
}

impl RaceState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }
}

/// Kinematic state of the car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    /// Lateral position, `0` is the left wall.
    pub x: f32,
    /// Longitudinal progress along the track.
    pub y: f32,
    pub speed: f32,
}

/// Summary of a run, taken after it ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub state: RaceState,
    /// Number of steps taken, including the terminal one.
    pub steps: usize,
    /// Accumulated reward of the run.
    pub fitness: f32,
    /// Car state after the last step.
    pub car: CarState,
}

/// Step-based racing environment.
///
/// The environment is reset at the start of every [`run`](Self::run), so one instance
/// can score any number of controllers in sequence without state leaking between them.
/// It is not meant to be shared between threads; give each worker its own instance.
#[derive(Debug, Clone)]
pub struct RaceEnvironment {
    track: TrackConfig,
    car: CarState,
    steps: usize,
    state: RaceState,
    fitness: f32,
}

impl Default for RaceEnvironment {
    fn default() -> Self {
        Self::new(TrackConfig::default())
    }
}

impl RaceEnvironment {
    #[must_use]
    pub fn new(track: TrackConfig) -> Self {
        let mut this = Self {
            track,
            car: initial_car(&track),
            steps: 0,
            state: RaceState::Running,
            fitness: 0.0,
        };
        this.reset();
        this
    }

    /// Puts the car back at the start line.
    pub fn reset(&mut self) {
        self.car = initial_car(&self.track);
        self.steps = 0;
        self.fitness = 0.0;
        self.state = if self.track.max_steps == 0 {
            RaceState::StepLimitReached
        } else {
            RaceState::Running
        };
    }

    #[must_use]
    pub fn track(&self) -> &TrackConfig {
        &self.track
    }

    #[must_use]
    pub fn car(&self) -> &CarState {
        &self.car
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Fitness accumulated so far in the current run.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[must_use]
    pub fn outcome(&self) -> RaceOutcome {
        RaceOutcome {
            state: self.state,
            steps: self.steps,
            fitness: self.fitness,
            car: self.car,
        }
    }

    /// Returns what a controller sees of the current state.
    #[must_use]
    pub fn observe(&self) -> Observation {
        Observation {
            left_distance: self.car.x,
            right_distance: self.track.track_width - self.car.x,
            speed: self.car.speed,
            progress: self.car.y / self.track.track_length,
        }
    }

    /// Advances the simulation by one step.
    ///
    /// Does nothing once the run has reached a terminal state.
    ///
    /// # Panics
    ///
    /// Panics if the track's speed range is empty or has a NaN bound, which
    /// [`TrackConfig::validate`] reports.
    pub fn step(&mut self, action: Action) -> RaceState {
        if self.state.is_terminal() {
            return self.state;
        }
        let track = &self.track;

        self.car.x += action.steering * track.steering_sensitivity;
        self.car.speed = (self.car.speed + action.acceleration * track.acceleration_factor)
            .clamp(track.min_speed, track.max_speed);
        self.car.y += self.car.speed;

        if track.is_off_track(self.car.x) {
            self.state = RaceState::Crashed;
        } else if self.car.y >= track.track_length {
            self.fitness += track.completion_bonus;
            self.state = RaceState::Finished;
        }
        // the terminal step is rewarded as well
        self.fitness += track.survival_reward;

        self.steps += 1;
        if self.steps >= track.max_steps && self.state.is_running() {
            self.state = RaceState::StepLimitReached;
        }
        self.state
    }

    /// Resets the environment and lets `controller` drive until the run ends.
    ///
    /// Returns the accumulated fitness. For a fixed track and a deterministic
    /// controller the result is always the same.
    pub fn run<C>(&mut self, controller: &C) -> f32
    where
        C: Controller + ?Sized,
    {
        self.reset();
        while self.state.is_running() {
            let observation = self.observe();
            self.step(controller.act(&observation));
        }
        self.fitness
    }

    /// Like [`Self::run`], but also records the car state before the first step and
    /// after every step.
    pub fn run_traced<C>(&mut self, controller: &C) -> (RaceOutcome, Vec<CarState>)
    where
        C: Controller + ?Sized,
    {
        self.reset();
        let mut trace = vec![self.car];
        while self.state.is_running() {
            let observation = self.observe();
            self.step(controller.act(&observation));
            trace.push(self.car);
        }
        (self.outcome(), trace)
    }
}

fn initial_car(track: &TrackConfig) -> CarState {
    CarState {
        x: track.center(),
        y: 0.0,
        speed: track.initial_speed,
    }
}

#[cfg(test)]
mod tests {
    use neuroracer_network::CarNetwork;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn constant(action: Action) -> impl Fn(&Observation) -> Action {
        move |_| action
    }

    #[test]
    fn initial_observation() {
        let env = RaceEnvironment::default();
        let observation = env.observe();
        assert_eq!(observation.to_array(), [50.0, 50.0, 5.0, 0.0]);
        assert!(env.state().is_running());
    }

    #[test]
    fn idle_driver_finishes_with_bonus() {
        let mut env = RaceEnvironment::default();
        let fitness = env.run(&constant(Action::IDLE));

        assert_eq!(fitness, 1200.0);
        assert_eq!(env.state(), RaceState::Finished);
        assert_eq!(env.steps(), 200);
        assert_eq!(env.car().x, 50.0);
        assert_eq!(env.car().y, 1000.0);
        assert_eq!(env.car().speed, 5.0);
    }

    #[test]
    fn hard_right_crashes_on_step_26() {
        let mut env = RaceEnvironment::default();
        let fitness = env.run(&constant(Action::new(1.0, 0.0)));

        assert_eq!(env.state(), RaceState::Crashed);
        assert_eq!(env.steps(), 26);
        assert_eq!(fitness, 26.0);
        // not clamped back onto the track
        assert_eq!(env.car().x, 102.0);
    }

    #[test]
    fn hard_left_crashes_on_step_26() {
        let mut env = RaceEnvironment::default();
        let fitness = env.run(&constant(Action::new(-1.0, 0.0)));

        assert_eq!(env.state(), RaceState::Crashed);
        assert_eq!(fitness, 26.0);
        assert_eq!(env.car().x, -2.0);
    }

    #[test]
    fn crawling_driver_hits_step_limit() {
        let mut env = RaceEnvironment::default();
        let fitness = env.run(&constant(Action::new(0.0, -1.0)));

        assert_eq!(env.state(), RaceState::StepLimitReached);
        assert_eq!(env.steps(), 500);
        assert_eq!(fitness, 500.0);
        assert_eq!(env.car().speed, 1.0);
        assert!(env.car().y < 1000.0);
    }

    #[test]
    fn speed_is_clamped() {
        let mut env = RaceEnvironment::default();
        env.step(Action::new(0.0, 100.0));
        assert_eq!(env.car().speed, 10.0);
        env.step(Action::new(0.0, -100.0));
        assert_eq!(env.car().speed, 1.0);
        assert_eq!(env.car().y, 11.0);
    }

    #[test]
    fn crash_takes_precedence_over_finish() {
        let track = TrackConfig {
            track_length: 5.0,
            ..TrackConfig::default()
        };
        let mut env = RaceEnvironment::new(track);
        env.step(Action::new(30.0, 0.0));
        assert_eq!(env.state(), RaceState::Crashed);
        assert_eq!(env.fitness(), 1.0);
    }

    #[test]
    fn step_after_terminal_is_noop() {
        let mut env = RaceEnvironment::default();
        env.run(&constant(Action::new(1.0, 0.0)));
        let before = env.outcome();
        assert_eq!(env.step(Action::IDLE), RaceState::Crashed);
        assert_eq!(env.outcome(), before);
    }

    #[test]
    fn fitness_never_decreases_during_run() {
        let mut env = RaceEnvironment::default();
        let mut last = env.fitness();
        let mut i = 0_u16;
        while env.state().is_running() {
            let steering = if i % 2 == 0 { 0.9 } else { -0.9 };
            env.step(Action::new(steering, 0.3));
            assert!(env.fitness() >= last);
            last = env.fitness();
            i += 1;
        }
        assert_eq!(env.state(), RaceState::Finished);
    }

    #[test]
    fn reset_restores_initial_conditions() {
        let mut env = RaceEnvironment::default();
        env.run(&constant(Action::new(0.5, 1.0)));
        env.reset();
        assert_eq!(env.steps(), 0);
        assert_eq!(env.fitness(), 0.0);
        assert_eq!(env.state(), RaceState::Running);
        assert_eq!(env.observe(), RaceEnvironment::default().observe());
    }

    #[test]
    fn runs_are_deterministic_and_independent() {
        let mut rng = Pcg32::seed_from_u64(9);
        let a = CarNetwork::random(&mut rng);
        let b = CarNetwork::random(&mut rng);

        let mut env = RaceEnvironment::default();
        let first = env.run(&a);
        env.run(&b);
        let second = env.run(&a);
        assert_eq!(first, second);

        let mut fresh = RaceEnvironment::default();
        assert_eq!(fresh.run(&a), first);
    }

    #[test]
    fn trace_records_every_step() {
        let mut env = RaceEnvironment::default();
        let (outcome, trace) = env.run_traced(&constant(Action::new(1.0, 0.0)));
        assert_eq!(outcome.state, RaceState::Crashed);
        assert_eq!(trace.len(), outcome.steps + 1);
        assert_eq!(trace[0].x, 50.0);
        assert_eq!(trace.last(), Some(&outcome.car));
    }

    #[test]
    fn zero_step_limit_ends_immediately() {
        let track = TrackConfig {
            max_steps: 0,
            ..TrackConfig::default()
        };
        let mut env = RaceEnvironment::new(track);
        assert_eq!(env.run(&constant(Action::IDLE)), 0.0);
        assert_eq!(env.state(), RaceState::StepLimitReached);
    }

    #[test]
    fn outcome_serializes_state_by_name() {
        let mut env = RaceEnvironment::default();
        env.run(&constant(Action::IDLE));
        let json = serde_json::to_value(env.outcome()).unwrap();
        assert_eq!(json["state"], "Finished");
        assert_eq!(json["steps"], 200);
    }
}
