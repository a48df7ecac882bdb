use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use neuroracer_training::{
    EvolutionError,
    genetic::{EvolutionEngine, PopulationSnapshot},
    runner::GenerationRunner,
    stats::GenerationStats,
};
use serde::{Deserialize, Serialize};

use crate::{SessionConfig, SessionEvent, StartError};

/// Lifecycle state of a [`SimulationSession`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum SessionState {
    #[default]
    #[display("idle")]
    Idle,
    #[display("running")]
    Running,
    #[display("paused")]
    Paused,
    /// Stop was requested; the worker exits at the next generation boundary.
    #[display("stopping")]
    Stopping,
}

/// Current generation plus the statistics of every completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub generation: usize,
    pub history: Vec<GenerationStats>,
}

/// Runs one evolution at a time on a background worker.
///
/// The session is the only owner of run state. Dropping it stops the current run and
/// waits for the worker to exit.
#[derive(Debug)]
pub struct SimulationSession {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
struct Shared {
    data: Mutex<SessionData>,
    wakeup: Condvar,
    listeners: Mutex<Vec<Sender<SessionEvent>>>,
}

#[derive(Debug, Default)]
struct SessionData {
    state: SessionState,
    generation: usize,
    history: Vec<GenerationStats>,
    population: Option<PopulationSnapshot>,
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationSession {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

impl SimulationSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            worker: Mutex::new(None),
        }
    }

    /// Registers a new listener.
    ///
    /// The receiver gets every event emitted after this call. Dropped receivers are
    /// removed on the next emission.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.shared.listeners).push(tx);
        rx
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.lock_data().state
    }

    /// Starts a new run with a fresh population.
    ///
    /// Fails with [`StartError::AlreadyRunning`] unless the session is idle. Statistics
    /// of the previous run are discarded.
    pub fn start(&self, config: SessionConfig) -> Result<(), StartError> {
        config
            .evolution
            .validate()
            .map_err(StartError::InvalidParams)?;
        config
            .track
            .validate()
            .map_err(StartError::InvalidTrack)?;

        let mut worker = lock(&self.worker);
        let engine = {
            let mut data = self.shared.lock_data();
            if !data.state.is_idle() {
                return Err(StartError::AlreadyRunning);
            }
            let engine = match config.seed {
                Some(seed) => EvolutionEngine::with_seed(config.evolution, seed),
                None => EvolutionEngine::new(config.evolution),
            };
            data.state = SessionState::Running;
            data.generation = engine.generation();
            data.history.clear();
            data.population = Some(engine.snapshot());
            engine
        };

        // the previous worker already reported its last event
        if let Some(previous) = worker.take() {
            let _ = previous.join();
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("neuroracer-evolution".to_owned())
            .spawn(move || shared.run(engine, &config));
        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.shared.lock_data().state = SessionState::Idle;
                Err(StartError::Spawn(err))
            }
        }
    }

    /// Requests the current run to stop at the next generation boundary.
    ///
    /// Returns `false` if there was nothing to stop.
    pub fn stop(&self) -> bool {
        let mut data = self.shared.lock_data();
        if !(data.state.is_running() || data.state.is_paused()) {
            return false;
        }
        data.state = SessionState::Stopping;
        self.shared.wakeup.notify_all();
        true
    }

    /// Holds the run at the next generation boundary until [`Self::resume`] is called.
    ///
    /// Returns `false` if no run is in progress.
    pub fn pause(&self) -> bool {
        let generation = {
            let mut data = self.shared.lock_data();
            if !data.state.is_running() {
                return false;
            }
            data.state = SessionState::Paused;
            data.generation
        };
        self.shared.emit(SessionEvent::Paused { generation });
        true
    }

    /// Continues a paused run. Returns `false` if the run was not paused.
    pub fn resume(&self) -> bool {
        let generation = {
            let mut data = self.shared.lock_data();
            if !data.state.is_paused() {
                return false;
            }
            data.state = SessionState::Running;
            self.shared.wakeup.notify_all();
            data.generation
        };
        self.shared.emit(SessionEvent::Resumed { generation });
        true
    }

    /// Returns the current generation and the statistics history of this run.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        let data = self.shared.lock_data();
        StatsSnapshot {
            generation: data.generation,
            history: data.history.clone(),
        }
    }

    /// Returns the population published at the last generation boundary.
    ///
    /// `None` until the first run has been started.
    #[must_use]
    pub fn population(&self) -> Option<PopulationSnapshot> {
        self.shared.lock_data().population.clone()
    }

    /// Blocks until the worker of the current run has exited.
    pub fn wait(&self) {
        let handle = lock(&self.worker).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn lock_data(&self) -> MutexGuard<'_, SessionData> {
        lock(&self.data)
    }

    fn emit(&self, event: SessionEvent) {
        lock(&self.listeners).retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Worker body. Always returns the session to `Idle` and emits a terminal event,
    /// even if the evolution loop panics.
    fn run(&self, engine: EvolutionEngine, config: &SessionConfig) {
        let end_event =
            panic::catch_unwind(AssertUnwindSafe(|| self.evolve_until_done(engine, config)))
                .unwrap_or_else(|payload| SessionEvent::Error {
                    error: panic_message(&*payload),
                });

        self.lock_data().state = SessionState::Idle;
        self.emit(end_event);
    }

    /// Loops over generations until stopped, finished or failed.
    fn evolve_until_done(
        &self,
        mut engine: EvolutionEngine,
        config: &SessionConfig,
    ) -> SessionEvent {
        self.emit(SessionEvent::Started {
            population_size: engine.population().len(),
        });

        let mut runner = GenerationRunner::new(config.track);
        loop {
            if let Some(event) = self.checkpoint(&engine, config.generations) {
                return event;
            }
            if let Err(err) = self.run_generation(&mut runner, &mut engine) {
                return SessionEvent::Error {
                    error: err.to_string(),
                };
            }
            if reached_limit(&engine, config.generations) {
                return SessionEvent::Finished {
                    generations: engine.generation(),
                };
            }
            self.sleep(config.generation_delay);
        }
    }

    /// Generation boundary: blocks while paused, then reports whether the run should end.
    fn checkpoint(
        &self,
        engine: &EvolutionEngine,
        generations: Option<usize>,
    ) -> Option<SessionEvent> {
        let data = self
            .wakeup
            .wait_while(self.lock_data(), |data| data.state.is_paused())
            .unwrap_or_else(PoisonError::into_inner);
        if data.state.is_stopping() {
            return Some(SessionEvent::Stopped {
                generation: engine.generation(),
            });
        }
        reached_limit(engine, generations).then(|| SessionEvent::Finished {
            generations: engine.generation(),
        })
    }

    fn run_generation(
        &self,
        runner: &mut GenerationRunner,
        engine: &mut EvolutionEngine,
    ) -> Result<(), EvolutionError> {
        let stats = runner.evaluate_generation(engine)?;
        self.lock_data().history.push(stats);
        self.emit(SessionEvent::GenerationComplete(stats));

        engine.evolve()?;
        let mut data = self.lock_data();
        data.generation = engine.generation();
        data.population = Some(engine.snapshot());
        Ok(())
    }

    /// Waits for `delay`, returning early if the run is paused or stopped meanwhile.
    fn sleep(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        let _ = self
            .wakeup
            .wait_timeout_while(self.lock_data(), delay, |data| data.state.is_running());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));
    match detail {
        Some(detail) => format!("evolution worker panicked: {detail}"),
        None => "evolution worker panicked".to_owned(),
    }
}

fn reached_limit(engine: &EvolutionEngine, generations: Option<usize>) -> bool {
    generations.is_some_and(|limit| engine.generation() >= limit)
}
