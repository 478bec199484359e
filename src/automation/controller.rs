//! Automation controller: lifecycle state machine and the background
//! detect→select→act loop.
//!
//! One tokio task runs the loop for the controller's entire Running/Paused
//! lifetime; all game-state and pick bookkeeping mutation happens inside it.
//! Lifecycle and configuration changes arrive as cooperative polled signals
//! (a watch cancellation token, an atomic pause flag, and an mpsc command
//! channel drained at the top of each tick), so they take effect on the next
//! tick, never mid-tick.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};

use crate::automation::actuator::Actuator;
use crate::automation::types::{PickerCommand, PickerEvent, PickerState, Statistics};
use crate::core::game_state::GamePhase;
use crate::core::strategy::{StrategyKind, StrategyManager};
use crate::error::PickerResult;
use crate::recognition::recognizer::CardRecognizer;
use crate::settings::AutomationSettings;

/// Bound on how long `stop` waits for the loop to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Re-check interval while paused.
const PAUSE_POLL: Duration = Duration::from_millis(100);

/// Floor for the detect interval and the pick cooldown.
const MIN_TIMER: Duration = Duration::from_millis(100);

const CHANNEL_CAPACITY: usize = 32;

/// Counters the loop publishes for lock-free statistics snapshots.
#[derive(Default)]
struct SharedCounters {
    total_picks: AtomicU64,
    session_picks: AtomicU64,
    recognized: AtomicUsize,
    phase: AtomicU8,
}

/// Everything the loop owns: recognition, selection, actuation, timers.
struct Worker {
    recognizer: CardRecognizer,
    strategies: StrategyManager,
    actuator: Box<dyn Actuator>,
    detect_interval: Duration,
    pick_cooldown: Duration,
    offset_range: i32,
    last_pick: Option<Instant>,
    counters: Arc<SharedCounters>,
    events: mpsc::Sender<PickerEvent>,
}

impl Worker {
    fn apply(&mut self, command: PickerCommand) {
        match command {
            PickerCommand::SetStrategy(kind) => self.strategies.set_active(kind),
            PickerCommand::SetPriorityList(list) => self.strategies.set_priority_list(list),
            PickerCommand::SetCostWeights(weights) => self.strategies.set_cost_weights(weights),
            PickerCommand::SetTargetComp(target) => self.strategies.set_target_comp(target),
            PickerCommand::SetDetectInterval(interval) => {
                self.detect_interval = interval.max(MIN_TIMER);
                info!("detect interval set to {:?}", self.detect_interval);
            }
            PickerCommand::SetPickCooldown(cooldown) => {
                self.pick_cooldown = cooldown.max(MIN_TIMER);
                info!("pick cooldown set to {:?}", self.pick_cooldown);
            }
            PickerCommand::SetSeason(season) => self.recognizer.set_season(&season),
            PickerCommand::ResetSession => {
                self.counters.session_picks.store(0, Ordering::Relaxed);
                self.last_pick = None;
            }
        }
    }

    /// One tick's work, with the catch-all boundary: a failing cycle is
    /// logged and emitted, never allowed to end the loop.
    fn tick(&mut self) {
        if let Err(err) = self.run_cycle() {
            warn!("detection cycle failed: {err}");
            let _ = self.events.try_send(PickerEvent::Error(err.to_string()));
        }
    }

    fn run_cycle(&mut self) -> PickerResult<()> {
        let cards = self.recognizer.refresh_and_recognize()?;

        let state = self.recognizer.state();
        self.counters.phase.store(state.phase as u8, Ordering::Relaxed);
        self.counters.recognized.store(cards.len(), Ordering::Relaxed);
        let _ = self.events.try_send(PickerEvent::CardsRecognized(cards.clone()));

        if cards.is_empty() {
            return Ok(());
        }
        let Some(choice) = self.strategies.select(&cards, self.recognizer.state()) else {
            return Ok(());
        };
        let choice = choice.clone();

        if !self.cooldown_elapsed() {
            debug!("pick of {} deferred by cooldown", choice.name);
            return Ok(());
        }
        let Some((x, y)) = self.recognizer.card_position(&choice) else {
            warn!("no usable position for {}", choice.name);
            return Ok(());
        };

        if self.actuator.pick(x as i32, y as i32, self.offset_range) {
            self.recognizer.state_mut().mark_selected(&choice.name);
            self.counters.total_picks.fetch_add(1, Ordering::Relaxed);
            self.counters.session_picks.fetch_add(1, Ordering::Relaxed);
            self.last_pick = Some(Instant::now());
            info!("picked {} from slot {:?}", choice.name, choice.shop_index);
            let _ = self.events.try_send(PickerEvent::CardPicked(choice));
        } else {
            // Rejected actuation: not counted, cooldown not advanced.
            warn!("pick rejected for {}", choice.name);
        }
        Ok(())
    }

    fn cooldown_elapsed(&self) -> bool {
        match self.last_pick {
            Some(at) => at.elapsed() >= self.pick_cooldown,
            None => true,
        }
    }
}

/// Sleep that ends early when the cancellation token fires. Returns whether
/// cancellation was observed.
async fn idle(cancel: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *cancel.borrow_and_update() {
        return true;
    }
    tokio::select! {
        _ = sleep(duration) => false,
        _ = cancel.changed() => true,
    }
}

async fn run_loop(
    mut worker: Worker,
    mut commands: mpsc::Receiver<PickerCommand>,
    mut cancel: watch::Receiver<bool>,
    paused: Arc<AtomicBool>,
) -> Worker {
    debug!("pick loop started");
    loop {
        if *cancel.borrow_and_update() {
            break;
        }
        while let Ok(command) = commands.try_recv() {
            worker.apply(command);
        }
        if paused.load(Ordering::Relaxed) {
            if idle(&mut cancel, PAUSE_POLL).await {
                break;
            }
            continue;
        }

        worker.tick();

        if idle(&mut cancel, worker.detect_interval).await {
            break;
        }
    }
    debug!("pick loop stopped");
    worker
}

/// Lifecycle state machine around the background pick loop.
///
/// `start`/`stop`/`pause`/`resume` report misuse as a `false` return, never
/// an error. Configuration setters apply immediately while stopped and are
/// delivered as polled commands while running.
pub struct AutoPicker {
    state: PickerState,
    worker: Option<Worker>,
    handle: Option<JoinHandle<Worker>>,
    commands: Option<mpsc::Sender<PickerCommand>>,
    cancel: Option<watch::Sender<bool>>,
    paused: Arc<AtomicBool>,
    counters: Arc<SharedCounters>,
    events: mpsc::Sender<PickerEvent>,
    active_strategy: StrategyKind,
}

impl AutoPicker {
    /// Build a controller around a recognizer and an actuator. The returned
    /// receiver yields the loop's observable events.
    pub fn new(
        recognizer: CardRecognizer,
        actuator: Box<dyn Actuator>,
        settings: &AutomationSettings,
    ) -> (Self, mpsc::Receiver<PickerEvent>) {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let counters = Arc::new(SharedCounters::default());
        let worker = Worker {
            recognizer,
            strategies: StrategyManager::new(settings.strategy),
            actuator,
            detect_interval: settings.detect_interval().max(MIN_TIMER),
            pick_cooldown: settings.pick_cooldown().max(MIN_TIMER),
            offset_range: settings.offset_range,
            last_pick: None,
            counters: Arc::clone(&counters),
            events: event_tx.clone(),
        };
        let picker = Self {
            state: PickerState::Stopped,
            worker: Some(worker),
            handle: None,
            commands: None,
            cancel: None,
            paused: Arc::new(AtomicBool::new(false)),
            counters,
            events: event_tx,
            active_strategy: settings.strategy,
        };
        (picker, event_rx)
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    /// Spawn the pick loop. Fails if the controller is not Stopped.
    pub fn start(&mut self) -> bool {
        if self.state != PickerState::Stopped {
            warn!("auto picker already running");
            return false;
        }
        let Some(worker) = self.worker.take() else {
            error!("auto picker worker unavailable, cannot start");
            return false;
        };

        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.paused.store(false, Ordering::Relaxed);
        self.handle = Some(tokio::spawn(run_loop(
            worker,
            cmd_rx,
            cancel_rx,
            Arc::clone(&self.paused),
        )));
        self.commands = Some(cmd_tx);
        self.cancel = Some(cancel_tx);
        self.set_state(PickerState::Running);
        info!("auto picker started");
        true
    }

    /// Cancel the loop and wait (bounded) for it to exit, recovering the
    /// worker so the controller can be started again. Fails if already
    /// Stopped.
    pub async fn stop(&mut self) -> bool {
        if self.state == PickerState::Stopped {
            warn!("auto picker already stopped");
            return false;
        }
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(true);
        }
        self.commands = None;

        if let Some(mut handle) = self.handle.take() {
            match timeout(STOP_TIMEOUT, &mut handle).await {
                Ok(Ok(worker)) => self.worker = Some(worker),
                Ok(Err(err)) => error!("pick loop task failed: {err}"),
                Err(_) => {
                    // The loop missed the cancellation deadline; abort so no
                    // background task outlives the controller.
                    error!("pick loop did not exit within {STOP_TIMEOUT:?}, aborting");
                    handle.abort();
                }
            }
        }
        self.paused.store(false, Ordering::Relaxed);
        self.set_state(PickerState::Stopped);
        info!("auto picker stopped");
        true
    }

    /// Pause the loop. Fails unless Running.
    pub fn pause(&mut self) -> bool {
        if self.state != PickerState::Running {
            return false;
        }
        self.paused.store(true, Ordering::Relaxed);
        self.set_state(PickerState::Paused);
        info!("auto picker paused");
        true
    }

    /// Resume a paused loop. Fails unless Paused.
    pub fn resume(&mut self) -> bool {
        if self.state != PickerState::Paused {
            return false;
        }
        self.paused.store(false, Ordering::Relaxed);
        self.set_state(PickerState::Running);
        info!("auto picker resumed");
        true
    }

    pub fn set_strategy(&mut self, kind: StrategyKind) {
        self.active_strategy = kind;
        self.dispatch(PickerCommand::SetStrategy(kind));
    }

    pub fn set_priority_list(&mut self, list: Vec<String>) {
        self.dispatch(PickerCommand::SetPriorityList(list));
    }

    pub fn set_cost_weights(&mut self, weights: HashMap<u8, f32>) {
        self.dispatch(PickerCommand::SetCostWeights(weights));
    }

    pub fn set_target_comp(&mut self, target: Vec<String>) {
        self.dispatch(PickerCommand::SetTargetComp(target));
    }

    pub fn set_detect_interval(&mut self, interval: Duration) {
        self.dispatch(PickerCommand::SetDetectInterval(interval));
    }

    pub fn set_pick_cooldown(&mut self, cooldown: Duration) {
        self.dispatch(PickerCommand::SetPickCooldown(cooldown));
    }

    pub fn set_season(&mut self, season: String) {
        self.dispatch(PickerCommand::SetSeason(season));
    }

    /// Zero the session pick counter and the cooldown timer.
    pub fn reset_statistics(&mut self) {
        self.counters.session_picks.store(0, Ordering::Relaxed);
        self.dispatch(PickerCommand::ResetSession);
    }

    fn dispatch(&mut self, command: PickerCommand) {
        if let Some(worker) = self.worker.as_mut() {
            worker.apply(command);
            return;
        }
        if let Some(commands) = &self.commands
            && let Err(err) = commands.try_send(command)
        {
            warn!("configuration command dropped: {err}");
        }
    }

    /// Point-in-time statistics snapshot; never blocks the loop.
    pub fn statistics(&self) -> Statistics {
        let (phase, recognized) = match &self.worker {
            Some(worker) => (
                worker.recognizer.state().phase,
                worker.recognizer.state().cards.len(),
            ),
            None => (
                GamePhase::from_u8(self.counters.phase.load(Ordering::Relaxed)),
                self.counters.recognized.load(Ordering::Relaxed),
            ),
        };
        Statistics {
            total_picks: self.counters.total_picks.load(Ordering::Relaxed),
            session_picks: self.counters.session_picks.load(Ordering::Relaxed),
            state: self.state,
            strategy: self.active_strategy.id(),
            phase,
            recognized_cards: recognized,
        }
    }

    fn set_state(&mut self, state: PickerState) {
        self.state = state;
        let _ = self.events.try_send(PickerEvent::StateChanged(state));
    }
}
