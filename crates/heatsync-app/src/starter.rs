//! Starter console runtime.
//!
//! Same shape as [`crate::LaneRuntime`]. The readiness poll belongs to one
//! watch at a time: when the session asks to watch another race, the old
//! interval is dropped and a new one starts ticking at once, and replies
//! still in flight for the old watch are filtered out by generation.

use std::{collections::BTreeMap, sync::Arc};

use heatsync_core::{
    SessionError, StarterAction, StarterConfig, StarterSession, Store, StoreError, TriggerEvent,
};
use heatsync_proto::{LaneNumber, LaneReadiness, RacePointer, RosterOverview};
use tokio::{
    sync::{broadcast, mpsc},
    time::{self, Interval, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    driver::{Driver, DriverError, StarterInput},
    trigger::next_trigger,
    writes::{Write, WriteQueue},
};

/// Alert for a starter action with no race selected.
pub const ALERT_NO_RACE: &str = "No race selected.";

#[derive(Debug)]
enum Completion {
    Roster(Result<RosterOverview, StoreError>),
    Statuses { generation: u64, outcome: Result<BTreeMap<LaneNumber, LaneReadiness>, StoreError> },
    StartLogged { pointer: RacePointer, outcome: Result<(), StoreError> },
}

enum Event {
    Watch,
    Trigger(TriggerEvent),
    Input(Option<StarterInput>),
    Done(Completion),
}

/// Active readiness poll.
struct Watch {
    pointer: RacePointer,
    generation: u64,
    interval: Interval,
    in_flight: bool,
}

/// Runs a [`StarterSession`] against a store and a frontend.
pub struct StarterRuntime<S: Store, D: Driver<Input = StarterInput>> {
    session: StarterSession,
    store: Arc<S>,
    driver: D,
    config: StarterConfig,
    triggers: Option<broadcast::Receiver<TriggerEvent>>,
    watch: Option<Watch>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S, D> StarterRuntime<S, D>
where
    S: Store,
    D: Driver<Input = StarterInput>,
{
    /// Runtime with a fresh session sized by `config.max_lanes`.
    pub fn new(store: Arc<S>, driver: D, config: StarterConfig) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            session: StarterSession::new(config.max_lanes),
            store,
            driver,
            config,
            triggers: None,
            watch: None,
            done_tx,
            done_rx,
        }
    }

    /// Subscribe to a trigger link.
    #[must_use]
    pub fn with_triggers(mut self, triggers: broadcast::Receiver<TriggerEvent>) -> Self {
        self.triggers = Some(triggers);
        self
    }

    /// The session.
    pub fn session(&self) -> &StarterSession {
        &self.session
    }

    /// The frontend.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Race whose readiness is being polled.
    pub fn watching(&self) -> Option<&RacePointer> {
        self.watch.as_ref().map(|watch| &watch.pointer)
    }

    /// Load the roster, then run until the official quits or input is
    /// exhausted.
    pub async fn run(&mut self) -> Result<(), DriverError> {
        let writes = WriteQueue::spawn(Arc::clone(&self.store));

        info!(lanes = self.config.max_lanes, "starter console running");
        let store = Arc::clone(&self.store);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let _ = done.send(Completion::Roster(store.overview().await));
        });
        self.render()?;

        loop {
            let event = tokio::select! {
                () = next_watch_tick(&mut self.watch) => Event::Watch,
                trigger = next_trigger(&mut self.triggers) => Event::Trigger(trigger),
                input = self.driver.next_input() => Event::Input(input?),
                Some(done) = self.done_rx.recv() => Event::Done(done),
            };

            match event {
                Event::Watch => self.poll_statuses(),
                Event::Trigger(TriggerEvent::Link(state)) => self.session.set_link_state(state),
                Event::Trigger(TriggerEvent::Command(msg)) => {
                    let actions = self.session.handle_trigger(&msg);
                    self.execute(actions, &writes)?;
                },
                Event::Input(None | Some(StarterInput::Quit)) => {
                    info!("starter console closed");
                    return Ok(());
                },
                Event::Input(Some(input)) => self.handle_input(input, &writes)?,
                Event::Done(done) => self.handle_completion(done, &writes)?,
            }
            self.render()?;
        }
    }

    fn poll_statuses(&mut self) {
        let Some(watch) = self.watch.as_mut() else {
            return;
        };
        if watch.in_flight {
            return;
        }
        watch.in_flight = true;
        let store = Arc::clone(&self.store);
        let done = self.done_tx.clone();
        let pointer = watch.pointer.clone();
        let generation = watch.generation;
        tokio::spawn(async move {
            let outcome = store.lane_statuses(&pointer).await;
            let _ = done.send(Completion::Statuses { generation, outcome });
        });
    }

    fn handle_input(&mut self, input: StarterInput, writes: &WriteQueue) -> Result<(), DriverError> {
        let actions = match input {
            StarterInput::PrevEvent => Ok(self.session.prev_event()),
            StarterInput::NextEvent => Ok(self.session.next_event()),
            StarterInput::PrevHeat => Ok(self.session.prev_heat()),
            StarterInput::NextHeat => Ok(self.session.next_heat()),
            StarterInput::Assign => self.session.assign(),
            StarterInput::StartRace => self.session.start_race(),
            StarterInput::TestCue => Ok(self.session.test_cue()),
            StarterInput::Quit => Ok(Vec::new()),
        };
        match actions {
            Ok(actions) => self.execute(actions, writes),
            Err(SessionError::NoRaceSelected) => self.driver.alert(ALERT_NO_RACE),
            Err(e) => self.driver.alert(&e.to_string()),
        }
    }

    fn handle_completion(
        &mut self,
        done: Completion,
        writes: &WriteQueue,
    ) -> Result<(), DriverError> {
        match done {
            Completion::Roster(outcome) => {
                let actions = self.session.handle_roster(outcome);
                self.execute(actions, writes)?;
            },
            Completion::Statuses { generation, outcome } => {
                if let Some(watch) = self.watch.as_mut().filter(|w| w.generation == generation) {
                    watch.in_flight = false;
                }
                self.session.handle_statuses(generation, outcome);
            },
            Completion::StartLogged { pointer, outcome } => {
                self.session.handle_start_logged(&pointer, outcome);
            },
        }
        Ok(())
    }

    fn execute(
        &mut self,
        actions: Vec<StarterAction>,
        writes: &WriteQueue,
    ) -> Result<(), DriverError> {
        for action in actions {
            match action {
                StarterAction::PublishPointer(pointer) => writes.push(Write::Pointer(pointer)),
                StarterAction::WatchReadiness { pointer, generation } => {
                    debug!(race = %pointer, generation, "watching lane readiness");
                    let mut interval = time::interval(self.config.poll_interval);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.watch = Some(Watch { pointer, generation, interval, in_flight: false });
                },
                StarterAction::StopWatching => {
                    debug!("no race selected, readiness poll stopped");
                    self.watch = None;
                },
                StarterAction::LogStart(pointer) => {
                    let store = Arc::clone(&self.store);
                    let done = self.done_tx.clone();
                    tokio::spawn(async move {
                        let outcome = store.set_start(&pointer).await;
                        let _ = done.send(Completion::StartLogged { pointer, outcome });
                    });
                },
                StarterAction::PlayStartCue => self.driver.play_start_cue()?,
                StarterAction::Alert(message) => self.driver.alert(&message)?,
            }
        }
        Ok(())
    }

    fn render(&mut self) -> Result<(), DriverError> {
        let links = self.session.lane_links(&self.config.lane_page);
        self.driver.render_starter(&self.session.view(), &links)
    }
}

/// Next tick of the active watch, or never without one. Cancel safe.
async fn next_watch_tick(watch: &mut Option<Watch>) {
    match watch {
        Some(watch) => {
            watch.interval.tick().await;
        },
        None => std::future::pending().await,
    }
}
