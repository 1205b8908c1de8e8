//! Lane page runtime.
//!
//! One cooperative loop per lane page. Each turn waits for exactly one of:
//! a pointer poll tick, a display tick (only while the stopwatch runs), a
//! trigger event, an operator input, or a finished store call. The session
//! is only touched from inside the loop, so everything a single event
//! triggers is applied before the next event is looked at.

use std::{sync::Arc, time::Instant};

use heatsync_core::{
    Environment, LaneAction, LaneConfig, LaneSession, SessionError, Store, StoreError,
    TriggerEvent,
};
use heatsync_proto::{LaneAssignment, RacePointer};
use tokio::{
    sync::{broadcast, mpsc},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::{
    driver::{Driver, DriverError, LaneInput},
    trigger::next_trigger,
    writes::{Write, WriteQueue},
};

/// Alert for a submit with no swimmer loaded.
pub const ALERT_NOT_LOADED: &str = "Lane not loaded properly. Cannot submit.";

/// Completed store call, reported back into the loop.
#[derive(Debug)]
enum Completion {
    Pointer(Result<Option<RacePointer>, StoreError>),
    Assignment { pointer: RacePointer, outcome: Result<Option<LaneAssignment>, StoreError> },
    Submit(Result<(), StoreError>),
}

enum Event {
    Poll,
    Tick,
    Trigger(TriggerEvent),
    Input(Option<LaneInput>),
    Done(Completion),
}

/// Runs one [`LaneSession`] against a store and a frontend.
pub struct LaneRuntime<S: Store, D: Driver<Input = LaneInput>, E: Environment> {
    session: LaneSession,
    store: Arc<S>,
    driver: D,
    env: E,
    config: LaneConfig,
    triggers: Option<broadcast::Receiver<TriggerEvent>>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
    poll_in_flight: bool,
}

impl<S, D, E> LaneRuntime<S, D, E>
where
    S: Store,
    D: Driver<Input = LaneInput>,
    E: Environment,
{
    /// Runtime for `session`. Without [`Self::with_triggers`] the page only
    /// follows the store.
    pub fn new(session: LaneSession, store: Arc<S>, driver: D, env: E, config: LaneConfig) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            session,
            store,
            driver,
            env,
            config,
            triggers: None,
            done_tx,
            done_rx,
            poll_in_flight: false,
        }
    }

    /// Subscribe to a trigger link.
    #[must_use]
    pub fn with_triggers(mut self, triggers: broadcast::Receiver<TriggerEvent>) -> Self {
        self.triggers = Some(triggers);
        self
    }

    /// The session.
    pub fn session(&self) -> &LaneSession {
        &self.session
    }

    /// The frontend.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run until the operator quits or input is exhausted.
    pub async fn run(&mut self) -> Result<(), DriverError> {
        let writes = WriteQueue::spawn(Arc::clone(&self.store));

        let mut poll = time::interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick = time::interval(self.config.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(lane = %self.session.lane(), "lane page running");
        let actions = self.session.bootstrap();
        self.execute(actions, &writes)?;
        self.render()?;

        loop {
            let running = self.session.is_running();
            let event = tokio::select! {
                _ = poll.tick() => Event::Poll,
                _ = tick.tick(), if running => Event::Tick,
                trigger = next_trigger(&mut self.triggers) => Event::Trigger(trigger),
                input = self.driver.next_input() => Event::Input(input?),
                Some(done) = self.done_rx.recv() => Event::Done(done),
            };

            let now = self.env.now();
            match event {
                Event::Poll => self.poll_pointer(),
                Event::Tick => {},
                Event::Trigger(TriggerEvent::Link(state)) => self.session.set_link_state(state),
                Event::Trigger(TriggerEvent::Command(msg)) => {
                    let actions = self.session.handle_trigger(&msg, now);
                    self.execute(actions, &writes)?;
                },
                Event::Input(None | Some(LaneInput::Quit)) => {
                    info!(lane = %self.session.lane(), "lane page closed");
                    return Ok(());
                },
                Event::Input(Some(input)) => self.handle_input(input, now, &writes)?,
                Event::Done(done) => self.handle_completion(done, &writes)?,
            }
            self.render()?;
        }
    }

    fn poll_pointer(&mut self) {
        // A newer poll must never be answered before an older one.
        if self.poll_in_flight {
            return;
        }
        self.poll_in_flight = true;
        let store = Arc::clone(&self.store);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let outcome = store.current_pointer().await;
            let _ = done.send(Completion::Pointer(outcome));
        });
    }

    fn handle_input(
        &mut self,
        input: LaneInput,
        now: Instant,
        writes: &WriteQueue,
    ) -> Result<(), DriverError> {
        match input {
            LaneInput::Start => {
                self.session.start_timer(now);
            },
            LaneInput::Stop => self.session.stop_timer(now),
            LaneInput::Reset => {
                let actions = self.session.reset_timer();
                self.execute(actions, writes)?;
            },
            LaneInput::Submit { disqualified } => {
                let outcome = self.session.submit(now, disqualified);
                self.apply_submit(outcome, writes)?;
            },
            LaneInput::Confirm(accepted) => {
                let outcome = self.session.confirm_blank_submit(now, accepted);
                self.apply_submit(outcome, writes)?;
            },
            LaneInput::Quit => {},
        }
        Ok(())
    }

    fn apply_submit(
        &mut self,
        outcome: Result<Vec<LaneAction>, SessionError>,
        writes: &WriteQueue,
    ) -> Result<(), DriverError> {
        match outcome {
            Ok(actions) => self.execute(actions, writes),
            Err(SessionError::NoSwimmerLoaded) => self.driver.alert(ALERT_NOT_LOADED),
            Err(e) => {
                debug!(lane = %self.session.lane(), error = %e, "submit refused");
                self.driver.alert(&e.to_string())
            },
        }
    }

    fn handle_completion(
        &mut self,
        done: Completion,
        writes: &WriteQueue,
    ) -> Result<(), DriverError> {
        let actions = match done {
            Completion::Pointer(outcome) => {
                self.poll_in_flight = false;
                let fetched = outcome.unwrap_or_else(|e| {
                    debug!(lane = %self.session.lane(), error = %e, "pointer poll failed");
                    None
                });
                self.session.handle_pointer(fetched)
            },
            Completion::Assignment { pointer, outcome } => {
                self.session.handle_assignment(&pointer, outcome)
            },
            Completion::Submit(outcome) => self.session.handle_submit(outcome),
        };
        self.execute(actions, writes)
    }

    fn execute(&mut self, actions: Vec<LaneAction>, writes: &WriteQueue) -> Result<(), DriverError> {
        for action in actions {
            match action {
                LaneAction::PublishReadiness { pointer, lane, status } => {
                    writes.push(Write::Readiness { pointer, lane, status });
                },
                LaneAction::FetchAssignment { pointer, lane } => {
                    let store = Arc::clone(&self.store);
                    let done = self.done_tx.clone();
                    tokio::spawn(async move {
                        let outcome = store.lane(&pointer, lane).await;
                        let _ = done.send(Completion::Assignment { pointer, outcome });
                    });
                },
                LaneAction::SubmitResult(result) => {
                    let store = Arc::clone(&self.store);
                    let done = self.done_tx.clone();
                    tokio::spawn(async move {
                        let outcome = store.submit_result(&result).await;
                        let _ = done.send(Completion::Submit(outcome));
                    });
                },
                LaneAction::Alert(message) => self.driver.alert(&message)?,
                LaneAction::Confirm(prompt) => self.driver.confirm(&prompt)?,
            }
        }
        Ok(())
    }

    fn render(&mut self) -> Result<(), DriverError> {
        let view = self.session.view(self.env.now());
        self.driver.render_lane(&view)
    }
}
