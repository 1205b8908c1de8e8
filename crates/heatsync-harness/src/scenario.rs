//! Scenario helpers: spawn lane pages and a starter console against one
//! [`MemoryStore`], all driven by scripts.
//!
//! Meant for `#[tokio::test(start_paused = true)]`: every runtime uses the
//! tokio clock, so `tokio::time::sleep` in the test advances all of them
//! together and poll convergence can be asserted in virtual seconds.

use std::sync::Arc;

use heatsync_app::{DriverError, LaneInput, LaneRuntime, StarterInput, StarterRuntime};
use heatsync_core::{LaneConfig, LaneSession, StarterConfig, SystemEnv, TriggerEvent};
use heatsync_proto::{LaneNumber, RacePointer, TriggerMessage};
use tokio::{
    sync::broadcast,
    task::{JoinError, JoinHandle},
};

use crate::{
    memory_store::MemoryStore,
    scripted_driver::{Script, ScriptedDriver},
};

/// Lane runtime as used in scenarios.
pub type SimLaneRuntime = LaneRuntime<MemoryStore, ScriptedDriver<LaneInput>, SystemEnv>;

/// Starter runtime as used in scenarios.
pub type SimStarterRuntime = StarterRuntime<MemoryStore, ScriptedDriver<StarterInput>>;

/// Stand-in for the trigger device: every subscriber sees what is sent.
#[derive(Debug, Clone)]
pub struct SimTrigger {
    events: broadcast::Sender<TriggerEvent>,
}

impl Default for SimTrigger {
    fn default() -> Self {
        let (events, _) = broadcast::channel(64);
        Self { events }
    }
}

impl SimTrigger {
    /// New device with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// New subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<TriggerEvent> {
        self.events.subscribe()
    }

    /// Send a raw frame as the device would. Malformed frames are dropped,
    /// as the socket supervisor drops them.
    pub fn send_raw(&self, raw: &str) {
        if let Ok(msg) = TriggerMessage::parse(raw) {
            self.send(TriggerEvent::Command(msg));
        }
    }

    /// Send one event.
    pub fn send(&self, event: TriggerEvent) {
        let _ = self.events.send(event);
    }
}

/// A running lane page.
pub struct LanePage {
    /// Operator script and recording.
    pub script: Script<LaneInput>,
    task: JoinHandle<(SimLaneRuntime, Result<(), DriverError>)>,
}

impl LanePage {
    /// Spawn a page for `lane`, optionally opened on `initial`.
    pub fn spawn(
        store: &MemoryStore,
        lane: LaneNumber,
        initial: Option<RacePointer>,
        trigger: Option<&SimTrigger>,
    ) -> Self {
        let (driver, script) = ScriptedDriver::new();
        let mut runtime = LaneRuntime::new(
            LaneSession::new(lane, initial),
            Arc::new(store.clone()),
            driver,
            SystemEnv,
            LaneConfig::default(),
        );
        if let Some(trigger) = trigger {
            runtime = runtime.with_triggers(trigger.subscribe());
        }
        let task = tokio::spawn(async move {
            let outcome = runtime.run().await;
            (runtime, outcome)
        });
        Self { script, task }
    }

    /// Quit the page and hand back its runtime.
    pub async fn quit(self) -> Result<SimLaneRuntime, JoinError> {
        self.script.send(LaneInput::Quit);
        let (runtime, _) = self.task.await?;
        Ok(runtime)
    }
}

/// A running starter console.
pub struct StarterConsole {
    /// Official's script and recording.
    pub script: Script<StarterInput>,
    task: JoinHandle<(SimStarterRuntime, Result<(), DriverError>)>,
}

impl StarterConsole {
    /// Spawn the console with the default lane pool.
    pub fn spawn(store: &MemoryStore, trigger: Option<&SimTrigger>) -> Self {
        let (driver, script) = ScriptedDriver::new();
        let mut runtime =
            StarterRuntime::new(Arc::new(store.clone()), driver, StarterConfig::default());
        if let Some(trigger) = trigger {
            runtime = runtime.with_triggers(trigger.subscribe());
        }
        let task = tokio::spawn(async move {
            let outcome = runtime.run().await;
            (runtime, outcome)
        });
        Self { script, task }
    }

    /// Quit the console and hand back its runtime.
    pub async fn quit(self) -> Result<SimStarterRuntime, JoinError> {
        self.script.send(StarterInput::Quit);
        let (runtime, _) = self.task.await?;
        Ok(runtime)
    }
}
