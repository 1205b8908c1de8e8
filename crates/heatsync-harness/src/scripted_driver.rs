//! Scripted frontend.
//!
//! [`ScriptedDriver`] plays the operator: inputs come from a [`Script`]
//! handle held by the test, and everything the runtime shows (views,
//! alerts, cues, confirmation prompts) is recorded for inspection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heatsync_app::{Driver, DriverError};
use heatsync_core::{LaneView, StarterView};
use heatsync_proto::LaneLink;
use tokio::sync::mpsc;

/// Everything the runtime has shown so far.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    /// Latest lane view.
    pub lane: Option<LaneView>,
    /// Latest starter view.
    pub starter: Option<StarterView>,
    /// Lane links rendered with the latest starter view.
    pub links: Vec<LaneLink>,
    /// Alerts, in order.
    pub alerts: Vec<String>,
    /// Start cues played.
    pub cues: usize,
    /// Confirmation prompts, in order. Answers are sent as inputs.
    pub prompts: Vec<String>,
    /// Number of renders.
    pub renders: usize,
}

fn lock(recording: &Mutex<Recording>) -> MutexGuard<'_, Recording> {
    recording.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frontend driven by a [`Script`].
#[derive(Debug)]
pub struct ScriptedDriver<I> {
    inputs: mpsc::UnboundedReceiver<I>,
    recording: Arc<Mutex<Recording>>,
}

/// Test-side handle of a [`ScriptedDriver`].
#[derive(Debug, Clone)]
pub struct Script<I> {
    inputs: mpsc::UnboundedSender<I>,
    recording: Arc<Mutex<Recording>>,
}

impl<I> ScriptedDriver<I> {
    /// A driver and the handle that scripts it.
    pub fn new() -> (Self, Script<I>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let recording = Arc::new(Mutex::new(Recording::default()));
        (
            Self { inputs: rx, recording: Arc::clone(&recording) },
            Script { inputs: tx, recording },
        )
    }

    /// Snapshot of what has been shown.
    pub fn recording(&self) -> Recording {
        lock(&self.recording).clone()
    }
}

impl<I> Script<I> {
    /// Queue one operator input. Ignored once the runtime has stopped.
    pub fn send(&self, input: I) {
        let _ = self.inputs.send(input);
    }

    /// Snapshot of what has been shown.
    pub fn recording(&self) -> Recording {
        lock(&self.recording).clone()
    }

    /// Latest lane view.
    pub fn lane_view(&self) -> Option<LaneView> {
        lock(&self.recording).lane.clone()
    }

    /// Latest starter view.
    pub fn starter_view(&self) -> Option<StarterView> {
        lock(&self.recording).starter.clone()
    }

    /// Alerts shown so far.
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.recording).alerts.clone()
    }
}

impl<I: Send> Driver for ScriptedDriver<I> {
    type Input = I;

    async fn next_input(&mut self) -> Result<Option<I>, DriverError> {
        Ok(self.inputs.recv().await)
    }

    fn render_lane(&mut self, view: &LaneView) -> Result<(), DriverError> {
        let mut recording = lock(&self.recording);
        recording.lane = Some(view.clone());
        recording.renders += 1;
        Ok(())
    }

    fn render_starter(
        &mut self,
        view: &StarterView,
        links: &[LaneLink],
    ) -> Result<(), DriverError> {
        let mut recording = lock(&self.recording);
        recording.starter = Some(view.clone());
        recording.links = links.to_vec();
        recording.renders += 1;
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), DriverError> {
        lock(&self.recording).alerts.push(message.to_string());
        Ok(())
    }

    fn confirm(&mut self, prompt: &str) -> Result<(), DriverError> {
        lock(&self.recording).prompts.push(prompt.to_string());
        Ok(())
    }

    fn play_start_cue(&mut self) -> Result<(), DriverError> {
        lock(&self.recording).cues += 1;
        Ok(())
    }
}
