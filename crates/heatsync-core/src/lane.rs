//! Lane client session.
//!
//! Tracks the shared race pointer for one lane, owns the lane's stopwatch,
//! and reports the lane's readiness back to the store.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods accept time as a parameter (no stored clock)
//! - Methods return `Vec<LaneAction>` describing store calls and alerts
//! - The runtime executes the actions and feeds the replies back in
//!
//! # Race lifecycle
//!
//! ```text
//!  pointer changes          assignment loaded
//! ┌───────────────┐  ──>  ┌──────────────┐  ──>  ┌─────────────┐
//! │ publish       │       │ fetch lane   │       │ publish     │
//! │ not-ready     │       │ assignment   │       │ ready       │
//! └───────────────┘       └──────────────┘       └─────────────┘
//!                                │ no entry: show NO ENTRY, stay not-ready
//!                                │ transport failure: alert the operator
//! ```
//!
//! A pointer change is handled entirely inside [`LaneSession::handle_pointer`]:
//! the timer is cleared, the old swimmer is dropped and both store calls are
//! requested before the runtime regains control. Replies are matched against
//! the pointer they were requested for, so an assignment that arrives after
//! the starter has moved on is discarded instead of overwriting the new race.

use std::time::Instant;

use heatsync_proto::{
    LaneAssignment, LaneNumber, LaneReadiness, RacePointer, RaceResult, StartScope,
    TriggerCommand, TriggerMessage, ZERO_ELAPSED,
};
use tracing::{debug, info, warn};

use crate::{
    error::{SessionError, StoreError},
    timer::LaneTimer,
    trigger::LinkState,
};

/// Alert shown when the lane assignment cannot be fetched.
pub const ALERT_ASSIGNMENT_UNREACHABLE: &str = "Error contacting timing server. Check network.";

/// Question asked before submitting a stopwatch that never ran.
pub const PROMPT_BLANK_SUBMIT: &str = "Timer shows 00:00.00. Submit anyway?";

/// Alert for a blank-time confirmation that outlived its race.
pub const ALERT_CONFIRM_STALE: &str = "Timer changed while confirming. Submit again.";

/// Actions returned by the lane session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneAction {
    /// Write this lane's readiness for `pointer`. Best effort.
    PublishReadiness {
        /// Race the readiness applies to.
        pointer: RacePointer,
        /// Reporting lane.
        lane: LaneNumber,
        /// `Ready` or `NotReady`.
        status: LaneReadiness,
    },

    /// Fetch the swimmer for `lane` in `pointer`'s heat and hand the reply
    /// to [`LaneSession::handle_assignment`].
    FetchAssignment {
        /// Race to look up.
        pointer: RacePointer,
        /// Lane to look up.
        lane: LaneNumber,
    },

    /// Send the result and hand the outcome to
    /// [`LaneSession::handle_submit`].
    SubmitResult(RaceResult),

    /// Blocking notice for the operator.
    Alert(String),

    /// Ask the operator a yes/no question. The answer comes back through
    /// [`LaneSession::confirm_blank_submit`]; nothing waits on it.
    Confirm(String),
}

/// Race status shown on the lane page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaceStatus {
    /// Timer cleared for a new race.
    #[default]
    NotReady,
    /// Timer counting.
    Running,
    /// Timer stopped or result saved.
    Finished,
}

impl RaceStatus {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotReady => "Not ready",
            Self::Running => "Running",
            Self::Finished => "Finished",
        }
    }
}

/// Progress of the assignment fetch for the current pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// No race known yet.
    #[default]
    NoRace,
    /// Fetch requested.
    Loading,
    /// Swimmer loaded.
    Loaded,
    /// Heat has no swimmer in this lane.
    NoEntry,
    /// Fetch failed; the operator was alerted.
    Failed,
}

/// Snapshot of everything the lane page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneView {
    /// This lane.
    pub lane: LaneNumber,
    /// Race the lane is following.
    pub pointer: Option<RacePointer>,
    /// Loaded swimmer.
    pub assignment: Option<LaneAssignment>,
    /// Assignment fetch progress.
    pub load: LoadStatus,
    /// Race status.
    pub race_status: RaceStatus,
    /// Last readiness this lane reported.
    pub readiness: LaneReadiness,
    /// Formatted stopwatch.
    pub timer: String,
    /// Trigger device link.
    pub link: LinkState,
    /// A submit is awaiting the store's answer.
    pub submitting: bool,
}

impl LaneView {
    /// Line describing what the lane has loaded.
    pub fn load_line(&self) -> String {
        let Some(pointer) = &self.pointer else {
            return format!("Lane {} • waiting for race", self.lane);
        };
        match self.load {
            LoadStatus::NoRace | LoadStatus::Loading => {
                format!("Loading Event {}, Heat {} • Lane {}", pointer.event, pointer.heat, self.lane)
            },
            LoadStatus::Loaded => {
                format!("Loaded Event {}, Heat {} • Lane {}", pointer.event, pointer.heat, self.lane)
            },
            LoadStatus::NoEntry => format!(
                "Event {}, Heat {} • Lane {} (NO ENTRY)",
                pointer.event, pointer.heat, self.lane
            ),
            LoadStatus::Failed => format!(
                "Event {}, Heat {} • Lane {} (NOT LOADED)",
                pointer.event, pointer.heat, self.lane
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingSubmit {
    captured_at: Instant,
    race: u64,
}

#[derive(Debug, Clone, Copy)]
struct BlankSubmit {
    disqualified: bool,
    race: u64,
}

/// Lane client session.
///
/// One per lane page. Pure state machine: no I/O, no stored clock.
#[derive(Debug, Clone)]
pub struct LaneSession {
    lane: LaneNumber,
    pointer: Option<RacePointer>,
    assignment: Option<LaneAssignment>,
    load: LoadStatus,
    timer: LaneTimer,
    race_status: RaceStatus,
    readiness: LaneReadiness,
    link: LinkState,
    /// Bumped on every timer reset; ties a submit to the race it timed.
    race: u64,
    pending_submit: Option<PendingSubmit>,
    blank_submit: Option<BlankSubmit>,
}

impl LaneSession {
    /// New session for `lane`, optionally pre-pointed at a race from the
    /// page parameters.
    pub fn new(lane: LaneNumber, initial: Option<RacePointer>) -> Self {
        Self {
            lane,
            pointer: initial,
            assignment: None,
            load: LoadStatus::NoRace,
            timer: LaneTimer::Idle,
            race_status: RaceStatus::NotReady,
            readiness: LaneReadiness::Waiting,
            link: LinkState::Disconnected,
            race: 0,
            pending_submit: None,
            blank_submit: None,
        }
    }

    /// Actions to run once at load, before the first poll.
    ///
    /// A page opened with a complete race fetches its swimmer immediately
    /// instead of waiting for the first poll cycle.
    pub fn bootstrap(&mut self) -> Vec<LaneAction> {
        let Some(pointer) = self.pointer.clone() else {
            return Vec::new();
        };
        self.load = LoadStatus::Loading;
        vec![LaneAction::FetchAssignment { pointer, lane: self.lane }]
    }

    /// This lane.
    pub fn lane(&self) -> LaneNumber {
        self.lane
    }

    /// Race the lane is following.
    pub fn pointer(&self) -> Option<&RacePointer> {
        self.pointer.as_ref()
    }

    /// Loaded swimmer.
    pub fn assignment(&self) -> Option<&LaneAssignment> {
        self.assignment.as_ref()
    }

    /// Last readiness this lane reported.
    pub fn readiness(&self) -> LaneReadiness {
        self.readiness
    }

    /// Stopwatch.
    pub fn timer(&self) -> &LaneTimer {
        &self.timer
    }

    /// Whether the stopwatch is counting.
    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Apply one pointer poll.
    ///
    /// `None` stands for a failed or incomplete poll and leaves every piece
    /// of state untouched. A pointer equal to the cached one is a no-op. A
    /// different pointer starts a new race.
    pub fn handle_pointer(&mut self, fetched: Option<RacePointer>) -> Vec<LaneAction> {
        let Some(fetched) = fetched else {
            return Vec::new();
        };
        if self.pointer.as_ref() == Some(&fetched) {
            return Vec::new();
        }

        info!(
            lane = %self.lane,
            event = %fetched.event,
            heat = %fetched.heat,
            "following new race"
        );
        self.pointer = Some(fetched.clone());
        self.assignment = None;
        self.load = LoadStatus::Loading;

        let mut actions = self.reset_timer();
        actions.push(LaneAction::FetchAssignment { pointer: fetched, lane: self.lane });
        actions
    }

    /// Apply the reply to a [`LaneAction::FetchAssignment`].
    pub fn handle_assignment(
        &mut self,
        requested: &RacePointer,
        outcome: Result<Option<LaneAssignment>, StoreError>,
    ) -> Vec<LaneAction> {
        let Some(pointer) = self.pointer.clone() else {
            return Vec::new();
        };
        if &pointer != requested {
            debug!(
                lane = %self.lane,
                stale = %requested,
                current = %pointer,
                "discarding assignment for previous race"
            );
            return Vec::new();
        }

        match outcome {
            Ok(Some(assignment)) => {
                info!(lane = %self.lane, swimmer = %assignment.swimmer_name, "lane loaded");
                self.assignment = Some(assignment);
                self.load = LoadStatus::Loaded;
                self.readiness = LaneReadiness::Ready;
                vec![LaneAction::PublishReadiness {
                    pointer,
                    lane: self.lane,
                    status: LaneReadiness::Ready,
                }]
            },
            Ok(None) => {
                info!(lane = %self.lane, race = %pointer, "no entry for lane");
                self.assignment = None;
                self.load = LoadStatus::NoEntry;
                Vec::new()
            },
            Err(e) => {
                warn!(lane = %self.lane, error = %e, "loading lane assignment failed");
                self.load = LoadStatus::Failed;
                vec![LaneAction::Alert(ALERT_ASSIGNMENT_UNREACHABLE.to_string())]
            },
        }
    }

    /// Start the stopwatch. Ignored while it is already running.
    pub fn start_timer(&mut self, now: Instant) -> bool {
        if !self.timer.start(now) {
            return false;
        }
        self.race_status = RaceStatus::Running;
        true
    }

    /// Stop the stopwatch, keeping the elapsed time on display.
    pub fn stop_timer(&mut self, now: Instant) {
        self.timer.stop(now);
        self.race_status = RaceStatus::Finished;
    }

    /// Clear the stopwatch and report the lane not ready.
    ///
    /// The readiness write goes to the race the lane is currently following.
    /// With no race known yet there is nothing to write.
    pub fn reset_timer(&mut self) -> Vec<LaneAction> {
        self.timer.reset();
        self.race_status = RaceStatus::NotReady;
        self.readiness = LaneReadiness::NotReady;
        self.race += 1;

        match &self.pointer {
            Some(pointer) => vec![LaneAction::PublishReadiness {
                pointer: pointer.clone(),
                lane: self.lane,
                status: LaneReadiness::NotReady,
            }],
            None => Vec::new(),
        }
    }

    /// Submit the displayed time for the loaded swimmer.
    ///
    /// A zero time is not sent straight away: the session remembers the
    /// request and returns [`LaneAction::Confirm`]. The operator's answer
    /// goes to [`Self::confirm_blank_submit`].
    pub fn submit(
        &mut self,
        now: Instant,
        disqualified: bool,
    ) -> Result<Vec<LaneAction>, SessionError> {
        if self.pending_submit.is_some() {
            return Err(SessionError::SubmitInFlight);
        }
        if self.assignment.is_none() {
            return Err(SessionError::NoSwimmerLoaded);
        }

        if self.timer.display(now) == ZERO_ELAPSED {
            self.blank_submit = Some(BlankSubmit { disqualified, race: self.race });
            return Ok(vec![LaneAction::Confirm(PROMPT_BLANK_SUBMIT.to_string())]);
        }
        self.blank_submit = None;
        self.send_result(now, disqualified)
    }

    /// Apply the operator's answer to a [`LaneAction::Confirm`].
    ///
    /// The answer only counts for the race and stopwatch it was asked
    /// about. If the lane moved on or the stopwatch started meanwhile, the
    /// operator is told to submit again.
    pub fn confirm_blank_submit(
        &mut self,
        now: Instant,
        accepted: bool,
    ) -> Result<Vec<LaneAction>, SessionError> {
        let Some(blank) = self.blank_submit.take() else {
            return Ok(Vec::new());
        };
        if !accepted {
            debug!(lane = %self.lane, "blank submit declined");
            return Ok(Vec::new());
        }
        if blank.race != self.race || self.timer.display(now) != ZERO_ELAPSED {
            debug!(lane = %self.lane, "blank submit confirmed after the timer changed");
            return Ok(vec![LaneAction::Alert(ALERT_CONFIRM_STALE.to_string())]);
        }
        if self.pending_submit.is_some() {
            return Err(SessionError::SubmitInFlight);
        }
        self.send_result(now, blank.disqualified)
    }

    fn send_result(
        &mut self,
        now: Instant,
        disqualified: bool,
    ) -> Result<Vec<LaneAction>, SessionError> {
        let assignment = self.assignment.as_ref().ok_or(SessionError::NoSwimmerLoaded)?;
        let final_time = self.timer.display(now);
        let result =
            RaceResult { swimmer_id: assignment.swimmer_id.clone(), final_time, disqualified };
        info!(lane = %self.lane, time = %result.final_time, disqualified, "submitting result");
        self.pending_submit = Some(PendingSubmit { captured_at: now, race: self.race });
        Ok(vec![LaneAction::SubmitResult(result)])
    }

    /// Apply the outcome of a [`LaneAction::SubmitResult`].
    ///
    /// On success the stopwatch is frozen at the submitted time. On failure
    /// nothing changes, so the operator can submit again.
    pub fn handle_submit(&mut self, outcome: Result<(), StoreError>) -> Vec<LaneAction> {
        let Some(pending) = self.pending_submit.take() else {
            return Vec::new();
        };

        match outcome {
            Ok(()) => {
                if pending.race == self.race {
                    self.timer.stop(pending.captured_at);
                    self.race_status = RaceStatus::Finished;
                }
                vec![LaneAction::Alert("Saved!".to_string())]
            },
            Err(e) if e.is_rejection() => {
                warn!(lane = %self.lane, error = %e, "store rejected result");
                vec![LaneAction::Alert("Error saving result".to_string())]
            },
            Err(e) => {
                warn!(lane = %self.lane, error = %e, "submitting result failed");
                vec![LaneAction::Alert("Error contacting server while saving result.".to_string())]
            },
        }
    }

    /// React to a trigger device notification.
    ///
    /// `start` is scoped: it applies only when unscoped or scoped to the race
    /// this lane follows. `stop` and `reset` always apply. Both go through
    /// the same entry points as the operator's controls.
    pub fn handle_trigger(&mut self, msg: &TriggerMessage, now: Instant) -> Vec<LaneAction> {
        match msg.command {
            TriggerCommand::Start => {
                match msg.start_scope() {
                    StartScope::Broadcast => {
                        self.start_timer(now);
                    },
                    StartScope::Race(race) if self.pointer.as_ref() == Some(&race) => {
                        self.start_timer(now);
                    },
                    scope => {
                        debug!(lane = %self.lane, ?scope, "start is for another race");
                    },
                }
                Vec::new()
            },
            TriggerCommand::Stop => {
                self.stop_timer(now);
                Vec::new()
            },
            TriggerCommand::Reset => self.reset_timer(),
        }
    }

    /// Record the trigger link state for display.
    pub fn set_link_state(&mut self, state: LinkState) {
        self.link = state;
    }

    /// Display snapshot as of `now`.
    pub fn view(&self, now: Instant) -> LaneView {
        LaneView {
            lane: self.lane,
            pointer: self.pointer.clone(),
            assignment: self.assignment.clone(),
            load: self.load,
            race_status: self.race_status,
            readiness: self.readiness,
            timer: self.timer.display(now),
            link: self.link,
            submitting: self.pending_submit.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use heatsync_proto::SwimmerId;

    use super::*;

    fn lane(n: u8) -> LaneNumber {
        LaneNumber::new(n).unwrap()
    }

    fn swimmer(name: &str) -> LaneAssignment {
        LaneAssignment {
            swimmer_id: SwimmerId::new(format!("id-{name}")),
            swimmer_name: name.to_string(),
            school_name: "North".to_string(),
        }
    }

    fn loaded_session(pointer: &RacePointer) -> LaneSession {
        let mut session = LaneSession::new(lane(4), None);
        session.handle_pointer(Some(pointer.clone()));
        session.handle_assignment(pointer, Ok(Some(swimmer("Ada"))));
        session
    }

    #[test]
    fn first_pointer_starts_race() {
        let mut session = LaneSession::new(lane(4), None);
        let pointer = RacePointer::new("3", "1");

        let actions = session.handle_pointer(Some(pointer.clone()));
        assert_eq!(
            actions,
            vec![
                LaneAction::PublishReadiness {
                    pointer: pointer.clone(),
                    lane: lane(4),
                    status: LaneReadiness::NotReady,
                },
                LaneAction::FetchAssignment { pointer: pointer.clone(), lane: lane(4) },
            ]
        );
        assert_eq!(session.pointer(), Some(&pointer));
        assert_eq!(session.readiness(), LaneReadiness::NotReady);
    }

    #[test]
    fn same_pointer_is_noop() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        assert!(session.handle_pointer(Some(pointer)).is_empty());
        assert_eq!(session.readiness(), LaneReadiness::Ready);
    }

    #[test]
    fn failed_poll_keeps_state() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let t0 = Instant::now();
        session.start_timer(t0);
        let before = session.view(t0);

        assert!(session.handle_pointer(None).is_empty());
        assert_eq!(session.view(t0), before);
    }

    #[test]
    fn bootstrap_fetches_initial_race() {
        let pointer = RacePointer::new("1", "1");
        let mut session = LaneSession::new(lane(2), Some(pointer.clone()));
        assert_eq!(
            session.bootstrap(),
            vec![LaneAction::FetchAssignment { pointer: pointer.clone(), lane: lane(2) }]
        );
        // First poll returning the same race does nothing further.
        assert!(session.handle_pointer(Some(pointer)).is_empty());
    }

    #[test]
    fn bootstrap_without_race_waits_for_poll() {
        let mut session = LaneSession::new(lane(2), None);
        assert!(session.bootstrap().is_empty());
    }

    #[test]
    fn assignment_publishes_ready() {
        let pointer = RacePointer::new("3", "1");
        let mut session = LaneSession::new(lane(4), None);
        session.handle_pointer(Some(pointer.clone()));

        let actions = session.handle_assignment(&pointer, Ok(Some(swimmer("Ada"))));
        assert_eq!(
            actions,
            vec![LaneAction::PublishReadiness {
                pointer,
                lane: lane(4),
                status: LaneReadiness::Ready,
            }]
        );
        assert_eq!(session.readiness(), LaneReadiness::Ready);
        assert_eq!(session.assignment().map(|a| a.swimmer_name.as_str()), Some("Ada"));
    }

    #[test]
    fn no_entry_stays_not_ready() {
        let pointer = RacePointer::new("3", "1");
        let mut session = LaneSession::new(lane(8), None);
        session.handle_pointer(Some(pointer.clone()));

        assert!(session.handle_assignment(&pointer, Ok(None)).is_empty());
        assert_eq!(session.readiness(), LaneReadiness::NotReady);
        let view = session.view(Instant::now());
        assert_eq!(view.load, LoadStatus::NoEntry);
        assert_eq!(view.load_line(), "Event 3, Heat 1 • Lane 8 (NO ENTRY)");
    }

    #[test]
    fn transport_failure_alerts() {
        let pointer = RacePointer::new("3", "1");
        let mut session = LaneSession::new(lane(1), None);
        session.handle_pointer(Some(pointer.clone()));

        let actions = session
            .handle_assignment(&pointer, Err(StoreError::Transport("connection refused".into())));
        assert_eq!(actions, vec![LaneAction::Alert(ALERT_ASSIGNMENT_UNREACHABLE.to_string())]);
        assert_eq!(session.readiness(), LaneReadiness::NotReady);
    }

    #[test]
    fn stale_assignment_is_discarded() {
        let old = RacePointer::new("2", "4");
        let new = RacePointer::new("3", "1");
        let mut session = LaneSession::new(lane(4), None);
        session.handle_pointer(Some(old.clone()));
        session.handle_pointer(Some(new.clone()));

        assert!(session.handle_assignment(&old, Ok(Some(swimmer("Old")))).is_empty());
        assert!(session.assignment().is_none());
        assert_eq!(session.readiness(), LaneReadiness::NotReady);

        session.handle_assignment(&new, Ok(Some(swimmer("New"))));
        assert_eq!(session.assignment().map(|a| a.swimmer_name.as_str()), Some("New"));
    }

    #[test]
    fn pointer_change_clears_timer_and_swimmer() {
        let old = RacePointer::new("2", "4");
        let mut session = loaded_session(&old);
        let t0 = Instant::now();
        session.start_timer(t0);
        session.stop_timer(t0 + Duration::from_secs(30));

        session.handle_pointer(Some(RacePointer::new("3", "1")));
        let view = session.view(t0 + Duration::from_secs(31));
        assert_eq!(view.timer, ZERO_ELAPSED);
        assert_eq!(view.race_status, RaceStatus::NotReady);
        assert!(view.assignment.is_none());
    }

    #[test]
    fn start_is_idempotent() {
        let mut session = LaneSession::new(lane(1), None);
        let t0 = Instant::now();
        assert!(session.start_timer(t0));
        assert!(!session.start_timer(t0 + Duration::from_secs(1)));
        assert_eq!(session.timer().started_at(), Some(t0));
    }

    #[test]
    fn reset_publishes_not_ready_for_current_race() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let actions = session.reset_timer();
        assert_eq!(
            actions,
            vec![LaneAction::PublishReadiness {
                pointer,
                lane: lane(4),
                status: LaneReadiness::NotReady,
            }]
        );
        assert_eq!(session.readiness(), LaneReadiness::NotReady);
    }

    #[test]
    fn reset_without_race_publishes_nothing() {
        let mut session = LaneSession::new(lane(1), None);
        assert!(session.reset_timer().is_empty());
    }

    #[test]
    fn submit_requires_swimmer() {
        let mut session = LaneSession::new(lane(1), None);
        assert_eq!(session.submit(Instant::now(), false), Err(SessionError::NoSwimmerLoaded));
    }

    #[test]
    fn blank_submit_needs_confirmation() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let now = Instant::now();

        assert_eq!(
            session.submit(now, false).unwrap(),
            vec![LaneAction::Confirm(PROMPT_BLANK_SUBMIT.to_string())]
        );

        let actions = session.confirm_blank_submit(now, true).unwrap();
        assert!(matches!(
            &actions[..],
            [LaneAction::SubmitResult(r)] if r.final_time == ZERO_ELAPSED
        ));
        assert!(session.confirm_blank_submit(now, true).unwrap().is_empty());
    }

    #[test]
    fn declined_blank_submit_sends_nothing() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let now = Instant::now();
        session.submit(now, false).unwrap();

        assert!(session.confirm_blank_submit(now, false).unwrap().is_empty());
        assert!(session.confirm_blank_submit(now, true).unwrap().is_empty());
        assert!(!session.view(now).submitting);
    }

    #[test]
    fn blank_confirmation_after_new_race_is_dropped() {
        let mut session = loaded_session(&RacePointer::new("3", "1"));
        let now = Instant::now();
        session.submit(now, false).unwrap();

        let next = RacePointer::new("3", "2");
        session.handle_pointer(Some(next.clone()));
        session.handle_assignment(&next, Ok(Some(swimmer("Bo"))));

        assert_eq!(
            session.confirm_blank_submit(now, true).unwrap(),
            vec![LaneAction::Alert(ALERT_CONFIRM_STALE.to_string())]
        );
        assert!(!session.view(now).submitting);
    }

    #[test]
    fn blank_confirmation_after_start_is_dropped() {
        let mut session = loaded_session(&RacePointer::new("3", "1"));
        let t0 = Instant::now();
        session.submit(t0, false).unwrap();
        session.start_timer(t0);

        let actions = session.confirm_blank_submit(t0 + Duration::from_secs(3), true).unwrap();
        assert_eq!(actions, vec![LaneAction::Alert(ALERT_CONFIRM_STALE.to_string())]);
        assert!(session.is_running());
    }

    #[test]
    fn successful_submit_freezes_at_submitted_time() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let t0 = Instant::now();
        session.start_timer(t0);

        let actions = session.submit(t0 + Duration::from_millis(65_430), true).unwrap();
        let [LaneAction::SubmitResult(result)] = &actions[..] else {
            panic!("expected a submit action, got {actions:?}");
        };
        assert_eq!(result.final_time, "01:05.43");
        assert!(result.disqualified);
        assert_eq!(result.swimmer_id.as_str(), "id-Ada");

        assert_eq!(
            session.submit(t0 + Duration::from_secs(66), true),
            Err(SessionError::SubmitInFlight)
        );

        let actions = session.handle_submit(Ok(()));
        assert_eq!(actions, vec![LaneAction::Alert("Saved!".to_string())]);
        let view = session.view(t0 + Duration::from_secs(90));
        assert_eq!(view.timer, "01:05.43");
        assert_eq!(view.race_status, RaceStatus::Finished);
        assert!(!view.submitting);
    }

    #[test]
    fn failed_submit_leaves_timer_running() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let t0 = Instant::now();
        session.start_timer(t0);
        session.submit(t0 + Duration::from_secs(10), false).unwrap();

        let actions = session.handle_submit(Err(StoreError::Rejected {
            action: "submitResult",
            detail: None,
        }));
        assert_eq!(actions, vec![LaneAction::Alert("Error saving result".to_string())]);
        assert!(session.is_running());

        // Can submit again.
        assert!(session.submit(t0 + Duration::from_secs(11), false).is_ok());
    }

    #[test]
    fn scoped_start_only_for_current_race() {
        let t0 = Instant::now();
        let start = TriggerMessage::parse("cmd=start&event=5&heat=2").unwrap();

        let mut other = LaneSession::new(lane(1), Some(RacePointer::new("5", "3")));
        other.handle_trigger(&start, t0);
        assert!(!other.is_running());

        let mut same = LaneSession::new(lane(2), Some(RacePointer::new("5", "2")));
        same.handle_trigger(&start, t0);
        assert!(same.is_running());
    }

    #[test]
    fn broadcast_start_ignores_pointer() {
        let t0 = Instant::now();
        let start = TriggerMessage::parse("source=esp32&cmd=start").unwrap();

        let mut unpointed = LaneSession::new(lane(1), None);
        unpointed.handle_trigger(&start, t0);
        assert!(unpointed.is_running());

        let mut pointed = LaneSession::new(lane(2), Some(RacePointer::new("9", "9")));
        pointed.handle_trigger(&start, t0);
        assert!(pointed.is_running());
    }

    #[test]
    fn partial_start_is_ignored() {
        let mut session = LaneSession::new(lane(1), Some(RacePointer::new("5", "2")));
        let start = TriggerMessage::parse("cmd=start&event=5").unwrap();
        session.handle_trigger(&start, Instant::now());
        assert!(!session.is_running());
    }

    #[test]
    fn stop_and_reset_are_unscoped() {
        let t0 = Instant::now();
        let mut session = LaneSession::new(lane(1), Some(RacePointer::new("5", "3")));
        session.start_timer(t0);

        let stop = TriggerMessage::parse("cmd=stop").unwrap();
        session.handle_trigger(&stop, t0 + Duration::from_secs(2));
        assert_eq!(session.view(t0 + Duration::from_secs(9)).timer, "00:02.00");

        let reset = TriggerMessage::parse("cmd=reset").unwrap();
        let actions = session.handle_trigger(&reset, t0);
        assert_eq!(actions.len(), 1);
        assert_eq!(session.view(t0).timer, ZERO_ELAPSED);
    }

    #[test]
    fn submit_answer_after_new_race_does_not_freeze_new_timer() {
        let pointer = RacePointer::new("3", "1");
        let mut session = loaded_session(&pointer);
        let t0 = Instant::now();
        session.start_timer(t0);
        session.submit(t0 + Duration::from_secs(5), false).unwrap();

        session.handle_pointer(Some(RacePointer::new("3", "2")));
        session.start_timer(t0 + Duration::from_secs(6));
        session.handle_submit(Ok(()));
        assert!(session.is_running());
    }
}
