//! Starter console session.
//!
//! Navigates the roster, publishes the active race so lane clients follow
//! it, and aggregates lane readiness for the selected race.
//!
//! Readiness polling is scoped by a watch generation. Every selection change
//! emits [`StarterAction::WatchReadiness`] with a fresh generation, and
//! replies carrying an older generation are dropped, so statuses of the
//! previous race can never bleed into the panel of the new one.

use std::collections::BTreeMap;

use heatsync_proto::{
    LaneLink, LaneNumber, LaneReadiness, RacePointer, RosterOverview, TriggerCommand,
    TriggerMessage,
};
use tracing::{debug, info, warn};

use crate::{
    error::{SessionError, StoreError},
    trigger::LinkState,
};

/// Actions returned by the starter session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarterAction {
    /// Write the active race pointer. Best effort.
    PublishPointer(RacePointer),

    /// Replace the readiness poll with one for `pointer`, tagging replies
    /// with `generation`.
    WatchReadiness {
        /// Race to poll.
        pointer: RacePointer,
        /// Tag for [`StarterSession::handle_statuses`].
        generation: u64,
    },

    /// Drop the readiness poll. Nothing is selected to watch.
    StopWatching,

    /// Log the race start and hand the outcome to
    /// [`StarterSession::handle_start_logged`].
    LogStart(RacePointer),

    /// Play the audible start cue.
    PlayStartCue,

    /// Blocking notice for the official.
    Alert(String),
}

/// Severity of the inline status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    /// Neutral information.
    Info,
    /// Action succeeded.
    Success,
    /// Action failed.
    Error,
}

/// Inline, non-blocking status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Message text.
    pub text: String,
    /// Severity.
    pub tone: StatusTone,
}

impl StatusLine {
    fn new(tone: StatusTone, text: String) -> Self {
        Self { text, tone }
    }
}

/// Snapshot of the starter console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterView {
    /// Selected race.
    pub pointer: Option<RacePointer>,
    /// Heats of the selected event.
    pub heats: Vec<String>,
    /// Readiness per lane, lanes `1..=max_lanes`.
    pub lanes: Vec<(LaneNumber, LaneReadiness)>,
    /// Inline status.
    pub status: Option<StatusLine>,
    /// Trigger device link.
    pub link: LinkState,
}

impl StarterView {
    /// `Heats for Event E: 1, 2, 3`
    pub fn heats_line(&self) -> Option<String> {
        let pointer = self.pointer.as_ref()?;
        Some(format!("Heats for Event {}: {}", pointer.event, self.heats.join(", ")))
    }
}

/// Starter console session.
#[derive(Debug, Clone)]
pub struct StarterSession {
    max_lanes: u8,
    roster: RosterOverview,
    event_index: usize,
    heat_index: usize,
    panel: BTreeMap<LaneNumber, LaneReadiness>,
    watched: Option<RacePointer>,
    generation: u64,
    status: Option<StatusLine>,
    link: LinkState,
}

impl StarterSession {
    /// New session for a pool of `max_lanes` lanes, roster not yet loaded.
    pub fn new(max_lanes: u8) -> Self {
        Self {
            max_lanes,
            roster: RosterOverview::default(),
            event_index: 0,
            heat_index: 0,
            panel: BTreeMap::new(),
            watched: None,
            generation: 0,
            status: None,
            link: LinkState::Disconnected,
        }
    }

    /// Loaded roster.
    pub fn roster(&self) -> &RosterOverview {
        &self.roster
    }

    /// `(event, heat)` cursor pair.
    pub fn cursor(&self) -> (usize, usize) {
        (self.event_index, self.heat_index)
    }

    /// Selected race.
    pub fn current_pointer(&self) -> Option<RacePointer> {
        self.roster.pointer_at(self.event_index, self.heat_index)
    }

    /// Race whose readiness is being polled.
    pub fn watched(&self) -> Option<&RacePointer> {
        self.watched.as_ref()
    }

    /// Generation of the active readiness watch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Displayed readiness for `lane`.
    pub fn readiness(&self, lane: LaneNumber) -> LaneReadiness {
        self.panel.get(&lane).copied().unwrap_or_default()
    }

    /// Apply the roster fetch. Selects the first heat of the first event.
    pub fn handle_roster(
        &mut self,
        outcome: Result<RosterOverview, StoreError>,
    ) -> Vec<StarterAction> {
        let roster = match outcome {
            Ok(roster) => roster,
            Err(e) if e.is_rejection() => {
                warn!(error = %e, "overview rejected");
                return vec![StarterAction::Alert(
                    "Unable to load Events & Heats overview.".to_string(),
                )];
            },
            Err(e) => {
                warn!(error = %e, "overview fetch failed");
                return vec![StarterAction::Alert(
                    "Error contacting server for overview.".to_string(),
                )];
            },
        };

        if roster.is_empty() {
            return vec![StarterAction::Alert("No events found in heat sheet.".to_string())];
        }

        info!(events = roster.len(), "roster loaded");
        self.roster = roster;
        self.event_index = 0;
        self.heat_index = 0;
        self.select()
    }

    /// Move to the previous event, first heat.
    pub fn prev_event(&mut self) -> Vec<StarterAction> {
        if self.roster.is_empty() {
            return Vec::new();
        }
        self.event_index = self.event_index.saturating_sub(1);
        self.heat_index = 0;
        self.select()
    }

    /// Move to the next event, first heat.
    pub fn next_event(&mut self) -> Vec<StarterAction> {
        if self.roster.is_empty() {
            return Vec::new();
        }
        self.event_index = (self.event_index + 1).min(self.roster.len() - 1);
        self.heat_index = 0;
        self.select()
    }

    /// Move to the previous heat of the selected event.
    pub fn prev_heat(&mut self) -> Vec<StarterAction> {
        if self.roster.is_empty() {
            return Vec::new();
        }
        self.heat_index = self.heat_index.saturating_sub(1);
        self.select()
    }

    /// Move to the next heat of the selected event.
    pub fn next_heat(&mut self) -> Vec<StarterAction> {
        let Some(entry) = self.roster.event(self.event_index) else {
            return Vec::new();
        };
        self.heat_index = (self.heat_index + 1).min(entry.heats.len().saturating_sub(1));
        self.select()
    }

    /// Re-publish the selected race to the lanes and restart the readiness
    /// panel. Remote lane statuses are left as the lanes reported them.
    pub fn assign(&mut self) -> Result<Vec<StarterAction>, SessionError> {
        let pointer = self.current_pointer().ok_or(SessionError::NoRaceSelected)?;
        self.status = Some(StatusLine::new(
            StatusTone::Info,
            format!("Race assigned to lanes: Event {} Heat {}.", pointer.event, pointer.heat),
        ));
        Ok(self.watch(pointer))
    }

    /// Play the start cue and log the start for the selected race.
    pub fn start_race(&mut self) -> Result<Vec<StarterAction>, SessionError> {
        let pointer = self.current_pointer().ok_or(SessionError::NoRaceSelected)?;
        info!(event = %pointer.event, heat = %pointer.heat, "race started");
        Ok(vec![StarterAction::PlayStartCue, StarterAction::LogStart(pointer)])
    }

    /// Apply the outcome of a [`StarterAction::LogStart`]. Failures only
    /// update the inline status.
    pub fn handle_start_logged(&mut self, pointer: &RacePointer, outcome: Result<(), StoreError>) {
        let status = match outcome {
            Ok(()) => StatusLine::new(
                StatusTone::Success,
                format!(
                    "Event {} Heat {} has been logged as STARTED.",
                    pointer.event, pointer.heat
                ),
            ),
            Err(e) if e.is_rejection() => {
                warn!(error = %e, "start log rejected");
                StatusLine::new(
                    StatusTone::Error,
                    format!("Could not log START for Event {} Heat {}.", pointer.event, pointer.heat),
                )
            },
            Err(e) => {
                warn!(error = %e, "start log failed");
                StatusLine::new(StatusTone::Error, "Error contacting server to log START.".to_string())
            },
        };
        self.status = Some(status);
    }

    /// Apply one readiness poll. Replies from an older watch are dropped;
    /// failures keep the panel as it is until the next poll.
    pub fn handle_statuses(
        &mut self,
        generation: u64,
        outcome: Result<BTreeMap<LaneNumber, LaneReadiness>, StoreError>,
    ) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale lane statuses");
            return;
        }
        match outcome {
            Ok(statuses) => {
                self.panel = self
                    .lanes()
                    .map(|lane| {
                        (lane, statuses.get(&lane).copied().unwrap_or(LaneReadiness::Waiting))
                    })
                    .collect();
            },
            Err(e) => debug!(error = %e, "lane status poll failed"),
        }
    }

    /// React to a trigger device notification. Only `start` matters here,
    /// and it always sounds the cue.
    pub fn handle_trigger(&mut self, msg: &TriggerMessage) -> Vec<StarterAction> {
        match msg.command {
            TriggerCommand::Start => vec![StarterAction::PlayStartCue],
            TriggerCommand::Stop | TriggerCommand::Reset => Vec::new(),
        }
    }

    /// Sound the cue without starting anything.
    pub fn test_cue(&self) -> Vec<StarterAction> {
        vec![StarterAction::PlayStartCue]
    }

    /// Record the trigger link state for display.
    pub fn set_link_state(&mut self, state: LinkState) {
        self.link = state;
    }

    /// Direct lane links for the selected race.
    pub fn lane_links(&self, lane_page: &str) -> Vec<LaneLink> {
        match self.current_pointer() {
            Some(pointer) => LaneLink::for_race(lane_page, self.max_lanes, &pointer),
            None => Vec::new(),
        }
    }

    /// Display snapshot.
    pub fn view(&self) -> StarterView {
        let heats = self
            .roster
            .event(self.event_index)
            .map(|entry| entry.heats.iter().map(ToString::to_string).collect())
            .unwrap_or_default();
        StarterView {
            pointer: self.current_pointer(),
            heats,
            lanes: self.lanes().map(|lane| (lane, self.readiness(lane))).collect(),
            status: self.status.clone(),
            link: self.link,
        }
    }

    fn lanes(&self) -> impl Iterator<Item = LaneNumber> + use<> {
        (1..=self.max_lanes).filter_map(LaneNumber::new)
    }

    /// Clamp the heat cursor and make the selection the published race.
    fn select(&mut self) -> Vec<StarterAction> {
        let heats = self.roster.event(self.event_index).map_or(0, |entry| entry.heats.len());
        self.heat_index = self.heat_index.min(heats.saturating_sub(1));

        match self.current_pointer() {
            Some(pointer) => self.watch(pointer),
            None => {
                warn!(event_index = self.event_index, "selected event has no heats");
                self.generation += 1;
                self.watched = None;
                self.panel.clear();
                vec![StarterAction::StopWatching]
            },
        }
    }

    fn watch(&mut self, pointer: RacePointer) -> Vec<StarterAction> {
        self.generation += 1;
        self.panel.clear();
        self.watched = Some(pointer.clone());
        vec![
            StarterAction::PublishPointer(pointer.clone()),
            StarterAction::WatchReadiness { pointer, generation: self.generation },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(n: u8) -> LaneNumber {
        LaneNumber::new(n).unwrap()
    }

    fn roster() -> RosterOverview {
        RosterOverview::from_pairs([
            ("1", &["1", "2"][..]),
            ("2", &["1"][..]),
            ("3", &["1", "2", "3"][..]),
        ])
    }

    fn loaded() -> StarterSession {
        let mut session = StarterSession::new(8);
        session.handle_roster(Ok(roster()));
        session
    }

    #[test]
    fn roster_load_selects_first_race() {
        let mut session = StarterSession::new(8);
        let actions = session.handle_roster(Ok(roster()));
        assert_eq!(
            actions,
            vec![
                StarterAction::PublishPointer(RacePointer::new("1", "1")),
                StarterAction::WatchReadiness {
                    pointer: RacePointer::new("1", "1"),
                    generation: 1,
                },
            ]
        );
    }

    #[test]
    fn empty_roster_alerts() {
        let mut session = StarterSession::new(8);
        let actions = session.handle_roster(Ok(RosterOverview::default()));
        assert!(matches!(&actions[..], [StarterAction::Alert(_)]));
        assert_eq!(session.current_pointer(), None);
    }

    #[test]
    fn roster_failure_alerts() {
        let mut session = StarterSession::new(8);
        let actions = session.handle_roster(Err(StoreError::Transport("offline".into())));
        assert_eq!(
            actions,
            vec![StarterAction::Alert("Error contacting server for overview.".to_string())]
        );
    }

    #[test]
    fn navigation_before_roster_is_noop() {
        let mut session = StarterSession::new(8);
        assert!(session.next_event().is_empty());
        assert!(session.prev_event().is_empty());
        assert!(session.next_heat().is_empty());
        assert!(session.prev_heat().is_empty());
        assert_eq!(session.assign(), Err(SessionError::NoRaceSelected));
        assert_eq!(session.start_race(), Err(SessionError::NoRaceSelected));
    }

    #[test]
    fn cursors_are_clamped() {
        let mut session = loaded();
        session.prev_event();
        session.prev_heat();
        assert_eq!(session.cursor(), (0, 0));

        session.next_heat();
        session.next_heat();
        session.next_heat();
        assert_eq!(session.current_pointer(), Some(RacePointer::new("1", "2")));

        for _ in 0..5 {
            session.next_event();
        }
        assert_eq!(session.cursor(), (2, 0));
    }

    #[test]
    fn changing_event_resets_heat() {
        let mut session = loaded();
        session.next_heat();
        assert_eq!(session.cursor(), (0, 1));
        let actions = session.next_event();
        assert_eq!(session.cursor(), (1, 0));
        assert_eq!(actions[0], StarterAction::PublishPointer(RacePointer::new("2", "1")));
    }

    #[test]
    fn assign_publishes_and_restarts_watch() {
        let mut session = loaded();
        session.next_event();
        session.next_event();
        let before = session.generation();

        let actions = session.assign().unwrap();
        assert_eq!(
            actions,
            vec![
                StarterAction::PublishPointer(RacePointer::new("3", "1")),
                StarterAction::WatchReadiness {
                    pointer: RacePointer::new("3", "1"),
                    generation: before + 1,
                },
            ]
        );
        assert_eq!(
            session.view().status.map(|s| s.text),
            Some("Race assigned to lanes: Event 3 Heat 1.".to_string())
        );
    }

    #[test]
    fn statuses_fill_panel_with_waiting_default() {
        let mut session = loaded();
        let generation = session.generation();
        let statuses =
            BTreeMap::from([(lane(1), LaneReadiness::Ready), (lane(2), LaneReadiness::NotReady)]);
        session.handle_statuses(generation, Ok(statuses));

        assert_eq!(session.readiness(lane(1)), LaneReadiness::Ready);
        assert_eq!(session.readiness(lane(2)), LaneReadiness::NotReady);
        assert_eq!(session.readiness(lane(3)), LaneReadiness::Waiting);
        assert_eq!(session.view().lanes.len(), 8);
    }

    #[test]
    fn lanes_beyond_pool_are_ignored() {
        let mut session = StarterSession::new(4);
        session.handle_roster(Ok(roster()));
        let generation = session.generation();
        session.handle_statuses(generation, Ok(BTreeMap::from([(lane(6), LaneReadiness::Ready)])));
        assert!(session.view().lanes.iter().all(|(_, r)| *r == LaneReadiness::Waiting));
    }

    #[test]
    fn stale_statuses_are_dropped() {
        let mut session = loaded();
        let old = session.generation();
        session.next_event();

        session.handle_statuses(old, Ok(BTreeMap::from([(lane(1), LaneReadiness::Ready)])));
        assert_eq!(session.readiness(lane(1)), LaneReadiness::Waiting);
    }

    #[test]
    fn failed_poll_keeps_panel() {
        let mut session = loaded();
        let generation = session.generation();
        session.handle_statuses(generation, Ok(BTreeMap::from([(lane(1), LaneReadiness::Ready)])));
        session.handle_statuses(generation, Err(StoreError::Transport("timeout".into())));
        assert_eq!(session.readiness(lane(1)), LaneReadiness::Ready);
    }

    #[test]
    fn start_race_cues_and_logs() {
        let mut session = loaded();
        let actions = session.start_race().unwrap();
        assert_eq!(
            actions,
            vec![StarterAction::PlayStartCue, StarterAction::LogStart(RacePointer::new("1", "1"))]
        );
    }

    #[test]
    fn start_log_outcomes_update_status_only() {
        let mut session = loaded();
        let pointer = RacePointer::new("1", "1");

        session.handle_start_logged(&pointer, Ok(()));
        let status = session.view().status.unwrap();
        assert_eq!(status.tone, StatusTone::Success);
        assert_eq!(status.text, "Event 1 Heat 1 has been logged as STARTED.");

        session.handle_start_logged(
            &pointer,
            Err(StoreError::Rejected { action: "setStart", detail: None }),
        );
        assert_eq!(
            session.view().status.unwrap().text,
            "Could not log START for Event 1 Heat 1."
        );

        session.handle_start_logged(&pointer, Err(StoreError::Transport("offline".into())));
        assert_eq!(session.view().status.unwrap().text, "Error contacting server to log START.");
    }

    #[test]
    fn trigger_start_always_cues() {
        let mut session = StarterSession::new(8);
        let scoped = TriggerMessage::parse("cmd=start&event=7&heat=7").unwrap();
        assert_eq!(session.handle_trigger(&scoped), vec![StarterAction::PlayStartCue]);
        let stop = TriggerMessage::parse("cmd=stop").unwrap();
        assert!(session.handle_trigger(&stop).is_empty());
    }

    #[test]
    fn event_without_heats_selects_nothing() {
        let mut session = StarterSession::new(8);
        session.handle_roster(Ok(RosterOverview::from_pairs([("1", &["1"][..]), ("2", &[][..])])));
        let watched = session.generation();
        let actions = session.next_event();
        assert_eq!(actions, vec![StarterAction::StopWatching]);
        assert_eq!(session.current_pointer(), None);
        assert_eq!(session.cursor(), (1, 0));

        // Late statuses for the previous race must not refill the panel.
        session.handle_statuses(watched, Ok([(lane(1), LaneReadiness::Ready)].into()));
        assert_eq!(session.readiness(lane(1)), LaneReadiness::Waiting);
    }

    #[test]
    fn lane_links_cover_pool() {
        let session = loaded();
        let links = session.lane_links("http://pool.local/");
        assert_eq!(links.len(), 8);
        assert_eq!(links[0].url, "http://pool.local/?lane=1&event=1&heat=1");
    }

    #[test]
    fn heats_line() {
        let mut session = loaded();
        session.next_event();
        session.next_event();
        assert_eq!(session.view().heats_line().as_deref(), Some("Heats for Event 3: 1, 2, 3"));
    }
}
