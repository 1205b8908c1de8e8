//! Plain-text rendering of the lane and starter views.
//!
//! Pure functions from view to text so the terminal driver only decides
//! when to print.

use heatsync_core::{LaneView, LinkState, StarterView, StatusTone};
use heatsync_proto::LaneLink;

fn link_label(link: LinkState) -> &'static str {
    match link {
        LinkState::Disconnected => "offline",
        LinkState::Connecting => "connecting",
        LinkState::Connected => "connected",
    }
}

/// Lane page text without the stopwatch, which changes every tick.
pub fn lane_block(view: &LaneView) -> String {
    let mut lines = vec![format!("== Lane {} ==", view.lane)];
    match &view.assignment {
        Some(assignment) => {
            lines.push(format!("Swimmer: {}", assignment.swimmer_name));
            lines.push(format!("School:  {}", assignment.school_name));
        },
        None => lines.push("Swimmer: -".to_string()),
    }
    lines.push(view.load_line());
    lines.push(format!(
        "Race: {} | Lane: {} | Trigger: {}",
        view.race_status.label(),
        view.readiness.label(),
        link_label(view.link),
    ));
    if view.submitting {
        lines.push("Saving result...".to_string());
    }
    lines.join("\n")
}

/// Stopwatch line.
pub fn lane_timer(view: &LaneView) -> String {
    format!("Time {}", view.timer)
}

/// Starter console text.
pub fn starter_block(view: &StarterView, links: &[LaneLink]) -> String {
    let mut lines = vec!["== Starter ==".to_string()];
    match &view.pointer {
        Some(pointer) => lines.push(format!("Current: {pointer}")),
        None => lines.push("Current: -".to_string()),
    }
    if let Some(heats) = view.heats_line() {
        lines.push(heats);
    }
    for (lane, status) in &view.lanes {
        lines.push(format!("  Lane {lane}: {}", status.label()));
    }
    if let Some(status) = &view.status {
        let marker = match status.tone {
            StatusTone::Info => "i",
            StatusTone::Success => "+",
            StatusTone::Error => "x",
        };
        lines.push(format!("[{marker}] {}", status.text));
    }
    lines.push(format!("Trigger: {}", link_label(view.link)));
    if !links.is_empty() {
        lines.push("Lane links:".to_string());
        lines.extend(links.iter().map(|link| format!("  {}: {}", link.lane, link.url)));
    }
    lines.join("\n")
}
