//! Stopwatch display format.

use std::time::Duration;

/// Display value of a timer that has not run.
pub const ZERO_ELAPSED: &str = "00:00.00";

/// Format elapsed time as `MM:SS.hh`.
///
/// Rounded to the nearest hundredth with carry into seconds and minutes.
/// Minutes are padded to two digits and grow past that for long races.
pub fn format_elapsed(elapsed: Duration) -> String {
    let centis = (elapsed.as_millis() + 5) / 10;
    let minutes = centis / 6000;
    let seconds = (centis % 6000) / 100;
    let hundredths = centis % 100;
    format!("{minutes:02}:{seconds:02}.{hundredths:02}")
}
