//! Terminal driver over stdin/stdout.
//!
//! Stdin is read line by line on its own task and handed over a channel,
//! which keeps [`Driver::next_input`] cancel safe. Views are printed only
//! when their text changes; the lane stopwatch is redrawn in place on its
//! own line. After a confirmation question the next line is its answer.

use std::{
    io::{self, Write},
    marker::PhantomData,
};

use heatsync_app::{Driver, DriverError};
use heatsync_core::{LaneView, StarterView};
use heatsync_proto::LaneLink;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::debug;

use crate::{
    commands::{CommandSet, Parsed},
    render,
};

/// Line-oriented terminal frontend for the role whose commands are `C`.
pub struct TerminalDriver<C> {
    lines: mpsc::Receiver<String>,
    out: io::Stdout,
    last_block: Option<String>,
    awaiting_answer: bool,
    _role: PhantomData<fn() -> C>,
}

impl<C: CommandSet> TerminalDriver<C> {
    /// Start reading stdin.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        debug!(error = %e, "stdin read failed");
                        break;
                    },
                }
            }
        });
        Self {
            lines: rx,
            out: io::stdout(),
            last_block: None,
            awaiting_answer: false,
            _role: PhantomData,
        }
    }

    fn print_block(&mut self, block: String) -> io::Result<bool> {
        if self.last_block.as_ref() == Some(&block) {
            return Ok(false);
        }
        writeln!(self.out)?;
        writeln!(self.out, "{block}")?;
        self.last_block = Some(block);
        Ok(true)
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }
}

fn is_yes(line: &str) -> bool {
    let answer = line.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

impl<C: CommandSet> Default for TerminalDriver<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CommandSet> Driver for TerminalDriver<C> {
    type Input = C;

    async fn next_input(&mut self) -> Result<Option<C>, DriverError> {
        loop {
            let Some(line) = self.lines.recv().await else {
                return Ok(None);
            };
            if std::mem::take(&mut self.awaiting_answer) {
                if let Some(answer) = C::answer(is_yes(&line)) {
                    return Ok(Some(answer));
                }
            }
            match C::parse(&line) {
                Parsed::Input(input) => return Ok(Some(input)),
                Parsed::Empty => {},
                Parsed::Help => self.say(C::HELP)?,
                Parsed::Unknown { input } => {
                    self.say(&format!("unknown command: {input} (try `help`)"))?;
                },
                Parsed::InvalidArgs { command, error } => {
                    self.say(&format!("{command}: {error}"))?;
                },
            }
        }
    }

    fn render_lane(&mut self, view: &LaneView) -> Result<(), DriverError> {
        self.print_block(render::lane_block(view))?;
        write!(self.out, "\r{}", render::lane_timer(view))?;
        self.out.flush()?;
        Ok(())
    }

    fn render_starter(
        &mut self,
        view: &StarterView,
        links: &[LaneLink],
    ) -> Result<(), DriverError> {
        if self.print_block(render::starter_block(view, links))? {
            self.out.flush()?;
        }
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), DriverError> {
        self.say(&format!("!! {message}"))?;
        Ok(())
    }

    fn confirm(&mut self, prompt: &str) -> Result<(), DriverError> {
        write!(self.out, "\n{prompt} [y/N] ")?;
        self.out.flush()?;
        self.awaiting_answer = true;
        Ok(())
    }

    fn play_start_cue(&mut self) -> Result<(), DriverError> {
        self.say("\x07>>> START <<<")?;
        Ok(())
    }
}
