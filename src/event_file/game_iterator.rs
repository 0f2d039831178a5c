use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::event_file::error::ReplayError;
use crate::event_file::event_data::{Advance, EventData};
use crate::event_file::game_state::{EventOutcome, GameState, RunScored};
use crate::event_file::misc::{EventRecord, StartRecord};
use crate::event_file::traits::{BaseRunner, Batter, Catcher, Pitcher};

/// What to do with a play whose notation can't be parsed.
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum ParseFailurePolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Default, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct ReplayOptions {
    #[serde(default)]
    pub on_parse_error: ParseFailurePolicy,
}

impl ReplayOptions {
    pub const fn skipping_bad_plays() -> Self {
        Self {
            on_parse_error: ParseFailurePolicy::Skip,
        }
    }
}

/// Walks a game's records in order, applying each to a [`GameState`].
///
/// The records are shared, so cloning an iterator to look ahead only copies
/// the state.
#[derive(Debug, Clone)]
pub struct GameIterator {
    state: GameState,
    records: Arc<[EventRecord]>,
    cursor: usize,
    last: Option<EventOutcome>,
    options: ReplayOptions,
}

impl GameIterator {
    pub fn new(
        game_id: &str,
        starters: &[StartRecord],
        records: Vec<EventRecord>,
        options: ReplayOptions,
    ) -> Self {
        Self {
            state: GameState::new(game_id, starters),
            records: records.into(),
            cursor: 0,
            last: None,
            options,
        }
    }

    /// Applies the next record. Returns `Ok(false)` once every record has been
    /// applied.
    pub fn next_event(&mut self) -> Result<bool, ReplayError> {
        let Some(record) = self.records.get(self.cursor) else {
            return Ok(false);
        };
        match self.state.apply(record) {
            Ok(outcome) => self.last = Some(outcome),
            Err(e @ ReplayError::Parse { .. })
                if self.options.on_parse_error == ParseFailurePolicy::Skip =>
            {
                warn!("Skipping unparseable play: {}", e);
                self.state.apply_skipped(record)?;
                self.last = None;
            }
            Err(e) => return Err(e),
        }
        self.cursor += 1;
        Ok(true)
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.records.len()
    }

    pub const fn state(&self) -> &GameState {
        &self.state
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn outcome(&self) -> Option<&EventOutcome> {
        self.last.as_ref()
    }

    /// The most recently applied event, or `None` before the first one or
    /// after a skipped play.
    pub fn event(&self) -> Option<&EventData> {
        self.last.as_ref().map(|o| &o.event)
    }

    pub fn last_runs(&self) -> &[RunScored] {
        self.last
            .as_ref()
            .map(|o| o.runs.as_slice())
            .unwrap_or_default()
    }

    pub fn charged_batter(&self) -> Option<Batter> {
        self.last.as_ref().map(|o| o.charged_batter)
    }

    pub fn charged_pitcher(&self) -> Option<Pitcher> {
        self.last.as_ref().and_then(|o| o.charged_pitcher)
    }

    /// Pitcher charged with whoever occupied `base` when the last play began.
    pub fn responsible_pitcher(&self, base: BaseRunner) -> Option<Pitcher> {
        self.last
            .as_ref()
            .and_then(|o| o.occupants[base.index()].pitcher)
    }

    pub fn responsible_catcher(&self, base: BaseRunner) -> Option<Catcher> {
        self.last
            .as_ref()
            .and_then(|o| o.occupants[base.index()].catcher)
    }

    /// Follows the runner now standing on `base` through the rest of the
    /// half-inning on a private copy of the replay. The result is how their
    /// run scored, the base they were stranded on, or [`Advance::None`] if
    /// they were put out.
    pub fn runner_fate(&self, base: BaseRunner) -> Result<Advance, ReplayError> {
        if base == BaseRunner::Batter || !self.state.base(base).is_occupied() {
            return Err(ReplayError::NoRunner(base));
        }
        let mut lookahead = self.clone();
        let inning = self.state.inning();
        let side = self.state.batting_side();
        let mut slot = base;

        while let Some(record) = lookahead.records.get(lookahead.cursor) {
            if record.play.inning != inning || record.play.batting_side != side {
                break;
            }
            lookahead.next_event()?;
            let Some(outcome) = lookahead.last.as_ref() else {
                continue;
            };
            if outcome.event.is_out(slot) {
                debug!("Runner from {:?} put out", base);
                return Ok(Advance::None);
            }
            if let Some(run) = outcome.runs.iter().find(|r| r.origin == slot) {
                return Ok(run.advance);
            }
            if let Some(next) = outcome.event.advance_of(slot).base_runner() {
                slot = next;
            }
        }
        Ok(match slot {
            BaseRunner::First => Advance::First,
            BaseRunner::Second => Advance::Second,
            BaseRunner::Third | BaseRunner::Batter => Advance::Third,
        })
    }

    pub fn into_state(self) -> GameState {
        self.state
    }
}

/// Replays a whole game and hands back its final state.
pub fn replay_game(
    game_id: &str,
    starters: &[StartRecord],
    records: Vec<EventRecord>,
    options: ReplayOptions,
) -> Result<GameState, ReplayError> {
    let mut iter = GameIterator::new(game_id, starters, records, options);
    while iter.next_event()? {}
    let mut state = iter.into_state();
    state.finish();
    Ok(state)
}
