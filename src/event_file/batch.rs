use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::event_file::error::ReplayError;
use crate::event_file::game_iterator::{replay_game, ReplayOptions};
use crate::event_file::game_state::GameState;
use crate::event_file::misc::{EventRecord, StartRecord};

/// Everything needed to replay one game.
#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct GameInput {
    pub game_id: String,
    pub starters: Vec<StartRecord>,
    pub events: Vec<EventRecord>,
}

impl GameInput {
    pub fn replay(&self, options: ReplayOptions) -> Result<GameState, ReplayError> {
        replay_game(&self.game_id, &self.starters, self.events.clone(), options)
    }
}

/// Replays independent games in parallel. Results come back in input order.
pub fn replay_games(
    games: &[GameInput],
    options: ReplayOptions,
) -> Vec<Result<GameState, ReplayError>> {
    info!("Replaying {} games", games.len());
    games
        .par_iter()
        .map(|game| {
            game.replay(options).map_err(|e| {
                error!("{}: {}", game.game_id, e);
                e
            })
        })
        .collect()
}
