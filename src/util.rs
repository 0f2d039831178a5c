use crate::event_file::error::ReplayError;
use crate::event_file::traits::Player;

pub(crate) fn str_to_player(s: &str) -> Result<Player, ReplayError> {
    Player::from(s.trim()).map_err(|_| ReplayError::InvalidPlayerId(s.to_string()))
}
