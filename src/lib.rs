#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions)]

pub mod event_file;
mod util;

pub use event_file::error::{ParseError, ParseErrorKind, ReplayError};
pub use event_file::event_data::EventData;
pub use event_file::game_iterator::{replay_game, GameIterator, ParseFailurePolicy, ReplayOptions};
pub use event_file::game_state::GameState;
pub use event_file::play::parse;
