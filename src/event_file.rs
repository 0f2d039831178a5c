pub mod batch;
pub mod error;
pub mod event_data;
pub mod game_iterator;
pub mod game_state;
pub mod hit_location;
pub mod misc;
pub mod play;
pub mod traits;
