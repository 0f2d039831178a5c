//! Replays of whole innings through the public API.

mod common;
mod engine_tests;
mod property_tests;
mod substitution_tests;
