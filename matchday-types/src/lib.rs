//! # matchday-types
//!
//! Shared type definitions for the matchday client.
//! This crate contains the event-file records, the per-game aggregation
//! store, and the summary rendering used across matchday-net and the binary.

pub mod event;
pub mod game;
pub mod summary;

pub use event::{load_match_file, Event, EventFileError, MatchFile};
pub use game::{EventRecord, GameRecord, ScoreBoard};
pub use summary::render;
