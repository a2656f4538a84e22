//! Coalfield game library
//!
//! A first-person scan-and-find game: fly through a field of decoy rocks,
//! scan them from the centre of the view, and find the one target the clue
//! describes before the magic runs out.
//!
//! The gameplay core (`session` and everything it owns) is plain Rust and runs
//! headless; the `plugin`, `field_rendering`, `audio_playback` and
//! `hud_display` modules adapt it to Bevy.

pub mod audio;
pub mod audio_playback;
pub mod collision;
pub mod config;
pub mod constants;
pub mod economy;
pub mod error;
pub mod field_rendering;
pub mod hud;
pub mod hud_display;
pub mod input;
pub mod player;
pub mod plugin;
pub mod raycast;
pub mod registry;
pub mod scan;
pub mod session;
pub mod spatial_partition;
pub mod timers;
