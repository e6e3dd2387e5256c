//! Records vehicle sightings in Platitude and answers plate checks against it.
//!
//! Writes go through [`saga::post_sighting`], which creates the vehicle,
//! plate and sighting in order. Reads go through [`platecheck::check_plate`],
//! which joins a plate's sightings with the vehicle behind them. The `webhook`
//! module puts both behind HTTP: the sighting form and the chat command.

pub mod bot;
pub mod client;
pub mod config;
pub mod format;
pub mod platecheck;
pub mod saga;
pub mod submission;
pub mod types;
pub mod webhook;
