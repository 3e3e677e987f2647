//! # Pad Bus Library
//!
//! Controller-input arbitration core: samples raw gamepad state on a fixed
//! cadence, diffs it into discrete press/release/axis-change events, and
//! routes each event through a priority-ordered chain of competing handlers
//! where the first consumer wins.
//!
//! The crate is purely in-memory and rebuilt from scratch on every start; it
//! does not abstract over keyboard/mouse/touch input, merge controllers into
//! one logical source, or persist input mappings.

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod sampler;
pub mod service;
pub mod source;
