//! # Snapshot Source Module
//!
//! Trait abstraction over the platform's connected-controller state to enable
//! testing. The sampler pulls one frame of snapshots per tick through
//! [`SnapshotSource`]; production code plugs in [`gilrs::GilrsSource`], tests
//! drive the pipeline with a scripted mock.

pub mod gilrs;

/// One controller's raw state at a single instant.
///
/// Arrays are index-ordered as the platform reports them and are never
/// shorter than the device's actual control count. Axis values are raw
/// readings in `[-1.0, 1.0]` with no deadzone applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadSnapshot {
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
}

impl PadSnapshot {
    pub fn new(buttons: Vec<bool>, axes: Vec<f32>) -> Self {
        Self { buttons, axes }
    }
}

/// Source of per-tick controller snapshots
///
/// `poll` returns an index-addressed list of device slots: position in the
/// list is the device index, `None` marks an empty or disconnected slot.
/// Indices are stable while a device stays connected; a reconnected device
/// may come back under a different index (platform-defined, not corrected
/// here).
///
/// An unavailable platform is expressed as an empty list, never an error.
pub trait SnapshotSource: Send {
    /// Read the current state of every connected controller
    fn poll(&mut self) -> Vec<Option<PadSnapshot>>;
}
