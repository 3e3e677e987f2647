//! # Gilrs Snapshot Source
//!
//! Production [`SnapshotSource`] backed by the `gilrs` crate.
//!
//! gilrs keeps a cached state per gamepad that is refreshed by pumping its
//! event queue, so each poll drains pending events and then reads every
//! connected pad's buttons and axes in a fixed canonical order. The position
//! of a pad in the returned frame is its gilrs id converted to `usize`.

use ::gilrs::{Axis, Button, Gamepad, Gilrs};
use tracing::{debug, trace, warn};

use super::{PadSnapshot, SnapshotSource};

/// Canonical button order for snapshot arrays.
///
/// Index positions are the `button` indices carried by edge events. The order
/// follows the standard gamepad layout (face buttons, triggers, menu buttons,
/// thumbs, d-pad).
pub const BUTTON_ORDER: [Button; 17] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// Canonical axis order for snapshot arrays.
pub const AXIS_ORDER: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::LeftZ,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::RightZ,
];

/// Snapshot source over the host's gamepad stack
///
/// An unavailable backend (no input subsystem, sandboxed process) degrades to
/// a source that reports zero devices forever; construction never fails.
pub struct GilrsSource {
    gilrs: Option<Gilrs>,
}

impl GilrsSource {
    /// Initialize the gilrs backend
    ///
    /// Logs a single warning and continues deviceless when gilrs cannot
    /// initialize.
    pub fn new() -> Self {
        match Gilrs::new() {
            Ok(gilrs) => {
                for (id, pad) in gilrs.gamepads() {
                    debug!("Found gamepad [{}]: {}", id, pad.name());
                }
                Self { gilrs: Some(gilrs) }
            }
            Err(e) => {
                warn!("Gamepad backend unavailable, reporting no devices: {}", e);
                Self { gilrs: None }
            }
        }
    }

    /// Whether the underlying backend initialized successfully
    pub fn is_available(&self) -> bool {
        self.gilrs.is_some()
    }
}

impl Default for GilrsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for GilrsSource {
    fn poll(&mut self) -> Vec<Option<PadSnapshot>> {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return Vec::new();
        };

        // Drain the queue so cached pad state reflects the present.
        while let Some(event) = gilrs.next_event() {
            trace!("gilrs event: {:?}", event);
        }

        let mut frame: Vec<Option<PadSnapshot>> = Vec::new();
        for (id, pad) in gilrs.gamepads() {
            let index = usize::from(id);
            if frame.len() <= index {
                frame.resize(index + 1, None);
            }
            frame[index] = Some(read_pad(&pad));
        }
        frame
    }
}

fn read_pad(pad: &Gamepad<'_>) -> PadSnapshot {
    PadSnapshot {
        buttons: BUTTON_ORDER.iter().map(|b| pad.is_pressed(*b)).collect(),
        axes: AXIS_ORDER.iter().map(|a| pad.value(*a)).collect(),
    }
}
