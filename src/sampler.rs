//! # Device Sampler
//!
//! Turns raw per-tick controller snapshots into discrete events by diffing
//! against the previous tick's state.
//!
//! The sampler is the sole owner and writer of the per-device previous
//! snapshot store. Queries (`snapshot`, `is_pressed`, `axis_value`) read that
//! store, i.e. they answer with state as of the last completed sample pass.
//!
//! ## Connect / disconnect policy
//!
//! The first observation of a device seeds its store from that reading and
//! emits nothing: a button already held when the pad connects produces no
//! phantom press, at the cost of missing that initial hold. A device that
//! disappears keeps its stored state untouched; if the platform reuses the
//! index on reconnect, diffing resumes against stale data and can produce one
//! false release/press pair. Accepted limitation, not special-cased.

use tracing::{debug, trace};

use crate::event::{AxisEvent, EdgeEvent, EdgeKind, InputEvent};
use crate::source::PadSnapshot;

/// Stateful diff engine over controller snapshots
#[derive(Debug, Default)]
pub struct DeviceSampler {
    previous: Vec<Option<PadSnapshot>>,
}

impl DeviceSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff one frame of device snapshots against the stored state
    ///
    /// Returns the events of this tick in dispatch order: devices in
    /// ascending index order, and per device all button edges (ascending
    /// button index) before all axis changes (ascending axis index).
    ///
    /// Absent slots (`None`) leave the stored state for that index untouched.
    pub fn sample(&mut self, frame: Vec<Option<PadSnapshot>>) -> Vec<InputEvent> {
        if self.previous.len() < frame.len() {
            self.previous.resize(frame.len(), None);
        }

        let mut events = Vec::new();
        for (device, slot) in frame.into_iter().enumerate() {
            let Some(current) = slot else {
                continue;
            };

            match &mut self.previous[device] {
                stored @ None => {
                    // First observation: seed silently, transitions start now.
                    debug!(
                        "Device {} connected ({} buttons, {} axes)",
                        device,
                        current.buttons.len(),
                        current.axes.len()
                    );
                    *stored = Some(current);
                }
                Some(previous) => {
                    diff_device(device, previous, &current, &mut events);
                    *previous = current;
                }
            }
        }
        events
    }

    /// State of one device as of the last sample pass, if ever observed
    pub fn snapshot(&self, device: usize) -> Option<&PadSnapshot> {
        self.previous.get(device).and_then(|slot| slot.as_ref())
    }

    /// Whether a button was pressed as of the last sample pass
    ///
    /// Unknown devices and out-of-range indices read as not pressed.
    pub fn is_pressed(&self, button: usize, device: usize) -> bool {
        self.snapshot(device)
            .and_then(|snap| snap.buttons.get(button).copied())
            .unwrap_or(false)
    }

    /// Axis reading as of the last sample pass
    ///
    /// Unknown devices and out-of-range indices read as `0.0`.
    pub fn axis_value(&self, axis: usize, device: usize) -> f32 {
        self.snapshot(device)
            .and_then(|snap| snap.axes.get(axis).copied())
            .unwrap_or(0.0)
    }
}

/// Emit edge and axis events for one device, buttons first
fn diff_device(
    device: usize,
    previous: &PadSnapshot,
    current: &PadSnapshot,
    events: &mut Vec<InputEvent>,
) {
    for (button, &pressed) in current.buttons.iter().enumerate() {
        // Indices beyond the stored arrays are seeded silently, matching the
        // connect-time policy.
        let Some(&was_pressed) = previous.buttons.get(button) else {
            continue;
        };
        if pressed != was_pressed {
            let kind = if pressed { EdgeKind::Down } else { EdgeKind::Up };
            trace!("Device {} button {} {:?}", device, button, kind);
            events.push(InputEvent::Edge(EdgeEvent {
                device,
                button,
                kind,
            }));
        }
    }

    for (axis, &value) in current.axes.iter().enumerate() {
        let Some(&was_value) = previous.axes.get(axis) else {
            continue;
        };
        // Any raw difference counts; deadzones belong to consumers.
        if value != was_value {
            trace!("Device {} axis {} -> {:.4}", device, axis, value);
            events.push(InputEvent::Axis(AxisEvent {
                device,
                axis,
                value,
            }));
        }
    }
}
