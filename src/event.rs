//! # Event Types
//!
//! Discrete input events produced by the device sampler, the dispatch
//! categories they are routed through, and the handler outcome contract.
//!
//! Events carry raw button/axis indices only. Interpreting an index as a
//! specific physical control (and applying any analog deadzone) is left to
//! the consuming handler.

/// Direction of a button edge: transition into or out of the pressed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Unpressed on the previous tick, pressed on this one.
    Down,
    /// Pressed on the previous tick, unpressed on this one.
    Up,
}

/// A discrete press or release transition on one button of one device.
///
/// Produced only when the pressed state differs from the previous tick's
/// reading for the same `(device, button)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Platform-assigned device slot index.
    pub device: usize,
    /// Button index within the device's snapshot array.
    pub button: usize,
    pub kind: EdgeKind,
}

/// A change in one analog axis reading on one device.
///
/// Produced on any raw difference from the previous tick, including analog
/// jitter; no deadzone is applied here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvent {
    /// Platform-assigned device slot index.
    pub device: usize,
    /// Axis index within the device's snapshot array.
    pub axis: usize,
    /// Raw reading in `[-1.0, 1.0]`.
    pub value: f32,
}

/// Any event the sampler can emit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Edge(EdgeEvent),
    Axis(AxisEvent),
}

impl InputEvent {
    /// The dispatch category this event is routed through.
    pub fn category(&self) -> Category {
        match self {
            InputEvent::Edge(edge) => match edge.kind {
                EdgeKind::Down => Category::ButtonDown,
                EdgeKind::Up => Category::ButtonUp,
            },
            InputEvent::Axis(_) => Category::AxisChange,
        }
    }

    /// Device slot index the event originated from.
    pub fn device(&self) -> usize {
        match self {
            InputEvent::Edge(edge) => edge.device,
            InputEvent::Axis(axis) => axis.device,
        }
    }
}

/// The three handler lists the bus maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ButtonDown,
    ButtonUp,
    AxisChange,
}

impl Category {
    /// All categories, in lane order.
    pub const ALL: [Category; 3] = [Category::ButtonDown, Category::ButtonUp, Category::AxisChange];

    /// Lane index used by the bus for this category.
    pub(crate) fn lane(self) -> usize {
        match self {
            Category::ButtonDown => 0,
            Category::ButtonUp => 1,
            Category::AxisChange => 2,
        }
    }
}

/// What a handler declares about an event it was offered.
///
/// Returned instead of a bare boolean so the control-flow intent is explicit
/// at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    /// The event is fully handled; lower-priority handlers must not see it.
    Consumed,
    /// Not handled here; offer it to the next handler in priority order.
    PassThrough,
}

impl Outcome {
    pub fn is_consumed(self) -> bool {
        matches!(self, Outcome::Consumed)
    }
}
