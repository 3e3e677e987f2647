//! # Input Hub
//!
//! Composition-root-owned handle tying the snapshot source, the device
//! sampler and the dispatch bus into one polling service.
//!
//! One [`InputHub`] is built where the application is wired together and a
//! clone is handed to every consumer; independently-mounted surfaces all
//! reach the same bus through their clone instead of an ambient global.
//! Surfaces with a detached lifecycle can hold a [`HubRef`] and treat a
//! failed upgrade as "no input forwarding available".
//!
//! ## Focus by priority
//!
//! Transient input focus is a convention layered on priorities, not a hub
//! feature: the topmost surface (an open drawer, a modal) subscribes at a
//! higher priority and consumes what it handles, then drops its
//! [`Subscription`] when it loses focus, which restores the surfaces below.
//!
//! ## Scheduling
//!
//! `tick` performs one full sample-and-dispatch pass synchronously to
//! completion; `run` drives it from a fixed tokio interval. Handlers run on
//! the ticking task, so they must stay cheap or they delay every later event.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::bus::{DispatchBus, Subscription};
use crate::config::Config;
use crate::event::{Category, InputEvent, Outcome};
use crate::sampler::DeviceSampler;
use crate::source::{PadSnapshot, SnapshotSource};

struct Pipeline {
    source: Box<dyn SnapshotSource>,
    sampler: DeviceSampler,
}

struct HubInner {
    bus: DispatchBus,
    pipeline: Mutex<Pipeline>,
    poll_interval: Duration,
}

/// Handle to the input arbitration core
///
/// Cheap to clone; all clones share one sampler store and one set of
/// registration lists.
#[derive(Clone)]
pub struct InputHub {
    inner: Arc<HubInner>,
}

impl InputHub {
    /// Build the hub over a snapshot source
    pub fn new(source: impl SnapshotSource + 'static, config: &Config) -> Self {
        info!(
            "Input hub created (poll interval {} ms)",
            config.input.poll_interval_ms
        );
        Self {
            inner: Arc::new(HubInner {
                bus: DispatchBus::new(),
                pipeline: Mutex::new(Pipeline {
                    source: Box::new(source),
                    sampler: DeviceSampler::new(),
                }),
                poll_interval: Duration::from_millis(config.input.poll_interval_ms),
            }),
        }
    }

    // ==================== Subscription surface ====================

    /// Register a handler for one category at the given priority
    pub fn subscribe<F>(&self, category: Category, priority: i32, handler: F) -> Subscription
    where
        F: FnMut(&InputEvent) -> Outcome + Send + 'static,
    {
        self.inner.bus.subscribe(category, priority, handler)
    }

    /// Register a button-press handler
    pub fn on_button_down<F>(&self, priority: i32, handler: F) -> Subscription
    where
        F: FnMut(&InputEvent) -> Outcome + Send + 'static,
    {
        self.subscribe(Category::ButtonDown, priority, handler)
    }

    /// Register a button-release handler
    pub fn on_button_up<F>(&self, priority: i32, handler: F) -> Subscription
    where
        F: FnMut(&InputEvent) -> Outcome + Send + 'static,
    {
        self.subscribe(Category::ButtonUp, priority, handler)
    }

    /// Register an axis-change handler
    pub fn on_axis_change<F>(&self, priority: i32, handler: F) -> Subscription
    where
        F: FnMut(&InputEvent) -> Outcome + Send + 'static,
    {
        self.subscribe(Category::AxisChange, priority, handler)
    }

    // ==================== Scheduling ====================

    /// One sample-and-dispatch pass
    ///
    /// Reads the platform, diffs into events and dispatches each in
    /// production order; each event's dispatch completes before the next
    /// event is offered. The pipeline lock is released before handlers run,
    /// so handlers may query state or manage subscriptions freely.
    ///
    /// Returns the number of events dispatched this pass.
    pub fn tick(&self) -> usize {
        let events = {
            let mut pipeline = lock_pipeline(&self.inner.pipeline);
            let frame = pipeline.source.poll();
            pipeline.sampler.sample(frame)
        };

        for event in &events {
            let _ = self.inner.bus.dispatch(event.category(), event);
        }
        if !events.is_empty() {
            trace!("Tick dispatched {} events", events.len());
        }
        events.len()
    }

    /// Drive `tick` forever on the configured interval
    ///
    /// Never returns; select against a shutdown signal to stop it. Ticks do
    /// not overlap: a pass runs to completion before the next interval fires.
    pub async fn run(&self) {
        let mut ticker = interval(self.inner.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Input polling loop started");
        loop {
            ticker.tick().await;
            self.tick();
        }
    }

    /// Tear down all registrations
    ///
    /// Outstanding [`Subscription`] handles become no-ops. State queries keep
    /// working.
    pub fn shutdown(&self) {
        info!("Input hub shutting down, clearing registrations");
        self.inner.bus.clear();
    }

    // ==================== State queries ====================

    /// Snapshot of one device as of the last completed tick
    pub fn snapshot(&self, device: usize) -> Option<PadSnapshot> {
        lock_pipeline(&self.inner.pipeline)
            .sampler
            .snapshot(device)
            .cloned()
    }

    /// Whether a button is pressed; `false` for absent devices or indices
    pub fn is_pressed(&self, button: usize, device: usize) -> bool {
        lock_pipeline(&self.inner.pipeline)
            .sampler
            .is_pressed(button, device)
    }

    /// Current axis reading; `0.0` for absent devices or indices
    pub fn axis_value(&self, axis: usize, device: usize) -> f32 {
        lock_pipeline(&self.inner.pipeline)
            .sampler
            .axis_value(axis, device)
    }

    /// Live registrations for a category
    pub fn registered(&self, category: Category) -> usize {
        self.inner.bus.registered(category)
    }

    /// Non-owning reference to this hub
    pub fn downgrade(&self) -> HubRef {
        HubRef {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

fn lock_pipeline(pipeline: &Mutex<Pipeline>) -> MutexGuard<'_, Pipeline> {
    match pipeline.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Weak handle for surfaces with a lifecycle detached from the root
///
/// Upgrading fails once the hub is gone; callers treat that as "no input
/// forwarding available", never as a fatal condition.
#[derive(Clone)]
pub struct HubRef {
    inner: Weak<HubInner>,
}

impl HubRef {
    pub fn upgrade(&self) -> Option<InputHub> {
        self.inner.upgrade().map(|inner| InputHub { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EdgeKind;
    use crate::source::mocks::ScriptedSource;
    use std::sync::Mutex as StdMutex;

    fn hub_with(source: ScriptedSource) -> InputHub {
        InputHub::new(source, &Config::default())
    }

    fn pad(buttons: Vec<bool>, axes: Vec<f32>) -> PadSnapshot {
        PadSnapshot::new(buttons, axes)
    }

    // ==================== Dispatch Scenario Tests ====================

    #[test]
    fn test_top_consumer_shadows_lower_handler() {
        // Button 0 on device 0 goes unpressed -> pressed; the priority-5
        // handler consumes, the priority-1 handler must stay silent.
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![false], vec![]));
        source.push_single(pad(vec![true], vec![]));
        let hub = hub_with(source);

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_h1 = Arc::clone(&seen);
        let _h1 = hub.on_button_down(5, move |event| {
            if let InputEvent::Edge(edge) = event {
                seen_h1.lock().unwrap().push(("h1", edge.button, edge.device));
            }
            Outcome::Consumed
        });
        let seen_h2 = Arc::clone(&seen);
        let _h2 = hub.on_button_down(1, move |event| {
            if let InputEvent::Edge(edge) = event {
                seen_h2.lock().unwrap().push(("h2", edge.button, edge.device));
            }
            Outcome::PassThrough
        });

        assert_eq!(hub.tick(), 0); // seeding tick
        assert_eq!(hub.tick(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![("h1", 0, 0)]);
    }

    #[test]
    fn test_pass_through_reaches_lower_handler_in_order() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![false], vec![]));
        source.push_single(pad(vec![true], vec![]));
        let hub = hub_with(source);

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_h1 = Arc::clone(&seen);
        let _h1 = hub.on_button_down(5, move |_| {
            seen_h1.lock().unwrap().push("h1");
            Outcome::PassThrough
        });
        let seen_h2 = Arc::clone(&seen);
        let _h2 = hub.on_button_down(1, move |_| {
            seen_h2.lock().unwrap().push("h2");
            Outcome::PassThrough
        });

        hub.tick();
        hub.tick();
        assert_eq!(*seen.lock().unwrap(), vec!["h1", "h2"]);
    }

    #[test]
    fn test_axis_change_dispatched_once_then_quiet() {
        // Axis 0 reads 0.00 then 0.52, then holds steady.
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![], vec![0.0]));
        source.push_single(pad(vec![], vec![0.52]));
        let hub = hub_with(source);

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let _h = hub.on_axis_change(0, move |event| {
            if let InputEvent::Axis(axis) = event {
                seen_clone
                    .lock()
                    .unwrap()
                    .push((axis.axis, axis.value, axis.device));
            }
            Outcome::Consumed
        });

        hub.tick(); // seed
        assert_eq!(hub.tick(), 1);
        assert_eq!(hub.tick(), 0); // 0.52 again: silence
        assert_eq!(*seen.lock().unwrap(), vec![(0, 0.52, 0)]);
    }

    #[test]
    fn test_no_controllers_for_five_ticks() {
        let hub = hub_with(ScriptedSource::new());
        let _h = hub.on_button_down(0, |_| Outcome::Consumed);

        for _ in 0..5 {
            assert_eq!(hub.tick(), 0);
        }
    }

    #[test]
    fn test_release_routes_to_button_up_lane() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![true], vec![]));
        source.push_single(pad(vec![false], vec![]));
        let hub = hub_with(source);

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let _h = hub.on_button_up(0, move |event| {
            if let InputEvent::Edge(edge) = event {
                seen_clone.lock().unwrap().push(edge.kind);
            }
            Outcome::Consumed
        });

        hub.tick(); // seed (button already held: no phantom press)
        hub.tick();
        assert_eq!(*seen.lock().unwrap(), vec![EdgeKind::Up]);
    }

    // ==================== Focus Convention Tests ====================

    #[test]
    fn test_dropping_focused_overlay_restores_background() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![false], vec![]));
        source.push_single(pad(vec![true], vec![]));
        source.push_single(pad(vec![false], vec![]));
        source.push_single(pad(vec![true], vec![]));
        let hub = hub_with(source);

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_bg = Arc::clone(&seen);
        let _background = hub.on_button_down(0, move |_| {
            seen_bg.lock().unwrap().push("background");
            Outcome::Consumed
        });
        let seen_overlay = Arc::clone(&seen);
        let overlay = hub.on_button_down(10, move |_| {
            seen_overlay.lock().unwrap().push("overlay");
            Outcome::Consumed
        });

        hub.tick(); // seed
        hub.tick(); // press: overlay has focus
        drop(overlay); // overlay closes
        hub.tick(); // release
        hub.tick(); // press again: background is effective top
        assert_eq!(*seen.lock().unwrap(), vec!["overlay", "background"]);
    }

    // ==================== Query Tests ====================

    #[test]
    fn test_queries_reflect_last_tick() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![true, false], vec![0.25]));
        let hub = hub_with(source);

        // Before any tick: benign defaults.
        assert!(hub.snapshot(0).is_none());
        assert!(!hub.is_pressed(0, 0));
        assert_eq!(hub.axis_value(0, 0), 0.0);

        hub.tick();
        assert!(hub.is_pressed(0, 0));
        assert!(!hub.is_pressed(1, 0));
        assert_eq!(hub.axis_value(0, 0), 0.25);
        assert_eq!(hub.snapshot(0).unwrap().buttons, vec![true, false]);

        // Out-of-range queries never fail.
        assert!(!hub.is_pressed(42, 7));
        assert_eq!(hub.axis_value(42, 7), 0.0);
    }

    #[test]
    fn test_handler_may_query_hub_during_dispatch() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![false, true], vec![]));
        source.push_single(pad(vec![true, true], vec![]));
        let hub = hub_with(source);

        let observed = Arc::new(StdMutex::new(None));
        let observed_clone = Arc::clone(&observed);
        let hub_ref = hub.downgrade();
        let _h = hub.on_button_down(0, move |_| {
            // Re-entrant state query while dispatch is in flight.
            if let Some(hub) = hub_ref.upgrade() {
                *observed_clone.lock().unwrap() = Some(hub.is_pressed(1, 0));
            }
            Outcome::Consumed
        });

        hub.tick();
        hub.tick();
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }

    // ==================== Handle Lifecycle Tests ====================

    #[test]
    fn test_hub_ref_upgrade_while_alive() {
        let hub = hub_with(ScriptedSource::new());
        let hub_ref = hub.downgrade();
        assert!(hub_ref.upgrade().is_some());
    }

    #[test]
    fn test_hub_ref_fails_after_hub_dropped() {
        let hub_ref = {
            let hub = hub_with(ScriptedSource::new());
            hub.downgrade()
        };
        // Missing hub is "no input forwarding", not an error.
        assert!(hub_ref.upgrade().is_none());
    }

    #[test]
    fn test_shutdown_clears_registrations() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![false], vec![]));
        source.push_single(pad(vec![true], vec![]));
        let hub = hub_with(source);

        let seen = Arc::new(StdMutex::new(0usize));
        let seen_clone = Arc::clone(&seen);
        let _h = hub.on_button_down(0, move |_| {
            *seen_clone.lock().unwrap() += 1;
            Outcome::Consumed
        });

        assert_eq!(hub.registered(Category::ButtonDown), 1);
        hub.shutdown();
        assert_eq!(hub.registered(Category::ButtonDown), 0);

        hub.tick();
        hub.tick();
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    // ==================== Polling Loop Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_run_drives_ticks_on_interval() {
        let mut source = ScriptedSource::new();
        source.push_single(pad(vec![false], vec![]));
        source.push_single(pad(vec![true], vec![]));
        let hub = hub_with(source); // default 100 ms interval

        let seen = Arc::new(StdMutex::new(0usize));
        let seen_clone = Arc::clone(&seen);
        let _h = hub.on_button_down(0, move |_| {
            *seen_clone.lock().unwrap() += 1;
            Outcome::Consumed
        });

        let runner = hub.clone();
        let task = tokio::spawn(async move { runner.run().await });

        // Paused clock advances deterministically while we sleep.
        tokio::time::sleep(Duration::from_millis(450)).await;
        task.abort();

        // Seed tick, one press edge, then held state: exactly one delivery.
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}
