//! Property tweens driven by the node's [`AnimationScheduler`].
//!
//! [`AnimationScheduler`]: crate::animation::AnimationScheduler

use std::mem;
use std::time::Duration;

use crate::animation::{AnimationKey, Completion, Easing, Outcome};
use crate::error::Error;

use super::lifecycle::CleanupTag;
use super::{Node, Property};

/// Deferred start of one queued animation, plus the completion handed to
/// the caller before it started.
pub(super) struct QueuedAnimation {
    start: Box<dyn FnOnce(&Node) -> Completion>,
    proxy: Completion,
}

impl Node {
    /// Tween `property` from its current value to `target` over `duration`.
    ///
    /// Runs concurrently with any other tween on this node. The completion
    /// settles with [`Outcome::Finished`] once the target is reached, with
    /// [`Outcome::Interrupted`] if the node is destroyed first, and with
    /// [`Outcome::Rejected`] if the tween could not start.
    pub fn animate(
        &self,
        property: impl Into<Property>,
        target: f32,
        duration: Duration,
        easing: Easing,
    ) -> Completion {
        let property = property.into();
        if self.is_destroyed() {
            return Completion::settled(Outcome::Interrupted);
        }
        let Some(start) = self.get(property.clone()) else {
            self.report(&self.unknown_property(&property), "animate");
            return Completion::settled(Outcome::Rejected);
        };
        if !target.is_finite() {
            let error = Error::InvalidValue {
                property: property.to_string(),
                value: target,
            };
            self.report(&error, "animate");
            return Completion::settled(Outcome::Rejected);
        }

        let scheduler = self.scheduler();
        let started = scheduler.now();
        let key = AnimationKey::for_tween(self.id(), &property, started, scheduler.next_sequence());
        let completion = Completion::pending();

        {
            let mut state = self.inner.borrow_mut();
            state.animations.insert(key.clone(), completion.clone());
            let scheduler = scheduler.clone();
            let cancel_key = key.clone();
            state.push_cleanup(CleanupTag::Animation(key.clone()), move || {
                scheduler.unregister(&cancel_key);
            });
        }

        let node = self.downgrade();
        let signal = completion.clone();
        let step_key = key.clone();
        scheduler.register(key, move |now| {
            let Some(node) = node.upgrade().filter(|node| !node.is_destroyed()) else {
                signal.settle(Outcome::Interrupted);
                return Ok(false);
            };

            let progress = if duration.is_zero() {
                1.0
            } else {
                (now.saturating_sub(started).as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
            };
            let value = if progress >= 1.0 {
                target
            } else {
                start + (target - start) * easing.apply(progress)
            };

            let written = node.inner.borrow_mut().write(&property, value);
            if !written {
                return Err(Error::UnknownProperty {
                    node: node.id(),
                    property: property.to_string(),
                });
            }
            node.mark_dirty();

            if progress >= 1.0 {
                node.finish_animation(&step_key);
                signal.settle(Outcome::Finished);
                return Ok(false);
            }
            Ok(true)
        });

        completion
    }

    /// Start one tween per `(property, target)` pair; the returned completion
    /// settles once all of them have.
    pub fn animate_many(
        &self,
        targets: &[(Property, f32)],
        duration: Duration,
        easing: Easing,
    ) -> Completion {
        Completion::all(
            targets
                .iter()
                .map(|(property, target)| self.animate(property, *target, duration, easing.clone())),
        )
    }

    /// Number of this node's tweens that are still running
    pub fn active_animations(&self) -> usize {
        self.inner.borrow().animations.len()
    }

    fn finish_animation(&self, key: &AnimationKey) {
        let mut state = self.inner.borrow_mut();
        state.animations.remove(key);
        state.prune_cleanup(&CleanupTag::Animation(key.clone()));
    }

    /// Cancel every tween of this node and drop its queued animations.
    ///
    /// Completions of cancelled work stay pending.
    pub fn stop_animations(&self) {
        self.cancel_animations(None);
    }

    /// Unregister tweens and empty the queue, settling everything with
    /// `outcome` if one is given.
    pub(super) fn cancel_animations(&self, outcome: Option<Outcome>) {
        let (scheduler, animations, queued) = {
            let mut state = self.inner.borrow_mut();
            let animations = mem::take(&mut state.animations);
            for key in animations.keys() {
                state.prune_cleanup(&CleanupTag::Animation(key.clone()));
            }
            state.queue_busy = false;
            state.queue_epoch += 1;
            (
                state.scheduler.clone(),
                animations,
                mem::take(&mut state.queue),
            )
        };

        for key in animations.keys() {
            scheduler.unregister(key);
        }
        if let Some(outcome) = outcome {
            for completion in animations.values() {
                completion.settle(outcome);
            }
            for queued in queued {
                queued.proxy.settle(outcome);
            }
        }
    }

    /// Run `start` after every animation queued before it has settled.
    ///
    /// `start` receives this node and returns the completion of the work it
    /// began. The returned proxy settles with that completion's outcome.
    pub fn queue_animation(&self, start: impl FnOnce(&Node) -> Completion + 'static) -> Completion {
        if self.is_destroyed() {
            return Completion::settled(Outcome::Interrupted);
        }
        let proxy = Completion::pending();
        self.inner.borrow_mut().queue.push_back(QueuedAnimation {
            start: Box::new(start),
            proxy: proxy.clone(),
        });
        self.pump_queue();
        proxy
    }

    /// Queued animations that have not started yet
    pub fn queued_animations(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    fn pump_queue(&self) {
        let (next, epoch) = {
            let mut state = self.inner.borrow_mut();
            if state.queue_busy || state.is_destroyed() {
                return;
            }
            let Some(next) = state.queue.pop_front() else {
                return;
            };
            state.queue_busy = true;
            (next, state.queue_epoch)
        };

        let QueuedAnimation { start, proxy } = next;
        let completion = start(self);
        let node = self.downgrade();
        completion.on_settled(move |outcome| {
            proxy.settle(outcome);
            let Some(node) = node.upgrade() else {
                return;
            };
            {
                let mut state = node.inner.borrow_mut();
                if state.queue_epoch != epoch {
                    return;
                }
                state.queue_busy = false;
            }
            node.pump_queue();
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::animation::{AnimationScheduler, FrameRequests, ManualClock};
    use crate::node::NodeConfig;
    use crate::test_support::test_scheduler;

    struct Rig {
        node: Node,
        clock: ManualClock,
        frames: Rc<FrameRequests>,
        scheduler: AnimationScheduler,
    }

    impl Rig {
        fn new() -> Self {
            let (scheduler, clock, frames) = test_scheduler();
            let node = Node::new(
                NodeConfig::new()
                    .size(10.0, 10.0)
                    .scheduler(scheduler.clone()),
            );
            Rig {
                node,
                clock,
                frames,
                scheduler,
            }
        }

        fn frame(&self, ms: u64) {
            self.clock.advance(Duration::from_millis(ms));
            if self.frames.take_request() {
                self.scheduler.tick_now();
            }
        }
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_linear_tween() {
        let rig = Rig::new();
        let done = rig.node.animate("x", 100.0, ms(1000), Easing::Linear);
        assert_eq!(rig.node.active_animations(), 1);

        rig.frame(500);
        assert!((rig.node.x() - 50.0).abs() < 1e-3);
        assert!(!done.is_settled());

        rig.frame(600);
        assert_eq!(rig.node.x(), 100.0);
        assert_eq!(done.outcome(), Some(Outcome::Finished));
        assert_eq!(rig.node.active_animations(), 0);
        assert_eq!(rig.node.cleanup_task_count(), 0);
        assert!(rig.scheduler.is_empty());
    }

    #[test]
    fn test_eased_tween_ends_on_target() {
        let rig = Rig::new();
        rig.node.animate(Property::Alpha, 0.0, ms(100), Easing::Bounce);
        rig.frame(50);
        assert!(rig.node.alpha() < 1.0);
        rig.frame(50);
        assert_eq!(rig.node.alpha(), 0.0);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_frame() {
        let rig = Rig::new();
        let done = rig.node.animate("width", 40.0, Duration::ZERO, Easing::EaseOut);
        rig.frame(0);
        assert_eq!(rig.node.width(), 40.0);
        assert!(done.is_finished());
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let rig = Rig::new();
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = reported.clone();
        rig.node.set_error_handler(Rc::new(move |error: &Error, _: &str| {
            sink.borrow_mut().push(error.to_string())
        }));

        let done = rig.node.animate("progress", 1.0, ms(100), Easing::Linear);
        assert_eq!(done.outcome(), Some(Outcome::Rejected));
        assert!(rig.scheduler.is_empty());
        assert_eq!(reported.borrow().len(), 1);

        let nan = rig.node.animate("x", f32::NAN, ms(100), Easing::Linear);
        assert_eq!(nan.outcome(), Some(Outcome::Rejected));

        rig.node.define_property("progress", 0.0);
        rig.node.animate("progress", 1.0, ms(100), Easing::Linear);
        rig.frame(100);
        assert_eq!(rig.node.get("progress"), Some(1.0));
    }

    #[test]
    fn test_parallel_tweens_share_one_frame() {
        let rig = Rig::new();
        let all = rig.node.animate_many(
            &[(Property::X, 10.0), (Property::Y, 20.0)],
            ms(100),
            Easing::EaseInOut,
        );
        rig.node.animate("x", 10.0, ms(300), Easing::Linear);
        assert_eq!(rig.frames.active(), 1);

        rig.frame(100);
        assert!(all.is_finished());
        assert_eq!(rig.node.active_animations(), 1);
        assert_eq!(rig.frames.active(), 1);

        rig.frame(200);
        assert_eq!(rig.frames.active(), 0);
        assert_eq!(rig.frames.total_requested(), 2);
    }

    #[test]
    fn test_stop_leaves_completion_pending() {
        let rig = Rig::new();
        let done = rig.node.animate("x", 100.0, ms(1000), Easing::Linear);
        rig.frame(250);
        rig.node.stop_animations();

        rig.frame(1000);
        assert!(!done.is_settled());
        assert!((rig.node.x() - 25.0).abs() < 1e-3);
        assert!(rig.scheduler.is_empty());
        assert_eq!(rig.node.cleanup_task_count(), 0);
    }

    #[test]
    fn test_destroy_interrupts_without_jumping_to_target() {
        let rig = Rig::new();
        let done = rig.node.animate("x", 100.0, ms(1000), Easing::Linear);
        rig.frame(500);
        rig.node.destroy();

        assert_eq!(done.outcome(), Some(Outcome::Interrupted));
        rig.frame(1000);
        assert!((rig.node.x() - 50.0).abs() < 1e-3);
        assert_eq!(rig.frames.active(), 0);

        let late = rig.node.animate("x", 0.0, ms(10), Easing::Linear);
        assert_eq!(late.outcome(), Some(Outcome::Interrupted));
    }

    #[test]
    fn test_queue_runs_sequentially() {
        let rig = Rig::new();
        let first = rig
            .node
            .queue_animation(|node| node.animate("x", 10.0, ms(100), Easing::Linear));
        let second = rig
            .node
            .queue_animation(|node| node.animate("y", 10.0, ms(100), Easing::Linear));
        assert_eq!(rig.node.queued_animations(), 1);
        assert_eq!(rig.node.active_animations(), 1);

        rig.frame(100);
        assert!(first.is_finished());
        assert!(!second.is_settled());
        assert_eq!(rig.node.y(), 0.0);
        assert_eq!(rig.node.queued_animations(), 0);

        rig.frame(100);
        assert!(second.is_finished());
        assert_eq!(rig.node.y(), 10.0);
    }

    #[test]
    fn test_queue_continues_after_rejected_start() {
        let rig = Rig::new();
        let bad = rig
            .node
            .queue_animation(|node| node.animate("missing", 1.0, ms(100), Easing::Linear));
        let good = rig
            .node
            .queue_animation(|node| node.animate("x", 5.0, ms(100), Easing::Linear));
        assert_eq!(bad.outcome(), Some(Outcome::Rejected));
        rig.frame(100);
        assert!(good.is_finished());
    }

    #[test]
    fn test_stop_drops_queue() {
        let rig = Rig::new();
        rig.node
            .queue_animation(|node| node.animate("x", 10.0, ms(100), Easing::Linear));
        let dropped = rig
            .node
            .queue_animation(|node| node.animate("y", 10.0, ms(100), Easing::Linear));
        rig.node.stop_animations();
        assert_eq!(rig.node.queued_animations(), 0);

        let after = rig
            .node
            .queue_animation(|node| node.animate("y", 5.0, ms(100), Easing::Linear));
        rig.frame(100);
        assert!(after.is_finished());
        assert!(!dropped.is_settled());
    }

    #[test]
    fn test_destroy_interrupts_queue() {
        let rig = Rig::new();
        let running = rig
            .node
            .queue_animation(|node| node.animate("x", 10.0, ms(100), Easing::Linear));
        let waiting = rig
            .node
            .queue_animation(|node| node.animate("y", 10.0, ms(100), Easing::Linear));
        rig.node.destroy();
        assert_eq!(running.outcome(), Some(Outcome::Interrupted));
        assert_eq!(waiting.outcome(), Some(Outcome::Interrupted));
    }

    #[test]
    fn test_tween_on_dropped_node_stops() {
        let rig = Rig::new();
        let done = rig.node.animate("x", 100.0, ms(1000), Easing::Linear);
        drop(rig.node);
        rig.clock.advance(ms(16));
        rig.frames.take_request();
        rig.scheduler.tick_now();
        assert_eq!(done.outcome(), Some(Outcome::Interrupted));
        assert!(rig.scheduler.is_empty());
    }
}
