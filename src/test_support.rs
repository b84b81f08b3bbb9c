//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::{AnimationScheduler, FrameRequests, ManualClock};
use crate::node::{Event, EventKind};

/// A fresh scheduler on a manual clock, so tests never share tweens.
pub(crate) fn test_scheduler() -> (AnimationScheduler, ManualClock, Rc<FrameRequests>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = ManualClock::new();
    let frames = Rc::new(FrameRequests::new());
    let scheduler = AnimationScheduler::new(Rc::new(clock.clone()), frames.clone());
    (scheduler, clock, frames)
}

/// A handler that appends the kind of every event it receives to a log.
pub(crate) fn recording_handler() -> (Rc<RefCell<Vec<EventKind>>>, impl Fn(&mut Event)) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |event: &mut Event| {
        sink.borrow_mut().push(event.kind.clone())
    })
}
