//! The shared animation scheduler.
//!
//! One [`AnimationScheduler`] multiplexes every in-flight tween of every node
//! onto a single frame subscription. Entries are per-frame step functions
//! keyed by [`AnimationKey`]. A step returns `Ok(true)` to keep running and
//! `Ok(false)` once it is complete; an `Err` or a panic removes that entry
//! only, so one broken tween never stalls the others.
//!
//! The scheduler never talks to a platform directly. It asks a
//! [`FrameSource`] for a frame callback and the platform answers by calling
//! [`AnimationScheduler::tick`]. At most one frame request is outstanding at
//! any time.
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use trellis::{AnimationKey, AnimationScheduler, FrameRequests, ManualClock};
//!
//! let clock = ManualClock::new();
//! let frames = Rc::new(FrameRequests::new());
//! let scheduler = AnimationScheduler::new(Rc::new(clock.clone()), frames.clone());
//!
//! let mut steps = 0;
//! scheduler.register(AnimationKey::new("count"), move |_now| {
//!     steps += 1;
//!     Ok(steps < 3)
//! });
//!
//! while frames.take_request() {
//!     clock.advance(Duration::from_millis(16));
//!     scheduler.tick_now();
//! }
//! assert!(scheduler.is_empty());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::{panic_message, Error};

/// Source of frame timestamps, measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock measured from its creation
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Identifies one frame request handed out by a [`FrameSource`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Platform hook for "call me back on the next display frame".
pub trait FrameSource {
    /// Subscribe to the next frame.
    fn request_frame(&self) -> FrameToken;
    /// Withdraw a subscription that has not fired yet.
    fn cancel_frame(&self, token: FrameToken);
}

/// Frame source that records requests for a platform loop to poll.
///
/// The platform calls [`FrameRequests::take_request`] once per display frame
/// and, if it returns true, ticks the scheduler.
#[derive(Default)]
pub struct FrameRequests {
    next_token: Cell<u64>,
    active: RefCell<Vec<FrameToken>>,
    total_requested: Cell<u64>,
}

impl FrameRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the outstanding request, if any.
    pub fn take_request(&self) -> bool {
        let mut active = self.active.borrow_mut();
        let had_request = !active.is_empty();
        active.clear();
        had_request
    }

    /// Number of requests that have neither fired nor been cancelled
    pub fn active(&self) -> usize {
        self.active.borrow().len()
    }

    /// Number of requests ever made
    pub fn total_requested(&self) -> u64 {
        self.total_requested.get()
    }
}

impl FrameSource for FrameRequests {
    fn request_frame(&self) -> FrameToken {
        let token = FrameToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.total_requested.set(self.total_requested.get() + 1);
        self.active.borrow_mut().push(token);
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        self.active.borrow_mut().retain(|t| *t != token);
    }
}

/// Key of one scheduler entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnimationKey(Rc<str>);

impl AnimationKey {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    /// Key for a tween of `property` on `owner` started at `started`.
    ///
    /// `sequence` disambiguates tweens of the same property started within the
    /// same millisecond.
    pub fn for_tween(
        owner: impl fmt::Display,
        property: impl fmt::Display,
        started: Duration,
        sequence: u64,
    ) -> Self {
        Self::new(format!(
            "{}:{}@{}#{}",
            owner,
            property,
            started.as_millis(),
            sequence
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-frame step function. Receives the frame timestamp.
pub type StepResult = Result<bool, Error>;
type Step = Rc<RefCell<dyn FnMut(Duration) -> StepResult>>;

struct Entry {
    /// Slot in `order`, fixed at first registration
    slot: u64,
    step: Step,
}

#[derive(Default)]
struct SchedulerState {
    entries: HashMap<AnimationKey, Entry>,
    /// Registration order, which is also the tick order
    order: BTreeMap<u64, AnimationKey>,
    next_slot: u64,
    frame: Option<FrameToken>,
    ticking: bool,
    next_sequence: u64,
}

impl SchedulerState {
    fn insert(&mut self, key: AnimationKey, step: Step) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.step = step;
            return;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.order.insert(slot, key.clone());
        self.entries.insert(key, Entry { slot, step });
    }

    fn remove(&mut self, key: &AnimationKey) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.order.remove(&entry.slot);
                true
            }
            None => false,
        }
    }

    /// Withdraw the outstanding frame request, if any.
    fn cancel_frame(&mut self, frames: &dyn FrameSource) {
        if let Some(token) = self.frame.take() {
            frames.cancel_frame(token);
        }
    }
}

struct SchedulerInner {
    clock: Rc<dyn Clock>,
    frames: Rc<dyn FrameSource>,
    state: RefCell<SchedulerState>,
}

/// Shared handle to an animation scheduler. Clones refer to the same one.
#[derive(Clone)]
pub struct AnimationScheduler {
    inner: Rc<SchedulerInner>,
}

impl AnimationScheduler {
    pub fn new(clock: Rc<dyn Clock>, frames: Rc<dyn FrameSource>) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                clock,
                frames,
                state: RefCell::new(SchedulerState::default()),
            }),
        }
    }

    /// The process-wide default scheduler (system clock, polled frame requests).
    ///
    /// Platforms drive it with [`take_frame_request`] followed by
    /// [`AnimationScheduler::tick_now`].
    pub fn global() -> Self {
        DEFAULT_SCHEDULER.with(|(scheduler, _)| scheduler.clone())
    }

    /// Current time on this scheduler's clock
    pub fn now(&self) -> Duration {
        self.inner.clock.now()
    }

    /// Insert or replace the step stored under `key`, starting the frame
    /// loop if it was idle.
    pub fn register<F>(&self, key: AnimationKey, step: F)
    where
        F: FnMut(Duration) -> StepResult + 'static,
    {
        let step: Step = Rc::new(RefCell::new(step));
        let mut state = self.inner.state.borrow_mut();
        log::trace!("register animation {}", key);
        state.insert(key, step);
        if state.frame.is_none() && !state.ticking {
            log::debug!("animation loop started");
            state.frame = Some(self.inner.frames.request_frame());
        }
    }

    /// Remove the entry under `key`. Stops the frame loop once empty.
    pub fn unregister(&self, key: &AnimationKey) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if !state.remove(key) {
            return false;
        }
        log::trace!("unregister animation {}", key);
        if state.entries.is_empty() && state.frame.is_some() {
            log::debug!("animation loop stopped");
            state.cancel_frame(&*self.inner.frames);
        }
        true
    }

    /// Remove every entry and stop the frame loop
    pub fn clear(&self) {
        let mut state = self.inner.state.borrow_mut();
        state.entries.clear();
        state.order.clear();
        state.cancel_frame(&*self.inner.frames);
    }

    pub fn contains(&self, key: &AnimationKey) -> bool {
        self.inner.state.borrow().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a frame is requested or a tick is in progress
    pub fn is_running(&self) -> bool {
        let state = self.inner.state.borrow();
        state.frame.is_some() || state.ticking
    }

    /// Monotonic counter used to build unique tween keys
    pub(crate) fn next_sequence(&self) -> u64 {
        let mut state = self.inner.state.borrow_mut();
        state.next_sequence += 1;
        state.next_sequence
    }

    /// Tick with the scheduler's own clock
    pub fn tick_now(&self) {
        self.tick(self.now());
    }

    /// Advance every registered entry once. Called by the platform when the
    /// requested frame fires.
    ///
    /// Entries registered during the tick first run on the next one; entries
    /// removed during the tick are skipped.
    pub fn tick(&self, now: Duration) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            if state.ticking {
                log::warn!("ignoring re-entrant animation tick");
                return;
            }
            state.ticking = true;
            // a tick not driven by the pending frame must not leave it live
            state.cancel_frame(&*self.inner.frames);
            let steps: Vec<(AnimationKey, Step)> = state
                .order
                .values()
                .filter_map(|key| {
                    let entry = state.entries.get(key)?;
                    Some((key.clone(), entry.step.clone()))
                })
                .collect();
            steps
        };

        for (key, step) in snapshot {
            if !self.holds(&key, &step) {
                continue;
            }
            let keep = match run_step(&key, &step, now) {
                Ok(keep) => keep,
                Err(error) => {
                    log::error!("animation {} failed: {}", key, error);
                    false
                }
            };
            if !keep {
                self.remove_if_current(&key, &step);
            }
        }

        let mut state = self.inner.state.borrow_mut();
        state.ticking = false;
        if !state.entries.is_empty() && state.frame.is_none() {
            state.frame = Some(self.inner.frames.request_frame());
        } else if state.entries.is_empty() {
            log::debug!("animation loop stopped");
        }
    }

    /// True if `key` still maps to this exact step
    fn holds(&self, key: &AnimationKey, step: &Step) -> bool {
        let state = self.inner.state.borrow();
        state
            .entries
            .get(key)
            .is_some_and(|entry| Rc::ptr_eq(&entry.step, step))
    }

    fn remove_if_current(&self, key: &AnimationKey, step: &Step) {
        let mut state = self.inner.state.borrow_mut();
        if state
            .entries
            .get(key)
            .is_some_and(|entry| Rc::ptr_eq(&entry.step, step))
        {
            log::trace!("animation {} complete", key);
            state.remove(key);
        }
    }
}

fn run_step(key: &AnimationKey, step: &Step, now: Duration) -> StepResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| match step.try_borrow_mut() {
        Ok(mut f) => f(now),
        Err(_) => Err(Error::StepBorrowed(key.to_string())),
    }));
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(Error::StepPanicked {
            key: key.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("AnimationScheduler")
            .field("entries", &state.entries.len())
            .field("frame", &state.frame)
            .field("ticking", &state.ticking)
            .finish()
    }
}

thread_local! {
    static DEFAULT_SCHEDULER: (AnimationScheduler, Rc<FrameRequests>) = {
        let frames = Rc::new(FrameRequests::new());
        let scheduler = AnimationScheduler::new(Rc::new(SystemClock::new()), frames.clone());
        (scheduler, frames)
    };
}

/// Check whether the default scheduler wants a frame, and clear the request.
pub fn take_frame_request() -> bool {
    DEFAULT_SCHEDULER.with(|(_, frames)| frames.take_request())
}
