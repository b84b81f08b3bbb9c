//! A calloop timer standing in for the display's frame callback.
//!
//! Platforms with a real vsync source call [`AnimationScheduler::tick`]
//! from it instead. `FrameLoop` is for headless runs: it fires at a fixed
//! interval and ticks the scheduler whenever a frame was requested.

use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};

use crate::animation::{AnimationScheduler, FrameRequests, SystemClock};
use crate::error::Error;

/// Roughly 60 frames per second
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct FrameLoop {
    interval: Duration,
    frames: Rc<FrameRequests>,
    scheduler: AnimationScheduler,
}

struct LoopState {
    frames: Rc<FrameRequests>,
    scheduler: AnimationScheduler,
    signal: LoopSignal,
    deadline: Instant,
    ticks: usize,
}

impl FrameLoop {
    /// A loop with its own scheduler on the system clock.
    pub fn new(interval: Duration) -> Self {
        let frames = Rc::new(FrameRequests::new());
        let scheduler = AnimationScheduler::new(Rc::new(SystemClock::new()), frames.clone());
        Self {
            interval,
            frames,
            scheduler,
        }
    }

    /// The scheduler this loop drives. Pass it to nodes through
    /// [`NodeConfig::scheduler`](crate::NodeConfig::scheduler).
    pub fn scheduler(&self) -> AnimationScheduler {
        self.scheduler.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick the scheduler on every requested frame until it goes idle or
    /// `timeout` elapses. Returns the number of ticks.
    pub fn run_until_idle(&self, timeout: Duration) -> Result<usize, Error> {
        if !self.scheduler.is_running() {
            return Ok(0);
        }

        let mut event_loop: EventLoop<LoopState> = EventLoop::try_new()?;
        let mut state = LoopState {
            frames: self.frames.clone(),
            scheduler: self.scheduler.clone(),
            signal: event_loop.get_signal(),
            deadline: Instant::now() + timeout,
            ticks: 0,
        };

        let interval = self.interval;
        event_loop
            .handle()
            .insert_source(
                Timer::from_duration(interval),
                move |_, _, state: &mut LoopState| {
                    if state.frames.take_request() {
                        state.scheduler.tick_now();
                        state.ticks += 1;
                    }
                    if !state.scheduler.is_running() || Instant::now() >= state.deadline {
                        state.signal.stop();
                        return TimeoutAction::Drop;
                    }
                    TimeoutAction::ToDuration(interval)
                },
            )
            .map_err(|e| e.error)?;

        log::debug!("frame loop running at {:?}", interval);
        event_loop.run(Some(interval), &mut state, |_| {})?;

        if self.scheduler.is_running() {
            log::warn!("frame loop timed out after {} ticks", state.ticks);
        }
        Ok(state.ticks)
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}
