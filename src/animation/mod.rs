//! Time-based property transitions.
//!
//! [`timing`] holds the easing curves, [`scheduler`] the shared frame-driven
//! loop every tween runs on, and [`completion`] the signal a tween settles
//! when it finishes or is interrupted.

mod completion;
mod scheduler;
mod timing;

pub use completion::{Completion, Outcome};
pub use scheduler::{
    take_frame_request, AnimationKey, AnimationScheduler, Clock, FrameRequests, FrameSource,
    FrameToken, ManualClock, StepResult, SystemClock,
};
pub use timing::{Easing, UnknownEasing};
