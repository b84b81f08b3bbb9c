pub mod animation;
pub mod error;
pub mod frame_loop;
pub mod geometry;
pub mod node;
pub mod render;
pub mod scene;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use animation::{
    take_frame_request, AnimationKey, AnimationScheduler, Clock, Completion, Easing,
    FrameRequests, FrameSource, FrameToken, ManualClock, Outcome, SystemClock,
};
pub use error::{default_error_handler, Error, ErrorHandler};
pub use frame_loop::FrameLoop;
pub use geometry::Bounds;
pub use node::{
    Event, EventData, EventKind, InputEvent, Key, ListenerId, Modifiers, MouseButton, Node,
    NodeConfig, NodeFlags, NodeId, PointerSource, Property, WeakNode, Widget,
};
pub use render::{Renderable, Surface, TransformStack, Updatable};
pub use scene::Scene;
pub use transform::Transform;

pub mod prelude {
    pub use crate::animation::{Completion, Easing, Outcome};
    pub use crate::node::{
        Event, EventData, EventKind, InputEvent, Key, Node, NodeConfig, Property, Widget,
    };
    pub use crate::render::{Renderable, Surface, Updatable};
    pub use crate::scene::Scene;
}
