//! Error types shared by nodes, the animation scheduler and the frame loop.
//!
//! Nothing in this crate treats an error as fatal. Programmer mistakes and
//! runtime failures inside handlers or tweens are reported through a node's
//! [`ErrorHandler`] (or logged by the scheduler) and execution continues.

use std::any::Any;
use std::rc::Rc;

use thiserror::Error;

use crate::node::NodeId;

/// Errors reported by the scene graph core.
#[derive(Debug, Error)]
pub enum Error {
    /// A custom property was animated or written before being declared.
    #[error("node `{node}` has no property `{property}`")]
    UnknownProperty { node: NodeId, property: String },

    /// A non-finite value was supplied where a number is required.
    #[error("invalid value {value} for `{property}`")]
    InvalidValue { property: String, value: f32 },

    /// A node was asked to adopt itself.
    #[error("node `{0}` cannot be its own child")]
    SelfParent(NodeId),

    /// Adopting the child would make the tree cyclic.
    #[error("node `{child}` is an ancestor of `{parent}`")]
    Cycle { parent: NodeId, child: NodeId },

    /// An event handler panicked during dispatch.
    #[error("handler for `{event}` panicked: {message}")]
    HandlerPanicked { event: String, message: String },

    /// An animation step panicked during a scheduler tick.
    #[error("animation `{key}` panicked: {message}")]
    StepPanicked { key: String, message: String },

    /// An animation step was re-entered while it was already running.
    #[error("animation `{0}` was re-entered during its own step")]
    StepBorrowed(String),

    /// A cleanup task panicked while its node was being destroyed.
    #[error("cleanup task panicked: {0}")]
    CleanupPanicked(String),

    /// The platform frame loop failed.
    #[error("frame loop error: {0}")]
    EventLoop(#[from] calloop::Error),
}

/// Callback receiving every error a node reports, plus a short context string
/// naming the operation that failed (e.g. `"emit(click)"`).
pub type ErrorHandler = Rc<dyn Fn(&Error, &str)>;

/// The handler nodes use when none is configured: log and continue.
pub fn default_error_handler() -> ErrorHandler {
    Rc::new(|error, context| {
        log::error!("{}: {}", context, error);
    })
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn test_panic_message_string() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }

    #[test]
    fn test_panic_message_other() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_error_display() {
        let err = Error::SelfParent(NodeId::new("a"));
        assert_eq!(err.to_string(), "node `a` cannot be its own child");

        let err = Error::UnknownProperty {
            node: NodeId::new("meter"),
            property: "level".into(),
        };
        assert_eq!(err.to_string(), "node `meter` has no property `level`");
    }
}
